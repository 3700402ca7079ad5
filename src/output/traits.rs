//! Record sink trait and error types
//!
//! A sink receives the records of one index page at a time, in crawl order.

use crate::article::{ArticleRecord, CommentRecord};
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Destination for harvested records
pub trait RecordSink {
    /// Appends the records collected from one index page
    ///
    /// # Arguments
    ///
    /// * `articles` - Intact articles, in thread order
    /// * `comments` - Their comments, grouped by article in the same order
    fn write_page(&mut self, articles: &[ArticleRecord], comments: &[CommentRecord])
        -> OutputResult<()>;

    /// Flushes everything written so far
    fn finish(&mut self) -> OutputResult<()>;
}

/// Sink that keeps records in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    pub articles: Vec<ArticleRecord>,
    pub comments: Vec<CommentRecord>,
    /// Number of `write_page` calls
    pub pages: usize,
    pub finished: bool,
}

impl RecordSink for MemorySink {
    fn write_page(
        &mut self,
        articles: &[ArticleRecord],
        comments: &[CommentRecord],
    ) -> OutputResult<()> {
        self.articles.extend_from_slice(articles);
        self.comments.extend_from_slice(comments);
        self.pages += 1;
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        self.finished = true;
        Ok(())
    }
}
