//! CSV output
//!
//! Two tables per run: articles and comments. An existing non-empty file is
//! appended to without repeating the header; otherwise it is created and the
//! header row is written before the first record.

use crate::article::{ArticleRecord, CommentRecord};
use crate::output::traits::{OutputResult, RecordSink};
use csv::{Writer, WriterBuilder};
use std::fs::{self, File, OpenOptions};
use std::path::Path;

/// Appending CSV writer for article and comment tables
pub struct CsvSink {
    articles: Writer<File>,
    comments: Writer<File>,
}

fn open_table(path: &Path) -> OutputResult<Writer<File>> {
    let has_rows = fs::metadata(path).map(|m| m.len() > 0).unwrap_or(false);
    let file = OpenOptions::new().create(true).append(true).open(path)?;

    if has_rows {
        tracing::info!("Appending to {}", path.display());
    } else {
        tracing::info!("Creating {}", path.display());
    }

    Ok(WriterBuilder::new().has_headers(!has_rows).from_writer(file))
}

impl CsvSink {
    /// Opens both tables
    ///
    /// # Arguments
    ///
    /// * `articles_path` - Article table
    /// * `comments_path` - Comment table
    pub fn new(articles_path: &Path, comments_path: &Path) -> OutputResult<Self> {
        Ok(Self {
            articles: open_table(articles_path)?,
            comments: open_table(comments_path)?,
        })
    }
}

impl RecordSink for CsvSink {
    fn write_page(
        &mut self,
        articles: &[ArticleRecord],
        comments: &[CommentRecord],
    ) -> OutputResult<()> {
        for article in articles {
            self.articles.serialize(article)?;
        }
        for comment in comments {
            self.comments.serialize(comment)?;
        }

        // Every page is on disk before the next one is fetched
        self.articles.flush()?;
        self.comments.flush()?;
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        self.articles.flush()?;
        self.comments.flush()?;
        Ok(())
    }
}
