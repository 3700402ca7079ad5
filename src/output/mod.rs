//! Output module for harvested records
//!
//! This module handles:
//! - Appending article and comment records to CSV tables
//! - Recording and printing run statistics

mod csv_sink;
pub mod stats;
mod traits;

pub use csv_sink::CsvSink;
pub use stats::{print_statistics, CrawlStatistics};
pub use traits::{MemorySink, OutputError, OutputResult, RecordSink};
