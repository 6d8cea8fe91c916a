//! Annotates a column of spreadsheet reviews with their sentiment.
//!
//! Each row's first text cell is sent to the Azure AI Language sentiment
//! endpoint and the returned label is written into the next column through
//! the workbook's shared-string pool.

pub mod annotate;
pub mod column;
pub mod config;
pub mod error;
pub mod sentiment;
pub mod workbook;

pub use annotate::{
    annotate_document, annotate_row, run, run_with, write_result, RowOutcome, Summary,
};
pub use config::{Config, ConfigError};
pub use error::SheetError;
pub use sentiment::{
    ConfidenceScores, LanguageClient, SentenceSentiment, Sentiment, SentimentAnalyzer,
    SentimentError, SentimentResult,
};
pub use workbook::{Cell, CellKind, Document, Row, SharedStringPool};
