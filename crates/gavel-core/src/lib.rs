//! Compliance analysis pipeline for ADGM corporate documents.
//!
//! Documents flow through four stages: classification into a closed set of
//! corporate document types, inference of the legal process the set belongs
//! to with checklist validation, rule-based and LLM-assisted red-flag
//! detection, and aggregation into a scored report.

pub mod adapter;
pub mod checklist;
pub mod classifier;
pub mod config;
pub mod error;
pub mod fuzzy;
pub mod pipeline;
pub mod redflags;
pub mod report;
pub mod types;

pub use config::Config;
pub use error::{AnalysisError, ExtractionError};
pub use pipeline::Pipeline;
