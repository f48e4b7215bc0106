//! Retrieval layer for ADGM regulatory knowledge.
//!
//! Seeds a small in-memory corpus of ADGM reference passages, chunks them,
//! and serves similarity search over embeddings when the configured LLM
//! provider supports them, degrading to keyword-overlap ranking otherwise.

pub mod knowledge;
pub mod seed;
pub mod splitter;
pub mod store;

pub use knowledge::KnowledgeBase;
pub use store::{KnowledgeStore, Passage};
