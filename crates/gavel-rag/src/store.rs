/// A retrievable piece of ADGM regulatory text with its provenance.
#[derive(Clone, Debug, PartialEq)]
pub struct Passage {
    pub content: String,
    pub source: String,
    pub category: String,
    pub citation: String,
}

/// Read side of the knowledge layer.
///
/// Retrieval is advisory context for downstream analysis, so `search` never
/// fails: a backend that cannot rank returns an empty list and the caller
/// proceeds without citations.
pub trait KnowledgeStore: Send + Sync {
    fn search(&self, query: &str, k: usize) -> impl Future<Output = Vec<Passage>> + Send;
}
