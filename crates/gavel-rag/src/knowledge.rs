use std::sync::Arc;

use tokio::sync::RwLock;

use gavel_llm::LlmProvider;

use crate::seed;
use crate::splitter::{SplitterConfig, TextSplitter};
use crate::store::{KnowledgeStore, Passage};

struct Entry {
    passage: Passage,
    vector: Option<Vec<f32>>,
}

/// In-memory knowledge base over chunked regulatory passages.
///
/// Chunks are embedded through the configured provider when it supports
/// embeddings. Entries without vectors (or a provider without an embedding
/// model) are ranked by keyword overlap instead, so retrieval keeps working
/// in a degraded mode rather than failing the analysis.
pub struct KnowledgeBase<P> {
    provider: Arc<P>,
    splitter: TextSplitter,
    entries: RwLock<Vec<Entry>>,
}

impl<P> std::fmt::Debug for KnowledgeBase<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KnowledgeBase").finish_non_exhaustive()
    }
}

impl<P: LlmProvider> KnowledgeBase<P> {
    #[must_use]
    pub fn new(provider: Arc<P>) -> Self {
        Self {
            provider,
            splitter: TextSplitter::new(SplitterConfig::default()),
            entries: RwLock::new(Vec::new()),
        }
    }

    /// Seed the store with the built-in ADGM corpus. Returns the chunk count.
    pub async fn seed(&self) -> usize {
        let items = seed::adgm_knowledge();
        let mut passages = Vec::new();
        for item in &items {
            for chunk in self.splitter.split(item.content) {
                passages.push(item.to_passage(chunk));
            }
        }
        let count = passages.len();
        self.add(passages).await;
        tracing::info!("seeded knowledge base with {count} chunks");
        count
    }

    /// Add pre-chunked passages, embedding each when the provider allows it.
    pub async fn add(&self, passages: Vec<Passage>) {
        let embed = self.provider.supports_embeddings();
        let mut new_entries = Vec::with_capacity(passages.len());
        for passage in passages {
            let vector = if embed {
                match self.provider.embed(&passage.content).await {
                    Ok(v) => Some(v),
                    Err(e) => {
                        tracing::warn!("embedding failed, falling back to keyword ranking: {e}");
                        None
                    }
                }
            } else {
                None
            };
            new_entries.push(Entry { passage, vector });
        }
        self.entries.write().await.extend(new_entries);
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    async fn query_vector(&self, query: &str) -> Option<Vec<f32>> {
        if !self.provider.supports_embeddings() {
            return None;
        }
        match self.provider.embed(query).await {
            Ok(v) => Some(v),
            Err(e) => {
                tracing::warn!("query embedding failed, using keyword ranking: {e}");
                None
            }
        }
    }
}

impl<P: LlmProvider> KnowledgeStore for KnowledgeBase<P> {
    async fn search(&self, query: &str, k: usize) -> Vec<Passage> {
        let query_vector = self.query_vector(query).await;
        let entries = self.entries.read().await;

        let mut scored: Vec<(f32, &Passage)> = entries
            .iter()
            .filter_map(|entry| {
                let score = match (&query_vector, &entry.vector) {
                    (Some(q), Some(v)) => cosine_similarity(q, v),
                    _ => keyword_overlap(query, &entry.passage.content),
                };
                (score > 0.0).then_some((score, &entry.passage))
            })
            .collect();

        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(k);
        scored.into_iter().map(|(_, p)| p.clone()).collect()
    }
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

/// Fraction of query words present in the passage, case-insensitive.
#[expect(clippy::cast_precision_loss)]
fn keyword_overlap(query: &str, content: &str) -> f32 {
    let content = content.to_lowercase();
    let words: Vec<String> = query
        .to_lowercase()
        .split_whitespace()
        .filter(|w| w.len() > 2)
        .map(str::to_owned)
        .collect();
    if words.is_empty() {
        return 0.0;
    }
    let hits = words.iter().filter(|w| content.contains(w.as_str())).count() as f32;
    hits / words.len() as f32
}

#[cfg(test)]
mod tests {
    use super::*;
    use gavel_llm::mock::MockProvider;

    fn passage(content: &str) -> Passage {
        Passage {
            content: content.to_owned(),
            source: "test".into(),
            category: "test".into(),
            citation: "TEST-1".into(),
        }
    }

    #[tokio::test]
    async fn seed_populates_all_items() {
        let kb = KnowledgeBase::new(Arc::new(MockProvider::default()));
        let count = kb.seed().await;
        assert!(count >= 6);
        assert_eq!(kb.len().await, count);
    }

    #[tokio::test]
    async fn keyword_search_ranks_by_overlap() {
        let kb = KnowledgeBase::new(Arc::new(MockProvider::default()));
        kb.seed().await;
        let results = kb.search("jurisdiction disputes ADGM Courts", 3).await;
        assert!(!results.is_empty());
        assert!(results.len() <= 3);
        assert_eq!(results[0].category, "jurisdiction");
    }

    #[tokio::test]
    async fn vector_search_prefers_similar_text() {
        let provider = Arc::new(MockProvider::default().with_text_embeddings());
        let kb = KnowledgeBase::new(provider);
        kb.add(vec![passage("aaaa aaaa aaaa"), passage("zzzz zzzz zzzz")])
            .await;
        let results = kb.search("aaaa", 1).await;
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].content, "aaaa aaaa aaaa");
    }

    #[tokio::test]
    async fn embed_failure_degrades_to_keyword() {
        let mut provider = MockProvider::default().with_text_embeddings();
        provider.fail_embed = true;
        let kb = KnowledgeBase::new(Arc::new(provider));
        kb.add(vec![passage("registered office address")]).await;
        let results = kb.search("registered office", 5).await;
        assert_eq!(results.len(), 1);
    }

    #[tokio::test]
    async fn no_match_returns_empty() {
        let kb = KnowledgeBase::new(Arc::new(MockProvider::default()));
        kb.add(vec![passage("registered office address")]).await;
        let results = kb.search("xylophone quartz", 5).await;
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn empty_store_returns_empty() {
        let kb = KnowledgeBase::new(Arc::new(MockProvider::default()));
        assert!(kb.is_empty().await);
        assert!(kb.search("anything", 3).await.is_empty());
    }

    #[test]
    fn cosine_similarity_identical_is_one() {
        let v = vec![0.5, 0.5, 0.1];
        assert!((cosine_similarity(&v, &v) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn keyword_overlap_ignores_short_words() {
        let score = keyword_overlap("of to in", "of to in everything");
        assert!((score - 0.0).abs() < f32::EPSILON);
    }
}
