//! End-to-end orchestration of the compliance analysis stages.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinSet;

use gavel_llm::LlmProvider;
use gavel_rag::KnowledgeStore;

use crate::adapter::DocumentAdapter;
use crate::checklist::ChecklistValidator;
use crate::classifier::Classifier;
use crate::config::Config;
use crate::error::AnalysisError;
use crate::redflags::RedFlagDetector;
use crate::report::ReportGenerator;
use crate::types::{ClassifiedDocument, Issue, Report};

#[derive(Debug)]
pub struct ReviewedDocument {
    pub original: String,
    pub reviewed_path: PathBuf,
}

#[derive(Debug)]
pub struct AnalysisOutput {
    pub report: Report,
    pub checklist_message: String,
    pub summary_message: String,
    pub reviewed: Vec<ReviewedDocument>,
}

pub struct Pipeline<P, K> {
    classifier: Classifier<P, K>,
    detector: RedFlagDetector<P, K>,
    validator: ChecklistValidator,
    generation_timeout: Duration,
}

impl<P, K> std::fmt::Debug for Pipeline<P, K> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("generation_timeout", &self.generation_timeout)
            .finish_non_exhaustive()
    }
}

impl<P, K> Pipeline<P, K>
where
    P: LlmProvider + 'static,
    K: KnowledgeStore + 'static,
{
    #[must_use]
    pub fn new(provider: Arc<P>, knowledge: Arc<K>, config: &Config) -> Self {
        Self {
            classifier: Classifier::new(Arc::clone(&provider), Arc::clone(&knowledge)),
            detector: RedFlagDetector::new(provider, knowledge),
            validator: ChecklistValidator::new(config.analysis.presence_threshold),
            generation_timeout: Duration::from_secs(config.analysis.generation_timeout_secs),
        }
    }

    /// Run the full analysis over a set of files.
    ///
    /// Files that cannot be ingested are logged and skipped; the run fails
    /// only when no document survives extraction.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::NoDocuments`] when nothing could be
    /// extracted, or a join error if an analysis task panics.
    pub async fn run(&self, paths: &[PathBuf]) -> Result<AnalysisOutput, AnalysisError> {
        let mut docs = Vec::new();
        for path in paths {
            match DocumentAdapter::extract(path) {
                Ok(doc) => docs.push(doc),
                Err(e) => tracing::error!("skipping {}: {e}", path.display()),
            }
        }
        if docs.is_empty() {
            return Err(AnalysisError::NoDocuments);
        }

        let documents = self.classify_all(docs).await?;

        let process_info = self.validator.infer_process(&documents);
        let checklist = self.validator.validate(&documents, &process_info);
        tracing::info!(
            "inferred process {} ({:.0}% complete)",
            process_info.process,
            checklist.completeness_score * 100.0
        );

        let per_document_issues = self.detect_all(&documents).await?;

        let mut reviewed = Vec::with_capacity(documents.len());
        let mut all_issues: Vec<Issue> = Vec::new();
        for (doc, issues) in documents.iter().zip(&per_document_issues) {
            reviewed.push(ReviewedDocument {
                original: doc.doc.name.clone(),
                reviewed_path: DocumentAdapter::annotate(&doc.doc.path, issues),
            });
            all_issues.extend(issues.iter().cloned());
        }

        let report = ReportGenerator::generate(&process_info, &documents, &checklist, all_issues);
        let checklist_message = ChecklistValidator::checklist_message(&process_info, &checklist);
        let summary_message = ReportGenerator::summary_message(&report);

        Ok(AnalysisOutput {
            report,
            checklist_message,
            summary_message,
            reviewed,
        })
    }

    async fn classify_all(
        &self,
        docs: Vec<crate::types::RawDocument>,
    ) -> Result<Vec<ClassifiedDocument>, AnalysisError> {
        let mut set = JoinSet::new();
        for (idx, doc) in docs.into_iter().enumerate() {
            let classifier = self.classifier.clone();
            let timeout = self.generation_timeout;
            set.spawn(async move {
                let classification =
                    match tokio::time::timeout(timeout, classifier.classify(&doc)).await {
                        Ok(c) => c,
                        Err(_) => {
                            tracing::warn!(
                                "classification timed out for {}, keeping rule result",
                                doc.name
                            );
                            Classifier::<P, K>::classify_rules(&doc.name, &doc.text)
                        }
                    };
                (idx, ClassifiedDocument { doc, classification })
            });
        }

        let mut indexed = Vec::with_capacity(set.len());
        while let Some(res) = set.join_next().await {
            indexed.push(res?);
        }
        indexed.sort_by_key(|(idx, _)| *idx);
        Ok(indexed.into_iter().map(|(_, doc)| doc).collect())
    }

    async fn detect_all(
        &self,
        documents: &[ClassifiedDocument],
    ) -> Result<Vec<Vec<Issue>>, AnalysisError> {
        let mut set = JoinSet::new();
        for (idx, doc) in documents.iter().enumerate() {
            let detector = self.detector.clone();
            let doc = doc.clone();
            let timeout = self.generation_timeout;
            set.spawn(async move {
                let issues = match tokio::time::timeout(timeout, detector.detect(&doc)).await {
                    Ok(issues) => issues,
                    Err(_) => {
                        tracing::warn!(
                            "red-flag detection timed out for {}, keeping rule results",
                            doc.doc.name
                        );
                        detector.detect_rules(&doc)
                    }
                };
                (idx, issues)
            });
        }

        let mut indexed = Vec::with_capacity(set.len());
        while let Some(res) = set.join_next().await {
            indexed.push(res?);
        }
        indexed.sort_by_key(|(idx, _)| *idx);
        Ok(indexed.into_iter().map(|(_, issues)| issues).collect())
    }
}
