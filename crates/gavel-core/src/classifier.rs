//! Two-stage document classifier: keyword rules first, LLM fallback when the
//! rule stage is not confident enough.

use std::sync::Arc;
use std::sync::LazyLock;

use regex::Regex;

use gavel_llm::{LlmProvider, Message};
use gavel_rag::KnowledgeStore;

use crate::fuzzy;
use crate::types::{Classification, ClassificationMethod, DocType, RawDocument};

pub(crate) const SYSTEM_PROMPT: &str = "You are an expert ADGM legal compliance assistant.";

/// Rule results at or above this confidence skip the LLM entirely.
const RULE_SKIP_THRESHOLD: f64 = 0.7;
/// Below this the rule stage reports `Unknown`.
const MIN_RULE_CONFIDENCE: f64 = 0.4;
/// Fuzzy content matches are discounted relative to exact phrase hits.
const FUZZY_CONTENT_PENALTY: f64 = 0.8;
const EXACT_PHRASE_SCORE: f64 = 95.0;
const TITLE_PATTERN_SCORE: f64 = 90.0;
const LLM_CONFIDENCE: f64 = 0.6;
const LLM_UNKNOWN_CONFIDENCE: f64 = 0.3;
const LLM_FAILED_CONFIDENCE: f64 = 0.2;
const CONTENT_SCAN_CHARS: usize = 2000;
const TITLE_SCAN_CHARS: usize = 500;
const CONTEXT_PASSAGES: usize = 3;

static KEYWORDS: &[(DocType, &[&str])] = &[
    (
        DocType::ArticlesOfAssociation,
        &["articles of association", "aoa", "articles", "company constitution"],
    ),
    (
        DocType::MemorandumOfAssociation,
        &["memorandum of association", "moa", "memorandum", "company memorandum"],
    ),
    (
        DocType::BoardResolution,
        &["board resolution", "directors resolution", "board meeting", "director resolution"],
    ),
    (
        DocType::ShareholderResolution,
        &["shareholder resolution", "members resolution", "shareholders meeting"],
    ),
    (
        DocType::IncorporationApplication,
        &[
            "incorporation application",
            "application for incorporation",
            "company incorporation",
            "incorporation form",
        ],
    ),
    (
        DocType::UboDeclaration,
        &[
            "ultimate beneficial owner",
            "beneficial ownership",
            "ubo declaration",
            "beneficial owner",
            "ubo",
        ],
    ),
    (
        DocType::RegisterOfMembers,
        &["register of members", "members register", "share register", "shareholder register"],
    ),
    (
        DocType::RegisterOfDirectors,
        &["register of directors", "directors register", "director register"],
    ),
    (
        DocType::RegisterOfMembersAndDirectors,
        &[
            "register of members and directors",
            "combined register",
            "members and directors register",
        ],
    ),
    (
        DocType::ChangeOfRegisteredAddressNotice,
        &["change of registered address", "registered office change", "address change"],
    ),
    (
        DocType::EmploymentContract,
        &["employment contract", "employment agreement", "service agreement", "employee contract"],
    ),
    (
        DocType::CompliancePolicy,
        &["compliance policy", "policy document", "procedure", "risk policy", "governance policy"],
    ),
    (
        DocType::CommercialAgreement,
        &[
            "commercial agreement",
            "service agreement",
            "consultancy agreement",
            "nda",
            "non-disclosure",
            "sha",
            "shareholder agreement",
        ],
    ),
    (
        DocType::LicensingFiling,
        &["licensing application", "license application", "regulatory filing", "business plan", "licensing"],
    ),
];

static TITLE_PATTERNS: LazyLock<Vec<(DocType, Regex)>> = LazyLock::new(|| {
    let table = [
        (
            DocType::ArticlesOfAssociation,
            r"(?i)articles\s+of\s+association|company\s+constitution|constitutional\s+document",
        ),
        (
            DocType::MemorandumOfAssociation,
            r"(?i)memorandum\s+of\s+association|company\s+memorandum",
        ),
        (
            DocType::BoardResolution,
            r"(?i)board\s+resolution|directors?\s+resolution|resolution\s+of\s+the\s+board",
        ),
        (
            DocType::UboDeclaration,
            r"(?i)ultimate\s+beneficial\s+owner|beneficial\s+ownership\s+declaration|ubo\s+declaration",
        ),
        (
            DocType::RegisterOfMembers,
            r"(?i)register\s+of\s+members|members?\s+register",
        ),
        (
            DocType::RegisterOfDirectors,
            r"(?i)register\s+of\s+directors?|directors?\s+register",
        ),
    ];
    table
        .into_iter()
        .map(|(ty, pat)| {
            let re = Regex::new(pat).unwrap_or_else(|e| panic!("invalid title pattern for {ty}: {e}"));
            (ty, re)
        })
        .collect()
});

pub struct Classifier<P, K> {
    provider: Arc<P>,
    knowledge: Arc<K>,
}

impl<P, K> Clone for Classifier<P, K> {
    fn clone(&self) -> Self {
        Self {
            provider: Arc::clone(&self.provider),
            knowledge: Arc::clone(&self.knowledge),
        }
    }
}

impl<P, K> std::fmt::Debug for Classifier<P, K> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Classifier").finish_non_exhaustive()
    }
}

impl<P: LlmProvider, K: KnowledgeStore> Classifier<P, K> {
    #[must_use]
    pub fn new(provider: Arc<P>, knowledge: Arc<K>) -> Self {
        Self { provider, knowledge }
    }

    /// Classify a document, consulting the LLM only when the rule stage
    /// stays below the skip threshold. The more confident result wins;
    /// ties go to the rule stage.
    pub async fn classify(&self, doc: &RawDocument) -> Classification {
        let rule = Self::classify_rules(&doc.name, &doc.text);
        if rule.confidence >= RULE_SKIP_THRESHOLD {
            tracing::debug!(
                "classified {} as {} by rules ({:.2})",
                doc.name,
                rule.doc_type,
                rule.confidence
            );
            return rule;
        }

        let llm = self.classify_llm(&doc.name, &doc.text).await;
        if llm.confidence > rule.confidence { llm } else { rule }
    }

    /// Keyword and title-pattern scoring over filename and content.
    #[must_use]
    pub fn classify_rules(filename: &str, text: &str) -> Classification {
        let text_lower = text.to_lowercase();
        let filename_lower = filename.to_lowercase();
        let content_head = truncate_chars(&text_lower, CONTENT_SCAN_CHARS);
        let title_head = truncate_chars(&text_lower, TITLE_SCAN_CHARS);

        let mut best_type = DocType::Unknown;
        let mut best_score: f64 = 0.0;

        for &(doc_type, keywords) in KEYWORDS {
            let mut score: f64 = 0.0;

            for keyword in keywords {
                score = score.max(fuzzy::partial_ratio(keyword, &filename_lower));
            }

            for keyword in keywords {
                if text_lower.contains(keyword) {
                    score = score.max(EXACT_PHRASE_SCORE);
                } else {
                    score = score.max(fuzzy::partial_ratio(keyword, content_head) * FUZZY_CONTENT_PENALTY);
                }
            }

            if title_pattern_matches(doc_type, title_head) {
                score = score.max(TITLE_PATTERN_SCORE);
            }

            if score > best_score {
                best_score = score;
                best_type = doc_type;
            }
        }

        let confidence = (best_score / 100.0).min(1.0);
        Classification {
            doc_type: if confidence >= MIN_RULE_CONFIDENCE {
                best_type
            } else {
                DocType::Unknown
            },
            confidence,
            method: ClassificationMethod::RuleBased,
        }
    }

    async fn classify_llm(&self, filename: &str, text: &str) -> Classification {
        let context = self
            .knowledge
            .search(
                &format!("ADGM document types classification {filename}"),
                CONTEXT_PASSAGES,
            )
            .await
            .into_iter()
            .map(|p| p.content)
            .collect::<Vec<_>>()
            .join("\n");

        let labels = DocType::CLASSIFIABLE
            .iter()
            .map(|t| t.as_str())
            .collect::<Vec<_>>()
            .join(", ");

        let prompt = format!(
            "Classify this ADGM corporate document into one of these types:\n{labels}\n\n\
             Context from ADGM regulations:\n{context}\n\n\
             Document filename: {filename}\n\
             Document content (first {CONTENT_SCAN_CHARS} chars):\n{}\n\n\
             Respond with just the document type from the list above, or \"Unknown\" if unclear.",
            truncate_chars(text, CONTENT_SCAN_CHARS)
        );

        let messages = [Message::system(SYSTEM_PROMPT), Message::user(prompt)];

        match self.provider.chat(&messages).await {
            Ok(response) => {
                let doc_type = extract_doc_type(&response);
                let confidence = if doc_type == DocType::Unknown {
                    LLM_UNKNOWN_CONFIDENCE
                } else {
                    LLM_CONFIDENCE
                };
                Classification {
                    doc_type,
                    confidence,
                    method: ClassificationMethod::LlmAssisted,
                }
            }
            Err(e) => {
                tracing::error!("LLM classification failed for {filename}: {e}");
                Classification {
                    doc_type: DocType::Unknown,
                    confidence: LLM_FAILED_CONFIDENCE,
                    method: ClassificationMethod::LlmFailed,
                }
            }
        }
    }
}

fn title_pattern_matches(doc_type: DocType, title_head: &str) -> bool {
    TITLE_PATTERNS
        .iter()
        .any(|(ty, re)| *ty == doc_type && re.is_match(title_head))
}

/// Map an LLM reply onto the closed label set: exact label containment first,
/// then all-words containment. Anything else is `Unknown`.
fn extract_doc_type(response: &str) -> DocType {
    let response_lower = response.to_lowercase();

    for doc_type in DocType::CLASSIFIABLE {
        if response_lower.contains(&doc_type.as_str().to_lowercase()) {
            return doc_type;
        }
    }

    for doc_type in DocType::CLASSIFIABLE {
        let label = doc_type.as_str().to_lowercase();
        if label.split_whitespace().all(|w| response_lower.contains(w)) {
            return doc_type;
        }
    }

    DocType::Unknown
}

fn truncate_chars(s: &str, n: usize) -> &str {
    match s.char_indices().nth(n) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
