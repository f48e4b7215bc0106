//! Rule-based and LLM-assisted compliance issue detection.

use std::sync::Arc;
use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

use gavel_llm::{LlmProvider, Message};
use gavel_rag::KnowledgeStore;

use crate::classifier::SYSTEM_PROMPT;
use crate::types::{ClassifiedDocument, DocType, Issue, Severity};

const CONTEXT_PASSAGES: usize = 3;
const SEMANTIC_SCAN_CHARS: usize = 3000;

#[derive(Debug, Error)]
pub enum RuleError {
    #[error("invalid pattern: {0}")]
    Pattern(#[from] regex::Error),
}

type RuleFn = fn(&ClassifiedDocument) -> Result<Vec<Issue>, RuleError>;

const RULES: [(&str, RuleFn); 7] = [
    ("jurisdiction", check_jurisdiction),
    ("registered_office", check_registered_office),
    ("articles_sections", check_articles_sections),
    ("signatory_blocks", check_signatory_blocks),
    ("ubo_particulars", check_ubo_particulars),
    ("binding_language", check_binding_language),
    ("adgm_references", check_adgm_references),
];

const BAD_COURTS: [&str; 5] = [
    "uae federal courts",
    "dubai courts",
    "abu dhabi courts",
    "federal courts of uae",
    "courts of dubai",
];

static ADGM_COURTS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)adgm\s+courts?|abu dhabi global market.*courts?").expect("valid pattern")
});

static ADGM_REF_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)adgm|abu dhabi global market").expect("valid pattern"));

static SIGNATURE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)signature|signed|witness|date.*sign|sign.*date").expect("valid pattern")
});

static WEAK_LANGUAGE_RES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)\bmay\s+(?:be|do|have)",
        r"(?i)\bshould\s+(?:be|do|have)",
        r"(?i)\bmight\s+(?:be|do|have)",
        r"(?i)\bcould\s+(?:be|do|have)",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("valid pattern"))
    .collect()
});

static LLM_ISSUE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"ISSUE:\s*(.+)").expect("valid pattern"));
static LLM_SEVERITY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"SEVERITY:\s*(\w+)").expect("valid pattern"));
static LLM_SUGGESTION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"SUGGESTION:\s*(.+)").expect("valid pattern"));

pub struct RedFlagDetector<P, K> {
    provider: Arc<P>,
    knowledge: Arc<K>,
    rules: Vec<(&'static str, RuleFn)>,
}

impl<P, K> Clone for RedFlagDetector<P, K> {
    fn clone(&self) -> Self {
        Self {
            provider: Arc::clone(&self.provider),
            knowledge: Arc::clone(&self.knowledge),
            rules: self.rules.clone(),
        }
    }
}

impl<P, K> std::fmt::Debug for RedFlagDetector<P, K> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedFlagDetector")
            .field("rules", &self.rules.len())
            .finish_non_exhaustive()
    }
}

impl<P: LlmProvider, K: KnowledgeStore> RedFlagDetector<P, K> {
    #[must_use]
    pub fn new(provider: Arc<P>, knowledge: Arc<K>) -> Self {
        Self {
            provider,
            knowledge,
            rules: RULES.to_vec(),
        }
    }

    #[cfg(test)]
    fn with_rules(provider: Arc<P>, knowledge: Arc<K>, rules: Vec<(&'static str, RuleFn)>) -> Self {
        Self {
            provider,
            knowledge,
            rules,
        }
    }

    /// Run all rule checks, then the semantic check for critical documents.
    pub async fn detect(&self, document: &ClassifiedDocument) -> Vec<Issue> {
        let mut issues = self.detect_rules(document);
        if is_critical(document.classification.doc_type) {
            issues.extend(self.semantic_check(document).await);
        }
        issues
    }

    /// Rule checks only. A failing rule is logged and skipped; the others
    /// still run.
    #[must_use]
    pub fn detect_rules(&self, document: &ClassifiedDocument) -> Vec<Issue> {
        let mut issues = Vec::new();
        for (name, rule) in &self.rules {
            match rule(document) {
                Ok(found) => issues.extend(found),
                Err(e) => tracing::error!("rule check {name} failed on {}: {e}", document.doc.name),
            }
        }
        issues
    }

    async fn semantic_check(&self, document: &ClassifiedDocument) -> Vec<Issue> {
        let doc_type = document.classification.doc_type;
        let context = self
            .knowledge
            .search(
                &format!("ADGM compliance requirements {doc_type}"),
                CONTEXT_PASSAGES,
            )
            .await
            .into_iter()
            .map(|p| p.content)
            .collect::<Vec<_>>()
            .join("\n");

        let prompt = format!(
            "Analyze this ADGM {doc_type} for compliance issues:\n\n\
             ADGM Regulatory Context:\n{context}\n\n\
             Document Content:\n{}\n\n\
             Identify any compliance issues, missing clauses, or regulatory violations.\n\
             Focus on ADGM-specific requirements.\n\n\
             Respond in this format:\n\
             ISSUE: [description]\n\
             SEVERITY: [High/Medium/Low]\n\
             SUGGESTION: [how to fix]\n\
             ---",
            truncate_chars(&document.doc.text, SEMANTIC_SCAN_CHARS)
        );

        let messages = [Message::system(SYSTEM_PROMPT), Message::user(prompt)];

        match self.provider.chat(&messages).await {
            Ok(response) => parse_llm_issues(&response, doc_type),
            Err(e) => {
                tracing::error!("semantic check failed for {}: {e}", document.doc.name);
                Vec::new()
            }
        }
    }
}

fn is_critical(doc_type: DocType) -> bool {
    matches!(
        doc_type,
        DocType::ArticlesOfAssociation
            | DocType::MemorandumOfAssociation
            | DocType::UboDeclaration
            | DocType::CommercialAgreement
    )
}

fn check_jurisdiction(document: &ClassifiedDocument) -> Result<Vec<Issue>, RuleError> {
    let mut issues = Vec::new();
    let text = &document.doc.text;
    let doc_type = document.classification.doc_type;

    for court in BAD_COURTS {
        let re = Regex::new(&format!("(?i){}", regex::escape(court)))?;
        if let Some(m) = re.find(text) {
            issues.push(Issue {
                document: doc_type,
                section: "Jurisdiction clause".into(),
                issue: format!("References {court} instead of ADGM Courts"),
                severity: Severity::High,
                citations: vec!["ADGM Courts Framework".into()],
                suggestion: "Update jurisdiction to reference ADGM Courts exclusively.".into(),
                location: Some((m.start(), m.end())),
            });
        }
    }

    let key_docs = matches!(
        doc_type,
        DocType::ArticlesOfAssociation
            | DocType::MemorandumOfAssociation
            | DocType::CommercialAgreement
    );
    if key_docs && !ADGM_COURTS_RE.is_match(text) {
        issues.push(Issue {
            document: doc_type,
            section: "Jurisdiction clause".into(),
            issue: "Missing explicit ADGM Courts jurisdiction reference".into(),
            severity: Severity::High,
            citations: vec!["ADGM Courts Framework".into()],
            suggestion: "Include clause specifying ADGM Courts jurisdiction.".into(),
            location: None,
        });
    }

    Ok(issues)
}

fn check_registered_office(document: &ClassifiedDocument) -> Result<Vec<Issue>, RuleError> {
    let doc_type = document.classification.doc_type;
    let applies = matches!(
        doc_type,
        DocType::ArticlesOfAssociation | DocType::IncorporationApplication
    );
    if !applies || ADGM_REF_RE.is_match(&document.doc.text) {
        return Ok(Vec::new());
    }

    Ok(vec![Issue {
        document: doc_type,
        section: "Registered office".into(),
        issue: "Registered office address must be within ADGM".into(),
        severity: Severity::High,
        citations: vec!["ADGM Companies Regulations 2020, Section 6(4)(a)".into()],
        suggestion: "Specify a registered office address within ADGM jurisdiction.".into(),
        location: None,
    }])
}

fn check_articles_sections(document: &ClassifiedDocument) -> Result<Vec<Issue>, RuleError> {
    if document.classification.doc_type != DocType::ArticlesOfAssociation {
        return Ok(Vec::new());
    }

    const SECTIONS: [(&str, &[&str]); 5] = [
        ("objects", &["objects", "purpose", "business"]),
        ("share capital", &["share capital", "capital", "shares"]),
        ("directors", &["directors", "board"]),
        ("meetings", &["meetings", "general meeting"]),
        ("transfers", &["transfer", "transmission"]),
    ];

    let text = document.doc.text.to_lowercase();
    let mut issues = Vec::new();

    for (section, keywords) in SECTIONS {
        if !keywords.iter().any(|k| text.contains(k)) {
            issues.push(Issue {
                document: DocType::ArticlesOfAssociation,
                section: format!("{} provisions", title_case(section)),
                issue: format!("Missing or unclear {section} provisions"),
                severity: Severity::Medium,
                citations: vec!["ADGM Model Articles Requirements".into()],
                suggestion: format!("Include clear provisions regarding {section}."),
                location: None,
            });
        }
    }

    Ok(issues)
}

fn check_signatory_blocks(document: &ClassifiedDocument) -> Result<Vec<Issue>, RuleError> {
    let doc_type = document.classification.doc_type;
    let applies = matches!(
        doc_type,
        DocType::ArticlesOfAssociation
            | DocType::MemorandumOfAssociation
            | DocType::BoardResolution
            | DocType::ShareholderResolution
            | DocType::CommercialAgreement
            | DocType::EmploymentContract
    );
    if !applies || SIGNATURE_RE.is_match(&document.doc.text) {
        return Ok(Vec::new());
    }

    Ok(vec![Issue {
        document: doc_type,
        section: "Execution block".into(),
        issue: "Missing signature block or execution provisions".into(),
        severity: Severity::Medium,
        citations: vec!["ADGM Document Execution Requirements".into()],
        suggestion: "Include proper signature blocks with name, title, and date.".into(),
        location: None,
    }])
}

fn check_ubo_particulars(document: &ClassifiedDocument) -> Result<Vec<Issue>, RuleError> {
    if document.classification.doc_type != DocType::UboDeclaration {
        return Ok(Vec::new());
    }

    const FIELDS: [(&str, &[&str]); 6] = [
        ("name", &["name", "full name"]),
        ("birth", &["date of birth", "birth", "born"]),
        ("nationality", &["nationality", "citizen"]),
        ("address", &["address", "residential"]),
        ("passport", &["passport", "identity", "id number"]),
        ("ownership", &["ownership", "beneficial", "control", "shares"]),
    ];

    let text = document.doc.text.to_lowercase();
    let missing: Vec<&str> = FIELDS
        .iter()
        .filter(|(_, keywords)| !keywords.iter().any(|k| text.contains(k)))
        .map(|(field, _)| *field)
        .collect();

    if missing.is_empty() {
        return Ok(Vec::new());
    }

    Ok(vec![Issue {
        document: DocType::UboDeclaration,
        section: "Required particulars".into(),
        issue: format!("Missing required UBO particulars: {}", missing.join(", ")),
        severity: Severity::High,
        citations: vec!["ADGM Beneficial Ownership Regulations 2022".into()],
        suggestion: "Include all required UBO particulars as per ADGM regulations.".into(),
        location: None,
    }])
}

fn check_binding_language(document: &ClassifiedDocument) -> Result<Vec<Issue>, RuleError> {
    let doc_type = document.classification.doc_type;
    let applies = matches!(
        doc_type,
        DocType::ArticlesOfAssociation
            | DocType::MemorandumOfAssociation
            | DocType::CommercialAgreement
            | DocType::EmploymentContract
    );
    if !applies {
        return Ok(Vec::new());
    }

    let mut issues = Vec::new();
    for re in WEAK_LANGUAGE_RES.iter() {
        for m in re.find_iter(&document.doc.text) {
            issues.push(Issue {
                document: doc_type,
                section: "Language clarity".into(),
                issue: format!("Potentially non-binding language: \"{}\"", m.as_str()),
                severity: Severity::Low,
                citations: vec!["Legal Drafting Best Practices".into()],
                suggestion: "Consider using \"shall\", \"must\", or \"will\" for binding obligations."
                    .into(),
                location: Some((m.start(), m.end())),
            });
        }
    }

    Ok(issues)
}

fn check_adgm_references(document: &ClassifiedDocument) -> Result<Vec<Issue>, RuleError> {
    let doc_type = document.classification.doc_type;
    let applies = matches!(
        doc_type,
        DocType::ArticlesOfAssociation
            | DocType::MemorandumOfAssociation
            | DocType::IncorporationApplication
    );
    let text = document.doc.text.to_lowercase();
    if !applies || text.contains("adgm") || text.contains("abu dhabi global market") {
        return Ok(Vec::new());
    }

    Ok(vec![Issue {
        document: doc_type,
        section: "ADGM references".into(),
        issue: "Document does not clearly reference ADGM jurisdiction".into(),
        severity: Severity::Medium,
        citations: vec!["ADGM Registration Requirements".into()],
        suggestion: "Include clear references to ADGM as the governing jurisdiction.".into(),
        location: None,
    }])
}

/// Parse `ISSUE:` / `SEVERITY:` / `SUGGESTION:` blocks separated by `---`.
/// Unparseable severity defaults to Medium.
fn parse_llm_issues(response: &str, doc_type: DocType) -> Vec<Issue> {
    let mut issues = Vec::new();

    for section in response.split("---") {
        let Some(caps) = LLM_ISSUE_RE.captures(section) else {
            continue;
        };
        let severity = LLM_SEVERITY_RE
            .captures(section)
            .and_then(|c| Severity::parse(&c[1]))
            .unwrap_or(Severity::Medium);
        let suggestion = LLM_SUGGESTION_RE
            .captures(section)
            .map(|c| c[1].trim().to_owned())
            .unwrap_or_default();

        issues.push(Issue {
            document: doc_type,
            section: "LLM Analysis".into(),
            issue: caps[1].trim().to_owned(),
            severity,
            citations: vec!["LLM Semantic Analysis".into()],
            suggestion,
            location: None,
        });
    }

    issues
}

fn title_case(s: &str) -> String {
    s.split_whitespace()
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn truncate_chars(s: &str, n: usize) -> &str {
    match s.char_indices().nth(n) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
