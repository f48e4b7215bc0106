//! Closed data model shared across the pipeline stages.

use std::fmt;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Corporate document types recognized by the classifier.
///
/// `BusinessPlan` appears only in process checklists; the classifier never
/// emits it because business plans are filed as part of a licensing package.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DocType {
    #[serde(rename = "Articles of Association")]
    ArticlesOfAssociation,
    #[serde(rename = "Memorandum of Association")]
    MemorandumOfAssociation,
    #[serde(rename = "Board Resolution")]
    BoardResolution,
    #[serde(rename = "Shareholder Resolution")]
    ShareholderResolution,
    #[serde(rename = "Incorporation Application")]
    IncorporationApplication,
    #[serde(rename = "UBO Declaration")]
    UboDeclaration,
    #[serde(rename = "Register of Members")]
    RegisterOfMembers,
    #[serde(rename = "Register of Directors")]
    RegisterOfDirectors,
    #[serde(rename = "Register of Members and Directors")]
    RegisterOfMembersAndDirectors,
    #[serde(rename = "Change of Registered Address Notice")]
    ChangeOfRegisteredAddressNotice,
    #[serde(rename = "Employment Contract")]
    EmploymentContract,
    #[serde(rename = "Compliance Policy")]
    CompliancePolicy,
    #[serde(rename = "Commercial Agreement")]
    CommercialAgreement,
    #[serde(rename = "Licensing Filing")]
    LicensingFiling,
    #[serde(rename = "Business Plan")]
    BusinessPlan,
    Unknown,
}

impl DocType {
    /// The labels the classifier may assign.
    pub const CLASSIFIABLE: [DocType; 14] = [
        DocType::ArticlesOfAssociation,
        DocType::MemorandumOfAssociation,
        DocType::BoardResolution,
        DocType::ShareholderResolution,
        DocType::IncorporationApplication,
        DocType::UboDeclaration,
        DocType::RegisterOfMembers,
        DocType::RegisterOfDirectors,
        DocType::RegisterOfMembersAndDirectors,
        DocType::ChangeOfRegisteredAddressNotice,
        DocType::EmploymentContract,
        DocType::CompliancePolicy,
        DocType::CommercialAgreement,
        DocType::LicensingFiling,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            DocType::ArticlesOfAssociation => "Articles of Association",
            DocType::MemorandumOfAssociation => "Memorandum of Association",
            DocType::BoardResolution => "Board Resolution",
            DocType::ShareholderResolution => "Shareholder Resolution",
            DocType::IncorporationApplication => "Incorporation Application",
            DocType::UboDeclaration => "UBO Declaration",
            DocType::RegisterOfMembers => "Register of Members",
            DocType::RegisterOfDirectors => "Register of Directors",
            DocType::RegisterOfMembersAndDirectors => "Register of Members and Directors",
            DocType::ChangeOfRegisteredAddressNotice => "Change of Registered Address Notice",
            DocType::EmploymentContract => "Employment Contract",
            DocType::CompliancePolicy => "Compliance Policy",
            DocType::CommercialAgreement => "Commercial Agreement",
            DocType::LicensingFiling => "Licensing Filing",
            DocType::BusinessPlan => "Business Plan",
            DocType::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for DocType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassificationMethod {
    RuleBased,
    LlmAssisted,
    LlmFailed,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Classification {
    #[serde(rename = "type")]
    pub doc_type: DocType,
    pub confidence: f64,
    pub method: ClassificationMethod,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct DocMetadata {
    pub title: Option<String>,
    /// Author from source format metadata; plain text carries none.
    pub author: Option<String>,
    pub paragraphs: usize,
    pub tables: usize,
    pub created: Option<DateTime<Utc>>,
}

/// A document after text extraction, before classification.
#[derive(Clone, Debug)]
pub struct RawDocument {
    pub path: PathBuf,
    pub name: String,
    pub text: String,
    pub metadata: DocMetadata,
}

#[derive(Clone, Debug)]
pub struct ClassifiedDocument {
    pub doc: RawDocument,
    pub classification: Classification,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Process {
    #[serde(rename = "Company Incorporation")]
    CompanyIncorporation,
    Licensing,
    #[serde(rename = "Employment/HR")]
    EmploymentHr,
    Unknown,
}

impl fmt::Display for Process {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Process::CompanyIncorporation => "Company Incorporation",
            Process::Licensing => "Licensing",
            Process::EmploymentHr => "Employment/HR",
            Process::Unknown => "Unknown",
        };
        f.write_str(s)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntityType {
    #[serde(rename = "Private Company Limited by Shares")]
    LimitedByShares,
    #[serde(rename = "Private Company Limited by Guarantee")]
    LimitedByGuarantee,
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EntityType::LimitedByShares => "Private Company Limited by Shares",
            EntityType::LimitedByGuarantee => "Private Company Limited by Guarantee",
        };
        f.write_str(s)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProcessInfo {
    pub process: Process,
    pub entity_type: Option<EntityType>,
    pub confidence: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChecklistStatus {
    Complete,
    Incomplete,
    UnknownProcess,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChecklistResult {
    pub status: ChecklistStatus,
    pub required_documents: Vec<DocType>,
    pub present_documents: Vec<DocType>,
    pub missing_documents: Vec<DocType>,
    pub completeness_score: f64,
    pub total_required: usize,
    pub total_present: usize,
}

impl ChecklistResult {
    #[must_use]
    pub fn unknown_process() -> Self {
        Self {
            status: ChecklistStatus::UnknownProcess,
            required_documents: Vec::new(),
            present_documents: Vec::new(),
            missing_documents: Vec::new(),
            completeness_score: 0.0,
            total_required: 0,
            total_present: 0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    High,
    Medium,
    Low,
}

impl Severity {
    /// Sort rank: `High` sorts before `Medium` before `Low`.
    #[must_use]
    pub fn rank(self) -> u8 {
        match self {
            Severity::High => 0,
            Severity::Medium => 1,
            Severity::Low => 2,
        }
    }

    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "high" => Some(Severity::High),
            "medium" => Some(Severity::Medium),
            "low" => Some(Severity::Low),
            _ => None,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Severity::High => "High",
            Severity::Medium => "Medium",
            Severity::Low => "Low",
        };
        f.write_str(s)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Issue {
    pub document: DocType,
    pub section: String,
    pub issue: String,
    pub severity: Severity,
    pub citations: Vec<String>,
    pub suggestion: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<(usize, usize)>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DocumentSummary {
    pub filename: String,
    pub detected_type: DocType,
    pub confidence: f64,
    pub classification_method: ClassificationMethod,
}

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize)]
pub struct IssueCounts {
    #[serde(rename = "High")]
    pub high: usize,
    #[serde(rename = "Medium")]
    pub medium: usize,
    #[serde(rename = "Low")]
    pub low: usize,
}

impl IssueCounts {
    #[must_use]
    pub fn total(self) -> usize {
        self.high + self.medium + self.low
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Report {
    pub analysis_timestamp: DateTime<Utc>,
    pub process_detected: Process,
    pub entity_type: Option<EntityType>,
    pub process_confidence: f64,
    pub documents_uploaded: usize,
    pub document_summary: Vec<DocumentSummary>,
    pub checklist_status: ChecklistStatus,
    pub required_documents: Vec<DocType>,
    pub present_documents: Vec<DocType>,
    pub missing_documents: Vec<DocType>,
    pub completeness_score: f64,
    pub total_issues: usize,
    pub issues_by_severity: IssueCounts,
    pub issues_found: Vec<Issue>,
    pub recommendations: Vec<String>,
    pub overall_compliance_score: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn doc_type_serializes_to_display_name() {
        let json = serde_json::to_string(&DocType::UboDeclaration).unwrap();
        assert_eq!(json, "\"UBO Declaration\"");
        let back: DocType = serde_json::from_str(&json).unwrap();
        assert_eq!(back, DocType::UboDeclaration);
    }

    #[test]
    fn classifiable_excludes_business_plan_and_unknown() {
        assert!(!DocType::CLASSIFIABLE.contains(&DocType::BusinessPlan));
        assert!(!DocType::CLASSIFIABLE.contains(&DocType::Unknown));
        assert_eq!(DocType::CLASSIFIABLE.len(), 14);
    }

    #[test]
    fn severity_rank_orders_high_first() {
        assert!(Severity::High.rank() < Severity::Medium.rank());
        assert!(Severity::Medium.rank() < Severity::Low.rank());
    }

    #[test]
    fn severity_parse_is_case_insensitive() {
        assert_eq!(Severity::parse(" HIGH "), Some(Severity::High));
        assert_eq!(Severity::parse("medium"), Some(Severity::Medium));
        assert_eq!(Severity::parse("critical"), None);
    }

    #[test]
    fn method_serializes_snake_case() {
        let json = serde_json::to_string(&ClassificationMethod::RuleBased).unwrap();
        assert_eq!(json, "\"rule_based\"");
    }
}
