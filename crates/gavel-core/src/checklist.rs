//! Process inference and document checklist validation.

use std::collections::HashSet;
use std::fmt::Write as _;

use crate::types::{
    ChecklistResult, ChecklistStatus, ClassifiedDocument, DocType, EntityType, Process,
    ProcessInfo,
};

/// How many incorporation indicators must be present before the set is
/// treated as a Company Incorporation filing.
const MIN_INCORPORATION_INDICATORS: usize = 3;

const INCORPORATION_CONFIDENCE: f64 = 0.9;
const SINGLE_INDICATOR_CONFIDENCE: f64 = 0.8;
const UNKNOWN_PROCESS_CONFIDENCE: f64 = 0.3;

pub const DEFAULT_PRESENCE_THRESHOLD: f64 = 0.5;

const INCORPORATION_INDICATORS: [DocType; 6] = [
    DocType::ArticlesOfAssociation,
    DocType::MemorandumOfAssociation,
    DocType::IncorporationApplication,
    DocType::UboDeclaration,
    DocType::RegisterOfMembers,
    DocType::RegisterOfDirectors,
];

// The incorporation package is identical for both private company subtypes.
const INCORPORATION_REQUIRED: [DocType; 7] = [
    DocType::ArticlesOfAssociation,
    DocType::MemorandumOfAssociation,
    DocType::IncorporationApplication,
    DocType::UboDeclaration,
    DocType::RegisterOfMembers,
    DocType::RegisterOfDirectors,
    DocType::BoardResolution,
];

const LICENSING_REQUIRED: [DocType; 2] = [DocType::LicensingFiling, DocType::BusinessPlan];

const EMPLOYMENT_REQUIRED: [DocType; 1] = [DocType::EmploymentContract];

#[derive(Clone, Debug)]
pub struct ChecklistValidator {
    presence_threshold: f64,
}

impl Default for ChecklistValidator {
    fn default() -> Self {
        Self::new(DEFAULT_PRESENCE_THRESHOLD)
    }
}

impl ChecklistValidator {
    #[must_use]
    pub fn new(presence_threshold: f64) -> Self {
        Self { presence_threshold }
    }

    /// Infer the legal process from the classified document set.
    ///
    /// The cascade is ordered: enough incorporation indicators beat the
    /// single-document licensing and employment signals.
    #[must_use]
    pub fn infer_process(&self, documents: &[ClassifiedDocument]) -> ProcessInfo {
        let doc_types: HashSet<DocType> = documents
            .iter()
            .map(|d| d.classification.doc_type)
            .collect();

        let indicators = INCORPORATION_INDICATORS
            .iter()
            .filter(|t| doc_types.contains(t))
            .count();

        if indicators >= MIN_INCORPORATION_INDICATORS {
            return ProcessInfo {
                process: Process::CompanyIncorporation,
                entity_type: Some(infer_entity_type(documents)),
                confidence: INCORPORATION_CONFIDENCE,
            };
        }

        if doc_types.contains(&DocType::LicensingFiling) {
            return ProcessInfo {
                process: Process::Licensing,
                entity_type: None,
                confidence: SINGLE_INDICATOR_CONFIDENCE,
            };
        }

        if doc_types.contains(&DocType::EmploymentContract) {
            return ProcessInfo {
                process: Process::EmploymentHr,
                entity_type: None,
                confidence: SINGLE_INDICATOR_CONFIDENCE,
            };
        }

        ProcessInfo {
            process: Process::Unknown,
            entity_type: None,
            confidence: UNKNOWN_PROCESS_CONFIDENCE,
        }
    }

    /// Validate the document set against the required checklist for the
    /// inferred process.
    #[must_use]
    pub fn validate(
        &self,
        documents: &[ClassifiedDocument],
        process_info: &ProcessInfo,
    ) -> ChecklistResult {
        let required: &[DocType] = match process_info.process {
            Process::CompanyIncorporation => &INCORPORATION_REQUIRED,
            Process::Licensing => &LICENSING_REQUIRED,
            Process::EmploymentHr => &EMPLOYMENT_REQUIRED,
            Process::Unknown => return ChecklistResult::unknown_process(),
        };

        let mut present: HashSet<DocType> = documents
            .iter()
            .filter(|d| d.classification.confidence >= self.presence_threshold)
            .map(|d| d.classification.doc_type)
            .collect();

        // A combined register satisfies both individual register requirements.
        if present.contains(&DocType::RegisterOfMembersAndDirectors) {
            if required.contains(&DocType::RegisterOfMembers) {
                present.insert(DocType::RegisterOfMembers);
            }
            if required.contains(&DocType::RegisterOfDirectors) {
                present.insert(DocType::RegisterOfDirectors);
            }
        }

        // Either resolution type satisfies the board resolution requirement.
        if present.contains(&DocType::BoardResolution)
            || present.contains(&DocType::ShareholderResolution)
        {
            present.insert(DocType::BoardResolution);
        }

        // Keep the requirement table's order so output is deterministic.
        let present_documents: Vec<DocType> = required
            .iter()
            .copied()
            .filter(|t| present.contains(t))
            .collect();
        let missing_documents: Vec<DocType> = required
            .iter()
            .copied()
            .filter(|t| !present.contains(t))
            .collect();

        #[expect(clippy::cast_precision_loss)]
        let completeness_score = if required.is_empty() {
            1.0
        } else {
            (required.len() - missing_documents.len()) as f64 / required.len() as f64
        };

        ChecklistResult {
            status: if missing_documents.is_empty() {
                ChecklistStatus::Complete
            } else {
                ChecklistStatus::Incomplete
            },
            required_documents: required.to_vec(),
            total_required: required.len(),
            total_present: present_documents.len(),
            present_documents,
            missing_documents,
            completeness_score,
        }
    }

    /// Human-readable checklist summary.
    #[must_use]
    pub fn checklist_message(process_info: &ProcessInfo, result: &ChecklistResult) -> String {
        if result.status == ChecklistStatus::Complete {
            return format!(
                "All required documents for {} are present.",
                process_info.process
            );
        }

        let mut message = format!("Document checklist for {}", process_info.process);
        if let Some(entity) = process_info.entity_type {
            let _ = write!(message, " ({entity})");
        }
        let _ = write!(
            message,
            ": {} of {} required documents uploaded.\n\n",
            result.total_present, result.total_required
        );

        if !result.missing_documents.is_empty() {
            message.push_str("Missing documents:\n");
            for doc in &result.missing_documents {
                let _ = writeln!(message, "- {doc}");
            }
        }

        message
    }
}

/// Look for entity-type clues in the combined document text.
/// Shares is the default when nothing indicates a guarantee company.
fn infer_entity_type(documents: &[ClassifiedDocument]) -> EntityType {
    let all_text = documents
        .iter()
        .map(|d| d.doc.text.as_str())
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();

    if all_text.contains("limited by guarantee") || all_text.contains("guarantee") {
        EntityType::LimitedByGuarantee
    } else {
        EntityType::LimitedByShares
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Classification, ClassificationMethod, DocMetadata, RawDocument};

    fn classified(doc_type: DocType, confidence: f64, text: &str) -> ClassifiedDocument {
        ClassifiedDocument {
            doc: RawDocument {
                path: "test.txt".into(),
                name: "test.txt".into(),
                text: text.to_owned(),
                metadata: DocMetadata::default(),
            },
            classification: Classification {
                doc_type,
                confidence,
                method: ClassificationMethod::RuleBased,
            },
        }
    }

    fn docs(types: &[DocType]) -> Vec<ClassifiedDocument> {
        types.iter().map(|&t| classified(t, 0.9, "")).collect()
    }

    #[test]
    fn three_indicators_infer_incorporation() {
        let validator = ChecklistValidator::default();
        let info = validator.infer_process(&docs(&[
            DocType::ArticlesOfAssociation,
            DocType::MemorandumOfAssociation,
            DocType::UboDeclaration,
        ]));
        assert_eq!(info.process, Process::CompanyIncorporation);
        assert!((info.confidence - 0.9).abs() < 1e-9);
        assert_eq!(info.entity_type, Some(EntityType::LimitedByShares));
    }

    #[test]
    fn two_indicators_are_not_enough() {
        let validator = ChecklistValidator::default();
        let info = validator.infer_process(&docs(&[
            DocType::ArticlesOfAssociation,
            DocType::MemorandumOfAssociation,
        ]));
        assert_eq!(info.process, Process::Unknown);
    }

    #[test]
    fn guarantee_wording_sets_entity_type() {
        let validator = ChecklistValidator::default();
        let documents = vec![
            classified(DocType::ArticlesOfAssociation, 0.9, "limited by guarantee"),
            classified(DocType::MemorandumOfAssociation, 0.9, ""),
            classified(DocType::UboDeclaration, 0.9, ""),
        ];
        let info = validator.infer_process(&documents);
        assert_eq!(info.entity_type, Some(EntityType::LimitedByGuarantee));
    }

    #[test]
    fn licensing_filing_infers_licensing() {
        let validator = ChecklistValidator::default();
        let info = validator.infer_process(&docs(&[DocType::LicensingFiling]));
        assert_eq!(info.process, Process::Licensing);
        assert!((info.confidence - 0.8).abs() < 1e-9);
        assert_eq!(info.entity_type, None);
    }

    #[test]
    fn employment_contract_infers_employment() {
        let validator = ChecklistValidator::default();
        let info = validator.infer_process(&docs(&[DocType::EmploymentContract]));
        assert_eq!(info.process, Process::EmploymentHr);
    }

    #[test]
    fn unknown_process_scores_zero_completeness() {
        let validator = ChecklistValidator::default();
        let info = validator.infer_process(&docs(&[DocType::CompliancePolicy]));
        let result = validator.validate(&docs(&[DocType::CompliancePolicy]), &info);
        assert_eq!(result.status, ChecklistStatus::UnknownProcess);
        assert!(result.completeness_score.abs() < 1e-9);
    }

    #[test]
    fn five_of_seven_incorporation_documents() {
        let validator = ChecklistValidator::default();
        let documents = docs(&[
            DocType::ArticlesOfAssociation,
            DocType::MemorandumOfAssociation,
            DocType::IncorporationApplication,
            DocType::UboDeclaration,
            DocType::RegisterOfMembers,
        ]);
        let info = validator.infer_process(&documents);
        let result = validator.validate(&documents, &info);
        assert_eq!(result.status, ChecklistStatus::Incomplete);
        assert_eq!(result.total_present, 5);
        assert_eq!(result.total_required, 7);
        assert_eq!(
            result.missing_documents,
            vec![DocType::RegisterOfDirectors, DocType::BoardResolution]
        );
        assert!((result.completeness_score - 5.0 / 7.0).abs() < 1e-9);
    }

    #[test]
    fn combined_register_satisfies_both_registers() {
        let validator = ChecklistValidator::default();
        let documents = docs(&[
            DocType::ArticlesOfAssociation,
            DocType::MemorandumOfAssociation,
            DocType::IncorporationApplication,
            DocType::UboDeclaration,
            DocType::RegisterOfMembersAndDirectors,
            DocType::BoardResolution,
        ]);
        let info = validator.infer_process(&documents);
        let result = validator.validate(&documents, &info);
        assert_eq!(result.status, ChecklistStatus::Complete);
        assert!(result.present_documents.contains(&DocType::RegisterOfMembers));
        assert!(result.present_documents.contains(&DocType::RegisterOfDirectors));
    }

    #[test]
    fn shareholder_resolution_satisfies_board_resolution() {
        let validator = ChecklistValidator::default();
        let documents = docs(&[
            DocType::ArticlesOfAssociation,
            DocType::MemorandumOfAssociation,
            DocType::IncorporationApplication,
            DocType::UboDeclaration,
            DocType::RegisterOfMembers,
            DocType::RegisterOfDirectors,
            DocType::ShareholderResolution,
        ]);
        let info = validator.infer_process(&documents);
        let result = validator.validate(&documents, &info);
        assert_eq!(result.status, ChecklistStatus::Complete);
        assert!((result.completeness_score - 1.0).abs() < 1e-9);
    }

    #[test]
    fn low_confidence_documents_do_not_count_as_present() {
        let validator = ChecklistValidator::default();
        let mut documents = docs(&[
            DocType::ArticlesOfAssociation,
            DocType::MemorandumOfAssociation,
            DocType::UboDeclaration,
        ]);
        documents.push(classified(DocType::BoardResolution, 0.3, ""));
        let info = validator.infer_process(&documents);
        let result = validator.validate(&documents, &info);
        assert!(result.missing_documents.contains(&DocType::BoardResolution));
    }

    #[test]
    fn checklist_message_lists_missing() {
        let validator = ChecklistValidator::default();
        let documents = docs(&[
            DocType::ArticlesOfAssociation,
            DocType::MemorandumOfAssociation,
            DocType::UboDeclaration,
        ]);
        let info = validator.infer_process(&documents);
        let result = validator.validate(&documents, &info);
        let message = ChecklistValidator::checklist_message(&info, &result);
        assert!(message.contains("3 of 7 required documents uploaded"));
        assert!(message.contains("- Board Resolution"));
    }

    #[test]
    fn complete_checklist_message() {
        let info = ProcessInfo {
            process: Process::EmploymentHr,
            entity_type: None,
            confidence: 0.8,
        };
        let validator = ChecklistValidator::default();
        let result = validator.validate(&docs(&[DocType::EmploymentContract]), &info);
        let message = ChecklistValidator::checklist_message(&info, &result);
        assert_eq!(
            message,
            "All required documents for Employment/HR are present."
        );
    }
}
