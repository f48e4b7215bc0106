//! Report aggregation and compliance scoring.

use chrono::Utc;

use crate::types::{
    ChecklistResult, ClassifiedDocument, DocumentSummary, Issue, IssueCounts, ProcessInfo, Report,
    Severity,
};

/// Checklist completeness carries 60% of the score, issues the other 40%.
const COMPLETENESS_WEIGHT: f64 = 60.0;
const ISSUE_WEIGHT: f64 = 40.0;
const HIGH_PENALTY: usize = 10;
const MEDIUM_PENALTY: usize = 5;
const LOW_PENALTY: usize = 2;

const GOOD_THRESHOLD: f64 = 80.0;
const MODERATE_THRESHOLD: f64 = 60.0;

#[derive(Clone, Copy, Debug, Default)]
pub struct ReportGenerator;

impl ReportGenerator {
    #[must_use]
    pub fn generate(
        process_info: &ProcessInfo,
        documents: &[ClassifiedDocument],
        checklist: &ChecklistResult,
        issues: Vec<Issue>,
    ) -> Report {
        let counts = count_by_severity(&issues);

        let document_summary = documents
            .iter()
            .map(|d| DocumentSummary {
                filename: d.doc.name.clone(),
                detected_type: d.classification.doc_type,
                confidence: round2(d.classification.confidence),
                classification_method: d.classification.method,
            })
            .collect();

        let recommendations = recommendations(process_info, checklist, &issues);
        let overall_compliance_score = compliance_score(checklist.completeness_score, counts);

        let mut issues_found = issues;
        issues_found.sort_by_key(|i| i.severity.rank());

        Report {
            analysis_timestamp: Utc::now(),
            process_detected: process_info.process,
            entity_type: process_info.entity_type,
            process_confidence: process_info.confidence,
            documents_uploaded: documents.len(),
            document_summary,
            checklist_status: checklist.status,
            required_documents: checklist.required_documents.clone(),
            present_documents: checklist.present_documents.clone(),
            missing_documents: checklist.missing_documents.clone(),
            completeness_score: round2(checklist.completeness_score),
            total_issues: issues_found.len(),
            issues_by_severity: counts,
            issues_found,
            recommendations,
            overall_compliance_score,
        }
    }

    /// Human-readable banner for terminal output.
    #[must_use]
    pub fn summary_message(report: &Report) -> String {
        let mut message = String::from("ADGM Compliance Analysis Complete\n\n");
        message.push_str(&format!("Process: {}\n", report.process_detected));
        message.push_str(&format!(
            "Document completeness: {:.0}%\n",
            report.completeness_score * 100.0
        ));
        message.push_str(&format!("Issues found: {}\n", report.total_issues));
        message.push_str(&format!(
            "Compliance score: {}/100\n\n",
            report.overall_compliance_score
        ));

        if !report.missing_documents.is_empty() {
            message.push_str("Missing required documents\n");
        }
        if report.issues_by_severity.high > 0 {
            message.push_str(&format!(
                "{} high-priority issues require attention\n",
                report.issues_by_severity.high
            ));
        }

        if report.overall_compliance_score >= GOOD_THRESHOLD {
            message.push_str("Good compliance level");
        } else if report.overall_compliance_score >= MODERATE_THRESHOLD {
            message.push_str("Moderate compliance - address issues before submission");
        } else {
            message.push_str("Low compliance - significant issues need resolution");
        }

        message
    }
}

fn count_by_severity(issues: &[Issue]) -> IssueCounts {
    let mut counts = IssueCounts::default();
    for issue in issues {
        match issue.severity {
            Severity::High => counts.high += 1,
            Severity::Medium => counts.medium += 1,
            Severity::Low => counts.low += 1,
        }
    }
    counts
}

/// All matching recommendation triggers fire; they are not mutually exclusive.
fn recommendations(
    process_info: &ProcessInfo,
    checklist: &ChecklistResult,
    issues: &[Issue],
) -> Vec<String> {
    let mut recs = Vec::new();

    if !checklist.missing_documents.is_empty() {
        let missing = checklist
            .missing_documents
            .iter()
            .map(|d| d.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        recs.push(format!("Complete document set by preparing: {missing}"));
    }

    let high_count = issues.iter().filter(|i| i.severity == Severity::High).count();
    if high_count > 0 {
        recs.push(format!(
            "Address {high_count} high-priority compliance issues before submission"
        ));
    }

    if issues.iter().any(|i| i.section.to_lowercase().contains("jurisdiction")) {
        recs.push(
            "Review and update jurisdiction clauses to reference ADGM Courts exclusively".into(),
        );
    }

    if issues.iter().any(|i| i.issue.to_lowercase().contains("ubo")) {
        recs.push(
            "Complete UBO declaration with all required particulars per ADGM regulations".into(),
        );
    }

    if process_info.process == crate::types::Process::CompanyIncorporation
        && checklist.completeness_score < 1.0
    {
        recs.push("Ensure all incorporation documents are prepared before ADGM submission".into());
    }

    if recs.is_empty() {
        if issues.is_empty() {
            recs.push("Documents appear compliant - ready for submission".into());
        } else {
            recs.push("Address identified issues to improve compliance".into());
        }
    }

    recs
}

#[expect(clippy::cast_precision_loss)]
fn compliance_score(completeness: f64, counts: IssueCounts) -> f64 {
    let completeness_part = completeness * COMPLETENESS_WEIGHT;

    let issue_part = if counts.total() == 0 {
        ISSUE_WEIGHT
    } else {
        let penalty = counts.high * HIGH_PENALTY
            + counts.medium * MEDIUM_PENALTY
            + counts.low * LOW_PENALTY;
        (ISSUE_WEIGHT - penalty as f64).max(0.0)
    };

    round1((completeness_part + issue_part).clamp(0.0, 100.0))
}

fn round1(x: f64) -> f64 {
    (x * 10.0).round() / 10.0
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}
