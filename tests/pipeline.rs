//! End-to-end analysis through the public crate surface: files on disk in,
//! JSON-serializable report and reviewed copies out.

use std::path::PathBuf;
use std::sync::Arc;

use gavel_core::config::Config;
use gavel_core::pipeline::Pipeline;
use gavel_llm::mock::MockProvider;
use gavel_rag::KnowledgeBase;

const AOA_TEXT: &str = "ARTICLES OF ASSOCIATION\n\n\
    The objects and purpose of the company are general trading. \
    Share capital is divided into ordinary shares. \
    Directors manage the affairs of the board. General meetings are held annually. \
    Transfer and transmission of shares is restricted. \
    Disputes shall be resolved before the Dubai Courts and otherwise the ADGM Courts. \
    The registered office is within ADGM. Signed and witnessed.";

const MOA_TEXT: &str = "MEMORANDUM OF ASSOCIATION\n\n\
    The company is established in ADGM for general trading in shares. \
    Disputes shall fall under ADGM Courts jurisdiction. \
    Signed by all subscribers.";

const UBO_TEXT: &str = "UBO DECLARATION\n\n\
    Full name: Jane Roe. Nationality: Utopian. \
    Residential address: 1 ADGM Square. \
    Beneficial ownership: 60% of shares.";

fn write_file(dir: &tempfile::TempDir, name: &str, text: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, text).unwrap();
    path
}

fn pipeline(provider: MockProvider) -> Pipeline<MockProvider, KnowledgeBase<MockProvider>> {
    let provider = Arc::new(provider);
    let knowledge = Arc::new(KnowledgeBase::new(Arc::clone(&provider)));
    Pipeline::new(provider, knowledge, &Config::default())
}

#[tokio::test]
async fn incorporation_set_produces_serializable_report() {
    let dir = tempfile::tempdir().unwrap();
    let paths = vec![
        write_file(&dir, "articles_of_association.txt", AOA_TEXT),
        write_file(&dir, "memorandum_of_association.txt", MOA_TEXT),
        write_file(&dir, "ubo_declaration.txt", UBO_TEXT),
    ];

    let provider = MockProvider::with_default_response("No problems detected.");
    let output = pipeline(provider).run(&paths).await.unwrap();

    let json = serde_json::to_string_pretty(&output.report).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();

    assert_eq!(value["process_detected"], "Company Incorporation");
    assert_eq!(value["entity_type"], "Private Company Limited by Shares");
    assert_eq!(value["documents_uploaded"], 3);
    assert_eq!(value["checklist_status"], "incomplete");
    assert_eq!(
        value["document_summary"][0]["detected_type"],
        "Articles of Association"
    );
    assert_eq!(
        value["document_summary"][0]["classification_method"],
        "rule_based"
    );
    assert_eq!(value["total_issues"], 2);
    assert_eq!(value["issues_by_severity"]["High"], 2);
    assert_eq!(value["issues_by_severity"]["Medium"], 0);
    assert!(
        value["missing_documents"]
            .as_array()
            .unwrap()
            .contains(&serde_json::Value::from("Incorporation Application"))
    );
    assert!(value["recommendations"].as_array().unwrap().len() >= 2);
    assert!((value["overall_compliance_score"].as_f64().unwrap() - 45.7).abs() < 1e-9);

    // Jurisdiction issue carries a character span, UBO issue does not.
    let issues = value["issues_found"].as_array().unwrap();
    assert!(issues.iter().any(|i| i["location"].is_array()));
}

#[tokio::test]
async fn reviewed_copy_carries_inline_comments() {
    let dir = tempfile::tempdir().unwrap();
    let paths = vec![write_file(&dir, "articles_of_association.txt", AOA_TEXT)];

    let provider = MockProvider::with_default_response("No problems detected.");
    let output = pipeline(provider).run(&paths).await.unwrap();

    let reviewed = &output.reviewed[0].reviewed_path;
    assert_eq!(
        reviewed.file_name().unwrap().to_string_lossy(),
        "reviewed_articles_of_association.txt"
    );
    let content = std::fs::read_to_string(reviewed).unwrap();
    assert!(content.starts_with("ARTICLES OF ASSOCIATION"));
    assert!(content.contains("--- REVIEW COMMENTS ---"));
    assert!(content.contains("SEVERITY: High"));
    assert!(content.contains("REFERENCE:"));
}

#[tokio::test]
async fn messages_summarize_checklist_and_score() {
    let dir = tempfile::tempdir().unwrap();
    let paths = vec![
        write_file(&dir, "articles_of_association.txt", AOA_TEXT),
        write_file(&dir, "memorandum_of_association.txt", MOA_TEXT),
        write_file(&dir, "ubo_declaration.txt", UBO_TEXT),
    ];

    let provider = MockProvider::with_default_response("No problems detected.");
    let output = pipeline(provider).run(&paths).await.unwrap();

    assert!(
        output
            .checklist_message
            .contains("3 of 7 required documents uploaded")
    );
    assert!(output.checklist_message.contains("- Incorporation Application"));
    assert!(output.summary_message.contains("Process: Company Incorporation"));
    assert!(output.summary_message.contains("Compliance score: 45.7/100"));
}

#[tokio::test]
async fn mixed_set_without_enough_indicators_stays_unknown() {
    let aoa = "ARTICLES OF ASSOCIATION\n\n\
        Objects and purpose of the company are general trading. \
        Share capital is divided into ordinary shares. \
        Directors manage the affairs of the board. General meetings are held annually. \
        Transfer and transmission of shares is restricted. \
        Disputes shall be resolved before the Dubai Courts and otherwise the ADGM Courts. \
        The registered office is within ADGM.";
    let ubo = "UBO DECLARATION\n\n\
        Full name: Jane Roe. Date of birth: 1 January 1980. \
        Residential address: 1 ADGM Square. \
        Ownership and control: 60% of shares.";
    let resolution = "BOARD RESOLUTION\n\n\
        Resolved that the company open a bank account. \
        Signed by the chairman on the date below.";

    let dir = tempfile::tempdir().unwrap();
    let paths = vec![
        write_file(&dir, "articles_of_association.txt", aoa),
        write_file(&dir, "ubo_declaration.txt", ubo),
        write_file(&dir, "board_resolution.txt", resolution),
    ];

    let provider = MockProvider::with_default_response("No problems detected.");
    let output = pipeline(provider).run(&paths).await.unwrap();
    let report = &output.report;

    // Two incorporation indicators are not enough to infer a process.
    assert_eq!(report.process_detected, gavel_core::types::Process::Unknown);
    assert_eq!(
        report.checklist_status,
        gavel_core::types::ChecklistStatus::UnknownProcess
    );

    use gavel_core::types::Severity;
    let high: Vec<_> = report
        .issues_found
        .iter()
        .filter(|i| i.severity == Severity::High)
        .collect();
    assert!(high.iter().any(|i| i.issue.to_lowercase().contains("dubai courts")));
    assert!(
        high.iter()
            .any(|i| i.issue.contains("nationality, passport"))
    );
    assert!(report.issues_found.iter().any(|i| {
        i.severity == Severity::Medium && i.section == "Execution block"
    }));
    assert!(report.overall_compliance_score < 60.0);
}

#[tokio::test]
async fn reruns_are_deterministic() {
    let dir = tempfile::tempdir().unwrap();
    let paths = vec![
        write_file(&dir, "articles_of_association.txt", AOA_TEXT),
        write_file(&dir, "ubo_declaration.txt", UBO_TEXT),
    ];

    let first = pipeline(MockProvider::with_default_response("No problems detected."))
        .run(&paths)
        .await
        .unwrap();
    let second = pipeline(MockProvider::with_default_response("No problems detected."))
        .run(&paths)
        .await
        .unwrap();

    assert_eq!(first.report.total_issues, second.report.total_issues);
    assert_eq!(
        first.report.overall_compliance_score,
        second.report.overall_compliance_score
    );
    for (a, b) in first
        .report
        .document_summary
        .iter()
        .zip(&second.report.document_summary)
    {
        assert_eq!(a.detected_type, b.detected_type);
        assert_eq!(a.classification_method, b.classification_method);
    }
}

#[tokio::test]
async fn provider_failure_still_yields_a_report() {
    let dir = tempfile::tempdir().unwrap();
    let paths = vec![
        write_file(&dir, "memorandum_of_association.txt", MOA_TEXT),
        write_file(&dir, "zzzz.txt", "zzzz zzzz zzzz"),
    ];

    let output = pipeline(MockProvider::failing()).run(&paths).await.unwrap();
    assert_eq!(output.report.documents_uploaded, 2);
    // The memorandum classifies by rules alone; the filler file stays unknown.
    assert_eq!(
        output.report.document_summary[0].detected_type,
        gavel_core::types::DocType::MemorandumOfAssociation
    );
    assert_eq!(
        output.report.document_summary[1].detected_type,
        gavel_core::types::DocType::Unknown
    );
}
