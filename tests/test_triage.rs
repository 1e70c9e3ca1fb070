//! End-to-end triage tests over the shipped catalogs and the session API.

use std::path::Path;

use tokio_util::sync::CancellationToken;

use triage_bot::catalog::{DiseaseCatalog, MedicineCatalog};
use triage_bot::llm::providers::dummy::DummyProvider;
use triage_bot::llm::{LlmProvider, Role};
use triage_bot::matcher::{MatchOutcome, SymptomMatcher};
use triage_bot::session::ConversationSession;

fn shipped_session() -> ConversationSession {
    let diseases = DiseaseCatalog::load(Path::new("data/diseases.json")).unwrap();
    let medicines = MedicineCatalog::load(Path::new("data/medicines.json")).unwrap();
    ConversationSession::new(
        SymptomMatcher::new(&diseases),
        medicines,
        LlmProvider::Dummy(DummyProvider),
    )
}

#[test]
fn shipped_catalogs_load() {
    let diseases = DiseaseCatalog::load(Path::new("data/diseases.json")).unwrap();
    assert!(!diseases.is_empty());
    let medicines = MedicineCatalog::load(Path::new("data/medicines.json")).unwrap();
    assert!(!medicines.is_empty());
}

#[test]
fn every_shipped_medicine_record_is_complete() {
    let diseases = DiseaseCatalog::load(Path::new("data/diseases.json")).unwrap();
    let medicines = MedicineCatalog::load(Path::new("data/medicines.json")).unwrap();
    for record in diseases.records() {
        if let Some(medicine) = medicines.lookup(&record.name) {
            assert!(!medicine.medication.is_empty(), "{}: empty medication", record.name);
            assert!(!medicine.dosage.is_empty(), "{}: empty dosage", record.name);
        }
    }
    assert!(medicines.lookup("Unknown Disease").is_none());
}

#[test]
fn fever_and_cough_triages_to_flu() {
    let diseases = DiseaseCatalog::load(Path::new("data/diseases.json")).unwrap();
    let matcher = SymptomMatcher::new(&diseases);
    match matcher.diagnose("I have a fever and a cough") {
        MatchOutcome::Matched(d) => {
            assert_eq!(d.disease, "Flu");
            assert_eq!(d.score, 2);
        }
        MatchOutcome::NoMatch => panic!("expected a Flu diagnosis"),
    }
}

#[test]
fn flu_summary_includes_the_medication_line() {
    let session = shipped_session();
    let summary = session.triage_summary("I have a fever and a cough");
    assert!(summary.contains("it could be Flu"));
    assert!(summary.contains("- Paracetamol (500mg twice daily)"));
}

#[test]
fn healthy_input_gets_the_consult_fallback() {
    let session = shipped_session();
    let summary = session.triage_summary("I feel great today");
    assert!(summary.contains("couldn't determine"));
    assert!(summary.contains("consult a doctor"));
    assert!(!summary.contains("medications include"));
}

#[test]
fn chickenpox_has_no_medicine_entry() {
    let session = shipped_session();
    // "Chickenpox" is deliberately absent from medicines.json.
    let summary = session.triage_summary("itchy rash with blisters");
    assert!(summary.contains("it could be Chickenpox"));
    assert!(summary.contains("No specific medication recommendations"));
}

#[tokio::test]
async fn conversation_accumulates_history_across_turns() {
    let mut session = shipped_session();
    let shutdown = CancellationToken::new();

    session.handle_turn("I have a fever and a cough", &shutdown).await;
    session.handle_turn("it started yesterday", &shutdown).await;

    let history = session.history();
    // system + 2 × (user, assistant)
    assert_eq!(history.len(), 5);
    let roles: Vec<Role> = history.iter().map(|m| m.role).collect();
    assert_eq!(
        roles,
        vec![Role::System, Role::User, Role::Assistant, Role::User, Role::Assistant]
    );
    assert_eq!(history[4].content, "[echo] it started yesterday");
}

#[tokio::test]
async fn blank_turns_never_reach_the_backend() {
    let mut session = shipped_session();
    let shutdown = CancellationToken::new();

    session.handle_turn("", &shutdown).await;
    session.handle_turn("   ".trim(), &shutdown).await;

    assert_eq!(session.history().len(), 1);
}
