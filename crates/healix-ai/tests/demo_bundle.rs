//! The shipped demo bundle loads and behaves sensibly end to end.

use std::path::PathBuf;

use healix_ai::{ClassifierKind, Engine, EngineConfig};

fn demo_bundle() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../models/demo")
}

#[test]
fn demo_bundle_loads() {
    let state = Engine::try_load(&EngineConfig::new(demo_bundle())).unwrap();
    assert_eq!(state.catalog().len(), 20);
    let names: Vec<&str> = state.ensemble().names().collect();
    assert_eq!(names, vec!["NearestCentroid", "JaccardCentroid", "ProfileMatch"]);

    let kinds: Vec<ClassifierKind> = state.ensemble().iter().map(|(_, c)| c.kind()).collect();
    assert_eq!(
        kinds,
        vec![
            ClassifierKind::LabelWithDistribution,
            ClassifierKind::LabelWithDistribution,
            ClassifierKind::LabelOnly,
        ]
    );
    // No remedies file in the bundle: the built-in table applies.
    assert_eq!(state.remedies().len(), 7);
}

#[test]
fn full_flu_profile_is_unanimous() {
    let engine = Engine::load(&EngineConfig::new(demo_bundle()));
    let d = engine
        .diagnose(&["fever", "cough", "fatigue", "headache", "muscle_pain", "chills"])
        .unwrap();

    assert_eq!(d.final_label, "Flu");
    assert!(d.is_unanimous());
    assert!(!d.remedies.is_empty());
    for (model, verdict) in d.per_model.iter() {
        assert!((0.0..=100.0).contains(&verdict.confidence), "{model}");
    }
    assert_eq!(d.per_model.get("ProfileMatch").unwrap().confidence, 0.0);
    assert!(d.per_model.get("NearestCentroid").unwrap().confidence > 0.0);
}

#[test]
fn covid_specific_symptoms_win() {
    let engine = Engine::load(&EngineConfig::new(demo_bundle()));
    let d = engine
        .diagnose(&["fever", "cough", "loss_of_taste", "loss_of_smell"])
        .unwrap();
    assert_eq!(d.final_label, "COVID-19");
}

#[test]
fn remedy_override_takes_precedence() {
    let dir = tempfile::tempdir().unwrap();
    let remedies = dir.path().join("remedies.json");
    std::fs::write(
        &remedies,
        r#"{"Migraine": {"remedies": ["Dark room"], "exercises": []}}"#,
    )
    .unwrap();

    let config = EngineConfig::new(demo_bundle()).with_remedies(&remedies);
    let engine = Engine::load(&config);
    let d = engine
        .diagnose(&["headache", "nausea", "sensitivity_to_light"])
        .unwrap();
    assert_eq!(d.final_label, "Migraine");
    assert_eq!(d.remedies, vec!["Dark room"]);
}

#[test]
fn unreadable_remedy_override_makes_engine_unavailable() {
    let config = EngineConfig::new(demo_bundle()).with_remedies("/nonexistent/remedies.json");
    let engine = Engine::load(&config);
    assert!(!engine.is_ready());
}
