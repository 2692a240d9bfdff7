//! Integration test: Full pipeline (CSV → train → persist → load → predict)

mod common;

use polars::prelude::*;
use treatment_predictor::preprocessing::clean_features;
use treatment_predictor::server::{predict_survey, SurveyInput};
use treatment_predictor::training::{TrainEngine, TrainedPipeline, TrainingConfig};

/// A respondent matching the positive pattern of the synthetic survey
fn survey_input() -> SurveyInput {
    serde_json::from_value(serde_json::json!({
        "Age": 30,
        "Gender": "male",
        "Country": "Japan",
        "self_employed": "No",
        "family_history": "Yes",
        "work_interfere": "Often",
        "no_employees": "6-25",
        "remote_work": "Yes",
        "tech_company": "Yes",
        "benefits": "Yes",
        "care_options": "No",
        "wellness_program": "Don't know",
        "seek_help": "Yes",
        "anonymity": "No",
        "leave": "Don't know",
        "mental_health_consequence": "Yes",
        "phys_health_consequence": "No",
        "coworkers": "Don't know",
        "supervisor": "Yes",
        "mental_health_interview": "No",
        "phys_health_interview": "Don't know",
        "mental_vs_physical": "Yes",
        "obs_consequence": "No"
    }))
    .unwrap()
}

#[test]
fn test_train_persist_load_predict() {
    let dir = common::temp_dir("full-pipeline");
    let raw = common::survey_frame(200);
    let csv = common::write_survey_csv(&dir, &raw);

    let config = TrainingConfig::new()
        .with_data_path(&csv)
        .with_out_dir(dir.join("models"))
        .with_tracking_dir(dir.join("mlruns"))
        .with_split(0.2);
    let report = TrainEngine::new(config).run().unwrap();

    // Treatment is learnable from family history and work interference
    let metrics = report.metrics.unwrap();
    assert!(metrics.accuracy.unwrap() > 0.7);
    assert!(metrics.auc_roc.unwrap() > 0.7);

    let loaded = TrainedPipeline::load(&report.model_path).unwrap();
    let bytes = std::fs::read(&report.model_path).unwrap();
    let reloaded = TrainedPipeline::from_bytes(&bytes).unwrap();

    let input = survey_input();
    let first = predict_survey(&loaded, &input).unwrap();
    let second = predict_survey(&reloaded, &input).unwrap();
    assert_eq!(first, second);
    assert_eq!(first.prediction, 1);

    // Whole-table scoring matches row-by-row scoring
    let features = clean_features(&raw).unwrap().drop("treatment").unwrap();
    let proba = loaded.predict_proba(&features).unwrap();
    let labels = loaded.predict(&features).unwrap();
    assert_eq!(proba.len(), 200);
    for (p, y) in proba.iter().zip(labels.iter()) {
        assert!((0.0..=1.0).contains(p));
        assert_eq!(*y == 1.0, *p > 0.5);
    }

    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn test_unseen_categories_still_predict() {
    let dir = common::temp_dir("full-pipeline");
    let config = TrainingConfig::new()
        .with_out_dir(dir.join("models"))
        .with_tracking_dir(dir.join("mlruns"));
    let report = TrainEngine::new(config)
        .run_on_frame(&common::survey_frame(80))
        .unwrap();
    let pipeline = TrainedPipeline::load(&report.model_path).unwrap();

    let input = SurveyInput {
        gender: "prefer not to say".to_string(),
        country: "Atlantis".to_string(),
        no_employees: "a lot".to_string(),
        age: Some(7),
        ..survey_input()
    };
    let response = predict_survey(&pipeline, &input).unwrap();
    assert!((0.0..=1.0).contains(&response.probability_yes));

    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn test_training_is_deterministic() {
    let dir = common::temp_dir("full-pipeline");
    let df = common::survey_frame(100);
    let train = |name: &str| {
        let config = TrainingConfig::new()
            .with_out_dir(dir.join(name))
            .with_tracking_dir(dir.join("mlruns"))
            .with_split(0.25);
        let report = TrainEngine::new(config).run_on_frame(&df).unwrap();
        (report.metrics, TrainedPipeline::load(&report.model_path).unwrap())
    };

    let (metrics_a, model_a) = train("a");
    let (metrics_b, model_b) = train("b");
    assert_eq!(metrics_a, metrics_b);
    assert_eq!(model_a.classifier().coefficients, model_b.classifier().coefficients);

    let row: DataFrame = survey_input().to_frame().unwrap();
    let row = clean_features(&row).unwrap();
    assert_eq!(
        model_a.predict_proba(&row).unwrap(),
        model_b.predict_proba(&row).unwrap()
    );

    let _ = std::fs::remove_dir_all(dir);
}
