//! Request and response bodies of the prediction API

use polars::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::preprocessing::clean_features;
use crate::training::TrainedPipeline;

/// One survey respondent, as posted to `/predict`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurveyInput {
    #[serde(rename = "Age", default)]
    pub age: Option<i64>,
    #[serde(rename = "Gender")]
    pub gender: String,
    #[serde(rename = "Country")]
    pub country: String,
    #[serde(default)]
    pub self_employed: Option<String>,
    pub family_history: String,
    #[serde(default)]
    pub work_interfere: Option<String>,
    pub no_employees: String,
    pub remote_work: String,
    pub tech_company: String,
    pub benefits: String,
    pub care_options: String,
    pub wellness_program: String,
    pub seek_help: String,
    pub anonymity: String,
    pub leave: String,
    pub mental_health_consequence: String,
    pub phys_health_consequence: String,
    pub coworkers: String,
    pub supervisor: String,
    pub mental_health_interview: String,
    pub phys_health_interview: String,
    pub mental_vs_physical: String,
    pub obs_consequence: String,
}

impl SurveyInput {
    /// Single-row frame with the same column names as the survey export
    pub fn to_frame(&self) -> Result<DataFrame> {
        let text = |name: &str, value: &str| Column::new(name.into(), [value]);

        let columns = vec![
            Column::new("Age".into(), [self.age]),
            text("Gender", &self.gender),
            text("Country", &self.country),
            Column::new("self_employed".into(), [self.self_employed.as_deref()]),
            text("family_history", &self.family_history),
            Column::new("work_interfere".into(), [self.work_interfere.as_deref()]),
            text("no_employees", &self.no_employees),
            text("remote_work", &self.remote_work),
            text("tech_company", &self.tech_company),
            text("benefits", &self.benefits),
            text("care_options", &self.care_options),
            text("wellness_program", &self.wellness_program),
            text("seek_help", &self.seek_help),
            text("anonymity", &self.anonymity),
            text("leave", &self.leave),
            text("mental_health_consequence", &self.mental_health_consequence),
            text("phys_health_consequence", &self.phys_health_consequence),
            text("coworkers", &self.coworkers),
            text("supervisor", &self.supervisor),
            text("mental_health_interview", &self.mental_health_interview),
            text("phys_health_interview", &self.phys_health_interview),
            text("mental_vs_physical", &self.mental_vs_physical),
            text("obs_consequence", &self.obs_consequence),
        ];

        Ok(DataFrame::new(columns)?)
    }
}

/// Body returned by `/predict`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResponse {
    /// 1 when treatment is predicted, else 0
    pub prediction: u8,
    /// Probability of the positive class, in [0, 1]
    pub probability_yes: f64,
    pub model: String,
}

/// Clean and score one respondent
pub fn predict_survey(pipeline: &TrainedPipeline, input: &SurveyInput) -> Result<PredictionResponse> {
    let row = clean_features(&input.to_frame()?)?;
    let probability_yes = pipeline.predict_proba(&row)?[0];

    Ok(PredictionResponse {
        prediction: u8::from(probability_yes > 0.5),
        probability_yes,
        model: pipeline.metadata().model.clone(),
    })
}

#[cfg(test)]
pub(crate) fn sample_input() -> SurveyInput {
    SurveyInput {
        age: Some(30),
        gender: "male".to_string(),
        country: "Japan".to_string(),
        self_employed: Some("No".to_string()),
        family_history: "No".to_string(),
        work_interfere: Some("Sometimes".to_string()),
        no_employees: "6-25".to_string(),
        remote_work: "Yes".to_string(),
        tech_company: "Yes".to_string(),
        benefits: "Yes".to_string(),
        care_options: "Not sure".to_string(),
        wellness_program: "No".to_string(),
        seek_help: "Yes".to_string(),
        anonymity: "Yes".to_string(),
        leave: "Somewhat easy".to_string(),
        mental_health_consequence: "No".to_string(),
        phys_health_consequence: "No".to_string(),
        coworkers: "Some of them".to_string(),
        supervisor: "Yes".to_string(),
        mental_health_interview: "No".to_string(),
        phys_health_interview: "Yes".to_string(),
        mental_vs_physical: "Don't know".to_string(),
        obs_consequence: "No".to_string(),
    }
}
