//! Shared fixtures: synthetic survey exports

#![allow(dead_code)]

use polars::prelude::*;
use std::path::{Path, PathBuf};

const GENDERS: &[&str] = &[
    "Male", "female", "M", "F", "Woman", "male ", "Cis Male", "non-binary", "Trans woman", "f",
];
const COUNTRIES: &[&str] = &["United States", "United Kingdom", "Canada", "Germany"];
const INTERFERE: &[&str] = &["Often", "Rarely", "Never", "Sometimes"];
const EMPLOYEES: &[&str] = &["1-5", "6-25", "26-100", "100-500", "500-1000", "More than 1000"];
const YES_NO_DK: &[&str] = &["Yes", "No", "Don't know"];

/// Raw survey table with every column of the export, messy ages and
/// genders, and missing answers. Treatment follows family history and
/// work interference closely enough to be learnable.
pub fn survey_frame(n: usize) -> DataFrame {
    let pick = |values: &'static [&'static str], i: usize| values[i % values.len()];

    let timestamp: Vec<String> = (0..n).map(|i| format!("2014-08-27 11:{:02}:00", i % 60)).collect();
    let age: Vec<i64> = (0..n)
        .map(|i| match i % 17 {
            3 => -29,
            11 => 329,
            _ => 20 + (i % 35) as i64,
        })
        .collect();
    let gender: Vec<&str> = (0..n).map(|i| pick(GENDERS, i)).collect();
    let country: Vec<&str> = (0..n).map(|i| pick(COUNTRIES, i / 3)).collect();
    let state: Vec<Option<&str>> = (0..n).map(|i| (i % 4 == 0).then_some("CA")).collect();
    let self_employed: Vec<Option<&str>> = (0..n)
        .map(|i| match i % 10 {
            0 => None,
            7 => Some("Yes"),
            _ => Some("No"),
        })
        .collect();
    let family_history: Vec<&str> = (0..n).map(|i| if i % 3 == 0 { "Yes" } else { "No" }).collect();
    let work_interfere: Vec<Option<&str>> = (0..n)
        .map(|i| if i % 5 == 4 { None } else { Some(pick(INTERFERE, i / 2)) })
        .collect();
    let treatment: Vec<&str> = (0..n)
        .map(|i| {
            let often = work_interfere[i] == Some("Often");
            if i % 3 == 0 || often || i % 11 == 0 { "Yes" } else { "No" }
        })
        .collect();
    let no_employees: Vec<&str> = (0..n).map(|i| pick(EMPLOYEES, i)).collect();
    let yes_no = |offset: usize| -> Vec<&'static str> {
        (0..n).map(|i| if (i + offset) % 2 == 0 { "Yes" } else { "No" }).collect()
    };
    let tri = |offset: usize| -> Vec<&'static str> { (0..n).map(|i| pick(YES_NO_DK, i + offset)).collect() };
    let comments: Vec<Option<&str>> = (0..n).map(|i| (i % 9 == 0).then_some("n/a")).collect();

    df!(
        "Timestamp" => timestamp,
        "Age" => age,
        "Gender" => gender,
        "Country" => country,
        "state" => state,
        "self_employed" => self_employed,
        "family_history" => family_history,
        "treatment" => treatment,
        "work_interfere" => work_interfere,
        "no_employees" => no_employees,
        "remote_work" => yes_no(1),
        "tech_company" => yes_no(0),
        "benefits" => tri(0),
        "care_options" => tri(1),
        "wellness_program" => tri(2),
        "seek_help" => tri(0),
        "anonymity" => tri(1),
        "leave" => tri(2),
        "mental_health_consequence" => tri(0),
        "phys_health_consequence" => tri(1),
        "coworkers" => tri(2),
        "supervisor" => tri(0),
        "mental_health_interview" => tri(1),
        "phys_health_interview" => tri(2),
        "mental_vs_physical" => tri(0),
        "obs_consequence" => yes_no(3),
        "comments" => comments,
    )
    .unwrap()
}

/// Fresh directory under the system temp dir
pub fn temp_dir(prefix: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("{}-{}", prefix, uuid::Uuid::new_v4()));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

/// Write `df` as CSV at `dir/survey.csv`
pub fn write_survey_csv(dir: &Path, df: &DataFrame) -> PathBuf {
    let path = dir.join("survey.csv");
    let mut file = std::fs::File::create(&path).unwrap();
    CsvWriter::new(&mut file).finish(&mut df.clone()).unwrap();
    path
}
