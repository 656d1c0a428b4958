//! Write requests accepted by the record store
//!
//! Dates are already parsed; a missing optional date is filled in by the store
//! (usually with today). Ranges are checked by [`crate::validation::Validate`].

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{FitnessGoal, GoalType, TrainingGrid, WorkingSet};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProfileRequest {
    pub name: String,
    pub age: Option<u16>,
    pub gender: Option<String>,
    pub weight: Option<Decimal>,
    pub height: Option<u16>,
    pub goal: Option<FitnessGoal>,
    pub experience: Option<String>,
    pub notes: Option<String>,
}

/// New custom exercise for the catalog
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExerciseRequest {
    pub name: String,
    pub description: String,
    pub category: String,
    pub muscle_group: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TrainingRecordRequest {
    pub exercise: String,
    pub grid: TrainingGrid,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BodyWeightRequest {
    pub weight: Decimal,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonalRecordRequest {
    pub exercise: String,
    pub weight: Decimal,
    pub reps: u32,
    #[serde(default)]
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalRequest {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "type")]
    pub goal_type: GoalType,
    #[serde(default)]
    pub exercise: String,
    pub target_value: Decimal,
    /// Empty picks the default unit for the goal type
    #[serde(default)]
    pub unit: String,
    /// Defaults to one month from today
    #[serde(default)]
    pub target_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalProgressRequest {
    pub current_value: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TrainingSessionRequest {
    pub date: Option<NaiveDate>,
    /// Minutes
    pub duration: u32,
    pub notes: String,
    /// 1-10, anything else becomes 5
    pub energy: u8,
    /// 1-10, anything else becomes 5
    pub mood: u8,
    /// 1-10, anything else becomes 1
    pub soreness: u8,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SessionExerciseRequest {
    pub exercise: String,
    pub sets: Vec<WorkingSet>,
    pub notes: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainingProgramRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default)]
    pub is_active: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgramExerciseRequest {
    pub exercise: String,
    /// 1 = Monday .. 7 = Sunday
    pub day_of_week: u8,
    pub order: u32,
    pub sets: u32,
    pub reps: u32,
    #[serde(default)]
    pub weight: Decimal,
    #[serde(default)]
    pub notes: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProgramSessionRequest {
    pub date: Option<NaiveDate>,
    pub completed: bool,
    pub notes: String,
}
