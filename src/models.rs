use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::ValidationError;

/// Weeks covered by one legacy training record
pub const PROGRAM_WEEKS: usize = 4;

/// Training days per week in a legacy training record
pub const DAYS_PER_WEEK: usize = 6;

/// Fitness goal declared on a profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FitnessGoal {
    Strength,
    Mass,
    Endurance,
    WeightLoss,
    #[serde(other)]
    Other,
}

impl FitnessGoal {
    pub fn as_str(&self) -> &'static str {
        match self {
            FitnessGoal::Strength => "strength",
            FitnessGoal::Mass => "mass",
            FitnessGoal::Endurance => "endurance",
            FitnessGoal::WeightLoss => "weight_loss",
            FitnessGoal::Other => "other",
        }
    }
}

impl std::str::FromStr for FitnessGoal {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "strength" => Ok(FitnessGoal::Strength),
            "mass" => Ok(FitnessGoal::Mass),
            "endurance" => Ok(FitnessGoal::Endurance),
            "weight_loss" | "weight-loss" => Ok(FitnessGoal::WeightLoss),
            "other" => Ok(FitnessGoal::Other),
            _ => Err(ValidationError::UnknownVariant {
                field: "goal",
                value: s.to_string(),
            }),
        }
    }
}

/// A person whose training is being logged
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub id: i64,

    /// Display name
    pub name: String,

    pub age: Option<u16>,

    /// male/female/other, free text
    pub gender: Option<String>,

    /// Body weight in kilograms
    pub weight: Option<Decimal>,

    /// Height in centimeters
    pub height: Option<u16>,

    pub goal: Option<FitnessGoal>,

    /// beginner/intermediate/advanced, free text
    pub experience: Option<String>,

    pub notes: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Profile {
    /// Body-mass index, present only when both weight and a positive height are known
    pub fn bmi(&self) -> Option<Decimal> {
        let weight = self.weight?;
        let height = self.height.filter(|h| *h > 0)?;
        let height_m = Decimal::from(height) / Decimal::from(100);
        weight.checked_div(height_m * height_m)
    }
}

/// Exercise catalog entry. `name` is the join key used by training records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseCatalogEntry {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub muscle_group: String,
    #[serde(default)]
    pub is_custom: bool,
}

/// Catalog indexed by exercise name
pub type ExerciseCatalog = HashMap<String, ExerciseCatalogEntry>;

/// Index catalog entries by name. A later duplicate name replaces an earlier one.
pub fn index_catalog(entries: impl IntoIterator<Item = ExerciseCatalogEntry>) -> ExerciseCatalog {
    entries
        .into_iter()
        .map(|entry| (entry.name.clone(), entry))
        .collect()
}

/// One day's logged work inside the legacy grid
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridCell {
    pub reps: u32,
    /// Weight in kilograms
    pub kg: u32,
}

impl GridCell {
    pub fn new(reps: u32, kg: u32) -> Self {
        GridCell { reps, kg }
    }

    /// reps × kg
    pub fn volume(&self) -> u64 {
        u64::from(self.reps) * u64::from(self.kg)
    }

    pub fn is_empty(&self) -> bool {
        self.reps == 0 && self.kg == 0
    }
}

/// Fixed 4 week × 6 day grid of (reps, kg) cells, indexed `[week][day]` from zero
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrainingGrid(pub [[GridCell; DAYS_PER_WEEK]; PROGRAM_WEEKS]);

impl TrainingGrid {
    /// Cell at 1-based `week`/`day`
    pub fn cell(&self, week: usize, day: usize) -> Option<GridCell> {
        if week == 0 || day == 0 {
            return None;
        }
        self.0.get(week - 1)?.get(day - 1).copied()
    }

    /// Set the cell at 1-based `week`/`day`
    pub fn set_cell(&mut self, week: usize, day: usize, cell: GridCell) -> Result<(), ValidationError> {
        if !(1..=PROGRAM_WEEKS).contains(&week) || !(1..=DAYS_PER_WEEK).contains(&day) {
            return Err(ValidationError::GridOutOfBounds { week, day });
        }
        self.0[week - 1][day - 1] = cell;
        Ok(())
    }

    /// The six day cells of 1-based `week`
    pub fn week(&self, week: usize) -> Option<&[GridCell; DAYS_PER_WEEK]> {
        if week == 0 {
            return None;
        }
        self.0.get(week - 1)
    }

    /// All 24 cells, week-major
    pub fn cells(&self) -> impl Iterator<Item = &GridCell> + '_ {
        self.0.iter().flat_map(|week| week.iter())
    }

    /// Sum of reps × kg over every cell
    pub fn total_volume(&self) -> Decimal {
        Decimal::from(self.cells().map(GridCell::volume).sum::<u64>())
    }

    /// Heaviest single cell weight
    pub fn max_weight(&self) -> u32 {
        self.cells().map(|cell| cell.kg).max().unwrap_or(0)
    }
}

/// Legacy wide-table training log: one exercise tracked over a 4-week block
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainingRecord {
    pub id: i64,
    pub profile_id: i64,
    pub exercise: String,
    #[serde(default)]
    pub weeks: u8,
    #[serde(default)]
    pub grid: TrainingGrid,
}

impl TrainingRecord {
    pub fn new(profile_id: i64, exercise: impl Into<String>) -> Self {
        TrainingRecord {
            id: 0,
            profile_id,
            exercise: exercise.into(),
            weeks: PROGRAM_WEEKS as u8,
            grid: TrainingGrid::default(),
        }
    }

    pub fn has_exercise(&self) -> bool {
        !self.exercise.is_empty()
    }
}

/// Body weight measurement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BodyWeightEntry {
    pub id: i64,
    pub profile_id: i64,
    pub date: NaiveDate,
    pub weight: Decimal,
    pub notes: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Best lift recorded by a profile for an exercise
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonalRecord {
    pub id: i64,
    pub profile_id: i64,
    pub exercise: String,
    pub weight: Decimal,
    pub reps: u32,
    pub date: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// What a goal measures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalType {
    Weight,
    Reps,
    Volume,
    BodyWeight,
    Custom,
}

impl GoalType {
    pub fn as_str(&self) -> &'static str {
        match self {
            GoalType::Weight => "weight",
            GoalType::Reps => "reps",
            GoalType::Volume => "volume",
            GoalType::BodyWeight => "body_weight",
            GoalType::Custom => "custom",
        }
    }
}

impl std::str::FromStr for GoalType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "weight" => Ok(GoalType::Weight),
            "reps" => Ok(GoalType::Reps),
            "volume" => Ok(GoalType::Volume),
            "body_weight" | "body-weight" => Ok(GoalType::BodyWeight),
            "custom" => Ok(GoalType::Custom),
            _ => Err(ValidationError::UnknownVariant {
                field: "type",
                value: s.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Goal {
    pub id: i64,
    pub profile_id: i64,
    pub title: String,
    pub description: String,
    #[serde(rename = "type")]
    pub goal_type: GoalType,
    /// Exercise the goal refers to, empty for body-weight/custom goals
    pub exercise: String,
    pub target_value: Decimal,
    pub current_value: Decimal,
    pub unit: String,
    pub target_date: NaiveDate,
    pub achieved: bool,
    pub achieved_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One performed set inside a training session
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WorkingSet {
    pub weight: Decimal,
    pub reps: u32,
    /// Rate of perceived exertion 1-10, 0 when not recorded
    #[serde(default)]
    pub rpe: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainingSession {
    pub id: i64,
    pub profile_id: i64,
    pub date: NaiveDate,
    /// Duration in minutes
    pub duration: u32,
    pub notes: String,
    pub energy: u8,
    pub mood: u8,
    pub soreness: u8,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionExercise {
    pub id: i64,
    pub training_session_id: i64,
    pub exercise: String,
    pub sets: Vec<WorkingSet>,
    pub notes: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainingSessionWithExercises {
    #[serde(flatten)]
    pub session: TrainingSession,
    pub exercises: Vec<SessionExercise>,
}

/// One page of a profile's training history, newest first
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainingHistory {
    pub sessions: Vec<TrainingSessionWithExercises>,
    pub total_count: u64,
    pub page: u32,
    pub page_size: u32,
    pub has_more: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainingProgram {
    pub id: i64,
    pub profile_id: i64,
    pub name: String,
    pub description: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// An exercise scheduled on a weekday of a program
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgramExercise {
    pub id: i64,
    pub program_id: i64,
    pub exercise: String,
    /// 1 = Monday .. 7 = Sunday
    pub day_of_week: u8,
    /// Position within the day, from 1
    pub order: u32,
    pub sets: u32,
    pub reps: u32,
    pub weight: Decimal,
    pub notes: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgramSession {
    pub id: i64,
    pub program_id: i64,
    pub date: NaiveDate,
    pub completed: bool,
    pub notes: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A calendar day of a program together with the exercises planned for it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanDay {
    pub date: NaiveDate,
    pub exercises: Vec<ProgramExercise>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn profile(weight: Option<Decimal>, height: Option<u16>) -> Profile {
        let now = Utc::now();
        Profile {
            id: 1,
            name: "Test".to_string(),
            age: Some(30),
            gender: None,
            weight,
            height,
            goal: None,
            experience: None,
            notes: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_bmi_present_with_weight_and_height() {
        let bmi = profile(Some(dec!(70)), Some(175)).bmi().unwrap();
        assert_eq!(bmi.round_dp(2), dec!(22.86));
    }

    #[test]
    fn test_bmi_absent_without_inputs() {
        assert!(profile(None, Some(175)).bmi().is_none());
        assert!(profile(Some(dec!(70)), None).bmi().is_none());
        assert!(profile(Some(dec!(70)), Some(0)).bmi().is_none());
    }

    #[test]
    fn test_grid_bounds() {
        let mut grid = TrainingGrid::default();
        assert!(grid.set_cell(1, 1, GridCell::new(5, 100)).is_ok());
        assert!(grid.set_cell(4, 6, GridCell::new(3, 120)).is_ok());
        assert_eq!(
            grid.set_cell(5, 1, GridCell::new(1, 1)),
            Err(ValidationError::GridOutOfBounds { week: 5, day: 1 })
        );
        assert!(grid.set_cell(1, 0, GridCell::new(1, 1)).is_err());

        assert_eq!(grid.cell(1, 1), Some(GridCell::new(5, 100)));
        assert_eq!(grid.cell(4, 6), Some(GridCell::new(3, 120)));
        assert_eq!(grid.cell(0, 1), None);
        assert_eq!(grid.cell(4, 7), None);
    }

    #[test]
    fn test_grid_volume_and_max() {
        let mut grid = TrainingGrid::default();
        grid.set_cell(1, 1, GridCell::new(5, 100)).unwrap();
        grid.set_cell(2, 3, GridCell::new(8, 80)).unwrap();
        assert_eq!(grid.total_volume(), dec!(1140));
        assert_eq!(grid.max_weight(), 100);
        assert_eq!(grid.cells().count(), PROGRAM_WEEKS * DAYS_PER_WEEK);
        assert_eq!(TrainingGrid::default().total_volume(), Decimal::ZERO);
    }

    #[test]
    fn test_grid_json_shape() {
        let mut record = TrainingRecord::new(3, "Squat");
        record.grid.set_cell(1, 2, GridCell::new(5, 100)).unwrap();

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["profileId"], 3);
        assert_eq!(json["grid"].as_array().unwrap().len(), 4);
        assert_eq!(json["grid"][0].as_array().unwrap().len(), 6);
        assert_eq!(json["grid"][0][1]["reps"], 5);
        assert_eq!(json["grid"][0][1]["kg"], 100);
    }

    #[test]
    fn test_fitness_goal_parsing() {
        assert_eq!("strength".parse::<FitnessGoal>().unwrap(), FitnessGoal::Strength);
        assert_eq!("weight_loss".parse::<FitnessGoal>().unwrap(), FitnessGoal::WeightLoss);
        assert!("powerlifting".parse::<FitnessGoal>().is_err());

        let goal: FitnessGoal = serde_json::from_str("\"yoga\"").unwrap();
        assert_eq!(goal, FitnessGoal::Other);
    }

    #[test]
    fn test_goal_type_round_trip_names() {
        for goal_type in [
            GoalType::Weight,
            GoalType::Reps,
            GoalType::Volume,
            GoalType::BodyWeight,
            GoalType::Custom,
        ] {
            assert_eq!(goal_type.as_str().parse::<GoalType>().unwrap(), goal_type);
        }
    }

    #[test]
    fn test_index_catalog_by_name() {
        let catalog = index_catalog(vec![ExerciseCatalogEntry {
            id: 1,
            name: "Squat".to_string(),
            description: String::new(),
            category: "Compound".to_string(),
            muscle_group: "Legs".to_string(),
            is_custom: false,
        }]);
        assert_eq!(catalog["Squat"].muscle_group, "Legs");
    }
}
