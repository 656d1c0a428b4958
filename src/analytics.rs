//! Profile analytics over the legacy training log
//!
//! Turns a profile's full training history (the 4-week × 6-day grids) into
//! aggregate statistics, muscle-group balance, per-exercise stats, progress
//! stats and a list of recommendations. Everything here is a pure function of
//! the snapshot it is handed.
//!
//! Ordering rules, since several results depend on it:
//! - records are consumed in the order given (the store returns them by id);
//! - the most-improved exercise is searched in order of first appearance and
//!   only a strictly better percentage replaces the current leader, so the
//!   earliest exercise wins ties;
//! - balance and exercise lists sort by volume descending, then by name.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tracing::debug;

use crate::locale::Locale;
use crate::models::{ExerciseCatalog, Profile, TrainingRecord, PROGRAM_WEEKS};
use crate::recommendations::RecommendationRules;

/// Thresholds used by the analytics engine and its recommendation rules
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyticsConfig {
    /// Weeks in one training record; divides the record count into a weekly frequency
    pub program_weeks: u32,

    /// BMI below this is underweight
    pub underweight_bmi: Decimal,

    /// BMI above this is overweight
    pub overweight_bmi: Decimal,

    /// A muscle group is lagging when its volume is below this share of the top group
    pub lagging_group_ratio: Decimal,

    /// Fewer training records than this triggers the frequency advisory
    pub min_workouts: usize,

    /// Fewer distinct exercises than this triggers the variety advisory
    pub min_exercises: usize,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        AnalyticsConfig {
            program_weeks: PROGRAM_WEEKS as u32,
            underweight_bmi: dec!(18.5),
            overweight_bmi: dec!(25),
            lagging_group_ratio: dec!(0.3),
            min_workouts: 8,
            min_exercises: 5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileStats {
    /// Number of training records
    pub total_workouts: usize,
    /// Distinct non-empty exercise names
    pub total_exercises: usize,
    /// Σ reps × kg over every cell of every record
    pub total_volume: Decimal,
    /// Reserved, always zero
    pub average_intensity: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bmi: Option<Decimal>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressStats {
    /// Percentage weight gain of the most improved exercise
    pub weight_progress: Decimal,
    /// Reserved, always zero
    pub volume_progress: Decimal,
    pub frequency_per_week: Decimal,
    /// Empty when no exercise improved
    pub most_improved_exercise: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MuscleGroupStat {
    pub muscle_group: String,
    /// Training records hitting this group
    pub count: usize,
    pub volume: Decimal,
    /// Share of the volume of all resolved groups
    pub percentage: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseStat {
    pub exercise: String,
    pub max_weight: Decimal,
    pub total_volume: Decimal,
    /// Not computed yet; stays zero
    pub progress: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsResult {
    pub profile: ProfileStats,
    pub progress: ProgressStats,
    pub muscle_group_balance: Vec<MuscleGroupStat>,
    pub recommendations: Vec<String>,
    pub exercise_stats: Vec<ExerciseStat>,
}

/// Profile analytics engine
pub struct AnalyticsEngine {
    config: AnalyticsConfig,
    locale: Locale,
}

impl AnalyticsEngine {
    /// Create engine with default thresholds and the default locale
    pub fn new() -> Self {
        AnalyticsEngine {
            config: AnalyticsConfig::default(),
            locale: Locale::default(),
        }
    }

    /// Create engine with custom thresholds
    pub fn with_config(config: AnalyticsConfig) -> Self {
        AnalyticsEngine {
            config,
            locale: Locale::default(),
        }
    }

    pub fn with_locale(mut self, locale: Locale) -> Self {
        self.locale = locale;
        self
    }

    pub fn config(&self) -> &AnalyticsConfig {
        &self.config
    }

    /// Compute the full analytics view for one profile
    pub fn compute(
        &self,
        profile: &Profile,
        records: &[TrainingRecord],
        catalog: &ExerciseCatalog,
    ) -> AnalyticsResult {
        debug!(
            profile_id = profile.id,
            records = records.len(),
            catalog = catalog.len(),
            "Computing profile analytics"
        );

        let profile_stats = Self::profile_stats(profile, records);
        let progress = self.progress_stats(records);
        let muscle_group_balance = Self::muscle_group_balance(records, catalog);
        let exercise_stats = Self::exercise_stats(records);

        let recommendations = RecommendationRules::new(&self.config)
            .evaluate(profile, &profile_stats, &muscle_group_balance)
            .iter()
            .map(|recommendation| recommendation.render(self.locale))
            .collect();

        AnalyticsResult {
            profile: profile_stats,
            progress,
            muscle_group_balance,
            recommendations,
            exercise_stats,
        }
    }

    /// Workout count, distinct exercises, total volume and BMI
    pub fn profile_stats(profile: &Profile, records: &[TrainingRecord]) -> ProfileStats {
        let distinct: HashSet<&str> = records
            .iter()
            .filter(|record| record.has_exercise())
            .map(|record| record.exercise.as_str())
            .collect();

        let total_volume = records
            .iter()
            .map(|record| record.grid.total_volume())
            .sum();

        ProfileStats {
            total_workouts: records.len(),
            total_exercises: distinct.len(),
            total_volume,
            average_intensity: Decimal::ZERO,
            bmi: profile.bmi(),
        }
    }

    /// Most improved exercise and weekly frequency
    pub fn progress_stats(&self, records: &[TrainingRecord]) -> ProgressStats {
        if records.is_empty() {
            return ProgressStats::default();
        }

        // Per-record max weights, grouped by exercise in order of first appearance
        let mut order: Vec<&str> = Vec::new();
        let mut series: HashMap<&str, Vec<u32>> = HashMap::new();
        for record in records.iter().filter(|record| record.has_exercise()) {
            let max_weight = record.grid.max_weight();
            if max_weight == 0 {
                continue;
            }
            let name = record.exercise.as_str();
            series
                .entry(name)
                .or_insert_with(|| {
                    order.push(name);
                    Vec::new()
                })
                .push(max_weight);
        }

        let mut most_improved = String::new();
        let mut best = Decimal::ZERO;
        for name in order {
            let weights = &series[name];
            if weights.len() < 2 {
                continue;
            }
            let first = Decimal::from(weights[0]);
            let last = Decimal::from(weights[weights.len() - 1]);
            let percent = (last - first) / first * dec!(100);
            if percent > best {
                best = percent;
                most_improved = name.to_string();
            }
        }

        let frequency_per_week = match self.config.program_weeks {
            0 => Decimal::ZERO,
            weeks => Decimal::from(records.len()) / Decimal::from(weeks),
        };

        ProgressStats {
            weight_progress: best,
            volume_progress: Decimal::ZERO,
            frequency_per_week,
            most_improved_exercise: most_improved,
        }
    }

    /// Volume per muscle group for records whose exercise resolves in the catalog
    pub fn muscle_group_balance(
        records: &[TrainingRecord],
        catalog: &ExerciseCatalog,
    ) -> Vec<MuscleGroupStat> {
        let mut groups: HashMap<&str, MuscleGroupStat> = HashMap::new();
        let mut total_volume = Decimal::ZERO;

        for record in records {
            let Some(entry) = catalog.get(&record.exercise) else {
                continue;
            };
            if entry.muscle_group.is_empty() {
                continue;
            }

            let volume = record.grid.total_volume();
            let stat = groups
                .entry(entry.muscle_group.as_str())
                .or_insert_with(|| MuscleGroupStat {
                    muscle_group: entry.muscle_group.clone(),
                    count: 0,
                    volume: Decimal::ZERO,
                    percentage: Decimal::ZERO,
                });
            stat.count += 1;
            stat.volume += volume;
            total_volume += volume;
        }

        let mut balance: Vec<MuscleGroupStat> = groups
            .into_values()
            .map(|mut stat| {
                if total_volume > Decimal::ZERO {
                    stat.percentage = stat.volume / total_volume * dec!(100);
                }
                stat
            })
            .collect();

        balance.sort_by(|a, b| {
            b.volume
                .cmp(&a.volume)
                .then_with(|| a.muscle_group.cmp(&b.muscle_group))
        });
        balance
    }

    /// Heaviest cell weight and cumulative volume per exercise name
    pub fn exercise_stats(records: &[TrainingRecord]) -> Vec<ExerciseStat> {
        let mut stats: HashMap<&str, ExerciseStat> = HashMap::new();

        for record in records.iter().filter(|record| record.has_exercise()) {
            let stat = stats
                .entry(record.exercise.as_str())
                .or_insert_with(|| ExerciseStat {
                    exercise: record.exercise.clone(),
                    max_weight: Decimal::ZERO,
                    total_volume: Decimal::ZERO,
                    progress: Decimal::ZERO,
                });
            stat.max_weight = stat.max_weight.max(Decimal::from(record.grid.max_weight()));
            stat.total_volume += record.grid.total_volume();
        }

        let mut result: Vec<ExerciseStat> = stats.into_values().collect();
        result.sort_by(|a, b| {
            b.total_volume
                .cmp(&a.total_volume)
                .then_with(|| a.exercise.cmp(&b.exercise))
        });
        result
    }
}

impl Default for AnalyticsEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{index_catalog, ExerciseCatalogEntry, FitnessGoal, GridCell};
    use chrono::Utc;

    fn create_profile(goal: Option<FitnessGoal>) -> Profile {
        let now = Utc::now();
        Profile {
            id: 1,
            name: "Test Lifter".to_string(),
            age: Some(28),
            gender: Some("male".to_string()),
            weight: Some(dec!(70)),
            height: Some(175),
            goal,
            experience: Some("intermediate".to_string()),
            notes: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn record(exercise: &str, cells: &[(usize, usize, u32, u32)]) -> TrainingRecord {
        let mut record = TrainingRecord::new(1, exercise);
        for &(week, day, reps, kg) in cells {
            record.grid.set_cell(week, day, GridCell::new(reps, kg)).unwrap();
        }
        record
    }

    fn catalog(entries: &[(&str, &str)]) -> ExerciseCatalog {
        index_catalog(entries.iter().enumerate().map(|(i, (name, group))| {
            ExerciseCatalogEntry {
                id: i as i64 + 1,
                name: name.to_string(),
                description: String::new(),
                category: String::new(),
                muscle_group: group.to_string(),
                is_custom: false,
            }
        }))
    }

    #[test]
    fn test_profile_stats() {
        let records = vec![
            record("Squat", &[(1, 1, 5, 100), (2, 1, 5, 105)]),
            record("Bench", &[(1, 2, 8, 60)]),
            record("Squat", &[(3, 1, 3, 120)]),
            record("", &[(1, 1, 10, 10)]),
        ];
        let stats = AnalyticsEngine::profile_stats(&create_profile(None), &records);

        assert_eq!(stats.total_workouts, 4);
        assert_eq!(stats.total_exercises, 2);
        // 500 + 525 + 480 + 360 + 100
        assert_eq!(stats.total_volume, dec!(1965));
        assert_eq!(stats.bmi.unwrap().round_dp(2), dec!(22.86));
    }

    #[test]
    fn test_empty_history() {
        let engine = AnalyticsEngine::new();
        let result = engine.compute(&create_profile(None), &[], &ExerciseCatalog::new());

        assert_eq!(result.profile.total_workouts, 0);
        assert_eq!(result.profile.total_volume, Decimal::ZERO);
        assert_eq!(result.progress, ProgressStats::default());
        assert!(result.muscle_group_balance.is_empty());
        assert!(result.exercise_stats.is_empty());
    }

    #[test]
    fn test_lenient_thresholds_on_empty_history() {
        let engine = AnalyticsEngine::with_config(AnalyticsConfig {
            min_workouts: 0,
            min_exercises: 0,
            ..AnalyticsConfig::default()
        })
        .with_locale(Locale::En);
        let result = engine.compute(&create_profile(None), &[], &ExerciseCatalog::new());

        assert_eq!(result.recommendations, vec!["✅ Great work! Keep it up.".to_string()]);
    }

    #[test]
    fn test_most_improved_exercise() {
        let records = vec![
            record("Squat", &[(1, 1, 5, 100)]),
            record("Bench", &[(1, 1, 5, 50)]),
            record("Squat", &[(1, 1, 5, 110)]),
            record("Bench", &[(1, 1, 5, 60)]),
        ];
        let progress = AnalyticsEngine::new().progress_stats(&records);

        // Squat +10%, Bench +20%
        assert_eq!(progress.most_improved_exercise, "Bench");
        assert_eq!(progress.weight_progress, dec!(20));
        assert_eq!(progress.frequency_per_week, dec!(1));
        assert_eq!(progress.volume_progress, Decimal::ZERO);
    }

    #[test]
    fn test_most_improved_tie_goes_to_first_seen() {
        let records = vec![
            record("Row", &[(1, 1, 5, 50)]),
            record("Press", &[(1, 1, 5, 40)]),
            record("Press", &[(1, 1, 5, 44)]),
            record("Row", &[(1, 1, 5, 55)]),
        ];
        let progress = AnalyticsEngine::new().progress_stats(&records);
        assert_eq!(progress.most_improved_exercise, "Row");
        assert_eq!(progress.weight_progress, dec!(10));
    }

    #[test]
    fn test_progress_compares_first_and_last_positionally() {
        let records = vec![
            record("Deadlift", &[(1, 1, 5, 140)]),
            record("Deadlift", &[(1, 1, 5, 180)]),
            record("Deadlift", &[(1, 1, 5, 150)]),
        ];
        let progress = AnalyticsEngine::new().progress_stats(&records);
        assert_eq!(progress.most_improved_exercise, "Deadlift");
        assert_eq!(progress.weight_progress.round_dp(2), dec!(7.14));
    }

    #[test]
    fn test_regression_and_zero_weight_records_are_not_progress() {
        let records = vec![
            record("Curl", &[(1, 1, 10, 20)]),
            record("Curl", &[(1, 1, 10, 18)]),
            record("Plank", &[(1, 1, 60, 0)]),
            record("Plank", &[(1, 1, 90, 0)]),
        ];
        let progress = AnalyticsEngine::new().progress_stats(&records);
        assert_eq!(progress.most_improved_exercise, "");
        assert_eq!(progress.weight_progress, Decimal::ZERO);
        assert_eq!(progress.frequency_per_week, dec!(1));
    }

    #[test]
    fn test_muscle_group_balance() {
        let records = vec![
            record("Squat", &[(1, 1, 10, 100)]),
            record("Bench", &[(1, 1, 10, 50)]),
            record("Leg Press", &[(1, 1, 10, 150)]),
            record("Mystery", &[(1, 1, 10, 500)]),
            record("Stretch", &[(1, 1, 10, 500)]),
        ];
        let catalog = catalog(&[
            ("Squat", "Legs"),
            ("Leg Press", "Legs"),
            ("Bench", "Chest"),
            ("Stretch", ""),
        ]);
        let balance = AnalyticsEngine::muscle_group_balance(&records, &catalog);

        assert_eq!(balance.len(), 2);
        assert_eq!(balance[0].muscle_group, "Legs");
        assert_eq!(balance[0].count, 2);
        assert_eq!(balance[0].volume, dec!(2500));
        assert_eq!(balance[0].percentage.round_dp(2), dec!(83.33));
        assert_eq!(balance[1].muscle_group, "Chest");
        assert_eq!(balance[1].count, 1);
        assert_eq!(balance[1].percentage.round_dp(2), dec!(16.67));
    }

    #[test]
    fn test_balance_with_zero_volume_has_zero_percentages() {
        let records = vec![record("Squat", &[])];
        let catalog = catalog(&[("Squat", "Legs")]);
        let balance = AnalyticsEngine::muscle_group_balance(&records, &catalog);
        assert_eq!(balance.len(), 1);
        assert_eq!(balance[0].count, 1);
        assert_eq!(balance[0].percentage, Decimal::ZERO);
    }

    #[test]
    fn test_exercise_stats() {
        let records = vec![
            record("Squat", &[(1, 1, 5, 100), (1, 2, 3, 110)]),
            record("Bench", &[(1, 1, 5, 80)]),
            record("Squat", &[(2, 1, 5, 105)]),
        ];
        let stats = AnalyticsEngine::exercise_stats(&records);

        assert_eq!(stats.len(), 2);
        assert_eq!(stats[0].exercise, "Squat");
        assert_eq!(stats[0].max_weight, dec!(110));
        assert_eq!(stats[0].total_volume, dec!(1355));
        assert_eq!(stats[0].progress, Decimal::ZERO);
        assert_eq!(stats[1].exercise, "Bench");
        assert_eq!(stats[1].total_volume, dec!(400));
    }

    #[test]
    fn test_exercise_stats_ties_sorted_by_name() {
        let records = vec![
            record("Row", &[(1, 1, 10, 50)]),
            record("Dip", &[(1, 1, 10, 50)]),
        ];
        let stats = AnalyticsEngine::exercise_stats(&records);
        assert_eq!(stats[0].exercise, "Dip");
        assert_eq!(stats[1].exercise, "Row");
    }

    #[test]
    fn test_result_json_field_names() {
        let records = vec![record("Squat", &[(1, 1, 5, 100)])];
        let result = AnalyticsEngine::new().compute(
            &create_profile(Some(FitnessGoal::Strength)),
            &records,
            &catalog(&[("Squat", "Legs")]),
        );
        let json = serde_json::to_value(&result).unwrap();

        assert_eq!(json["profile"]["totalVolume"], 500.0);
        assert!(json["profile"]["bmi"].is_number());
        assert_eq!(json["muscleGroupBalance"][0]["muscleGroup"], "Legs");
        assert_eq!(json["exerciseStats"][0]["maxWeight"], 100.0);
        assert!(json["progress"]["mostImprovedExercise"].is_string());
        assert!(json["recommendations"].is_array());
    }

    #[test]
    fn test_bmi_omitted_from_json_without_height() {
        let mut profile = create_profile(None);
        profile.height = None;
        let result = AnalyticsEngine::new().compute(&profile, &[], &ExerciseCatalog::new());
        let json = serde_json::to_value(&result).unwrap();
        assert!(json["profile"].get("bmi").is_none());
    }

    use proptest::prelude::*;

    fn arb_record() -> impl Strategy<Value = TrainingRecord> {
        (
            prop::sample::select(vec!["Squat", "Bench", "Row", "Curl", "Press", ""]),
            prop::collection::vec((1usize..=4, 1usize..=6, 0u32..20, 0u32..200), 0..10),
        )
            .prop_map(|(name, cells)| record(name, &cells))
    }

    proptest! {
        #[test]
        fn test_total_volume_matches_exercise_stats(records in prop::collection::vec(arb_record(), 0..12)) {
            let stats = AnalyticsEngine::profile_stats(&create_profile(None), &records);
            let unnamed_volume: Decimal = records
                .iter()
                .filter(|r| r.exercise.is_empty())
                .map(|r| r.grid.total_volume())
                .sum();
            let per_exercise: Decimal = AnalyticsEngine::exercise_stats(&records)
                .iter()
                .map(|s| s.total_volume)
                .sum();
            prop_assert_eq!(stats.total_volume, per_exercise + unnamed_volume);
        }

        #[test]
        fn test_balance_percentages_sum_to_hundred(records in prop::collection::vec(arb_record(), 1..12)) {
            let catalog = catalog(&[("Squat", "Legs"), ("Bench", "Chest"), ("Row", "Back"), ("Curl", "Arms")]);
            let balance = AnalyticsEngine::muscle_group_balance(&records, &catalog);
            let total: Decimal = balance.iter().map(|s| s.volume).sum();

            for pair in balance.windows(2) {
                prop_assert!(pair[0].volume >= pair[1].volume);
            }
            if total > Decimal::ZERO {
                let sum: Decimal = balance.iter().map(|s| s.percentage).sum();
                prop_assert!((sum - dec!(100)).abs() < dec!(0.000001));
            }
        }
    }
}
