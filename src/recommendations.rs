//! Rule-based training recommendations
//!
//! Rules run in a fixed order and each contributes at most one message,
//! except the lagging-group rule which contributes one per lagging group.
//! The generic "great job" message appears only when every other rule was
//! silent.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::analytics::{AnalyticsConfig, MuscleGroupStat, ProfileStats};
use crate::locale::Locale;
use crate::models::{FitnessGoal, Profile};

/// A recommendation before it is rendered into a locale
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Recommendation {
    Underweight,
    Overweight,
    LaggingMuscleGroup { group: String, percentage: Decimal },
    LowFrequency,
    LowVariety,
    GoalTip { goal: FitnessGoal },
    GreatJob,
}

impl Recommendation {
    pub fn render(&self, locale: Locale) -> String {
        match locale {
            Locale::Ru => self.render_ru(),
            Locale::En => self.render_en(),
        }
    }

    fn render_ru(&self) -> String {
        match self {
            Recommendation::Underweight => "⚠️ Ваш BMI ниже нормы. Рекомендуется увеличить калорийность питания и сосредоточиться на наборе мышечной массы.".to_string(),
            Recommendation::Overweight => "⚠️ Ваш BMI выше нормы. Рекомендуется добавить кардио и контролировать калорийность питания.".to_string(),
            Recommendation::LaggingMuscleGroup { group, percentage } => format!(
                "💪 Уделите больше внимания группе мышц: {} (всего {:.1}% от общего объема)",
                group,
                one_decimal(*percentage)
            ),
            Recommendation::LowFrequency => "📅 Рекомендуется увеличить частоту тренировок до 3-4 раз в неделю для лучших результатов.".to_string(),
            Recommendation::LowVariety => "🎯 Добавьте больше разнообразия в программу. Рекомендуется выполнять 8-12 различных упражнений.".to_string(),
            Recommendation::GoalTip { goal } => match goal {
                FitnessGoal::Strength => "💪 Для развития силы фокусируйтесь на весах 85-95% от 1ПМ с 1-5 повторениями.",
                FitnessGoal::Mass => "🏋️ Для роста массы оптимальны веса 70-85% от 1ПМ с 6-12 повторениями.",
                FitnessGoal::Endurance => "🏃 Для развития выносливости используйте веса 50-70% от 1ПМ с 15-20+ повторениями.",
                FitnessGoal::WeightLoss => "🔥 Для похудения сочетайте силовые тренировки с кардио и контролируйте калорийность.",
                FitnessGoal::Other => "",
            }
            .to_string(),
            Recommendation::GreatJob => "✅ Отличная работа! Продолжайте в том же духе.".to_string(),
        }
    }

    fn render_en(&self) -> String {
        match self {
            Recommendation::Underweight => "⚠️ Your BMI is below normal. Increase your calorie intake and focus on gaining muscle mass.".to_string(),
            Recommendation::Overweight => "⚠️ Your BMI is above normal. Add cardio and keep your calorie intake under control.".to_string(),
            Recommendation::LaggingMuscleGroup { group, percentage } => format!(
                "💪 Pay more attention to the muscle group: {} (only {:.1}% of total volume)",
                group,
                one_decimal(*percentage)
            ),
            Recommendation::LowFrequency => "📅 Train 3-4 times a week for better results.".to_string(),
            Recommendation::LowVariety => "🎯 Add more variety to your program. Aim for 8-12 different exercises.".to_string(),
            Recommendation::GoalTip { goal } => match goal {
                FitnessGoal::Strength => "💪 For strength, focus on 85-95% of 1RM for 1-5 reps.",
                FitnessGoal::Mass => "🏋️ For muscle growth, 70-85% of 1RM for 6-12 reps works best.",
                FitnessGoal::Endurance => "🏃 For endurance, use 50-70% of 1RM for 15-20+ reps.",
                FitnessGoal::WeightLoss => "🔥 For weight loss, combine strength training with cardio and watch your calories.",
                FitnessGoal::Other => "",
            }
            .to_string(),
            Recommendation::GreatJob => "✅ Great work! Keep it up.".to_string(),
        }
    }
}

fn one_decimal(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero)
}

/// Evaluates the recommendation rules against computed statistics
pub struct RecommendationRules<'a> {
    config: &'a AnalyticsConfig,
}

impl<'a> RecommendationRules<'a> {
    pub fn new(config: &'a AnalyticsConfig) -> Self {
        RecommendationRules { config }
    }

    /// Apply every rule in order.
    ///
    /// `balance` must already be sorted by volume descending; its first entry
    /// is the reference for the lagging-group rule.
    pub fn evaluate(
        &self,
        profile: &Profile,
        stats: &ProfileStats,
        balance: &[MuscleGroupStat],
    ) -> Vec<Recommendation> {
        let mut recommendations = Vec::new();

        if let Some(bmi) = stats.bmi {
            if bmi < self.config.underweight_bmi {
                recommendations.push(Recommendation::Underweight);
            } else if bmi > self.config.overweight_bmi {
                recommendations.push(Recommendation::Overweight);
            }
        }

        if let Some(top) = balance.first() {
            let threshold = top.volume * self.config.lagging_group_ratio;
            recommendations.extend(
                balance
                    .iter()
                    .filter(|stat| stat.volume < threshold)
                    .map(|stat| Recommendation::LaggingMuscleGroup {
                        group: stat.muscle_group.clone(),
                        percentage: stat.percentage,
                    }),
            );
        }

        if stats.total_workouts < self.config.min_workouts {
            recommendations.push(Recommendation::LowFrequency);
        }

        if stats.total_exercises < self.config.min_exercises {
            recommendations.push(Recommendation::LowVariety);
        }

        if let Some(goal) = profile.goal.filter(|goal| *goal != FitnessGoal::Other) {
            recommendations.push(Recommendation::GoalTip { goal });
        }

        if recommendations.is_empty() {
            recommendations.push(Recommendation::GreatJob);
        }

        recommendations
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal_macros::dec;

    fn profile(goal: Option<FitnessGoal>) -> Profile {
        let now = Utc::now();
        Profile {
            id: 1,
            name: "Test".to_string(),
            age: None,
            gender: None,
            weight: None,
            height: None,
            goal,
            experience: None,
            notes: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn stats(workouts: usize, exercises: usize, bmi: Option<Decimal>) -> ProfileStats {
        ProfileStats {
            total_workouts: workouts,
            total_exercises: exercises,
            total_volume: Decimal::ZERO,
            average_intensity: Decimal::ZERO,
            bmi,
        }
    }

    fn group(name: &str, volume: Decimal, percentage: Decimal) -> MuscleGroupStat {
        MuscleGroupStat {
            muscle_group: name.to_string(),
            count: 1,
            volume,
            percentage,
        }
    }

    #[test]
    fn test_underweight_and_overweight_are_exclusive() {
        let config = AnalyticsConfig::default();
        let rules = RecommendationRules::new(&config);

        let under = rules.evaluate(&profile(None), &stats(10, 10, Some(dec!(17.9))), &[]);
        assert_eq!(under, vec![Recommendation::Underweight]);

        let over = rules.evaluate(&profile(None), &stats(10, 10, Some(dec!(27.3))), &[]);
        assert_eq!(over, vec![Recommendation::Overweight]);

        let normal = rules.evaluate(&profile(None), &stats(10, 10, Some(dec!(25))), &[]);
        assert_eq!(normal, vec![Recommendation::GreatJob]);
    }

    #[test]
    fn test_lagging_groups() {
        let config = AnalyticsConfig::default();
        let balance = vec![
            group("Legs", dec!(1000), dec!(71.43)),
            group("Back", dec!(300), dec!(21.43)),
            group("Arms", dec!(100), dec!(7.14)),
        ];
        let result = RecommendationRules::new(&config).evaluate(&profile(None), &stats(10, 10, None), &balance);

        // Back sits exactly on the 30% threshold and is not lagging
        assert_eq!(
            result,
            vec![Recommendation::LaggingMuscleGroup {
                group: "Arms".to_string(),
                percentage: dec!(7.14),
            }]
        );
        assert_eq!(
            result[0].render(Locale::Ru),
            "💪 Уделите больше внимания группе мышц: Arms (всего 7.1% от общего объема)"
        );
    }

    #[test]
    fn test_rule_order() {
        let config = AnalyticsConfig::default();
        let result = RecommendationRules::new(&config).evaluate(
            &profile(Some(FitnessGoal::Strength)),
            &stats(3, 2, Some(dec!(30))),
            &[group("Legs", dec!(900), dec!(90)), group("Arms", dec!(100), dec!(10))],
        );

        assert_eq!(
            result,
            vec![
                Recommendation::Overweight,
                Recommendation::LaggingMuscleGroup {
                    group: "Arms".to_string(),
                    percentage: dec!(10),
                },
                Recommendation::LowFrequency,
                Recommendation::LowVariety,
                Recommendation::GoalTip {
                    goal: FitnessGoal::Strength
                },
            ]
        );
    }

    #[test]
    fn test_empty_history_gets_frequency_and_variety_advice() {
        let config = AnalyticsConfig::default();
        let rules = RecommendationRules::new(&config);

        let empty = rules.evaluate(&profile(None), &stats(0, 0, None), &[]);
        assert_eq!(empty, vec![Recommendation::LowFrequency, Recommendation::LowVariety]);
    }

    #[test]
    fn test_zero_thresholds_with_empty_history_is_great_job() {
        let config = AnalyticsConfig {
            min_workouts: 0,
            min_exercises: 0,
            ..AnalyticsConfig::default()
        };
        let result = RecommendationRules::new(&config).evaluate(&profile(None), &stats(0, 0, None), &[]);
        assert_eq!(result, vec![Recommendation::GreatJob]);
    }

    #[test]
    fn test_other_goal_has_no_tip() {
        let config = AnalyticsConfig::default();
        let result = RecommendationRules::new(&config).evaluate(
            &profile(Some(FitnessGoal::Other)),
            &stats(12, 9, None),
            &[],
        );
        assert_eq!(result, vec![Recommendation::GreatJob]);
    }

    #[test]
    fn test_custom_thresholds() {
        let config = AnalyticsConfig {
            min_workouts: 2,
            min_exercises: 1,
            ..AnalyticsConfig::default()
        };
        let result = RecommendationRules::new(&config).evaluate(&profile(None), &stats(2, 1, None), &[]);
        assert_eq!(result, vec![Recommendation::GreatJob]);
    }

    #[test]
    fn test_goal_tips_render() {
        let tip = Recommendation::GoalTip {
            goal: FitnessGoal::Mass,
        };
        assert!(tip.render(Locale::Ru).contains("70-85%"));
        assert!(tip.render(Locale::En).contains("6-12 reps"));
        assert_eq!(
            Recommendation::GreatJob.render(Locale::Ru),
            "✅ Отличная работа! Продолжайте в том же духе."
        );
    }
}
