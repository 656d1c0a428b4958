//! Message catalog for user-facing text produced by the analytics layer
//!
//! Russian is the default locale of the training log; English is provided for
//! the CLI and tests.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::models::GoalType;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    Ru,
    En,
}

impl std::str::FromStr for Locale {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "ru" | "ru-ru" => Ok(Locale::Ru),
            "en" | "en-us" | "en-gb" => Ok(Locale::En),
            _ => Err(ValidationError::UnknownVariant {
                field: "locale",
                value: s.to_string(),
            }),
        }
    }
}

impl Locale {
    /// Label of a chart point for 1-based `week`
    pub fn week_label(&self, week: usize) -> String {
        match self {
            Locale::Ru => format!("Неделя {}", week),
            Locale::En => format!("Week {}", week),
        }
    }

    /// Unit used for a goal when the request does not name one
    pub fn default_goal_unit(&self, goal_type: GoalType) -> &'static str {
        match (self, goal_type) {
            (Locale::Ru, GoalType::Weight | GoalType::BodyWeight) => "кг",
            (Locale::Ru, GoalType::Reps) => "раз",
            (Locale::Ru, GoalType::Volume) => "кг×раз",
            (Locale::Ru, GoalType::Custom) => "ед.",
            (Locale::En, GoalType::Weight | GoalType::BodyWeight) => "kg",
            (Locale::En, GoalType::Reps) => "reps",
            (Locale::En, GoalType::Volume) => "kg×reps",
            (Locale::En, GoalType::Custom) => "units",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_week_labels() {
        assert_eq!(Locale::Ru.week_label(1), "Неделя 1");
        assert_eq!(Locale::En.week_label(4), "Week 4");
    }

    #[test]
    fn test_default_goal_units() {
        assert_eq!(Locale::Ru.default_goal_unit(GoalType::Weight), "кг");
        assert_eq!(Locale::Ru.default_goal_unit(GoalType::Reps), "раз");
        assert_eq!(Locale::Ru.default_goal_unit(GoalType::Volume), "кг×раз");
        assert_eq!(Locale::Ru.default_goal_unit(GoalType::BodyWeight), "кг");
        assert_eq!(Locale::Ru.default_goal_unit(GoalType::Custom), "ед.");
    }

    #[test]
    fn test_locale_parsing() {
        assert_eq!("RU".parse::<Locale>().unwrap(), Locale::Ru);
        assert_eq!("en".parse::<Locale>().unwrap(), Locale::En);
        assert!("de".parse::<Locale>().is_err());
    }
}
