//! Per-week progress chart series over the legacy training grid
//!
//! One point per program week, each mapping exercise name to a value under
//! the selected metric. When a profile has several records for the same
//! exercise only the first one (in retrieval order) feeds the chart.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

use crate::error::ValidationError;
use crate::locale::Locale;
use crate::models::{GridCell, TrainingRecord, DAYS_PER_WEEK, PROGRAM_WEEKS};

/// Period echoed back when the caller does not name one
pub const DEFAULT_PERIOD: &str = "all";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartMetric {
    /// Heaviest cell of the week
    #[default]
    Weight,
    /// Σ reps × kg over the week
    Volume,
    /// Average loaded weight as a percentage of the week's heaviest cell
    Intensity,
}

impl ChartMetric {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChartMetric::Weight => "weight",
            ChartMetric::Volume => "volume",
            ChartMetric::Intensity => "intensity",
        }
    }
}

impl std::str::FromStr for ChartMetric {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "weight" => Ok(ChartMetric::Weight),
            "volume" => Ok(ChartMetric::Volume),
            "intensity" => Ok(ChartMetric::Intensity),
            _ => Err(ValidationError::UnknownVariant {
                field: "type",
                value: s.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartPoint {
    /// Localized week label
    pub week: String,
    pub exercise_data: BTreeMap<String, Decimal>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartSeries {
    pub chart_data: Vec<ChartPoint>,
    /// Charted exercises, sorted
    pub exercises: Vec<String>,
    pub period: String,
    pub chart_type: ChartMetric,
}

/// Builds chart series from training records
pub struct ChartBuilder {
    locale: Locale,
    period: String,
}

impl ChartBuilder {
    pub fn new() -> Self {
        ChartBuilder {
            locale: Locale::default(),
            period: DEFAULT_PERIOD.to_string(),
        }
    }

    pub fn with_locale(mut self, locale: Locale) -> Self {
        self.locale = locale;
        self
    }

    /// Period label echoed in the series. Empty keeps the default.
    pub fn with_period(mut self, period: impl Into<String>) -> Self {
        let period = period.into();
        if !period.trim().is_empty() {
            self.period = period;
        }
        self
    }

    /// Build the four weekly points for `metric`.
    ///
    /// A non-empty `filter` restricts the chart to records whose exercise is
    /// in the list.
    pub fn build(&self, records: &[TrainingRecord], metric: ChartMetric, filter: &[String]) -> ChartSeries {
        let selected: Vec<&TrainingRecord> = records
            .iter()
            .filter(|record| filter.is_empty() || filter.contains(&record.exercise))
            .collect();

        let exercises = Self::distinct_exercises(selected.iter().copied());

        debug!(
            records = selected.len(),
            exercises = exercises.len(),
            metric = metric.as_str(),
            "Building progress chart"
        );

        let chart_data = (1..=PROGRAM_WEEKS)
            .map(|week| {
                let exercise_data = exercises
                    .iter()
                    .map(|name| {
                        let value = selected
                            .iter()
                            .find(|record| &record.exercise == name)
                            .and_then(|record| record.grid.week(week))
                            .map(|cells| Self::week_value(cells, metric))
                            .unwrap_or(Decimal::ZERO);
                        (name.clone(), value)
                    })
                    .collect();

                ChartPoint {
                    week: self.locale.week_label(week),
                    exercise_data,
                }
            })
            .collect();

        ChartSeries {
            chart_data,
            exercises,
            period: self.period.clone(),
            chart_type: metric,
        }
    }

    /// Sorted distinct non-empty exercise names
    pub fn distinct_exercises<'a>(records: impl IntoIterator<Item = &'a TrainingRecord>) -> Vec<String> {
        records
            .into_iter()
            .filter(|record| record.has_exercise())
            .map(|record| record.exercise.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    fn week_value(cells: &[GridCell; DAYS_PER_WEEK], metric: ChartMetric) -> Decimal {
        match metric {
            ChartMetric::Weight => week_max_weight(cells),
            ChartMetric::Volume => week_volume(cells),
            ChartMetric::Intensity => week_intensity(cells),
        }
    }
}

impl Default for ChartBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Heaviest cell weight of one week
pub fn week_max_weight(cells: &[GridCell]) -> Decimal {
    Decimal::from(cells.iter().map(|cell| cell.kg).max().unwrap_or(0))
}

/// Σ reps × kg over one week
pub fn week_volume(cells: &[GridCell]) -> Decimal {
    Decimal::from(cells.iter().map(GridCell::volume).sum::<u64>())
}

/// Unrounded (volume / reps) / max weight × 100 over the loaded cells of one
/// week. Zero when nothing was lifted.
pub fn week_intensity(cells: &[GridCell]) -> Decimal {
    let loaded = cells.iter().filter(|cell| cell.kg > 0);

    let (volume, reps, max_weight) = loaded.fold((0u64, 0u64, 0u32), |(volume, reps, max), cell| {
        (volume + cell.volume(), reps + u64::from(cell.reps), max.max(cell.kg))
    });

    if reps == 0 || max_weight == 0 {
        return Decimal::ZERO;
    }

    let average_weight = Decimal::from(volume) / Decimal::from(reps);
    average_weight / Decimal::from(max_weight) * dec!(100)
}
