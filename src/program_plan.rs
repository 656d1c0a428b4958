//! Calendar view of a training program
//!
//! Walks the days of a month that fall inside a program's date range and
//! attaches the exercises scheduled on each weekday.

use chrono::{Datelike, Months, NaiveDate};
use std::collections::BTreeMap;

use crate::error::ValidationError;
use crate::models::{PlanDay, ProgramExercise, TrainingProgram};

/// 1 = Monday .. 7 = Sunday
pub fn day_of_week(date: NaiveDate) -> u8 {
    date.weekday().number_from_monday() as u8
}

/// First and last day of a calendar month
pub fn month_bounds(year: i32, month: u32) -> Result<(NaiveDate, NaiveDate), ValidationError> {
    let invalid = || ValidationError::OutOfRange {
        field: "month",
        rule: "a valid year and month 1-12",
        value: format!("{}-{}", year, month),
    };

    let first = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(invalid)?;
    let last = first
        .checked_add_months(Months::new(1))
        .and_then(|next| next.pred_opt())
        .ok_or_else(invalid)?;
    Ok((first, last))
}

/// Plan-day generator
pub struct PlanDayGenerator;

impl PlanDayGenerator {
    /// Planned days of `program` within `year`/`month`.
    ///
    /// Only days inside both the month and the program range are produced,
    /// and days with nothing scheduled are skipped. Exercises keep their
    /// `order` within a day.
    pub fn plan_days(
        program: &TrainingProgram,
        exercises: &[ProgramExercise],
        year: i32,
        month: u32,
    ) -> Result<Vec<PlanDay>, ValidationError> {
        let (month_start, month_end) = month_bounds(year, month)?;

        let start = program.start_date.max(month_start);
        let end = program.end_date.min(month_end);
        if start > end {
            return Ok(Vec::new());
        }

        let mut by_weekday: BTreeMap<u8, Vec<ProgramExercise>> = BTreeMap::new();
        for exercise in exercises {
            by_weekday
                .entry(exercise.day_of_week)
                .or_default()
                .push(exercise.clone());
        }
        for day in by_weekday.values_mut() {
            day.sort_by_key(|exercise| exercise.order);
        }

        Ok(start
            .iter_days()
            .take_while(|date| *date <= end)
            .filter_map(|date| {
                by_weekday.get(&day_of_week(date)).map(|exercises| PlanDay {
                    date,
                    exercises: exercises.clone(),
                })
            })
            .collect())
    }
}
