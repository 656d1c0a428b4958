//! Request validation
//!
//! Every write request is checked here before it reaches the store or a
//! calculator. Validation only rejects; defaults (dates, units, ratings) are
//! applied by the store.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::error::ValidationError;
use crate::one_rm::{OneRmRequest, MAX_REPS};
use crate::requests::{
    BodyWeightRequest, ExerciseRequest, GoalProgressRequest, GoalRequest, PersonalRecordRequest,
    ProfileRequest, ProgramExerciseRequest, SessionExerciseRequest, TrainingProgramRequest,
    TrainingRecordRequest,
};

/// Wire format of every date field
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Default page size of the training history
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Largest page size a caller may request
pub const MAX_PAGE_SIZE: u32 = 100;

/// Heaviest load, in kg, any lift or body-weight entry may carry
pub const MAX_LOAD_KG: Decimal = dec!(1000);

/// Rating assumed for energy and mood when none is given
pub const DEFAULT_RATING: u8 = 5;

/// Soreness assumed when none is given
pub const DEFAULT_SORENESS: u8 = 1;

/// A request that can check its own fields
pub trait Validate {
    fn validate(&self) -> Result<(), ValidationError>;
}

/// Parse a YYYY-MM-DD date
pub fn parse_date(field: &'static str, value: &str) -> Result<NaiveDate, ValidationError> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).map_err(|_| ValidationError::InvalidDate {
        field,
        value: value.to_string(),
    })
}

/// Keep a 1-10 rating, or fall back to `default`
pub fn clamp_rating(value: u8, default: u8) -> u8 {
    if (1..=10).contains(&value) {
        value
    } else {
        default
    }
}

/// Page request for the training history
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: u32,
    pub page_size: u32,
}

impl Pagination {
    /// Page below 1 becomes 1; page size outside 1..=100 becomes 20
    pub fn new(page: u32, page_size: u32) -> Self {
        Pagination {
            page: page.max(1),
            page_size: if (1..=MAX_PAGE_SIZE).contains(&page_size) {
                page_size
            } else {
                DEFAULT_PAGE_SIZE
            },
        }
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.page_size)
    }

    pub fn has_more(&self, total: u64) -> bool {
        total > self.offset() + u64::from(self.page_size)
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Pagination::new(1, DEFAULT_PAGE_SIZE)
    }
}

fn required(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::Required { field });
    }
    Ok(())
}

fn positive(field: &'static str, value: Decimal) -> Result<(), ValidationError> {
    if value <= Decimal::ZERO {
        return Err(ValidationError::OutOfRange {
            field,
            rule: "greater than 0",
            value: value.to_string(),
        });
    }
    Ok(())
}

/// A lifted or body weight in (0, MAX_LOAD_KG]
fn load_kg(field: &'static str, value: Decimal) -> Result<(), ValidationError> {
    positive(field, value)?;
    at_most_max_load(field, value)
}

/// A planned or logged working weight in [0, MAX_LOAD_KG]; zero means bodyweight
fn working_load_kg(field: &'static str, value: Decimal) -> Result<(), ValidationError> {
    if value < Decimal::ZERO {
        return Err(ValidationError::OutOfRange {
            field,
            rule: "0 or greater",
            value: value.to_string(),
        });
    }
    at_most_max_load(field, value)
}

fn at_most_max_load(field: &'static str, value: Decimal) -> Result<(), ValidationError> {
    if value > MAX_LOAD_KG {
        return Err(ValidationError::OutOfRange {
            field,
            rule: "at most 1000 kg",
            value: value.to_string(),
        });
    }
    Ok(())
}

fn at_least_one(field: &'static str, value: u32) -> Result<(), ValidationError> {
    if value < 1 {
        return Err(ValidationError::OutOfRange {
            field,
            rule: "at least 1",
            value: value.to_string(),
        });
    }
    Ok(())
}

impl Validate for OneRmRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        load_kg("weight", self.weight)?;

        if !(1..=MAX_REPS).contains(&self.reps) {
            return Err(ValidationError::OutOfRange {
                field: "reps",
                rule: "between 1 and 20",
                value: self.reps.to_string(),
            });
        }

        if self.percentage < dec!(50) || self.percentage > dec!(100) {
            return Err(ValidationError::OutOfRange {
                field: "percentage",
                rule: "between 50 and 100",
                value: self.percentage.to_string(),
            });
        }

        Ok(())
    }
}

impl Validate for ProfileRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        required("name", &self.name)?;

        if let Some(weight) = self.weight {
            load_kg("weight", weight)?;
        }
        if let Some(height) = self.height {
            at_least_one("height", u32::from(height))?;
        }

        Ok(())
    }
}

impl Validate for ExerciseRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        required("name", &self.name)
    }
}

impl Validate for TrainingRecordRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        required("exercise", &self.exercise)
    }
}

impl Validate for BodyWeightRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        load_kg("weight", self.weight)
    }
}

impl Validate for PersonalRecordRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        required("exercise", &self.exercise)?;
        load_kg("weight", self.weight)?;
        at_least_one("reps", self.reps)
    }
}

impl Validate for GoalRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        required("title", &self.title)?;
        positive("targetValue", self.target_value)
    }
}

impl Validate for GoalProgressRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.current_value < Decimal::ZERO {
            return Err(ValidationError::OutOfRange {
                field: "currentValue",
                rule: "0 or greater",
                value: self.current_value.to_string(),
            });
        }
        Ok(())
    }
}

impl Validate for SessionExerciseRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        required("exercise", &self.exercise)?;

        for set in &self.sets {
            working_load_kg("sets.weight", set.weight)?;
            if set.rpe > 10 {
                return Err(ValidationError::OutOfRange {
                    field: "sets.rpe",
                    rule: "between 0 and 10",
                    value: set.rpe.to_string(),
                });
            }
        }

        Ok(())
    }
}

impl Validate for TrainingProgramRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        required("name", &self.name)?;

        if self.end_date < self.start_date {
            return Err(ValidationError::OutOfRange {
                field: "endDate",
                rule: "on or after startDate",
                value: self.end_date.to_string(),
            });
        }

        Ok(())
    }
}

impl Validate for ProgramExerciseRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        required("exercise", &self.exercise)?;

        if !(1..=7).contains(&self.day_of_week) {
            return Err(ValidationError::OutOfRange {
                field: "dayOfWeek",
                rule: "between 1 and 7",
                value: self.day_of_week.to_string(),
            });
        }

        at_least_one("order", self.order)?;
        at_least_one("sets", self.sets)?;
        at_least_one("reps", self.reps)?;
        working_load_kg("weight", self.weight)
    }
}
