//! Goal construction and progress tracking

use chrono::{DateTime, Months, NaiveDate, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tracing::info;

use crate::locale::Locale;
use crate::models::Goal;
use crate::requests::GoalRequest;

/// Months ahead of today a goal is due when no target date is given
pub const DEFAULT_GOAL_HORIZON_MONTHS: u32 = 1;

/// Target date used when a goal request does not name one
pub fn default_target_date(today: NaiveDate) -> NaiveDate {
    today
        .checked_add_months(Months::new(DEFAULT_GOAL_HORIZON_MONTHS))
        .unwrap_or(today)
}

/// Build a new, unsaved goal from a request
pub fn new_goal(profile_id: i64, request: &GoalRequest, locale: Locale, now: DateTime<Utc>) -> Goal {
    let unit = if request.unit.trim().is_empty() {
        locale.default_goal_unit(request.goal_type).to_string()
    } else {
        request.unit.clone()
    };

    Goal {
        id: 0,
        profile_id,
        title: request.title.clone(),
        description: request.description.clone(),
        goal_type: request.goal_type,
        exercise: request.exercise.clone(),
        target_value: request.target_value,
        current_value: Decimal::ZERO,
        unit,
        target_date: request
            .target_date
            .unwrap_or_else(|| default_target_date(now.date_naive())),
        achieved: false,
        achieved_date: None,
        created_at: now,
        updated_at: now,
    }
}

/// Record a new current value. Returns true when this update achieved the goal.
///
/// A goal is achieved at most once; later updates never clear the flag or
/// move the achieved date.
pub fn record_progress(goal: &mut Goal, current_value: Decimal, now: DateTime<Utc>) -> bool {
    goal.current_value = current_value;
    goal.updated_at = now;

    if goal.current_value >= goal.target_value && !goal.achieved {
        goal.achieved = true;
        goal.achieved_date = Some(now);
        info!(goal_id = goal.id, title = %goal.title, "Goal achieved");
        return true;
    }

    false
}

/// Replace the editable fields of a goal. The current value is kept, so a
/// lowered target can achieve the goal; returns true when it does.
///
/// An empty unit or a missing target date leaves the stored one in place.
pub fn apply_update(goal: &mut Goal, request: &GoalRequest, now: DateTime<Utc>) -> bool {
    goal.title = request.title.clone();
    goal.description = request.description.clone();
    goal.goal_type = request.goal_type;
    goal.exercise = request.exercise.clone();
    goal.target_value = request.target_value;
    if !request.unit.trim().is_empty() {
        goal.unit = request.unit.clone();
    }
    if let Some(target_date) = request.target_date {
        goal.target_date = target_date;
    }

    let current = goal.current_value;
    record_progress(goal, current, now)
}

/// Completion percentage, capped at 100
pub fn completion_percentage(goal: &Goal) -> Decimal {
    if goal.target_value <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    // Only a ratio far above 100% can overflow
    goal.current_value
        .checked_div(goal.target_value)
        .and_then(|ratio| ratio.checked_mul(dec!(100)))
        .map_or(dec!(100), |percentage| percentage.min(dec!(100)))
}

/// Days from `today` until the target date, negative when overdue
pub fn days_until_target(goal: &Goal, today: NaiveDate) -> i64 {
    (goal.target_date - today).num_days()
}
