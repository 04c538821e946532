use chrono::{DateTime, Utc};

use crate::format::{format_month_year, format_short_date};
use crate::models::category::Category;
use crate::models::report::{AllocationSlice, DeadlineStatus, GoalProgress, ProgressBand};

const MS_PER_DAY: i64 = 86_400_000;

/// Goal progress, deadline proximity, and the per-category breakdown.
pub struct GoalService;

impl GoalService {
    pub fn new() -> Self {
        Self
    }

    /// `percent = min(100, 100 * saved / goal)` when the goal is positive,
    /// otherwise 0. Overshoot renders as a full bar and `remaining` never
    /// goes below zero.
    pub fn progress(&self, category: &Category) -> GoalProgress {
        let goal = category.goal();
        let saved = category.saved();

        let percent = if goal > 0.0 {
            (saved / goal * 100.0).min(100.0)
        } else {
            0.0
        };

        GoalProgress {
            percent,
            reached: percent >= 100.0,
            remaining: (goal - saved).max(0.0),
        }
    }

    pub fn progress_band(&self, progress: &GoalProgress) -> ProgressBand {
        if progress.reached {
            ProgressBand::Reached
        } else if progress.percent >= 50.0 {
            ProgressBand::Halfway
        } else {
            ProgressBand::Started
        }
    }

    /// Whole days from `now` until the deadline (taken as UTC midnight),
    /// rounded up. `None` when the category has no deadline.
    pub fn deadline_status(&self, category: &Category, now: DateTime<Utc>) -> Option<DeadlineStatus> {
        let deadline = category.goal_deadline?;
        let midnight = deadline.and_hms_opt(0, 0, 0)?.and_utc();
        let diff_ms = (midnight - now).num_milliseconds();
        let days = diff_ms.div_euclid(MS_PER_DAY) + i64::from(diff_ms.rem_euclid(MS_PER_DAY) != 0);

        Some(match days {
            d if d > 0 => DeadlineStatus::Upcoming {
                deadline,
                days_left: d,
            },
            0 => DeadlineStatus::DueToday { deadline },
            _ => DeadlineStatus::Passed { deadline },
        })
    }

    /// Segments for the "by category" chart: each category's goal amount,
    /// skipping zero-sized ones. Input order is kept and same-named
    /// categories stay separate.
    pub fn allocation(&self, categories: &[Category]) -> Vec<AllocationSlice> {
        categories
            .iter()
            .map(|c| AllocationSlice {
                name: c.name.clone(),
                value: c.goal(),
            })
            .filter(|slice| slice.value > 0.0)
            .collect()
    }
}

impl Default for GoalService {
    fn default() -> Self {
        Self::new()
    }
}

/// The user-facing line under a category card.
pub fn deadline_message(status: &DeadlineStatus) -> String {
    match status {
        DeadlineStatus::Upcoming { deadline, days_left } => {
            let unit = if *days_left == 1 { "day" } else { "days" };
            format!(
                "Target: {} · ~{days_left} {unit} left",
                format_month_year(*deadline)
            )
        }
        DeadlineStatus::DueToday { .. } => "Deadline is today!".to_string(),
        DeadlineStatus::Passed { deadline } => {
            format!("Deadline passed ({})", format_short_date(*deadline))
        }
    }
}
