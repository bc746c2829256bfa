// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Progress and status of waste-reduction targets.
//!
//! Nothing here is persisted: percentages and status are recomputed from the
//! counters every time a target is read.

use crate::errors::ValidationError;
use crate::models::{PeriodType, TargetStatus, WasteTarget};
use chrono::{Datelike, Days, Months, NaiveDate};
use rust_decimal::Decimal;
use serde::Serialize;

const HUNDRED: Decimal = Decimal::ONE_HUNDRED;
const WARNING_PCT: Decimal = Decimal::from_parts(80, 0, 0, false, 0);

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TargetProgress {
    pub weight_percentage_used: Option<Decimal>,
    pub cost_percentage_used: Option<Decimal>,
    pub status: TargetStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PeriodWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// `current / limit * 100`, or `None` when the limit is missing or not positive,
/// or the ratio does not fit in a `Decimal`.
pub fn percentage_used(current: Decimal, limit: Option<Decimal>) -> Option<Decimal> {
    match limit {
        Some(l) if l > Decimal::ZERO => current.checked_div(l)?.checked_mul(HUNDRED),
        _ => None,
    }
}

pub fn status_for(pct: Decimal) -> TargetStatus {
    if pct >= HUNDRED {
        TargetStatus::Exceeded
    } else if pct >= WARNING_PCT {
        TargetStatus::Warning
    } else {
        TargetStatus::OnTrack
    }
}

/// Worst status across the tracked dimensions; on_track when none is tracked.
pub fn derive_status(weight_pct: Option<Decimal>, cost_pct: Option<Decimal>) -> TargetStatus {
    [weight_pct, cost_pct]
        .into_iter()
        .flatten()
        .map(status_for)
        .max()
        .unwrap_or(TargetStatus::OnTrack)
}

pub fn evaluate(target: &WasteTarget) -> TargetProgress {
    let weight_pct = if target.target_type.tracks_weight() {
        percentage_used(target.current_weight, target.weight_limit_kg)
    } else {
        None
    };
    let cost_pct = if target.target_type.tracks_cost() {
        percentage_used(target.current_cost, target.cost_limit)
    } else {
        None
    };
    TargetProgress {
        weight_percentage_used: weight_pct,
        cost_percentage_used: cost_pct,
        status: derive_status(weight_pct, cost_pct),
    }
}

/// Zeroes both counters. Limits, period bounds and `is_active` are untouched.
pub fn reset_progress(mut target: WasteTarget) -> WasteTarget {
    target.current_weight = Decimal::ZERO;
    target.current_cost = Decimal::ZERO;
    target
}

/// Adds to the counters. Counters only grow between resets.
pub fn accrue(
    mut target: WasteTarget,
    weight_kg: Decimal,
    cost: Decimal,
) -> Result<WasteTarget, ValidationError> {
    if weight_kg < Decimal::ZERO {
        return Err(ValidationError::NegativeAccrual {
            field: "weight_kg",
            value: weight_kg,
        });
    }
    if cost < Decimal::ZERO {
        return Err(ValidationError::NegativeAccrual {
            field: "cost",
            value: cost,
        });
    }
    target.current_weight = target
        .current_weight
        .checked_add(weight_kg)
        .ok_or(ValidationError::Overflow { field: "current_weight" })?;
    target.current_cost = target
        .current_cost
        .checked_add(cost)
        .ok_or(ValidationError::Overflow { field: "current_cost" })?;
    Ok(target)
}

fn months_between(from: NaiveDate, to: NaiveDate) -> u32 {
    let raw = (to.year() - from.year()) * 12 + to.month() as i32 - from.month() as i32;
    let mut n = raw.max(0) as u32;
    // Month-end clamping can push the anniversary past `to`.
    while n > 0 && from.checked_add_months(Months::new(n)).is_none_or(|d| d > to) {
        n -= 1;
    }
    n
}

fn window_for(period: PeriodType, start: NaiveDate, today: NaiveDate) -> Option<PeriodWindow> {
    let step_months = match period {
        PeriodType::Daily => return Some(PeriodWindow { start: today, end: today }),
        PeriodType::Weekly => {
            let offset = (today - start).num_days() as u64 / 7 * 7;
            let begin = start.checked_add_days(Days::new(offset))?;
            let end = begin.checked_add_days(Days::new(6))?;
            return Some(PeriodWindow { start: begin, end });
        }
        PeriodType::Monthly => 1,
        PeriodType::Quarterly => 3,
        PeriodType::Yearly => 12,
    };
    let steps = months_between(start, today) / step_months;
    let begin = start.checked_add_months(Months::new(steps * step_months))?;
    let next = start.checked_add_months(Months::new((steps + 1) * step_months))?;
    let end = next.pred_opt()?;
    Some(PeriodWindow { start: begin, end })
}

/// The period window containing `today`, aligned to the target's start and
/// clipped to its end. `None` outside `[start, end]`.
pub fn current_period(target: &WasteTarget, today: NaiveDate) -> Option<PeriodWindow> {
    if today < target.target_period_start {
        return None;
    }
    if target.target_period_end.is_some_and(|end| today > end) {
        return None;
    }
    let mut window = window_for(target.period_type, target.target_period_start, today)?;
    if let Some(end) = target.target_period_end {
        window.end = window.end.min(end);
    }
    Some(window)
}
