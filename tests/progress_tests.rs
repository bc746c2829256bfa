// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use wastewatch::errors::ValidationError;
use wastewatch::models::{PeriodType, TargetStatus, TargetType, WasteTarget};
use wastewatch::progress::{
    accrue, current_period, derive_status, evaluate, percentage_used, reset_progress,
};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn target(target_type: TargetType) -> WasteTarget {
    WasteTarget {
        id: 1,
        name: "Kitchen waste".into(),
        category: None,
        target_type,
        weight_limit_kg: Some(dec!(100)),
        cost_limit: Some(dec!(500000)),
        currency: "IDR".into(),
        period_type: PeriodType::Monthly,
        target_period_start: date(2025, 1, 1),
        target_period_end: None,
        current_weight: Decimal::ZERO,
        current_cost: Decimal::ZERO,
        is_active: true,
    }
}

#[test]
fn percentage_untrackable_limits() {
    for current in [dec!(0), dec!(50), dec!(-3)] {
        assert_eq!(percentage_used(current, None), None);
        assert_eq!(percentage_used(current, Some(dec!(0))), None);
        assert_eq!(percentage_used(current, Some(dec!(-10))), None);
    }
}

#[test]
fn percentage_zero_and_unclamped() {
    assert_eq!(percentage_used(dec!(0), Some(dec!(42))), Some(dec!(0)));
    assert_eq!(percentage_used(dec!(150), Some(dec!(100))), Some(dec!(150)));
    assert_eq!(percentage_used(dec!(25), Some(dec!(200))), Some(dec!(12.5)));
}

#[test]
fn percentage_out_of_range_not_trackable() {
    let tiny = dec!(0.0000000000000000000001);
    assert_eq!(percentage_used(dec!(1000000), Some(tiny)), None);
    assert_eq!(percentage_used(Decimal::MAX, Some(dec!(0.5))), None);

    let mut t = target(TargetType::Both);
    t.weight_limit_kg = Some(tiny);
    t.current_weight = dec!(1000000);
    t.current_cost = dec!(450000);
    let p = evaluate(&t);
    assert_eq!(p.weight_percentage_used, None);
    assert_eq!(p.status, TargetStatus::Warning);
}

#[test]
fn status_thresholds() {
    assert_eq!(derive_status(Some(dec!(79.99)), None), TargetStatus::OnTrack);
    assert_eq!(derive_status(Some(dec!(80)), None), TargetStatus::Warning);
    assert_eq!(derive_status(None, Some(dec!(99.9))), TargetStatus::Warning);
    assert_eq!(derive_status(None, Some(dec!(100))), TargetStatus::Exceeded);
    assert_eq!(derive_status(None, None), TargetStatus::OnTrack);
}

#[test]
fn exceeded_dominates_other_dimension() {
    assert_eq!(derive_status(Some(dec!(0)), Some(dec!(100))), TargetStatus::Exceeded);
    assert_eq!(derive_status(Some(dec!(130)), Some(dec!(0))), TargetStatus::Exceeded);
    assert_eq!(derive_status(Some(dec!(85)), Some(dec!(10))), TargetStatus::Warning);
}

#[test]
fn weight_target_in_warning() {
    let mut t = target(TargetType::Weight);
    t.cost_limit = None;
    t.current_weight = dec!(85);
    let p = evaluate(&t);
    assert_eq!(p.weight_percentage_used, Some(dec!(85)));
    assert_eq!(p.cost_percentage_used, None);
    assert_eq!(p.status, TargetStatus::Warning);
}

#[test]
fn both_target_worst_dimension_wins() {
    let mut t = target(TargetType::Both);
    t.current_weight = dec!(50);
    t.current_cost = dec!(600000);
    let p = evaluate(&t);
    assert_eq!(p.weight_percentage_used, Some(dec!(50)));
    assert_eq!(p.cost_percentage_used, Some(dec!(120)));
    assert_eq!(p.status, TargetStatus::Exceeded);
}

#[test]
fn untracked_dimension_ignored() {
    let mut t = target(TargetType::Weight);
    t.current_weight = dec!(10);
    t.current_cost = dec!(9999999); // way over cost_limit, but cost is not tracked
    let p = evaluate(&t);
    assert_eq!(p.cost_percentage_used, None);
    assert_eq!(p.status, TargetStatus::OnTrack);
}

#[test]
fn invalid_limit_not_trackable() {
    let mut t = target(TargetType::Both);
    t.weight_limit_kg = Some(dec!(0));
    t.current_weight = dec!(500);
    t.current_cost = dec!(100000);
    let p = evaluate(&t);
    assert_eq!(p.weight_percentage_used, None);
    assert_eq!(p.cost_percentage_used, Some(dec!(20)));
    assert_eq!(p.status, TargetStatus::OnTrack);
}

#[test]
fn reset_returns_to_on_track() {
    let mut t = target(TargetType::Both);
    t.current_weight = dec!(250);
    t.current_cost = dec!(750000);
    t.target_period_end = Some(date(2025, 12, 31));
    assert_eq!(evaluate(&t).status, TargetStatus::Exceeded);

    let r = reset_progress(t.clone());
    assert_eq!(r.current_weight, Decimal::ZERO);
    assert_eq!(r.current_cost, Decimal::ZERO);
    assert_eq!(r.weight_limit_kg, t.weight_limit_kg);
    assert_eq!(r.cost_limit, t.cost_limit);
    assert_eq!(r.target_period_start, t.target_period_start);
    assert_eq!(r.target_period_end, t.target_period_end);
    assert_eq!(r.is_active, t.is_active);

    let p = evaluate(&r);
    assert_eq!(derive_status(p.weight_percentage_used, p.cost_percentage_used), TargetStatus::OnTrack);
}

#[test]
fn accrual_is_monotonic() {
    let t = target(TargetType::Both);
    let t = accrue(t, dec!(40), dec!(200000)).unwrap();
    let t = accrue(t, dec!(45), dec!(0)).unwrap();
    assert_eq!(t.current_weight, dec!(85));
    assert_eq!(evaluate(&t).status, TargetStatus::Warning);

    let err = accrue(t.clone(), dec!(-1), dec!(0)).unwrap_err();
    assert!(matches!(err, ValidationError::NegativeAccrual { field: "weight_kg", .. }));
    let err = accrue(t, dec!(0), dec!(-5)).unwrap_err();
    assert!(matches!(err, ValidationError::NegativeAccrual { field: "cost", .. }));
}

#[test]
fn accrual_overflow_is_an_error() {
    let mut t = target(TargetType::Both);
    t.current_weight = Decimal::MAX;
    let err = accrue(t.clone(), dec!(1), dec!(0)).unwrap_err();
    assert_eq!(err, ValidationError::Overflow { field: "current_weight" });

    t.current_weight = Decimal::ZERO;
    t.current_cost = Decimal::MAX;
    let err = accrue(t, dec!(0), dec!(1)).unwrap_err();
    assert_eq!(err, ValidationError::Overflow { field: "current_cost" });
}

#[test]
fn target_requires_limits_for_tracked_dimensions() {
    let mut t = target(TargetType::Cost);
    t.cost_limit = None;
    assert!(matches!(t.validate(), Err(ValidationError::MissingLimit { field: "cost_limit", .. })));

    let mut t = target(TargetType::Weight);
    t.weight_limit_kg = Some(dec!(-5));
    assert!(matches!(t.validate(), Err(ValidationError::NonPositive { .. })));

    let mut t = target(TargetType::Weight);
    t.cost_limit = None;
    assert!(t.validate().is_ok());
}

#[test]
fn monthly_period_aligned_to_start() {
    let mut t = target(TargetType::Weight);
    t.target_period_start = date(2025, 1, 15);
    let w = current_period(&t, date(2025, 3, 20)).unwrap();
    assert_eq!((w.start, w.end), (date(2025, 3, 15), date(2025, 4, 14)));

    let w = current_period(&t, date(2025, 3, 14)).unwrap();
    assert_eq!((w.start, w.end), (date(2025, 2, 15), date(2025, 3, 14)));
}

#[test]
fn monthly_period_from_month_end() {
    let mut t = target(TargetType::Weight);
    t.target_period_start = date(2025, 1, 31);

    let w = current_period(&t, date(2025, 3, 30)).unwrap();
    assert_eq!((w.start, w.end), (date(2025, 2, 28), date(2025, 3, 30)));

    let w = current_period(&t, date(2025, 3, 31)).unwrap();
    assert_eq!((w.start, w.end), (date(2025, 3, 31), date(2025, 4, 29)));

    let w = current_period(&t, date(2025, 4, 30)).unwrap();
    assert_eq!((w.start, w.end), (date(2025, 4, 30), date(2025, 5, 30)));
}

#[test]
fn weekly_daily_quarterly_yearly_periods() {
    let mut t = target(TargetType::Weight);

    t.period_type = PeriodType::Weekly;
    let w = current_period(&t, date(2025, 1, 16)).unwrap();
    assert_eq!((w.start, w.end), (date(2025, 1, 15), date(2025, 1, 21)));

    t.period_type = PeriodType::Daily;
    let w = current_period(&t, date(2025, 6, 2)).unwrap();
    assert_eq!((w.start, w.end), (date(2025, 6, 2), date(2025, 6, 2)));

    t.period_type = PeriodType::Quarterly;
    let w = current_period(&t, date(2025, 5, 10)).unwrap();
    assert_eq!((w.start, w.end), (date(2025, 4, 1), date(2025, 6, 30)));

    t.period_type = PeriodType::Yearly;
    let w = current_period(&t, date(2026, 2, 1)).unwrap();
    assert_eq!((w.start, w.end), (date(2026, 1, 1), date(2026, 12, 31)));
}

#[test]
fn period_outside_bounds_and_clipped() {
    let mut t = target(TargetType::Weight);
    t.period_type = PeriodType::Quarterly;
    t.target_period_end = Some(date(2025, 6, 15));

    assert!(current_period(&t, date(2024, 12, 31)).is_none());
    assert!(current_period(&t, date(2025, 6, 16)).is_none());

    let w = current_period(&t, date(2025, 5, 10)).unwrap();
    assert_eq!((w.start, w.end), (date(2025, 4, 1), date(2025, 6, 15)));
}
