// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use rusqlite::Connection;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tempfile::NamedTempFile;
use wastewatch::commands::targets;
use wastewatch::models::{FoodCategory, PeriodType, TargetStatus, TargetType};
use wastewatch::{cli, db};

fn setup() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    db::init_schema(&conn).unwrap();
    conn
}

fn run_target(conn: &Connection, args: &[&str]) -> anyhow::Result<()> {
    let mut argv = vec!["wastewatch", "target"];
    argv.extend_from_slice(args);
    let matches = cli::build_cli().get_matches_from(argv);
    match matches.subcommand() {
        Some(("target", m)) => targets::handle(conn, m),
        _ => panic!("target command not parsed"),
    }
}

fn add_both_target(conn: &Connection) {
    run_target(
        conn,
        &[
            "add",
            "--name",
            "Kitchen Q3",
            "--category",
            "protein",
            "--type",
            "both",
            "--weight-limit",
            "100",
            "--cost-limit",
            "500000",
            "--currency",
            "idr",
            "--period",
            "monthly",
            "--start",
            "2025-07-01",
        ],
    )
    .unwrap();
}

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 8, 10).unwrap()
}

#[test]
fn add_target_and_list_progress() {
    let conn = setup();
    add_both_target(&conn);

    let views = targets::target_views(&conn, false, today()).unwrap();
    assert_eq!(views.len(), 1);
    let v = &views[0];
    assert_eq!(v.target.name, "Kitchen Q3");
    assert_eq!(v.target.category, Some(FoodCategory::Protein));
    assert_eq!(v.target.target_type, TargetType::Both);
    assert_eq!(v.target.period_type, PeriodType::Monthly);
    assert_eq!(v.target.currency, "IDR");
    assert_eq!(v.progress.weight_percentage_used, Some(Decimal::ZERO));
    assert_eq!(v.progress.status, TargetStatus::OnTrack);
    let period = v.current_period.unwrap();
    assert_eq!(period.start, NaiveDate::from_ymd_opt(2025, 8, 1).unwrap());
    assert_eq!(period.end, NaiveDate::from_ymd_opt(2025, 8, 31).unwrap());
}

#[test]
fn add_requires_limit_for_tracked_dimension() {
    let conn = setup();
    let err = run_target(
        &conn,
        &[
            "add", "--name", "Cost cap", "--type", "cost", "--currency", "IDR", "--period",
            "weekly", "--start", "2025-07-01",
        ],
    )
    .unwrap_err();
    assert!(err.to_string().contains("requires cost_limit"));

    let err = run_target(
        &conn,
        &[
            "add", "--name", "Backwards", "--type", "weight", "--weight-limit", "5",
            "--currency", "IDR", "--period", "daily", "--start", "2025-07-02", "--end",
            "2025-07-01",
        ],
    )
    .unwrap_err();
    assert!(err.to_string().contains("before start"));
    assert!(targets::load_targets(&conn, true).unwrap().is_empty());
}

#[test]
fn accrue_moves_status_and_reset_clears_it() {
    let conn = setup();
    add_both_target(&conn);

    run_target(&conn, &["accrue", "--id", "1", "--weight-kg", "50", "--cost", "450000"]).unwrap();
    let v = &targets::target_views(&conn, false, today()).unwrap()[0];
    assert_eq!(v.progress.cost_percentage_used, Some(dec!(90)));
    assert_eq!(v.progress.status, TargetStatus::Warning);

    run_target(&conn, &["accrue", "--id", "1", "--cost", "150000"]).unwrap();
    let v = &targets::target_views(&conn, false, today()).unwrap()[0];
    assert_eq!(v.target.current_cost, dec!(600000));
    assert_eq!(v.progress.weight_percentage_used, Some(dec!(50)));
    assert_eq!(v.progress.status, TargetStatus::Exceeded);

    run_target(&conn, &["reset", "--id", "1"]).unwrap();
    let t = targets::load_target(&conn, 1).unwrap().unwrap();
    assert_eq!(t.current_weight, Decimal::ZERO);
    assert_eq!(t.current_cost, Decimal::ZERO);
    assert_eq!(t.weight_limit_kg, Some(dec!(100)));
    assert_eq!(t.target_period_start, NaiveDate::from_ymd_opt(2025, 7, 1).unwrap());
    let v = &targets::target_views(&conn, false, today()).unwrap()[0];
    assert_eq!(v.progress.status, TargetStatus::OnTrack);
}

#[test]
fn accrue_rejects_negative_and_inactive() {
    let conn = setup();
    add_both_target(&conn);
    let err = targets::accrue_target(&conn, 1, dec!(-1), Decimal::ZERO).unwrap_err();
    assert!(err.to_string().contains("must not be negative"));

    run_target(&conn, &["set-active", "--id", "1", "--active", "false"]).unwrap();
    assert!(targets::target_views(&conn, false, today()).unwrap().is_empty());
    let err = targets::accrue_target(&conn, 1, dec!(1), Decimal::ZERO).unwrap_err();
    assert!(err.to_string().contains("inactive"));

    let t = targets::load_target(&conn, 1).unwrap().unwrap();
    assert_eq!(t.current_weight, Decimal::ZERO);
    assert!(!t.is_active);
}

#[test]
fn rm_target() {
    let conn = setup();
    add_both_target(&conn);
    run_target(&conn, &["rm", "--id", "1"]).unwrap();
    assert!(targets::load_target(&conn, 1).unwrap().is_none());
    assert!(run_target(&conn, &["rm", "--id", "1"]).is_err());
    assert!(run_target(&conn, &["reset", "--id", "1"]).is_err());
}

#[test]
fn counters_persist_across_connections() {
    let tmp = NamedTempFile::new().unwrap();
    let conn_a = db::open_at(tmp.path()).unwrap();
    add_both_target(&conn_a);
    targets::accrue_target(&conn_a, 1, dec!(85), dec!(1000)).unwrap();

    let conn_b = db::open_at(tmp.path()).unwrap();
    let v = &targets::target_views(&conn_b, false, today()).unwrap()[0];
    assert_eq!(v.target.current_weight, dec!(85));
    assert_eq!(v.progress.status, TargetStatus::Warning);
}

#[test]
fn tiny_limit_lists_without_percentage() {
    let conn = setup();
    run_target(
        &conn,
        &[
            "add", "--name", "Tiny", "--type", "weight", "--weight-limit",
            "0.0000000000000000000001", "--currency", "IDR", "--period", "daily", "--start",
            "2025-08-01",
        ],
    )
    .unwrap();
    targets::accrue_target(&conn, 1, dec!(1000000), Decimal::ZERO).unwrap();

    let v = &targets::target_views(&conn, false, today()).unwrap()[0];
    assert_eq!(v.target.current_weight, dec!(1000000));
    assert_eq!(v.progress.weight_percentage_used, None);
    assert_eq!(v.progress.status, TargetStatus::OnTrack);
}

#[test]
fn accrue_past_decimal_range_rejected() {
    let conn = setup();
    add_both_target(&conn);
    targets::accrue_target(&conn, 1, Decimal::MAX, Decimal::ZERO).unwrap();
    let err = targets::accrue_target(&conn, 1, dec!(1), Decimal::ZERO).unwrap_err();
    assert!(err.to_string().contains("out of range"));

    let t = targets::load_target(&conn, 1).unwrap().unwrap();
    assert_eq!(t.current_weight, Decimal::MAX);
}
