// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::commands::prices::parse_id;
use crate::models::{TargetType, WasteTarget};
use crate::progress::{
    PeriodWindow, TargetProgress, accrue, current_period, evaluate, reset_progress,
};
use crate::utils::{
    fmt_money, fmt_pct, maybe_print_json, parse_bool, parse_category, parse_currency,
    parse_date, parse_decimal, parse_positive_decimal, pretty_table, stored_decimal,
};
use anyhow::{Context, Result, anyhow};
use chrono::NaiveDate;
use log::{info, warn};
use rusqlite::{Connection, params};
use rust_decimal::Decimal;
use serde::Serialize;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(conn, sub)?,
        Some(("list", sub)) => list(conn, sub)?,
        Some(("accrue", sub)) => accrue_cmd(conn, sub)?,
        Some(("reset", sub)) => {
            let id = parse_id(sub)?;
            let target = reset_target(conn, id)?;
            println!(
                "Reset target {} '{}': status {}",
                id,
                target.name,
                evaluate(&target).status
            );
        }
        Some(("set-active", sub)) => {
            let id = parse_id(sub)?;
            let active = parse_bool(sub.get_one::<String>("active").unwrap())?;
            let n = conn.execute(
                "UPDATE waste_targets SET is_active=?1 WHERE id=?2",
                params![active, id],
            )?;
            if n == 0 {
                return Err(anyhow!("Target {} not found", id));
            }
            println!(
                "Target {} {}",
                id,
                if active { "enabled" } else { "disabled" }
            );
        }
        Some(("rm", sub)) => {
            let id = parse_id(sub)?;
            let n = conn.execute("DELETE FROM waste_targets WHERE id=?1", params![id])?;
            if n == 0 {
                return Err(anyhow!("Target {} not found", id));
            }
            println!("Removed target {}", id);
        }
        _ => {}
    }
    Ok(())
}

fn add(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let limit = |key: &str, field: &'static str| {
        sub.get_one::<String>(key)
            .map(|s| parse_positive_decimal(s, field))
            .transpose()
    };
    let target = WasteTarget {
        id: 0,
        name: sub.get_one::<String>("name").unwrap().trim().to_string(),
        category: sub
            .get_one::<String>("category")
            .map(|s| parse_category(s))
            .transpose()?,
        target_type: sub.get_one::<String>("type").unwrap().parse()?,
        weight_limit_kg: limit("weight-limit", "weight_limit_kg")?,
        cost_limit: limit("cost-limit", "cost_limit")?,
        currency: parse_currency(sub.get_one::<String>("currency").unwrap())?,
        period_type: sub.get_one::<String>("period").unwrap().parse()?,
        target_period_start: parse_date(sub.get_one::<String>("start").unwrap())?,
        target_period_end: sub
            .get_one::<String>("end")
            .map(|s| parse_date(s))
            .transpose()?,
        current_weight: Decimal::ZERO,
        current_cost: Decimal::ZERO,
        is_active: true,
    };
    let id = insert_target(conn, &target)?;
    println!(
        "Added target {} '{}' ({} {}, from {})",
        id, target.name, target.period_type, target.target_type, target.target_period_start
    );
    Ok(())
}

/// Validates and stores a new target, returning its id.
pub fn insert_target(conn: &Connection, target: &WasteTarget) -> Result<i64> {
    target.validate()?;
    if target.name.is_empty() {
        return Err(anyhow!("Target name must not be empty"));
    }
    if let Some(end) = target.target_period_end {
        if end < target.target_period_start {
            return Err(anyhow!(
                "Period end {} is before start {}",
                end,
                target.target_period_start
            ));
        }
    }
    if target.target_type != TargetType::Both {
        let ignored = if target.target_type.tracks_weight() {
            target.cost_limit.map(|_| "cost limit")
        } else {
            target.weight_limit_kg.map(|_| "weight limit")
        };
        if let Some(what) = ignored {
            warn!("{} ignored for {} target '{}'", what, target.target_type, target.name);
        }
    }
    conn.execute(
        "INSERT INTO waste_targets(name, category, target_type, weight_limit_kg, cost_limit,
            currency, period_type, target_period_start, target_period_end,
            current_weight, current_cost, is_active)
         VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10,?11,?12)",
        params![
            target.name,
            target.category.map(|c| c.as_str()),
            target.target_type.as_str(),
            target.weight_limit_kg.map(|d| d.to_string()),
            target.cost_limit.map(|d| d.to_string()),
            target.currency,
            target.period_type.as_str(),
            target.target_period_start.to_string(),
            target.target_period_end.map(|d| d.to_string()),
            target.current_weight.to_string(),
            target.current_cost.to_string(),
            target.is_active
        ],
    )?;
    let id = conn.last_insert_rowid();
    info!("added target {} '{}'", id, target.name);
    Ok(id)
}

#[derive(Serialize)]
pub struct TargetView {
    #[serde(flatten)]
    pub target: WasteTarget,
    #[serde(flatten)]
    pub progress: TargetProgress,
    pub current_period: Option<PeriodWindow>,
}

/// Targets with progress derived from the counters just read.
pub fn target_views(
    conn: &Connection,
    include_inactive: bool,
    today: NaiveDate,
) -> Result<Vec<TargetView>> {
    Ok(load_targets(conn, include_inactive)?
        .into_iter()
        .map(|t| TargetView {
            progress: evaluate(&t),
            current_period: current_period(&t, today),
            target: t,
        })
        .collect())
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let today = match sub.get_one::<String>("today") {
        Some(d) => parse_date(d)?,
        None => chrono::Local::now().date_naive(),
    };
    let views = target_views(conn, sub.get_flag("all"), today)?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &views)? {
        let rows = views
            .iter()
            .map(|v| {
                let t = &v.target;
                let limit = |l: Option<Decimal>| l.map(|d| d.to_string()).unwrap_or("-".into());
                vec![
                    t.id.to_string(),
                    t.name.clone(),
                    t.category.map(|c| c.to_string()).unwrap_or("ALL".into()),
                    t.target_type.to_string(),
                    format!("{} / {}", t.current_weight, limit(t.weight_limit_kg)),
                    fmt_pct(v.progress.weight_percentage_used),
                    format!(
                        "{} / {}",
                        fmt_money(&t.current_cost, &t.currency),
                        limit(t.cost_limit)
                    ),
                    fmt_pct(v.progress.cost_percentage_used),
                    v.current_period
                        .map(|w| format!("{}..{}", w.start, w.end))
                        .unwrap_or("-".into()),
                    v.progress.status.to_string(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &[
                    "ID", "Name", "Category", "Type", "Weight kg", "W%", "Cost", "C%", "Period",
                    "Status"
                ],
                rows
            )
        );
    }
    Ok(())
}

fn accrue_cmd(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let id = parse_id(sub)?;
    let amount = |key: &str| -> Result<Decimal> {
        Ok(sub
            .get_one::<String>(key)
            .map(|s| parse_decimal(s))
            .transpose()?
            .unwrap_or(Decimal::ZERO))
    };
    let target = accrue_target(conn, id, amount("weight-kg")?, amount("cost")?)?;
    let progress = evaluate(&target);
    println!(
        "Target {} '{}': {} kg, {} -> {}",
        id,
        target.name,
        target.current_weight,
        fmt_money(&target.current_cost, &target.currency),
        progress.status
    );
    Ok(())
}

pub fn accrue_target(
    conn: &Connection,
    id: i64,
    weight_kg: Decimal,
    cost: Decimal,
) -> Result<WasteTarget> {
    let target = load_target(conn, id)?.with_context(|| format!("Target {} not found", id))?;
    if !target.is_active {
        return Err(anyhow!("Target {} is inactive", id));
    }
    let updated = accrue(target, weight_kg, cost)?;
    store_counters(conn, &updated)?;
    info!("target {} accrued {} kg / {}", id, weight_kg, cost);
    Ok(updated)
}

pub fn reset_target(conn: &Connection, id: i64) -> Result<WasteTarget> {
    let target = load_target(conn, id)?.with_context(|| format!("Target {} not found", id))?;
    let updated = reset_progress(target);
    store_counters(conn, &updated)?;
    info!("target {} progress reset", id);
    Ok(updated)
}

fn store_counters(conn: &Connection, t: &WasteTarget) -> Result<()> {
    conn.execute(
        "UPDATE waste_targets SET current_weight=?1, current_cost=?2 WHERE id=?3",
        params![t.current_weight.to_string(), t.current_cost.to_string(), t.id],
    )?;
    Ok(())
}

const TARGET_COLUMNS: &str = "SELECT id, name, category, target_type, weight_limit_kg, cost_limit,
    currency, period_type, target_period_start, target_period_end,
    current_weight, current_cost, is_active FROM waste_targets";

fn target_from_row(r: &rusqlite::Row<'_>) -> Result<WasteTarget> {
    let opt_dec = |idx: usize, what: &str| -> Result<Option<Decimal>> {
        let v: Option<String> = r.get(idx)?;
        v.map(|s| stored_decimal(&s, what)).transpose()
    };
    let category: Option<String> = r.get(2)?;
    let target_type: String = r.get(3)?;
    let period_type: String = r.get(7)?;
    let start: String = r.get(8)?;
    let end: Option<String> = r.get(9)?;
    let weight: String = r.get(10)?;
    let cost: String = r.get(11)?;
    Ok(WasteTarget {
        id: r.get(0)?,
        name: r.get(1)?,
        category: category.map(|c| parse_category(&c)).transpose()?,
        target_type: target_type.parse()?,
        weight_limit_kg: opt_dec(4, "weight_limit_kg")?,
        cost_limit: opt_dec(5, "cost_limit")?,
        currency: r.get(6)?,
        period_type: period_type.parse()?,
        target_period_start: parse_date(&start)?,
        target_period_end: end.map(|e| parse_date(&e)).transpose()?,
        current_weight: stored_decimal(&weight, "current_weight")?,
        current_cost: stored_decimal(&cost, "current_cost")?,
        is_active: r.get(12)?,
    })
}

pub fn load_targets(conn: &Connection, include_inactive: bool) -> Result<Vec<WasteTarget>> {
    let sql = if include_inactive {
        format!("{} ORDER BY id", TARGET_COLUMNS)
    } else {
        format!("{} WHERE is_active=1 ORDER BY id", TARGET_COLUMNS)
    };
    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query([])?;
    let mut out = Vec::new();
    while let Some(r) = rows.next()? {
        out.push(target_from_row(r)?);
    }
    Ok(out)
}

pub fn load_target(conn: &Connection, id: i64) -> Result<Option<WasteTarget>> {
    let mut stmt = conn.prepare(&format!("{} WHERE id=?1", TARGET_COLUMNS))?;
    let mut rows = stmt.query(params![id])?;
    rows.next()?.map(target_from_row).transpose()
}
