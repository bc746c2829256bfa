// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::commands::detections::{DetectionFilter, costed_rows};
use crate::errors::ValidationError;
use crate::models::FoodCategory;
use crate::utils::{maybe_print_json, pretty_table};
use anyhow::Result;
use rusqlite::Connection;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("waste", sub)) => waste(conn, sub)?,
        _ => {}
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WasteLine {
    pub category: FoodCategory,
    pub currency: String,
    pub detections: usize,
    pub weight_kg: Decimal,
    pub cost: Decimal,
}

/// Totals per effective category and currency. Weights are summed by magnitude.
pub fn waste_by_category(conn: &Connection, filter: &DetectionFilter) -> Result<Vec<WasteLine>> {
    let rows = costed_rows(conn, filter)?;
    let mut acc: BTreeMap<(FoodCategory, String), WasteLine> = BTreeMap::new();
    for r in rows {
        let category = r.detection.effective_category();
        let line = acc
            .entry((category, r.currency.clone()))
            .or_insert_with(|| WasteLine {
                category,
                currency: r.currency.clone(),
                detections: 0,
                weight_kg: Decimal::ZERO,
                cost: Decimal::ZERO,
            });
        line.detections += 1;
        line.weight_kg = line
            .weight_kg
            .checked_add(r.detection.weight_grams.abs() / Decimal::ONE_THOUSAND)
            .ok_or(ValidationError::Overflow { field: "weight_kg" })?;
        line.cost = line
            .cost
            .checked_add(r.cost)
            .ok_or(ValidationError::Overflow { field: "cost" })?;
    }
    Ok(acc.into_values().collect())
}

fn waste(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let filter = DetectionFilter::from_matches(sub)?;
    let lines = waste_by_category(conn, &filter)?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &lines)? {
        let rows = lines
            .iter()
            .map(|l| {
                vec![
                    l.category.to_string(),
                    l.detections.to_string(),
                    format!("{:.3}", l.weight_kg),
                    format!("{:.2}", l.cost),
                    l.currency.clone(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(&["Category", "Detections", "Weight (kg)", "Cost", "CCY"], rows)
        );
    }
    Ok(())
}
