// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::commands::prices::{load_prices, parse_id};
use crate::models::{Detection, FoodCategory};
use crate::pricing::detection_cost;
use crate::utils::{
    get_default_price_settings, maybe_print_json, parse_category, parse_date, parse_decimal,
    pretty_table, stored_decimal,
};
use anyhow::{Result, anyhow};
use chrono::NaiveDate;
use log::info;
use rusqlite::{Connection, params};
use rust_decimal::Decimal;
use serde::Serialize;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(conn, sub)?,
        Some(("review", sub)) => review(conn, sub)?,
        Some(("list", sub)) => list(conn, sub)?,
        Some(("rm", sub)) => {
            let id = parse_id(sub)?;
            let n = conn.execute("DELETE FROM detections WHERE id=?1", params![id])?;
            if n == 0 {
                return Err(anyhow!("Detection {} not found", id));
            }
            println!("Removed detection {}", id);
        }
        _ => {}
    }
    Ok(())
}

fn add(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let category = parse_category(sub.get_one::<String>("category").unwrap())?;
    let weight = parse_decimal(sub.get_one::<String>("weight").unwrap())?;
    let item = sub
        .get_one::<String>("item")
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string());
    let camera = sub.get_one::<String>("camera").map(|s| s.trim().to_string());
    let date = match sub.get_one::<String>("date") {
        Some(d) => parse_date(d)?,
        None => chrono::Local::now().date_naive(),
    };
    conn.execute(
        "INSERT INTO detections(detected_at, category, item_name, weight_grams, camera)
         VALUES (?1,?2,?3,?4,?5)",
        params![
            date.to_string(),
            category.as_str(),
            item,
            weight.to_string(),
            camera
        ],
    )?;
    let id = conn.last_insert_rowid();
    info!("recorded detection {} ({} g {})", id, weight, category);
    println!("Recorded detection {}: {} g of {} on {}", id, weight, category, date);
    Ok(())
}

fn review(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let id = parse_id(sub)?;
    let corrected = parse_category(sub.get_one::<String>("category").unwrap())?;
    let n = conn.execute(
        "UPDATE detections SET corrected_category=?1 WHERE id=?2",
        params![corrected.as_str(), id],
    )?;
    if n == 0 {
        return Err(anyhow!("Detection {} not found", id));
    }
    info!("detection {} reviewed as {}", id, corrected);
    println!("Detection {} reviewed as {}", id, corrected);
    Ok(())
}

#[derive(Debug, Default, Clone)]
pub struct DetectionFilter {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub category: Option<FoodCategory>,
    pub limit: Option<usize>,
}

impl DetectionFilter {
    pub fn from_matches(sub: &clap::ArgMatches) -> Result<Self> {
        let date = |key: &str| {
            sub.try_get_one::<String>(key)
                .ok()
                .flatten()
                .map(|s| parse_date(s))
                .transpose()
        };
        Ok(DetectionFilter {
            from: date("from")?,
            to: date("to")?,
            category: sub
                .try_get_one::<String>("category")
                .ok()
                .flatten()
                .map(|s| parse_category(s))
                .transpose()?,
            limit: sub.try_get_one::<usize>("limit").ok().flatten().copied(),
        })
    }
}

/// Detections matching `filter`, newest first.
pub fn query_detections(conn: &Connection, filter: &DetectionFilter) -> Result<Vec<Detection>> {
    let mut sql = String::from(
        "SELECT id, detected_at, category, corrected_category, item_name, weight_grams, camera
         FROM detections WHERE 1=1",
    );
    let mut params_vec: Vec<String> = Vec::new();
    if let Some(from) = filter.from {
        sql.push_str(" AND detected_at>=?");
        params_vec.push(from.to_string());
    }
    if let Some(to) = filter.to {
        sql.push_str(" AND detected_at<=?");
        params_vec.push(to.to_string());
    }
    if let Some(cat) = filter.category {
        sql.push_str(" AND COALESCE(corrected_category, category)=?");
        params_vec.push(cat.as_str().into());
    }
    sql.push_str(" ORDER BY detected_at DESC, id DESC");
    if let Some(limit) = filter.limit {
        sql.push_str(" LIMIT ?");
        params_vec.push(limit.to_string());
    }

    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query(rusqlite::params_from_iter(params_vec.iter()))?;
    let mut out = Vec::new();
    while let Some(r) = rows.next()? {
        let detected_at: String = r.get(1)?;
        let category: String = r.get(2)?;
        let corrected: Option<String> = r.get(3)?;
        let weight: String = r.get(5)?;
        out.push(Detection {
            id: r.get(0)?,
            detected_at: parse_date(&detected_at)?,
            category: parse_category(&category)?,
            corrected_category: corrected.map(|c| parse_category(&c)).transpose()?,
            item_name: r.get(4)?,
            weight_grams: stored_decimal(&weight, "weight_grams")?,
            camera: r.get(6)?,
        });
    }
    Ok(out)
}

#[derive(Debug, Serialize)]
pub struct DetectionRow {
    #[serde(flatten)]
    pub detection: Detection,
    pub price_per_kg: Decimal,
    pub currency: String,
    pub price_source: String,
    pub cost: Decimal,
}

/// Detections with resolved price and cost. Fails if no default price is set.
pub fn costed_rows(conn: &Connection, filter: &DetectionFilter) -> Result<Vec<DetectionRow>> {
    let detections = query_detections(conn, filter)?;
    let rules = load_prices(conn, false)?;
    let defaults = get_default_price_settings(conn)?;
    let mut out = Vec::with_capacity(detections.len());
    for d in detections {
        let costed = detection_cost(&d, &rules, defaults.as_ref())?;
        out.push(DetectionRow {
            detection: d,
            price_per_kg: costed.price.price_per_kg,
            currency: costed.price.currency,
            price_source: costed.price.source.to_string(),
            cost: costed.cost,
        });
    }
    Ok(out)
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let filter = DetectionFilter::from_matches(sub)?;
    let data = costed_rows(conn, &filter)?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        let rows = data
            .iter()
            .map(|r| {
                let d = &r.detection;
                let cat = match d.corrected_category {
                    Some(c) if c != d.category => format!("{} (was {})", c, d.category),
                    _ => d.category.to_string(),
                };
                vec![
                    d.id.to_string(),
                    d.detected_at.to_string(),
                    cat,
                    d.item_name.clone().unwrap_or_default(),
                    d.weight_grams.to_string(),
                    format!("{:.2}", r.cost),
                    r.currency.clone(),
                    r.price_source.clone(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &["ID", "Date", "Category", "Item", "Weight (g)", "Cost", "CCY", "Source"],
                rows
            )
        );
    }
    Ok(())
}
