// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::{FoodPrice, PriceType};
use crate::pricing::{compute_cost, resolve_price};
use crate::utils::{
    fmt_money, get_default_price_settings, maybe_print_json, parse_bool, parse_category,
    parse_currency, parse_decimal, parse_positive_decimal, pretty_table, stored_decimal,
};
use anyhow::{Context, Result, anyhow};
use log::info;
use rusqlite::{Connection, OptionalExtension, params};
use serde_json::json;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(conn, sub)?,
        Some(("list", sub)) => list(conn, sub)?,
        Some(("update", sub)) => update(conn, sub)?,
        Some(("rm", sub)) => {
            let id = parse_id(sub)?;
            let n = conn.execute("DELETE FROM food_prices WHERE id=?1", params![id])?;
            if n == 0 {
                return Err(anyhow!("Price rule {} not found", id));
            }
            info!("removed price rule {}", id);
            println!("Removed price rule {}", id);
        }
        Some(("resolve", sub)) => resolve(conn, sub)?,
        _ => {}
    }
    Ok(())
}

pub(crate) fn parse_id(sub: &clap::ArgMatches) -> Result<i64> {
    let raw = sub.get_one::<String>("id").unwrap();
    raw.trim()
        .parse::<i64>()
        .with_context(|| format!("Invalid id '{}'", raw))
}

fn add(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let price_type: PriceType = sub.get_one::<String>("type").unwrap().parse()?;
    let category = sub
        .get_one::<String>("category")
        .map(|s| parse_category(s))
        .transpose()?;
    let item_name = sub
        .get_one::<String>("item")
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string());
    let rule = FoodPrice {
        id: 0,
        price_type,
        category,
        item_name,
        price_per_kg: parse_positive_decimal(sub.get_one::<String>("price").unwrap(), "price")?,
        currency: parse_currency(sub.get_one::<String>("currency").unwrap())?,
        is_active: !sub.get_flag("inactive"),
    };
    rule.validate()?;
    conn.execute(
        "INSERT INTO food_prices(price_type, category, item_name, price_per_kg, currency, is_active)
         VALUES (?1,?2,?3,?4,?5,?6)",
        params![
            rule.price_type.as_str(),
            rule.category.map(|c| c.as_str()),
            rule.item_name,
            rule.price_per_kg.to_string(),
            rule.currency,
            rule.is_active
        ],
    )?;
    let id = conn.last_insert_rowid();
    info!("added price rule {} ({})", id, rule.key());
    println!(
        "Added price rule {}: {} = {} per kg",
        id,
        rule.key(),
        fmt_money(&rule.price_per_kg, &rule.currency)
    );
    Ok(())
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let rules = load_prices(conn, sub.get_flag("all"))?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &rules)? {
        let rows = rules
            .iter()
            .map(|r| {
                vec![
                    r.id.to_string(),
                    r.price_type.to_string(),
                    r.category.map(|c| c.to_string()).unwrap_or_default(),
                    r.item_name.clone().unwrap_or_default(),
                    r.price_per_kg.to_string(),
                    r.currency.clone(),
                    if r.is_active { "yes" } else { "no" }.into(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &["ID", "Type", "Category", "Item", "Price/kg", "CCY", "Active"],
                rows
            )
        );
    }
    Ok(())
}

fn update(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let id = parse_id(sub)?;
    let mut rule = load_price(conn, id)?.with_context(|| format!("Price rule {} not found", id))?;
    if let Some(p) = sub.get_one::<String>("price") {
        rule.price_per_kg = parse_positive_decimal(p, "price")?;
    }
    if let Some(c) = sub.get_one::<String>("currency") {
        rule.currency = parse_currency(c)?;
    }
    if let Some(a) = sub.get_one::<String>("active") {
        rule.is_active = parse_bool(a)?;
    }
    rule.validate()?;
    conn.execute(
        "UPDATE food_prices SET price_per_kg=?1, currency=?2, is_active=?3 WHERE id=?4",
        params![
            rule.price_per_kg.to_string(),
            rule.currency,
            rule.is_active,
            id
        ],
    )?;
    info!("updated price rule {}", id);
    println!(
        "Updated price rule {}: {} = {} per kg{}",
        id,
        rule.key(),
        fmt_money(&rule.price_per_kg, &rule.currency),
        if rule.is_active { "" } else { " (inactive)" }
    );
    Ok(())
}

fn resolve(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let item = sub.get_one::<String>("item").map(|s| s.as_str());
    let category = parse_category(sub.get_one::<String>("category").unwrap())?;
    let weight = sub
        .get_one::<String>("weight")
        .map(|w| parse_decimal(w))
        .transpose()?;
    let rules = load_prices(conn, false)?;
    let defaults = get_default_price_settings(conn)?;
    let price = resolve_price(item, category, &rules, defaults.as_ref())?;
    let cost = weight
        .map(|w| compute_cost(w, price.price_per_kg))
        .transpose()?;

    let out = json!({ "price": price, "weight_grams": weight, "cost": cost });
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &out)? {
        let rule = price
            .rule_id
            .map(|id| format!(" (rule {})", id))
            .unwrap_or_default();
        println!(
            "{} per kg from {}{}",
            fmt_money(&price.price_per_kg, &price.currency),
            price.source,
            rule
        );
        if let (Some(w), Some(c)) = (weight, cost) {
            println!("Cost of {} g: {}", w, fmt_money(&c, &price.currency));
        }
    }
    Ok(())
}

type PriceRow = (i64, String, Option<String>, Option<String>, String, String, bool);

fn price_from_row(row: PriceRow) -> Result<FoodPrice> {
    let (id, price_type, category, item_name, price, currency, is_active) = row;
    Ok(FoodPrice {
        id,
        price_type: price_type.parse()?,
        category: category.map(|c| parse_category(&c)).transpose()?,
        item_name,
        price_per_kg: stored_decimal(&price, "price_per_kg")?,
        currency,
        is_active,
    })
}

const PRICE_COLUMNS: &str =
    "SELECT id, price_type, category, item_name, price_per_kg, currency, is_active FROM food_prices";

fn read_row(r: &rusqlite::Row<'_>) -> rusqlite::Result<PriceRow> {
    Ok((
        r.get(0)?,
        r.get(1)?,
        r.get(2)?,
        r.get(3)?,
        r.get(4)?,
        r.get(5)?,
        r.get(6)?,
    ))
}

/// Pricing rules ordered by id; inactive ones only when `include_inactive`.
pub fn load_prices(conn: &Connection, include_inactive: bool) -> Result<Vec<FoodPrice>> {
    let sql = if include_inactive {
        format!("{} ORDER BY id", PRICE_COLUMNS)
    } else {
        format!("{} WHERE is_active=1 ORDER BY id", PRICE_COLUMNS)
    };
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map([], read_row)?;
    let mut out = Vec::new();
    for row in rows {
        out.push(price_from_row(row?)?);
    }
    Ok(out)
}

pub fn load_price(conn: &Connection, id: i64) -> Result<Option<FoodPrice>> {
    let row = conn
        .query_row(
            &format!("{} WHERE id=?1", PRICE_COLUMNS),
            params![id],
            read_row,
        )
        .optional()?;
    row.map(price_from_row).transpose()
}
