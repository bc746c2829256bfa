// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::errors::ValidationError;
use crate::models::{DefaultPriceSettings, FoodCategory};
use anyhow::{Context, Result, anyhow};
use chrono::NaiveDate;
use comfy_table::{Cell, Table, presets::UTF8_FULL};
use log::info;
use rusqlite::{Connection, OptionalExtension, params};
use rust_decimal::Decimal;

pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .with_context(|| format!("Invalid date '{}', expected YYYY-MM-DD", s))
}

pub fn parse_decimal(s: &str) -> Result<Decimal> {
    s.trim()
        .parse::<Decimal>()
        .with_context(|| format!("Invalid decimal '{}'", s))
}

pub fn parse_positive_decimal(s: &str, field: &'static str) -> Result<Decimal> {
    let v = parse_decimal(s)?;
    if v <= Decimal::ZERO {
        return Err(ValidationError::NonPositive { field, value: v }.into());
    }
    Ok(v)
}

/// Three ASCII letters, returned upper-cased.
pub fn parse_currency(s: &str) -> Result<String> {
    let c = s.trim();
    if c.len() != 3 || !c.chars().all(|ch| ch.is_ascii_alphabetic()) {
        return Err(ValidationError::InvalidCurrency(s.to_string()).into());
    }
    Ok(c.to_ascii_uppercase())
}

pub fn parse_category(s: &str) -> Result<FoodCategory> {
    Ok(s.parse::<FoodCategory>()?)
}

pub fn parse_bool(s: &str) -> Result<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "1" | "on" => Ok(true),
        "false" | "no" | "0" | "off" => Ok(false),
        _ => Err(anyhow!("Invalid boolean '{}', expected true|false", s)),
    }
}

/// Decimal stored as TEXT in the database.
pub fn stored_decimal(s: &str, what: &str) -> Result<Decimal> {
    s.parse::<Decimal>()
        .with_context(|| format!("Invalid {} '{}' in database", what, s))
}

pub fn fmt_money(d: &Decimal, ccy: &str) -> String {
    format!("{} {}", ccy, d.round_dp(2))
}

pub fn fmt_pct(p: Option<Decimal>) -> String {
    match p {
        Some(v) => format!("{:.1}%", v.round_dp(1)),
        None => "-".into(),
    }
}

pub fn pretty_table(headers: &[&str], rows: Vec<Vec<String>>) -> Table {
    let mut t = Table::new();
    t.load_preset(UTF8_FULL);
    t.set_header(headers.iter().map(|h| Cell::new(*h)));
    for r in rows {
        t.add_row(r.into_iter().map(Cell::new));
    }
    t
}

pub fn maybe_print_json<T: serde::Serialize>(
    json_flag: bool,
    jsonl_flag: bool,
    v: &T,
) -> Result<bool> {
    if json_flag {
        println!("{}", serde_json::to_string_pretty(v)?);
        return Ok(true);
    }
    if jsonl_flag {
        // If v is an array, stream each element; else stream single line
        let val = serde_json::to_value(v)?;
        if let Some(arr) = val.as_array() {
            for item in arr {
                println!("{}", serde_json::to_string(item)?);
            }
        } else {
            println!("{}", serde_json::to_string(&val)?);
        }
        return Ok(true);
    }
    Ok(false)
}

fn get_setting(conn: &Connection, key: &str) -> Result<Option<String>> {
    let v = conn
        .query_row(
            "SELECT value FROM settings WHERE key=?1",
            params![key],
            |r| r.get(0),
        )
        .optional()?;
    Ok(v)
}

fn put_setting(conn: &Connection, key: &str, value: &str) -> Result<()> {
    conn.execute(
        "INSERT INTO settings(key, value) VALUES(?1, ?2)
         ON CONFLICT(key) DO UPDATE SET value=excluded.value",
        params![key, value],
    )?;
    Ok(())
}

/// `None` until an administrator has configured both keys.
pub fn get_default_price_settings(conn: &Connection) -> Result<Option<DefaultPriceSettings>> {
    let price = get_setting(conn, "default_price_per_kg")?;
    let ccy = get_setting(conn, "default_currency")?;
    match (price, ccy) {
        (Some(p), Some(c)) => Ok(Some(DefaultPriceSettings {
            default_price_per_kg: stored_decimal(&p, "default_price_per_kg")?,
            default_currency: c,
        })),
        _ => Ok(None),
    }
}

pub fn set_default_price_settings(conn: &Connection, settings: &DefaultPriceSettings) -> Result<()> {
    if settings.default_price_per_kg <= Decimal::ZERO {
        return Err(ValidationError::NonPositive {
            field: "default_price_per_kg",
            value: settings.default_price_per_kg,
        }
        .into());
    }
    let tx = conn.unchecked_transaction()?;
    put_setting(
        &tx,
        "default_price_per_kg",
        &settings.default_price_per_kg.to_string(),
    )?;
    put_setting(&tx, "default_currency", &settings.default_currency)?;
    tx.commit()?;
    info!(
        "default price set to {}",
        fmt_money(&settings.default_price_per_kg, &settings.default_currency)
    );
    Ok(())
}
