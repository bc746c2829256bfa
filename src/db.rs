// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use directories::ProjectDirs;
use log::debug;
use once_cell::sync::Lazy;
use rusqlite::Connection;
use std::fs;
use std::path::{Path, PathBuf};

static APP: Lazy<(&str, &str, &str)> =
    Lazy::new(|| ("com.wastewatch", "Wastewatch", "wastewatch"));

/// Overrides the platform data dir when set.
pub const DB_ENV: &str = "WASTEWATCH_DB";

pub fn db_path() -> Result<PathBuf> {
    if let Some(p) = std::env::var_os(DB_ENV).filter(|p| !p.is_empty()) {
        return Ok(PathBuf::from(p));
    }
    let proj = ProjectDirs::from(APP.0, APP.1, APP.2)
        .context("Could not determine platform-specific data dir")?;
    let data_dir = proj.data_dir();
    fs::create_dir_all(data_dir).context("Failed to create data dir")?;
    Ok(data_dir.join("wastewatch.sqlite"))
}

pub fn open_or_init() -> Result<Connection> {
    open_at(&db_path()?)
}

pub fn open_at(path: &Path) -> Result<Connection> {
    debug!("opening database at {}", path.display());
    let conn =
        Connection::open(path).with_context(|| format!("Open DB at {}", path.display()))?;
    init_schema(&conn)?;
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
    PRAGMA foreign_keys = ON;

    CREATE TABLE IF NOT EXISTS settings(
        key TEXT PRIMARY KEY,
        value TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS food_prices(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        price_type TEXT NOT NULL CHECK(price_type IN ('CATEGORY','ITEM')),
        category TEXT,
        item_name TEXT,
        price_per_kg TEXT NOT NULL,
        currency TEXT NOT NULL,
        is_active INTEGER NOT NULL DEFAULT 1,
        created_at TEXT NOT NULL DEFAULT (datetime('now')),
        CHECK(
            (price_type='CATEGORY' AND category IS NOT NULL AND item_name IS NULL) OR
            (price_type='ITEM' AND item_name IS NOT NULL AND category IS NULL)
        )
    );
    CREATE INDEX IF NOT EXISTS idx_food_prices_item ON food_prices(item_name);

    CREATE TABLE IF NOT EXISTS detections(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        detected_at TEXT NOT NULL,
        category TEXT NOT NULL,
        corrected_category TEXT,
        item_name TEXT,
        weight_grams TEXT NOT NULL, -- signed; negative = removed
        camera TEXT,
        created_at TEXT NOT NULL DEFAULT (datetime('now'))
    );
    CREATE INDEX IF NOT EXISTS idx_detections_date ON detections(detected_at);

    CREATE TABLE IF NOT EXISTS waste_targets(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        category TEXT,
        target_type TEXT NOT NULL CHECK(target_type IN ('weight','cost','both')),
        weight_limit_kg TEXT,
        cost_limit TEXT,
        currency TEXT NOT NULL,
        period_type TEXT NOT NULL
            CHECK(period_type IN ('daily','weekly','monthly','quarterly','yearly')),
        target_period_start TEXT NOT NULL,
        target_period_end TEXT,
        current_weight TEXT NOT NULL DEFAULT '0',
        current_cost TEXT NOT NULL DEFAULT '0',
        is_active INTEGER NOT NULL DEFAULT 1,
        created_at TEXT NOT NULL DEFAULT (datetime('now'))
    );
    "#,
    )?;
    Ok(())
}
