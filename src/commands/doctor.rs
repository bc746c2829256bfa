// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::commands::prices::load_prices;
use crate::commands::targets::load_targets;
use crate::pricing::find_duplicate_rules;
use crate::utils::{get_default_price_settings, pretty_table};
use anyhow::Result;
use log::warn;
use rusqlite::Connection;

/// Collects (issue, detail) pairs; empty when the data is clean.
pub fn diagnose(conn: &Connection) -> Result<Vec<(String, String)>> {
    let mut rows = Vec::new();

    // 1) Fallback price not configured: detection costs cannot be computed
    let defaults = get_default_price_settings(conn)?;
    if defaults.is_none() {
        rows.push(("missing_default_price".into(), "run settings set-default".into()));
    }

    // 2) Duplicate active rules: lowest id wins, the rest are dead
    let rules = load_prices(conn, false)?;
    for dup in find_duplicate_rules(&rules) {
        let ids: Vec<String> = dup.ids.iter().map(|i| i.to_string()).collect();
        rows.push(("ambiguous_price_rule".into(), format!("{} ids {}", dup.key, ids.join(","))));
    }

    // 3) Rules priced in a currency other than the default
    if let Some(d) = &defaults {
        for r in rules.iter().filter(|r| r.currency != d.default_currency) {
            rows.push((
                "currency_mismatch".into(),
                format!("rule {} {} vs default {}", r.id, r.currency, d.default_currency),
            ));
        }
    }

    // 4) Active targets with a tracked dimension that has no usable limit
    for t in load_targets(conn, false)? {
        if let Err(e) = t.validate() {
            rows.push(("untrackable_target".into(), format!("{} '{}': {}", t.id, t.name, e)));
        }
    }

    for (issue, detail) in &rows {
        warn!("doctor: {} {}", issue, detail);
    }
    Ok(rows)
}

pub fn handle(conn: &Connection) -> Result<()> {
    let rows = diagnose(conn)?;
    if rows.is_empty() {
        println!("doctor: no issues found");
    } else {
        let data = rows.into_iter().map(|(i, d)| vec![i, d]).collect();
        println!("{}", pretty_table(&["Issue", "Detail"], data));
    }
    Ok(())
}
