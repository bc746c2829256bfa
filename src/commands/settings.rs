// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::DefaultPriceSettings;
use crate::utils::{
    fmt_money, get_default_price_settings, parse_currency, parse_positive_decimal,
    set_default_price_settings,
};
use anyhow::Result;
use rusqlite::Connection;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("show", _)) => match get_default_price_settings(conn)? {
            Some(s) => println!(
                "Default price: {} per kg",
                fmt_money(&s.default_price_per_kg, &s.default_currency)
            ),
            None => println!("Default price not configured"),
        },
        Some(("set-default", sub)) => {
            let price =
                parse_positive_decimal(sub.get_one::<String>("price").unwrap(), "price")?;
            let ccy = parse_currency(sub.get_one::<String>("currency").unwrap())?;
            let settings = DefaultPriceSettings {
                default_price_per_kg: price,
                default_currency: ccy,
            };
            set_default_price_settings(conn, &settings)?;
            println!(
                "Default price set to {} per kg",
                fmt_money(&settings.default_price_per_kg, &settings.default_currency)
            );
        }
        _ => {}
    }
    Ok(())
}
