// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{Arg, ArgAction, Command, value_parser};

fn opt(name: &'static str, help: &'static str) -> Arg {
    Arg::new(name).long(name).num_args(1).help(help)
}

fn req(name: &'static str, help: &'static str) -> Arg {
    opt(name, help).required(true)
}

fn json_flags(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("json")
            .long("json")
            .action(ArgAction::SetTrue)
            .help("Print as pretty JSON"),
    )
    .arg(
        Arg::new("jsonl")
            .long("jsonl")
            .action(ArgAction::SetTrue)
            .conflicts_with("json")
            .help("Print one JSON object per line"),
    )
}

fn settings_cmd() -> Command {
    Command::new("settings")
        .about("Default price settings")
        .subcommand(Command::new("show").about("Show the default price per kg"))
        .subcommand(
            Command::new("set-default")
                .about("Set the fallback price used when no rule matches")
                .arg(req("price", "Default price per kg"))
                .arg(req("currency", "Currency code, e.g. IDR")),
        )
}

fn price_cmd() -> Command {
    Command::new("price")
        .about("Pricing rules by menu item or category")
        .subcommand(
            Command::new("add")
                .about("Add a pricing rule")
                .arg(
                    req("type", "Rule type")
                        .value_parser(["category", "item", "CATEGORY", "ITEM"]),
                )
                .arg(opt("category", "Food category (CATEGORY rules)"))
                .arg(opt("item", "Menu item name (ITEM rules)"))
                .arg(req("price", "Price per kg"))
                .arg(req("currency", "Currency code"))
                .arg(
                    Arg::new("inactive")
                        .long("inactive")
                        .action(ArgAction::SetTrue)
                        .help("Create the rule disabled"),
                ),
        )
        .subcommand(json_flags(
            Command::new("list").about("List pricing rules").arg(
                Arg::new("all")
                    .long("all")
                    .action(ArgAction::SetTrue)
                    .help("Include inactive rules"),
            ),
        ))
        .subcommand(
            Command::new("update")
                .about("Change price, currency or active flag of a rule")
                .arg(req("id", "Rule id"))
                .arg(opt("price", "New price per kg"))
                .arg(opt("currency", "New currency code"))
                .arg(opt("active", "true|false")),
        )
        .subcommand(
            Command::new("rm")
                .about("Delete a pricing rule")
                .arg(req("id", "Rule id")),
        )
        .subcommand(json_flags(
            Command::new("resolve")
                .about("Show which price applies to an item/category")
                .arg(opt("item", "Menu item name"))
                .arg(req("category", "Food category"))
                .arg(opt("weight", "Weight in grams to cost").allow_hyphen_values(true)),
        ))
}

fn detection_cmd() -> Command {
    Command::new("detection")
        .about("Food-waste detections")
        .subcommand(
            Command::new("add")
                .about("Record a detection")
                .arg(req("category", "Detected food category"))
                .arg(
                    req("weight", "Weight in grams (negative = removed)")
                        .allow_hyphen_values(true),
                )
                .arg(opt("item", "Menu item name"))
                .arg(opt("camera", "Camera identifier"))
                .arg(opt("date", "Detection date YYYY-MM-DD (default today)")),
        )
        .subcommand(
            Command::new("review")
                .about("Override the category of a detection")
                .arg(req("id", "Detection id"))
                .arg(req("category", "Corrected food category")),
        )
        .subcommand(json_flags(
            Command::new("list")
                .about("List detections with resolved cost")
                .arg(opt("from", "From date (inclusive)"))
                .arg(opt("to", "To date (inclusive)"))
                .arg(opt("category", "Effective category"))
                .arg(opt("limit", "Max rows").value_parser(value_parser!(usize))),
        ))
        .subcommand(
            Command::new("rm")
                .about("Delete a detection")
                .arg(req("id", "Detection id")),
        )
}

fn target_cmd() -> Command {
    Command::new("target")
        .about("Waste-reduction targets")
        .subcommand(
            Command::new("add")
                .about("Create a target")
                .arg(req("name", "Target name"))
                .arg(opt("category", "Food category (default: all)"))
                .arg(req("type", "weight|cost|both").value_parser(["weight", "cost", "both"]))
                .arg(opt("weight-limit", "Weight limit in kg"))
                .arg(opt("cost-limit", "Cost limit"))
                .arg(req("currency", "Currency code"))
                .arg(
                    req("period", "Period type")
                        .value_parser(["daily", "weekly", "monthly", "quarterly", "yearly"]),
                )
                .arg(req("start", "Period start YYYY-MM-DD"))
                .arg(opt("end", "Period end YYYY-MM-DD")),
        )
        .subcommand(json_flags(
            Command::new("list")
                .about("List targets with progress and status")
                .arg(
                    Arg::new("all")
                        .long("all")
                        .action(ArgAction::SetTrue)
                        .help("Include inactive targets"),
                )
                .arg(opt("today", "Evaluate periods as of this date")),
        ))
        .subcommand(
            Command::new("accrue")
                .about("Add weight and/or cost to a target's counters")
                .arg(req("id", "Target id"))
                .arg(opt("weight-kg", "Weight to add in kg"))
                .arg(opt("cost", "Cost to add")),
        )
        .subcommand(
            Command::new("reset")
                .about("Zero a target's counters")
                .arg(req("id", "Target id")),
        )
        .subcommand(
            Command::new("set-active")
                .about("Enable or disable a target")
                .arg(req("id", "Target id"))
                .arg(req("active", "true|false")),
        )
        .subcommand(
            Command::new("rm")
                .about("Delete a target")
                .arg(req("id", "Target id")),
        )
}

fn report_cmd() -> Command {
    Command::new("report").about("Reports").subcommand(json_flags(
        Command::new("waste")
            .about("Weight and cost of detections by category")
            .arg(opt("from", "From date (inclusive)"))
            .arg(opt("to", "To date (inclusive)")),
    ))
}

pub fn build_cli() -> Command {
    Command::new("wastewatch")
        .version(clap::crate_version!())
        .about("Food-waste pricing and waste-reduction target tracking")
        .subcommand(Command::new("init").about("Create the database"))
        .subcommand(settings_cmd())
        .subcommand(price_cmd())
        .subcommand(detection_cmd())
        .subcommand(target_cmd())
        .subcommand(report_cmd())
        .subcommand(Command::new("doctor").about("Audit pricing and target data"))
}
