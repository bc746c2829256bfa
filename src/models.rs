// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::errors::ValidationError;
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// Tags arrive as "PROTEIN", "FoodCategory.PROTEIN", "category:protein", "no waste".
static CATEGORY_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:[A-Za-z_]+[.:/]\s*)?(.+)$").expect("category tag regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FoodCategory {
    Protein,
    Carbohydrate,
    Vegetables,
    Fruits,
    Pastry,
    Others,
    NoWaste,
}

impl FoodCategory {
    pub const ALL: [FoodCategory; 7] = [
        FoodCategory::Protein,
        FoodCategory::Carbohydrate,
        FoodCategory::Vegetables,
        FoodCategory::Fruits,
        FoodCategory::Pastry,
        FoodCategory::Others,
        FoodCategory::NoWaste,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FoodCategory::Protein => "PROTEIN",
            FoodCategory::Carbohydrate => "CARBOHYDRATE",
            FoodCategory::Vegetables => "VEGETABLES",
            FoodCategory::Fruits => "FRUITS",
            FoodCategory::Pastry => "PASTRY",
            FoodCategory::Others => "OTHERS",
            FoodCategory::NoWaste => "NO_WASTE",
        }
    }
}

impl FromStr for FoodCategory {
    type Err = ValidationError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let unknown = || ValidationError::UnknownCategory(raw.to_string());
        let caps = CATEGORY_TAG.captures(raw.trim()).ok_or_else(unknown)?;
        let tag = caps[1]
            .trim()
            .to_uppercase()
            .replace([' ', '-'], "_");
        FoodCategory::ALL
            .into_iter()
            .find(|c| c.as_str() == tag)
            .ok_or_else(unknown)
    }
}

impl fmt::Display for FoodCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PriceType {
    Category,
    Item,
}

impl PriceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PriceType::Category => "CATEGORY",
            PriceType::Item => "ITEM",
        }
    }
}

impl FromStr for PriceType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "CATEGORY" => Ok(PriceType::Category),
            "ITEM" => Ok(PriceType::Item),
            _ => Err(ValidationError::UnknownVariant {
                kind: "price type",
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for PriceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A configured price-per-kilogram keyed by menu item name or by category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodPrice {
    pub id: i64,
    pub price_type: PriceType,
    pub category: Option<FoodCategory>,
    pub item_name: Option<String>,
    pub price_per_kg: Decimal,
    pub currency: String,
    pub is_active: bool,
}

impl FoodPrice {
    /// Checks that the key matches `price_type` and the price is positive.
    pub fn validate(&self) -> Result<(), ValidationError> {
        match (self.price_type, &self.category, &self.item_name) {
            (PriceType::Category, Some(_), None) => {}
            (PriceType::Item, None, Some(name)) if !name.trim().is_empty() => {}
            (PriceType::Category, _, _) => {
                return Err(ValidationError::InvalidPriceRule(
                    "CATEGORY rules need a category and no item name".into(),
                ));
            }
            (PriceType::Item, _, _) => {
                return Err(ValidationError::InvalidPriceRule(
                    "ITEM rules need a non-empty item name and no category".into(),
                ));
            }
        }
        if self.price_per_kg <= Decimal::ZERO {
            return Err(ValidationError::NonPositive {
                field: "price_per_kg",
                value: self.price_per_kg,
            });
        }
        Ok(())
    }

    /// Human-readable rule key, e.g. `ITEM:Nasi Goreng` or `CATEGORY:FRUITS`.
    pub fn key(&self) -> String {
        match self.price_type {
            PriceType::Item => format!("ITEM:{}", self.item_name.as_deref().unwrap_or_default()),
            PriceType::Category => format!(
                "CATEGORY:{}",
                self.category.map(|c| c.as_str()).unwrap_or_default()
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DefaultPriceSettings {
    pub default_price_per_kg: Decimal,
    pub default_currency: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub id: i64,
    pub detected_at: NaiveDate,
    pub category: FoodCategory,
    pub corrected_category: Option<FoodCategory>,
    pub item_name: Option<String>,
    pub weight_grams: Decimal, // negative = removed/consumed
    pub camera: Option<String>,
}

impl Detection {
    /// The reviewed category when present, else the detected one.
    pub fn effective_category(&self) -> FoodCategory {
        self.corrected_category.unwrap_or(self.category)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetType {
    Weight,
    Cost,
    Both,
}

impl TargetType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TargetType::Weight => "weight",
            TargetType::Cost => "cost",
            TargetType::Both => "both",
        }
    }

    pub fn tracks_weight(&self) -> bool {
        matches!(self, TargetType::Weight | TargetType::Both)
    }

    pub fn tracks_cost(&self) -> bool {
        matches!(self, TargetType::Cost | TargetType::Both)
    }
}

impl FromStr for TargetType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "weight" => Ok(TargetType::Weight),
            "cost" => Ok(TargetType::Cost),
            "both" => Ok(TargetType::Both),
            _ => Err(ValidationError::UnknownVariant {
                kind: "target type",
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for TargetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PeriodType {
    Daily,
    Weekly,
    Monthly,
    Quarterly,
    Yearly,
}

impl PeriodType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PeriodType::Daily => "daily",
            PeriodType::Weekly => "weekly",
            PeriodType::Monthly => "monthly",
            PeriodType::Quarterly => "quarterly",
            PeriodType::Yearly => "yearly",
        }
    }
}

impl FromStr for PeriodType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "daily" => Ok(PeriodType::Daily),
            "weekly" => Ok(PeriodType::Weekly),
            "monthly" => Ok(PeriodType::Monthly),
            "quarterly" => Ok(PeriodType::Quarterly),
            "yearly" => Ok(PeriodType::Yearly),
            _ => Err(ValidationError::UnknownVariant {
                kind: "period type",
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for PeriodType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Severity of a target's progress. Ordered so that `max` picks the worst.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetStatus {
    OnTrack,
    Warning,
    Exceeded,
}

impl TargetStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TargetStatus::OnTrack => "on_track",
            TargetStatus::Warning => "warning",
            TargetStatus::Exceeded => "exceeded",
        }
    }
}

impl fmt::Display for TargetStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WasteTarget {
    pub id: i64,
    pub name: String,
    pub category: Option<FoodCategory>, // None = all categories
    pub target_type: TargetType,
    pub weight_limit_kg: Option<Decimal>,
    pub cost_limit: Option<Decimal>,
    pub currency: String,
    pub period_type: PeriodType,
    pub target_period_start: NaiveDate,
    pub target_period_end: Option<NaiveDate>,
    pub current_weight: Decimal, // kg
    pub current_cost: Decimal,
    pub is_active: bool,
}

impl WasteTarget {
    /// Ensures every dimension selected by `target_type` has a positive limit.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let checks = [
            (self.target_type.tracks_weight(), self.weight_limit_kg, "weight_limit_kg"),
            (self.target_type.tracks_cost(), self.cost_limit, "cost_limit"),
        ];
        for (tracked, limit, field) in checks {
            if !tracked {
                continue;
            }
            match limit {
                None => {
                    return Err(ValidationError::MissingLimit {
                        target_type: self.target_type.to_string(),
                        field,
                    });
                }
                Some(v) if v <= Decimal::ZERO => {
                    return Err(ValidationError::NonPositive { field, value: v });
                }
                Some(_) => {}
            }
        }
        Ok(())
    }
}
