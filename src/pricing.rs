// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Price resolution for detections.
//!
//! A detection is priced by the first of: an active ITEM rule matching its menu
//! item name, an active CATEGORY rule matching its effective category, or the
//! configured default. Duplicate active rules for the same key resolve to the
//! lowest id.

use crate::errors::{PricingError, ValidationError};
use crate::models::{DefaultPriceSettings, Detection, FoodCategory, FoodPrice, PriceType};
use log::debug;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

const GRAMS_PER_KG: Decimal = Decimal::ONE_THOUSAND;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriceSource {
    Item,
    Category,
    Default,
}

impl fmt::Display for PriceSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PriceSource::Item => "item",
            PriceSource::Category => "category",
            PriceSource::Default => "default",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedPrice {
    pub price_per_kg: Decimal,
    pub currency: String,
    pub source: PriceSource,
    /// Matched rule; `None` when the default applied.
    pub rule_id: Option<i64>,
}

impl ResolvedPrice {
    fn from_rule(rule: &FoodPrice, source: PriceSource) -> Self {
        ResolvedPrice {
            price_per_kg: rule.price_per_kg,
            currency: rule.currency.clone(),
            source,
            rule_id: Some(rule.id),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetectionCost {
    pub detection_id: i64,
    pub category: FoodCategory,
    pub price: ResolvedPrice,
    pub cost: Decimal,
}

/// Active rules sharing one key; the first id is the one that wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DuplicateRule {
    pub key: String,
    pub ids: Vec<i64>,
}

/// Picks the lowest-id active rule accepted by `matches`.
fn pick_rule<'a>(
    price_list: &'a [FoodPrice],
    matches: impl Fn(&FoodPrice) -> bool,
) -> Option<&'a FoodPrice> {
    let mut hits = price_list.iter().filter(|p| p.is_active && matches(p));
    let first = hits.next()?;
    let mut winner = first;
    let mut dupes = 0usize;
    for p in hits {
        dupes += 1;
        if p.id < winner.id {
            winner = p;
        }
    }
    if dupes > 0 {
        debug!(
            "{} active rules match {}; using id {}",
            dupes + 1,
            winner.key(),
            winner.id
        );
    }
    Some(winner)
}

/// Resolves price-per-kg for an item name and (already effective) category.
///
/// Fails only when `defaults` is absent: a silent zero price would corrupt
/// cost aggregates.
pub fn resolve_price(
    item_name: Option<&str>,
    category: FoodCategory,
    price_list: &[FoodPrice],
    defaults: Option<&DefaultPriceSettings>,
) -> Result<ResolvedPrice, PricingError> {
    let defaults = defaults.ok_or(PricingError::ConfigurationMissing)?;

    if let Some(name) = item_name.filter(|n| !n.trim().is_empty()) {
        let hit = pick_rule(price_list, |p| {
            p.price_type == PriceType::Item && p.item_name.as_deref() == Some(name)
        });
        if let Some(rule) = hit {
            debug!("price for item '{}' from rule {}", name, rule.id);
            return Ok(ResolvedPrice::from_rule(rule, PriceSource::Item));
        }
    }

    let hit = pick_rule(price_list, |p| {
        p.price_type == PriceType::Category && p.category == Some(category)
    });
    if let Some(rule) = hit {
        debug!("price for category {} from rule {}", category, rule.id);
        return Ok(ResolvedPrice::from_rule(rule, PriceSource::Category));
    }

    debug!("no rule for {:?}/{}; using default", item_name, category);
    Ok(ResolvedPrice {
        price_per_kg: defaults.default_price_per_kg,
        currency: defaults.default_currency.clone(),
        source: PriceSource::Default,
        rule_id: None,
    })
}

pub fn resolve_for_detection(
    detection: &Detection,
    price_list: &[FoodPrice],
    defaults: Option<&DefaultPriceSettings>,
) -> Result<ResolvedPrice, PricingError> {
    resolve_price(
        detection.item_name.as_deref(),
        detection.effective_category(),
        price_list,
        defaults,
    )
}

/// Cost of `weight_grams` at `price_per_kg`. The weight's sign is dropped.
pub fn compute_cost(
    weight_grams: Decimal,
    price_per_kg: Decimal,
) -> Result<Decimal, ValidationError> {
    (weight_grams.abs() / GRAMS_PER_KG)
        .checked_mul(price_per_kg)
        .ok_or(ValidationError::Overflow { field: "cost" })
}

pub fn detection_cost(
    detection: &Detection,
    price_list: &[FoodPrice],
    defaults: Option<&DefaultPriceSettings>,
) -> Result<DetectionCost, PricingError> {
    let price = resolve_for_detection(detection, price_list, defaults)?;
    let cost = compute_cost(detection.weight_grams, price.price_per_kg)?;
    Ok(DetectionCost {
        detection_id: detection.id,
        category: detection.effective_category(),
        price,
        cost,
    })
}

/// Groups active rules that share a key, for data-quality auditing.
pub fn find_duplicate_rules(price_list: &[FoodPrice]) -> Vec<DuplicateRule> {
    let mut by_key: BTreeMap<String, Vec<i64>> = BTreeMap::new();
    for p in price_list.iter().filter(|p| p.is_active) {
        by_key.entry(p.key()).or_default().push(p.id);
    }
    by_key
        .into_iter()
        .filter(|(_, ids)| ids.len() > 1)
        .map(|(key, mut ids)| {
            ids.sort_unstable();
            DuplicateRule { key, ids }
        })
        .collect()
}
