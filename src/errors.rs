// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Error types shared by the pricing and progress modules.

use rust_decimal::Decimal;
use thiserror::Error;

/// Failures raised while resolving a price for a detection.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PricingError {
    /// Default price settings have not been configured yet.
    #[error("Default price settings are not configured; run `settings set-default` first")]
    ConfigurationMissing,

    #[error(transparent)]
    Invalid(#[from] ValidationError),
}

/// Input validation failures caught at the boundary (CLI, store rows).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Unknown food category '{0}'")]
    UnknownCategory(String),

    #[error("Invalid currency code '{0}', expected three letters")]
    InvalidCurrency(String),

    #[error("{field} must be positive, got {value}")]
    NonPositive { field: &'static str, value: Decimal },

    #[error("Invalid price rule: {0}")]
    InvalidPriceRule(String),

    #[error("Target type '{target_type}' requires {field}")]
    MissingLimit {
        target_type: String,
        field: &'static str,
    },

    #[error("Accrued {field} must not be negative, got {value}")]
    NegativeAccrual { field: &'static str, value: Decimal },

    #[error("{field} is out of range for decimal arithmetic")]
    Overflow { field: &'static str },

    #[error("Unknown {kind} '{value}'")]
    UnknownVariant { kind: &'static str, value: String },
}
