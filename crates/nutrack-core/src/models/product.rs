use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use utoipa::ToSchema;
use uuid::Uuid;

#[cfg(feature = "sqlx")]
use sqlx::FromRow;

/// One product object exactly as it appears in an uploaded file.
///
/// Every field is optional at this stage; presence and ranges are checked by the
/// field validator so that a missing value becomes a field error instead of a parse
/// failure for the whole file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RawProductEntry {
    pub ean13_code: Option<String>,
    pub product_name: Option<String>,
    pub amount: Option<f64>,
    pub unit: Option<String>,
    pub calories: Option<f64>,
    pub protein: Option<f64>,
    pub carbs: Option<f64>,
    pub fat: Option<f64>,
    pub fiber: Option<f64>,
    pub sugar: Option<f64>,
    pub salt: Option<f64>,
}

/// Canonical measurement unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum Unit {
    G,
    Kg,
    Ml,
    L,
    Oz,
    Lb,
    Cup,
    Tbsp,
    Tsp,
}

impl Unit {
    /// Every canonical unit, in the order they are listed to clients.
    pub const ALL: [Unit; 9] = [
        Unit::G,
        Unit::Kg,
        Unit::Ml,
        Unit::L,
        Unit::Oz,
        Unit::Lb,
        Unit::Cup,
        Unit::Tbsp,
        Unit::Tsp,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Unit::G => "G",
            Unit::Kg => "KG",
            Unit::Ml => "ML",
            Unit::L => "L",
            Unit::Oz => "OZ",
            Unit::Lb => "LB",
            Unit::Cup => "CUP",
            Unit::Tbsp => "TBSP",
            Unit::Tsp => "TSP",
        }
    }
}

impl Display for Unit {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

/// A product entry that passed field validation.
///
/// The EAN code is exactly 13 digits, the name is trimmed and every nutrition value is
/// present (optional values that were absent are 0.0).
#[derive(Debug, Clone, PartialEq)]
pub struct CleanedProductEntry {
    pub ean13_code: String,
    pub product_name: String,
    pub amount: f64,
    pub unit: Unit,
    pub nutrition: Nutrition,
}

/// Nutrition values of one product
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Nutrition {
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
    pub fiber: f64,
    pub sugar: f64,
    pub salt: f64,
}

/// Stored product row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(FromRow))]
pub struct Product {
    pub id: Uuid,
    pub ean13_code: String,
    pub product_name: String,
    pub amount: f64,
    pub unit: String,
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
    pub fiber: f64,
    pub sugar: f64,
    pub salt: f64,
    pub upload_id: Uuid,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
}
