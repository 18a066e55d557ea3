//! Field validation and normalization for a single product entry.
//!
//! Unlike the batch stage, validation here is exhaustive: every field is checked and
//! every problem is reported, in field order, so one pass over a rejected entry tells
//! the client everything that needs fixing.

use nutrack_core::models::{CleanedProductEntry, Nutrition, RawProductEntry, Unit};

use crate::units::{allowed_units, normalize_unit};

pub const EAN_LENGTH: usize = 13;
pub const MIN_NAME_LENGTH: usize = 2;
pub const MAX_NAME_LENGTH: usize = 255;
pub const MAX_AMOUNT: f64 = 999_999.99;
pub const MAX_CALORIES: f64 = 9_999.99;
pub const MAX_NUTRIENT: f64 = 999.99;

/// Result of validating one entry.
///
/// The cleaned EAN and unit are only present when their own checks passed, and the
/// cleaned entry is only present when the whole entry is valid.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationOutcome {
    errors: Vec<String>,
    cleaned_ean: Option<String>,
    cleaned_unit: Option<Unit>,
    entry: Option<CleanedProductEntry>,
}

impl ValidationOutcome {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn cleaned_ean(&self) -> Option<&str> {
        self.cleaned_ean.as_deref()
    }

    pub fn cleaned_unit(&self) -> Option<Unit> {
        self.cleaned_unit
    }

    /// Split into the cleaned entry (when valid) or the collected field errors.
    pub fn into_result(self) -> Result<CleanedProductEntry, Vec<String>> {
        match self.entry {
            Some(entry) if self.errors.is_empty() => Ok(entry),
            _ => Err(self.errors),
        }
    }
}

/// Validate and clean one raw entry, collecting every field error.
pub fn validate_entry(raw: &RawProductEntry) -> ValidationOutcome {
    let mut errors = Vec::new();

    let ean = collect(validate_ean(raw.ean13_code.as_deref()), &mut errors);
    let name = collect(validate_name(raw.product_name.as_deref()), &mut errors);
    let amount = collect(validate_amount(raw.amount), &mut errors);
    let unit = collect(validate_unit(raw.unit.as_deref()), &mut errors);
    let nutrition = match validate_nutrition(raw) {
        Ok(nutrition) => Some(nutrition),
        Err(mut nutrition_errors) => {
            errors.append(&mut nutrition_errors);
            None
        }
    };

    let entry = match (&ean, name, amount, unit, nutrition) {
        (Some(ean), Some(product_name), Some(amount), Some(unit), Some(nutrition))
            if errors.is_empty() =>
        {
            Some(CleanedProductEntry {
                ean13_code: ean.clone(),
                product_name,
                amount,
                unit,
                nutrition,
            })
        }
        _ => None,
    };

    ValidationOutcome {
        errors,
        cleaned_ean: ean,
        cleaned_unit: unit,
        entry,
    }
}

fn collect<T>(result: Result<T, String>, errors: &mut Vec<String>) -> Option<T> {
    result.map_err(|e| errors.push(e)).ok()
}

/// Strip digit separators from an EAN code and require exactly 13 digits.
///
/// Only digits, spaces, hyphens, dots and commas are accepted; the first other
/// character is reported with its 1-based position.
pub fn validate_ean(code: Option<&str>) -> Result<String, String> {
    let code = match code {
        Some(code) if !code.is_empty() => code,
        _ => return Err("EAN code is required".to_string()),
    };

    if let Some((index, invalid)) = code
        .chars()
        .enumerate()
        .find(|(_, c)| !(c.is_ascii_digit() || matches!(c, ' ' | '-' | '.' | ',')))
    {
        return Err(format!(
            "EAN code contains invalid character '{}' at position {}",
            invalid,
            index + 1
        ));
    }

    let digits: String = code.chars().filter(char::is_ascii_digit).collect();
    if digits.len() != EAN_LENGTH {
        return Err(format!(
            "EAN code must contain exactly {} digits, found {}",
            EAN_LENGTH,
            digits.len()
        ));
    }

    Ok(digits)
}

pub fn validate_unit(unit: Option<&str>) -> Result<Unit, String> {
    let unit = match unit {
        Some(unit) if !unit.trim().is_empty() => unit,
        _ => return Err("Unit is required".to_string()),
    };

    normalize_unit(unit).ok_or_else(|| {
        format!(
            "Invalid unit '{}'. Allowed units: {}",
            unit.trim(),
            allowed_units()
        )
    })
}

pub fn validate_name(name: Option<&str>) -> Result<String, String> {
    let name = name.map(str::trim).unwrap_or_default();
    if name.is_empty() {
        return Err("Product name is required".to_string());
    }

    let length = name.chars().count();
    if !(MIN_NAME_LENGTH..=MAX_NAME_LENGTH).contains(&length) {
        return Err(format!(
            "Product name must be between {} and {} characters",
            MIN_NAME_LENGTH, MAX_NAME_LENGTH
        ));
    }

    Ok(name.to_string())
}

pub fn validate_amount(amount: Option<f64>) -> Result<f64, String> {
    let amount = amount.ok_or_else(|| "Amount is required".to_string())?;
    if amount <= 0.0 {
        return Err("Amount must be greater than 0".to_string());
    }
    if amount > MAX_AMOUNT {
        return Err(format!("Amount must not exceed {:.2}", MAX_AMOUNT));
    }
    Ok(amount)
}

/// Calories are required; the remaining nutrients default to 0.0 when absent.
pub fn validate_nutrition(raw: &RawProductEntry) -> Result<Nutrition, Vec<String>> {
    let mut errors = Vec::new();

    let calories = match raw.calories {
        None => {
            errors.push("Calories are required".to_string());
            0.0
        }
        Some(calories) if calories <= 0.0 || calories > MAX_CALORIES => {
            errors.push(format!(
                "Calories must be greater than 0 and at most {:.2}",
                MAX_CALORIES
            ));
            calories
        }
        Some(calories) => calories,
    };

    let mut optional = |label: &str, value: Option<f64>| -> f64 {
        match value {
            None => 0.0,
            Some(v) if (0.0..=MAX_NUTRIENT).contains(&v) => v,
            Some(v) => {
                errors.push(format!(
                    "{} must be between 0 and {:.2}",
                    label, MAX_NUTRIENT
                ));
                v
            }
        }
    };

    let nutrition = Nutrition {
        calories,
        protein: optional("Protein", raw.protein),
        carbs: optional("Carbs", raw.carbs),
        fat: optional("Fat", raw.fat),
        fiber: optional("Fiber", raw.fiber),
        sugar: optional("Sugar", raw.sugar),
        salt: optional("Salt", raw.salt),
    };

    if errors.is_empty() {
        Ok(nutrition)
    } else {
        Err(errors)
    }
}
