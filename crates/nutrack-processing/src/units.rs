//! Unit synonym catalogue

use nutrack_core::models::Unit;

/// Resolve a free-form unit (any case, surrounding whitespace allowed) to its
/// canonical token. Canonical tokens resolve to themselves.
pub fn normalize_unit(input: &str) -> Option<Unit> {
    let unit = match input.trim().to_lowercase().as_str() {
        "g" | "gr" | "gram" | "grams" | "gramme" | "grammes" => Unit::G,
        "kg" | "kilo" | "kilos" | "kilogram" | "kilograms" => Unit::Kg,
        "ml" | "milliliter" | "milliliters" | "millilitre" | "millilitres" => Unit::Ml,
        "l" | "liter" | "liters" | "litre" | "litres" => Unit::L,
        "oz" | "ounce" | "ounces" => Unit::Oz,
        "lb" | "lbs" | "pound" | "pounds" => Unit::Lb,
        "cup" | "cups" => Unit::Cup,
        "tbsp" | "tablespoon" | "tablespoons" => Unit::Tbsp,
        "tsp" | "teaspoon" | "teaspoons" => Unit::Tsp,
        _ => return None,
    };
    Some(unit)
}

/// Comma separated list of canonical tokens, for error messages.
pub fn allowed_units() -> String {
    Unit::ALL
        .iter()
        .map(Unit::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}
