//! Single-cell classification.
//!
//! The classifier is deliberately strict and reversible: a string only
//! becomes a number when re-serializing the parsed number gives back the
//! exact trimmed input, so zero-padded codes (`007`), grouped digits
//! (`1,200`) and prices (`$5`) keep their original formatting.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SheetwiseError};
use crate::input::{CellValue, canonical_number};

use super::dates::{self, DateStyle};

/// Number followed by a unit (`12 cm`, `10kg`, `5%`, `30°`).
static UNIT_SUFFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(-?[0-9,.]+)\s*([a-zA-Z%°µ]+)$").unwrap());

/// Currency symbol then number (`$100`, `₹ 500`).
static CURRENCY_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([$€£₹¥])\s*(-?[0-9,.]+)$").unwrap());

/// Number then currency symbol (`100 €`).
static CURRENCY_SUFFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(-?[0-9,.]+)\s*([$€£₹¥])$").unwrap());

/// Classification of one cell, carrying the parsed canonical value.
#[derive(Debug, Clone, PartialEq)]
pub enum CellClass {
    /// Null, empty or whitespace-only.
    Empty,
    /// A number whose canonical form matches the input.
    Number(f64),
    /// A typed boolean. Strings are never promoted to booleans.
    Boolean(bool),
    /// A strictly valid calendar date.
    Date(NaiveDate),
    /// A number with a unit or currency symbol. `amount` is `None` when the
    /// digits themselves are malformed (`1.2.3 kg`).
    Measurement { amount: Option<f64>, unit: String },
    /// Anything else; the original value is kept as-is.
    Text,
}

impl CellClass {
    /// Get a human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            CellClass::Empty => "empty",
            CellClass::Number(_) => "number",
            CellClass::Boolean(_) => "boolean",
            CellClass::Date(_) => "date",
            CellClass::Measurement { .. } => "measurement",
            CellClass::Text => "text",
        }
    }
}

/// Configuration for cell classification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Smallest pure-digit value read as a spreadsheet serial date.
    pub serial_date_min: f64,
    /// Largest pure-digit value read as a spreadsheet serial date.
    pub serial_date_max: f64,
    /// How canonical dates are written.
    pub date_style: DateStyle,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            serial_date_min: 30_000.0,
            serial_date_max: 75_000.0,
            date_style: DateStyle::Iso,
        }
    }
}

impl ClassifierConfig {
    /// Check that the serial band is well formed.
    pub fn validate(&self) -> Result<()> {
        if !(self.serial_date_min.is_finite() && self.serial_date_max.is_finite())
            || self.serial_date_min > self.serial_date_max
        {
            return Err(SheetwiseError::Config(format!(
                "serial date band [{}, {}] is invalid",
                self.serial_date_min, self.serial_date_max
            )));
        }
        Ok(())
    }
}

/// Classifies raw cell values.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CellClassifier {
    config: ClassifierConfig,
}

impl CellClassifier {
    /// Create a classifier with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a classifier with custom configuration.
    pub fn with_config(config: ClassifierConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    /// Classify one cell value.
    pub fn classify(&self, value: &CellValue) -> CellClass {
        match value {
            CellValue::Null => CellClass::Empty,
            CellValue::Bool(b) => CellClass::Boolean(*b),
            CellValue::Number(n) => CellClass::Number(*n),
            CellValue::Text(s) => self.classify_str(s),
        }
    }

    /// Classify a raw string.
    pub fn classify_str(&self, raw: &str) -> CellClass {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return CellClass::Empty;
        }

        if let Some(date) = dates::parse_strict_date(trimmed) {
            return CellClass::Date(date);
        }

        if let Some(date) = dates::parse_serial_date(
            trimmed,
            self.config.serial_date_min,
            self.config.serial_date_max,
        ) {
            return CellClass::Date(date);
        }

        if let Some(number) = parse_strict_number(trimmed) {
            return CellClass::Number(number);
        }

        if let Some((amount, unit)) = parse_measurement(trimmed) {
            return CellClass::Measurement { amount, unit };
        }

        CellClass::Text
    }

    /// Render a date in the configured style.
    pub fn format_date(&self, date: NaiveDate) -> String {
        self.config.date_style.format(date)
    }
}

/// Classify with default settings.
pub fn classify(value: &CellValue) -> CellClass {
    CellClassifier::new().classify(value)
}

/// Parse a number only if its canonical form is exactly the input.
pub fn parse_strict_number(trimmed: &str) -> Option<f64> {
    let number: f64 = trimmed.parse().ok()?;
    if number.is_finite() && canonical_number(number) == trimmed {
        Some(number)
    } else {
        None
    }
}

/// Match a number-with-unit or currency shape, returning the amount (when
/// the digits parse) and the unit symbol.
pub fn parse_measurement(trimmed: &str) -> Option<(Option<f64>, String)> {
    let (digits, unit) = if let Some(caps) = UNIT_SUFFIX.captures(trimmed) {
        (caps[1].to_string(), caps[2].to_string())
    } else if let Some(caps) = CURRENCY_PREFIX.captures(trimmed) {
        (caps[2].to_string(), caps[1].to_string())
    } else if let Some(caps) = CURRENCY_SUFFIX.captures(trimmed) {
        (caps[1].to_string(), caps[2].to_string())
    } else {
        return None;
    };

    let amount = digits
        .replace(',', "")
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite());
    Some((amount, unit))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn class_of(s: &str) -> CellClass {
        classify(&CellValue::text(s))
    }

    #[test]
    fn test_typed_values_pass_through() {
        assert_eq!(classify(&CellValue::Number(45000.0)), CellClass::Number(45000.0));
        assert_eq!(classify(&CellValue::Bool(true)), CellClass::Boolean(true));
        assert_eq!(classify(&CellValue::Null), CellClass::Empty);
    }

    #[test]
    fn test_blank_strings_are_empty() {
        assert_eq!(class_of(""), CellClass::Empty);
        assert_eq!(class_of("   \t"), CellClass::Empty);
    }

    #[test]
    fn test_strict_numbers() {
        assert_eq!(class_of("123"), CellClass::Number(123.0));
        assert_eq!(class_of(" 12.5 "), CellClass::Number(12.5));
        assert_eq!(class_of("-4"), CellClass::Number(-4.0));
        assert_eq!(class_of("007"), CellClass::Text);
        assert_eq!(class_of("1e5"), CellClass::Text);
        assert_eq!(class_of("+1"), CellClass::Text);
        assert_eq!(class_of(".5"), CellClass::Text);
        assert_eq!(class_of("1.50"), CellClass::Text);
        assert_eq!(class_of("NaN"), CellClass::Text);
        assert_eq!(class_of("inf"), CellClass::Text);
    }

    #[test]
    fn test_grouped_digits_are_not_numbers() {
        // Grouping separators are not a unit, so this is plain text.
        assert_eq!(class_of("1,200"), CellClass::Text);
    }

    #[test]
    fn test_number_pair_is_text() {
        assert_eq!(class_of("2511/1122"), CellClass::Text);
        assert_eq!(class_of("777-333"), CellClass::Text);
    }

    #[test]
    fn test_dates() {
        assert!(matches!(class_of("30-06-2025"), CellClass::Date(_)));
        assert!(matches!(class_of("30-Jun-25"), CellClass::Date(_)));
        assert!(matches!(class_of("2025-06-30"), CellClass::Date(_)));
    }

    #[test]
    fn test_serial_band() {
        assert!(matches!(class_of("45000"), CellClass::Date(_)));
        assert_eq!(class_of("10001"), CellClass::Number(10001.0));
        assert_eq!(class_of("9876543210"), CellClass::Number(9876543210.0));
    }

    #[test]
    fn test_measurements() {
        assert_eq!(
            class_of("12 cm"),
            CellClass::Measurement { amount: Some(12.0), unit: "cm".into() }
        );
        assert_eq!(
            class_of("$5"),
            CellClass::Measurement { amount: Some(5.0), unit: "$".into() }
        );
        assert_eq!(
            class_of("₹ 1,500"),
            CellClass::Measurement { amount: Some(1500.0), unit: "₹".into() }
        );
        assert_eq!(
            class_of("100 €"),
            CellClass::Measurement { amount: Some(100.0), unit: "€".into() }
        );
        assert_eq!(
            class_of("45%"),
            CellClass::Measurement { amount: Some(45.0), unit: "%".into() }
        );
        assert_eq!(
            class_of("1.2.3kg"),
            CellClass::Measurement { amount: None, unit: "kg".into() }
        );
    }

    #[test]
    fn test_text_untouched() {
        assert_eq!(class_of("North"), CellClass::Text);
        assert_eq!(class_of("true"), CellClass::Text);
        assert_eq!(class_of("A-12"), CellClass::Text);
    }

    #[test]
    fn test_day_month_year_style() {
        let classifier = CellClassifier::with_config(ClassifierConfig {
            date_style: DateStyle::DayMonthYear,
            ..Default::default()
        });
        let CellClass::Date(date) = classifier.classify_str("2025-06-30") else {
            panic!("expected a date");
        };
        assert_eq!(classifier.format_date(date), "30-06-2025");
    }

    #[test]
    fn test_config_validation() {
        assert!(ClassifierConfig::default().validate().is_ok());
        let bad = ClassifierConfig {
            serial_date_min: 10.0,
            serial_date_max: 5.0,
            ..Default::default()
        };
        assert!(bad.validate().is_err());
    }
}
