//! Field-level constraint checks shared by the services.
//!
//! Checks push messages into a [`FieldErrors`] collector so a single request reports
//! every failing field at once; the service then calls [`FieldErrors::into_result`]
//! before touching the database.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::error::{AppError, AppResult};

pub const MAX_CHAR_LENGTH: usize = 255;
pub const MAX_EMAIL_LENGTH: usize = 254;
/// Digits and decimal places of every money column.
pub const PRICE_DIGITS: u32 = 6;
pub const PRICE_PLACES: u32 = 2;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^[A-Za-z0-9.!#$%&'*+/=?^_`{|}~-]+@[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?)+$",
    )
    .expect("email pattern compiles")
});
static SLUG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[-a-zA-Z0-9_]+$").expect("slug pattern compiles"));
static SLUG_STRIP_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-z0-9_\s-]").expect("slug strip pattern compiles"));
static SLUG_SEPARATOR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[-\s]+").expect("slug separator pattern compiles"));

/// Messages keyed by the name of the field that failed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_owned())
            .or_default()
            .push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn messages(&self, field: &str) -> &[String] {
        self.0.get(field).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn into_result(self) -> AppResult<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(AppError::Validation(self))
        }
    }

    /// Shorthand for an error carrying a single message.
    pub fn single(field: &str, message: impl Into<String>) -> AppError {
        let mut errors = Self::new();
        errors.add(field, message);
        AppError::Validation(errors)
    }
}

/// Required text: not blank and at most `max` characters.
pub fn check_text(errors: &mut FieldErrors, field: &str, value: &str, max: usize) {
    if value.trim().is_empty() {
        errors.add(field, "This field may not be blank.");
        return;
    }
    check_max_length(errors, field, value, max);
}

pub fn check_max_length(errors: &mut FieldErrors, field: &str, value: &str, max: usize) {
    let len = value.chars().count();
    if len > max {
        errors.add(
            field,
            format!("Ensure this value has at most {max} characters (it has {len})."),
        );
    }
}

/// Fixed-point column check: at most `places` fractional digits and
/// `digits - places` integer digits.
pub fn check_decimal(errors: &mut FieldErrors, field: &str, value: Decimal, digits: u32, places: u32) {
    if value.normalize().scale() > places {
        errors.add(
            field,
            format!("Ensure that there are no more than {places} decimal places."),
        );
    }
    let whole_digits = digits - places;
    let limit = Decimal::from(10_i64.pow(whole_digits));
    if value.abs().trunc() >= limit {
        errors.add(
            field,
            format!("Ensure that there are no more than {whole_digits} digits before the decimal point."),
        );
    }
}

pub fn check_price(errors: &mut FieldErrors, field: &str, value: Decimal) {
    check_decimal(errors, field, value, PRICE_DIGITS, PRICE_PLACES);
}

pub fn check_min_decimal(errors: &mut FieldErrors, field: &str, value: Decimal, min: Decimal) {
    if value < min {
        errors.add(
            field,
            format!("Ensure this value is greater than or equal to {min}."),
        );
    }
}

pub fn check_non_negative(errors: &mut FieldErrors, field: &str, value: i32) {
    if value < 0 {
        errors.add(field, "Ensure this value is greater than or equal to 0.");
    }
}

/// Item quantities are stored as small integers and must be at least one.
pub fn check_quantity(errors: &mut FieldErrors, field: &str, value: i32) -> i16 {
    match i16::try_from(value) {
        Ok(quantity) if quantity >= 1 => quantity,
        Ok(_) => {
            errors.add(field, "Ensure this value is greater than or equal to 1.");
            0
        }
        Err(_) => {
            errors.add(
                field,
                format!("Ensure this value is less than or equal to {}.", i16::MAX),
            );
            0
        }
    }
}

pub fn check_email(errors: &mut FieldErrors, field: &str, value: &str) {
    if value.chars().count() > MAX_EMAIL_LENGTH || !EMAIL_RE.is_match(value) {
        errors.add(field, "Enter a valid email address.");
    }
}

pub fn check_slug(errors: &mut FieldErrors, field: &str, value: &str) {
    if !SLUG_RE.is_match(value) {
        errors.add(
            field,
            "Enter a valid slug consisting of letters, numbers, underscores or hyphens.",
        );
        return;
    }
    check_max_length(errors, field, value, MAX_CHAR_LENGTH);
}

/// Lowercase, ASCII-only, hyphen separated form of `value`.
pub fn slugify(value: &str) -> String {
    let lowered = value.to_lowercase();
    let stripped = SLUG_STRIP_RE.replace_all(&lowered, "");
    let dashed = SLUG_SEPARATOR_RE.replace_all(stripped.trim(), "-");
    dashed
        .trim_matches(|c| c == '-' || c == '_')
        .chars()
        .take(MAX_CHAR_LENGTH)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugify_collapses_separators_and_drops_punctuation() {
        assert_eq!(slugify("The Rust Book!"), "the-rust-book");
        assert_eq!(slugify("  Coffee -- Mug  "), "coffee-mug");
        assert_eq!(slugify("Café au lait"), "caf-au-lait");
        assert_eq!(slugify("!!!"), "");
    }

    #[test]
    fn price_rejects_extra_places_and_whole_digits() {
        let mut errors = FieldErrors::new();
        check_price(&mut errors, "unit_price", Decimal::new(9999, 2));
        assert!(errors.is_empty());

        check_price(&mut errors, "unit_price", Decimal::new(1999, 3));
        assert_eq!(errors.messages("unit_price").len(), 1);

        let mut errors = FieldErrors::new();
        check_price(&mut errors, "unit_price", Decimal::new(1_000_000, 2));
        assert!(errors.messages("unit_price")[0].contains("4 digits"));
    }

    #[test]
    fn trailing_zeros_do_not_count_as_places() {
        let mut errors = FieldErrors::new();
        check_price(&mut errors, "unit_price", Decimal::new(12_5000, 4));
        assert!(errors.is_empty());
    }

    #[test]
    fn minimum_price_is_inclusive() {
        let mut errors = FieldErrors::new();
        check_min_decimal(&mut errors, "unit_price", Decimal::ONE, Decimal::ONE);
        assert!(errors.is_empty());
        check_min_decimal(&mut errors, "unit_price", Decimal::new(99, 2), Decimal::ONE);
        assert!(errors.contains("unit_price"));
    }

    #[test]
    fn email_format() {
        let mut errors = FieldErrors::new();
        check_email(&mut errors, "email", "ada@example.com");
        assert!(errors.is_empty());
        for bad in ["ada", "ada@", "@example.com", "ada@example", "a b@example.com"] {
            let mut errors = FieldErrors::new();
            check_email(&mut errors, "email", bad);
            assert!(errors.contains("email"), "{bad} should be rejected");
        }
    }

    #[test]
    fn quantity_bounds() {
        let mut errors = FieldErrors::new();
        assert_eq!(check_quantity(&mut errors, "quantity", 3), 3);
        assert!(errors.is_empty());
        check_quantity(&mut errors, "quantity", 0);
        check_quantity(&mut errors, "quantity", 40_000);
        assert_eq!(errors.messages("quantity").len(), 2);
    }

    #[test]
    fn text_collects_every_failure_per_field() {
        let mut errors = FieldErrors::new();
        check_text(&mut errors, "title", "   ", MAX_CHAR_LENGTH);
        check_text(&mut errors, "city", &"x".repeat(256), MAX_CHAR_LENGTH);
        assert_eq!(errors.fields().collect::<Vec<_>>(), vec!["city", "title"]);
        assert!(errors.into_result().is_err());
    }
}
