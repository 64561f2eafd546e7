//! ISBN normalization and checksum helpers

use once_cell::sync::Lazy;
use regex::Regex;

static SEPARATORS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\s\-]+").expect("valid regex"));
static ISBN10: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{9}[\dX]$").expect("valid regex"));
static ISBN13: Lazy<Regex> = Lazy::new(|| Regex::new(r"^97[89]\d{10}$").expect("valid regex"));

/// Strip separators and uppercase a trailing `x`
pub fn normalize(raw: &str) -> String {
    SEPARATORS.replace_all(raw.trim(), "").to_uppercase()
}

/// True when `raw` is a well-formed ISBN-10 or ISBN-13 with a correct
/// check digit
pub fn is_valid(raw: &str) -> bool {
    let isbn = normalize(raw);
    if ISBN13.is_match(&isbn) {
        let sum: u32 = isbn
            .chars()
            .filter_map(|c| c.to_digit(10))
            .enumerate()
            .map(|(i, d)| if i % 2 == 0 { d } else { d * 3 })
            .sum();
        return sum % 10 == 0;
    }
    if ISBN10.is_match(&isbn) {
        let sum: u32 = isbn
            .chars()
            .enumerate()
            .map(|(i, c)| {
                let d = if c == 'X' { 10 } else { c.to_digit(10).unwrap_or(0) };
                (10 - i as u32) * d
            })
            .sum();
        return sum % 11 == 0;
    }
    false
}

/// Validator hook for form fields
pub fn validate(raw: &str) -> Result<(), validator::ValidationError> {
    if is_valid(raw) {
        Ok(())
    } else {
        let mut err = validator::ValidationError::new("isbn");
        err.message = Some("ISBN must be a valid ISBN-10 or ISBN-13".into());
        Err(err)
    }
}
