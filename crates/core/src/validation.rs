//! Field-level validation shared by the repository and API layers.
//!
//! Uniqueness is enforced by the database; these helpers only check shape.
//! Normalising validators return the canonical form to store.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::CoreError;

static ARTICLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]{3,32}$").expect("valid regex"));

static PLATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z0-9А-ЯЁ]{4,12}$").expect("valid regex"));

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid regex"));

/// Maximum length of free-text names (clients, products, warehouses, ...).
pub const MAX_NAME_LENGTH: usize = 255;

/// Maximum length of an equipment inventory number.
pub const MAX_INVENTORY_NUMBER_LENGTH: usize = 64;

/// Maximum length of comments, notes and reasons.
pub const MAX_TEXT_LENGTH: usize = 4_000;

const INN10_WEIGHTS: [u32; 9] = [2, 4, 10, 3, 5, 9, 4, 6, 8];
const INN11_WEIGHTS: [u32; 10] = [7, 2, 4, 10, 3, 5, 9, 4, 6, 8];
const INN12_WEIGHTS: [u32; 11] = [3, 7, 2, 4, 10, 3, 5, 9, 4, 6, 8];

fn inn_check_digit(digits: &[u32], weights: &[u32]) -> u32 {
    let sum: u32 = digits.iter().zip(weights).map(|(d, w)| d * w).sum();
    sum % 11 % 10
}

/// Validate a taxpayer identification number (INN).
///
/// Legal entities have 10 digits with one check digit, individuals 12 digits
/// with two. Surrounding whitespace is trimmed; the trimmed value is returned.
pub fn validate_inn(inn: &str) -> Result<String, CoreError> {
    let inn = inn.trim();
    let digits: Vec<u32> = inn.chars().filter_map(|c| c.to_digit(10)).collect();
    if digits.len() != inn.chars().count() {
        return Err(CoreError::Validation(
            "INN must contain digits only".to_string(),
        ));
    }

    let valid = match digits.len() {
        10 => inn_check_digit(&digits[..9], &INN10_WEIGHTS) == digits[9],
        12 => {
            inn_check_digit(&digits[..10], &INN11_WEIGHTS) == digits[10]
                && inn_check_digit(&digits[..11], &INN12_WEIGHTS) == digits[11]
        }
        n => {
            return Err(CoreError::Validation(format!(
                "INN must be 10 or 12 digits long (got {n})"
            )))
        }
    };

    if !valid {
        return Err(CoreError::Validation(format!(
            "INN '{inn}' has an invalid check digit"
        )));
    }
    Ok(inn.to_string())
}

/// Validate a product article and return it upper-cased.
pub fn normalize_article(article: &str) -> Result<String, CoreError> {
    let article = article.trim();
    if !ARTICLE_RE.is_match(article) {
        return Err(CoreError::Validation(format!(
            "Article '{article}' must be 3-32 characters of letters, digits, '-' or '_'"
        )));
    }
    Ok(article.to_uppercase())
}

/// Validate a vehicle registration number.
///
/// Spaces and dashes are dropped and letters upper-cased before matching, so
/// `"а 123 вс-77"` and `"А123ВС77"` are the same plate.
pub fn normalize_registration_number(plate: &str) -> Result<String, CoreError> {
    let normalized: String = plate
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '-')
        .flat_map(char::to_uppercase)
        .collect();
    if !PLATE_RE.is_match(&normalized) {
        return Err(CoreError::Validation(format!(
            "Registration number '{plate}' must be 4-12 letters or digits"
        )));
    }
    Ok(normalized)
}

pub fn validate_inventory_number(number: &str) -> Result<(), CoreError> {
    let number = number.trim();
    if number.is_empty() || number.len() > MAX_INVENTORY_NUMBER_LENGTH {
        return Err(CoreError::Validation(format!(
            "Inventory number must be 1-{MAX_INVENTORY_NUMBER_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Validate an e-mail address and return it trimmed and lower-cased.
pub fn normalize_email(email: &str) -> Result<String, CoreError> {
    let email = email.trim().to_lowercase();
    if !EMAIL_RE.is_match(&email) || email.len() > MAX_NAME_LENGTH {
        return Err(CoreError::Validation(format!(
            "'{email}' is not a valid e-mail address"
        )));
    }
    Ok(email)
}

/// Require a non-blank name no longer than [`MAX_NAME_LENGTH`].
pub fn validate_name(field: &str, value: &str) -> Result<(), CoreError> {
    if value.trim().is_empty() {
        return Err(CoreError::Validation(format!("{field} must not be empty")));
    }
    if value.len() > MAX_NAME_LENGTH {
        return Err(CoreError::Validation(format!(
            "{field} exceeds maximum length of {MAX_NAME_LENGTH} characters"
        )));
    }
    Ok(())
}

pub fn validate_text(field: &str, value: &str) -> Result<(), CoreError> {
    if value.len() > MAX_TEXT_LENGTH {
        return Err(CoreError::Validation(format!(
            "{field} exceeds maximum length of {MAX_TEXT_LENGTH} characters"
        )));
    }
    Ok(())
}

pub fn validate_positive_quantity(quantity: i32) -> Result<(), CoreError> {
    if quantity <= 0 {
        return Err(CoreError::Validation(format!(
            "Quantity must be positive (got {quantity})"
        )));
    }
    Ok(())
}

/// Require a finite, non-negative measurement (price, weight, volume).
pub fn validate_non_negative(field: &str, value: f64) -> Result<(), CoreError> {
    if !value.is_finite() || value < 0.0 {
        return Err(CoreError::Validation(format!(
            "{field} must be a non-negative number"
        )));
    }
    Ok(())
}

/// Sum `(quantity, unit_price_cents)` pairs into an order total.
///
/// Overflow is reported as a validation error rather than wrapping.
pub fn order_total<I>(lines: I) -> Result<i64, CoreError>
where
    I: IntoIterator<Item = (i32, i64)>,
{
    lines
        .into_iter()
        .try_fold(0i64, |total, (quantity, unit_price_cents)| {
            i64::from(quantity)
                .checked_mul(unit_price_cents)
                .and_then(|line| total.checked_add(line))
        })
        .ok_or_else(|| CoreError::Validation("Order total is too large".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_total_sums_lines() {
        assert_eq!(order_total([(3, 1_000), (4, 250)]).unwrap(), 4_000);
        assert_eq!(order_total(std::iter::empty()).unwrap(), 0);
    }

    #[test]
    fn order_total_overflow_is_a_validation_error() {
        let err = order_total([(3, i64::MAX / 2)]).unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
        let err = order_total([(1, i64::MAX), (1, 1)]).unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
    }

    #[test]
    fn valid_ten_digit_inn() {
        assert_eq!(validate_inn(" 7707083893 ").unwrap(), "7707083893");
    }

    #[test]
    fn valid_twelve_digit_inn() {
        assert!(validate_inn("500100732259").is_ok());
    }

    #[test]
    fn inn_with_bad_check_digit() {
        let err = validate_inn("7707083894").unwrap_err();
        assert!(err.to_string().contains("check digit"));
        assert!(validate_inn("500100732258").is_err());
    }

    #[test]
    fn inn_with_wrong_length_or_letters() {
        assert!(validate_inn("12345").is_err());
        assert!(validate_inn("77070838AB").is_err());
        assert!(validate_inn("").is_err());
    }

    #[test]
    fn article_is_upper_cased() {
        assert_eq!(normalize_article("ab-12_x").unwrap(), "AB-12_X");
        assert!(normalize_article("ab").is_err());
        assert!(normalize_article("with space").is_err());
    }

    #[test]
    fn plates_normalize_spaces_dashes_and_case() {
        assert_eq!(
            normalize_registration_number("а 123 вс-77").unwrap(),
            "А123ВС77"
        );
        assert_eq!(normalize_registration_number("ab-1234").unwrap(), "AB1234");
        assert!(normalize_registration_number("A1").is_err());
        assert!(normalize_registration_number("A1#23").is_err());
    }

    #[test]
    fn email_is_lower_cased() {
        assert_eq!(
            normalize_email(" Buyer@Example.COM ").unwrap(),
            "buyer@example.com"
        );
        assert!(normalize_email("no-at-sign").is_err());
        assert!(normalize_email("a@b").is_err());
    }

    #[test]
    fn names_and_quantities() {
        assert!(validate_name("Name", "  ").is_err());
        assert!(validate_name("Name", &"x".repeat(MAX_NAME_LENGTH + 1)).is_err());
        assert!(validate_name("Name", "Main warehouse").is_ok());
        assert!(validate_positive_quantity(0).is_err());
        assert!(validate_positive_quantity(3).is_ok());
        assert!(validate_non_negative("Weight", -0.1).is_err());
        assert!(validate_non_negative("Weight", f64::NAN).is_err());
        assert!(validate_non_negative("Weight", 0.0).is_ok());
    }

    #[test]
    fn inventory_numbers() {
        assert!(validate_inventory_number("FL-0001").is_ok());
        assert!(validate_inventory_number(" ").is_err());
    }
}
