use regex::Regex;
use std::sync::LazyLock;

// ============================================================================
// Compiled Field Patterns
// ============================================================================

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("static pattern must compile")
}

pub static ORDER_NUMBER: LazyLock<Regex> = LazyLock::new(|| compile(r"^[0-9]{4}-[0-9]{6}$"));

pub static CURRENCY_CODE: LazyLock<Regex> = LazyLock::new(|| compile(r"^[A-Z]{3}$"));

/// SKUs and barcodes
pub static CATALOG_CODE: LazyLock<Regex> = LazyLock::new(|| compile(r"^[A-Za-z0-9_-]+$"));

/// `12 x 4.5 x 3`
pub static DIMENSIONS: LazyLock<Regex> =
    LazyLock::new(|| compile(r"^[0-9]+(\.[0-9]+)?\s*[xX]\s*[0-9]+(\.[0-9]+)?\s*[xX]\s*[0-9]+(\.[0-9]+)?$"));

pub static CATEGORY_NAME: LazyLock<Regex> = LazyLock::new(|| compile(r"^[\p{L}\p{N} _/-]+$"));

pub static PATH_SEGMENT: LazyLock<Regex> = LazyLock::new(|| compile(r"^[A-Za-z0-9_-]+$"));

pub static HTTP_URL: LazyLock<Regex> = LazyLock::new(|| compile(r"^https?://[^\s/$.?#][^\s]*$"));

pub static IMAGE_URL: LazyLock<Regex> =
    LazyLock::new(|| compile(r"(?i)^https?://[^\s/$.?#][^\s]*\.(jpg|jpeg|png|gif|webp|svg)$"));

pub static CUSTOMER_CODE: LazyLock<Regex> = LazyLock::new(|| compile(r"^[A-Z0-9_-]+$"));

pub static PAYMENT_TERMS: LazyLock<Regex> = LazyLock::new(|| compile(r"^NET[0-9]+$"));

pub static EMAIL: LazyLock<Regex> =
    LazyLock::new(|| compile(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$"));

pub static PHONE: LazyLock<Regex> = LazyLock::new(|| compile(r"^\+?[0-9(][0-9\s().-]{5,19}$"));

pub static WEBSITE: LazyLock<Regex> =
    LazyLock::new(|| compile(r"^(https?://)?([A-Za-z0-9-]+\.)+[A-Za-z]{2,}(/\S*)?$"));

pub static US_POSTAL_CODE: LazyLock<Regex> = LazyLock::new(|| compile(r"^[0-9]{5}(-[0-9]{4})?$"));

pub static CA_POSTAL_CODE: LazyLock<Regex> =
    LazyLock::new(|| compile(r"(?i)^[A-Z][0-9][A-Z] ?[0-9][A-Z][0-9]$"));

pub static GB_POSTCODE: LazyLock<Regex> =
    LazyLock::new(|| compile(r"(?i)^[A-Z]{1,2}[0-9][A-Z0-9]? ?[0-9][A-Z]{2}$"));

pub static GENERIC_POSTAL_CODE: LazyLock<Regex> =
    LazyLock::new(|| compile(r"^[A-Za-z0-9 -]{3,20}$"));

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_number() {
        assert!(ORDER_NUMBER.is_match("2024-000123"));
        assert!(!ORDER_NUMBER.is_match("24-000123"));
        assert!(!ORDER_NUMBER.is_match("2024-00012"));
        assert!(!ORDER_NUMBER.is_match("2024-0001234"));
    }

    #[test]
    fn test_numeric_patterns_are_ascii_only() {
        assert!(US_POSTAL_CODE.is_match("10001-1234"));
        assert!(!US_POSTAL_CODE.is_match("\u{661}\u{662}\u{663}\u{664}\u{665}"));
        assert!(!ORDER_NUMBER.is_match("2024-\u{966}\u{966}\u{966}\u{967}\u{968}\u{969}"));
        assert!(!DIMENSIONS.is_match("\u{661}0 x 5 x 2"));
        assert!(!CA_POSTAL_CODE.is_match("M\u{665}V 3L9"));
    }

    #[test]
    fn test_dimensions() {
        assert!(DIMENSIONS.is_match("10 x 5 x 2"));
        assert!(DIMENSIONS.is_match("10.5x5.25x2"));
        assert!(!DIMENSIONS.is_match("10 x 5"));
        assert!(!DIMENSIONS.is_match("ten x 5 x 2"));
    }

    #[test]
    fn test_image_url() {
        assert!(IMAGE_URL.is_match("https://cdn.example.com/a/b.PNG"));
        assert!(IMAGE_URL.is_match("http://example.com/logo.svg"));
        assert!(!IMAGE_URL.is_match("https://example.com/file.pdf"));
        assert!(!IMAGE_URL.is_match("ftp://example.com/logo.png"));
    }

    #[test]
    fn test_contact_patterns() {
        assert!(EMAIL.is_match("jane.doe+orders@example.co.uk"));
        assert!(!EMAIL.is_match("jane@"));
        assert!(PHONE.is_match("+1 (555) 123-4567"));
        assert!(!PHONE.is_match("12"));
        assert!(WEBSITE.is_match("https://www.example.com/about"));
        assert!(WEBSITE.is_match("example.org"));
        assert!(!WEBSITE.is_match("not a site"));
    }

    #[test]
    fn test_codes() {
        assert!(CUSTOMER_CODE.is_match("CUST-001_A"));
        assert!(!CUSTOMER_CODE.is_match("cust-001"));
        assert!(PAYMENT_TERMS.is_match("NET30"));
        assert!(!PAYMENT_TERMS.is_match("NET"));
        assert!(!PAYMENT_TERMS.is_match("net30"));
        assert!(CATALOG_CODE.is_match("SKU-01_a"));
        assert!(!CATALOG_CODE.is_match("SKU 01"));
    }
}
