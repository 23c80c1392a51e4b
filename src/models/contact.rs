//! Contact-field helpers backing the `phone_valid` / `email_valid` flags.
//!
//! These define what "passed validation" means for the two boolean columns.
//! Records arrive from external portals with placeholder junk ("N/A", empty
//! strings, line-wrapped addresses), so cleaning happens at the value level
//! before anything is persisted.

use std::sync::OnceLock;

use regex::Regex;

/// Maximum stored length for the free-text industry description.
const INDUSTRY_MAX_CHARS: usize = 300;

fn phone_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(\+91)?[6-9][0-9]{9}$").expect("phone regex"))
}

fn email_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").expect("email regex")
    })
}

/// Whether a phone number is a usable Indian mobile number.
///
/// Accepts an optional `+91` prefix followed by ten digits starting 6-9.
/// Placeholder values ("N/A", empty) are invalid.
pub fn is_valid_phone(phone: &str) -> bool {
    let phone = phone.trim();
    if phone.is_empty() || phone == "N/A" {
        return false;
    }
    phone_re().is_match(phone)
}

/// Whether an email address looks deliverable.
pub fn is_valid_email(email: &str) -> bool {
    let email = email.trim();
    if email.is_empty() || email == "N/A" {
        return false;
    }
    email_re().is_match(email)
}

/// Normalize a postal address: strip line breaks, collapse runs of
/// whitespace. Returns `None` for placeholder or empty input.
pub fn clean_address(address: &str) -> Option<String> {
    let address = address.trim();
    if address.is_empty() || address == "N/A" {
        return None;
    }
    let mut cleaned = String::with_capacity(address.len());
    let mut last_was_space = false;
    for ch in address.chars() {
        if ch.is_whitespace() {
            if !last_was_space {
                cleaned.push(' ');
                last_was_space = true;
            }
        } else {
            cleaned.push(ch);
            last_was_space = false;
        }
    }
    let cleaned = cleaned.trim().to_string();
    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned)
    }
}

/// Cap the industry description at the column limit.
pub fn truncate_industry(industry: &str) -> Option<String> {
    let industry = industry.trim();
    if industry.is_empty() || industry == "N/A" {
        return None;
    }
    Some(industry.chars().take(INDUSTRY_MAX_CHARS).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phone_validity() {
        assert!(is_valid_phone("9845012345"));
        assert!(is_valid_phone("+919845012345"));
        assert!(is_valid_phone(" 9845012345 "));

        assert!(!is_valid_phone("5845012345")); // leading 5 is not a mobile range
        assert!(!is_valid_phone("984501234")); // nine digits
        assert!(!is_valid_phone("98450123456")); // eleven digits
        assert!(!is_valid_phone("N/A"));
        assert!(!is_valid_phone(""));
        assert!(!is_valid_phone("080-2345678")); // landline format
    }

    #[test]
    fn test_email_validity() {
        assert!(is_valid_email("owner@example.com"));
        assert!(is_valid_email("a.b+c@sub.example.co.in"));

        assert!(!is_valid_email("N/A"));
        assert!(!is_valid_email(""));
        assert!(!is_valid_email("not-an-email"));
        assert!(!is_valid_email("missing@tld"));
    }

    #[test]
    fn test_clean_address() {
        assert_eq!(
            clean_address("No. 12,\nIndustrial Layout,\r\n  Phase II").as_deref(),
            Some("No. 12, Industrial Layout, Phase II")
        );
        assert_eq!(clean_address("  plain address  ").as_deref(), Some("plain address"));
        assert_eq!(clean_address("N/A"), None);
        assert_eq!(clean_address("   "), None);
    }

    #[test]
    fn test_truncate_industry() {
        let long = "x".repeat(400);
        assert_eq!(truncate_industry(&long).unwrap().chars().count(), 300);
        assert_eq!(truncate_industry("Garments"), Some("Garments".to_string()));
        assert_eq!(truncate_industry("N/A"), None);
    }
}
