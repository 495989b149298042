use regex::Regex;
use std::sync::OnceLock;

fn e164_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\+\d{6,15}$").expect("valid E.164 regex"))
}

/// Prefix the default country code unless the number already carries an
/// international `+` prefix. Whitespace is trimmed, nothing else is touched.
pub fn normalize_recipient(mobile: &str, default_country_code: &str) -> String {
    let mobile = mobile.trim();
    if mobile.starts_with('+') {
        mobile.to_string()
    } else {
        format!("{default_country_code}{mobile}")
    }
}

/// Whether a number looks like E.164 (`+` followed by 6 to 15 digits).
pub fn is_e164(phone: &str) -> bool {
    e164_regex().is_match(phone)
}
