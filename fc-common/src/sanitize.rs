//! Field sanitizer for application fill-in requests
//!
//! Turns raw client-submitted JSON values into cleaned scalars. A value that
//! fails its check is dropped (becomes `None`) rather than rejecting the whole
//! request, so the record is saved with that field left untouched.
//!
//! Only applied to fill-in requests, never to allocation.

use chrono::{DateTime, Datelike, NaiveDate};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::db::models::ApplicationPatch;

/// Raw fill-in request body
///
/// Every field is kept as an untyped JSON value so that type mismatches are
/// dropped per field instead of failing deserialization of the whole body.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawApplication {
    pub convictions: Option<Value>,
    pub best_practice: Option<Value>,
    pub certificate_number: Option<Value>,
    pub certificate_issued_date: Option<Value>,
    pub qualification_held: Option<Value>,
    pub qualification_reference: Option<Value>,
    pub qualification_obtained_date: Option<Value>,
    pub red_experience: Option<Value>,
    pub red_control: Option<Value>,
    pub roe_experience: Option<Value>,
    pub roe_control: Option<Value>,
    pub sika_experience: Option<Value>,
    pub sika_control: Option<Value>,
    pub fallow_experience: Option<Value>,
    pub fallow_control: Option<Value>,
    pub full_name: Option<Value>,
    pub address_line1: Option<Value>,
    pub address_line2: Option<Value>,
    pub address_town: Option<Value>,
    pub address_county: Option<Value>,
    pub address_postcode: Option<Value>,
    pub phone_number: Option<Value>,
    pub email_address: Option<Value>,
    pub referee_name: Option<Value>,
    pub referee_email: Option<Value>,
}

/// Parse a strictly digits-only, non-negative integer
///
/// Rejects signs, decimal points, whitespace and anything else that is not
/// an ASCII digit, as well as values that overflow `i64`.
pub fn clean_integer(raw: &str) -> Option<i64> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    raw.parse::<i64>().ok()
}

pub fn clean_day(day: u32) -> Option<u32> {
    (1..=31).contains(&day).then_some(day)
}

pub fn clean_month(month: u32) -> Option<u32> {
    (1..=12).contains(&month).then_some(month)
}

pub fn clean_year(year: i32) -> Option<i32> {
    (1000..=9999).contains(&year).then_some(year)
}

/// Validate a calendar date string
///
/// Accepts `YYYY-MM-DD` or an RFC 3339 timestamp. The parsed date is split
/// into day, month and year, each component is range-checked, and the date
/// rebuilt from the checked components must equal the parsed one. Returns
/// the raw string unchanged when valid.
pub fn clean_date(raw: &str) -> Option<String> {
    let parsed = parse_calendar_date(raw)?;

    let day = clean_day(parsed.day())?;
    let month = clean_month(parsed.month())?;
    let year = clean_year(parsed.year())?;

    let rebuilt = NaiveDate::from_ymd_opt(year, month, day)?;
    if rebuilt != parsed {
        return None;
    }

    Some(raw.to_string())
}

fn parse_calendar_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.date_naive()))
}

/// Trim surrounding whitespace; blank strings are dropped
pub fn clean_string(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Trimmed string that also has the shape `local@domain.tld`
pub fn clean_email(raw: &str) -> Option<String> {
    clean_string(raw).filter(|s| is_email_shaped(s))
}

fn is_email_shaped(candidate: &str) -> bool {
    if candidate.chars().any(char::is_whitespace) {
        return false;
    }

    let Some((local, domain)) = candidate.split_once('@') else {
        return false;
    };

    !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && domain.split('.').all(|label| !label.is_empty())
}

fn integer_value(value: &Value) -> Option<i64> {
    match value {
        Value::String(s) => clean_integer(s),
        // Judged by textual form so that -1 and 1.5 are rejected like strings
        Value::Number(n) => clean_integer(&n.to_string()),
        _ => None,
    }
}

fn date_value(value: &Value) -> Option<String> {
    value.as_str().and_then(clean_date)
}

fn string_value(value: &Value) -> Option<String> {
    value.as_str().and_then(clean_string)
}

fn email_value(value: &Value) -> Option<String> {
    value.as_str().and_then(clean_email)
}

fn bool_value(value: &Value) -> Option<bool> {
    value.as_bool()
}

/// Clean one raw field, logging when a supplied value is dropped
fn field<T>(name: &'static str, raw: &Option<Value>, clean: fn(&Value) -> Option<T>) -> Option<T> {
    let value = raw.as_ref().filter(|v| !v.is_null())?;
    let cleaned = clean(value);
    if cleaned.is_none() {
        debug!(field = name, "Dropping invalid field value");
    }
    cleaned
}

/// Run every field of a raw fill-in body through its cleaner
pub fn sanitize(raw: &RawApplication) -> ApplicationPatch {
    ApplicationPatch {
        convictions: field("convictions", &raw.convictions, bool_value),
        best_practice: field("bestPractice", &raw.best_practice, bool_value),
        certificate_number: field("certificateNumber", &raw.certificate_number, integer_value),
        certificate_issued_date: field(
            "certificateIssuedDate",
            &raw.certificate_issued_date,
            date_value,
        ),
        qualification_held: field("qualificationHeld", &raw.qualification_held, string_value),
        qualification_reference: field(
            "qualificationReference",
            &raw.qualification_reference,
            string_value,
        ),
        qualification_obtained_date: field(
            "qualificationObtainedDate",
            &raw.qualification_obtained_date,
            date_value,
        ),
        red_experience: field("redExperience", &raw.red_experience, integer_value),
        red_control: field("redControl", &raw.red_control, integer_value),
        roe_experience: field("roeExperience", &raw.roe_experience, integer_value),
        roe_control: field("roeControl", &raw.roe_control, integer_value),
        sika_experience: field("sikaExperience", &raw.sika_experience, integer_value),
        sika_control: field("sikaControl", &raw.sika_control, integer_value),
        fallow_experience: field("fallowExperience", &raw.fallow_experience, integer_value),
        fallow_control: field("fallowControl", &raw.fallow_control, integer_value),
        full_name: field("fullName", &raw.full_name, string_value),
        address_line1: field("addressLine1", &raw.address_line1, string_value),
        address_line2: field("addressLine2", &raw.address_line2, string_value),
        address_town: field("addressTown", &raw.address_town, string_value),
        address_county: field("addressCounty", &raw.address_county, string_value),
        address_postcode: field("addressPostcode", &raw.address_postcode, string_value),
        phone_number: field("phoneNumber", &raw.phone_number, string_value),
        email_address: field("emailAddress", &raw.email_address, email_value),
        referee_name: field("refereeName", &raw.referee_name, string_value),
        referee_email: field("refereeEmail", &raw.referee_email, email_value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(body: Value) -> RawApplication {
        serde_json::from_value(body).expect("Should deserialize raw body")
    }

    #[test]
    fn test_clean_integer_accepts_digits() {
        assert_eq!(clean_integer("007"), Some(7));
        assert_eq!(clean_integer("0"), Some(0));
        assert_eq!(clean_integer("12345"), Some(12345));
    }

    #[test]
    fn test_clean_integer_rejects_non_digits() {
        for input in ["", "  ", "-1", "+1", "1.5", "1e3", " 7", "7 ", "12a", "0x10", "١٢"] {
            assert_eq!(clean_integer(input), None, "input {:?} should be rejected", input);
        }
    }

    #[test]
    fn test_clean_integer_rejects_overflow() {
        assert_eq!(clean_integer("99999999999999999999999"), None);
    }

    #[test]
    fn test_component_ranges() {
        assert_eq!(clean_day(0), None);
        assert_eq!(clean_day(1), Some(1));
        assert_eq!(clean_day(31), Some(31));
        assert_eq!(clean_day(32), None);

        assert_eq!(clean_month(0), None);
        assert_eq!(clean_month(12), Some(12));
        assert_eq!(clean_month(13), None);

        assert_eq!(clean_year(999), None);
        assert_eq!(clean_year(1000), Some(1000));
        assert_eq!(clean_year(9999), Some(9999));
        assert_eq!(clean_year(10000), None);
    }

    #[test]
    fn test_clean_date_valid_returns_original() {
        assert_eq!(clean_date("2023-02-28"), Some("2023-02-28".to_string()));
        assert_eq!(clean_date("2024-02-29"), Some("2024-02-29".to_string()));
        assert_eq!(
            clean_date("2023-06-01T00:00:00Z"),
            Some("2023-06-01T00:00:00Z".to_string())
        );
    }

    #[test]
    fn test_clean_date_rejects_overflowing_dates() {
        assert_eq!(clean_date("2023-02-30"), None);
        assert_eq!(clean_date("2023-02-29"), None);
        assert_eq!(clean_date("2023-04-31"), None);
        assert_eq!(clean_date("2023-01-32"), None);
        assert_eq!(clean_date("2023-13-01"), None);
    }

    #[test]
    fn test_clean_date_rejects_garbage_and_out_of_range_years() {
        assert_eq!(clean_date(""), None);
        assert_eq!(clean_date("yesterday"), None);
        assert_eq!(clean_date("0999-01-01"), None);
        assert_eq!(clean_date("28/02/2023"), None);
    }

    #[test]
    fn test_clean_string_trims_and_drops_blank() {
        assert_eq!(clean_string("  Jane Doe  "), Some("Jane Doe".to_string()));
        assert_eq!(clean_string("Jane"), Some("Jane".to_string()));
        assert_eq!(clean_string("   "), None);
        assert_eq!(clean_string(""), None);
    }

    #[test]
    fn test_clean_email() {
        assert_eq!(
            clean_email(" jane@example.org "),
            Some("jane@example.org".to_string())
        );
        assert_eq!(clean_email("jane@example"), None);
        assert_eq!(clean_email("@example.org"), None);
        assert_eq!(clean_email("jane@@example.org"), None);
        assert_eq!(clean_email("jane doe@example.org"), None);
        assert_eq!(clean_email("jane@example..org"), None);
    }

    #[test]
    fn test_sanitize_full_body() {
        let patch = sanitize(&raw(json!({
            "convictions": false,
            "bestPractice": true,
            "certificateNumber": "123456",
            "certificateIssuedDate": "2020-05-01",
            "qualificationHeld": " DSC Level 1 ",
            "qualificationReference": "REF-1",
            "qualificationObtainedDate": "2019-11-30",
            "redExperience": "5",
            "redControl": 3,
            "roeExperience": "0",
            "fullName": "  Jane Doe  ",
            "addressLine1": "1 High Street",
            "addressTown": "Inverness",
            "addressPostcode": "IV1 1AA",
            "phoneNumber": "01234 567890",
            "emailAddress": "jane@example.org",
            "refereeName": "John Smith",
            "refereeEmail": "john@example.org"
        })));

        assert_eq!(patch.convictions, Some(false));
        assert_eq!(patch.best_practice, Some(true));
        assert_eq!(patch.certificate_number, Some(123456));
        assert_eq!(patch.certificate_issued_date.as_deref(), Some("2020-05-01"));
        assert_eq!(patch.qualification_held.as_deref(), Some("DSC Level 1"));
        assert_eq!(patch.qualification_obtained_date.as_deref(), Some("2019-11-30"));
        assert_eq!(patch.red_experience, Some(5));
        assert_eq!(patch.red_control, Some(3));
        assert_eq!(patch.roe_experience, Some(0));
        assert_eq!(patch.roe_control, None);
        assert_eq!(patch.full_name.as_deref(), Some("Jane Doe"));
        assert_eq!(patch.address_line2, None);
        assert_eq!(patch.referee_email.as_deref(), Some("john@example.org"));
    }

    #[test]
    fn test_sanitize_drops_invalid_fields_individually() {
        let patch = sanitize(&raw(json!({
            "convictions": "yes",
            "certificateNumber": "12-34",
            "redExperience": -1,
            "redControl": 1.5,
            "fullName": "   ",
            "addressTown": 42,
            "emailAddress": "not-an-email",
            "phoneNumber": null,
            "addressPostcode": "AB1 2CD"
        })));

        assert_eq!(patch.convictions, None);
        assert_eq!(patch.certificate_number, None);
        assert_eq!(patch.red_experience, None);
        assert_eq!(patch.red_control, None);
        assert_eq!(patch.full_name, None);
        assert_eq!(patch.address_town, None);
        assert_eq!(patch.email_address, None);
        assert_eq!(patch.phone_number, None);
        assert_eq!(patch.address_postcode.as_deref(), Some("AB1 2CD"));
    }

    #[test]
    fn test_each_date_field_is_checked_against_itself() {
        // A valid certificate date must not vouch for an invalid qualification date
        let patch = sanitize(&raw(json!({
            "certificateIssuedDate": "2020-01-31",
            "qualificationObtainedDate": "2020-02-31"
        })));
        assert_eq!(patch.certificate_issued_date.as_deref(), Some("2020-01-31"));
        assert_eq!(patch.qualification_obtained_date, None);

        let patch = sanitize(&raw(json!({
            "certificateIssuedDate": "2020-02-31",
            "qualificationObtainedDate": "2020-01-31"
        })));
        assert_eq!(patch.certificate_issued_date, None);
        assert_eq!(patch.qualification_obtained_date.as_deref(), Some("2020-01-31"));
    }

    #[test]
    fn test_sanitize_is_fixed_point_on_clean_input() {
        let first = sanitize(&raw(json!({
            "convictions": true,
            "certificateNumber": "007",
            "certificateIssuedDate": "2021-03-04",
            "sikaControl": "12",
            "fullName": " Jane Doe ",
            "addressCounty": "Highland",
            "emailAddress": "jane@example.org"
        })));

        let reencoded = serde_json::to_value(&first).unwrap();
        let second = sanitize(&raw(reencoded));
        assert_eq!(first, second);
    }

    #[test]
    fn test_unknown_fields_are_ignored() {
        let patch = sanitize(&raw(json!({
            "id": 5,
            "applicationRef": "FC-00005",
            "fullName": "Jane"
        })));
        assert_eq!(patch.full_name.as_deref(), Some("Jane"));
    }
}
