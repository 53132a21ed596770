//! Application record models

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Highest application number that can be allocated
pub const MAX_APPLICATION_ID: u32 = 99_999;

/// Prefix of the human-readable application reference
pub const APPLICATION_REF_PREFIX: &str = "FC-";

/// A row of the `applications` table
///
/// A freshly allocated record has every descriptive column NULL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationRecord {
    pub id: i64,
    pub convictions: Option<bool>,
    pub best_practice: Option<bool>,
    pub certificate_number: Option<i64>,
    pub certificate_issued_date: Option<String>,
    pub qualification_held: Option<String>,
    pub qualification_reference: Option<String>,
    pub qualification_obtained_date: Option<String>,
    pub red_experience: Option<i64>,
    pub red_control: Option<i64>,
    pub roe_experience: Option<i64>,
    pub roe_control: Option<i64>,
    pub sika_experience: Option<i64>,
    pub sika_control: Option<i64>,
    pub fallow_experience: Option<i64>,
    pub fallow_control: Option<i64>,
    pub full_name: Option<String>,
    pub address_line1: Option<String>,
    pub address_line2: Option<String>,
    pub address_town: Option<String>,
    pub address_county: Option<String>,
    pub address_postcode: Option<String>,
    pub phone_number: Option<String>,
    pub email_address: Option<String>,
    pub referee_name: Option<String>,
    pub referee_email: Option<String>,
    pub created_at: Option<NaiveDateTime>,
    pub updated_at: Option<NaiveDateTime>,
    pub deleted_at: Option<NaiveDateTime>,
}

impl ApplicationRecord {
    /// A record is assigned once its applicant's name has been filled in
    pub fn is_assigned(&self) -> bool {
        self.full_name.is_some()
    }
}

/// Sparse set of cleaned descriptive fields
///
/// `None` means "absent": the stored column is left untouched. A patch never
/// writes NULL.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub convictions: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub best_practice: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub certificate_number: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub certificate_issued_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub qualification_held: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub qualification_reference: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub qualification_obtained_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub red_experience: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub red_control: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub roe_experience: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub roe_control: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sika_experience: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sika_control: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallow_experience: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallow_control: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address_line1: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address_line2: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address_town: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address_county: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address_postcode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub referee_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub referee_email: Option<String>,
}

/// A single present value of a patch, borrowed for binding into SQL
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnValue<'a> {
    Bool(bool),
    Integer(i64),
    Text(&'a str),
}

impl ApplicationPatch {
    /// Present fields as `(column, value)` pairs, in schema order
    pub fn columns(&self) -> Vec<(&'static str, ColumnValue<'_>)> {
        fn boolean(out: &mut Vec<(&'static str, ColumnValue<'_>)>, name: &'static str, v: Option<bool>) {
            if let Some(v) = v {
                out.push((name, ColumnValue::Bool(v)));
            }
        }
        fn integer(out: &mut Vec<(&'static str, ColumnValue<'_>)>, name: &'static str, v: Option<i64>) {
            if let Some(v) = v {
                out.push((name, ColumnValue::Integer(v)));
            }
        }
        fn text<'a>(out: &mut Vec<(&'static str, ColumnValue<'a>)>, name: &'static str, v: &'a Option<String>) {
            if let Some(v) = v {
                out.push((name, ColumnValue::Text(v)));
            }
        }

        let mut out = Vec::new();
        boolean(&mut out, "convictions", self.convictions);
        boolean(&mut out, "best_practice", self.best_practice);
        integer(&mut out, "certificate_number", self.certificate_number);
        text(&mut out, "certificate_issued_date", &self.certificate_issued_date);
        text(&mut out, "qualification_held", &self.qualification_held);
        text(&mut out, "qualification_reference", &self.qualification_reference);
        text(&mut out, "qualification_obtained_date", &self.qualification_obtained_date);
        integer(&mut out, "red_experience", self.red_experience);
        integer(&mut out, "red_control", self.red_control);
        integer(&mut out, "roe_experience", self.roe_experience);
        integer(&mut out, "roe_control", self.roe_control);
        integer(&mut out, "sika_experience", self.sika_experience);
        integer(&mut out, "sika_control", self.sika_control);
        integer(&mut out, "fallow_experience", self.fallow_experience);
        integer(&mut out, "fallow_control", self.fallow_control);
        text(&mut out, "full_name", &self.full_name);
        text(&mut out, "address_line1", &self.address_line1);
        text(&mut out, "address_line2", &self.address_line2);
        text(&mut out, "address_town", &self.address_town);
        text(&mut out, "address_county", &self.address_county);
        text(&mut out, "address_postcode", &self.address_postcode);
        text(&mut out, "phone_number", &self.phone_number);
        text(&mut out, "email_address", &self.email_address);
        text(&mut out, "referee_name", &self.referee_name);
        text(&mut out, "referee_email", &self.referee_email);
        out
    }

    /// True when the patch would not change any column
    pub fn is_empty(&self) -> bool {
        self.columns().is_empty()
    }
}

/// Response body of a successful fill-in
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilledApplication {
    #[serde(flatten)]
    pub fields: ApplicationPatch,
    pub application_ref: String,
}

/// Human-readable reference for an application number, e.g. `FC-00042`
pub fn application_ref(id: u32) -> String {
    format!("{}{:05}", APPLICATION_REF_PREFIX, id)
}
