//! Field validation that accumulates every violated rule before failing,
//! so one response reports all bad fields of a payload.

use chrono::NaiveDate;
use uuid::Uuid;

use models::beneficiario;

use crate::errors::{FieldViolation, ServiceError};

pub const REQUIRED: &str = "required";
pub const INVALID_FORMAT: &str = "invalid_format";
pub const INVALID_DATE: &str = "invalid_date";
pub const EXISTS: &str = "exists";

#[derive(Debug, Default)]
pub struct Violations(Vec<FieldViolation>);

impl Violations {
    pub fn new() -> Self { Self::default() }

    pub fn push(&mut self, field: &'static str, rule: &'static str) {
        self.0.push(FieldViolation::new(field, rule));
    }

    pub fn is_empty(&self) -> bool { self.0.is_empty() }

    /// Present and not blank; yields the trimmed value.
    pub fn required_text(&mut self, field: &'static str, value: Option<&str>) -> Option<String> {
        match value.map(str::trim) {
            Some(v) if !v.is_empty() => Some(v.to_string()),
            _ => {
                self.push(field, REQUIRED);
                None
            }
        }
    }

    /// Absent is fine; when present it must not be blank.
    pub fn optional_text(&mut self, field: &'static str, value: Option<&str>) -> Option<String> {
        value.and_then(|v| self.required_text(field, Some(v)))
    }

    pub fn cpf(&mut self, field: &'static str, value: &str) -> Option<String> {
        if beneficiario::is_valid_cpf(value) {
            Some(value.to_string())
        } else {
            self.push(field, INVALID_FORMAT);
            None
        }
    }

    pub fn required_cpf(&mut self, field: &'static str, value: Option<&str>) -> Option<String> {
        match value {
            Some(v) => self.cpf(field, v),
            None => {
                self.push(field, REQUIRED);
                None
            }
        }
    }

    pub fn date(&mut self, field: &'static str, value: &str) -> Option<NaiveDate> {
        let parsed = beneficiario::parse_data_nascimento(value);
        if parsed.is_none() {
            self.push(field, INVALID_DATE);
        }
        parsed
    }

    pub fn required_date(&mut self, field: &'static str, value: Option<&str>) -> Option<NaiveDate> {
        match value {
            Some(v) => self.date(field, v),
            None => {
                self.push(field, REQUIRED);
                None
            }
        }
    }

    pub fn uuid(&mut self, field: &'static str, value: &str) -> Option<Uuid> {
        match Uuid::parse_str(value.trim()) {
            Ok(id) => Some(id),
            Err(_) => {
                self.push(field, INVALID_FORMAT);
                None
            }
        }
    }

    pub fn required_uuid(&mut self, field: &'static str, value: Option<&str>) -> Option<Uuid> {
        match value {
            Some(v) => self.uuid(field, v),
            None => {
                self.push(field, REQUIRED);
                None
            }
        }
    }

    pub fn into_error(self, message: &str) -> ServiceError {
        ServiceError::validation(message, self.0)
    }

    /// `Ok` when nothing was violated.
    pub fn finish(self, message: &str) -> Result<(), ServiceError> {
        if self.is_empty() { Ok(()) } else { Err(self.into_error(message)) }
    }
}
