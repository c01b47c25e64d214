//! Shared validation helpers for inbound HTTP adapters.
//!
//! Failures become 400 responses whose `details` object names the offending
//! field and a machine-readable code.

use chrono::{DateTime, Utc};
use serde_json::json;
use uuid::Uuid;

use crate::domain::stage::{Priority, Stage};
use crate::domain::Error;

/// Validation error codes for HTTP request failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorCode {
    MissingField,
    InvalidUuid,
    InvalidTimestamp,
    InvalidStage,
    InvalidPriority,
}

impl ErrorCode {
    fn as_str(self) -> &'static str {
        match self {
            ErrorCode::MissingField => "missing_field",
            ErrorCode::InvalidUuid => "invalid_uuid",
            ErrorCode::InvalidTimestamp => "invalid_timestamp",
            ErrorCode::InvalidStage => "invalid_stage",
            ErrorCode::InvalidPriority => "invalid_priority",
        }
    }
}

/// Newtype wrapper for HTTP field names to provide type safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    fn as_str(&self) -> &str {
        self.0
    }
}

fn field_error(field: FieldName, message: String, code: ErrorCode) -> Error {
    Error::invalid_request(message).with_details(json!({
        "field": field.as_str(),
        "code": code.as_str(),
    }))
}

fn value_error(field: FieldName, message: String, code: ErrorCode, value: &str) -> Error {
    Error::invalid_request(message).with_details(json!({
        "field": field.as_str(),
        "value": value,
        "code": code.as_str(),
    }))
}

pub(crate) fn missing_field_error(field: FieldName) -> Error {
    let name = field.as_str();
    field_error(
        field,
        format!("missing required field: {name}"),
        ErrorCode::MissingField,
    )
}

pub(crate) fn parse_uuid(value: &str, field: FieldName) -> Result<Uuid, Error> {
    Uuid::parse_str(value).map_err(|_| {
        let name = field.as_str();
        value_error(
            field,
            format!("{name} must be a valid UUID"),
            ErrorCode::InvalidUuid,
            value,
        )
    })
}

pub(crate) fn parse_stage(value: &str, field: FieldName) -> Result<Stage, Error> {
    value.parse().map_err(|_| {
        let name = field.as_str();
        value_error(
            field,
            format!("{name} must be one of: ideas, throw, trim, bisque, glaze, finished"),
            ErrorCode::InvalidStage,
            value,
        )
    })
}

pub(crate) fn parse_priority(value: &str, field: FieldName) -> Result<Priority, Error> {
    value.parse().map_err(|_| {
        let name = field.as_str();
        value_error(
            field,
            format!("{name} must be one of: high, medium, low"),
            ErrorCode::InvalidPriority,
            value,
        )
    })
}

pub(crate) fn parse_rfc3339_timestamp(
    value: &str,
    field: FieldName,
) -> Result<DateTime<Utc>, Error> {
    DateTime::parse_from_rfc3339(value)
        .map(|timestamp| timestamp.with_timezone(&Utc))
        .map_err(|_| {
            let name = field.as_str();
            value_error(
                field,
                format!("{name} must be an RFC 3339 timestamp"),
                ErrorCode::InvalidTimestamp,
                value,
            )
        })
}

pub(crate) fn parse_optional_rfc3339_timestamp(
    value: Option<&str>,
    field: FieldName,
) -> Result<Option<DateTime<Utc>>, Error> {
    value
        .map(|raw| parse_rfc3339_timestamp(raw, field))
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn details(error: &Error) -> serde_json::Value {
        error.details().cloned().expect("details present")
    }

    #[rstest]
    fn missing_field_names_the_field() {
        let error = missing_field_error(FieldName::new("ownerId"));
        let details = details(&error);
        assert_eq!(details["field"], "ownerId");
        assert_eq!(details["code"], "missing_field");
    }

    #[rstest]
    fn bad_uuid_carries_the_value() {
        let error = parse_uuid("not-a-uuid", FieldName::new("id")).expect_err("invalid");
        let details = details(&error);
        assert_eq!(details["value"], "not-a-uuid");
        assert_eq!(details["code"], "invalid_uuid");
    }

    #[rstest]
    #[case("ideas", Stage::Ideas)]
    #[case("finished", Stage::Finished)]
    fn stage_names_parse(#[case] raw: &str, #[case] expected: Stage) {
        assert_eq!(
            parse_stage(raw, FieldName::new("stage")).expect("valid"),
            expected
        );
    }

    #[rstest]
    fn unknown_stage_is_invalid_stage() {
        let error = parse_stage("firing", FieldName::new("stage")).expect_err("invalid");
        assert_eq!(details(&error)["code"], "invalid_stage");
    }

    #[rstest]
    fn unknown_priority_is_invalid_priority() {
        let error = parse_priority("urgent", FieldName::new("priority")).expect_err("invalid");
        assert_eq!(details(&error)["code"], "invalid_priority");
    }

    #[rstest]
    fn timestamps_must_be_rfc3339() {
        parse_rfc3339_timestamp("2026-03-01T12:00:00Z", FieldName::new("dueDate"))
            .expect("valid timestamp");
        let error = parse_rfc3339_timestamp("next tuesday", FieldName::new("dueDate"))
            .expect_err("invalid");
        assert_eq!(details(&error)["code"], "invalid_timestamp");
    }

    #[rstest]
    fn optional_timestamp_passes_none_through() {
        assert_eq!(
            parse_optional_rfc3339_timestamp(None, FieldName::new("dueDate")).expect("none"),
            None
        );
    }
}
