pub mod fields;
pub mod types;

pub use fields::{field_index, field_spec, FieldKind, FieldSpec, CANONICAL_FIELDS};
pub use types::{AccountId, AccountParseError, ApplicantRecord, FieldValue, RecordError};

/// Split a `FIELD=VALUE` command-line assignment.
///
/// Only the first `=` separates; the value may itself contain `=` or be empty.
pub fn parse_assignment(s: &str) -> Result<(String, String), RecordError> {
    match s.split_once('=') {
        Some((name, value)) if !name.trim().is_empty() => {
            Ok((name.trim().to_string(), value.to_string()))
        }
        _ => Err(RecordError::InvalidAssignment(s.to_string())),
    }
}

/// Apply a sequence of `FIELD=VALUE` edits in order, stopping at the first bad one.
///
/// The record is only replaced when every edit succeeds.
pub fn apply_assignments(record: &mut ApplicantRecord, assignments: &[String]) -> Result<(), RecordError> {
    let mut edited = record.clone();
    for assignment in assignments {
        let (name, value) = parse_assignment(assignment)?;
        edited.set(&name, &value)?;
    }
    *record = edited;
    Ok(())
}
