//! Validation of request payloads before anything is persisted.

pub mod rules;

pub use validator::Validate;

use crate::error::{ServiceError, ServiceResult};

/// Runs the payload's rules, flattening failures into `field: message` lines.
pub fn validate_payload<T: Validate>(payload: &T) -> ServiceResult<()> {
    payload.validate().map_err(|errors| {
        let mut messages: Vec<String> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |e| match &e.message {
                    Some(message) => format!("{}: {}", field, message),
                    None => format!("{}: {}", field, e.code),
                })
            })
            .collect();
        messages.sort();
        ServiceError::Validation(messages)
    })
}
