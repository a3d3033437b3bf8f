//! Edit-boundary checks for rule input.
//!
//! The store accepts any structurally valid rule; these checks run in the
//! HTTP layer before a create or update reaches it. Messages are the ones
//! shown to the person editing the rule.

use validator::ValidateEmail;

use crate::error::CoreError;
use crate::rules::{Assignee, Condition, ConditionField, RuleInput, RulePatch};

pub const NAME_REQUIRED: &str = "Rule name is required.";
pub const ASSIGNEE_REQUIRED: &str = "Assignee name and email are required.";
pub const ASSIGNEE_EMAIL_INVALID: &str = "Assignee email must be a valid email address.";
pub const CONDITIONS_REQUIRED: &str = "Add at least one condition.";
pub const REQUEST_TYPE_REQUIRED: &str = "Request type is required.";
pub const LOCATION_REQUIRED: &str = "Location is required.";
pub const DELETE_CONFIRMATION_MISMATCH: &str = "Confirmation does not match the rule name.";

/// Validate a full create payload. Expects conditions already pruned.
pub fn validate_rule_input(input: &RuleInput) -> Result<(), CoreError> {
    validate_name(&input.name)?;
    validate_assignee(&input.assignee)?;
    validate_conditions(&input.conditions)
}

/// Validate only the fields present in a patch.
pub fn validate_rule_patch(patch: &RulePatch) -> Result<(), CoreError> {
    if let Some(name) = &patch.name {
        validate_name(name)?;
    }
    if let Some(assignee) = &patch.assignee {
        validate_assignee(assignee)?;
    }
    if let Some(conditions) = &patch.conditions {
        validate_conditions(conditions)?;
    }
    Ok(())
}

/// Gate a destructive delete on the caller retyping the rule name.
///
/// Surrounding whitespace in the confirmation is ignored; everything else
/// must match byte for byte.
pub fn confirm_delete(rule_name: &str, confirmation: &str) -> Result<(), CoreError> {
    if confirmation.trim() == rule_name {
        Ok(())
    } else {
        Err(CoreError::Validation(DELETE_CONFIRMATION_MISMATCH.to_string()))
    }
}

fn validate_name(name: &str) -> Result<(), CoreError> {
    if name.trim().is_empty() {
        return Err(invalid(NAME_REQUIRED));
    }
    Ok(())
}

fn validate_assignee(assignee: &Assignee) -> Result<(), CoreError> {
    if assignee.name.trim().is_empty() || assignee.email.trim().is_empty() {
        return Err(invalid(ASSIGNEE_REQUIRED));
    }
    if !assignee.email.trim().to_string().validate_email() {
        return Err(invalid(ASSIGNEE_EMAIL_INVALID));
    }
    Ok(())
}

fn validate_conditions(conditions: &[Condition]) -> Result<(), CoreError> {
    if conditions.is_empty() {
        return Err(invalid(CONDITIONS_REQUIRED));
    }
    if !has_field(conditions, ConditionField::RequestType) {
        return Err(invalid(REQUEST_TYPE_REQUIRED));
    }
    if !has_field(conditions, ConditionField::Location) {
        return Err(invalid(LOCATION_REQUIRED));
    }
    Ok(())
}

fn has_field(conditions: &[Condition], field: ConditionField) -> bool {
    conditions
        .iter()
        .any(|c| c.field == field && c.value.clone().pruned().is_some())
}

fn invalid(message: &str) -> CoreError {
    CoreError::Validation(message.to_string())
}
