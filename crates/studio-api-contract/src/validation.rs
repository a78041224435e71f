//! Client-side identifier validation
//!
//! Task ids and subproblem ids are checked locally before any request is
//! issued; a violation never reaches the server.

use std::sync::OnceLock;

use regex::Regex;

use crate::error::ContractError;

/// Pattern shared by task ids and subproblem ids
pub const IDENTIFIER_PATTERN: &str = "^[a-zA-Z0-9_-]+$";

fn identifier_regex() -> &'static Regex {
    static IDENTIFIER: OnceLock<Regex> = OnceLock::new();
    IDENTIFIER.get_or_init(|| Regex::new(IDENTIFIER_PATTERN).expect("identifier pattern is valid"))
}

/// Check a candidate subproblem id
pub fn validate_problem_id(id: &str) -> Result<(), ContractError> {
    if identifier_regex().is_match(id) {
        Ok(())
    } else {
        Err(ContractError::InvalidIdentifier(
            "Problem id should only contain alphanumeric characters (in addition to \"_\" and \"-\").".to_string(),
        ))
    }
}

/// Check a candidate task id
pub fn validate_task_id(id: &str) -> Result<(), ContractError> {
    if identifier_regex().is_match(id) {
        Ok(())
    } else {
        Err(ContractError::InvalidIdentifier(
            "Task id should only contain alphanumeric characters (in addition to \"_\" and \"-\").".to_string(),
        ))
    }
}
