pub mod routes;

use serde::Serialize;

use crate::error::FlagError;
use crate::flags::{validate_flag_name, Flag};

// MODELS

#[derive(Debug, Serialize)]
pub struct FlagListResponse {
    pub flags: Vec<Flag>,
}

#[derive(Debug, Serialize)]
pub struct DeleteFlagResponse {
    pub deleted: String,
}

// HELPER FUNCTIONS

// Names come from a wildcard path capture, so a '/' reaches us here
pub fn checked_name(name: &str) -> Result<&str, FlagError> {
    validate_flag_name(name).map_err(FlagError::InvalidName)?;
    Ok(name)
}
