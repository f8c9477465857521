//! Validation utilities for key-agreement operations

use super::{Error, Result};

/// Validate group parameters
pub fn group(condition: bool, context: &'static str) -> Result<()> {
    if !condition {
        return Err(Error::InvalidGroup { context });
    }
    Ok(())
}

/// Validate a received public value
pub fn public_value(condition: bool, context: &'static str) -> Result<()> {
    if !condition {
        return Err(Error::InvalidPublicValue { context });
    }
    Ok(())
}

/// Validate puzzle board integrity
pub fn board(condition: bool, context: &'static str) -> Result<()> {
    if !condition {
        return Err(Error::BoardCorrupt { context });
    }
    Ok(())
}

/// Validate a caller-supplied parameter
pub fn parameter(condition: bool, context: &'static str, message: &str) -> Result<()> {
    if !condition {
        return Err(Error::InvalidParameter {
            context,
            message: message.to_string(),
        });
    }
    Ok(())
}
