//! Command handlers for the caderneta CLI.
//!
//! This module contains implementations for all CLI subcommands.

mod delete;
mod init;
mod insert;
mod list;
mod show;
mod update;

use crate::Result;
use anyhow::bail;
use serde::Serialize;
use std::fmt::Debug;
use tracing::{debug, info};

pub use delete::{delete_goal, delete_tag};
pub use init::init;
pub use insert::{insert_goal, insert_tag, insert_transaction};
pub use list::{list, Listing, TagRow};
pub use show::{show, Dashboard, GoalCard, MonthSummary};
pub use update::{update_goal, update_tag, update_transaction};

/// The output type for a command. This allows the command to return a consistent message and,
/// optionally, structured data to the command line interface.
#[derive(Debug, Clone, Serialize)]
pub struct Out<T>
where
    T: Serialize + Clone + Debug,
{
    /// A message that can be printed to the user regarding the outcome of the command execution.
    message: String,

    /// Any structured data that needs to be output from the call.
    structure: Option<T>,
}

impl<T, S> From<S> for Out<T>
where
    T: Debug + Clone + Serialize,
    S: Into<String>,
{
    fn from(value: S) -> Self {
        Out::new_message(value)
    }
}

impl<T> Out<T>
where
    T: Serialize + Clone + Debug,
{
    /// Create a new `Out` object that has `Some(structure)`.
    pub fn new<S>(message: S, structure: T) -> Self
    where
        S: Into<String>,
    {
        Self {
            message: message.into(),
            structure: Some(structure),
        }
    }

    /// Create a new `Out` object that has `None` for `structure`.
    pub fn new_message<S>(message: S) -> Self
    where
        S: Into<String>,
    {
        Self {
            message: message.into(),
            structure: None,
        }
    }

    /// Get the `message`.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the structured data stored in `structure`.
    pub fn structure(&self) -> Option<&T> {
        self.structure.as_ref()
    }

    /// Print the message to `info!` and the structured data (if it exists) as JSON to `debug!`.
    pub fn print(&self) {
        info!("{}", self.message);
        if let Some(structure) = self.structure() {
            if let Ok(json) = serde_json::to_string_pretty(structure) {
                debug!("Command output:\n\n{json}\n\n");
            }
        }
    }
}

/// Checks that `value` looks like a hex color the charts can use, e.g. `#e8743b` or `#fff`.
pub(super) fn validate_color(value: &str) -> Result<()> {
    let digits = match value.strip_prefix('#') {
        Some(digits) => digits,
        None => bail!("The color must start with '#', got '{value}'"),
    };
    if digits.len() != 6 && digits.len() != 3 {
        bail!("The color must have 3 or 6 hex digits, got '{value}'");
    }
    if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        bail!("The color may only contain hex digits, got '{value}'");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_color() {
        assert!(validate_color("#e8743b").is_ok());
        assert!(validate_color("#fff").is_ok());
        assert!(validate_color("#4BC0C0").is_ok());
        assert!(validate_color("e8743b").is_err());
        assert!(validate_color("#e8743").is_err());
        assert!(validate_color("#gggggg").is_err());
        assert!(validate_color("").is_err());
    }

    #[test]
    fn test_out_from_string() {
        let out: Out<()> = "All done".into();
        assert_eq!("All done", out.message());
        assert!(out.structure().is_none());
    }
}
