// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Type for rule configuration / validation failures.
//! These are only ever raised while compiling or installing a rule, never while processing
//! packets.

use thiserror::Error;

/// The reasons why we may reject a rule configuration
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{target}: Bad value for \"{option}\" option: \"{value}\"")]
    InvalidValue {
        target: &'static str,
        option: &'static str,
        value: String,
    },
    #[error("{target}: \"{option}\" is required.")]
    MissingRequiredParameter {
        target: &'static str,
        option: &'static str,
    },
    #[error("{target}: unknown option \"{option}\"")]
    UnknownOption {
        target: &'static str,
        option: String,
    },
    #[error("{target}: option \"{option}\" requires an argument")]
    MissingValue {
        target: &'static str,
        option: &'static str,
    },
    #[error("bad target size: need at least {expected} octets, got {actual}")]
    BadTargetSize { expected: usize, actual: usize },
}

/// Result-like type for configurations
pub type ConfigResult = Result<(), ConfigError>;
