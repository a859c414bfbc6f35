use crate::form::FormData;
use thiserror::Error as ThisError;

pub const TOTAL_FORMS: &str = "TOTAL_FORMS";
pub const INITIAL_FORMS: &str = "INITIAL_FORMS";
pub const MAX_NUM_FORMS: &str = "MAX_NUM_FORMS";

///
/// ConstructionError
///
/// A bound formset could not be built from the submitted management data.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum ConstructionError {
    #[error("management form data for '{prefix}' is missing or has been tampered with")]
    MissingManagementData { prefix: String },

    #[error("management field '{key}' has a non-numeric value '{value}'")]
    InvalidManagementData { key: String, value: String },

    #[error("'{prefix}' declares {initial} initial forms but only {total} forms in total")]
    InitialExceedsTotal {
        prefix: String,
        initial: usize,
        total: usize,
    },

    #[error("'{prefix}' declares {initial} initial forms but the source holds {available} items")]
    InitialExceedsSource {
        prefix: String,
        initial: usize,
        available: usize,
    },
}

///
/// ManagementData
///
/// Row counts carried alongside a formset so a submission can be matched
/// back to its rows.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ManagementData {
    pub total: usize,
    pub initial: usize,
    pub max_num: usize,
}

impl ManagementData {
    /// Read the counts submitted under `prefix`.
    pub fn from_data(
        data: &FormData,
        prefix: &str,
        max_num: usize,
    ) -> Result<Self, ConstructionError> {
        let total = read_count(data, prefix, TOTAL_FORMS)?;
        let initial = read_count(data, prefix, INITIAL_FORMS)?;

        if initial > total {
            return Err(ConstructionError::InitialExceedsTotal {
                prefix: prefix.to_string(),
                initial,
                total,
            });
        }

        Ok(Self {
            total,
            initial,
            max_num,
        })
    }

    /// Key/value pairs a renderer emits as hidden inputs.
    #[must_use]
    pub fn to_pairs(&self, prefix: &str) -> Vec<(String, String)> {
        vec![
            (key(prefix, TOTAL_FORMS), self.total.to_string()),
            (key(prefix, INITIAL_FORMS), self.initial.to_string()),
            (key(prefix, MAX_NUM_FORMS), self.max_num.to_string()),
        ]
    }
}

fn key(prefix: &str, name: &str) -> String {
    format!("{prefix}-{name}")
}

fn read_count(data: &FormData, prefix: &str, name: &str) -> Result<usize, ConstructionError> {
    let key = key(prefix, name);
    let raw = data
        .get(&key)
        .ok_or_else(|| ConstructionError::MissingManagementData {
            prefix: prefix.to_string(),
        })?;

    raw.trim()
        .parse()
        .map_err(|_| ConstructionError::InvalidManagementData {
            key,
            value: raw.to_string(),
        })
}

///
/// TESTS
///
