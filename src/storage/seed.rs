//! Seed collections loaded at store initialisation.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{CrmError, CrmResult, ValidationError};
use crate::model::{Company, Contact, Deal, Task};

/// Initial contents of the four collections.
///
/// Records are complete (ids and timestamps included). Any collection may be
/// omitted from the JSON and defaults to empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SeedData {
    pub contacts: Vec<Contact>,
    pub companies: Vec<Company>,
    pub deals: Vec<Deal>,
    pub tasks: Vec<Task>,
}

impl SeedData {
    /// Parse seed data from a JSON document.
    ///
    /// # Errors
    ///
    /// Returns `MalformedSeed` if the document does not match.
    pub fn from_json_str(json: &str) -> Result<Self, ValidationError> {
        serde_json::from_str(json).map_err(|e| ValidationError::MalformedSeed {
            reason: e.to_string(),
        })
    }

    /// Read and parse a seed file.
    ///
    /// # Errors
    ///
    /// Returns `Internal` if the file cannot be read and `InvalidArgument`
    /// if its contents are malformed.
    pub fn from_file(path: impl AsRef<Path>) -> CrmResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| CrmError::internal(format!("failed to read seed file {}: {e}", path.display())))?;
        Ok(Self::from_json_str(&raw)?)
    }

    /// Total records across all collections.
    #[must_use]
    pub fn len(&self) -> usize {
        self.contacts.len() + self.companies.len() + self.deals.len() + self.tasks.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
