use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;

/// Ordered class-name table, index = class id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassNames {
    names: Vec<String>,
}

impl ClassNames {
    pub fn new(names: Vec<String>) -> Self {
        Self { names }
    }

    /// One name per line; lines are trimmed and blank lines dropped before
    /// indexing.
    pub fn parse(content: &str) -> Self {
        let names = content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect();
        Self { names }
    }

    /// Load a class-name file. A missing file is not an error and yields `None`.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Option<Self>> {
        let path = path.as_ref();
        if !path.is_file() {
            debug!("No class-name file at {}, using numeric labels", path.display());
            return Ok(None);
        }
        let content = fs::read_to_string(path)?;
        Ok(Some(Self::parse(&content)))
    }

    pub fn get(&self, class_id: u32) -> Option<&str> {
        self.names.get(class_id as usize).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Resolved name, or the stringified id when there is no table or the id
    /// is out of range.
    pub fn label_for(class_names: Option<&Self>, class_id: u32) -> String {
        class_names
            .and_then(|names| names.get(class_id))
            .map(str::to_string)
            .unwrap_or_else(|| class_id.to_string())
    }

    /// Like [`ClassNames::label_for`] with spaces replaced by underscores,
    /// for use in file names.
    pub fn safe_name(class_names: Option<&Self>, class_id: u32) -> String {
        Self::label_for(class_names, class_id).replace(' ', "_")
    }
}
