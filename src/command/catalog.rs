// Command catalog - named command templates loaded from YAML

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;

use crate::output::errors::DroverError;

/// A store of command templates keyed by id.
///
/// The catalog file is a flat YAML mapping:
///
/// ```yaml
/// ping: ssh ${hostUserId}@${hostName} true
/// disk-usage: ssh ${hostUserId}@${hostName} df -h ${rootDirectory}
/// ```
#[derive(Debug, Default, Deserialize)]
#[serde(transparent)]
pub struct CommandCatalog {
    commands: BTreeMap<String, String>,
}

impl CommandCatalog {
    /// Load a catalog from a YAML file.
    pub fn load(path: &Path) -> Result<Self, DroverError> {
        let content = std::fs::read_to_string(path).map_err(|e| DroverError::Catalog {
            message: format!("failed to read command catalog {}: {}", path.display(), e),
        })?;

        Self::parse(&content)
    }

    /// Parse a catalog from a YAML string.
    pub fn parse(content: &str) -> Result<Self, DroverError> {
        serde_yaml::from_str(content).map_err(|e| DroverError::Catalog {
            message: format!("invalid command catalog: {e}"),
        })
    }

    /// Look up the template for a command id.
    pub fn lookup(&self, id: &str) -> Result<&str, DroverError> {
        self.commands
            .get(id)
            .map(String::as_str)
            .ok_or_else(|| DroverError::Catalog {
                message: format!("unknown command id '{id}'"),
            })
    }

    /// Command ids in the catalog, in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.commands.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }
}
