// Command templates - per-host variable substitution

use std::collections::BTreeMap;

/// Variable name for the target host, injected per host by the dispatcher.
pub const HOST_NAME: &str = "hostName";
/// Variable name for the remote user id.
pub const HOST_USER_ID: &str = "hostUserId";
/// Variable name for the SSH private key path.
pub const SSH_PRIVATE_KEY: &str = "sshPrivateKey";
/// Variable name for the remote root directory.
pub const ROOT_DIRECTORY: &str = "rootDirectory";
/// Variable name for the remote home directory.
pub const HOME_DIRECTORY: &str = "homeDirectory";
/// Variable name for the local source directory.
pub const SOURCE_DIRECTORY: &str = "sourceDirectory";

/// A set of named values substituted for `${name}` placeholders in a
/// command template. Built fresh per host; the dispatcher injects
/// [`HOST_NAME`] before resolving.
#[derive(Debug, Clone, Default)]
pub struct VariableSet {
    vars: BTreeMap<String, String>,
}

impl VariableSet {
    pub fn new() -> Self {
        VariableSet::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(name, value);
        self
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.vars.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars.get(name).map(String::as_str)
    }

    /// Replace every `${name}` occurrence for each variable in the set.
    ///
    /// Plain substring replacement: values are not re-scanned for nested
    /// placeholders, and substitution order does not matter. A placeholder
    /// with no matching variable is left untouched.
    pub fn resolve(&self, template: &str) -> String {
        let mut resolved = template.to_string();
        for (name, value) in &self.vars {
            resolved = resolved.replace(&format!("${{{name}}}"), value);
        }
        resolved
    }
}
