use serde::{Deserialize, Serialize};

/// Controls how a symbol's dependencies are rendered
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssemblyOptions {
    /// Append proof bodies to dependency signatures
    pub include_bodies: bool,

    /// Keep dependencies defined in the symbol's own file
    pub include_same_file: bool,

    /// Prefix of generated record constructors, stripped before lookup
    pub constructor_prefix: String,
}

impl Default for AssemblyOptions {
    fn default() -> Self {
        Self {
            include_bodies: false,
            include_same_file: true,
            constructor_prefix: "Build_".to_string(),
        }
    }
}

impl AssemblyOptions {
    /// Cross-file dependencies with bodies; the caller supplies the
    /// preceding source of the symbol's own file separately.
    pub fn for_prompt_context() -> Self {
        Self {
            include_bodies: true,
            include_same_file: false,
            ..Self::default()
        }
    }

    /// Every dependency with bodies
    pub fn self_contained() -> Self {
        Self {
            include_bodies: true,
            include_same_file: true,
            ..Self::default()
        }
    }

    /// Validate options
    pub fn validate(&self) -> Result<(), String> {
        if self.constructor_prefix.contains(char::is_whitespace) {
            return Err(format!(
                "constructor_prefix must not contain whitespace, got {:?}",
                self.constructor_prefix
            ));
        }
        Ok(())
    }

    /// `name` without the constructor prefix
    pub fn normalize<'n>(&self, name: &'n str) -> &'n str {
        if self.constructor_prefix.is_empty() {
            return name;
        }
        name.strip_prefix(self.constructor_prefix.as_str())
            .filter(|rest| !rest.is_empty())
            .unwrap_or(name)
    }
}
