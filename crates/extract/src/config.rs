use serde::{Deserialize, Serialize};

/// Configuration for the extraction pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractConfig {
    /// Leading keywords of declarations whose fields resolve to the
    /// declaration itself
    pub class_keywords: Vec<String>,

    /// Root modules of the standard library; never used as require aliases
    pub stdlib_prefixes: Vec<String>,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            class_keywords: vec!["Class".to_string(), "Instance".to_string()],
            stdlib_prefixes: vec!["Coq".to_string()],
        }
    }
}

impl ExtractConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if let Some(keyword) = self
            .class_keywords
            .iter()
            .find(|k| k.is_empty() || k.contains(char::is_whitespace))
        {
            return Err(format!("class keyword must be a single word, got {keyword:?}"));
        }

        if self.stdlib_prefixes.iter().any(|p| p.is_empty()) {
            return Err("stdlib prefixes must not be empty".to_string());
        }

        Ok(())
    }

    /// Whether `text` declares a class or instance
    pub fn is_class_declaration(&self, text: &str) -> bool {
        let text = text.trim_start();
        self.class_keywords.iter().any(|keyword| {
            text.strip_prefix(keyword.as_str())
                .is_some_and(|rest| rest.starts_with(char::is_whitespace))
        })
    }

    /// Whether the dotted `module` lives in the standard library
    pub fn is_stdlib(&self, module: &str) -> bool {
        let root = module.split('.').next().unwrap_or_default();
        self.stdlib_prefixes.iter().any(|prefix| prefix == root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_class_declarations() {
        let config = ExtractConfig::default();
        assert!(config.is_class_declaration("Class Monoid (A : Type) := {"));
        assert!(config.is_class_declaration("Instance Monoid_nat : Monoid nat := {"));
        assert!(!config.is_class_declaration("Classical_Prop_lemma : True."));
        assert!(!config.is_class_declaration("Definition x := 1."));
    }

    #[test]
    fn test_stdlib_prefix() {
        let config = ExtractConfig::default();
        assert!(config.is_stdlib("Coq.Lists.List"));
        assert!(!config.is_stdlib("Data.Tuple"));
        assert!(!config.is_stdlib("Coquelicot.Rbar"));
    }

    #[test]
    fn test_validation() {
        assert!(ExtractConfig::default().validate().is_ok());
        let config = ExtractConfig {
            class_keywords: vec!["Global Instance".to_string()],
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
