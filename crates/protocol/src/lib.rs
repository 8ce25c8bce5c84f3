use anyhow::Result;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

pub const PROTOCOL_SCHEMA_VERSION: u32 = 1;

/// One statement of a source file, as emitted by the external statement scanner.
///
/// A record either carries source text (a definition signature or any other
/// vernacular line) or a notation, never both.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq, JsonSchema)]
pub struct StatementRecord {
    /// Name of the symbol this statement defines
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,

    /// Signature for definitions, raw source otherwise
    #[serde(default)]
    pub text: String,

    /// Proof body following the signature
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,

    /// Identifiers referenced by the statement, qualified or not
    #[serde(default)]
    pub references: BTreeSet<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notation: Option<String>,
}

impl StatementRecord {
    /// Statement defining `symbol` with the given signature
    pub fn definition(symbol: impl Into<String>, signature: impl Into<String>) -> Self {
        Self {
            symbol: Some(symbol.into()),
            text: signature.into(),
            ..Self::default()
        }
    }

    /// Statement that defines nothing (imports, hints, tactics...)
    pub fn source(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn notation(notation: impl Into<String>) -> Self {
        Self {
            notation: Some(notation.into()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    #[must_use]
    pub fn with_references<I, S>(mut self, references: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.references
            .extend(references.into_iter().map(Into::into));
        self
    }

    /// Defined symbol name, ignoring empty names
    pub fn symbol_name(&self) -> Option<&str> {
        self.symbol.as_deref().filter(|s| !s.is_empty())
    }

    /// Proof body, ignoring empty bodies
    pub fn body_text(&self) -> Option<&str> {
        self.body.as_deref().filter(|b| !b.trim().is_empty())
    }

    pub fn notation_text(&self) -> Option<&str> {
        self.notation.as_deref().filter(|n| !n.is_empty())
    }
}

/// Per-symbol context handed to downstream consumers
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, JsonSchema)]
pub struct ContextObject {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    pub name: String,

    /// Owning file, `./`-prefixed and relative to the project root
    pub file: String,

    pub signature: String,

    /// Empty for statements without a proof
    #[serde(default)]
    pub body: String,

    /// Source text of the owning file preceding this symbol's proof
    #[serde(default)]
    pub context_snapshot: String,

    /// Rendered dependencies, ordered and de-duplicated; never includes the symbol itself
    #[serde(default)]
    pub dependencies: Vec<String>,

    /// Notations required by the symbol's file and every dependency's file
    #[serde(default)]
    pub notations: BTreeSet<String>,
}

impl Default for ContextObject {
    fn default() -> Self {
        Self {
            schema_version: PROTOCOL_SCHEMA_VERSION,
            name: String::new(),
            file: String::new(),
            signature: String::new(),
            body: String::new(),
            context_snapshot: String::new(),
            dependencies: Vec::new(),
            notations: BTreeSet::new(),
        }
    }
}

fn default_schema_version() -> u32 {
    PROTOCOL_SCHEMA_VERSION
}

impl ContextObject {
    pub fn is_proof(&self) -> bool {
        !self.body.is_empty()
    }
}

pub fn serialize_json<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string(value).map_err(Into::into)
}

/// Parse a JSON array of statement records
pub fn parse_statements(json: &str) -> Result<Vec<StatementRecord>> {
    serde_json::from_str(json).map_err(Into::into)
}
