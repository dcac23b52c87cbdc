//! Index engine selection
//!
//! The execution service can back a table with one of several access
//! methods. `-` is the console's "nothing picked" value.

use serde_json::Value;
use std::str::FromStr;

use crate::error::ValidationError;

/// Index engine the execution service should use
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    strum::EnumString,
    strum::IntoStaticStr,
    strum::EnumIter,
)]
pub enum IndexSelector {
    #[default]
    #[strum(serialize = "-")]
    Unselected,
    #[strum(serialize = "bplustree")]
    BPlusTree,
    #[strum(serialize = "seqfile")]
    SeqFile,
    #[strum(serialize = "exthashing")]
    ExtHashing,
    #[strum(serialize = "isam")]
    Isam,
}

impl IndexSelector {
    /// Wire value sent as `idx`
    pub fn as_str(&self) -> &'static str {
        self.into()
    }

    pub fn is_selected(&self) -> bool {
        !matches!(self, Self::Unselected)
    }

    /// Human-friendly engine name
    pub fn label(&self) -> &'static str {
        match self {
            Self::Unselected => "none",
            Self::BPlusTree => "B+ tree",
            Self::SeqFile => "sequential file",
            Self::ExtHashing => "extendible hashing",
            Self::Isam => "ISAM",
        }
    }

    /// All selectors in menu order
    pub fn all() -> impl Iterator<Item = IndexSelector> {
        <Self as strum::IntoEnumIterator>::iter()
    }
}

impl std::fmt::Display for IndexSelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What to do with a selector string outside the known set
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SelectorPolicy {
    /// Treat it as `-` and carry on
    #[default]
    Permissive,
    /// Refuse to dispatch
    Strict,
}

impl SelectorPolicy {
    pub fn from_strict(strict: bool) -> Self {
        if strict { Self::Strict } else { Self::Permissive }
    }

    /// Resolve user input into a known selector.
    ///
    /// Input is matched case-insensitively after trimming. An empty
    /// string is never a valid selector.
    pub fn resolve(&self, raw: &str) -> Result<IndexSelector, ValidationError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::InvalidIndexType);
        }

        match IndexSelector::from_str(&trimmed.to_ascii_lowercase()) {
            Ok(selector) => Ok(selector),
            Err(_) => match self {
                Self::Permissive => {
                    tracing::warn!(selector = trimmed, "unknown index engine, dispatching without one");
                    Ok(IndexSelector::Unselected)
                }
                Self::Strict => Err(ValidationError::UnknownIndex),
            },
        }
    }

    /// Resolve a selector that arrived as arbitrary JSON
    pub fn resolve_value(&self, raw: &Value) -> Result<IndexSelector, ValidationError> {
        match raw {
            Value::String(s) => self.resolve(s),
            _ => Err(ValidationError::InvalidIndexType),
        }
    }
}
