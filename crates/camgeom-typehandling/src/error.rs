use crate::KeyKind;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum HeteroMapError {
    #[error("expected a key of type {expected}, got {found}")]
    KeyType {
        expected: KeyKind,
        found: &'static str,
    },
    #[error("{found} cannot be stored in a HeteroMap")]
    ValueType { found: String },
    #[error("key not found: {0}")]
    KeyNotFound(String),
    #[error("map is empty")]
    Empty,
}
