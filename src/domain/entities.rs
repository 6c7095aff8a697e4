//! Domain entities: the taxonomy wire form

use serde::{Deserialize, Serialize};

/// A taxonomy node as it appears in the persisted JSON form.
///
/// `code` is emitted only when present; an absent or empty `children` array
/// is semantically a leaf. Presentation state (expanded/collapsed) is never
/// part of this form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Taxon {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Taxon>,
}

impl Taxon {
    /// New leaf node without a code.
    pub fn leaf(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            code: None,
            children: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_and_children_are_optional_on_load() {
        let taxon: Taxon = serde_json::from_str(r#"{"name": "Fungi"}"#).unwrap();
        assert_eq!(taxon.name, "Fungi");
        assert!(taxon.code.is_none());
        assert!(taxon.children.is_empty());
    }

    #[test]
    fn test_missing_name_is_rejected() {
        let result: Result<Taxon, _> = serde_json::from_str(r#"{"code": "01"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_leaf_serializes_without_empty_fields() {
        let json = serde_json::to_string(&Taxon::leaf("Animalia")).unwrap();
        assert_eq!(json, r#"{"name":"Animalia"}"#);
    }
}
