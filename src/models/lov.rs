use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Category of a catalog entry. The backend only distinguishes produce
/// from everything else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LovType {
    #[serde(rename = "VEGETABLES", alias = "VEGETABLE")]
    Vegetables,
    #[serde(rename = "OTHER", other)]
    Other,
}

impl LovType {
    /// Wire value expected by the POST/PUT form fields.
    pub fn as_str(&self) -> &'static str {
        match self {
            LovType::Vegetables => "VEGETABLES",
            LovType::Other => "OTHER",
        }
    }

    /// Toggle between the two categories (used by the edit form).
    pub fn toggle(&self) -> Self {
        match self {
            LovType::Vegetables => LovType::Other,
            LovType::Other => LovType::Vegetables,
        }
    }
}

impl std::fmt::Display for LovType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A reference catalog ("list of values") entry, e.g. a vegetable type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LovItem {
    pub id: i64,
    pub name: String,
    #[serde(rename = "type")]
    pub item_type: LovType,
    #[serde(default)]
    pub photo: Option<String>,
}

/// Form data for creating or updating a catalog entry.
///
/// `photo` is a local file path; the client uploads it as a multipart
/// file part. An empty photo on update leaves the existing one in place.
#[derive(Debug, Clone, Default)]
pub struct LovItemDraft {
    pub name: String,
    pub item_type: Option<LovType>,
    pub photo: Option<PathBuf>,
}

impl LovItemDraft {
    pub fn from_item(item: &LovItem) -> Self {
        Self {
            name: item.name.clone(),
            item_type: Some(item.item_type),
            photo: None,
        }
    }

    /// Name and type are required by the backend.
    pub fn is_complete(&self) -> bool {
        !self.name.trim().is_empty() && self.item_type.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_lov_item() {
        let json = r#"{"id": 7, "name": "Bayam", "type": "VEGETABLES", "photo": "https://cdn.example.com/bayam.jpg"}"#;
        let item: LovItem = serde_json::from_str(json).unwrap();
        assert_eq!(item.id, 7);
        assert_eq!(item.item_type, LovType::Vegetables);
        assert_eq!(item.photo.as_deref(), Some("https://cdn.example.com/bayam.jpg"));
    }

    #[test]
    fn test_parse_lov_item_singular_alias() {
        // Older rows use the singular spelling
        let json = r#"{"id": 1, "name": "Keranjang", "type": "VEGETABLE"}"#;
        let item: LovItem = serde_json::from_str(json).unwrap();
        assert_eq!(item.item_type, LovType::Vegetables);
        assert!(item.photo.is_none());
    }

    #[test]
    fn test_draft_completeness() {
        let mut draft = LovItemDraft::default();
        assert!(!draft.is_complete());
        draft.name = "  ".to_string();
        draft.item_type = Some(LovType::Other);
        assert!(!draft.is_complete());
        draft.name = "Wortel".to_string();
        assert!(draft.is_complete());
    }
}
