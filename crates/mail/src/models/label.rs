//! Label model representing a Gmail label/folder

use serde::{Deserialize, Serialize};

/// Unique identifier for a label (Gmail label ID)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LabelId(pub String);

impl LabelId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    // Well-known Gmail system label
    pub const INBOX: &'static str = "INBOX";

    // Inbox categories
    pub const CATEGORY_PROMOTIONS: &'static str = "CATEGORY_PROMOTIONS";
    pub const CATEGORY_UPDATES: &'static str = "CATEGORY_UPDATES";
    pub const CATEGORY_FORUMS: &'static str = "CATEGORY_FORUMS";
}

impl From<String> for LabelId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for LabelId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl std::fmt::Display for LabelId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Who owns a label
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LabelKind {
    /// Created by Gmail (INBOX, CATEGORY_*, ...)
    System,
    /// Created by the user
    #[default]
    User,
}

/// A mail label (folder), as returned by the labels listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    /// Label ID (e.g., "INBOX", "Label_123")
    pub id: LabelId,
    /// Display name
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: LabelKind,
}

impl Label {
    /// Create a new user label
    pub fn new(id: impl Into<LabelId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind: LabelKind::User,
        }
    }

    /// Create a system label
    pub fn system(id: impl Into<LabelId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind: LabelKind::System,
        }
    }

    /// Case-insensitive exact comparison against a label name
    pub fn name_matches(&self, name: &str) -> bool {
        self.name.to_lowercase() == name.to_lowercase()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_gmail_label() {
        let json = r#"{"id":"CATEGORY_PROMOTIONS","name":"CATEGORY_PROMOTIONS","type":"system","messageListVisibility":"hide"}"#;
        let label: Label = serde_json::from_str(json).unwrap();
        assert_eq!(label.id.as_str(), LabelId::CATEGORY_PROMOTIONS);
        assert_eq!(label.kind, LabelKind::System);
    }

    #[test]
    fn test_missing_type_defaults_to_user() {
        let label: Label = serde_json::from_str(r#"{"id":"Label_7","name":"Receipts"}"#).unwrap();
        assert_eq!(label, Label::new("Label_7", "Receipts"));
    }

    #[test]
    fn test_name_matches_ignores_case() {
        let label = Label::new("Label_1", "Newsletters");
        assert!(label.name_matches("NEWSLETTERS"));
        assert!(label.name_matches("newsletters"));
        assert!(!label.name_matches("Newsletter"));
    }

    #[test]
    fn test_name_matches_non_ascii() {
        let label = Label::new("Label_2", "Ärende");
        assert!(label.name_matches("ärende"));
    }
}
