use serde::{Deserialize, Serialize};

/// An authenticated account as the backend returns it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub username: String,
}

/// Partial-update payload for `PUT /user`. Only the fields that are set
/// are serialized, so untouched fields keep their server-side values.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct UserUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

impl UserUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none() && self.username.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_update_serializes_only_set_fields() {
        let update = UserUpdate {
            name: Some("Alice".to_string()),
            ..Default::default()
        };
        let json = serde_json::to_value(&update).unwrap();
        assert_eq!(json, serde_json::json!({"name": "Alice"}));
    }

    #[test]
    fn test_user_update_empty() {
        assert!(UserUpdate::default().is_empty());
        let update = UserUpdate {
            email: Some("a@b.c".to_string()),
            ..Default::default()
        };
        assert!(!update.is_empty());
    }
}
