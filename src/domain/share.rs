use serde::{Deserialize, Serialize};

/// Access level granted when sharing a list with another user.
/// Write-only from the client's perspective: the backend never returns
/// existing grants to the sharer.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SharePermission {
    View,
    Edit,
}

impl std::fmt::Display for SharePermission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SharePermission::View => write!(f, "view"),
            SharePermission::Edit => write!(f, "edit"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_format() {
        assert_eq!(
            serde_json::to_string(&SharePermission::View).unwrap(),
            "\"view\""
        );
        assert_eq!(
            serde_json::to_string(&SharePermission::Edit).unwrap(),
            "\"edit\""
        );
    }
}
