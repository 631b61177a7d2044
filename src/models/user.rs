use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: String,
}

impl User {
    /// Build the local mock account for an email address.
    pub fn mock(email: &str) -> Self {
        let name = email.split('@').next().unwrap_or_default().to_string();
        Self {
            id: "user-123".to_string(),
            email: email.to_string(),
            name,
        }
    }
}
