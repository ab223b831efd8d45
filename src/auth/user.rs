//! # User Model
//!
//! The public view of an account and the request types that create or
//! authenticate one.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::fixtures::Row;

/// Account as exposed in sessions and `get_user`.
///
/// The stored password never leaves the users table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    pub display_name: String,
}

impl User {
    /// Build from a users-table row; `None` when `id` or `email` is missing
    pub fn from_row(row: &Row) -> Option<Self> {
        let id = row.get("id").and_then(Value::as_str)?;
        let email = row.get("email").and_then(Value::as_str)?;
        let display_name = row
            .get("display_name")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| default_display_name(email));

        Some(Self {
            id: id.to_string(),
            email: email.to_string(),
            display_name,
        })
    }

    /// Users-table row for this account
    pub(crate) fn to_row(&self, password: &str) -> Row {
        let mut row = Row::new();
        row.insert("id".to_string(), Value::String(self.id.clone()));
        row.insert("email".to_string(), Value::String(self.email.clone()));
        row.insert("password".to_string(), Value::String(password.to_string()));
        row.insert(
            "display_name".to_string(),
            Value::String(self.display_name.clone()),
        );
        row
    }

    /// Profiles-table row so the account can appear in embedded selects
    pub(crate) fn to_profile_row(&self) -> Row {
        let mut row = Row::new();
        row.insert("id".to_string(), Value::String(self.id.clone()));
        row.insert(
            "username".to_string(),
            Value::String(self.display_name.clone()),
        );
        row.insert("role".to_string(), Value::String("user".to_string()));
        row
    }
}

/// The part of an email before `@`
pub fn default_display_name(email: &str) -> String {
    email.split('@').next().unwrap_or(email).to_string()
}

/// Email/password sign-in request
#[derive(Debug, Clone, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

/// Sign-up request
#[derive(Debug, Clone, Deserialize)]
pub struct SignUpRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub display_name: Option<String>,
}

impl SignUpRequest {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
            display_name: None,
        }
    }

    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = Some(display_name.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::into_row;
    use serde_json::json;

    #[test]
    fn test_from_row() {
        let row = into_row(json!({
            "id": "1",
            "email": "a@example.com",
            "password": "secret",
            "display_name": "Ann"
        }))
        .unwrap();

        let user = User::from_row(&row).unwrap();
        assert_eq!(user.id, "1");
        assert_eq!(user.display_name, "Ann");
    }

    #[test]
    fn test_from_row_defaults_display_name() {
        let row = into_row(json!({"id": "1", "email": "ann@example.com"})).unwrap();
        assert_eq!(User::from_row(&row).unwrap().display_name, "ann");
    }

    #[test]
    fn test_from_row_requires_identity() {
        let row = into_row(json!({"email": "ann@example.com"})).unwrap();
        assert!(User::from_row(&row).is_none());
    }

    #[test]
    fn test_password_not_serialized() {
        let user = User {
            id: "1".into(),
            email: "a@example.com".into(),
            display_name: "a".into(),
        };
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("password").is_none());

        let row = user.to_row("pw");
        assert_eq!(row["password"], json!("pw"));
        assert_eq!(User::from_row(&row).unwrap(), user);
    }

    #[test]
    fn test_default_display_name() {
        assert_eq!(default_display_name("zhangsan@example.com"), "zhangsan");
        assert_eq!(default_display_name("no-at-sign"), "no-at-sign");
    }

    #[test]
    fn test_sign_up_request_deserialize() {
        let req: SignUpRequest =
            serde_json::from_value(json!({"email": "a@b.c", "password": "p"})).unwrap();
        assert!(req.display_name.is_none());
    }
}
