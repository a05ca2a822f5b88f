use serde::{Deserialize, Serialize};
use std::fmt;

/// Account role. New sign-ups are always `User`; admins come from the seed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    User,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::User => "user",
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A row of `users.json`. `password` holds the bcrypt hash.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Role,
}

impl User {
    pub fn email_matches(&self, email: &str) -> bool {
        self.email.eq_ignore_ascii_case(email.trim())
    }

    pub fn summary(&self) -> UserSummary {
        UserSummary {
            email: self.email.clone(),
            role: self.role,
            name: self.name.clone(),
        }
    }
}

/// User as exposed over the API, without the password hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
    pub email: String,
    pub role: Role,
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), "\"admin\"");
        let role: Role = serde_json::from_str("\"user\"").unwrap();
        assert_eq!(role, Role::User);
    }

    #[test]
    fn email_match_ignores_case_and_whitespace() {
        let user = User {
            name: "Admin".into(),
            email: "Admin@Example.com".into(),
            password: "hash".into(),
            role: Role::Admin,
        };
        assert!(user.email_matches(" admin@example.com "));
        assert!(!user.email_matches("other@example.com"));
    }
}
