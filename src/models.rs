use serde::{Deserialize, Serialize};
use std::fmt;

/// Account record held by the quotes API for one Telegram user.
#[derive(Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct User {
    pub id: String,
    pub name: String,
    pub telegram_id: u64,
    pub api_key: String,
}

// The API key is a credential; keep it out of logs.
impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("telegram_id", &self.telegram_id)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct Author {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct Quote {
    pub id: String,
    pub text: String,
    pub created_at: String,
    pub author: Author,
}

/// Body of `POST internal/users/`.
#[derive(Debug, Serialize)]
pub struct NewUser<'a> {
    pub name: &'a str,
    pub telegram_id: u64,
}

/// Body of `PUT internal/users/{telegram_id}`.
#[derive(Debug, Serialize)]
pub struct UserUpdate<'a> {
    pub name: &'a str,
    pub telegram_id: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<&'a str>,
}

/// Body of `POST quotes/`.
#[derive(Debug, Serialize)]
pub struct NewQuote<'a> {
    pub text: &'a str,
}
