use serde::{Deserialize, Deserializer, Serialize};

/// Account profile as returned by the auth endpoint and cached in the session store
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Server-assigned user ID
    pub id: i64,
    pub username: String,
    pub email: String,
    /// In-game nickname; empty strings are read as absent
    #[serde(default, deserialize_with = "deserialize_nick")]
    pub minecraft_nick: Option<String>,
}

impl User {
    pub fn new(id: i64, username: &str, email: &str, minecraft_nick: Option<&str>) -> Self {
        Self {
            id,
            username: username.to_string(),
            email: email.to_string(),
            minecraft_nick: normalize_nick(minecraft_nick.map(str::to_string)),
        }
    }

    /// Nickname when set, otherwise the username
    pub fn display_name(&self) -> &str {
        self.minecraft_nick.as_deref().unwrap_or(&self.username)
    }
}

pub fn normalize_nick(nick: Option<String>) -> Option<String> {
    nick.map(|n| n.trim().to_string()).filter(|n| !n.is_empty())
}

pub fn deserialize_nick<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(normalize_nick)
}
