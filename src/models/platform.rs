use serde::{Deserialize, Serialize};

/// Platforms leads can be sourced from.
#[derive(
    strum_macros::Display, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PlatformId {
    Github,
    Reddit,
    Devto,
    Hackernews,
    Producthunt,
}

impl PlatformId {
    pub const ALL: [PlatformId; 5] = [
        PlatformId::Github,
        PlatformId::Reddit,
        PlatformId::Devto,
        PlatformId::Hackernews,
        PlatformId::Producthunt,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            PlatformId::Github => "github",
            PlatformId::Reddit => "reddit",
            PlatformId::Devto => "devto",
            PlatformId::Hackernews => "hackernews",
            PlatformId::Producthunt => "producthunt",
        }
    }

    /// Case-insensitive lookup by configuration key. Unknown keys yield `None`.
    pub fn from_key(key: &str) -> Option<PlatformId> {
        let key = key.trim().to_lowercase();
        Self::ALL.into_iter().find(|platform| platform.key() == key)
    }
}
