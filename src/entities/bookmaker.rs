use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A bookmaker's role in a surebet: the reference-price side or the
/// value-target side (spec GLOSSARY, "Sharp" / "Soft").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Sharp,
    Soft,
}

/// A bookmaker identifier, its role, and (for softs) the chat channel picks
/// targeting it are delivered to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bookmaker {
    pub id: String,
    pub role: Role,
    pub channel_id: Option<String>,
}

impl Bookmaker {
    pub fn sharp(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            role: Role::Sharp,
            channel_id: None,
        }
    }

    pub fn soft(id: impl Into<String>, channel_id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            role: Role::Soft,
            channel_id: Some(channel_id.into()),
        }
    }
}

/// Startup-built lookup from bookmaker id to its role and (for softs) delivery
/// channel (spec §4.8, component C10: "construct bookmakers registry ...").
/// Built once from `Config` and held by the orchestrator; the feed parser
/// keeps its own lighter-weight sharp/soft classification since it only needs
/// the role, not the channel.
#[derive(Debug, Clone, Default)]
pub struct BookmakerRegistry {
    bookmakers: HashMap<String, Bookmaker>,
}

impl BookmakerRegistry {
    pub fn build(
        sharp_bookmakers: &[String],
        target_bookies: &[String],
        bookmaker_channels: &HashMap<String, String>,
    ) -> Self {
        let mut bookmakers = HashMap::new();
        for id in sharp_bookmakers {
            bookmakers.insert(id.clone(), Bookmaker::sharp(id.clone()));
        }
        for id in target_bookies {
            if let Some(channel_id) = bookmaker_channels.get(id) {
                bookmakers.insert(id.clone(), Bookmaker::soft(id.clone(), channel_id.clone()));
            }
        }
        Self { bookmakers }
    }

    pub fn channel_for(&self, bookmaker_id: &str) -> Option<&str> {
        self.bookmakers.get(bookmaker_id)?.channel_id.as_deref()
    }

    pub fn role_of(&self, bookmaker_id: &str) -> Option<Role> {
        self.bookmakers.get(bookmaker_id).map(|b| b.role)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_resolves_channel_for_mapped_target_bookie() {
        let channels = HashMap::from([("softbook".to_string(), "chan-softbook".to_string())]);
        let registry = BookmakerRegistry::build(
            &["pinnacle".to_string()],
            &["softbook".to_string()],
            &channels,
        );
        assert_eq!(registry.channel_for("softbook"), Some("chan-softbook"));
        assert_eq!(registry.role_of("softbook"), Some(Role::Soft));
        assert_eq!(registry.role_of("pinnacle"), Some(Role::Sharp));
    }

    #[test]
    fn unknown_bookmaker_resolves_to_nothing() {
        let registry = BookmakerRegistry::build(&[], &[], &HashMap::new());
        assert_eq!(registry.channel_for("ghost"), None);
        assert_eq!(registry.role_of("ghost"), None);
    }
}
