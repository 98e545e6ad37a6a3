//! Bootstrap - personalities and the starting roster
//!
//! Handles the setup an arena needs before its schedules start:
//! - Collecting the personalities agents can be admitted with
//! - Expanding the configured roster (or the default one)
//! - Bundling the collaborators every agent shares

use arena_core::{Personality, builtin_personalities};
use arena_ports::{DecisionOracle, ExecutionVenue, MarketFeed, NotificationSink, WalletProvider};
use std::collections::HashMap;
use std::sync::Arc;

use crate::config::{AgentSpec, ArenaConfig, ConfigError};

/// Personalities agents can be admitted with, in declaration order
///
/// Built-ins come first; configured personalities with the same id replace
/// them in place, others are appended.
#[derive(Debug, Clone)]
pub struct PersonalityBook {
    order: Vec<String>,
    by_id: HashMap<String, Arc<Personality>>,
}

impl PersonalityBook {
    /// Only the built-in personalities
    pub fn builtin() -> Self {
        let mut book = Self {
            order: Vec::new(),
            by_id: HashMap::new(),
        };
        for personality in builtin_personalities() {
            book.insert(personality);
        }
        book
    }

    /// Built-ins plus the personalities declared in config
    pub fn from_config(config: &ArenaConfig) -> Result<Self, ConfigError> {
        let mut book = Self::builtin();
        for personality in &config.personalities {
            personality
                .validate()
                .map_err(|source| ConfigError::Personality {
                    id: personality.id.clone(),
                    source,
                })?;
            book.insert(personality.clone());
        }
        Ok(book)
    }

    pub fn insert(&mut self, personality: Personality) {
        if !self.by_id.contains_key(&personality.id) {
            self.order.push(personality.id.clone());
        }
        self.by_id
            .insert(personality.id.clone(), Arc::new(personality));
    }

    pub fn get(&self, id: &str) -> Option<Arc<Personality>> {
        self.by_id.get(id).cloned()
    }

    pub fn ids(&self) -> &[String] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

/// Roster admitted when an arena starts empty
///
/// The configured agents, or one agent per built-in personality on a
/// wallet named after it.
pub fn roster(config: &ArenaConfig) -> Vec<AgentSpec> {
    if !config.agents.is_empty() {
        return config.agents.clone();
    }

    builtin_personalities()
        .into_iter()
        .map(|p| AgentSpec {
            wallet_id: format!("{}-wallet", p.id),
            personality: p.id,
            agent_id: None,
        })
        .collect()
}

/// Collaborators shared by every agent of an arena
#[derive(Clone)]
pub struct Collaborators {
    pub wallets: Arc<dyn WalletProvider>,
    pub oracle: Arc<dyn DecisionOracle>,
    pub venue: Arc<dyn ExecutionVenue>,
    pub market: Option<Arc<dyn MarketFeed>>,
    pub notifier: Arc<dyn NotificationSink>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_book() {
        let book = PersonalityBook::builtin();
        assert_eq!(
            book.ids(),
            &["conservative-carl", "aggressive-anna", "balanced-bob"]
        );
        assert_eq!(book.get("aggressive-anna").unwrap().traits.trade_frequency, 0.8);
        assert!(book.get("nobody").is_none());
    }

    #[test]
    fn test_config_overrides_builtin_in_place() {
        let mut config = ArenaConfig::default();
        let mut carl = builtin_personalities().remove(0);
        carl.traits.trade_frequency = 0.1;
        let mut dan = builtin_personalities().remove(1);
        dan.id = "degen-dan".to_string();
        config.personalities = vec![carl, dan];

        let book = PersonalityBook::from_config(&config).unwrap();
        assert_eq!(book.len(), 4);
        assert_eq!(book.ids()[0], "conservative-carl");
        assert_eq!(book.ids()[3], "degen-dan");
        assert_eq!(
            book.get("conservative-carl").unwrap().traits.trade_frequency,
            0.1
        );
    }

    #[test]
    fn test_invalid_personality_rejected() {
        let mut config = ArenaConfig::default();
        let mut broken = builtin_personalities().remove(0);
        broken.traits.position_size = 0.0;
        config.personalities.push(broken);

        assert!(matches!(
            PersonalityBook::from_config(&config),
            Err(ConfigError::Personality { .. })
        ));
    }

    #[test]
    fn test_default_roster() {
        let specs = roster(&ArenaConfig::default());
        assert_eq!(specs.len(), 3);
        assert_eq!(specs[2].personality, "balanced-bob");
        assert_eq!(specs[2].wallet_id, "balanced-bob-wallet");

        let mut config = ArenaConfig::default();
        config.agents.push(AgentSpec {
            personality: "balanced-bob".to_string(),
            wallet_id: "w".to_string(),
            agent_id: Some("bob-2".to_string()),
        });
        assert_eq!(roster(&config), config.agents);
    }
}
