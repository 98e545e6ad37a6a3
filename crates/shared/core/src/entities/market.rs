use crate::values::{Amount, Timestamp};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Overall market mood reported alongside prices
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Bullish,
    Bearish,
    Neutral,
    Volatile,
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Sentiment::Bullish => "bullish",
            Sentiment::Bearish => "bearish",
            Sentiment::Neutral => "neutral",
            Sentiment::Volatile => "volatile",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenQuote {
    pub symbol: String,
    pub price: Amount,
    /// 24h change in percent
    pub change_24h: Amount,
    pub volume_24h: Amount,
}

/// External market view handed to the decision oracle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketSnapshot {
    pub timestamp: Timestamp,
    pub tokens: Vec<TokenQuote>,
    pub sentiment: Sentiment,
}

impl MarketSnapshot {
    pub fn total_volume_24h(&self) -> Amount {
        self.tokens.iter().map(|t| t.volume_24h).sum()
    }

    pub fn quote(&self, symbol: &str) -> Option<&TokenQuote> {
        self.tokens.iter().find(|t| t.symbol == symbol)
    }
}
