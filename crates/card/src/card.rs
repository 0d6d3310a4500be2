//! Status card record and its envelope.

use serde::Serialize;

use crate::error::CardError;

/// Schema URL identifying the Jira status card layout.
pub const CARD_SCHEMA: &str = "https://drone.github.io/drone-jira/card.json";

/// Summary of a reporting run, rendered by the CI host as a card.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Card {
    pub pipeline: String,
    pub instance: String,
    pub project: String,
    pub state: String,
    pub version: String,
    pub environment: String,
    /// Browse links for every reported issue
    #[serde(rename = "url")]
    pub urls: Vec<String>,
}

/// Envelope handed to the CI host: the schema plus the card data.
#[derive(Debug, Serialize)]
pub struct CardInput<'a> {
    pub schema: &'static str,
    pub data: &'a Card,
}

impl<'a> CardInput<'a> {
    #[must_use]
    pub const fn new(data: &'a Card) -> Self {
        Self {
            schema: CARD_SCHEMA,
            data,
        }
    }

    /// Compact JSON encoding of the envelope.
    pub fn to_json(&self) -> Result<Vec<u8>, CardError> {
        Ok(serde_json::to_vec(self)?)
    }
}
