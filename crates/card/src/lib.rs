//! Status cards for CI pipeline steps.
//!
//! A card is a small JSON summary the CI host shows next to the step log.
//! It is written either to a file or, when the target is a standard stream,
//! inline as a base64 payload wrapped in a terminal escape sequence.
//!
//! # Usage
//!
//! ```no_run
//! use card::{Card, CardEmitter};
//!
//! let emitter = CardEmitter::for_path("/dev/stdout");
//!
//! emitter.emit(&Card {
//!     pipeline: "deploy".to_string(),
//!     project: "TEST".to_string(),
//!     ..Card::default()
//! })?;
//! # Ok::<(), card::CardError>(())
//! ```
//!
//! # Targets
//!
//! - empty path: cards disabled
//! - `/dev/stdout`, `/dev/stderr`: rendered inline
//! - anything else: written as a JSON file

#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod card;
pub mod error;
pub mod sinks;

pub use card::{Card, CardInput, CARD_SCHEMA};
pub use error::CardError;
pub use sinks::{sink_for_path, CardSink};

use tracing::{debug, info};

/// Writes cards to the configured sink.
pub struct CardEmitter {
    sink: Option<Box<dyn CardSink>>,
}

impl CardEmitter {
    /// Create an emitter targeting a specific path.
    #[must_use]
    pub fn for_path(path: &str) -> Self {
        let sink = sink_for_path(path);
        if sink.is_none() {
            debug!("No card path configured, cards disabled");
        }
        Self { sink }
    }

    /// Create an emitter with a specific sink.
    #[must_use]
    pub fn with_sink(sink: Box<dyn CardSink>) -> Self {
        Self { sink: Some(sink) }
    }

    /// Create a disabled emitter.
    #[must_use]
    pub const fn disabled() -> Self {
        Self { sink: None }
    }

    /// Check if a sink is configured.
    #[must_use]
    pub const fn enabled(&self) -> bool {
        self.sink.is_some()
    }

    /// Serialize and write a card. Does nothing when disabled.
    pub fn emit(&self, card: &Card) -> Result<(), CardError> {
        let Some(sink) = &self.sink else {
            debug!("Cards disabled, skipping");
            return Ok(());
        };

        let payload = CardInput::new(card).to_json()?;
        sink.write(&payload)?;
        info!(sink = sink.name(), "Status card written");
        Ok(())
    }
}
