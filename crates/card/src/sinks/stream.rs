//! Inline card rendering over stdout/stderr.
//!
//! The CI host scans its log stream for `ESC]1338;` and decodes the base64
//! payload up to `ESC]0m` as a card.

use std::io::{self, Write};

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use tracing::debug;

use super::CardSink;
use crate::error::CardError;

const ESCAPE_OPEN: &[u8] = b"\x1b]1338;";
const ESCAPE_CLOSE: &[u8] = b"\x1b]0m\n";

/// Standard stream a card is rendered to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stream {
    Stdout,
    Stderr,
}

impl Stream {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Stdout => "stdout",
            Self::Stderr => "stderr",
        }
    }
}

/// Wrap a serialized card in the terminal escape sequence.
#[must_use]
pub fn encode_escape(payload: &[u8]) -> Vec<u8> {
    let encoded = STANDARD.encode(payload);
    let mut out = Vec::with_capacity(ESCAPE_OPEN.len() + encoded.len() + ESCAPE_CLOSE.len());
    out.extend_from_slice(ESCAPE_OPEN);
    out.extend_from_slice(encoded.as_bytes());
    out.extend_from_slice(ESCAPE_CLOSE);
    out
}

/// Sink writing escaped cards to a standard stream.
pub struct StreamSink {
    stream: Stream,
}

impl StreamSink {
    #[must_use]
    pub const fn new(stream: Stream) -> Self {
        Self { stream }
    }

    /// Write an escaped card to an arbitrary writer.
    pub fn write_to<W: Write>(&self, out: &mut W, payload: &[u8]) -> io::Result<()> {
        out.write_all(&encode_escape(payload))?;
        out.flush()
    }
}

impl CardSink for StreamSink {
    fn name(&self) -> &'static str {
        self.stream.as_str()
    }

    fn write(&self, payload: &[u8]) -> Result<(), CardError> {
        let result = match self.stream {
            Stream::Stdout => self.write_to(&mut io::stdout().lock(), payload),
            Stream::Stderr => self.write_to(&mut io::stderr().lock(), payload),
        };
        result.map_err(|source| CardError::Stream {
            stream: self.stream.as_str(),
            source,
        })?;
        debug!(stream = self.stream.as_str(), "Card rendered inline");
        Ok(())
    }
}
