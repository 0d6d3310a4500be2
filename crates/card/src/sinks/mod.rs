//! Card output sinks.

pub mod file;
pub mod stream;

use std::path::Path;

use crate::error::CardError;

pub use file::FileSink;
pub use stream::{encode_escape, Stream, StreamSink};

/// Trait for card destinations (file, terminal stream).
pub trait CardSink: Send + Sync {
    /// Get the name of this sink.
    fn name(&self) -> &'static str;

    /// Write the serialized card envelope.
    fn write(&self, payload: &[u8]) -> Result<(), CardError>;
}

/// Pick the sink for a card path.
///
/// `/dev/stdout` and `/dev/stderr` render inline through the terminal host;
/// any other non-empty path is a plain file. An empty path disables output.
#[must_use]
pub fn sink_for_path(path: &str) -> Option<Box<dyn CardSink>> {
    match path {
        "" => None,
        "/dev/stdout" => Some(Box::new(StreamSink::new(Stream::Stdout))),
        "/dev/stderr" => Some(Box::new(StreamSink::new(Stream::Stderr))),
        other => Some(Box::new(FileSink::new(Path::new(other)))),
    }
}
