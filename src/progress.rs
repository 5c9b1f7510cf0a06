//! Progress reporting for long-running scrape operations
//!
//! The scraper reports detected formats, rate-limit waits, and page counts
//! through a narrow sink interface rather than writing to a terminal
//! directly, so library callers (and tests) can capture the messages.

use std::sync::Mutex;

/// Receives human-readable progress messages from the scraper
pub trait ProgressSink: Send + Sync {
    /// Reports a single progress message
    fn report(&self, message: &str);
}

/// Progress sink that forwards messages to the tracing subscriber
///
/// This is the sink the CLI installs; with the default filter the messages
/// land on stderr alongside the rest of the log output.
#[derive(Debug, Default)]
pub struct LogSink;

impl ProgressSink for LogSink {
    fn report(&self, message: &str) {
        tracing::info!("{}", message);
    }
}

/// Progress sink that discards all messages
#[derive(Debug, Default)]
pub struct NullSink;

impl ProgressSink for NullSink {
    fn report(&self, _message: &str) {}
}

/// Progress sink that records messages in memory
///
/// Intended for tests that assert on what was reported (for example, that a
/// rate-limit wait was announced before sleeping).
#[derive(Debug, Default)]
pub struct CapturingSink {
    messages: Mutex<Vec<String>>,
}

impl CapturingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of every message reported so far
    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }
}

impl ProgressSink for CapturingSink {
    fn report(&self, message: &str) {
        self.messages.lock().unwrap().push(message.to_string());
    }
}
