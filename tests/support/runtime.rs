//! Tokio runtime hosting the Wiremock server for blocking-client tests.
//!
//! The client under test is synchronous, so it runs on the test thread while
//! the mock server is served by the runtime's worker threads.

use tokio::runtime::Runtime;
use wiremock::{Mock, MockServer};

/// A running mock server and the runtime that drives it.
pub struct MockGitHub {
    runtime: Runtime,
    server: MockServer,
}

impl MockGitHub {
    /// Starts a mock server on a fresh multi-threaded runtime.
    ///
    /// # Panics
    ///
    /// Panics if the runtime cannot be created.
    pub fn start() -> Self {
        let runtime =
            Runtime::new().unwrap_or_else(|error| panic!("failed to create runtime: {error}"));
        let server = runtime.block_on(MockServer::start());
        Self { runtime, server }
    }

    /// Base URL of the mock server, usable as `--api-base`.
    pub fn uri(&self) -> String {
        self.server.uri()
    }

    /// Registers `mock` on the server.
    pub fn mount(&self, mock: Mock) {
        self.runtime.block_on(mock.mount(&self.server));
    }

    /// Checks every `expect` declared on mounted mocks.
    pub fn verify(&self) {
        self.runtime.block_on(self.server.verify());
    }
}
