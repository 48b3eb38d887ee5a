// Shared test helpers for mock servers and blocking calls.
//
// The connector is synchronous, so every call into it runs on a blocking
// thread while the wiremock server keeps serving on the async runtime.

#![allow(dead_code)] // Not every test file uses every helper

use std::sync::Mutex;
use std::time::Duration;

use http_requests::{RequestBuilder, RequestDefaults};

/// Runs a blocking closure off the async runtime and returns its result.
pub async fn blocking<T, F>(f: F) -> T
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .expect("blocking task panicked")
}

/// Builder with compiled-in defaults and short timeouts, ignoring the environment.
pub fn builder(url: impl Into<String>) -> RequestBuilder {
    RequestBuilder::with_defaults(
        url,
        RequestDefaults {
            connect_timeout: Duration::from_secs(5),
            read_timeout: Duration::from_secs(5),
            ..RequestDefaults::default()
        },
    )
}

/// Logger that keeps formatted records in memory.
#[derive(Default)]
pub struct CapturingLogger {
    records: Mutex<Vec<(log::Level, String)>>,
}

impl CapturingLogger {
    pub fn records(&self) -> Vec<(log::Level, String)> {
        self.records.lock().expect("logger lock").clone()
    }
}

impl log::Log for CapturingLogger {
    fn enabled(&self, _metadata: &log::Metadata) -> bool {
        true
    }

    fn log(&self, record: &log::Record) {
        self.records
            .lock()
            .expect("logger lock")
            .push((record.level(), record.args().to_string()));
    }

    fn flush(&self) {}
}
