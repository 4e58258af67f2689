//! Common test utilities: tracing setup and a shared trie value type.
//!
//! # Usage
//!
//! ```rust,ignore
//! mod common;
//!
//! #[test]
//! fn my_test() {
//!     common::init_tracing();
//!     let pages = common::pages(&[5, 9, 20, 21]);
//!     // ...
//! }
//! ```
//!
//! Set `RUST_LOG` to adjust verbosity (e.g. `pctrie=trace`). Library-side
//! events only appear when the crate is built with `--features tracing`.

#![allow(dead_code)]

use std::sync::Once;

use pctrie::TrieValue;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

/// Ensures tracing is only initialized once across all tests.
static INIT: Once = Once::new();

/// Initialize a console tracing subscriber.
///
/// Safe to call multiple times, only the first call takes effect.
pub fn init_tracing() {
    INIT.call_once(|| {
        let console_layer = tracing_subscriber::fmt::layer()
            .with_thread_ids(true)
            .with_target(true)
            .compact()
            .with_filter(make_filter());

        let _ = Registry::default().with(console_layer).try_init();
    });
}

/// Create an `EnvFilter` from `RUST_LOG`, defaulting to `info`.
fn make_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

// =============================================================================
// Test value type
// =============================================================================

/// A stand-in for a resident page, keyed by its page index.
///
/// The `frame` field mirrors the index so readers can detect torn or
/// stale loads: a `Page` reached through the trie must always satisfy
/// `frame == pindex as usize`.
#[derive(Debug, PartialEq, Eq)]
pub struct Page {
    /// Key recovered by the trie.
    pub pindex: u64,
    /// Payload consistent with the key.
    pub frame: usize,
}

impl Page {
    /// Create a page whose payload matches its index.
    pub fn new(pindex: u64) -> Self {
        Self {
            pindex,
            frame: pindex as usize,
        }
    }

    /// Assert the payload still matches the key.
    pub fn check(&self) {
        assert_eq!(self.frame, self.pindex as usize, "corrupt page payload");
    }
}

impl TrieValue for Page {
    fn key(&self) -> u64 {
        self.pindex
    }
}

/// Build a stable arena of pages for the given indexes.
///
/// The returned `Vec` must outlive any trie the pages are inserted into.
pub fn pages(pindexes: &[u64]) -> Vec<Page> {
    pindexes.iter().copied().map(Page::new).collect()
}
