//! # `PcTrie`
//!
//! A path-compressed radix trie mapping 64-bit keys to caller-owned
//! values.
//!
//! The trie stores tagged references, never the values themselves, and
//! recovers each key from the value through [`TrieValue::key`]. Interior
//! branch nodes fan out 16 ways on 4-bit key slices, and path compression
//! skips every level where the keys do not diverge, so lookups touch a
//! handful of nodes even for sparse 64-bit keys:
//!
//! - `lookup`, `lookup_ge`, `lookup_le`, `lookup_range` for exact and
//!   ordered access
//! - `insert` / `find_or_insert`, `remove` / `remove_lookup`, `replace`
//! - [`Cursor`]/[`CursorMut`] for path-cached scans with amortized O(1)
//!   steps, with in-scan insert and remove
//! - `reclaim` / `reclaim_with` for whole-trie teardown
//!
//! ## Thread Safety
//!
//! Mutation goes through `&mut self`, so there is exactly one writer and
//! no internal locking. Concurrent readers use [`TrieReader`] handles,
//! which share the root atomically and pin nodes with `seize` read
//! sections; the writer retires unlinked nodes through the collector
//! instead of freeing them, so a racing reader never touches freed memory:
//!
//! ```rust
//! use pctrie::PcTrie;
//!
//! let pindexes: Vec<u64> = vec![5, 9, 20, 21];
//! let mut trie: PcTrie<'_, u64> = PcTrie::new();
//! let reader = trie.reader();
//!
//! for p in &pindexes {
//!     trie.insert(p).unwrap();
//! }
//!
//! // Owning-handle lookups need no guard.
//! assert_eq!(trie.lookup_ge(10), Some(&20));
//! assert_eq!(trie.lookup_le(10), Some(&9));
//!
//! // Reader handles work concurrently with the writer (here, on one
//! // thread, interleaved with it).
//! let guard = reader.guard();
//! assert_eq!(reader.lookup_with_guard(21, &guard), Some(&21));
//! ```
//!
//! ## Value Contract
//!
//! Stored values outlive the trie (`'a` on [`PcTrie`]), keep their key
//! stable while linked, and are aligned to at least 2 bytes so the low
//! address bit is free for the leaf tag. See [`TrieValue`].
//!
//! ## Allocation
//!
//! Branch nodes come from a [`NodeAllocator`] injected at construction.
//! Allocation failure is reported, never unwound: a failed insert leaves
//! the trie exactly as it was. The default [`BoxAllocator`] draws from the
//! global heap; [`QuotaAllocator`] bounds node counts and injects failures
//! in tests.

#![deny(missing_docs)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

pub mod alloc;
pub mod iter;
pub mod node;
pub mod ordering;
pub mod trie;
pub mod value;

mod tracing_helpers;

// Re-export main types for convenience
pub use alloc::{BoxAllocator, NodeAllocator, QuotaAllocator};
pub use iter::{Cursor, CursorMut, Iter};
pub use node::Branch;
pub use trie::{InsertError, PcTrie, TrieReader, TrieStats};
pub use value::TrieValue;
