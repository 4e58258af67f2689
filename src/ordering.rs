//! Standard memory orderings for trie slot access.
//!
//! These constants ensure consistent ordering usage across the codebase
//! and make the intent clear at each access point.

use std::sync::atomic::Ordering;

/// Ordering for slot loads inside a guarded read section.
/// Pairs with the writer's Release stores, so a reader that observes a
/// newly linked word also observes the node it points to fully built.
pub const READ_ORD: Ordering = Ordering::Acquire;

/// Ordering for stores that publish a word into the live trie.
/// Pairs with readers' Acquire loads.
pub const WRITE_ORD: Ordering = Ordering::Release;

/// Ordering for slot loads on the exclusive-writer path and for lookups
/// through the owning handle. Safe because `&mut` exclusivity (or the
/// absence of any writer) provides the synchronization.
pub const LOCKED_ORD: Ordering = Ordering::Relaxed;

/// Ordering for stores into a branch that is not yet linked into the trie.
/// No reader can reach the node until the publishing store does.
pub const INIT_ORD: Ordering = Ordering::Relaxed;
