//! The caller-value contract.
//!
//! The trie never owns or copies values. It stores a tagged borrow and
//! recovers the 64-bit index through [`TrieValue::key`], so the key lives
//! inside the caller's own structure and is never duplicated in the trie.

/// Contract for types stored in a [`PcTrie`](crate::PcTrie).
///
/// # Requirements
///
/// - The key must not change while the value is linked into a trie; the
///   trie navigates by it on every operation.
/// - `align_of::<Self>() >= 2`, so the low address bit is free for the
///   leaf tag. This is checked at compile time when a value is first
///   stored.
///
/// Values are passed in by reference, so a value can never sit at address
/// zero and can never collide with the trie's empty sentinel.
///
/// # Example
///
/// ```rust
/// use pctrie::TrieValue;
///
/// struct Page {
///     pindex: u64,
///     frame: usize,
/// }
///
/// impl TrieValue for Page {
///     fn key(&self) -> u64 {
///         self.pindex
///     }
/// }
/// ```
pub trait TrieValue {
    /// The 64-bit index under which this value is filed.
    fn key(&self) -> u64;
}

/// Self-keyed values, mainly useful in tests and examples.
impl TrieValue for u64 {
    #[inline]
    fn key(&self) -> u64 {
        *self
    }
}
