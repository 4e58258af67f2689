//! The trie handle and its mutation engine.
//!
//! [`PcTrie`] owns the root word, the reclamation collector, and the branch
//! allocator. All mutation goes through `&mut self`, so the single-writer
//! discipline is enforced at compile time; concurrent readers go through
//! [`TrieReader`] handles, which share the root atomically and pin nodes
//! with `seize` read sections.

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use seize::Collector;

use crate::alloc::{BoxAllocator, NodeAllocator};
use crate::node::{NULL_WORD, SlotCell, is_leaf};
use crate::ordering::LOCKED_ORD;
use crate::value::TrieValue;

mod insert;
pub(crate) mod lookup;
mod reclaim;
mod remove;
mod stats;
mod unlocked;

pub use stats::TrieStats;
pub use unlocked::TrieReader;

// ============================================================================
//  InsertError
// ============================================================================

/// Errors that can occur during insert operations.
pub enum InsertError<'a, V> {
    /// The key is already present. Carries the resident value so callers
    /// with merge semantics can inspect it. The trie is unchanged.
    Duplicate(&'a V),

    /// The allocator could not supply the branch node a structural insert
    /// needs. The trie is unchanged; the node is obtained before any slot
    /// is touched, so there is no partial progress to undo.
    AllocationFailed,
}

impl<V> Clone for InsertError<'_, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<V> Copy for InsertError<'_, V> {}

impl<V> PartialEq for InsertError<'_, V> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Duplicate(a), Self::Duplicate(b)) => std::ptr::eq(*a, *b),
            (Self::AllocationFailed, Self::AllocationFailed) => true,
            _ => false,
        }
    }
}

impl<V> Eq for InsertError<'_, V> {}

impl<V: TrieValue> fmt::Debug for InsertError<'_, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Duplicate(v) => f
                .debug_tuple("Duplicate")
                .field(&format_args!("{:#x}", v.key()))
                .finish(),
            Self::AllocationFailed => f.write_str("AllocationFailed"),
        }
    }
}

impl<V: TrieValue> fmt::Display for InsertError<'_, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Duplicate(v) => write!(f, "key {:#x} is already present", v.key()),
            Self::AllocationFailed => write!(f, "branch node allocation failed"),
        }
    }
}

impl<V: TrieValue> std::error::Error for InsertError<'_, V> {}

// ============================================================================
//  PcTrie
// ============================================================================

/// State shared between the owning handle and its readers.
pub(crate) struct TrieShared {
    /// The root slot. Holds the empty sentinel, a lone leaf, or the
    /// topmost branch.
    pub(crate) root: SlotCell,

    /// Memory reclamation collector; unlinked branches are retired here.
    pub(crate) collector: Collector,
}

/// A path-compressed radix trie mapping 64-bit keys to borrowed values.
///
/// The trie stores tagged references to caller-owned values and recovers
/// each key through [`TrieValue::key`]; it never copies a value or a key.
/// Branch nodes come from the injected [`NodeAllocator`] and are freed
/// through deferred reclamation, so [`TrieReader`] handles may keep
/// traversing while this handle mutates.
///
/// `'a` is the borrow under which values are stored; every value passed to
/// [`insert`](Self::insert) must outlive the trie.
///
/// # Example
///
/// ```rust
/// use pctrie::PcTrie;
///
/// let pindexes: Vec<u64> = vec![5, 9, 20, 21];
/// let mut trie: PcTrie<'_, u64> = PcTrie::new();
/// for p in &pindexes {
///     trie.insert(p).unwrap();
/// }
///
/// assert_eq!(trie.lookup(9), Some(&9));
/// assert_eq!(trie.lookup_ge(10), Some(&20));
/// assert_eq!(trie.lookup_le(10), Some(&9));
/// ```
pub struct PcTrie<'a, V, A = BoxAllocator>
where
    A: NodeAllocator,
{
    /// Root and collector, shared with reader handles.
    pub(crate) shared: Arc<TrieShared>,

    /// Branch supplier; consulted once per structural insert.
    pub(crate) allocator: A,

    /// Values are borrowed for `'a` and handed out as `&'a V`; the pair
    /// keeps `'a` invariant so a reader handle can never outlive a
    /// shortened borrow, and makes Send/Sync require `V: Sync`.
    pub(crate) _values: PhantomData<(&'a V, fn(&'a V) -> &'a V)>,
}

impl<'a, V, A> PcTrie<'a, V, A>
where
    A: NodeAllocator + Default,
{
    /// An empty trie with a default-constructed allocator.
    #[must_use]
    pub fn new() -> Self {
        Self::with_allocator(A::default())
    }
}

impl<'a, V, A> Default for PcTrie<'a, V, A>
where
    A: NodeAllocator + Default,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, V, A> PcTrie<'a, V, A>
where
    A: NodeAllocator,
{
    /// An empty trie drawing branch nodes from `allocator`.
    #[must_use]
    pub fn with_allocator(allocator: A) -> Self {
        Self {
            shared: Arc::new(TrieShared {
                root: SlotCell::empty(),
                collector: Collector::new(),
            }),
            allocator,
            _values: PhantomData,
        }
    }

    /// A cloneable handle for lookups concurrent with this handle's
    /// mutations. See [`TrieReader`].
    #[must_use]
    pub fn reader(&self) -> TrieReader<'a, V> {
        TrieReader {
            shared: Arc::clone(&self.shared),
            _values: PhantomData,
        }
    }

    /// True when the trie holds no values.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.shared.root.load(LOCKED_ORD) == NULL_WORD
    }

    /// True when the trie holds exactly one value. The root is then the
    /// lone leaf; a trie with two or more values roots at a branch.
    #[must_use]
    pub fn is_singleton(&self) -> bool {
        let word: usize = self.shared.root.load(LOCKED_ORD);
        word != NULL_WORD && is_leaf(word)
    }

    /// The branch allocator.
    pub fn allocator(&self) -> &A {
        &self.allocator
    }
}

impl<'a, V, A> Drop for PcTrie<'a, V, A>
where
    A: NodeAllocator,
{
    fn drop(&mut self) {
        // `&mut self` excludes other writers; reader handles may survive
        // us, so branches are retired, not freed, and the collector (kept
        // alive by the shared Arc) reclaims them once the last read
        // section ends.
        self.reclaim();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_trie_is_empty() {
        let trie: PcTrie<'_, u64> = PcTrie::new();
        assert!(trie.is_empty());
        assert!(!trie.is_singleton());
        assert_eq!(trie.allocator().outstanding(), 0);
    }

    #[test]
    fn insert_error_formats_the_key() {
        let v: u64 = 0x2a;
        let err: InsertError<'_, u64> = InsertError::Duplicate(&v);
        assert_eq!(err.to_string(), "key 0x2a is already present");
        assert_eq!(
            InsertError::<u64>::AllocationFailed.to_string(),
            "branch node allocation failed"
        );
    }

    #[test]
    fn insert_error_compares_by_resident_value() {
        let a: u64 = 7;
        let b: u64 = 7;
        assert_eq!(
            InsertError::Duplicate(&a),
            InsertError::Duplicate(&a)
        );
        assert_ne!(
            InsertError::Duplicate(&a),
            InsertError::Duplicate(&b)
        );
        assert_ne!(
            InsertError::Duplicate(&a),
            InsertError::AllocationFailed
        );
    }
}
