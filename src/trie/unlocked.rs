//! The unlocked read path.
//!
//! A [`TrieReader`] shares the trie's root and collector through an `Arc`,
//! so it is not borrow-linked to the owning handle: readers on other
//! threads keep working while the owner mutates. Every lookup requires a
//! guard, the token of an open read section; the writer retires unlinked
//! branches through the collector, which delays their free until all read
//! sections that could observe them have ended. Guarded loads are acquire
//! and pair with the writer's release publishes, so a reader never sees a
//! partially initialized branch.

use std::marker::PhantomData;
use std::sync::Arc;

use seize::LocalGuard;

use crate::iter::{PathCache, seek_ge};
use crate::ordering::READ_ORD;
use crate::trie::TrieShared;
use crate::trie::lookup::lookup_inner;
use crate::value::TrieValue;

/// A cloneable handle for lookups concurrent with the owning handle's
/// mutations.
///
/// Results are consistent with some recent state of the trie: a racing
/// read may or may not observe an in-flight insert or removal, but it
/// never observes torn words or freed memory.
///
/// # Example
///
/// ```rust
/// use pctrie::PcTrie;
///
/// let pages: Vec<u64> = vec![5, 9, 20];
/// let mut trie: PcTrie<'_, u64> = PcTrie::new();
/// for p in &pages {
///     trie.insert(p).unwrap();
/// }
///
/// // The reader is independent of the owning borrow, so the owner can
/// // keep mutating while reader handles (typically on other threads)
/// // look values up.
/// let reader = trie.reader();
/// let guard = reader.guard();
/// assert_eq!(reader.lookup_with_guard(9, &guard), Some(&9));
///
/// trie.remove(9);
/// assert_eq!(reader.lookup_with_guard(9, &guard), None);
/// ```
pub struct TrieReader<'a, V> {
    /// Root and collector, shared with the owning handle.
    pub(crate) shared: Arc<TrieShared>,

    /// Same variance and auto-trait story as the owning handle.
    pub(crate) _values: PhantomData<(&'a V, fn(&'a V) -> &'a V)>,
}

impl<V> Clone for TrieReader<'_, V> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
            _values: PhantomData,
        }
    }
}

impl<'a, V> TrieReader<'a, V>
where
    V: TrieValue,
{
    /// Open a read section. Lookups through this reader need the returned
    /// guard; branches unlinked by the writer stay live until every guard
    /// that could have observed them is dropped. Hold guards briefly:
    /// an open read section delays reclamation.
    #[must_use]
    pub fn guard(&self) -> LocalGuard<'_> {
        self.shared.collector.enter()
    }

    /// The value stored under `index`, if any. `guard` must have come from
    /// [`guard`](Self::guard) on a handle of this same trie.
    #[must_use]
    pub fn lookup_with_guard(&self, index: u64, _guard: &LocalGuard<'_>) -> Option<&'a V> {
        // SAFETY: the caller's guard holds a read section open, so nodes
        // unlinked by the writer are not reclaimed during the walk, and
        // acquire loads pair with the writer's release publishes. Values
        // are borrowed for `'a` and owned by the caller, so they outlive
        // the guard.
        unsafe { lookup_inner(&self.shared.root, index, READ_ORD) }
    }

    /// Up to `count` values in ascending key order from the smallest
    /// present key greater than or equal to `first`, like
    /// [`PcTrie::lookup_range`](crate::PcTrie::lookup_range). `guard` must
    /// have come from [`guard`](Self::guard) on a handle of this same
    /// trie.
    ///
    /// A scan racing the writer ends early rather than chase structure
    /// mid-removal, so the result can be shorter than a locked scan of
    /// either the before or after state would produce.
    #[must_use]
    pub fn lookup_range_with_guard(
        &self,
        first: u64,
        count: usize,
        _guard: &LocalGuard<'_>,
    ) -> Vec<&'a V> {
        let mut out: Vec<&'a V> = Vec::with_capacity(count);
        let mut path: PathCache = PathCache::new();
        let mut next: u64 = first;
        while out.len() < count {
            // SAFETY: as for `lookup_with_guard`; the path only ever holds
            // branches observed inside this read section.
            let Some(v) = (unsafe { seek_ge(&self.shared.root, &mut path, next, None, READ_ORD) })
            else {
                break;
            };
            out.push(v);
            let Some(following) = v.key().checked_add(1) else {
                break;
            };
            next = following;
        }
        out
    }
}
