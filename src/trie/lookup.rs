//! Exact and ordered lookups through the owning handle.
//!
//! An exact lookup walks straight down the key's path. The ordered forms
//! (`lookup_ge`, `lookup_le`, `lookup_range`) run on a scratch path cache
//! and share their machinery with [`Cursor`](crate::iter::Cursor); see
//! `iter` for the climb-and-descend algorithm.

use std::sync::atomic::Ordering;

use crate::alloc::NodeAllocator;
use crate::iter::{PathCache, seek_ge, seek_le};
use crate::node::{NodeRef, SlotCell, decode};
use crate::ordering::LOCKED_ORD;
use crate::trie::PcTrie;
use crate::value::TrieValue;

/// Walk straight down the path of `index` from `root`.
///
/// # Safety
///
/// Every node reachable from `root` must stay live for the duration of the
/// walk, and leaf referents for `'g`. The owning handle guarantees this
/// with `&mut` exclusivity; guarded readers by keeping the read section
/// open across the walk.
pub(crate) unsafe fn lookup_inner<'g, V>(root: &SlotCell, index: u64, ord: Ordering) -> Option<&'g V>
where
    V: TrieValue,
{
    let mut cell: &SlotCell = root;
    loop {
        // SAFETY: forwarded from the caller.
        match unsafe { decode::<V>(cell.load(ord)) } {
            NodeRef::Empty => return None,
            NodeRef::Value(v) => return (v.key() == index).then_some(v),
            NodeRef::Branch(branch) => cell = branch.child(branch.covers(index)?),
        }
    }
}

impl<'a, V, A> PcTrie<'a, V, A>
where
    V: TrieValue,
    A: NodeAllocator,
{
    /// The value stored under `index`, if any.
    #[must_use]
    pub fn lookup(&self, index: u64) -> Option<&'a V> {
        // SAFETY: `&self` excludes node frees (mutation needs `&mut`), and
        // values are borrowed for `'a` by the insert contract.
        unsafe { lookup_inner(&self.shared.root, index, LOCKED_ORD) }
    }

    /// The value with the smallest key greater than or equal to `index`.
    #[must_use]
    pub fn lookup_ge(&self, index: u64) -> Option<&'a V> {
        let mut path: PathCache = PathCache::new();
        // SAFETY: as for `lookup`.
        unsafe { seek_ge(&self.shared.root, &mut path, index, None, LOCKED_ORD) }
    }

    /// The value with the largest key less than or equal to `index`.
    #[must_use]
    pub fn lookup_le(&self, index: u64) -> Option<&'a V> {
        let mut path: PathCache = PathCache::new();
        // SAFETY: as for `lookup`.
        unsafe { seek_le(&self.shared.root, &mut path, index, LOCKED_ORD) }
    }

    /// Up to `count` values in ascending key order, starting from the
    /// smallest present key greater than or equal to `first`. Runs short
    /// when fewer keys remain.
    ///
    /// The result is dense only in the sense of "the next `count` present
    /// keys"; nothing requires them to be contiguous.
    #[must_use]
    pub fn lookup_range(&self, first: u64, count: usize) -> Vec<&'a V> {
        let mut out: Vec<&'a V> = Vec::with_capacity(count);
        let mut path: PathCache = PathCache::new();
        let mut next: u64 = first;
        while out.len() < count {
            // SAFETY: as for `lookup`. The path cache only ever holds
            // branches that are still linked, since nothing mutates under
            // `&self`.
            let Some(v) = (unsafe { seek_ge(&self.shared.root, &mut path, next, None, LOCKED_ORD) })
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

#[cfg(test)]
mod tests {
    use crate::trie::PcTrie;

    fn populated(values: &[u64]) -> PcTrie<'_, u64> {
        let mut trie: PcTrie<'_, u64> = PcTrie::new();
        for v in values {
            trie.insert(v).unwrap();
        }
        trie
    }

    #[test]
    fn exact_lookup_hits_and_misses() {
        let values: Vec<u64> = vec![5, 9, 20, 21];
        let trie = populated(&values);
        assert_eq!(trie.lookup(9), Some(&9));
        assert_eq!(trie.lookup(21), Some(&21));
        assert_eq!(trie.lookup(10), None);
        assert_eq!(trie.lookup(0), None);
        assert_eq!(trie.lookup(u64::MAX), None);
    }

    #[test]
    fn ge_returns_the_next_present_key() {
        let values: Vec<u64> = vec![5, 9, 20, 21];
        let trie = populated(&values);
        assert_eq!(trie.lookup_ge(10), Some(&20));
        assert_eq!(trie.lookup_ge(9), Some(&9));
        assert_eq!(trie.lookup_ge(0), Some(&5));
        assert_eq!(trie.lookup_ge(21), Some(&21));
        assert_eq!(trie.lookup_ge(22), None);
    }

    #[test]
    fn le_returns_the_previous_present_key() {
        let values: Vec<u64> = vec![5, 9, 20, 21];
        let trie = populated(&values);
        assert_eq!(trie.lookup_le(10), Some(&9));
        assert_eq!(trie.lookup_le(9), Some(&9));
        assert_eq!(trie.lookup_le(4), None);
        assert_eq!(trie.lookup_le(u64::MAX), Some(&21));
    }

    #[test]
    fn range_walks_ascending_from_the_start_key() {
        let values: Vec<u64> = vec![5, 9, 20, 21];
        let trie = populated(&values);
        assert_eq!(trie.lookup_range(5, 3), vec![&5, &9, &20]);
        assert_eq!(trie.lookup_range(6, 2), vec![&9, &20]);
        assert_eq!(trie.lookup_range(0, 10), vec![&5, &9, &20, &21]);
        assert_eq!(trie.lookup_range(21, 4), vec![&21]);
        assert_eq!(trie.lookup_range(22, 4), Vec::<&u64>::new());
        assert_eq!(trie.lookup_range(5, 0), Vec::<&u64>::new());
    }

    #[test]
    fn ordered_lookups_on_an_empty_trie() {
        let trie: PcTrie<'_, u64> = PcTrie::new();
        assert_eq!(trie.lookup_ge(0), None);
        assert_eq!(trie.lookup_le(u64::MAX), None);
        assert!(trie.lookup_range(0, 8).is_empty());
    }

    #[test]
    fn extreme_keys_are_reachable() {
        let values: Vec<u64> = vec![0, u64::MAX];
        let trie = populated(&values);
        assert_eq!(trie.lookup_ge(1), Some(&u64::MAX));
        assert_eq!(trie.lookup_le(u64::MAX - 1), Some(&0));
        assert_eq!(trie.lookup_ge(u64::MAX), Some(&u64::MAX));
        assert_eq!(trie.lookup_le(0), Some(&0));
    }
}
