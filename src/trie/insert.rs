//! Insertion: walk to the divergence point, then splice.
//!
//! A key's path either ends in an empty slot (store the leaf, no structure
//! changes), an equal-keyed leaf (duplicate), or a node the key cannot
//! share a path with. In the last case one new branch is allocated at the
//! level of the highest differing bit and spliced in above the resident
//! subtree, holding it and the new leaf in separate slots.

use std::ptr::NonNull;

use crate::alloc::NodeAllocator;
use crate::node::{Branch, NodeRef, SlotCell, branch_word, decode, diverging_level, leaf_word};
use crate::ordering::{INIT_ORD, LOCKED_ORD, WRITE_ORD};
use crate::tracing_helpers::{trace_log, warn_log};
use crate::trie::{InsertError, PcTrie};
use crate::value::TrieValue;

impl<'a, V, A> PcTrie<'a, V, A>
where
    V: TrieValue,
    A: NodeAllocator,
{
    /// Insert `value` under its own key.
    ///
    /// Duplicate keys are rejected, not overwritten: the error carries the
    /// resident value and the trie is unchanged. A structural insert that
    /// cannot get a branch node fails the same way, with no partial
    /// progress.
    ///
    /// # Errors
    ///
    /// [`InsertError::Duplicate`] when the key is already present,
    /// [`InsertError::AllocationFailed`] when the allocator is exhausted.
    pub fn insert(&mut self, value: &'a V) -> Result<(), InsertError<'a, V>> {
        match self.insert_lookup(value) {
            Ok(None) => Ok(()),
            Ok(Some(resident)) => Err(InsertError::Duplicate(resident)),
            Err(e) => Err(e),
        }
    }

    /// Insert `value`, or return the resident value if its key is already
    /// present. `Ok(None)` means `value` was inserted.
    ///
    /// This is the find-or-create form: a present key is a success, and
    /// the resident value is returned for the caller to use.
    ///
    /// # Errors
    ///
    /// [`InsertError::AllocationFailed`] when a new branch was needed and
    /// the allocator is exhausted. Duplicates never allocate, so a present
    /// key cannot fail.
    pub fn find_or_insert(&mut self, value: &'a V) -> Result<Option<&'a V>, InsertError<'a, V>> {
        self.insert_lookup(value)
    }

    fn insert_lookup(&mut self, value: &'a V) -> Result<Option<&'a V>, InsertError<'a, V>> {
        let index: u64 = value.key();
        let mut parent: Option<&Branch> = None;
        let mut cell: &SlotCell = &self.shared.root;

        // Walk towards `index` until its path leaves the resident
        // structure: an empty slot, a leaf, or a branch whose prefix the
        // key does not share.
        let (resident_word, resident_key): (usize, u64) = loop {
            let word: usize = cell.load(LOCKED_ORD);
            // SAFETY: `&mut self` excludes the writer paths that retire
            // nodes, so everything linked stays live for this call.
            match unsafe { decode::<V>(word) } {
                NodeRef::Empty => {
                    // A free slot on the key's own path: no branch needed.
                    let leaf: usize = leaf_word(value);
                    match parent {
                        Some(branch) => branch.attach(index, leaf, WRITE_ORD),
                        None => cell.store(leaf, WRITE_ORD),
                    }
                    trace_log!("inserted key {index:#x} into a free slot");
                    return Ok(None);
                }
                NodeRef::Value(resident) => {
                    if resident.key() == index {
                        return Ok(Some(resident));
                    }
                    break (word, resident.key());
                }
                NodeRef::Branch(branch) => match branch.covers(index) {
                    Some(slot) => {
                        parent = Some(branch);
                        cell = branch.child(slot);
                    }
                    None => break (word, branch.owner()),
                },
            }
        };

        // The keys agree above `clev` and disagree inside that slice, so
        // the new branch holds the new leaf and the resident subtree in
        // distinct slots. It is fully built before the single publishing
        // store, which keeps allocation failure free of side effects.
        let clev: u8 = diverging_level(index, resident_key);
        let Some(mut branch) = self.allocator.alloc_branch() else {
            warn_log!("no branch node available to insert key {index:#x}");
            return Err(InsertError::AllocationFailed);
        };
        branch.reset(index, clev);
        branch.attach(index, leaf_word(value), INIT_ORD);
        branch.attach(resident_key, resident_word, INIT_ORD);
        trace_log!("splicing branch at clev {clev} separating {index:#x} from {resident_key:#x}");
        cell.store(branch_word(NonNull::from(Box::leak(branch))), WRITE_ORD);
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use crate::alloc::{NodeAllocator, QuotaAllocator};
    use crate::trie::{InsertError, PcTrie};

    #[test]
    fn first_insert_occupies_the_root() {
        let v: u64 = 0x10;
        let mut trie: PcTrie<'_, u64> = PcTrie::new();
        trie.insert(&v).unwrap();
        assert!(trie.is_singleton());
        // A lone leaf needs no interior nodes.
        assert_eq!(trie.allocator().outstanding(), 0);
    }

    #[test]
    fn diverging_keys_grow_one_branch_each() {
        let values: Vec<u64> = vec![0x10, 0x11, 0x21];
        let mut trie: PcTrie<'_, u64> = PcTrie::new();
        trie.insert(&values[0]).unwrap();
        trie.insert(&values[1]).unwrap();
        assert_eq!(trie.allocator().outstanding(), 1);
        trie.insert(&values[2]).unwrap();
        assert_eq!(trie.allocator().outstanding(), 2);
        for v in &values {
            assert_eq!(trie.lookup(*v), Some(v));
        }
    }

    #[test]
    fn duplicate_insert_keeps_the_first_value() {
        let first: u64 = 20;
        let second: u64 = 20;
        let mut trie: PcTrie<'_, u64> = PcTrie::new();
        trie.insert(&first).unwrap();

        let err = trie.insert(&second).unwrap_err();
        assert_eq!(err, InsertError::Duplicate(&first));
        assert!(std::ptr::eq(trie.lookup(20).unwrap(), &first));
    }

    #[test]
    fn find_or_insert_reports_the_resident() {
        let first: u64 = 20;
        let second: u64 = 20;
        let mut trie: PcTrie<'_, u64> = PcTrie::new();
        assert_eq!(trie.find_or_insert(&first).unwrap(), None);
        let resident = trie.find_or_insert(&second).unwrap().unwrap();
        assert!(std::ptr::eq(resident, &first));
    }

    #[test]
    fn exhausted_allocator_fails_cleanly() {
        let values: Vec<u64> = vec![0x5, 0x9, 0x14];
        let mut trie: PcTrie<'_, u64, QuotaAllocator> =
            PcTrie::with_allocator(QuotaAllocator::new(1));
        trie.insert(&values[0]).unwrap();
        trie.insert(&values[1]).unwrap();

        // The third key needs a second branch; the quota is spent.
        assert_eq!(
            trie.insert(&values[2]),
            Err(InsertError::AllocationFailed)
        );
        assert_eq!(trie.lookup(0x14), None);
        assert_eq!(trie.lookup(0x5), Some(&values[0]));
        assert_eq!(trie.lookup(0x9), Some(&values[1]));

        // Duplicates are detected before allocation, so they still fail
        // with the right error.
        assert_eq!(
            trie.insert(&values[0]),
            Err(InsertError::Duplicate(&values[0]))
        );
    }
}
