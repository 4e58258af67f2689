//! Removal and in-place replacement.
//!
//! Removing a leaf empties its slot. If the parent branch is left with a
//! single child, path compression has been lost: the survivor is spliced
//! into the grandparent's slot and the dead branch goes to the deferred
//! free path, since a guarded reader may still be traversing it.

use std::ptr::NonNull;

use crate::alloc::NodeAllocator;
use crate::node::{Branch, NULL_WORD, NodeRef, SlotCell, decode, leaf_word};
use crate::ordering::{LOCKED_ORD, WRITE_ORD};
use crate::tracing_helpers::trace_log;
use crate::trie::PcTrie;
use crate::value::TrieValue;

impl<'a, V, A> PcTrie<'a, V, A>
where
    V: TrieValue,
    A: NodeAllocator,
{
    /// Remove the value stored under `index` and return it, or `None` if
    /// the key is absent.
    pub fn remove_lookup(&mut self, index: u64) -> Option<&'a V> {
        let root: &SlotCell = &self.shared.root;
        let mut grand: Option<&Branch> = None;
        let mut parent: Option<&Branch> = None;
        let mut cell: &SlotCell = root;

        let old: &'a V = loop {
            let word: usize = cell.load(LOCKED_ORD);
            // SAFETY: `&mut self` keeps every linked node live; values are
            // borrowed for `'a` by the insert contract.
            match unsafe { decode::<V>(word) } {
                NodeRef::Empty => return None,
                NodeRef::Value(v) => {
                    if v.key() != index {
                        return None;
                    }
                    break v;
                }
                NodeRef::Branch(b) => {
                    let slot: usize = b.covers(index)?;
                    grand = parent;
                    parent = Some(b);
                    cell = b.child(slot);
                }
            }
        };

        match parent {
            None => root.store(NULL_WORD, WRITE_ORD),
            Some(node) => {
                node.detach(index, WRITE_ORD);
                if let Some(slot) = node.sole_child_slot(LOCKED_ORD) {
                    // One child left: splice it up and retire the branch.
                    let survivor: usize = node.child(slot).load(LOCKED_ORD);
                    match grand {
                        Some(g) => g.child(g.slot(index)).store(survivor, WRITE_ORD),
                        None => root.store(survivor, WRITE_ORD),
                    }
                    trace_log!(
                        "collapsed branch {:#x} while removing key {index:#x}",
                        node.owner()
                    );
                    let guard = self.shared.collector.enter();
                    // SAFETY: the branch is unlinked, came from this
                    // allocator, and is retired exactly once.
                    unsafe { self.allocator.retire_branch(NonNull::from(node), &guard) };
                }
            }
        }
        Some(old)
    }

    /// Remove the value stored under `index`, which must be present.
    ///
    /// # Panics
    ///
    /// When `index` is absent. Callers that are not sure use
    /// [`remove_lookup`](Self::remove_lookup).
    pub fn remove(&mut self, index: u64) -> &'a V {
        match self.remove_lookup(index) {
            Some(v) => v,
            None => panic!("no value to remove under key {index:#x}"),
        }
    }

    /// Swap the resident value whose key equals `value.key()` for `value`,
    /// returning the old one. Replacement never changes the trie's shape
    /// and never allocates.
    ///
    /// # Panics
    ///
    /// When no value is stored under `value.key()`.
    pub fn replace(&mut self, value: &'a V) -> &'a V {
        let index: u64 = value.key();
        let mut cell: &SlotCell = &self.shared.root;
        loop {
            let word: usize = cell.load(LOCKED_ORD);
            // SAFETY: as for `remove_lookup`.
            match unsafe { decode::<V>(word) } {
                NodeRef::Value(old) if old.key() == index => {
                    cell.store(leaf_word(value), WRITE_ORD);
                    return old;
                }
                NodeRef::Branch(b) => match b.covers(index) {
                    Some(slot) => cell = b.child(slot),
                    None => panic!("no value to replace under key {index:#x}"),
                },
                _ => panic!("no value to replace under key {index:#x}"),
            }
        }
    }
}
