//! Whole-trie reclamation.
//!
//! Reclamation detaches the tree from the root first, so the trie is
//! observably empty for the whole walk, then visits the detached structure
//! with a resumable walker that surrenders one item per step: leaves in
//! ascending key order, and each branch post-order once its subtree has
//! been fully visited. Branches still go through the deferred free path; a
//! guarded reader that loaded the root before the detach may be walking
//! them.

use std::ptr::NonNull;

use crate::alloc::NodeAllocator;
use crate::node::{Branch, COUNT, MAX_DEPTH, NULL_WORD, NodeRef, SlotCell, branch_ptr, decode, is_leaf};
use crate::ordering::{LOCKED_ORD, WRITE_ORD};
use crate::tracing_helpers::debug_log;
use crate::trie::PcTrie;
use crate::value::TrieValue;

/// One surrendered item of the reclamation walk.
enum ReclaimStep {
    /// A non-sentinel leaf word. Leaves arrive in ascending key order.
    Value(usize),
    /// A branch whose entire subtree has been visited.
    Free(NonNull<Branch>),
    /// The walk is over.
    Done,
}

/// Resumable post-order walker over a detached tree.
struct ReclaimCursor {
    /// Branches on the way down, each with the next child slot to scan.
    stack: Vec<(NonNull<Branch>, usize)>,
    /// A lone root leaf, surrendered on the first step.
    pending: Option<usize>,
}

impl ReclaimCursor {
    /// Detach the tree rooted at `root` (leaving the sentinel behind) and
    /// position the walker on it.
    fn begin(root: &SlotCell) -> Self {
        let word: usize = root.load(LOCKED_ORD);
        root.store(NULL_WORD, WRITE_ORD);
        let mut walker = Self {
            stack: Vec::with_capacity(MAX_DEPTH),
            pending: None,
        };
        if is_leaf(word) {
            if word != NULL_WORD {
                walker.pending = Some(word);
            }
        } else {
            walker.stack.push((branch_ptr(word), 0));
        }
        walker
    }

    fn step(&mut self) -> ReclaimStep {
        if let Some(word) = self.pending.take() {
            return ReclaimStep::Value(word);
        }
        while let Some(&(node, slot)) = self.stack.last() {
            if slot == COUNT {
                self.stack.pop();
                return ReclaimStep::Free(node);
            }
            let depth: usize = self.stack.len() - 1;
            self.stack[depth].1 = slot + 1;
            // SAFETY: stack entries were linked when the tree was detached
            // and are surrendered for freeing only after being popped.
            let word: usize = unsafe { node.as_ref() }.child(slot).load(LOCKED_ORD);
            if word == NULL_WORD {
                continue;
            }
            if is_leaf(word) {
                return ReclaimStep::Value(word);
            }
            self.stack.push((branch_ptr(word), 0));
        }
        ReclaimStep::Done
    }
}

impl<V, A> PcTrie<'_, V, A>
where
    A: NodeAllocator,
{
    /// Detach the whole tree and free every branch node, leaving the trie
    /// empty and reusable. Values are untouched: they belong to the
    /// caller.
    ///
    /// Frees are post-order and deferred, so no branch is released while a
    /// descendant still links to it and no guarded reader can touch freed
    /// memory. Dropping the trie reclaims through this same walk.
    pub fn reclaim(&mut self) {
        debug_log!("reclaiming all branch nodes");
        let mut walker = ReclaimCursor::begin(&self.shared.root);
        let guard = self.shared.collector.enter();
        loop {
            match walker.step() {
                ReclaimStep::Value(_) => {}
                // SAFETY: the walker surrenders each detached branch
                // exactly once, after its whole subtree has been visited.
                ReclaimStep::Free(node) => unsafe {
                    self.allocator.retire_branch(node, &guard);
                },
                ReclaimStep::Done => break,
            }
        }
    }
}

impl<'a, V, A> PcTrie<'a, V, A>
where
    V: TrieValue,
    A: NodeAllocator,
{
    /// Like [`reclaim`](Self::reclaim), and additionally hand every stored
    /// value to `f` in ascending key order, each before the structure that
    /// reached it is released.
    pub fn reclaim_with<F>(&mut self, mut f: F)
    where
        F: FnMut(&'a V),
    {
        debug_log!("reclaiming all branch nodes with a value callback");
        let mut walker = ReclaimCursor::begin(&self.shared.root);
        let guard = self.shared.collector.enter();
        loop {
            match walker.step() {
                ReclaimStep::Value(word) => {
                    // SAFETY: the walker surrenders only non-sentinel leaf
                    // words from the detached tree; values are borrowed
                    // for `'a`.
                    if let NodeRef::Value(v) = unsafe { decode::<V>(word) } {
                        f(v);
                    }
                }
                // SAFETY: as for `reclaim`.
                ReclaimStep::Free(node) => unsafe {
                    self.allocator.retire_branch(node, &guard);
                },
                ReclaimStep::Done => break,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::alloc::NodeAllocator;
    use crate::trie::PcTrie;

    fn populated(values: &[u64]) -> PcTrie<'_, u64> {
        let mut trie: PcTrie<'_, u64> = PcTrie::new();
        for v in values {
            trie.insert(v).unwrap();
        }
        trie
    }

    #[test]
    fn reclaim_frees_every_branch() {
        let values: Vec<u64> = vec![5, 9, 20, 21];
        let mut trie = populated(&values);
        assert_eq!(trie.allocator().outstanding(), 3);

        trie.reclaim();
        assert!(trie.is_empty());
        assert_eq!(trie.allocator().outstanding(), 0);
        assert_eq!(trie.lookup(5), None);
        assert_eq!(trie.lookup_ge(0), None);

        // The trie is reusable afterwards.
        trie.insert(&values[2]).unwrap();
        assert_eq!(trie.lookup(20), Some(&20));
    }

    #[test]
    fn reclaim_with_visits_values_ascending() {
        let values: Vec<u64> = vec![21, 5, 0x1000, 20, 9];
        let mut trie = populated(&values);

        let mut seen: Vec<u64> = Vec::new();
        trie.reclaim_with(|v| seen.push(*v));
        assert_eq!(seen, vec![5, 9, 20, 21, 0x1000]);
        assert!(trie.is_empty());
        assert_eq!(trie.allocator().outstanding(), 0);
    }

    #[test]
    fn reclaim_handles_trivial_shapes() {
        let value: u64 = 7;
        let mut empty: PcTrie<'_, u64> = PcTrie::new();
        empty.reclaim();
        assert!(empty.is_empty());

        let mut single: PcTrie<'_, u64> = PcTrie::new();
        single.insert(&value).unwrap();
        let mut seen: Vec<u64> = Vec::new();
        single.reclaim_with(|v| seen.push(*v));
        assert_eq!(seen, vec![7]);
        assert!(single.is_empty());
    }
}
