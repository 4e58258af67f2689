//! Structural statistics and invariant checking.

use crate::alloc::NodeAllocator;
use crate::node::{Branch, COUNT, NULL_WORD, NodeRef, decode};
use crate::ordering::LOCKED_ORD;
use crate::trie::PcTrie;
use crate::value::TrieValue;

/// Statistics collected from a full structural walk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TrieStats {
    /// Number of stored values.
    pub values: usize,
    /// Number of live branch nodes.
    pub branches: usize,
    /// Branch nodes on the longest root-to-leaf path.
    pub max_depth: usize,
}

impl<V, A> PcTrie<'_, V, A>
where
    V: TrieValue,
    A: NodeAllocator,
{
    /// Walk the whole structure, counting values and branches and checking
    /// the structural invariants along the way.
    ///
    /// # Panics
    ///
    /// When the structure is corrupt: a reachable branch with fewer than
    /// two children, a popmap bit disagreeing with its slot, or a subtree
    /// outside its parent's prefix.
    #[must_use]
    pub fn stats(&self) -> TrieStats {
        let mut stats = TrieStats::default();
        let word: usize = self.shared.root.load(LOCKED_ORD);
        // SAFETY: `&self` excludes node frees; everything linked is live.
        match unsafe { decode::<V>(word) } {
            NodeRef::Empty => {}
            NodeRef::Value(_) => stats.values = 1,
            // SAFETY: as above, and the walk only follows linked words.
            NodeRef::Branch(b) => unsafe { visit::<V>(b, 1, &mut stats) },
        }
        stats
    }
}

/// # Safety
///
/// `branch` and everything linked under it must be live, with no writer
/// running concurrently.
unsafe fn visit<V>(branch: &Branch, depth: usize, stats: &mut TrieStats)
where
    V: TrieValue,
{
    stats.branches += 1;
    stats.max_depth = stats.max_depth.max(depth);
    let pm: u16 = branch.popmap(LOCKED_ORD);
    assert!(
        pm.count_ones() >= 2,
        "reachable branch {:#x} has fewer than two children",
        branch.owner()
    );
    for slot in 0..COUNT {
        let word: usize = branch.child(slot).load(LOCKED_ORD);
        let populated: bool = pm & (1 << slot) != 0;
        assert_eq!(
            word != NULL_WORD,
            populated,
            "popmap bit disagrees with slot {slot} of branch {:#x}",
            branch.owner()
        );
        if !populated {
            continue;
        }
        // SAFETY: forwarded from the caller.
        match unsafe { decode::<V>(word) } {
            NodeRef::Empty => unreachable!("populated slot holds the sentinel"),
            NodeRef::Value(v) => {
                assert_eq!(
                    branch.covers(v.key()),
                    Some(slot),
                    "leaf key {:#x} lies outside its branch prefix",
                    v.key()
                );
                stats.values += 1;
            }
            NodeRef::Branch(child) => {
                assert_eq!(
                    branch.covers(child.owner()),
                    Some(slot),
                    "child owner {:#x} lies outside its branch prefix",
                    child.owner()
                );
                assert!(
                    child.clev() < branch.clev(),
                    "child level {} does not sit below its parent's {}",
                    child.clev(),
                    branch.clev()
                );
                // SAFETY: forwarded from the caller.
                unsafe { visit::<V>(child, depth + 1, stats) };
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::TrieStats;
    use crate::alloc::NodeAllocator;
    use crate::trie::PcTrie;

    #[test]
    fn stats_track_shape_changes() {
        let values: Vec<u64> = vec![5, 9, 20, 21];
        let mut trie: PcTrie<'_, u64> = PcTrie::new();
        assert_eq!(trie.stats(), TrieStats::default());

        trie.insert(&values[0]).unwrap();
        assert_eq!(
            trie.stats(),
            TrieStats {
                values: 1,
                branches: 0,
                max_depth: 0
            }
        );

        for v in &values[1..] {
            trie.insert(v).unwrap();
        }
        let full = trie.stats();
        assert_eq!(full.values, 4);
        assert_eq!(full.branches, 3);
        assert_eq!(full.max_depth, 2);
        assert_eq!(full.branches, trie.allocator().outstanding());

        trie.remove_lookup(9).unwrap();
        let after = trie.stats();
        assert_eq!(after.values, 3);
        assert_eq!(after.branches, 2);
    }
}
