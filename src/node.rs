//! Tagged-word node encoding and the branch node layout.
//!
//! Every position in the trie (the root and each branch child slot) holds a
//! single machine word:
//!
//! - low bit set, payload zero: the empty sentinel (`NULL_WORD`),
//! - low bit set, payload nonzero: a leaf, the address of a caller value,
//! - low bit clear: the address of a [`Branch`] node.
//!
//! Leaf and branch discrimination is therefore a single bit test, and an
//! empty slot is just another leaf as far as the tag is concerned. Words are
//! stored in atomic cells so guarded readers never race a torn store.

use std::fmt;
use std::ptr::NonNull;
use std::sync::atomic::{AtomicU16, AtomicUsize, Ordering};

/// Key bits consumed per trie level.
pub(crate) const WIDTH: u32 = 4;

/// Child slots per branch node.
pub(crate) const COUNT: usize = 1 << WIDTH;

/// Slot mask for one `WIDTH`-bit key slice.
const MASK: u64 = COUNT as u64 - 1;

/// Maximum number of branch nodes on any root-to-leaf path. A 64-bit key
/// has `64 / WIDTH` slices, and path compression only ever shortens paths.
pub(crate) const MAX_DEPTH: usize = (u64::BITS / WIDTH) as usize;

/// Low tag bit marking a word as a leaf (or the sentinel).
const LEAF_TAG: usize = 0x1;

/// The empty-slot sentinel: leaf tag, no payload.
pub(crate) const NULL_WORD: usize = LEAF_TAG;

/// True for leaf words, including the sentinel.
#[inline]
pub(crate) const fn is_leaf(word: usize) -> bool {
    word & LEAF_TAG != 0
}

/// Encode a borrowed caller value as a leaf word.
#[inline]
pub(crate) fn leaf_word<V>(value: &V) -> usize {
    const {
        assert!(
            align_of::<V>() >= 2,
            "trie values must be aligned to at least 2 bytes so the tag bit is free"
        );
    }
    let addr: usize = std::ptr::from_ref(value) as usize;
    debug_assert_eq!(addr & LEAF_TAG, 0);
    addr | LEAF_TAG
}

/// Encode a branch pointer as an untagged word.
#[inline]
pub(crate) fn branch_word(node: NonNull<Branch>) -> usize {
    let addr: usize = node.as_ptr() as usize;
    debug_assert_eq!(addr & LEAF_TAG, 0);
    addr
}

/// Recover the branch pointer from an untagged word.
#[inline]
pub(crate) fn branch_ptr(word: usize) -> NonNull<Branch> {
    debug_assert!(!is_leaf(word));
    // SAFETY: untagged words are only ever produced by `branch_word` from a
    // non-null branch pointer.
    unsafe { NonNull::new_unchecked(word as *mut Branch) }
}

/// One decoded trie word.
#[derive(Clone, Copy)]
pub(crate) enum NodeRef<'g, V> {
    /// The empty sentinel.
    Empty,
    /// A leaf holding a borrowed caller value.
    Value(&'g V),
    /// An interior branch node.
    Branch(&'g Branch),
}

/// Decode a word loaded from a live slot.
///
/// # Safety
///
/// `word` must have been loaded from this trie's root or from a branch child
/// slot, and the referent (value borrow or branch node) must still be live
/// for `'g`. The writer upholds this with `&mut` exclusivity; guarded
/// readers uphold it by holding the read section open.
#[inline]
pub(crate) unsafe fn decode<'g, V>(word: usize) -> NodeRef<'g, V> {
    if word == NULL_WORD {
        NodeRef::Empty
    } else if is_leaf(word) {
        // SAFETY: non-sentinel leaf words are produced only by `leaf_word`
        // from a live `&V`; the caller guarantees the borrow is still valid.
        NodeRef::Value(unsafe { &*((word & !LEAF_TAG) as *const V) })
    } else {
        // SAFETY: untagged words are produced only by `branch_word`; the
        // caller guarantees the node has not been reclaimed.
        NodeRef::Branch(unsafe { &*(word as *const Branch) })
    }
}

impl<V: crate::value::TrieValue> NodeRef<'_, V> {
    /// The key that orders this word's entire subtree relative to any index
    /// outside it: a leaf's own key, or a branch's owner prefix. `None` for
    /// the sentinel.
    ///
    /// For a branch that failed its prefix check against some index, every
    /// key underneath shares the owner prefix, so comparing the owner
    /// against that index classifies the whole subtree as below or above it.
    #[inline]
    pub(crate) fn subtree_key(&self) -> Option<u64> {
        match self {
            NodeRef::Empty => None,
            NodeRef::Value(v) => Some(v.key()),
            NodeRef::Branch(b) => Some(b.owner()),
        }
    }
}

/// An atomic cell holding one tagged word: the root slot or a branch child.
pub(crate) struct SlotCell(AtomicUsize);

impl SlotCell {
    pub(crate) const fn empty() -> Self {
        Self(AtomicUsize::new(NULL_WORD))
    }

    #[inline]
    pub(crate) fn load(&self, ord: Ordering) -> usize {
        self.0.load(ord)
    }

    #[inline]
    pub(crate) fn store(&self, word: usize, ord: Ordering) {
        self.0.store(word, ord);
    }
}

/// Trim `index` down to the prefix above the slice at shift `clev`, i.e.
/// clear bits `0..clev + WIDTH`. At the top level (`clev == 60`) the mask
/// shift wraps to zero and the prefix is empty, which is exactly right: the
/// root-level branch owns the whole key space.
#[inline]
pub(crate) fn trim_key(index: u64, clev: u8) -> u64 {
    index & ((COUNT as u64) << clev).wrapping_neg()
}

/// Bit shift of the `WIDTH`-bit slice in which `a` and `b` first disagree,
/// i.e. the level of the branch that must separate them.
#[inline]
pub(crate) fn diverging_level(a: u64, b: u64) -> u8 {
    debug_assert_ne!(a, b);
    let bit: u32 = 63 - (a ^ b).leading_zeros();
    ((bit / WIDTH) * WIDTH) as u8
}

/// An interior node: `COUNT` child slots discriminated by the `WIDTH`-bit
/// key slice at shift `clev`, plus the key prefix (`owner`) shared by every
/// leaf underneath and a population bitmap of non-empty slots.
///
/// `owner` and `clev` are immutable once the node is linked into a trie;
/// the popmap and child slots are only ever mutated by the single writer.
pub struct Branch {
    owner: u64,
    popmap: AtomicU16,
    clev: u8,
    children: [SlotCell; COUNT],
}

impl Default for Branch {
    /// A blank node: no owner prefix, level zero, every slot empty. The
    /// inserting writer fills in the real shape before linking it.
    fn default() -> Self {
        Self {
            owner: 0,
            popmap: AtomicU16::new(0),
            clev: 0,
            children: std::array::from_fn(|_| SlotCell::empty()),
        }
    }
}

impl Branch {
    /// Shape a blank node to discriminate the slice at `clev` on the path
    /// of `index`. Must only be called before the node is published.
    pub(crate) fn reset(&mut self, index: u64, clev: u8) {
        debug_assert_eq!(self.popmap.load(Ordering::Relaxed), 0);
        debug_assert_eq!(u32::from(clev) % WIDTH, 0);
        self.owner = trim_key(index, clev);
        self.clev = clev;
    }

    #[inline]
    pub(crate) fn owner(&self) -> u64 {
        self.owner
    }

    #[inline]
    pub(crate) fn clev(&self) -> u8 {
        self.clev
    }

    /// Child slot addressed by `index`. Meaningful only when this node
    /// covers `index`.
    #[inline]
    pub(crate) fn slot(&self, index: u64) -> usize {
        debug_assert!(self.covers(index).is_some());
        ((index >> self.clev) & MASK) as usize
    }

    /// Returns the child slot for `index` when this node's prefix covers
    /// it, or `None` when `index` lies outside the node's subtree (the
    /// "key barrier" test).
    #[inline]
    pub(crate) fn covers(&self, index: u64) -> Option<usize> {
        let off: u64 = index.wrapping_sub(self.owner) >> self.clev;
        if off < COUNT as u64 {
            Some(off as usize)
        } else {
            None
        }
    }

    #[inline]
    pub(crate) fn child(&self, slot: usize) -> &SlotCell {
        &self.children[slot]
    }

    #[inline]
    pub(crate) fn popmap(&self, ord: Ordering) -> u16 {
        self.popmap.load(ord)
    }

    /// Store `word` into the slot addressed by `index` and mark the slot
    /// populated. The slot must currently be empty.
    ///
    /// The child is stored before the popmap bit so a reader that observes
    /// the bit (with matching acquire/release ordering) also observes the
    /// child.
    pub(crate) fn attach(&self, index: u64, word: usize, ord: Ordering) {
        let slot: usize = self.slot(index);
        debug_assert_eq!(self.popmap(Ordering::Relaxed) & (1 << slot), 0);
        self.children[slot].store(word, ord);
        self.popmap.fetch_xor(1 << slot, ord);
    }

    /// Empty the slot addressed by `index` and clear its popmap bit. The
    /// bit is cleared before the child word so a racing popmap-guided
    /// reader drops the slot rather than chase the sentinel.
    pub(crate) fn detach(&self, index: u64, ord: Ordering) {
        let slot: usize = self.slot(index);
        debug_assert_ne!(self.popmap(Ordering::Relaxed) & (1 << slot), 0);
        self.popmap.fetch_xor(1 << slot, ord);
        self.children[slot].store(NULL_WORD, ord);
    }

    /// When exactly one child remains, its slot. A reachable branch with
    /// one child has lost path compression and must be collapsed.
    #[inline]
    pub(crate) fn sole_child_slot(&self, ord: Ordering) -> Option<usize> {
        let pm: u16 = self.popmap(ord);
        debug_assert_ne!(pm, 0);
        if pm.is_power_of_two() {
            Some(pm.trailing_zeros() as usize)
        } else {
            None
        }
    }
}

impl fmt::Debug for Branch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Branch")
            .field("owner", &format_args!("{:#x}", self.owner))
            .field("clev", &self.clev)
            .field(
                "popmap",
                &format_args!("{:#06x}", self.popmap.load(Ordering::Relaxed)),
            )
            .finish_non_exhaustive()
    }
}
