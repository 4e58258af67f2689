//! Path-caching cursors and ordered iteration.
//!
//! A cursor remembers the branches between the root and the last visited
//! leaf, one per level at most. Stepping to a nearby key climbs that cached
//! path only as far as the keys force and descends from there, so a dense
//! scan costs amortized O(1) per step instead of a root walk. The same
//! climb-and-descend routines back the one-shot ordered lookups on
//! [`PcTrie`] and the guarded range scans of
//! [`TrieReader`](crate::TrieReader).

use std::ptr::NonNull;
use std::sync::atomic::Ordering;

use crate::alloc::{BoxAllocator, NodeAllocator};
use crate::node::{
    Branch, MAX_DEPTH, NULL_WORD, NodeRef, SlotCell, branch_ptr, branch_word, decode,
    diverging_level, is_leaf, leaf_word,
};
use crate::ordering::{INIT_ORD, LOCKED_ORD, WRITE_ORD};
use crate::tracing_helpers::trace_log;
use crate::trie::lookup::lookup_inner;
use crate::trie::{InsertError, PcTrie};
use crate::value::TrieValue;

const UNSEEDED: &str = "cursor is not seeded";

// ============================================================================
//  PathCache
// ============================================================================

/// The cached ancestry of the last visited position: branches from the
/// root side (index 0) down to the position's parent.
pub(crate) struct PathCache {
    nodes: [Option<NonNull<Branch>>; MAX_DEPTH],
    top: usize,
}

impl PathCache {
    pub(crate) const fn new() -> Self {
        Self {
            nodes: [None; MAX_DEPTH],
            top: 0,
        }
    }

    pub(crate) fn clear(&mut self) {
        self.top = 0;
    }

    fn push(&mut self, node: NonNull<Branch>) {
        debug_assert!(self.top < MAX_DEPTH);
        self.nodes[self.top] = Some(node);
        self.top += 1;
    }

    fn pop(&mut self) -> Option<NonNull<Branch>> {
        if self.top == 0 {
            return None;
        }
        self.top -= 1;
        self.nodes[self.top]
    }

    fn peek(&self) -> Option<NonNull<Branch>> {
        if self.top == 0 {
            None
        } else {
            self.nodes[self.top - 1]
        }
    }
}

// ============================================================================
//  Seek machinery
// ============================================================================

/// Walk as far down the path of `index` as the structure allows, reusing
/// `path`: cached ancestors that do not cover `index` are popped, the rest
/// restart the walk, and every covering branch entered on the way down is
/// pushed. Returns the terminal cell and the word loaded from it, which is
/// either a leaf word (possibly the sentinel) or a branch whose prefix
/// excludes `index`.
///
/// # Safety
///
/// Every node linked under `root` and every branch recorded in `path` must
/// be live for `'g`.
unsafe fn walk_down<'g>(
    root: &'g SlotCell,
    path: &mut PathCache,
    index: u64,
    ord: Ordering,
) -> (&'g SlotCell, usize) {
    let mut cell: &'g SlotCell = loop {
        let Some(top) = path.peek() else { break root };
        // SAFETY: path entries are live per the caller contract.
        let node: &'g Branch = unsafe { top.as_ref() };
        if let Some(slot) = node.covers(index) {
            break node.child(slot);
        }
        path.pop();
    };
    loop {
        let word: usize = cell.load(ord);
        if is_leaf(word) {
            return (cell, word);
        }
        // SAFETY: a non-leaf word is a branch pointer, live per the caller
        // contract.
        let node: &'g Branch = unsafe { branch_ptr(word).as_ref() };
        let Some(slot) = node.covers(index) else {
            return (cell, word);
        };
        path.push(NonNull::from(node));
        cell = node.child(slot);
    }
}

/// Find the value with the least key greater than or equal to `index`,
/// leaving `path` holding the found leaf's ancestry. `limit` is an
/// exclusive upper bound: landing on a key at or past it fails the seek.
/// On failure the path is cleared.
///
/// A concurrent remover can empty a slot or popmap under a guarded reader;
/// the walk treats that as the end of the structure and fails the seek,
/// which bounds the result to some recent state of the trie.
///
/// # Safety
///
/// As for [`walk_down`], and value referents must be live for `'g`.
pub(crate) unsafe fn seek_ge<'g, V>(
    root: &SlotCell,
    path: &mut PathCache,
    index: u64,
    limit: Option<u64>,
    ord: Ordering,
) -> Option<&'g V>
where
    V: TrieValue,
{
    // SAFETY: forwarded from the caller.
    let (_, terminal) = unsafe { walk_down(root, path, index, ord) };

    // Decide whether the terminal's subtree can hold a key >= index. A
    // leaf compares by its key; a prefix-excluded branch orders its whole
    // subtree by `owner`.
    // SAFETY: the word was loaded from a live slot.
    let mut word: usize = match unsafe { decode::<V>(terminal) } {
        NodeRef::Value(v) if v.key() >= index => terminal,
        NodeRef::Branch(b) if b.owner() > index => terminal,
        _ => loop {
            // Climb to the nearest ancestor with a populated slot to the
            // right of the key's own slot and step into the least one.
            let Some(top) = path.peek() else {
                path.clear();
                return None;
            };
            // SAFETY: path entries are live per the caller contract.
            let node: &Branch = unsafe { top.as_ref() };
            let slot: usize = node.slot(index);
            let above: u32 = u32::from(node.popmap(ord)) >> (slot + 1);
            if above != 0 {
                let next: usize = slot + 1 + above.trailing_zeros() as usize;
                break node.child(next).load(ord);
            }
            path.pop();
        },
    };

    // Descend to the least leaf of the chosen subtree.
    loop {
        // SAFETY: the word was loaded from a live slot.
        match unsafe { decode::<V>(word) } {
            NodeRef::Empty => break,
            NodeRef::Value(v) => {
                if limit.is_some_and(|l| v.key() >= l) {
                    break;
                }
                return Some(v);
            }
            NodeRef::Branch(b) => {
                if limit.is_some_and(|l| b.owner() >= l) {
                    break;
                }
                let pm: u16 = b.popmap(ord);
                if pm == 0 {
                    break;
                }
                path.push(NonNull::from(b));
                word = b.child(pm.trailing_zeros() as usize).load(ord);
            }
        }
    }
    path.clear();
    None
}

/// Find the value with the greatest key less than or equal to `index`,
/// leaving `path` holding the found leaf's ancestry. On failure the path
/// is cleared. Descending scans have no limit.
///
/// # Safety
///
/// As for [`seek_ge`].
pub(crate) unsafe fn seek_le<'g, V>(
    root: &SlotCell,
    path: &mut PathCache,
    index: u64,
    ord: Ordering,
) -> Option<&'g V>
where
    V: TrieValue,
{
    // SAFETY: forwarded from the caller.
    let (_, terminal) = unsafe { walk_down(root, path, index, ord) };

    // SAFETY: the word was loaded from a live slot.
    let mut word: usize = match unsafe { decode::<V>(terminal) } {
        NodeRef::Value(v) if v.key() <= index => terminal,
        NodeRef::Branch(b) if b.owner() < index => terminal,
        _ => loop {
            // Climb to the nearest ancestor populated to the left of the
            // key's slot and step into the greatest such child.
            let Some(top) = path.peek() else {
                path.clear();
                return None;
            };
            // SAFETY: path entries are live per the caller contract.
            let node: &Branch = unsafe { top.as_ref() };
            let slot: usize = node.slot(index);
            let below: u16 = node.popmap(ord) & ((1u16 << slot) - 1);
            if below != 0 {
                break node.child(below.ilog2() as usize).load(ord);
            }
            path.pop();
        },
    };

    // Descend to the greatest leaf of the chosen subtree.
    loop {
        // SAFETY: the word was loaded from a live slot.
        match unsafe { decode::<V>(word) } {
            NodeRef::Empty => break,
            NodeRef::Value(v) => return Some(v),
            NodeRef::Branch(b) => {
                let pm: u16 = b.popmap(ord);
                if pm == 0 {
                    break;
                }
                path.push(NonNull::from(b));
                word = b.child(pm.ilog2() as usize).load(ord);
            }
        }
    }
    path.clear();
    None
}

// ============================================================================
//  Cursor state machine
// ============================================================================

/// State shared by [`Cursor`] and [`CursorMut`].
struct CursorCore {
    path: PathCache,
    index: Option<u64>,
    limit: Option<u64>,
}

impl CursorCore {
    const fn new(limit: Option<u64>) -> Self {
        Self {
            path: PathCache::new(),
            index: None,
            limit,
        }
    }

    fn reset(&mut self) {
        self.index = None;
        self.path.clear();
    }

    fn seeded(&self) -> u64 {
        self.index.expect(UNSEEDED)
    }

    /// # Safety
    ///
    /// As for [`walk_down`], and value referents must be live for `'g`.
    unsafe fn lookup<'g, V>(&mut self, root: &SlotCell, index: u64) -> Option<&'g V>
    where
        V: TrieValue,
    {
        // SAFETY: forwarded from the caller.
        let (_, word) = unsafe { walk_down(root, &mut self.path, index, LOCKED_ORD) };
        // SAFETY: the word was loaded from a live slot.
        match unsafe { decode::<V>(word) } {
            NodeRef::Value(v) if v.key() == index => {
                self.index = Some(index);
                Some(v)
            }
            _ => {
                self.reset();
                None
            }
        }
    }

    /// # Safety
    ///
    /// As for [`seek_ge`].
    unsafe fn lookup_ge<'g, V>(&mut self, root: &SlotCell, index: u64) -> Option<&'g V>
    where
        V: TrieValue,
    {
        // SAFETY: forwarded from the caller.
        match unsafe { seek_ge::<V>(root, &mut self.path, index, self.limit, LOCKED_ORD) } {
            Some(v) => {
                self.index = Some(v.key());
                Some(v)
            }
            None => {
                self.index = None;
                None
            }
        }
    }

    /// # Safety
    ///
    /// As for [`seek_le`].
    unsafe fn lookup_le<'g, V>(&mut self, root: &SlotCell, index: u64) -> Option<&'g V>
    where
        V: TrieValue,
    {
        // SAFETY: forwarded from the caller.
        match unsafe { seek_le::<V>(root, &mut self.path, index, LOCKED_ORD) } {
            Some(v) => {
                self.index = Some(v.key());
                Some(v)
            }
            None => {
                self.index = None;
                None
            }
        }
    }
}

// ============================================================================
//  Cursor
// ============================================================================

/// A read-only position in a [`PcTrie`].
///
/// Seed it with [`lookup`](Self::lookup), [`lookup_ge`](Self::lookup_ge)
/// or [`lookup_le`](Self::lookup_le), then move relative to the last
/// visited key. A seek that finds nothing, or that lands at or past the
/// cursor's limit, resets the cursor; it must be re-seeded before the next
/// relative movement. Offset arithmetic that overflows the key space
/// reports exhaustion without moving the cursor.
pub struct Cursor<'t, 'a, V, A = BoxAllocator>
where
    A: NodeAllocator,
{
    trie: &'t PcTrie<'a, V, A>,
    core: CursorCore,
}

impl<'a, V, A> Cursor<'_, 'a, V, A>
where
    V: TrieValue,
    A: NodeAllocator,
{
    /// Seed the cursor at exactly `index`. A miss resets the cursor.
    pub fn lookup(&mut self, index: u64) -> Option<&'a V> {
        // SAFETY: the cursor borrows the trie, so linked nodes and path
        // entries stay live; values are borrowed for `'a`.
        unsafe { self.core.lookup(&self.trie.shared.root, index) }
    }

    /// Seed the cursor at the least present key greater than or equal to
    /// `index`. A miss, including a limit hit, resets the cursor.
    pub fn lookup_ge(&mut self, index: u64) -> Option<&'a V> {
        // SAFETY: as for `lookup`.
        unsafe { self.core.lookup_ge(&self.trie.shared.root, index) }
    }

    /// Seed the cursor at the greatest present key less than or equal to
    /// `index`. A miss resets the cursor.
    pub fn lookup_le(&mut self, index: u64) -> Option<&'a V> {
        // SAFETY: as for `lookup`.
        unsafe { self.core.lookup_le(&self.trie.shared.root, index) }
    }

    /// Move to the next greater present key.
    ///
    /// # Panics
    ///
    /// When the cursor is not seeded.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Option<&'a V> {
        let Some(target) = self.core.seeded().checked_add(1) else {
            return None;
        };
        self.lookup_ge(target)
    }

    /// Move to the next smaller present key.
    ///
    /// # Panics
    ///
    /// When the cursor is not seeded.
    pub fn prev(&mut self) -> Option<&'a V> {
        let Some(target) = self.core.seeded().checked_sub(1) else {
            return None;
        };
        self.lookup_le(target)
    }

    /// Advance by `delta` in key space and seed at the least present key
    /// from there.
    ///
    /// # Panics
    ///
    /// When the cursor is not seeded.
    pub fn stride(&mut self, delta: u64) -> Option<&'a V> {
        let Some(target) = self.core.seeded().checked_add(delta) else {
            return None;
        };
        self.lookup_ge(target)
    }

    /// Move by the signed offset `delta` and seed at the least present key
    /// greater than or equal to the landing point.
    ///
    /// # Panics
    ///
    /// When the cursor is not seeded.
    pub fn jump_ge(&mut self, delta: i64) -> Option<&'a V> {
        let Some(target) = self.core.seeded().checked_add_signed(delta) else {
            return None;
        };
        self.lookup_ge(target)
    }

    /// Move by the signed offset `delta` and seed at the greatest present
    /// key less than or equal to the landing point.
    ///
    /// # Panics
    ///
    /// When the cursor is not seeded.
    pub fn jump_le(&mut self, delta: i64) -> Option<&'a V> {
        let Some(target) = self.core.seeded().checked_add_signed(delta) else {
            return None;
        };
        self.lookup_le(target)
    }

    /// The value under the cursor's key, if still present. Does not move
    /// the cursor.
    ///
    /// # Panics
    ///
    /// When the cursor is not seeded.
    #[must_use]
    pub fn value(&self) -> Option<&'a V> {
        let index: u64 = self.core.seeded();
        // SAFETY: as for `lookup`.
        unsafe { lookup_inner(&self.trie.shared.root, index, LOCKED_ORD) }
    }

    /// The key the cursor is parked on, or `None` when reset.
    #[must_use]
    pub fn index(&self) -> Option<u64> {
        self.core.index
    }

    /// Forget the cursor's position and path.
    pub fn reset(&mut self) {
        self.core.reset();
    }

    /// True when the cursor holds no position and must be re-seeded.
    #[must_use]
    pub fn is_reset(&self) -> bool {
        self.core.index.is_none()
    }
}

// ============================================================================
//  CursorMut
// ============================================================================

/// A mutating position in a [`PcTrie`]: everything [`Cursor`] does, plus
/// insertion and removal through the cached path.
///
/// Holding one borrows the trie exclusively, so a scan can interleave
/// steps with structural edits without invalidating its own path: edits
/// made through the cursor keep the path in sync.
pub struct CursorMut<'t, 'a, V, A = BoxAllocator>
where
    A: NodeAllocator,
{
    trie: &'t mut PcTrie<'a, V, A>,
    core: CursorCore,
}

impl<'a, V, A> CursorMut<'_, 'a, V, A>
where
    V: TrieValue,
    A: NodeAllocator,
{
    /// Seed the cursor at exactly `index`. A miss resets the cursor.
    pub fn lookup(&mut self, index: u64) -> Option<&'a V> {
        // SAFETY: the cursor borrows the trie exclusively, so linked nodes
        // and path entries stay live; values are borrowed for `'a`.
        unsafe { self.core.lookup(&self.trie.shared.root, index) }
    }

    /// Seed the cursor at the least present key greater than or equal to
    /// `index`. A miss, including a limit hit, resets the cursor.
    pub fn lookup_ge(&mut self, index: u64) -> Option<&'a V> {
        // SAFETY: as for `lookup`.
        unsafe { self.core.lookup_ge(&self.trie.shared.root, index) }
    }

    /// Seed the cursor at the greatest present key less than or equal to
    /// `index`. A miss resets the cursor.
    pub fn lookup_le(&mut self, index: u64) -> Option<&'a V> {
        // SAFETY: as for `lookup`.
        unsafe { self.core.lookup_le(&self.trie.shared.root, index) }
    }

    /// Move to the next greater present key.
    ///
    /// # Panics
    ///
    /// When the cursor is not seeded.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Option<&'a V> {
        let Some(target) = self.core.seeded().checked_add(1) else {
            return None;
        };
        self.lookup_ge(target)
    }

    /// Move to the next smaller present key.
    ///
    /// # Panics
    ///
    /// When the cursor is not seeded.
    pub fn prev(&mut self) -> Option<&'a V> {
        let Some(target) = self.core.seeded().checked_sub(1) else {
            return None;
        };
        self.lookup_le(target)
    }

    /// Advance by `delta` in key space and seed at the least present key
    /// from there.
    ///
    /// # Panics
    ///
    /// When the cursor is not seeded.
    pub fn stride(&mut self, delta: u64) -> Option<&'a V> {
        let Some(target) = self.core.seeded().checked_add(delta) else {
            return None;
        };
        self.lookup_ge(target)
    }

    /// Move by the signed offset `delta` and seed at the least present key
    /// greater than or equal to the landing point.
    ///
    /// # Panics
    ///
    /// When the cursor is not seeded.
    pub fn jump_ge(&mut self, delta: i64) -> Option<&'a V> {
        let Some(target) = self.core.seeded().checked_add_signed(delta) else {
            return None;
        };
        self.lookup_ge(target)
    }

    /// Move by the signed offset `delta` and seed at the greatest present
    /// key less than or equal to the landing point.
    ///
    /// # Panics
    ///
    /// When the cursor is not seeded.
    pub fn jump_le(&mut self, delta: i64) -> Option<&'a V> {
        let Some(target) = self.core.seeded().checked_add_signed(delta) else {
            return None;
        };
        self.lookup_le(target)
    }

    /// The value under the cursor's key, if still present (removal through
    /// the cursor leaves it seeded at the removed key). Does not move the
    /// cursor.
    ///
    /// # Panics
    ///
    /// When the cursor is not seeded.
    #[must_use]
    pub fn value(&self) -> Option<&'a V> {
        let index: u64 = self.core.seeded();
        // SAFETY: as for `lookup`.
        unsafe { lookup_inner(&self.trie.shared.root, index, LOCKED_ORD) }
    }

    /// The key the cursor is parked on, or `None` when reset.
    #[must_use]
    pub fn index(&self) -> Option<u64> {
        self.core.index
    }

    /// Forget the cursor's position and path.
    pub fn reset(&mut self) {
        self.core.reset();
    }

    /// True when the cursor holds no position and must be re-seeded.
    #[must_use]
    pub fn is_reset(&self) -> bool {
        self.core.index.is_none()
    }

    /// Insert `value` and seed the cursor at its key.
    ///
    /// Reuses the cached path, so an insert in the middle of a scan costs
    /// a short climb instead of a root walk. Works on a reset cursor.
    ///
    /// # Errors
    ///
    /// As for [`PcTrie::insert`]; on error the cursor does not move.
    pub fn insert(&mut self, value: &'a V) -> Result<(), InsertError<'a, V>> {
        let index: u64 = value.key();
        let root: &SlotCell = &self.trie.shared.root;
        // SAFETY: the cursor borrows the trie exclusively, so linked nodes
        // and path entries stay live.
        let (cell, word) = unsafe { walk_down(root, &mut self.core.path, index, LOCKED_ORD) };
        // SAFETY: the word was loaded from a live slot.
        let (resident_word, resident_key): (usize, u64) = match unsafe { decode::<V>(word) } {
            NodeRef::Empty => {
                let leaf: usize = leaf_word(value);
                match self.core.path.peek() {
                    // SAFETY: path entries are live while the cursor holds
                    // the trie.
                    Some(parent) => unsafe { parent.as_ref() }.attach(index, leaf, WRITE_ORD),
                    None => cell.store(leaf, WRITE_ORD),
                }
                self.core.index = Some(index);
                return Ok(());
            }
            NodeRef::Value(v) => {
                if v.key() == index {
                    return Err(InsertError::Duplicate(v));
                }
                (word, v.key())
            }
            NodeRef::Branch(b) => (word, b.owner()),
        };

        let clev: u8 = diverging_level(index, resident_key);
        let Some(mut branch) = self.trie.allocator.alloc_branch() else {
            return Err(InsertError::AllocationFailed);
        };
        branch.reset(index, clev);
        branch.attach(index, leaf_word(value), INIT_ORD);
        branch.attach(resident_key, resident_word, INIT_ORD);
        let node: NonNull<Branch> = NonNull::from(Box::leak(branch));
        cell.store(branch_word(node), WRITE_ORD);
        self.core.path.push(node);
        self.core.index = Some(index);
        Ok(())
    }

    /// Remove the value under the cursor's key and return it. The cursor
    /// stays seeded at the removed key, so [`next`](Self::next) continues
    /// the scan past it.
    ///
    /// # Panics
    ///
    /// When the cursor is not seeded, or the key is no longer present.
    pub fn remove(&mut self) -> &'a V {
        let index: u64 = self.core.seeded();
        let root: &SlotCell = &self.trie.shared.root;
        // SAFETY: as for `insert`.
        let (_, word) = unsafe { walk_down(root, &mut self.core.path, index, LOCKED_ORD) };
        // SAFETY: the word was loaded from a live slot.
        let old: &'a V = match unsafe { decode::<V>(word) } {
            NodeRef::Value(v) if v.key() == index => v,
            _ => panic!("no value at the cursor for key {index:#x}"),
        };

        match self.core.path.peek() {
            None => root.store(NULL_WORD, WRITE_ORD),
            Some(parent_ptr) => {
                // SAFETY: path entries are live while the cursor holds the
                // trie.
                let parent: &Branch = unsafe { parent_ptr.as_ref() };
                parent.detach(index, WRITE_ORD);
                if let Some(slot) = parent.sole_child_slot(LOCKED_ORD) {
                    let survivor: usize = parent.child(slot).load(LOCKED_ORD);
                    self.core.path.pop();
                    match self.core.path.peek() {
                        Some(grand_ptr) => {
                            // SAFETY: as above.
                            let grand: &Branch = unsafe { grand_ptr.as_ref() };
                            grand.child(grand.slot(index)).store(survivor, WRITE_ORD);
                        }
                        None => root.store(survivor, WRITE_ORD),
                    }
                    trace_log!(
                        "collapsed branch {:#x} while removing key {index:#x}",
                        parent.owner()
                    );
                    let guard = self.trie.shared.collector.enter();
                    // SAFETY: the branch is unlinked, came from this
                    // allocator, and is retired exactly once.
                    unsafe { self.trie.allocator.retire_branch(parent_ptr, &guard) };
                }
            }
        }
        old
    }
}

// ============================================================================
//  Iter
// ============================================================================

/// Ascending key-order iterator over a trie's values.
pub struct Iter<'t, 'a, V, A = BoxAllocator>
where
    A: NodeAllocator,
{
    cursor: Cursor<'t, 'a, V, A>,
    started: bool,
}

impl<'a, V, A> Iterator for Iter<'_, 'a, V, A>
where
    V: TrieValue,
    A: NodeAllocator,
{
    type Item = &'a V;

    fn next(&mut self) -> Option<&'a V> {
        if !self.started {
            self.started = true;
            return self.cursor.lookup_ge(0);
        }
        if self.cursor.is_reset() {
            return None;
        }
        self.cursor.next()
    }
}

impl<'t, 'a, V, A> IntoIterator for &'t PcTrie<'a, V, A>
where
    V: TrieValue,
    A: NodeAllocator,
{
    type Item = &'a V;
    type IntoIter = Iter<'t, 'a, V, A>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

// ============================================================================
//  Constructors
// ============================================================================

impl<'a, V, A> PcTrie<'a, V, A>
where
    V: TrieValue,
    A: NodeAllocator,
{
    /// A read-only cursor with no position yet.
    #[must_use]
    pub fn cursor(&self) -> Cursor<'_, 'a, V, A> {
        Cursor {
            trie: self,
            core: CursorCore::new(None),
        }
    }

    /// A read-only cursor refusing every forward seek that would land on a
    /// key greater than or equal to `limit`. Backward movement is not
    /// bounded.
    #[must_use]
    pub fn cursor_limited(&self, limit: u64) -> Cursor<'_, 'a, V, A> {
        Cursor {
            trie: self,
            core: CursorCore::new(Some(limit)),
        }
    }

    /// A mutating cursor with no position yet.
    #[must_use]
    pub fn cursor_mut(&mut self) -> CursorMut<'_, 'a, V, A> {
        CursorMut {
            trie: self,
            core: CursorCore::new(None),
        }
    }

    /// A mutating cursor bounded like [`cursor_limited`](Self::cursor_limited).
    #[must_use]
    pub fn cursor_mut_limited(&mut self, limit: u64) -> CursorMut<'_, 'a, V, A> {
        CursorMut {
            trie: self,
            core: CursorCore::new(Some(limit)),
        }
    }

    /// Iterate every value in ascending key order.
    pub fn iter(&self) -> Iter<'_, 'a, V, A> {
        Iter {
            cursor: self.cursor(),
            started: false,
        }
    }

    /// Iterate values with keys below `limit` in ascending key order.
    pub fn iter_limited(&self, limit: u64) -> Iter<'_, 'a, V, A> {
        Iter {
            cursor: self.cursor_limited(limit),
            started: false,
        }
    }
}
