//! Branch-node allocation and deferred release.
//!
//! The trie allocates exactly one [`Branch`] per structural insert and
//! releases branches only when removal collapses them or the whole trie is
//! reclaimed. Released branches are never freed synchronously: a guarded
//! reader may still be traversing one, so they are retired through the
//! trie's `seize` collector and reclaimed once every read section that
//! could observe them has ended.
//!
//! Nodes are heap boxes (`Box::into_raw` on hand-out, `Box::from_raw` in
//! the deferred reclaimer) so provenance stays clean under miri.

use std::ptr::NonNull;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::Mutex;
use seize::{Guard, LocalGuard};

use crate::node::Branch;

/// Supplier of branch nodes for a [`PcTrie`](crate::PcTrie).
///
/// Implementations may fail allocation (quota, fault injection); the trie
/// reports that to its caller with the structure untouched.
pub trait NodeAllocator {
    /// Allocate one blank branch node. `None` reports exhaustion.
    fn alloc_branch(&mut self) -> Option<Box<Branch>>;

    /// Release a branch that has been unlinked from the trie. The memory
    /// is reclaimed through `guard`'s collector once no read section that
    /// might still observe the node remains active.
    ///
    /// # Safety
    ///
    /// - `node` must have come from [`alloc_branch`](Self::alloc_branch) on
    ///   this allocator, converted with `Box::into_raw`.
    /// - `node` must be unreachable from the trie by any new traversal.
    /// - `node` must be retired at most once.
    unsafe fn retire_branch(&self, node: NonNull<Branch>, guard: &LocalGuard<'_>) {
        // SAFETY: per the contract above, `node` is an unlinked
        // `Box::into_raw` pointer retired exactly once.
        unsafe {
            guard.defer_retire(node.as_ptr(), |p, _| {
                drop(Box::from_raw(p));
            });
        }
    }

    /// Number of branches handed out and not yet retired. Diagnostic; the
    /// default implementation does not track and reports zero.
    fn outstanding(&self) -> usize {
        0
    }
}

/// Heap allocator that tracks the branches it has handed out.
///
/// The tracked set holds addresses, not owning pointers: ownership of a
/// node's memory belongs to the trie while linked and to the collector
/// after retirement. The set exists so tests and diagnostics can observe
/// the live branch count.
pub struct BoxAllocator {
    live: Mutex<Vec<usize>>,
}

impl BoxAllocator {
    /// Create a new allocator.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            live: Mutex::new(Vec::new()),
        }
    }
}

impl Default for BoxAllocator {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for BoxAllocator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoxAllocator")
            .field("outstanding", &self.live.lock().len())
            .finish()
    }
}

impl NodeAllocator for BoxAllocator {
    fn alloc_branch(&mut self) -> Option<Box<Branch>> {
        let node: Box<Branch> = Box::new(Branch::default());
        self.live.lock().push(std::ptr::from_ref(&*node) as usize);
        Some(node)
    }

    unsafe fn retire_branch(&self, node: NonNull<Branch>, guard: &LocalGuard<'_>) {
        let addr: usize = node.as_ptr() as usize;
        let mut live = self.live.lock();
        let pos: Option<usize> = live.iter().position(|&a| a == addr);
        debug_assert!(pos.is_some(), "retiring a branch this allocator never handed out");
        if let Some(pos) = pos {
            live.swap_remove(pos);
        }
        drop(live);
        // SAFETY: caller upholds the trait contract; the node came from
        // `alloc_branch` via `Box::into_raw` and is unreachable.
        unsafe {
            guard.defer_retire(node.as_ptr(), |p, _| {
                drop(Box::from_raw(p));
            });
        }
    }

    fn outstanding(&self) -> usize {
        self.live.lock().len()
    }
}

/// Allocator with a hard node quota, for exhaustion handling and fault
/// injection in tests.
pub struct QuotaAllocator {
    inner: BoxAllocator,
    remaining: AtomicUsize,
}

impl QuotaAllocator {
    /// Allocator that will satisfy at most `quota` further allocations.
    #[must_use]
    pub const fn new(quota: usize) -> Self {
        Self {
            inner: BoxAllocator::new(),
            remaining: AtomicUsize::new(quota),
        }
    }

    /// Grant `n` further allocations.
    pub fn refill(&self, n: usize) {
        self.remaining.fetch_add(n, Ordering::Relaxed);
    }

    /// Allocations left before `alloc_branch` starts failing.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.remaining.load(Ordering::Relaxed)
    }
}

impl NodeAllocator for QuotaAllocator {
    fn alloc_branch(&mut self) -> Option<Box<Branch>> {
        self.remaining
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |n| n.checked_sub(1))
            .ok()?;
        self.inner.alloc_branch()
    }

    unsafe fn retire_branch(&self, node: NonNull<Branch>, guard: &LocalGuard<'_>) {
        // SAFETY: forwarded contract.
        unsafe { self.inner.retire_branch(node, guard) }
    }

    fn outstanding(&self) -> usize {
        self.inner.outstanding()
    }
}
