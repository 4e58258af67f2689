//! Cursor and iterator tests over realistic scan patterns: bounded
//! resident runs, strided walks, relative jumps, and scans that insert
//! or remove while moving.

#![expect(clippy::unwrap_used, reason = "fail fast in tests")]

mod common;

use common::{Page, pages};
use pctrie::{NodeAllocator, PcTrie, TrieValue};

// =============================================================================
// Bounded scans
// =============================================================================

/// Walk a contiguous run of resident pages up to an exclusive end index.
#[test]
fn cursor_scans_a_contiguous_run() {
    let raw: Vec<u64> = (0x100..0x110).collect();
    let arena = pages(&raw);
    let mut trie: PcTrie<'_, Page> = PcTrie::new();

    for p in &arena {
        trie.insert(p).unwrap();
    }

    let mut cur = trie.cursor_limited(0x110);
    let mut run: Vec<u64> = Vec::new();

    let mut hit = cur.lookup_ge(0x100);
    while let Some(p) = hit {
        p.check();
        assert_eq!(cur.index(), Some(p.pindex));
        assert!(cur.value().is_some_and(|v| std::ptr::eq(v, p)));
        run.push(p.pindex);
        hit = cur.next();
    }

    assert_eq!(run, raw);
    assert!(cur.is_reset());
}

/// The limit caps forward movement only; backward and exact seeds pass.
#[test]
fn limited_cursor_stops_at_the_boundary() {
    let arena = pages(&[5, 9, 20, 21]);
    let mut trie: PcTrie<'_, Page> = PcTrie::new();

    for p in &arena {
        trie.insert(p).unwrap();
    }

    let mut cur = trie.cursor_limited(20);

    assert_eq!(cur.lookup_ge(0).map(Page::key), Some(5));
    assert_eq!(cur.next().map(Page::key), Some(9));
    assert!(cur.next().is_none(), "20 sits at the exclusive limit");
    assert!(cur.is_reset());

    // Backward movement ignores the limit.
    assert_eq!(cur.lookup_le(u64::MAX).map(Page::key), Some(21));
    assert_eq!(cur.prev().map(Page::key), Some(20));
    assert_eq!(cur.prev().map(Page::key), Some(9));

    // Fresh forward seeds are capped too.
    assert!(cur.lookup_ge(10).is_none());
    assert!(cur.is_reset());

    // Exact seeds are not forward movement.
    assert_eq!(cur.lookup(21).map(Page::key), Some(21));
}

/// A limited iterator yields exactly the keys below the bound.
#[test]
fn limited_iterator_end_to_end() {
    let raw: Vec<u64> = (0..64u64).map(|i| i.wrapping_mul(0x9E37_79B9_7F4A_7C15)).collect();
    let arena = pages(&raw);
    let mut trie: PcTrie<'_, Page> = PcTrie::new();

    for p in &arena {
        trie.insert(p).unwrap();
    }

    let mut sorted = raw.clone();
    sorted.sort_unstable();
    let limit = sorted[40];

    let walked: Vec<u64> = trie.iter_limited(limit).map(|p| p.pindex).collect();
    assert_eq!(walked, sorted[..40]);
}

// =============================================================================
// Strides and jumps
// =============================================================================

/// Stride across aligned entries, jump the gap to a high tail key, and
/// stop cleanly at the top of the key space.
#[test]
fn stride_walks_aligned_entries() {
    const STEP: u64 = 0x200;
    const TAIL: u64 = u64::MAX - (STEP - 1);

    let mut raw: Vec<u64> = (0..16u64).map(|i| i * STEP).collect();
    raw.push(TAIL);
    let arena = pages(&raw);
    let mut trie: PcTrie<'_, Page> = PcTrie::new();

    for p in &arena {
        trie.insert(p).unwrap();
    }

    let mut cur = trie.cursor();
    assert_eq!(cur.lookup(0).map(Page::key), Some(0));
    for i in 1..16u64 {
        assert_eq!(cur.stride(STEP).map(Page::key), Some(i * STEP));
    }

    // Nothing at 0x2000, so the stride seeks across the gap to the tail.
    assert_eq!(cur.stride(STEP).map(Page::key), Some(TAIL));

    // One more stride overflows the key space: the cursor reports
    // exhaustion but keeps its position.
    assert!(cur.stride(STEP).is_none());
    assert_eq!(cur.index(), Some(TAIL));

    // Stepping past the tail finds nothing and resets.
    assert!(cur.next().is_none());
    assert!(cur.is_reset());
}

/// Signed jumps land on the nearest present key on the requested side.
#[test]
fn jumps_move_relative_to_the_current_key() {
    let arena = pages(&[0x10, 0x20, 0x40, 0x80]);
    let mut trie: PcTrie<'_, Page> = PcTrie::new();

    for p in &arena {
        trie.insert(p).unwrap();
    }

    let mut cur = trie.cursor();
    assert_eq!(cur.lookup(0x20).map(Page::key), Some(0x20));

    // 0x20 + 0x15 = 0x35, first key at or above is 0x40.
    assert_eq!(cur.jump_ge(0x15).map(Page::key), Some(0x40));

    // 0x40 - 0x25 = 0x1b, last key at or below is 0x10.
    assert_eq!(cur.jump_le(-0x25).map(Page::key), Some(0x10));

    // 0x10 - 0x11 underflows: exhaustion without moving.
    assert!(cur.jump_le(-0x11).is_none());
    assert_eq!(cur.index(), Some(0x10));

    // Still seeded, so relative movement keeps working.
    assert_eq!(cur.jump_ge(0x10).map(Page::key), Some(0x20));
}

/// Walk down to key zero, bounce off the bottom of the key space, and
/// pivot back upward from the same position.
#[test]
fn reverse_scan_pivots_at_zero() {
    let raw: Vec<u64> = vec![0, 0x3, 0x30, 0x31, 0x300];
    let arena = pages(&raw);
    let mut trie: PcTrie<'_, Page> = PcTrie::new();

    for p in &arena {
        trie.insert(p).unwrap();
    }

    let mut cur = trie.cursor();
    let mut walked: Vec<u64> = Vec::new();

    let mut hit = cur.lookup_le(u64::MAX);
    while let Some(p) = hit {
        walked.push(p.pindex);
        if p.pindex == 0 {
            break;
        }
        hit = cur.prev();
    }

    let mut descending = raw.clone();
    descending.sort_unstable_by(|a, b| b.cmp(a));
    assert_eq!(walked, descending);

    // prev at zero underflows: the cursor stays parked on 0.
    assert!(cur.prev().is_none());
    assert_eq!(cur.index(), Some(0));

    assert_eq!(cur.next().map(Page::key), Some(0x3));
}

// =============================================================================
// Mutating scans
// =============================================================================

/// Insert the missing even keys while scanning the odd ones.
#[test]
fn cursor_mut_weaves_inserts_into_a_scan() {
    let raw: Vec<u64> = (0..=64u64).collect();
    let arena = pages(&raw);
    let mut trie: PcTrie<'_, Page> = PcTrie::new();

    {
        let mut cur = trie.cursor_mut();
        for k in (1..64).step_by(2) {
            cur.insert(&arena[k]).unwrap();
        }

        // Each insert seeds the cursor at the new key, so the scan
        // resumes one past it.
        let mut at = cur.lookup(1).map(Page::key);
        while let Some(k) = at {
            cur.insert(&arena[(k + 1) as usize]).unwrap();
            at = cur.next().map(Page::key);
        }
        assert!(cur.is_reset());
    }

    let walked: Vec<u64> = trie.iter().map(|p| p.pindex).collect();
    let expected: Vec<u64> = (1..=64u64).collect();
    assert_eq!(walked, expected);
}

/// Remove every fourth key in place during a forward scan.
#[test]
fn cursor_mut_prunes_while_scanning() {
    let raw: Vec<u64> = (0..32u64).collect();
    let arena = pages(&raw);
    let mut trie: PcTrie<'_, Page> = PcTrie::new();

    for p in &arena {
        trie.insert(p).unwrap();
    }

    {
        let mut cur = trie.cursor_mut();
        let mut hit = cur.lookup_ge(0);
        while let Some(p) = hit {
            if p.pindex % 4 == 0 {
                let gone = cur.remove();
                assert!(std::ptr::eq(gone, p));
                // The index stays seeded on the removed key.
                assert_eq!(cur.index(), Some(p.pindex));
                assert!(cur.value().is_none());
            }
            hit = cur.next();
        }
        assert!(cur.is_reset());
    }

    let walked: Vec<u64> = trie.iter().map(|p| p.pindex).collect();
    let expected: Vec<u64> = (0..32u64).filter(|k| k % 4 != 0).collect();
    assert_eq!(walked, expected);

    assert_eq!(trie.stats().branches, trie.allocator().outstanding());
}
