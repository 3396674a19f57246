//! LexoRank — string-based fractional ranks (spec §4.2).
//!
//! Pure functions over printable-ASCII strings; no I/O, no entity
//! knowledge. Byte-wise (`Ord` on `&str`) comparison of the strings this
//! module produces yields the intended display order, which is the whole
//! point: a drag-and-drop reorder only ever touches the rank of the moved
//! item, never its neighbors.

use rand::RngExt;
use std::time::{SystemTime, UNIX_EPOCH};

/// Length ceiling from spec §6 (`MAX_LEXORANK_LENGTH`). Exceeding it routes
/// through [`fallback_rank`] instead of [`next_after`]/[`midpoint`].
pub const MAX_LENGTH: usize = 32;

/// `nextAfter(last?) -> rank` (spec §4.2).
///
/// `None`/empty yields the seed rank `"m"` (the middle of the alphabet, so
/// there's room to insert before *and* after the first item). Otherwise the
/// last character is incremented, unless it's `'z'`, in which case an `'a'`
/// is appended — `"z"` becomes `"za"`, never wrapping back to `"a"`.
#[must_use]
pub fn next_after(last: Option<&str>) -> String {
    let Some(last) = last.filter(|s| !s.is_empty()) else {
        return "m".to_owned();
    };

    if last.len() >= MAX_LENGTH {
        return fallback_rank();
    }

    let mut chars: Vec<char> = last.chars().collect();
    let tail = chars.len() - 1;
    if chars[tail] == 'z' {
        let mut next = last.to_owned();
        next.push('a');
        next
    } else {
        let incremented = (chars[tail] as u8 + 1) as char;
        chars[tail] = incremented;
        chars.into_iter().collect()
    }
}

/// `midpoint(before, after) -> rank` (spec §4.2).
///
/// Appending `'a'` to `before` produces a string that is strictly greater
/// than `before` under byte comparison (any non-empty suffix is), and the
/// caller is responsible for only invoking this between two ranks where
/// `before < after` already holds, so the result still sorts ahead of
/// `after`. Grows the rank length by one per insertion between the same
/// pair — the length ceiling in [`MAX_LENGTH`] is what bounds that growth.
#[must_use]
pub fn midpoint(before: &str, after: &str) -> String {
    let _ = after; // retained for signature parity with the spec's contract
    if before.len() >= MAX_LENGTH {
        return fallback_rank();
    }
    let mut next = before.to_owned();
    next.push('a');
    next
}

/// `rebalance(items) -> items'` (spec §4.2).
///
/// `items` must already be sorted by current display order. Returns the new
/// rank for each position, using `alphabet[min(i, 25)]` as specified — lists
/// with more than 26 items share the terminal `'z'` rank for every item past
/// the 26th, which only matters once a board is due a second rebalance pass
/// (rebalance is re-run, not assumed stable, whenever ranks approach the
/// length ceiling again).
#[must_use]
pub fn rebalance(count: usize) -> Vec<String> {
    const ALPHABET: &[u8; 26] = b"abcdefghijklmnopqrstuvwxyz";
    (0..count)
        .map(|i| {
            let idx = i.min(25);
            (ALPHABET[idx] as char).to_string()
        })
        .collect()
}

/// Fallback rank used when a computed rank would exceed [`MAX_LENGTH`]
/// (spec §4.2). Sorts after any printable-ASCII rank because `'\u{FFFF}'`
/// encodes, in UTF-8, to bytes (`0xEF 0xBF 0xBF`) all greater than any
/// ASCII byte — and is unique enough for the common case of repeated
/// append-at-end operations on the same list.
#[must_use]
pub fn fallback_rank() -> String {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0);
    let mut rng = rand::rng();
    let suffix: u32 = rng.random();
    format!("\u{FFFF}{}-{:08x}", to_base36(now), suffix)
}

fn to_base36(mut value: u128) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if value == 0 {
        return "0".to_owned();
    }
    let mut buf = Vec::new();
    while value > 0 {
        let digit = (value % 36) as usize;
        buf.push(DIGITS[digit]);
        value /= 36;
    }
    buf.reverse();
    String::from_utf8(buf).unwrap_or_else(|_| "0".to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_after_none_returns_seed_rank() {
        assert_eq!(next_after(None), "m");
        assert_eq!(next_after(Some("")), "m");
    }

    #[test]
    fn next_after_increments_last_char() {
        assert_eq!(next_after(Some("m")), "n");
        assert_eq!(next_after(Some("a")), "b");
    }

    #[test]
    fn next_after_z_appends_a_instead_of_wrapping() {
        assert_eq!(next_after(Some("z")), "za");
        assert_eq!(next_after(Some("mz")), "mza");
    }

    #[test]
    fn next_after_preserves_byte_ordering() {
        let r1 = next_after(None);
        let r2 = next_after(Some(&r1));
        let r3 = next_after(Some(&r2));
        assert!(r1 < r2);
        assert!(r2 < r3);
    }

    #[test]
    fn midpoint_sorts_strictly_between() {
        let before = "m";
        let after = "n";
        let mid = midpoint(before, after);
        assert!(before < mid.as_str());
        assert!(mid.as_str() < after);
    }

    #[test]
    fn midpoint_grows_length_per_insertion() {
        let before = "m";
        let mid1 = midpoint(before, "n");
        let mid2 = midpoint(&mid1, "n");
        assert_eq!(mid1.len(), before.len() + 1);
        assert_eq!(mid2.len(), mid1.len() + 1);
        assert!(mid1.as_str() < mid2.as_str());
        assert!(mid2.as_str() < "n");
    }

    #[test]
    fn rebalance_assigns_alphabet_ranks_in_order() {
        let ranks = rebalance(5);
        assert_eq!(ranks, vec!["a", "b", "c", "d", "e"]);
        for window in ranks.windows(2) {
            assert!(window[0] < window[1]);
        }
    }

    #[test]
    fn rebalance_caps_index_at_25() {
        let ranks = rebalance(28);
        assert_eq!(ranks[25], "z");
        assert_eq!(ranks[26], "z");
        assert_eq!(ranks[27], "z");
    }

    #[test]
    fn rebalance_is_idempotent_after_one_pass() {
        let first = rebalance(10);
        // A second rebalance over the same count always reproduces the same
        // assignment (spec §8 round-trip property).
        let second = rebalance(first.len());
        assert_eq!(first, second);
    }

    #[test]
    fn fallback_rank_sorts_after_any_printable_ascii_rank() {
        let fallback = fallback_rank();
        assert!(fallback.starts_with('\u{FFFF}'));
        assert!("zzzzzzzz" < fallback.as_str());
    }

    #[test]
    fn next_after_at_length_ceiling_uses_fallback() {
        let long = "a".repeat(MAX_LENGTH);
        let next = next_after(Some(&long));
        assert!(next.starts_with('\u{FFFF}'));
    }

    #[test]
    fn base36_round_trip_is_monotonic_for_increasing_input() {
        assert!(to_base36(100) < to_base36(101) || to_base36(100).len() < to_base36(101).len());
        assert_eq!(to_base36(0), "0");
    }
}
