//! Id allocation shared by fragments and hidden elements
//!
//! Ids are handed out from a counter so a removed id is never reused. Saved
//! data may carry ids up to `u64::MAX`; once the counter cannot advance any
//! further the lowest id not currently in use is handed out instead.

use std::collections::BTreeSet;

/// Next counter value after `taken`, `None` when it would overflow
pub fn next_after(taken: &BTreeSet<u64>) -> Option<u64> {
    match taken.last() {
        Some(max) => max.checked_add(1),
        None => Some(1),
    }
}

/// Lowest non-zero id absent from `taken`
pub fn lowest_free(taken: &BTreeSet<u64>) -> u64 {
    let mut candidate = 1;
    for &id in taken.range(1..) {
        if id != candidate {
            break;
        }
        candidate += 1;
    }
    candidate
}

/// Issue an id from `counter`, falling back to the lowest free id once the
/// counter is exhausted
pub fn issue(counter: &mut Option<u64>, taken: &BTreeSet<u64>) -> u64 {
    match *counter {
        Some(id) if !taken.contains(&id) => {
            *counter = id.checked_add(1);
            id
        }
        _ => {
            *counter = None;
            let id = lowest_free(taken);
            log::warn!("Id counter exhausted, reusing free id {}", id);
            id
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_after() {
        assert_eq!(next_after(&BTreeSet::new()), Some(1));
        assert_eq!(next_after(&BTreeSet::from([3, 9])), Some(10));
        assert_eq!(next_after(&BTreeSet::from([u64::MAX])), None);
    }

    #[test]
    fn test_lowest_free_skips_taken_ids() {
        assert_eq!(lowest_free(&BTreeSet::new()), 1);
        assert_eq!(lowest_free(&BTreeSet::from([1, 2, 4, u64::MAX])), 3);
        assert_eq!(lowest_free(&BTreeSet::from([0, 1])), 2);
    }

    #[test]
    fn test_issue_at_the_top_of_the_range() {
        let mut counter = Some(u64::MAX);
        let taken = BTreeSet::from([1]);

        assert_eq!(issue(&mut counter, &taken), u64::MAX);
        assert_eq!(counter, None);

        let taken = BTreeSet::from([1, u64::MAX]);
        assert_eq!(issue(&mut counter, &taken), 2);
        assert_eq!(counter, None);
    }
}
