/// Which neighbour to report when the target falls between two entries.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SearchPolicy {
    AtOrBefore,
    AtOrAfter,
    Exact,
}

/// Index lookup in an ascending slice.
///
/// Returns `None` when no entry satisfies `policy`, e.g. a target below the
/// first entry with `AtOrBefore`.
pub fn binary_search(sorted: &[f64], target: f64, policy: SearchPolicy) -> Option<usize> {
    if sorted.is_empty() {
        return None;
    }
    match policy {
        SearchPolicy::AtOrBefore => {
            let after = sorted.partition_point(|v| *v <= target);
            after.checked_sub(1)
        }
        SearchPolicy::AtOrAfter => {
            let index = sorted.partition_point(|v| *v < target);
            (index < sorted.len()).then_some(index)
        }
        SearchPolicy::Exact => binary_search(sorted, target, SearchPolicy::AtOrBefore)
            .filter(|index| sorted[*index] == target),
    }
}
