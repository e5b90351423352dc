//! Binary search utilities shared by the advance kernels and graph accessors

/// Rightmost position whose value is `<= key` in a sorted slice
///
/// Returns `values.len()` when no such position exists (every value is
/// greater than `key`, including the empty slice). Equal runs resolve to
/// their last element, which is how a zero-degree element shares its offset
/// with the next element without ever owning a slot.
///
/// ```
/// use trueno_frontier::search::rightmost;
///
/// // Exclusive scan of degrees [0, 2, 3]
/// let offsets = [0, 0, 2];
/// assert_eq!(rightmost(&offsets, 0), 1);
/// assert_eq!(rightmost(&offsets, 1), 1);
/// assert_eq!(rightmost(&offsets, 4), 2);
/// ```
#[must_use]
pub fn rightmost<T: Copy + PartialOrd>(values: &[T], key: T) -> usize {
    let upper = upper_bound(values, key);
    if upper == 0 {
        values.len()
    } else {
        upper - 1
    }
}

/// First position whose value is `> key` in a sorted slice
#[must_use]
pub fn upper_bound<T: Copy + PartialOrd>(values: &[T], key: T) -> usize {
    let mut lo = 0;
    let mut hi = values.len();
    while lo < hi {
        let mid = lo + (hi - lo) / 2;
        if values[mid] <= key {
            lo = mid + 1;
        } else {
            hi = mid;
        }
    }
    lo
}

/// First position whose value is `>= key` in a sorted slice
#[must_use]
pub fn lower_bound<T: Copy + PartialOrd>(values: &[T], key: T) -> usize {
    let mut lo = 0;
    let mut hi = values.len();
    while lo < hi {
        let mid = lo + (hi - lo) / 2;
        if values[mid] < key {
            lo = mid + 1;
        } else {
            hi = mid;
        }
    }
    lo
}

/// Merge-path diagonal search (Merrill & Garland, SC 2016)
///
/// Merges the row-end offsets `row_ends` (sorted, `row_ends[i]` is one past
/// the last output slot of element `i`) with the natural numbers
/// `0..num_items`. Returns the number of rows consumed at `diagonal`; the
/// number of items consumed is `diagonal - rows`.
#[must_use]
pub fn merge_path<F>(diagonal: usize, num_rows: usize, num_items: usize, row_ends: F) -> usize
where
    F: Fn(usize) -> usize,
{
    let mut lo = diagonal.saturating_sub(num_items);
    let mut hi = diagonal.min(num_rows);
    while lo < hi {
        let mid = lo + (hi - lo) / 2;
        // Item `diagonal - mid - 1` is merged before row `mid` ends
        if row_ends(mid) <= diagonal - mid - 1 {
            lo = mid + 1;
        } else {
            hi = mid;
        }
    }
    lo
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rightmost_skips_empty_runs() {
        // degrees [2, 0, 0, 3] -> offsets [0, 2, 2, 2]
        let offsets = [0_usize, 2, 2, 2];
        assert_eq!(rightmost(&offsets, 0), 0);
        assert_eq!(rightmost(&offsets, 1), 0);
        assert_eq!(rightmost(&offsets, 2), 3);
        assert_eq!(rightmost(&offsets, 4), 3);
    }

    #[test]
    fn test_rightmost_no_match() {
        let offsets = [5_usize, 6];
        assert_eq!(rightmost(&offsets, 1), offsets.len());
        let empty: [usize; 0] = [];
        assert_eq!(rightmost(&empty, 0), 0);
    }

    #[test]
    fn test_bounds() {
        let values = [0_u32, 2, 2, 3, 3];
        assert_eq!(upper_bound(&values, 2), 3);
        assert_eq!(lower_bound(&values, 2), 1);
        assert_eq!(upper_bound(&values, 9), 5);
        assert_eq!(lower_bound(&values, 0), 0);
    }

    #[test]
    fn test_merge_path_diagonals() {
        // degrees [2, 0, 1] -> row ends [2, 2, 3], 3 items
        let row_ends = [2_usize, 2, 3];
        let f = |i: usize| row_ends[i];

        assert_eq!(merge_path(0, 3, 3, f), 0);
        // Items 0 and 1 come before row 0 ends
        assert_eq!(merge_path(2, 3, 3, f), 0);
        assert_eq!(merge_path(3, 3, 3, f), 1);
        // Row 1 is empty and ends right after row 0
        assert_eq!(merge_path(4, 3, 3, f), 2);
        assert_eq!(merge_path(6, 3, 3, f), 3);
    }
}
