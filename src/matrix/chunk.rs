//! Even splitting of an ordered list into buckets

/// Split `items` into `buckets` contiguous slices of near-equal size.
///
/// Fewer than two buckets never splits: the whole input comes back as one
/// slice, even when it is empty. Otherwise sizes are computed greedily as
/// `ceil(remaining items / remaining buckets)`, so larger slices come first
/// and no two slices differ by more than one item.
///
/// An empty input yields no slices at all when `buckets >= 2`, and an input
/// shorter than `buckets` yields one single-item slice per item.
pub fn chunk<T>(items: &[T], buckets: usize) -> Vec<&[T]> {
    if buckets < 2 {
        return vec![items];
    }

    let len = items.len();
    let mut result = Vec::with_capacity(buckets.min(len));
    let mut start = 0;

    if len % buckets == 0 {
        let size = len / buckets;
        while start < len {
            result.push(&items[start..start + size]);
            start += size;
        }
    } else {
        let mut remaining = buckets;
        while start < len {
            let size = (len - start).div_ceil(remaining);
            result.push(&items[start..start + size]);
            start += size;
            remaining -= 1;
        }
    }

    result
}
