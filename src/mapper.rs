//! Global column addressing across table segments.
//!
//! A table's columns are numbered contiguously across its segments. The
//! mapper translates a global column index, forward or reverse, into the
//! owning segment and the column's position inside that segment.

use crate::error::{Error, Result};

/// Location of a global column inside the segment structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ColumnLocation {
    /// Position of the owning segment.
    pub segment: usize,
    /// Column position inside the segment.
    pub local: usize,
}

/// Resolves global column indices against per-segment column counts.
///
/// # Example
///
/// ```
/// use mosaic::ColumnIndexMapper;
///
/// let mapper = ColumnIndexMapper::new(vec![2, 3]);
/// let loc = mapper.resolve(2).unwrap();
/// assert_eq!((loc.segment, loc.local), (1, 0));
/// let loc = mapper.resolve(-1).unwrap();
/// assert_eq!((loc.segment, loc.local), (1, 2));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnIndexMapper {
    n_cols_per_segment: Vec<usize>,
    /// Cumulative column offsets, `n_arrs + 1` entries starting at 0
    offsets: Vec<usize>,
}

impl ColumnIndexMapper {
    /// Build a mapper from the column count of each segment, in order.
    pub fn new(n_cols_per_segment: Vec<usize>) -> Self {
        let mut offsets = Vec::with_capacity(n_cols_per_segment.len() + 1);
        offsets.push(0);
        let mut offset = 0;
        for n in &n_cols_per_segment {
            offset += n;
            offsets.push(offset);
        }
        Self {
            n_cols_per_segment,
            offsets,
        }
    }

    /// Total column count.
    #[inline]
    pub fn n_cols(&self) -> usize {
        self.offsets.last().copied().unwrap_or(0)
    }

    /// Column count of each segment.
    #[inline]
    pub fn n_cols_per_segment(&self) -> &[usize] {
        &self.n_cols_per_segment
    }

    /// Resolve a global column index to its segment and local column.
    ///
    /// Non-negative indices walk segments front to back; negative indices
    /// count from the end and walk segments back to front, so `resolve(-k)`
    /// and `resolve(n_cols - k)` always agree.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ColumnIndexOutOfBounds`] unless
    /// `-n_cols <= index < n_cols`.
    pub fn resolve(&self, index: isize) -> Result<ColumnLocation> {
        let n_cols = self.n_cols();
        let out_of_bounds = || Error::ColumnIndexOutOfBounds { index, n_cols };

        if index >= 0 {
            let mut remaining = index.unsigned_abs();
            for (segment, &count) in self.n_cols_per_segment.iter().enumerate() {
                if remaining < count {
                    return Ok(ColumnLocation {
                        segment,
                        local: remaining,
                    });
                }
                remaining -= count;
            }
            Err(out_of_bounds())
        } else {
            // -1 is the last column of the last segment
            let mut remaining = index.unsigned_abs();
            for (segment, &count) in self.n_cols_per_segment.iter().enumerate().rev() {
                if remaining <= count {
                    return Ok(ColumnLocation {
                        segment,
                        local: count - remaining,
                    });
                }
                remaining -= count;
            }
            Err(out_of_bounds())
        }
    }

    /// Resolve a non-negative global column index by binary search over the
    /// cumulative offsets.
    ///
    /// Equivalent to [`ColumnIndexMapper::resolve`] for in-range indices.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ColumnIndexOutOfBounds`] if `index >= n_cols`.
    pub fn locate(&self, index: usize) -> Result<ColumnLocation> {
        let n_cols = self.n_cols();
        if index >= n_cols {
            return Err(Error::ColumnIndexOutOfBounds {
                index: isize::try_from(index).unwrap_or(isize::MAX),
                n_cols,
            });
        }

        // The last offset equal to or below `index` starts the owning segment;
        // empty segments never occur, so offsets are strictly increasing
        let segment = match self.offsets.binary_search(&index) {
            Ok(idx) => idx,
            Err(idx) => idx.saturating_sub(1),
        };
        let start = self.offsets.get(segment).copied().unwrap_or(0);

        Ok(ColumnLocation {
            segment,
            local: index - start,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loc(segment: usize, local: usize) -> ColumnLocation {
        ColumnLocation { segment, local }
    }

    #[test]
    fn test_two_segment_scenario() {
        let mapper = ColumnIndexMapper::new(vec![2, 3]);
        assert_eq!(mapper.n_cols(), 5);
        assert_eq!(mapper.resolve(2).unwrap(), loc(1, 0));
        assert_eq!(mapper.resolve(-1).unwrap(), loc(1, 2));
    }

    #[test]
    fn test_forward_boundaries() {
        let mapper = ColumnIndexMapper::new(vec![2, 1, 3]);
        assert_eq!(mapper.resolve(0).unwrap(), loc(0, 0));
        assert_eq!(mapper.resolve(1).unwrap(), loc(0, 1));
        assert_eq!(mapper.resolve(2).unwrap(), loc(1, 0));
        assert_eq!(mapper.resolve(3).unwrap(), loc(2, 0));
        assert_eq!(mapper.resolve(5).unwrap(), loc(2, 2));
    }

    #[test]
    fn test_reverse_boundaries() {
        let mapper = ColumnIndexMapper::new(vec![2, 1, 3]);
        assert_eq!(mapper.resolve(-3).unwrap(), loc(2, 0));
        assert_eq!(mapper.resolve(-4).unwrap(), loc(1, 0));
        assert_eq!(mapper.resolve(-5).unwrap(), loc(0, 1));
        assert_eq!(mapper.resolve(-6).unwrap(), loc(0, 0));
    }

    #[test]
    fn test_negative_matches_positive() {
        let mapper = ColumnIndexMapper::new(vec![4, 1, 1, 5]);
        let n = mapper.n_cols() as isize;
        for k in 0..n {
            assert_eq!(mapper.resolve(k).unwrap(), mapper.resolve(k - n).unwrap());
        }
    }

    #[test]
    fn test_locate_matches_resolve() {
        let mapper = ColumnIndexMapper::new(vec![3, 2, 4]);
        for k in 0..mapper.n_cols() {
            assert_eq!(mapper.locate(k).unwrap(), mapper.resolve(k as isize).unwrap());
        }
    }

    #[test]
    fn test_out_of_bounds() {
        let mapper = ColumnIndexMapper::new(vec![2, 3]);
        assert!(matches!(
            mapper.resolve(5),
            Err(Error::ColumnIndexOutOfBounds { index: 5, n_cols: 5 })
        ));
        assert!(matches!(
            mapper.resolve(-6),
            Err(Error::ColumnIndexOutOfBounds { index: -6, n_cols: 5 })
        ));
        assert!(mapper.locate(5).is_err());
    }

    #[test]
    fn test_single_segment() {
        let mapper = ColumnIndexMapper::new(vec![1]);
        assert_eq!(mapper.resolve(0).unwrap(), loc(0, 0));
        assert_eq!(mapper.resolve(-1).unwrap(), loc(0, 0));
        assert!(mapper.resolve(1).is_err());
    }
}
