/*
 *  Copyright (C) 2025  Markus Elias Gerber
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  You should have received a copy of the GNU General Public License
 *  along with this program.  If not, see <https://www.gnu.org/licenses/>.
 */

/// A reclaimed region `[offset, offset + len)` inside of a page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FreeRange {
    pub(crate) offset: usize,
    pub(crate) len: usize,
}

impl FreeRange {
    #[inline]
    fn end(&self) -> usize {
        self.offset + self.len
    }
}

/// Sorted list of non-overlapping free ranges. Adjacent ranges are merged on insert.
#[derive(Debug, Default)]
pub(crate) struct FreeList {
    ranges: Vec<FreeRange>,
}

impl FreeList {
    pub(crate) fn new() -> Self {
        Self { ranges: Vec::new() }
    }

    /// Returns the range `[offset, offset + len)` to this list
    pub(crate) fn insert(&mut self, offset: usize, len: usize) {
        if len == 0 {
            return;
        }
        debug_assert!(
            !self.overlaps(offset, len),
            "range [{}, {}) is already free",
            offset,
            offset + len
        );

        let index = self.ranges.partition_point(|range| range.offset < offset);
        self.ranges.insert(index, FreeRange { offset, len });

        // merge with successor first, so `index` stays valid
        if index + 1 < self.ranges.len() && self.ranges[index].end() == self.ranges[index + 1].offset
        {
            self.ranges[index].len += self.ranges[index + 1].len;
            self.ranges.remove(index + 1);
        }
        if index > 0 && self.ranges[index - 1].end() == self.ranges[index].offset {
            self.ranges[index - 1].len += self.ranges[index].len;
            self.ranges.remove(index);
        }
    }

    /// Removes `len` bytes from the first range that is big enough
    /// and returns their offset
    pub(crate) fn take_first_fit(&mut self, len: usize) -> Option<usize> {
        let index = self.ranges.iter().position(|range| range.len >= len)?;
        let range = &mut self.ranges[index];
        let offset = range.offset;

        range.offset += len;
        range.len -= len;
        if range.len == 0 {
            self.ranges.remove(index);
        }

        Some(offset)
    }

    pub(crate) fn fits(&self, len: usize) -> bool {
        self.ranges.iter().any(|range| range.len >= len)
    }

    /// Returns `true` if any byte of `[offset, offset + len)` is free.
    /// An empty region counts as free if `offset` lies inside of a free range.
    pub(crate) fn overlaps(&self, offset: usize, len: usize) -> bool {
        let end = offset + len.max(1);
        self.ranges
            .iter()
            .any(|range| range.offset < end && offset < range.end())
    }

    /// Total amount of free bytes
    pub(crate) fn total(&self) -> usize {
        self.ranges.iter().map(|range| range.len).sum()
    }

    #[cfg(test)]
    pub(crate) fn ranges(&self) -> &[FreeRange] {
        &self.ranges
    }
}

#[cfg(test)]
mod test {
    use super::{FreeList, FreeRange};

    #[test]
    fn test_free_list_coalescing() {
        let mut list = FreeList::new();
        list.insert(20, 10);
        list.insert(0, 10);
        assert_eq!(list.ranges().len(), 2);

        // closes the gap between both ranges
        list.insert(10, 10);
        assert_eq!(list.ranges(), &[FreeRange { offset: 0, len: 30 }]);

        list.insert(40, 4);
        list.insert(30, 10);
        assert_eq!(list.ranges(), &[FreeRange { offset: 0, len: 44 }]);
        assert_eq!(list.total(), 44);
    }

    #[test]
    fn test_free_list_first_fit() {
        let mut list = FreeList::new();
        list.insert(0, 4);
        list.insert(8, 16);

        assert!(list.fits(16));
        assert!(!list.fits(17));

        assert_eq!(list.take_first_fit(8), Some(8));
        assert_eq!(list.take_first_fit(4), Some(0));
        assert_eq!(list.ranges(), &[FreeRange { offset: 16, len: 8 }]);
        assert_eq!(list.take_first_fit(9), None);
        assert_eq!(list.take_first_fit(8), Some(16));
        assert_eq!(list.total(), 0);
    }

    #[test]
    fn test_free_list_overlaps() {
        let mut list = FreeList::new();
        list.insert(10, 5);

        assert!(list.overlaps(12, 0));
        assert!(list.overlaps(8, 4));
        assert!(list.overlaps(14, 10));
        assert!(!list.overlaps(15, 4));
        assert!(!list.overlaps(6, 4));
    }
}
