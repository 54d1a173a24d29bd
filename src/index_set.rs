//! Ordered set of unsigned indexes
//!
//! Backs the selected column/row sets and the payloads of move
//! notifications. Besides the usual set operations it knows how indexes
//! shift when a group of columns or rows is moved to a new position.

use std::collections::BTreeSet;
use std::ops::RangeInclusive;

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct IndexSet {
    indexes: BTreeSet<usize>,
}

impl IndexSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(index: usize) -> Self {
        let mut indexes = BTreeSet::new();
        indexes.insert(index);
        Self { indexes }
    }

    /// Closed interval between two indexes, in either order
    pub fn from_range(a: usize, b: usize) -> Self {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        Self {
            indexes: (lo..=hi).collect(),
        }
    }

    /// `0..count`, empty when `count == 0`
    pub fn all(count: usize) -> Self {
        Self {
            indexes: (0..count).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.indexes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indexes.is_empty()
    }

    pub fn contains(&self, index: usize) -> bool {
        self.indexes.contains(&index)
    }

    pub fn first(&self) -> Option<usize> {
        self.indexes.first().copied()
    }

    pub fn last(&self) -> Option<usize> {
        self.indexes.last().copied()
    }

    pub fn insert(&mut self, index: usize) -> bool {
        self.indexes.insert(index)
    }

    pub fn remove(&mut self, index: usize) -> bool {
        self.indexes.remove(&index)
    }

    /// Flip membership; returns true if the index is now present
    pub fn toggle(&mut self, index: usize) -> bool {
        if self.indexes.remove(&index) {
            false
        } else {
            self.indexes.insert(index);
            true
        }
    }

    pub fn clear(&mut self) {
        self.indexes.clear();
    }

    pub fn union(&self, other: &IndexSet) -> IndexSet {
        Self {
            indexes: self.indexes.union(&other.indexes).copied().collect(),
        }
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = usize> + '_ {
        self.indexes.iter().copied()
    }

    /// Number of members strictly below `index`
    pub fn count_below(&self, index: usize) -> usize {
        self.indexes.range(..index).count()
    }

    /// Drop every member `>= limit`
    pub fn retain_below(&mut self, limit: usize) {
        self.indexes.retain(|&i| i < limit);
    }

    /// True when the members form one gap-free run
    pub fn is_contiguous(&self) -> bool {
        match (self.first(), self.last()) {
            (Some(first), Some(last)) => last - first + 1 == self.len(),
            _ => true,
        }
    }

    /// Maximal gap-free runs, in ascending order
    pub fn ranges(&self) -> Vec<RangeInclusive<usize>> {
        let mut runs = Vec::new();
        let mut iter = self.iter();
        let Some(mut start) = iter.next() else {
            return runs;
        };
        let mut end = start;
        for index in iter {
            if index == end + 1 {
                end = index;
            } else {
                runs.push(start..=end);
                start = index;
                end = index;
            }
        }
        runs.push(start..=end);
        runs
    }

    /// Where `index` ends up after the members of `self` are moved so
    /// they are inserted before `dest` (pre-move coordinates).
    ///
    /// Moved members keep their relative order and become one block.
    pub fn position_after_move(&self, index: usize, dest: usize) -> usize {
        let block_start = dest - self.count_below(dest);
        if self.contains(index) {
            return block_start + self.count_below(index);
        }
        let moved_before = self.count_below(index);
        if index < dest {
            index - moved_before
        } else {
            index - moved_before + self.len()
        }
    }

    /// New indexes of the moved members themselves
    pub fn moved_to(&self, dest: usize) -> IndexSet {
        let block_start = dest - self.count_below(dest);
        Self {
            indexes: (block_start..block_start + self.len()).collect(),
        }
    }

    /// Remap an arbitrary set through a move of `moved` to `dest`
    pub fn remapped(&self, moved: &IndexSet, dest: usize) -> IndexSet {
        self.iter()
            .map(|i| moved.position_after_move(i, dest))
            .collect()
    }

    /// True when moving these members to `dest` would leave the order as it is
    pub fn is_noop_move(&self, dest: usize) -> bool {
        match self.first() {
            Some(first) => self.is_contiguous() && dest - self.count_below(dest) == first,
            None => true,
        }
    }
}

impl FromIterator<usize> for IndexSet {
    fn from_iter<T: IntoIterator<Item = usize>>(iter: T) -> Self {
        Self {
            indexes: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a IndexSet {
    type Item = &'a usize;
    type IntoIter = std::collections::btree_set::Iter<'a, usize>;

    fn into_iter(self) -> Self::IntoIter {
        self.indexes.iter()
    }
}

impl From<RangeInclusive<usize>> for IndexSet {
    fn from(range: RangeInclusive<usize>) -> Self {
        range.collect()
    }
}

impl<const N: usize> From<[usize; N]> for IndexSet {
    fn from(items: [usize; N]) -> Self {
        items.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_range_either_order() {
        assert_eq!(IndexSet::from_range(3, 1), IndexSet::from([1, 2, 3]));
        assert_eq!(IndexSet::from_range(2, 2), IndexSet::single(2));
    }

    #[test]
    fn test_toggle() {
        let mut set = IndexSet::from([1, 3]);
        assert!(set.toggle(2));
        assert!(!set.toggle(3));
        assert_eq!(set, IndexSet::from([1, 2]));
    }

    #[test]
    fn test_ranges() {
        let set = IndexSet::from([0, 1, 2, 5, 7, 8]);
        assert_eq!(set.ranges(), vec![0..=2, 5..=5, 7..=8]);
        assert!(IndexSet::new().ranges().is_empty());
        assert!(!set.is_contiguous());
        assert!(IndexSet::from([4, 5, 6]).is_contiguous());
    }

    #[test]
    fn test_move_single_column_left() {
        // [0, 1, 2] with column 2 inserted before 1 -> [0, 2, 1]
        let moved = IndexSet::single(2);
        assert_eq!(moved.position_after_move(0, 1), 0);
        assert_eq!(moved.position_after_move(1, 1), 2);
        assert_eq!(moved.position_after_move(2, 1), 1);
        assert_eq!(moved.moved_to(1), IndexSet::single(1));
    }

    #[test]
    fn test_move_single_column_to_end() {
        // [0, 1, 2] with column 0 inserted before 3 -> [1, 2, 0]
        let moved = IndexSet::single(0);
        assert_eq!(moved.position_after_move(1, 3), 0);
        assert_eq!(moved.position_after_move(2, 3), 1);
        assert_eq!(moved.position_after_move(0, 3), 2);
    }

    #[test]
    fn test_move_discontiguous_block_gathers() {
        // [0..6] moving {1, 4} before 3 -> [0, 2, 1, 4, 3, 5]
        let moved = IndexSet::from([1, 4]);
        let order: Vec<usize> = (0..6).map(|i| moved.position_after_move(i, 3)).collect();
        assert_eq!(order, vec![0, 2, 1, 4, 3, 5]);
        assert_eq!(moved.moved_to(3), IndexSet::from([2, 3]));
    }

    #[test]
    fn test_noop_moves() {
        let moved = IndexSet::from([2, 3]);
        assert!(moved.is_noop_move(2));
        assert!(moved.is_noop_move(3));
        assert!(moved.is_noop_move(4));
        assert!(!moved.is_noop_move(1));
        assert!(!moved.is_noop_move(5));
        assert!(!IndexSet::from([1, 3]).is_noop_move(2));
    }

    #[test]
    fn test_remapped() {
        let selection = IndexSet::from([0, 2]);
        let moved = IndexSet::single(2);
        assert_eq!(selection.remapped(&moved, 0), IndexSet::from([0, 1]));
    }
}
