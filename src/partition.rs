//! Piecewise-constant functions over `[0, END)`.
//!
//! A [`Partition`] represents a total function from a bounded integer domain
//! to some value type as a sorted list of `(upper_bound, value)` bands. Bands
//! are coalesced whenever adjacent values compare equal, so the band count is
//! always the minimal one for the represented function.

use std::hash::Hash;

/// A sorted, coalesced list of `(upper_bound, value)` bands covering `[0, end)`.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Partition<T> {
    bands: Vec<(u32, T)>,
}

impl<T: PartialEq> Partition<T> {
    /// A constant partition: `value` for every point in `[0, end)`.
    pub fn constant(end: u32, value: T) -> Self {
        Partition { bands: vec![(end, value)] }
    }

    /// Builds a partition from already-sorted bands, coalescing adjacent
    /// equal values.
    pub fn from_bands(bands: Vec<(u32, T)>) -> Self {
        let mut result: Vec<(u32, T)> = Vec::with_capacity(bands.len());
        for (bound, value) in bands {
            match result.last() {
                Some((_, last)) if *last == value => {
                    let idx = result.len() - 1;
                    result[idx].0 = bound;
                }
                _ => result.push((bound, value)),
            }
        }
        Partition { bands: result }
    }

    pub fn bands(&self) -> &[(u32, T)] {
        &self.bands
    }

    /// The end of the domain, i.e. the upper bound of the last band.
    pub fn end(&self) -> u32 {
        self.bands.last().expect("a partition always has at least one band").0
    }

    pub fn value_at(&self, point: u32) -> &T {
        let idx = self.bands.partition_point(|(bound, _)| *bound <= point);
        &self.bands[idx].1
    }

    /// Maps every value by reference, coalescing the result.
    pub fn map_ref<U: PartialEq>(&self, mut f: impl FnMut(&T) -> U) -> Partition<U> {
        let mut result: Vec<(u32, U)> = Vec::with_capacity(self.bands.len());
        for (bound, value) in &self.bands {
            let mapped = f(value);
            match result.last() {
                Some((_, last)) if *last == mapped => {
                    let idx = result.len() - 1;
                    result[idx].0 = *bound;
                }
                _ => result.push((*bound, mapped)),
            }
        }
        Partition { bands: result }
    }

    /// Maps every value by ownership, coalescing the result.
    pub fn map<U: PartialEq>(self, mut f: impl FnMut(T) -> U) -> Partition<U> {
        let mut result: Vec<(u32, U)> = Vec::with_capacity(self.bands.len());
        for (bound, value) in self.bands {
            let mapped = f(value);
            match result.last() {
                Some((_, last)) if *last == mapped => {
                    let idx = result.len() - 1;
                    result[idx].0 = bound;
                }
                _ => result.push((bound, mapped)),
            }
        }
        Partition { bands: result }
    }
}

/// Combines every value of `a` against the constant `y`, coalescing the
/// result. This is the single-sided specialisation of [`merge`].
pub fn update<T: PartialEq, U, V: PartialEq>(
    a: &Partition<T>,
    y: &U,
    mut f: impl FnMut(&T, &U) -> V,
) -> Partition<V> {
    a.map_ref(|t| f(t, y))
}

/// Walks two partitions in lockstep, combining the value active on each side
/// at every point and coalescing the result. Both partitions must share the
/// same domain end.
pub fn merge<T: PartialEq, U: PartialEq, V: PartialEq>(
    a: &Partition<T>,
    b: &Partition<U>,
    mut f: impl FnMut(&T, &U) -> V,
) -> Partition<V> {
    debug_assert_eq!(a.end(), b.end(), "merged partitions must share a domain");

    let mut result: Vec<(u32, V)> = Vec::new();
    let mut ai = 0;
    let mut bi = 0;

    while ai < a.bands.len() && bi < b.bands.len() {
        let (a_end, a_val) = &a.bands[ai];
        let (b_end, b_val) = &b.bands[bi];
        let bound = (*a_end).min(*b_end);
        let value = f(a_val, b_val);

        match result.last() {
            Some((_, last)) if *last == value => {
                let idx = result.len() - 1;
                result[idx].0 = bound;
            }
            _ => result.push((bound, value)),
        }

        if *a_end == bound {
            ai += 1;
        }
        if *b_end == bound {
            bi += 1;
        }
    }

    Partition { bands: result }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constant_has_single_band() {
        let p = Partition::constant(256, false);
        assert_eq!(p.bands(), &[(256, false)]);
        assert_eq!(p.end(), 256);
    }

    #[test]
    fn from_bands_coalesces_adjacent_equal_values() {
        let p = Partition::from_bands(vec![(10, true), (20, true), (30, false)]);
        assert_eq!(p.bands(), &[(20, true), (30, false)]);
    }

    #[test]
    fn value_at_finds_the_containing_band() {
        let p = Partition::from_bands(vec![(10, 'a'), (20, 'b'), (30, 'c')]);
        assert_eq!(*p.value_at(0), 'a');
        assert_eq!(*p.value_at(9), 'a');
        assert_eq!(*p.value_at(10), 'b');
        assert_eq!(*p.value_at(25), 'c');
    }

    #[test]
    fn merge_combines_and_coalesces() {
        let a = Partition::from_bands(vec![(10, true), (30, false)]);
        let b = Partition::from_bands(vec![(20, false), (30, true)]);
        let merged = merge(&a, &b, |x, y| *x || *y);
        // [0,10): T||F=T, [10,20): F||F=F, [20,30): F||T=T -> coalesces with neither neighbour
        assert_eq!(merged.bands(), &[(10, true), (20, false), (30, true)]);
    }

    #[test]
    fn update_maps_against_a_constant() {
        let a = Partition::from_bands(vec![(10, true), (30, false)]);
        let updated = update(&a, &5i32, |v, y| if *v { *y } else { 0 });
        assert_eq!(updated.bands(), &[(10, 5), (30, 0)]);
    }
}
