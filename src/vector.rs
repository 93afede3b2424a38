//! A tagged vector of regex terms: the joint state of several patterns being
//! matched in lock-step, used as the DFA builder's state representation.

use std::collections::BTreeSet;

use crate::partition::{self, Partition};
use crate::regex::{Regex, ALPHABET_END};

/// An ordered list of `(tag_id, Regex)` pairs. No element's regex is ever
/// `Empty` — such elements carry no further information and are dropped as
/// soon as a derivative step would produce one.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Vector {
    items: Vec<(u32, Regex)>,
}

impl Vector {
    pub fn new(items: Vec<(u32, Regex)>) -> Vector {
        debug_assert!(items.iter().all(|(_, r)| !r.is_empty()));
        Vector { items }
    }

    pub fn items(&self) -> &[(u32, Regex)] {
        &self.items
    }

    pub fn is_dead(&self) -> bool {
        self.items.is_empty()
    }

    /// The tag ids of elements whose regex is currently nullable, in the
    /// vector's original pattern-priority order.
    pub fn tags(&self) -> Vec<u32> {
        self.items
            .iter()
            .filter(|(_, r)| r.nullable())
            .map(|(tag, _)| *tag)
            .collect()
    }

    /// The union, across all elements, of the tag sets each element's regex
    /// itself exposes (used only for diagnostics; scanning relies on
    /// `tags()`).
    pub fn embedded_tags(&self) -> BTreeSet<u32> {
        self.items.iter().fold(BTreeSet::new(), |mut acc, (_, r)| {
            acc.extend(r.tags());
            acc
        })
    }

    /// The joint derivative with respect to every byte: for each band, the
    /// successor vector obtained by differentiating every element and
    /// dropping any that became `Empty`.
    pub fn derivatives(&self) -> Partition<Vector> {
        let mut acc: Partition<Vec<(u32, Regex)>> = Partition::constant(ALPHABET_END, Vec::new());
        for (tag, regex) in &self.items {
            let d = regex.derivatives();
            acc = partition::merge(&acc, &d, |items, next| {
                let mut items = items.clone();
                if !next.is_empty() {
                    items.push((*tag, next.clone()));
                }
                items
            });
        }
        acc.map(Vector::new)
    }
}
