//! The regular-expression term algebra and its Brzozowski/Antimirov
//! derivatives.
//!
//! `Regex` values are hash-consed by cached structural hash: every smart
//! constructor normalises its result (absorbing `Empty`, flattening nested
//! `Sequence`/`Union`/`Intersect`, cancelling double `Invert`, folding a
//! `CharClass` sibling into a `UnionCharClass`, ...) so that two terms built
//! from equal inputs always compare equal, without requiring a global
//! interning table. See `DESIGN.md` for why this crate picked cached-hash
//! identity over a full arena.

use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

use crate::partition::{self, Partition};

/// Size of the alphabet every [`Partition<bool>`] inside a `CharClass` is
/// defined over. Patterns operate on raw bytes; Unicode code points are
/// expanded into byte sub-automata by [`crate::utf8`] before they ever reach
/// this module.
pub const ALPHABET_END: u32 = 256;

/// A node in the regex term DAG, reference counted and structurally hashed.
#[derive(Clone)]
pub struct Regex(Rc<Node>);

struct Node {
    kind: Kind,
    hash: u64,
}

#[derive(PartialEq, Eq, PartialOrd, Ord)]
enum Kind {
    Empty,
    Epsilon,
    CharClass(Partition<bool>),
    Sequence(Regex, Regex),
    Union(Vec<Regex>),
    UnionCharClass(Partition<bool>, Regex),
    Intersect(Vec<Regex>),
    Repeat(Regex),
    Invert(Regex),
    Tag(u32),
}

impl Regex {
    fn new(kind: Kind) -> Regex {
        let hash = hash_kind(&kind);
        Regex(Rc::new(Node { kind, hash }))
    }

    pub fn empty() -> Regex {
        THE_EMPTY.with(|r| r.clone())
    }

    pub fn epsilon() -> Regex {
        THE_EPSILON.with(|r| r.clone())
    }

    pub fn tag(id: u32) -> Regex {
        Regex::new(Kind::Tag(id))
    }

    /// A regex matching exactly one byte whose value falls in an accepting
    /// band of `classes`.
    pub fn char_class(classes: Partition<bool>) -> Regex {
        if classes.bands().iter().all(|(_, accept)| !*accept) {
            Regex::empty()
        } else {
            Regex::new(Kind::CharClass(classes))
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self.0.kind, Kind::Empty)
    }

    pub fn is_epsilon(&self) -> bool {
        matches!(self.0.kind, Kind::Epsilon)
    }

    pub fn nullable(&self) -> bool {
        match &self.0.kind {
            Kind::Empty => false,
            Kind::Epsilon => true,
            Kind::CharClass(_) => false,
            Kind::Sequence(a, b) => a.nullable() && b.nullable(),
            Kind::Union(xs) => xs.iter().any(Regex::nullable),
            Kind::UnionCharClass(_, r) => r.nullable(),
            Kind::Intersect(xs) => xs.iter().all(Regex::nullable),
            Kind::Repeat(_) => true,
            Kind::Invert(r) => !r.nullable(),
            Kind::Tag(_) => true,
        }
    }

    /// The set of tag ids exposed by this term if it is nullable via them.
    pub fn tags(&self) -> BTreeSet<u32> {
        match &self.0.kind {
            Kind::Empty | Kind::Epsilon | Kind::CharClass(_) | Kind::Invert(_) => BTreeSet::new(),
            Kind::Sequence(a, b) => {
                let mut tags = a.tags();
                if a.nullable() {
                    tags.extend(b.tags());
                }
                tags
            }
            Kind::Union(xs) => xs.iter().fold(BTreeSet::new(), |mut acc, x| {
                acc.extend(x.tags());
                acc
            }),
            Kind::UnionCharClass(_, r) => r.tags(),
            Kind::Intersect(xs) => {
                let mut iter = xs.iter();
                let first = iter.next().map(Regex::tags).unwrap_or_default();
                iter.fold(first, |acc, x| acc.intersection(&x.tags()).copied().collect())
            }
            Kind::Repeat(r) => r.tags(),
            Kind::Tag(id) => {
                let mut set = BTreeSet::new();
                set.insert(*id);
                set
            }
        }
    }

    /// The derivative of this term with respect to every byte, as a
    /// partition of `[0, 256)`.
    pub fn derivatives(&self) -> Partition<Regex> {
        match &self.0.kind {
            Kind::Empty | Kind::Epsilon => Partition::constant(ALPHABET_END, Regex::empty()),
            Kind::Tag(_) => Partition::constant(ALPHABET_END, Regex::empty()),
            Kind::CharClass(p) => p.map_ref(|accept| {
                if *accept {
                    Regex::epsilon()
                } else {
                    Regex::empty()
                }
            }),
            Kind::Sequence(a, b) => {
                let mut result = partition::update(&a.derivatives(), b, |u, b| u.seq(b));
                if a.nullable() {
                    result = partition::merge(&result, &b.derivatives(), |u, v| u.union(v));
                }
                result
            }
            Kind::Union(xs) => xs
                .iter()
                .map(Regex::derivatives)
                .reduce(|acc, d| partition::merge(&acc, &d, |u, v| u.union(v)))
                .expect("a Union always has at least two children"),
            Kind::UnionCharClass(p, r) => {
                partition::merge(p, &r.derivatives(), |accept, d| {
                    if *accept {
                        d.union(&Regex::epsilon())
                    } else {
                        d.clone()
                    }
                })
            }
            Kind::Intersect(xs) => xs
                .iter()
                .map(Regex::derivatives)
                .reduce(|acc, d| partition::merge(&acc, &d, |u, v| u.intersect(v)))
                .expect("an Intersect always has at least two children"),
            Kind::Repeat(inner) => {
                partition::update(&inner.derivatives(), self, |u, rep| u.seq(rep))
            }
            Kind::Invert(inner) => inner.derivatives().map(|d| d.invert()),
        }
    }

    // --- smart constructors -------------------------------------------------

    pub fn seq(&self, other: &Regex) -> Regex {
        if self.is_empty() || other.is_empty() {
            return Regex::empty();
        }
        if self.is_epsilon() {
            return other.clone();
        }
        if other.is_epsilon() {
            return self.clone();
        }
        if let Kind::Sequence(a, b) = &self.0.kind {
            return a.seq(&b.seq(other));
        }
        Regex::new(Kind::Sequence(self.clone(), other.clone()))
    }

    pub fn union(&self, other: &Regex) -> Regex {
        if self.is_empty() {
            return other.clone();
        }
        if other.is_empty() {
            return self.clone();
        }
        if self == other {
            return self.clone();
        }

        let (class_a, rest_a) = extract_charclass(self);
        let (class_b, rest_b) = extract_charclass(other);

        let class = match (class_a, class_b) {
            (Some(p1), Some(p2)) => Some(partition::merge(p1, p2, |x, y| *x || *y)),
            (Some(p1), None) => Some(p1.clone()),
            (None, Some(p2)) => Some(p2.clone()),
            (None, None) => None,
        };

        let rest = match (rest_a, rest_b) {
            (Some(a), Some(b)) => Some(union_plain(a, b)),
            (Some(a), None) => Some(a.clone()),
            (None, Some(b)) => Some(b.clone()),
            (None, None) => None,
        };

        combine_class_and_rest(class, rest)
    }

    pub fn intersect(&self, other: &Regex) -> Regex {
        if self.is_empty() || other.is_empty() {
            return Regex::empty();
        }
        if self == other {
            return self.clone();
        }
        if let (Kind::CharClass(p1), Kind::CharClass(p2)) = (&self.0.kind, &other.0.kind) {
            return Regex::char_class(partition::merge(p1, p2, |x, y| *x && *y));
        }

        let left = intersect_terms(self);
        let right = intersect_terms(other);
        let merged = merge_sorted_unique(left, right);
        if merged.len() == 1 {
            merged.into_iter().next().unwrap()
        } else {
            Regex::new(Kind::Intersect(merged))
        }
    }

    pub fn difference(&self, other: &Regex) -> Regex {
        if self == other {
            return Regex::empty();
        }
        self.intersect(&other.invert())
    }

    pub fn invert(&self) -> Regex {
        match &self.0.kind {
            Kind::Invert(inner) => inner.clone(),
            Kind::CharClass(p) => Regex::char_class(p.map_ref(|accept| !*accept)),
            _ => Regex::new(Kind::Invert(self.clone())),
        }
    }

    pub fn star(&self) -> Regex {
        match &self.0.kind {
            Kind::Empty | Kind::Epsilon => Regex::epsilon(),
            Kind::Repeat(_) => self.clone(),
            _ => Regex::new(Kind::Repeat(self.clone())),
        }
    }

    pub fn plus(&self) -> Regex {
        self.seq(&self.star())
    }

    pub fn opt(&self) -> Regex {
        self.union(&Regex::epsilon())
    }
}

fn extract_charclass(r: &Regex) -> (Option<&Partition<bool>>, Option<&Regex>) {
    match &r.0.kind {
        Kind::CharClass(p) => (Some(p), None),
        Kind::UnionCharClass(p, rest) => (Some(p), Some(rest)),
        _ => (None, Some(r)),
    }
}

fn combine_class_and_rest(class: Option<Partition<bool>>, rest: Option<Regex>) -> Regex {
    match (class, rest) {
        (Some(p), Some(r)) => {
            if p.bands().iter().all(|(_, accept)| !*accept) {
                r
            } else {
                Regex::new(Kind::UnionCharClass(p, r))
            }
        }
        (Some(p), None) => Regex::char_class(p),
        (None, Some(r)) => r,
        (None, None) => Regex::empty(),
    }
}

fn plain_choices(r: &Regex) -> Vec<Regex> {
    match &r.0.kind {
        Kind::Union(xs) => xs.clone(),
        _ => vec![r.clone()],
    }
}

fn union_plain(a: &Regex, b: &Regex) -> Regex {
    if a == b {
        return a.clone();
    }
    let merged = merge_sorted_unique(plain_choices(a), plain_choices(b));
    if merged.len() == 1 {
        merged.into_iter().next().unwrap()
    } else {
        Regex::new(Kind::Union(merged))
    }
}

fn intersect_terms(r: &Regex) -> Vec<Regex> {
    match &r.0.kind {
        Kind::Intersect(xs) => xs.clone(),
        _ => vec![r.clone()],
    }
}

/// Merges two sorted, duplicate-free term lists into one sorted,
/// duplicate-free list.
fn merge_sorted_unique(left: Vec<Regex>, right: Vec<Regex>) -> Vec<Regex> {
    let mut result = Vec::with_capacity(left.len() + right.len());
    let mut lit = left.into_iter().peekable();
    let mut rit = right.into_iter().peekable();

    loop {
        match (lit.peek(), rit.peek()) {
            (Some(l), Some(r)) => match l.cmp(r) {
                Ordering::Equal => {
                    result.push(lit.next().unwrap());
                    rit.next();
                }
                Ordering::Less => result.push(lit.next().unwrap()),
                Ordering::Greater => result.push(rit.next().unwrap()),
            },
            (Some(_), None) => result.push(lit.next().unwrap()),
            (None, Some(_)) => result.push(rit.next().unwrap()),
            (None, None) => break,
        }
    }

    result
}

fn hash_kind(kind: &Kind) -> u64 {
    use std::collections::hash_map::DefaultHasher;
    let mut hasher = DefaultHasher::new();
    std::mem::discriminant(kind).hash(&mut hasher);
    match kind {
        Kind::Empty | Kind::Epsilon => {}
        Kind::CharClass(p) => p.hash(&mut hasher),
        Kind::Sequence(a, b) => {
            a.0.hash.hash(&mut hasher);
            b.0.hash.hash(&mut hasher);
        }
        Kind::Union(xs) => {
            for x in xs {
                x.0.hash.hash(&mut hasher);
            }
        }
        Kind::UnionCharClass(p, r) => {
            p.hash(&mut hasher);
            r.0.hash.hash(&mut hasher);
        }
        Kind::Intersect(xs) => {
            for x in xs {
                x.0.hash.hash(&mut hasher);
            }
        }
        Kind::Repeat(r) => r.0.hash.hash(&mut hasher),
        Kind::Invert(r) => r.0.hash.hash(&mut hasher),
        Kind::Tag(id) => id.hash(&mut hasher),
    }
    hasher.finish()
}

thread_local! {
    static THE_EMPTY: Regex = Regex::new(Kind::Empty);
    static THE_EPSILON: Regex = Regex::new(Kind::Epsilon);
}

impl PartialEq for Regex {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0) || (self.0.hash == other.0.hash && self.0.kind == other.0.kind)
    }
}

impl Eq for Regex {}

impl PartialOrd for Regex {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Regex {
    fn cmp(&self, other: &Self) -> Ordering {
        if Rc::ptr_eq(&self.0, &other.0) {
            return Ordering::Equal;
        }
        self.0.kind.cmp(&other.0.kind)
    }
}

impl Hash for Regex {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.0.hash);
    }
}

impl fmt::Debug for Regex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self)
    }
}

impl fmt::Display for Regex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn escape(code: u32, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            match char::from_u32(code) {
                Some(c) if "\\{}()+|&~*?.[]".contains(c) => write!(f, "\\{}", c),
                Some(c) if !c.is_control() => write!(f, "{}", c),
                _ => write!(f, "\\x{:02x}", code),
            }
        }

        fn fmt_class(p: &Partition<bool>, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            let accepting: Vec<(u32, u32)> = {
                let mut out = Vec::new();
                let mut start = 0u32;
                for (end, accept) in p.bands() {
                    if *accept {
                        out.push((start, *end));
                    }
                    start = *end;
                }
                out
            };
            if accepting.len() == 1 && accepting[0] == (0, ALPHABET_END) {
                return write!(f, ".");
            }
            if accepting.len() == 1 && accepting[0].1 - accepting[0].0 == 1 {
                return escape(accepting[0].0, f);
            }
            write!(f, "[")?;
            for (start, end) in accepting {
                match end - start {
                    1 => escape(start, f)?,
                    2 => {
                        escape(start, f)?;
                        escape(start + 1, f)?;
                    }
                    _ => {
                        escape(start, f)?;
                        write!(f, "-")?;
                        escape(end - 1, f)?;
                    }
                }
            }
            write!(f, "]")
        }

        fn maybe_paren_seq(r: &Regex, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            match &r.0.kind {
                Kind::Union(_) | Kind::UnionCharClass(_, _) | Kind::Intersect(_) => {
                    write!(f, "({})", r)
                }
                _ => write!(f, "{}", r),
            }
        }

        fn maybe_paren_intersect(r: &Regex, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            match &r.0.kind {
                Kind::Union(_) | Kind::UnionCharClass(_, _) => write!(f, "({})", r),
                _ => write!(f, "{}", r),
            }
        }

        match &self.0.kind {
            Kind::Empty => write!(f, "\\0"),
            Kind::Epsilon => write!(f, "\\e"),
            Kind::Tag(id) => write!(f, "{{{}}}", id),
            Kind::CharClass(p) => fmt_class(p, f),
            Kind::Sequence(a, b) => {
                maybe_paren_seq(a, f)?;
                maybe_paren_seq(b, f)
            }
            Kind::Union(xs) => {
                for (i, x) in xs.iter().enumerate() {
                    if i > 0 {
                        write!(f, "|")?;
                    }
                    maybe_paren_intersect(x, f)?;
                }
                Ok(())
            }
            Kind::UnionCharClass(p, r) => {
                fmt_class(p, f)?;
                write!(f, "|")?;
                maybe_paren_intersect(r, f)
            }
            Kind::Intersect(xs) => {
                for (i, x) in xs.iter().enumerate() {
                    if i > 0 {
                        write!(f, "&")?;
                    }
                    match &x.0.kind {
                        Kind::Union(_) | Kind::UnionCharClass(_, _) => write!(f, "({})", x)?,
                        _ => write!(f, "{}", x)?,
                    }
                }
                Ok(())
            }
            Kind::Repeat(r) => match &r.0.kind {
                Kind::Empty | Kind::Epsilon | Kind::CharClass(_) | Kind::Repeat(_) => {
                    write!(f, "{}*", r)
                }
                _ => write!(f, "({})*", r),
            },
            Kind::Invert(r) => match &r.0.kind {
                Kind::Empty | Kind::Epsilon | Kind::CharClass(_) | Kind::Invert(_) => {
                    write!(f, "~{}", r)
                }
                _ => write!(f, "~({})", r),
            },
        }
    }
}

impl std::ops::Mul for Regex {
    type Output = Regex;
    fn mul(self, rhs: Regex) -> Regex {
        self.seq(&rhs)
    }
}

impl std::ops::BitOr for Regex {
    type Output = Regex;
    fn bitor(self, rhs: Regex) -> Regex {
        self.union(&rhs)
    }
}

impl std::ops::BitAnd for Regex {
    type Output = Regex;
    fn bitand(self, rhs: Regex) -> Regex {
        self.intersect(&rhs)
    }
}

impl std::ops::Sub for Regex {
    type Output = Regex;
    fn sub(self, rhs: Regex) -> Regex {
        self.difference(&rhs)
    }
}

impl std::ops::Not for Regex {
    type Output = Regex;
    fn not(self) -> Regex {
        self.invert()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single(code: u32) -> Regex {
        let mut bands = Vec::new();
        if code > 0 {
            bands.push((code, false));
        }
        bands.push((code + 1, true));
        if code + 1 < ALPHABET_END {
            bands.push((ALPHABET_END, false));
        }
        Regex::char_class(Partition::from_bands(bands))
    }

    #[test]
    fn empty_absorbs_sequence() {
        let a = single(b'a' as u32);
        assert_eq!(a.seq(&Regex::empty()), Regex::empty());
        assert_eq!(Regex::empty().seq(&a), Regex::empty());
    }

    #[test]
    fn epsilon_is_sequence_identity() {
        let a = single(b'a' as u32);
        assert_eq!(a.seq(&Regex::epsilon()), a);
        assert_eq!(Regex::epsilon().seq(&a), a);
    }

    #[test]
    fn sequence_is_right_associated() {
        let a = single(b'a' as u32);
        let b = single(b'b' as u32);
        let c = single(b'c' as u32);
        let nested = a.seq(&b).seq(&c);
        match &nested.0.kind {
            Kind::Sequence(first, rest) => {
                assert_eq!(*first, a);
                assert!(matches!(rest.0.kind, Kind::Sequence(_, _)));
            }
            _ => panic!("expected a Sequence"),
        }
    }

    #[test]
    fn union_is_idempotent_and_commutative_by_identity() {
        let a = single(b'a' as u32);
        let b = single(b'b' as u32);
        assert_eq!(a.union(&a), a);
        assert_eq!(a.union(&b), b.union(&a));
    }

    #[test]
    fn union_of_char_classes_factors_into_charclass() {
        let a = single(b'a' as u32);
        let b = single(b'b' as u32);
        let u = a.union(&b);
        assert!(matches!(u.0.kind, Kind::CharClass(_)));
    }

    #[test]
    fn union_of_charclass_and_other_becomes_union_charclass() {
        let a = single(b'a' as u32);
        let tagged = Regex::tag(0);
        let u = a.union(&tagged);
        assert!(matches!(u.0.kind, Kind::UnionCharClass(_, _)));
    }

    #[test]
    fn double_complement_cancels() {
        let a = single(b'a' as u32).seq(&single(b'b' as u32));
        assert_eq!(a.invert().invert(), a);
    }

    #[test]
    fn invert_of_charclass_stays_a_charclass() {
        let a = single(b'a' as u32);
        assert!(matches!(a.invert().0.kind, Kind::CharClass(_)));
    }

    #[test]
    fn repeat_is_idempotent_and_absorbs_epsilon() {
        let a = single(b'a' as u32);
        let star = a.star();
        assert_eq!(star.star(), star);
        assert_eq!(Regex::empty().star(), Regex::epsilon());
        assert_eq!(Regex::epsilon().star(), Regex::epsilon());
    }

    #[test]
    fn difference_of_equal_terms_is_empty() {
        let a = single(b'a' as u32);
        assert_eq!(a.difference(&a), Regex::empty());
    }

    #[test]
    fn nullable_matches_epsilon_star_and_repeat() {
        assert!(Regex::epsilon().nullable());
        assert!(!Regex::empty().nullable());
        assert!(single(b'a' as u32).star().nullable());
        assert!(!single(b'a' as u32).nullable());
    }

    #[test]
    fn tag_is_exposed_only_when_nullable() {
        let tagged = Regex::tag(7);
        assert_eq!(tagged.tags(), BTreeSet::from([7]));
        let seq = single(b'a' as u32).seq(&tagged);
        assert!(seq.tags().is_empty());
    }

    #[test]
    fn derivative_of_char_class_is_epsilon_on_matching_band() {
        let a = single(b'a' as u32);
        let d = a.derivatives();
        assert_eq!(*d.value_at(b'a' as u32), Regex::epsilon());
        assert_eq!(*d.value_at(b'b' as u32), Regex::empty());
    }
}
