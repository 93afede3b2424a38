//! The human-facing EDSL for building [`Regex`] values.
//!
//! Every character-producing constructor here is wired through
//! [`crate::utf8`] so that patterns can be written against Unicode scalar
//! values while the algebra underneath only ever sees bytes (see
//! `crate::regex::ALPHABET_END`).

use crate::charclass;
use crate::error::CharClassError;
use crate::partition::Partition;
use crate::regex::{Regex, ALPHABET_END};
use crate::utf8;

/// The language `∅`.
pub fn empty() -> Regex {
    Regex::empty()
}

/// The language `{""}`.
pub fn epsilon() -> Regex {
    Regex::epsilon()
}

/// Matches exactly one byte, any byte.
pub fn any_char() -> Regex {
    Regex::char_class(Partition::constant(ALPHABET_END, true))
}

/// Matches exactly one byte in `[lo, hi]`.
pub(crate) fn byte_range(lo: u8, hi: u8) -> Regex {
    let mut bands = Vec::new();
    if lo > 0 {
        bands.push((lo as u32, false));
    }
    bands.push((hi as u32 + 1, true));
    if hi < u8::MAX {
        bands.push((ALPHABET_END, false));
    }
    Regex::char_class(Partition::from_bands(bands))
}

/// Matches exactly one byte equal to `b`.
pub(crate) fn byte(b: u8) -> Regex {
    byte_range(b, b)
}

/// Matches exactly one Unicode scalar value, encoded as its UTF-8 byte
/// sequence.
pub fn char(c: char) -> Regex {
    utf8::expand_codepoint_range(c as u32, c as u32)
}

/// Matches exactly one Unicode scalar value in the inclusive range `[a, b]`,
/// encoded as UTF-8.
pub fn char_range(a: char, b: char) -> Regex {
    utf8::expand_codepoint_range(a as u32, b as u32)
}

/// Matches exactly one Unicode scalar value described by `text` in the
/// external character-class syntax (see [`charclass::parse_char_set`]).
pub fn char_set(text: &str) -> Result<Regex, CharClassError> {
    let ranges = charclass::parse_char_set(text)?;
    Ok(ranges
        .into_iter()
        .map(|(lo, hi)| utf8::expand_codepoint_range(lo, hi))
        .reduce(|acc, r| acc.union(&r))
        .unwrap_or_else(Regex::empty))
}

/// Matches exactly the literal byte sequence of `s`'s UTF-8 encoding.
pub fn string(s: &str) -> Regex {
    s.bytes().map(byte).rev().fold(Regex::epsilon(), |acc, b| b.seq(&acc))
}

/// A zero-width marker accepting the empty string and carrying `id`.
pub fn tag(id: u32) -> Regex {
    Regex::tag(id)
}

/// `.* · r · .*`: matches any text containing `r` as a (possibly empty)
/// substring anywhere within it.
pub fn any_with(r: &Regex) -> Regex {
    let any = any_char().star();
    any.seq(r).seq(&any)
}

/// `~any_with(r)`: matches text that contains `r` nowhere within it.
pub fn any_without(r: &Regex) -> Regex {
    any_with(r).invert()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_is_a_byte_sequence() {
        let r = string("ab");
        assert_eq!(format!("{}", r), "ab");
    }

    #[test]
    fn char_set_builds_a_union_of_classes() {
        let r = char_set("a-cx").unwrap();
        assert_eq!(format!("{}", r), "[a-cx]");
    }

    #[test]
    fn char_set_rejects_bad_syntax() {
        assert!(char_set(r"\x4").is_err());
    }

    #[test]
    fn any_with_wraps_a_pattern_in_wildcards() {
        use crate::dfa::{make_lexer, raise_on_conflict};
        let pattern = any_with(&string("fn"));
        let dfa = make_lexer(vec![("has_fn", pattern)], &raise_on_conflict).unwrap();
        assert_eq!(dfa.scan_once(b"int fn(void)").unwrap().length, "int fn(void)".len());
    }

    #[test]
    fn any_char_is_a_single_arbitrary_byte() {
        let dfa = make_lexer_any_char();
        assert_eq!(dfa.scan_once(b"\0").unwrap().length, 1);
    }

    fn make_lexer_any_char() -> crate::dfa::Dfa {
        crate::dfa::make_lexer(vec![("any", any_char())], &crate::dfa::raise_on_conflict).unwrap()
    }
}
