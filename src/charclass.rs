//! The external character-class text syntax: an optional leading `^` for
//! complement, then a run of single characters or `a-b` ranges, with escapes
//! `\b \f \n \r \t`, `\xHH`, `\uHHHH`, `\UHHHHHHHH`, and `\X` meaning the
//! literal character `X` for anything else.

use std::iter::Peekable;
use std::str::Chars;

use crate::error::CharClassError;

const MAX_CODE_POINT: u32 = 0x10FFFF;

/// Parses `text` into a sorted, coalesced list of disjoint, inclusive
/// code-point ranges.
pub fn parse_char_set(text: &str) -> Result<Vec<(u32, u32)>, CharClassError> {
    let mut chars = text.chars().peekable();
    let invert = chars.next_if_eq(&'^').is_some();

    let mut ranges: Vec<(u32, u32)> = Vec::new();
    while chars.peek().is_some() {
        let lo = read_code_point(&mut chars)?;
        let hi = if chars.next_if_eq(&'-').is_some() {
            match chars.peek() {
                None => {
                    // Trailing literal `-`: not a range, just two singletons.
                    ranges.push((lo, lo));
                    ranges.push(('-' as u32, '-' as u32));
                    break;
                }
                Some(_) => read_code_point(&mut chars)?,
            }
        } else {
            lo
        };
        if lo > hi {
            let start = char::from_u32(lo).unwrap_or('\u{FFFD}');
            let end = char::from_u32(hi).unwrap_or('\u{FFFD}');
            return Err(CharClassError::InvertedRange { start, end });
        }
        ranges.push((lo, hi));
    }

    if invert {
        return Ok(invert_ranges(&coalesce(ranges)));
    }
    Ok(coalesce(ranges))
}

fn read_code_point(chars: &mut Peekable<Chars<'_>>) -> Result<u32, CharClassError> {
    let c = chars.next().expect("caller checked peek().is_some()");
    if c != '\\' {
        return Ok(c as u32);
    }
    let escaped = chars.next().ok_or(CharClassError::DanglingEscape)?;
    Ok(match escaped {
        'b' => 0x08,
        'f' => 0x0C,
        'n' => 0x0A,
        'r' => 0x0D,
        't' => 0x09,
        'x' => read_hex_escape(chars, "x", 2)?,
        'u' => read_hex_escape(chars, "u", 4)?,
        'U' => read_hex_escape(chars, "U", 8)?,
        other => other as u32,
    })
}

fn read_hex_escape(
    chars: &mut Peekable<Chars<'_>>,
    kind: &'static str,
    expected: usize,
) -> Result<u32, CharClassError> {
    let mut digits = String::with_capacity(expected);
    for _ in 0..expected {
        match chars.peek() {
            Some(c) if c.is_ascii_hexdigit() => digits.push(chars.next().unwrap()),
            _ => return Err(CharClassError::TruncatedHexEscape { kind, expected }),
        }
    }
    let code = u32::from_str_radix(&digits, 16).map_err(|_| CharClassError::InvalidHexEscape { kind })?;
    if code > MAX_CODE_POINT {
        return Err(CharClassError::InvalidCodePoint { kind });
    }
    Ok(code)
}

fn coalesce(mut ranges: Vec<(u32, u32)>) -> Vec<(u32, u32)> {
    if ranges.is_empty() {
        return ranges;
    }
    ranges.sort_unstable();
    let mut merged = Vec::with_capacity(ranges.len());
    let mut iter = ranges.into_iter();
    let (mut lo, mut hi) = iter.next().unwrap();
    for (next_lo, next_hi) in iter {
        if next_lo <= hi.saturating_add(1) {
            hi = hi.max(next_hi);
        } else {
            merged.push((lo, hi));
            lo = next_lo;
            hi = next_hi;
        }
    }
    merged.push((lo, hi));
    merged
}

fn invert_ranges(ranges: &[(u32, u32)]) -> Vec<(u32, u32)> {
    let mut out = Vec::with_capacity(ranges.len() + 1);
    let mut cursor = 0u32;
    for &(lo, hi) in ranges {
        if cursor < lo {
            out.push((cursor, lo - 1));
        }
        cursor = hi + 1;
    }
    if cursor <= MAX_CODE_POINT {
        out.push((cursor, MAX_CODE_POINT));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_characters_and_ranges() {
        assert_eq!(parse_char_set("a-cx").unwrap(), vec![('a' as u32, 'c' as u32), ('x' as u32, 'x' as u32)]);
    }

    #[test]
    fn adjacent_ranges_coalesce() {
        assert_eq!(parse_char_set("a-cd-f").unwrap(), vec![('a' as u32, 'f' as u32)]);
    }

    #[test]
    fn trailing_dash_is_literal() {
        assert_eq!(parse_char_set("a-").unwrap(), vec![('-' as u32, '-' as u32), ('a' as u32, 'a' as u32)]);
    }

    #[test]
    fn standard_escapes() {
        assert_eq!(parse_char_set(r"\n\t").unwrap(), vec![(0x09, 0x09), (0x0A, 0x0A)]);
    }

    #[test]
    fn unknown_escape_is_literal() {
        assert_eq!(parse_char_set(r"\q").unwrap(), vec![('q' as u32, 'q' as u32)]);
    }

    #[test]
    fn hex_escapes() {
        assert_eq!(parse_char_set(r"\x41-\x5a").unwrap(), vec![(0x41, 0x5A)]);
        assert_eq!(parse_char_set(r"é").unwrap(), vec![(0xE9, 0xE9)]);
    }

    #[test]
    fn truncated_hex_escape_is_an_error() {
        assert_eq!(
            parse_char_set(r"\x4").unwrap_err(),
            CharClassError::TruncatedHexEscape { kind: "x", expected: 2 }
        );
    }

    #[test]
    fn dangling_escape_is_an_error() {
        assert_eq!(parse_char_set("\\").unwrap_err(), CharClassError::DanglingEscape);
    }

    #[test]
    fn inverted_range_is_an_error() {
        assert_eq!(parse_char_set("z-a").unwrap_err(), CharClassError::InvertedRange { start: 'z', end: 'a' });
    }

    #[test]
    fn caret_inverts_the_whole_set() {
        let ranges = parse_char_set("^a-z").unwrap();
        assert_eq!(ranges[0], (0, 'a' as u32 - 1));
        assert_eq!(*ranges.last().unwrap(), ('z' as u32 + 1, MAX_CODE_POINT));
    }

    #[test]
    fn caret_alone_matches_everything() {
        assert_eq!(parse_char_set("^").unwrap(), vec![(0, MAX_CODE_POINT)]);
    }
}
