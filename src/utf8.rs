//! Expands a code-point range into an equivalent byte-level regex tree.
//!
//! The regex algebra and the DFA it drives operate over a fixed byte
//! alphabet (see [`crate::regex::ALPHABET_END`]); character constructors that
//! accept Unicode scalar values go through this module to turn a code-point
//! range into a union of fixed-length byte sequences, each sequence itself a
//! concatenation of single-byte character classes. The construction is the
//! standard one used throughout the UTF-8 tooling ecosystem (e.g. the `regex`
//! crate's `regex-syntax::utf8` module, and the older `utf8-ranges` crate it
//! absorbed): split the codepoint range at UTF-8 encoded-length boundaries,
//! then recursively split each same-length sub-range at the first byte where
//! the low and high bound diverge.

use crate::regex::Regex;

const MAX_CODE_POINT: u32 = 0x10FFFF;
const SURROGATE_LO: u32 = 0xD800;
const SURROGATE_HI: u32 = 0xDFFF;

/// Length boundaries of the four UTF-8 encoded-length brackets, as inclusive
/// `(lo, hi)` codepoint pairs.
const BRACKETS: [(u32, u32); 4] =
    [(0x0000, 0x007F), (0x0080, 0x07FF), (0x0800, 0xFFFF), (0x10000, MAX_CODE_POINT)];

/// Builds the regex matching exactly the UTF-8 encodings of the codepoints
/// in `[lo, hi]` (inclusive on both ends). Surrogate codepoints (`0xD800` to
/// `0xDFFF`) never have a valid UTF-8 encoding and are silently excluded from
/// any overlapping bracket, matching how `char` itself treats them.
pub fn expand_codepoint_range(lo: u32, hi: u32) -> Regex {
    let mut alternatives = Vec::new();
    for &(blo, bhi) in &BRACKETS {
        let seg_lo = lo.max(blo);
        let seg_hi = hi.min(bhi);
        if seg_lo > seg_hi {
            continue;
        }
        for (sub_lo, sub_hi) in exclude_surrogates(seg_lo, seg_hi) {
            alternatives.extend(sequences_for_bracket(sub_lo, sub_hi));
        }
    }
    alternatives
        .into_iter()
        .reduce(|acc, r| acc.union(&r))
        .unwrap_or_else(Regex::empty)
}

/// Splits `[lo, hi]` around the UTF-16 surrogate gap, which never appears in
/// a valid UTF-8 stream.
fn exclude_surrogates(lo: u32, hi: u32) -> Vec<(u32, u32)> {
    if hi < SURROGATE_LO || lo > SURROGATE_HI {
        return vec![(lo, hi)];
    }
    let mut out = Vec::new();
    if lo < SURROGATE_LO {
        out.push((lo, SURROGATE_LO - 1));
    }
    if hi > SURROGATE_HI {
        out.push((SURROGATE_HI + 1, hi));
    }
    out
}

/// `lo` and `hi` lie in the same encoded-length bracket: builds the union of
/// byte sequences (each a [`Regex::seq`] of single-byte classes) covering
/// exactly `[lo, hi]`.
fn sequences_for_bracket(lo: u32, hi: u32) -> Vec<Regex> {
    let len = utf8_len(lo);
    debug_assert_eq!(len, utf8_len(hi), "lo and hi must share an encoded length");
    let lo_bytes = encode(lo, len);
    let hi_bytes = encode(hi, len);
    split_tail(&lo_bytes, &hi_bytes)
        .into_iter()
        .map(|bands| bands.into_iter().map(byte_range).reduce(|a, b| a.seq(&b)).expect("non-empty sequence"))
        .collect()
}

fn utf8_len(cp: u32) -> usize {
    match cp {
        0x0000..=0x007F => 1,
        0x0080..=0x07FF => 2,
        0x0800..=0xFFFF => 3,
        _ => 4,
    }
}

/// Encodes `cp` as exactly `len` UTF-8 bytes. Unlike `char::encode_utf8`,
/// this accepts surrogate codepoints too, since it is only ever called on
/// sub-ranges that have already been clipped to a single bracket (surrogates
/// are excluded earlier, by codepoint value, not by rejecting the `char`).
fn encode(cp: u32, len: usize) -> Vec<u8> {
    match len {
        1 => vec![cp as u8],
        2 => vec![0xC0 | (cp >> 6) as u8, 0x80 | (cp & 0x3F) as u8],
        3 => vec![
            0xE0 | (cp >> 12) as u8,
            0x80 | ((cp >> 6) & 0x3F) as u8,
            0x80 | (cp & 0x3F) as u8,
        ],
        4 => vec![
            0xF0 | (cp >> 18) as u8,
            0x80 | ((cp >> 12) & 0x3F) as u8,
            0x80 | ((cp >> 6) & 0x3F) as u8,
            0x80 | (cp & 0x3F) as u8,
        ],
        _ => unreachable!("UTF-8 encodes in 1 to 4 bytes"),
    }
}

/// Recursively splits a pair of equal-length byte sequences `lo..=hi` into
/// the minimal set of band-sequences whose cartesian product reconstructs
/// exactly the codepoints between them. Each returned entry has the same
/// length as `lo`/`hi`.
fn split_tail(lo: &[u8], hi: &[u8]) -> Vec<Vec<(u32, u32)>> {
    let n = lo.len();
    if n == 1 {
        return vec![vec![(lo[0] as u32, hi[0] as u32)]];
    }
    if lo[0] == hi[0] {
        return split_tail(&lo[1..], &hi[1..])
            .into_iter()
            .map(|mut rest| {
                rest.insert(0, (lo[0] as u32, lo[0] as u32));
                rest
            })
            .collect();
    }

    let min_cont = vec![0x80u8; n - 1];
    let max_cont = vec![0xBFu8; n - 1];
    let lo_is_min = lo[1..] == min_cont[..];
    let hi_is_max = hi[1..] == max_cont[..];
    let full_tail = || vec![(0x80u32, 0xBFu32); n - 1];

    let mut out = Vec::new();
    match (lo_is_min, hi_is_max) {
        (true, true) => {
            let mut seq = vec![(lo[0] as u32, hi[0] as u32)];
            seq.extend(full_tail());
            out.push(seq);
        }
        (true, false) => {
            if hi[0] > lo[0] {
                let mut seq = vec![(lo[0] as u32, (hi[0] - 1) as u32)];
                seq.extend(full_tail());
                out.push(seq);
            }
            for mut rest in split_tail(&min_cont, &hi[1..]) {
                rest.insert(0, (hi[0] as u32, hi[0] as u32));
                out.push(rest);
            }
        }
        (false, true) => {
            for mut rest in split_tail(&lo[1..], &max_cont) {
                rest.insert(0, (lo[0] as u32, lo[0] as u32));
                out.push(rest);
            }
            if hi[0] > lo[0] {
                let mut seq = vec![((lo[0] + 1) as u32, hi[0] as u32)];
                seq.extend(full_tail());
                out.push(seq);
            }
        }
        (false, false) => {
            for mut rest in split_tail(&lo[1..], &max_cont) {
                rest.insert(0, (lo[0] as u32, lo[0] as u32));
                out.push(rest);
            }
            if hi[0] > lo[0] + 1 {
                let mut seq = vec![((lo[0] + 1) as u32, (hi[0] - 1) as u32)];
                seq.extend(full_tail());
                out.push(seq);
            }
            for mut rest in split_tail(&min_cont, &hi[1..]) {
                rest.insert(0, (hi[0] as u32, hi[0] as u32));
                out.push(rest);
            }
        }
    }
    out
}

fn byte_range(band: (u32, u32)) -> Regex {
    let (lo, hi) = band;
    crate::builder::byte_range(lo as u8, hi as u8)
}
