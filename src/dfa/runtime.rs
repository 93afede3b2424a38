//! The byte-by-byte maximal-munch scanner over a built [`Dfa`].

use crate::dfa::Dfa;
use crate::error::ScanError;

/// One recognised token: its resolved tag name and length in bytes from the
/// start of the scanned slice.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Match<'a> {
    pub tag: &'a str,
    pub length: usize,
}

impl Dfa {
    /// Scans the longest accepting prefix of `input`.
    ///
    /// Maximal munch: the scanner keeps consuming bytes past a state that
    /// already accepts, as long as some live transition remains, and falls
    /// back to the last remembered accept the moment it gets stuck or the
    /// input ends. Returns `None` if no prefix of `input` — not even the
    /// empty one — is accepted by any pattern.
    pub fn scan_once<'a>(&'a self, input: &[u8]) -> Option<Match<'a>> {
        let mut state_id = 0usize;
        let mut best: Option<(u32, usize)> = None;

        for (pos, &byte) in input.iter().enumerate() {
            let state = self.state(state_id);
            if let Some(tag) = state.entry_tag {
                best = Some((tag, pos));
            }

            let code = byte as u32;
            let band = state
                .transitions
                .iter()
                .find(|t| t.upper_bound > code)
                .expect("a built Dfa's transitions cover the whole byte alphabet");

            if let Some(tag) = band.tag {
                best = Some((tag, if band.at_exit { pos } else { pos + 1 }));
            }

            match band.target {
                Some(next) => state_id = next,
                None => return best.map(|(tag, length)| Match { tag: self.tag_name(tag), length }),
            }
        }

        let state = self.state(state_id);
        if let Some(tag) = state.entry_tag.or(state.eof_tag) {
            best = Some((tag, input.len()));
        }

        best.map(|(tag, length)| Match { tag: self.tag_name(tag), length })
    }

    /// Tokenises `input` left to right, one [`Match`] at a time.
    pub fn scan_all<'a>(&'a self, input: &'a [u8]) -> ScanIter<'a> {
        ScanIter { dfa: self, remaining: input, offset: 0 }
    }
}

/// Lazily tokenises the remaining input. Stops (after yielding the error)
/// the moment a non-empty remainder can't be matched at all; a zero-length
/// match is impossible for any pattern set that never prioritises an
/// always-nullable term over something that can still consume input.
pub struct ScanIter<'a> {
    dfa: &'a Dfa,
    remaining: &'a [u8],
    offset: usize,
}

impl<'a> Iterator for ScanIter<'a> {
    type Item = Result<(&'a str, &'a [u8]), ScanError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining.is_empty() {
            return None;
        }
        match self.dfa.scan_once(self.remaining) {
            Some(Match { tag, length }) => {
                let (consumed, rest) = self.remaining.split_at(length.max(1).min(self.remaining.len()));
                self.remaining = rest;
                self.offset += consumed.len();
                Some(Ok((tag, consumed)))
            }
            None => {
                let error = ScanError::UnrecognisedInput { offset: self.offset };
                self.remaining = &[];
                Some(Err(error))
            }
        }
    }
}
