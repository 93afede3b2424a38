//! Graphviz `dot` emission for a built [`Dfa`], built on the crate's own
//! [`crate::dot::GraphWriter`].

use std::io::{self, Write};

use crate::dfa::{Dfa, StateId};
use crate::dot::{Edge, Family, GraphWriter, Id, Node};

/// Writes `dfa` as a directed Graphviz graph to `out`.
///
/// One node per state, shown as a `doublecircle` when the state has an
/// `eof_tag` (reaching the end of input there still accepts) and labelled
/// with its `entry_tag` name when it has one. One edge per compressed
/// transition, labelled with its compact character-class notation plus a
/// `/TAG.` (at-exit) or `/.TAG` (on-entry) suffix when the transition itself
/// carries an accept.
pub fn write_dot<W: Write>(dfa: &Dfa, out: W) -> io::Result<()> {
    let mut writer = GraphWriter::new(out, Family::Directed, Some(Id::from("dfa")))?;

    for (id, state) in dfa.iter_states().enumerate() {
        let label = match state.entry_tag {
            Some(tag) => format!("{}:{}", id, dfa.tag_name(tag)),
            None => id.to_string(),
        };
        let node = Node {
            label: Some(Id::from(label)),
            peripheries: state.eof_tag.map(|_| 2usize),
        };
        writer.node(state_id(id), Some(node))?;
    }

    for (id, state) in dfa.iter_states().enumerate() {
        let mut lower = 0u32;
        for t in &state.transitions {
            if let Some(target) = t.target {
                let mut label = format!("[{}]", format_band(lower, t.upper_bound - 1));
                if let Some(tag) = t.tag {
                    let name = dfa.tag_name(tag);
                    if t.at_exit {
                        label.push_str(&format!("/{}.", name));
                    } else {
                        label.push_str(&format!("/.{}", name));
                    }
                }
                let edge = Edge { label: Some(Id::from(label)) };
                writer.segment([state_id(id), state_id(target)], Some(edge))?;
            }
            lower = t.upper_bound;
        }
    }

    writer.end_into_inner().1
}

fn state_id(id: StateId) -> Id {
    Id::from(id)
}

/// Renders `[lo, hi]` compactly: a bare escaped character for a single-byte
/// band, an escaped `lo-hi` for anything wider.
fn format_band(lo: u32, hi: u32) -> String {
    if lo == hi {
        escape(lo)
    } else {
        format!("{}-{}", escape(lo), escape(hi))
    }
}

fn escape(byte: u32) -> String {
    match char::from_u32(byte) {
        Some(c) if "\\-[]".contains(c) => format!("\\{}", c),
        Some(c) if !c.is_control() && c.is_ascii() => c.to_string(),
        _ => format!("\\x{:02x}", byte),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{builder, dfa::make_lexer, dfa::raise_on_conflict};

    #[test]
    fn dot_output_mentions_every_tag_and_is_valid_utf8() {
        let dfa = make_lexer(
            vec![("assign", builder::string("=")), ("eq", builder::string("=="))],
            &raise_on_conflict,
        )
        .unwrap();

        let mut out = Vec::new();
        write_dot(&dfa, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("digraph dfa {"));
        assert!(text.contains("assign"));
        assert!(text.contains("eq"));
        assert!(text.trim_end().ends_with('}'));
    }
}
