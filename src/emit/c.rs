//! Self-contained C scanner header emission.
//!
//! Grounded on the original Python implementation's `codegen.generate_c`:
//! same `DFA_INVALID_TOKEN`/`DFA_T_<NAME>` constants, the same `DfaMatch`
//! struct shape, and the same labelled-`goto`-per-state scanner loop, with
//! one addition named explicitly in the specification: a `DFA_USE_LIMIT`
//! variant that bounds-checks against an end pointer instead of relying on a
//! NUL sentinel.

use std::fmt::Write as _;

use crate::dfa::Dfa;

/// Renders `dfa` as a standalone C header defining `DFA_INVALID_TOKEN`, one
/// `DFA_T_<NAME>` constant per resolved tag (`1..=k`), `struct DfaMatch`, and
/// an `inline` `dfa_match` scanner.
pub fn generate_header(dfa: &Dfa, guard: &str) -> String {
    let mut buf = Buffer::new();

    buf.line(&format!("#ifndef {guard}"));
    buf.line(&format!("#define {guard}"));
    buf.blank();
    buf.line("#include <stddef.h>");
    buf.blank();

    generate_tokens(&mut buf, dfa);
    buf.blank();

    buf.line("struct DfaMatch {");
    buf.indented(|buf| {
        buf.line("const char *begin;");
        buf.line("const char *end;");
        buf.line("unsigned int token;");
    });
    buf.line("};");
    buf.blank();

    generate_match(&mut buf, dfa);
    buf.blank();
    buf.line(&format!("#endif /* {guard} */"));
    buf.finish()
}

fn c_token_name(tag: &str) -> String {
    let mut name = String::from("DFA_T_");
    for c in tag.chars() {
        name.push(if c.is_ascii_alphanumeric() { c.to_ascii_uppercase() } else { '_' });
    }
    name
}

fn generate_tokens(buf: &mut Buffer, dfa: &Dfa) {
    let tags = dfa.get_tags();
    buf.line("#define DFA_INVALID_TOKEN 0");
    for (i, tag) in tags.iter().enumerate() {
        buf.line(&format!("#define {} {}", c_token_name(tag), i + 1));
    }
    buf.blank();

    buf.line("static inline const char *dfa_token_name(unsigned int t) {");
    buf.indented(|buf| {
        buf.line("static const char *const table[] = {");
        buf.indented(|buf| {
            for tag in tags {
                buf.line(&format!("\"{}\",", escape_c_string(tag)));
            }
        });
        buf.line("};");
        buf.line(&format!("if (t == 0 || t > {}) {{ return NULL; }}", tags.len()));
        buf.line("return table[t - 1];");
    });
    buf.line("}");
}

fn generate_match(buf: &mut Buffer, dfa: &Dfa) {
    buf.line("#ifdef DFA_USE_LIMIT");
    buf.line("static inline void dfa_match(const char *s, const char *limit, struct DfaMatch *match) {");
    buf.line("#else");
    buf.line("static inline void dfa_match(const char *s, struct DfaMatch *match) {");
    buf.line("#endif");
    buf.indented(|buf| {
        buf.line("unsigned char c;");
        buf.blank();
        buf.line("match->begin = match->end = s;");
        buf.line("match->token = DFA_INVALID_TOKEN;");
        if let Some(tag) = dfa.state(0).entry_tag {
            buf.line(&format!("match->token = {};", c_token_name(dfa.tag_name(tag))));
        }
        buf.blank();
        for (id, state) in dfa.iter_states().enumerate() {
            buf.unindented(&format!("S{}:", id));
            buf.line("#ifdef DFA_USE_LIMIT");
            buf.line("if (s >= limit) { return; }");
            buf.line("#endif");
            buf.line("c = (unsigned char)*(s++);");

            for t in &state.transitions {
                let action = transition_action(dfa, t);
                if t.upper_bound == 256 {
                    buf.line(&action);
                } else {
                    buf.line(&format!("if (c < {}) {{ {} }}", t.upper_bound, action));
                }
            }
        }
    });
    buf.line("}");
}

fn transition_action(dfa: &Dfa, t: &crate::dfa::Transition) -> String {
    let mut parts = Vec::new();
    if let Some(tag) = t.tag {
        parts.push(format!("match->end = {};", if t.at_exit { "s - 1" } else { "s" }));
        parts.push(format!("match->token = {};", c_token_name(dfa.tag_name(tag))));
    }
    match t.target {
        Some(to) => parts.push(format!("goto S{};", to)),
        None => parts.push("return;".to_string()),
    }
    parts.join(" ")
}

fn escape_c_string(s: &str) -> String {
    s.chars()
        .flat_map(|c| match c {
            '"' => vec!['\\', '"'],
            '\\' => vec!['\\', '\\'],
            _ => vec![c],
        })
        .collect()
}

/// A minimal indenting string builder, in the spirit of the original
/// implementation's own `codegen.Buffer`.
struct Buffer {
    out: String,
    level: usize,
}

impl Buffer {
    fn new() -> Self {
        Buffer { out: String::new(), level: 0 }
    }

    fn line(&mut self, s: &str) {
        for _ in 0..self.level {
            self.out.push_str("    ");
        }
        let _ = writeln!(self.out, "{}", s);
    }

    fn unindented(&mut self, s: &str) {
        let _ = writeln!(self.out, "{}", s);
    }

    fn blank(&mut self) {
        self.out.push('\n');
    }

    fn indented(&mut self, f: impl FnOnce(&mut Buffer)) {
        self.level += 1;
        f(self);
        self.level -= 1;
    }

    fn finish(self) -> String {
        self.out
    }
}
