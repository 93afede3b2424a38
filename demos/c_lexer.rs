//! Builds a lexer for (most of) the ANSI C grammar and dumps it as a
//! Graphviz graph and a self-contained C header, the way the original
//! tool's own `examples/c_lexer.py` does.
//!
//! Adapted from <http://www.quut.com/c/ANSI-C-grammar-l.html>.

use std::fs;

use derive_lex::builder::{any_char, any_without, char, char_range, char_set, string};
use derive_lex::dfa::{make_lexer, select_first};
use derive_lex::emit::{c, dot};
use derive_lex::regex::Regex;

fn tokens() -> Vec<(&'static str, Regex)> {
    let o = char_range('0', '7');
    let d = char_range('0', '9');
    let nz = char_range('1', '9');
    let l = char_range('a', 'z').union(&char_range('A', 'Z')).union(&char('_'));
    let a = l.union(&d);
    let h = char_range('a', 'f').union(&char_range('A', 'F')).union(&d);
    let hp = char('0').seq(&char_set("xX").unwrap());
    let e = char_set("Ee").unwrap().seq(&char_set("+-").unwrap().opt()).seq(&d.plus());
    let p = char_set("Pp").unwrap().seq(&char_set("+-").unwrap().opt()).seq(&d.plus());
    let fs = char_set("fFlL").unwrap();
    let is = char_set("uU")
        .unwrap()
        .seq(&char_set("lL").unwrap().union(&string("ll")).union(&string("LL")).opt())
        .union(
            &char_set("lL")
                .unwrap()
                .union(&string("ll"))
                .union(&string("LL"))
                .seq(&char_set("uU").unwrap().opt()),
        );
    let cp = char_set("uUL").unwrap();
    let sp = string("u8").union(&cp);
    let es = char('\\').seq(
        &char_set("'\"?\\abfnrtv")
            .unwrap()
            .union(&o)
            .union(&o.seq(&o))
            .union(&o.seq(&o).seq(&o))
            .union(&char('x').seq(&h.plus())),
    );
    let ws = char_set(" \t\x0b\n\x0c").unwrap();

    let mut out: Vec<(&'static str, Regex)> = vec![
        ("comment", string("/*").seq(&any_without(&string("*/"))).seq(&string("*/"))),
        (
            "comment",
            string("//").seq(&any_char().intersect(&char('\n').invert()).star()),
        ),
    ];

    const KEYWORDS: &[&str] = &[
        "auto", "break", "case", "char", "const", "continue", "default", "do", "double", "else",
        "enum", "extern", "float", "for", "goto", "if", "int", "long", "register", "restrict",
        "return", "short", "signed", "sizeof", "static", "struct", "switch", "typedef", "union",
        "unsigned", "void", "volatile", "while", "_Alignas", "_Alignof", "_Atomic", "_Bool",
        "_Complex", "_Generic", "_Imaginary", "_Noreturn", "_Static_assert", "_Thread_local",
        "__func__",
    ];
    for keyword in KEYWORDS {
        out.push((keyword, string(keyword)));
    }

    out.push(("ident", l.seq(&a.star())));
    out.push(("hexconst", hp.seq(&h.plus()).seq(&is.opt())));
    out.push(("octconst", char('0').seq(&o.star()).seq(&is.opt())));
    out.push(("intconst", nz.seq(&d.star()).seq(&is.opt())));

    out.push((
        "charconst",
        cp.opt()
            .seq(&char('\''))
            .seq(&es.union(&any_char().intersect(&char_set("'\\\n").unwrap().invert())).plus())
            .seq(&char('\'')),
    ));

    out.push((
        "floatconst",
        d.plus()
            .seq(&e)
            .seq(&fs.opt())
            .union(&d.star().seq(&char('.')).seq(&d.plus()).seq(&e.opt()).seq(&fs.opt()))
            .union(&d.plus().seq(&char('.')).seq(&d.star()).seq(&e.opt()).seq(&fs.opt()))
            .union(&hp.seq(&h.plus()).seq(&p).seq(&fs.opt()))
            .union(&hp.seq(&h.star()).seq(&char('.')).seq(&h.plus()).seq(&p).seq(&fs.opt()))
            .union(&hp.seq(&h.plus()).seq(&char('.')).seq(&p).seq(&fs.opt())),
    ));

    out.push((
        "string",
        sp.opt()
            .seq(&char('"'))
            .seq(&es.union(&any_char().intersect(&char_set("\"\\\n").unwrap().invert())).star())
            .seq(&char('"'))
            .seq(&ws.star())
            .plus(),
    ));

    const OPS: &[(&str, &str)] = &[
        ("ellipsis", "..."),
        ("rightassign", ">>="),
        ("leftassign", "<<="),
        ("addassign", "+="),
        ("subassign", "-="),
        ("mulassign", "*="),
        ("divassign", "/="),
        ("modassign", "%="),
        ("andassign", "&="),
        ("xorassign", "^="),
        ("orassign", "|="),
        ("rightop", ">>"),
        ("leftop", "<<"),
        ("incop", "++"),
        ("decop", "--"),
        ("ptrop", "->"),
        ("andop", "&&"),
        ("orop", "||"),
        ("leop", "<="),
        ("geop", ">="),
        ("eqop", "=="),
        ("neop", "!="),
        ("semicolon", ";"),
        ("lbrace", "{"),
        ("lbrace", "<%"),
        ("rbrace", "}"),
        ("rbrace", "%>"),
        ("comma", ","),
        ("colon", ":"),
        ("assign", "="),
        ("lparen", "("),
        ("rparen", ")"),
        ("lbracket", "["),
        ("lbracket", "<:"),
        ("rbracket", "]"),
        ("rbracket", ":>"),
        ("dot", "."),
        ("bitandop", "&"),
        ("notop", "!"),
        ("bitnotop", "~"),
        ("subop", "-"),
        ("addop", "+"),
        ("mulop", "*"),
        ("divop", "/"),
        ("modop", "%"),
        ("ltop", "<"),
        ("gtop", ">"),
        ("bitxorop", "^"),
        ("bitorop", "|"),
        ("ternaryop", "?"),
    ];
    for (name, op) in OPS {
        out.push((name, string(op)));
    }

    out.push(("space", ws.plus()));

    out
}

fn main() {
    let lex = make_lexer(tokens(), &select_first).expect("ANSI C token set builds a valid lexer");

    let mut dot_out = Vec::new();
    dot::write_dot(&lex, &mut dot_out).expect("writing dot output");
    fs::write("c_lexer.dot", dot_out).expect("writing c_lexer.dot");

    let header = c::generate_header(&lex, "C_LEXER_H");
    fs::write("c_lexer.h", header).expect("writing c_lexer.h");
}
