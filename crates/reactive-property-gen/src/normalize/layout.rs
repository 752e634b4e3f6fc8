//! Deterministic layout for parsed Rust token streams.
//!
//! Whitespace never changes how Rust parses, so the only hard constraints are
//! that line comments end a line and adjacent punctuation never fuses into a
//! different operator. Everything else is a fixed table of spacing decisions
//! keyed on the previous token's class.
use proc_macro2::{Delimiter, Group, Literal, Spacing, TokenStream, TokenTree};

const INDENT: &str = "    ";

/// Multi-character operators, longest first within each family.
const OPERATORS: &[&str] = &[
    "<<=", ">>=", "...", "..=", "::", "->", "=>", "==", "!=", "<=", ">=", "&&", "||", "+=", "-=",
    "*=", "/=", "%=", "^=", "&=", "|=", "<<", ">>", "..",
];

/// Words after which an operand, not an operator, is expected.
const KEYWORDS: &[&str] = &[
    "as", "async", "break", "const", "continue", "dyn", "else", "enum", "extern", "fn", "for", "if",
    "impl", "in", "let", "loop", "match", "mod", "move", "mut", "pub", "ref", "return", "static",
    "struct", "trait", "type", "unsafe", "use", "where", "while", "yield",
];

/// Words whose next identifier names a declaration that may take generics.
const DECLARATIONS: &[&str] = &["enum", "fn", "struct", "trait", "type", "union"];

/// Tokens that open an item; a block closing before one gets a blank line.
const ITEM_STARTS: &[&str] = &[
    "pub",
    "fn",
    "const",
    "static",
    "struct",
    "enum",
    "union",
    "trait",
    "impl",
    "type",
    "mod",
    "use",
    "extern",
    "macro_rules",
];

/// Render a whole file: items separated by blank lines, ending in a newline.
#[must_use]
pub fn render_file(tokens: TokenStream) -> String {
    let tokens: Vec<TokenTree> = tokens.into_iter().collect();

    let mut printer = Printer::default();
    printer.stream(&tokens, Frame::new(Mode::Block, true));

    let mut out = printer.out;
    out.push('\n');
    out
}

/// Render tokens on a single line where the tokens allow it.
#[must_use]
pub fn render_inline(tokens: TokenStream) -> String {
    let tokens: Vec<TokenTree> = tokens.into_iter().collect();

    let mut printer = Printer::default();
    printer.stream(&tokens, Frame::new(Mode::Inline, false));

    printer.out
}

///
/// Prev
/// class of the last token written; drives the spacing before the next one
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Prev {
    Start,
    Word {
        keyword: bool,
        generic: bool,
        glue_paren: bool,
    },
    Literal,
    Tick,
    Lifetime,
    Unary,
    PathSep,
    Range,
    GenericOpen,
    GenericClose,
    ClosureOpen,
    Colon,
    Comma,
    Semi,
    Bang,
    Hash,
    Dollar,
    Dot,
    Question,
    Punct,
    Group,
    Block,
    Attr,
}

impl Prev {
    // tokens that attach directly to whatever follows
    const fn glues(self) -> bool {
        matches!(
            self,
            Self::Start
                | Self::Tick
                | Self::Unary
                | Self::PathSep
                | Self::Range
                | Self::GenericOpen
                | Self::ClosureOpen
                | Self::Dot
                | Self::Hash
                | Self::Dollar
        )
    }

    // whether the next token starts an operand
    const fn expects_operand(self) -> bool {
        matches!(
            self,
            Self::Start
                | Self::Word { keyword: true, .. }
                | Self::Punct
                | Self::Comma
                | Self::Colon
                | Self::Semi
                | Self::Block
                | Self::Attr
                | Self::Unary
                | Self::GenericOpen
                | Self::ClosureOpen
                | Self::Range
        )
    }

    // whether the last token ends an operand that `.` / `?` can follow
    const fn ends_operand(self) -> bool {
        matches!(
            self,
            Self::Word { .. }
                | Self::Literal
                | Self::Group
                | Self::GenericClose
                | Self::Question
                | Self::Block
        )
    }

    const fn is_plain_word(self) -> bool {
        matches!(self, Self::Word { keyword: false, .. })
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Mode {
    Block,
    Inline,
}

///
/// Frame
/// per-delimiter state
///

#[derive(Clone, Copy, Debug)]
struct Frame {
    mode: Mode,
    top: bool,
    generics: usize,
    closure: bool,
}

impl Frame {
    const fn new(mode: Mode, top: bool) -> Self {
        Self {
            mode,
            top,
            generics: 0,
            closure: false,
        }
    }
}

///
/// Printer
///

#[derive(Debug)]
struct Printer {
    out: String,
    indent: usize,
    pending: usize,
    prev: Prev,
    declaration: bool,
}

impl Default for Printer {
    fn default() -> Self {
        Self {
            out: String::new(),
            indent: 0,
            pending: 0,
            prev: Prev::Start,
            declaration: false,
        }
    }
}

impl Printer {
    fn stream(&mut self, tokens: &[TokenTree], mut frame: Frame) {
        let mut i = 0;

        while i < tokens.len() {
            if let Some(consumed) = self.attribute(&tokens[i..], frame) {
                i += consumed;
                continue;
            }

            match &tokens[i] {
                TokenTree::Ident(ident) => {
                    self.word(&ident.to_string());
                    i += 1;
                }
                TokenTree::Literal(literal) => {
                    self.literal(literal);
                    i += 1;
                }
                TokenTree::Punct(_) => {
                    let (op, len) = self.operator(&tokens[i..], frame);
                    self.punct(&op, &mut frame);
                    i += len;
                }
                TokenTree::Group(group) => {
                    self.group(group, tokens.get(i + 1), frame);
                    i += 1;
                }
            }
        }
    }

    // write
    // flushes pending line breaks, or a single space when asked for
    fn write(&mut self, text: &str, space: bool) {
        if self.pending > 0 {
            if !self.out.is_empty() {
                for _ in 0..self.pending {
                    self.out.push('\n');
                }
            }
            for _ in 0..self.indent {
                self.out.push_str(INDENT);
            }
            self.pending = 0;
        } else if space && !self.at_line_start() {
            self.out.push(' ');
        }

        self.out.push_str(text);
    }

    fn newline(&mut self, lines: usize) {
        self.pending = self.pending.max(lines);
    }

    fn at_line_start(&self) -> bool {
        self.pending > 0 || self.out.is_empty() || self.out.ends_with('\n')
    }

    fn word(&mut self, text: &str) {
        let space = !self.prev.glues();
        self.write(text, space);

        if self.prev == Prev::Tick {
            self.prev = Prev::Lifetime;
            self.declaration = false;
            return;
        }

        let keyword = KEYWORDS.contains(&text);
        self.prev = Prev::Word {
            keyword,
            generic: self.declaration
                || text.starts_with(char::is_uppercase)
                || matches!(text, "impl" | "for"),
            glue_paren: !keyword || matches!(text, "pub" | "fn"),
        };
        self.declaration = DECLARATIONS.contains(&text);
    }

    fn literal(&mut self, literal: &Literal) {
        let space = !self.prev.glues();
        self.write(&literal.to_string(), space);

        self.prev = Prev::Literal;
        self.declaration = false;
    }

    // operator
    // gathers one operator from joint punctuation, splitting generic brackets
    // back out of shift and comparison operators
    fn operator(&self, tokens: &[TokenTree], frame: Frame) -> (String, usize) {
        let mut op = String::new();
        for token in tokens {
            let TokenTree::Punct(punct) = token else {
                break;
            };
            let mut candidate = op.clone();
            candidate.push(punct.as_char());
            if !op.is_empty() && !OPERATORS.iter().any(|known| known.starts_with(&candidate)) {
                break;
            }

            op = candidate;
            if punct.spacing() == Spacing::Alone {
                break;
            }
        }

        let split = match op.chars().next() {
            Some('<') => self.generic_open_allowed() && op != "<=",
            Some('>') => frame.generics > 0,
            _ => false,
        };
        if split {
            op.truncate(1);
        }

        let len = op.chars().count().max(1);
        (op, len)
    }

    // `<` after a type-like word or `::`, or where an operand is expected
    // and it can only open a qualified path
    const fn generic_open_allowed(&self) -> bool {
        matches!(self.prev, Prev::Word { generic: true, .. } | Prev::PathSep)
            || self.prev.expects_operand()
    }

    fn punct(&mut self, op: &str, frame: &mut Frame) {
        let glued = self.prev.glues();
        let operand = self.prev.expects_operand();
        self.declaration = false;

        let (space, next) = match op {
            "'" => (!glued, Prev::Tick),
            "," => (false, Prev::Comma),
            ";" => (false, Prev::Semi),
            ":" => (false, Prev::Colon),
            "." => (!glued && !self.prev.ends_operand(), Prev::Dot),
            ".." | "..." | "..=" => (
                !glued
                    && !(self.prev.is_plain_word()
                        || matches!(
                            self.prev,
                            Prev::Literal | Prev::Group | Prev::GenericClose | Prev::Block
                        )),
                Prev::Range,
            ),
            "::" => (
                !glued
                    && !(self.prev.is_plain_word()
                        || matches!(self.prev, Prev::Group | Prev::GenericClose)),
                Prev::PathSep,
            ),
            "?" if operand => (!glued, Prev::Unary),
            "?" => (!glued && !self.prev.ends_operand(), Prev::Question),
            "#" => (!glued, Prev::Hash),
            "$" => (!glued, Prev::Dollar),
            "!" if self.prev.is_plain_word() => (false, Prev::Bang),
            "<" if self.generic_open_allowed() => {
                frame.generics += 1;
                // a qualified path opening an operand keeps its separating space
                let qualified = operand && !glued && !matches!(self.prev, Prev::Word { .. });
                (qualified, Prev::GenericOpen)
            }
            ">" if frame.generics > 0 => {
                frame.generics -= 1;
                (false, Prev::GenericClose)
            }
            "|" if frame.closure => {
                frame.closure = false;
                (false, Prev::Punct)
            }
            "|" if operand => {
                frame.closure = true;
                (!glued, Prev::ClosureOpen)
            }
            "&" | "&&" | "*" | "-" | "!" if operand => (!glued, Prev::Unary),
            _ => (!glued, Prev::Punct),
        };

        self.write(op, space);
        self.prev = next;

        if frame.mode == Mode::Block {
            match op {
                "," if frame.generics == 0 && !frame.closure => self.newline(1),
                ";" => self.newline(if frame.top { 2 } else { 1 }),
                _ => {}
            }
        }
    }

    fn group(&mut self, group: &Group, next: Option<&TokenTree>, frame: Frame) {
        self.declaration = false;

        let tokens: Vec<TokenTree> = group.stream().into_iter().collect();
        match group.delimiter() {
            Delimiter::None => self.stream(&tokens, Frame::new(Mode::Inline, false)),
            Delimiter::Parenthesis => self.inline("(", &tokens, ")", self.paren_space()),
            Delimiter::Bracket => self.inline("[", &tokens, "]", self.bracket_space()),
            Delimiter::Brace if tokens.is_empty() => {
                let space = !self.prev.glues();
                self.write("{}", space);
                self.prev = Prev::Group;
                self.after_block(next, frame);
            }
            Delimiter::Brace if self.prev == Prev::PathSep => {
                self.inline("{", &tokens, "}", false);
            }
            // const-generic arguments and braces nested in parens or brackets
            Delimiter::Brace
                if frame.mode == Mode::Inline
                    || (frame.generics > 0
                        && matches!(self.prev, Prev::GenericOpen | Prev::Comma)) =>
            {
                self.write("{ ", !self.prev.glues());
                self.prev = Prev::Start;
                self.stream(&tokens, Frame::new(Mode::Inline, false));
                self.write("}", true);
                self.prev = Prev::Group;
            }
            Delimiter::Brace => {
                self.block(&tokens);
                self.after_block(next, frame);
            }
        }
    }

    fn paren_space(&self) -> bool {
        !self.prev.glues()
            && !matches!(
                self.prev,
                Prev::Word {
                    glue_paren: true,
                    ..
                } | Prev::Bang
                    | Prev::Group
                    | Prev::GenericClose
            )
    }

    fn bracket_space(&self) -> bool {
        !self.prev.glues()
            && !self.prev.is_plain_word()
            && !matches!(self.prev, Prev::Bang | Prev::Group | Prev::Literal)
    }

    fn inline(&mut self, open: &str, tokens: &[TokenTree], close: &str, space: bool) {
        self.write(open, space);
        self.prev = Prev::Start;
        self.stream(tokens, Frame::new(Mode::Inline, false));
        self.write(close, false);
        self.prev = Prev::Group;
    }

    fn block(&mut self, tokens: &[TokenTree]) {
        self.write("{", true);
        self.indent += 1;
        self.newline(1);
        self.prev = Prev::Start;

        self.stream(tokens, Frame::new(Mode::Block, false));

        self.indent -= 1;
        self.pending = 1;
        self.write("}", false);
        self.prev = Prev::Block;
    }

    // after_block
    // a closing brace ends the line unless the next token continues the
    // expression it closed
    fn after_block(&mut self, next: Option<&TokenTree>, frame: Frame) {
        if frame.mode != Mode::Block {
            return;
        }

        let item = match next {
            None => return,
            Some(TokenTree::Punct(punct)) => match punct.as_char() {
                '#' => true,
                '\'' | '$' => false,
                _ => return,
            },
            Some(TokenTree::Ident(ident)) => {
                let word = ident.to_string();
                if matches!(word.as_str(), "else" | "as") {
                    return;
                }
                ITEM_STARTS.contains(&word.as_str())
            }
            Some(_) => false,
        };

        self.newline(if frame.top || item { 2 } else { 1 });
    }

    // attribute
    // `#[..]` / `#![..]`; doc attributes become comments on their own line
    fn attribute(&mut self, tokens: &[TokenTree], frame: Frame) -> Option<usize> {
        let TokenTree::Punct(hash) = tokens.first()? else {
            return None;
        };
        if hash.as_char() != '#' {
            return None;
        }

        let (inner, at) = match tokens.get(1)? {
            TokenTree::Punct(bang) if bang.as_char() == '!' => (true, 2),
            _ => (false, 1),
        };
        let TokenTree::Group(group) = tokens.get(at)? else {
            return None;
        };
        if group.delimiter() != Delimiter::Bracket {
            return None;
        }

        let comment = (frame.mode == Mode::Block && self.at_line_start())
            .then(|| doc_comment(group.stream(), inner))
            .flatten();

        if let Some(line) = comment {
            self.write(&line, false);
        } else {
            let space = !self.prev.glues();
            self.write(if inner { "#!" } else { "#" }, space);
            self.prev = Prev::Hash;

            let tokens: Vec<TokenTree> = group.stream().into_iter().collect();
            self.inline("[", &tokens, "]", false);
        }

        self.prev = Prev::Attr;
        self.declaration = false;
        if frame.mode == Mode::Block {
            self.newline(1);
        }

        Some(at + 1)
    }
}

// doc_comment
// `doc = "text"` as a `///` or `//!` line, when the text survives the trip
fn doc_comment(stream: TokenStream, inner: bool) -> Option<String> {
    let mut tokens = stream.into_iter();
    let (
        Some(TokenTree::Ident(name)),
        Some(TokenTree::Punct(eq)),
        Some(TokenTree::Literal(literal)),
        None,
    ) = (tokens.next(), tokens.next(), tokens.next(), tokens.next())
    else {
        return None;
    };
    if name != "doc" || eq.as_char() != '=' {
        return None;
    }

    let syn::Lit::Str(text) = syn::Lit::new(literal) else {
        return None;
    };
    let text = text.value();
    if text.contains(['\n', '\r']) || (!inner && text.starts_with('/')) {
        return None;
    }

    let prefix = if inner { "//!" } else { "///" };
    Some(format!("{prefix}{text}"))
}
