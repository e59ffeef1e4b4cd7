//! Lexical extraction of top-level type declarations.
//!
//! Source files are not parsed semantically. Comments and literals are
//! blanked out, braces are counted, and `class`/`interface`/`struct`/`enum`/
//! `record` keywords found directly inside a namespace body (or the file body)
//! are reported as declarations.

use regex::Regex;

/// Namespace and type names declared by a single source file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileDeclarations {
    /// First namespace declared in the file, empty when there is none.
    pub namespace: String,

    /// Top-level type names, in source order, without duplicates.
    pub type_names: Vec<String>,
}

const DECLARATION_PATTERN: &str = r"\b(?:namespace\s+(?P<ns>[A-Za-z_][\w.]*)\s*(?P<term>[;{])|(?:class|interface|struct|enum|record(?:\s+(?:class|struct))?)\s+(?P<ty>[A-Za-z_]\w*))";

/// Words that can follow `class`/`struct` in generic constraints.
const NOT_A_NAME: [&str; 3] = ["where", "new", "unmanaged"];

/// Lexical declaration extractor.
#[derive(Debug, Clone)]
pub struct DeclarationParser {
    pattern: Regex,
}

impl DeclarationParser {
    /// Compile the declaration pattern.
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            pattern: Regex::new(DECLARATION_PATTERN)?,
        })
    }

    /// Extract the namespace and top-level type names from source text.
    pub fn parse(&self, source: &str) -> FileDeclarations {
        parse_with(&self.pattern, source)
    }
}

fn parse_with(pattern: &Regex, source: &str) -> FileDeclarations {
    let cleaned = strip_comments_and_literals(source);
    let mut result = FileDeclarations::default();
    let mut namespace_seen = false;

    // Brace depths whose contents are namespace bodies. Depth 0 always counts.
    let mut namespace_bodies: Vec<usize> = Vec::new();
    let mut depth = 0usize;
    let mut cursor = 0usize;

    for caps in pattern.captures_iter(&cleaned) {
        let Some(whole) = caps.get(0) else { continue };
        count_braces(&cleaned[cursor..whole.start()], &mut depth, &mut namespace_bodies);
        cursor = whole.end();

        let at_top_level = depth == 0 || namespace_bodies.last() == Some(&depth);

        if let Some(ns) = caps.name("ns") {
            if !namespace_seen {
                result.namespace = ns.as_str().to_string();
                namespace_seen = true;
            }
            if caps.name("term").map(|t| t.as_str()) == Some("{") {
                depth += 1;
                namespace_bodies.push(depth);
            }
            continue;
        }

        if let Some(ty) = caps.name("ty") {
            let name = ty.as_str();
            if at_top_level
                && !NOT_A_NAME.contains(&name)
                && !result.type_names.iter().any(|n| n == name)
            {
                result.type_names.push(name.to_string());
            }
        }
    }

    result
}

fn count_braces(text: &str, depth: &mut usize, namespace_bodies: &mut Vec<usize>) {
    for c in text.chars() {
        match c {
            '{' => *depth += 1,
            '}' => {
                *depth = depth.saturating_sub(1);
                while namespace_bodies.last().is_some_and(|d| *d > *depth) {
                    namespace_bodies.pop();
                }
            }
            _ => {}
        }
    }
}

/// Replace comments and string/char literals with spaces, keeping newlines.
fn strip_comments_and_literals(source: &str) -> String {
    #[derive(Clone, Copy, PartialEq)]
    enum State {
        Code,
        LineComment,
        BlockComment,
        Str,
        VerbatimStr,
        Char,
    }

    let chars: Vec<char> = source.chars().collect();
    let mut out = String::with_capacity(source.len());
    let mut state = State::Code;
    let mut i = 0;

    let blank = |c: char| if c == '\n' { '\n' } else { ' ' };

    while i < chars.len() {
        let c = chars[i];
        let next = chars.get(i + 1).copied();

        match state {
            State::Code => match (c, next) {
                ('/', Some('/')) => {
                    state = State::LineComment;
                    out.push_str("  ");
                    i += 1;
                }
                ('/', Some('*')) => {
                    state = State::BlockComment;
                    out.push_str("  ");
                    i += 1;
                }
                ('@', Some('"')) | ('$', Some('@')) | ('@', Some('$')) => {
                    // @"...", $@"..." and @$"..." all use doubled quotes
                    let skip = if next == Some('"') { 1 } else { 2 };
                    for _ in 0..=skip {
                        out.push(' ');
                    }
                    i += skip;
                    state = State::VerbatimStr;
                }
                ('"', _) => {
                    state = State::Str;
                    out.push(' ');
                }
                ('\'', _) => {
                    state = State::Char;
                    out.push(' ');
                }
                _ => out.push(c),
            },
            State::LineComment => {
                if c == '\n' {
                    state = State::Code;
                }
                out.push(blank(c));
            }
            State::BlockComment => {
                if c == '*' && next == Some('/') {
                    state = State::Code;
                    out.push_str("  ");
                    i += 1;
                } else {
                    out.push(blank(c));
                }
            }
            State::Str | State::Char => {
                let close = if state == State::Str { '"' } else { '\'' };
                if c == '\\' {
                    out.push(' ');
                    if let Some(n) = next {
                        out.push(blank(n));
                        i += 1;
                    }
                } else {
                    if c == close || c == '\n' {
                        state = State::Code;
                    }
                    out.push(blank(c));
                }
            }
            State::VerbatimStr => {
                if c == '"' && next == Some('"') {
                    out.push_str("  ");
                    i += 1;
                } else {
                    if c == '"' {
                        state = State::Code;
                    }
                    out.push(blank(c));
                }
            }
        }

        i += 1;
    }

    out
}
