//! Line-oriented tokenizer for the generated Python source shown in the code
//! viewer.
//!
//! The tokenizer is deliberately shallow: it recognises enough structure to
//! colour keywords, builtins, strings, comments, numbers, decorators and the
//! names introduced by `def`/`class`. Everything else is plain text.

use std::sync::LazyLock;

use regex::Regex;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Text shown in the code viewer while no code has been loaded.
pub const CODE_PLACEHOLDER: &str = "Click a button in Output Panel to see code here.";

/// Text stored as the current code when fetching a step's code fails.
pub const CODE_LOAD_FAILED: &str = "Failed to load code";

const KEYWORDS: &[&str] = &[
    "False", "None", "True", "and", "as", "assert", "async", "await", "break", "class",
    "continue", "def", "del", "elif", "else", "except", "finally", "for", "from", "global",
    "if", "import", "in", "is", "lambda", "nonlocal", "not", "or", "pass", "raise", "return",
    "try", "while", "with", "yield",
];

const BUILTINS: &[&str] = &[
    "abs", "all", "any", "bool", "dict", "enumerate", "filter", "float", "frozenset",
    "getattr", "hasattr", "int", "isinstance", "len", "list", "map", "max", "min", "open",
    "print", "range", "repr", "round", "self", "set", "setattr", "sorted", "str", "sum",
    "super", "tuple", "type", "zip",
];

/// One alternative per token class; the first alternative that matches at a
/// position wins, so complete triple-quoted strings precede unterminated ones
/// and both precede ordinary quotes.
const TOKEN_PATTERN: &str = concat!(
    r"(?P<comment>#.*)",
    r#"|(?P<triple>[rRbBuUfF]{0,2}(?:""".*?"""|'''.*?'''))"#,
    r#"|(?P<open>[rRbBuUfF]{0,2}(?:"""|'''))"#,
    r#"|(?P<string>[rRbBuUfF]{0,2}(?:"(?:[^"\\]|\\.)*"|'(?:[^'\\]|\\.)*'))"#,
    r"|(?P<decorator>@[A-Za-z_][\w.]*)",
    r"|(?P<number>\b\d+(?:\.\d*)?(?:[eE][+-]?\d+)?\b)",
    r"|(?P<word>[A-Za-z_]\w*)",
);

static TOKEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(TOKEN_PATTERN).expect("valid regex"));

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Keyword,
    Builtin,
    String,
    Comment,
    Number,
    Decorator,
    FunctionName,
    Plain,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tokenizer
// ---------------------------------------------------------------------------

/// Split `code` into lines of tokens.
///
/// Concatenating the token texts of a line reproduces the line exactly.
/// Triple-quoted strings may span lines.
pub fn tokenize(code: &str) -> Vec<Vec<Token>> {
    let mut open_string: Option<&'static str> = None;
    code.lines()
        .map(|line| tokenize_line(line, &mut open_string))
        .collect()
}

fn tokenize_line(line: &str, open_string: &mut Option<&'static str>) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut rest = line;

    if let Some(delimiter) = *open_string {
        match rest.find(delimiter) {
            Some(idx) => {
                let end = idx + delimiter.len();
                push(&mut tokens, TokenKind::String, &rest[..end]);
                rest = &rest[end..];
                *open_string = None;
            }
            None => {
                push(&mut tokens, TokenKind::String, rest);
                return tokens;
            }
        }
    }

    let mut cursor = 0;
    let mut after_definition = false;
    for caps in TOKEN_RE.captures_iter(rest) {
        let Some(whole) = caps.get(0) else { continue };
        push(&mut tokens, TokenKind::Plain, &rest[cursor..whole.start()]);
        cursor = whole.end();

        if caps.name("open").is_some() {
            *open_string = Some(if whole.as_str().ends_with("'''") {
                "'''"
            } else {
                "\"\"\""
            });
            push(&mut tokens, TokenKind::String, &rest[whole.start()..]);
            return tokens;
        }

        let kind = if caps.name("comment").is_some() {
            TokenKind::Comment
        } else if caps.name("string").is_some() || caps.name("triple").is_some() {
            TokenKind::String
        } else if caps.name("decorator").is_some() {
            TokenKind::Decorator
        } else if caps.name("number").is_some() {
            TokenKind::Number
        } else {
            classify_word(whole.as_str(), after_definition)
        };
        after_definition = matches!(whole.as_str(), "def" | "class");
        push(&mut tokens, kind, whole.as_str());
    }
    push(&mut tokens, TokenKind::Plain, &rest[cursor..]);
    tokens
}

fn classify_word(word: &str, after_definition: bool) -> TokenKind {
    if after_definition {
        TokenKind::FunctionName
    } else if KEYWORDS.contains(&word) {
        TokenKind::Keyword
    } else if BUILTINS.contains(&word) {
        TokenKind::Builtin
    } else {
        TokenKind::Plain
    }
}

/// Append a token, merging runs of plain text.
fn push(tokens: &mut Vec<Token>, kind: TokenKind, text: &str) {
    if text.is_empty() {
        return;
    }
    if kind == TokenKind::Plain {
        if let Some(last) = tokens.last_mut().filter(|t| t.kind == TokenKind::Plain) {
            last.text.push_str(text);
            return;
        }
    }
    tokens.push(Token::new(kind, text));
}
