//! Token definitions shared by the lexer, the parser and the visitors.
//!
//! Comment and preprocessor tokens are produced by the lexer like any other
//! token, but they ride as *trivia* on the next significant token instead of
//! entering the main stream, so the grammar only ever sees code tokens.
//! The keyword and punctuator tables below are the single source of truth;
//! external colorizers are expected to sync against [`keywords`] and
//! [`punctuators`].

use std::fmt;

/// Classification of a lexed token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Keyword,
    Identifier,
    IntegerLiteral,
    HexLiteral,
    RealLiteral,
    CharacterLiteral,
    StringLiteral,
    Punctuator,
    Comment,
    Preprocessor,
    Eof,
}

impl TokenKind {
    /// Trivia tokens are attached to the next significant token instead of
    /// being fed to the parser.
    pub fn is_trivia(self) -> bool {
        matches!(self, TokenKind::Comment | TokenKind::Preprocessor)
    }

    /// Human-readable description used in recognition errors.
    pub fn describe(self) -> &'static str {
        match self {
            TokenKind::Keyword => "keyword",
            TokenKind::Identifier => "identifier",
            TokenKind::IntegerLiteral => "integer literal",
            TokenKind::HexLiteral => "hex literal",
            TokenKind::RealLiteral => "real literal",
            TokenKind::CharacterLiteral => "character literal",
            TokenKind::StringLiteral => "string literal",
            TokenKind::Punctuator => "punctuator",
            TokenKind::Comment => "comment",
            TokenKind::Preprocessor => "preprocessor directive",
            TokenKind::Eof => "end of file",
        }
    }
}

/// One lexed token.
///
/// `text` is the original lexeme, including quotes and escape sequences for
/// literals, so concatenating token texts reconstructs the non-whitespace
/// content of the input. `line` is 1-based, `column` 0-based.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub line: u32,
    pub column: u32,
    /// Leading comment/preprocessor tokens collected since the previous
    /// significant token.
    pub trivia: Vec<Token>,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, line: u32, column: u32) -> Self {
        Self {
            kind,
            text: text.into(),
            line,
            column,
            trivia: Vec::new(),
        }
    }

    /// Last physical line this token touches. Verbatim strings and block
    /// comments may span several lines.
    pub fn end_line(&self) -> u32 {
        self.line + self.text.matches('\n').count() as u32
    }

    /// Number of physical lines the token spans.
    pub fn spanned_lines(&self) -> u32 {
        self.end_line() - self.line + 1
    }

    /// Documentation comments introduce the member that follows them.
    pub fn is_doc_comment(&self) -> bool {
        self.kind == TokenKind::Comment
            && (self.text.starts_with("///") || self.text.starts_with("/**"))
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TokenKind::Eof => write!(f, "end of file"),
            TokenKind::Identifier => write!(f, "identifier '{}'", self.text),
            _ => write!(f, "'{}'", self.text),
        }
    }
}

/// The lexer's output: significant tokens terminated by an `Eof` token, with
/// trivia already attached, plus any non-fatal diagnostics.
#[derive(Debug, Clone, Default)]
pub struct TokenStream {
    pub tokens: Vec<Token>,
    pub diagnostics: Vec<LexDiagnostic>,
}

impl TokenStream {
    /// Index of the terminating `Eof` token.
    pub fn eof_index(&self) -> usize {
        self.tokens.len() - 1
    }
}

/// Non-fatal lexer diagnostic (unknown character under the
/// warn-and-continue policy).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexDiagnostic {
    pub line: u32,
    pub column: u32,
    pub message: String,
}

/// The C# keyword set, sorted for binary search. Contextual words such as
/// `var`, `get`, `set`, `yield`, `where` or `partial` are deliberately
/// absent: they lex as identifiers and are matched by exact text where the
/// grammar needs them.
const KEYWORDS: &[&str] = &[
    "abstract", "as", "base", "bool", "break", "byte", "case", "catch", "char", "checked",
    "class", "const", "continue", "decimal", "default", "delegate", "do", "double", "else",
    "enum", "event", "explicit", "extern", "false", "finally", "fixed", "float", "for",
    "foreach", "goto", "if", "implicit", "in", "int", "interface", "internal", "is", "lock",
    "long", "namespace", "new", "null", "object", "operator", "out", "override", "params",
    "private", "protected", "public", "readonly", "ref", "return", "sbyte", "sealed", "short",
    "sizeof", "stackalloc", "static", "string", "struct", "switch", "this", "throw", "true",
    "try", "typeof", "uint", "ulong", "unchecked", "unsafe", "ushort", "using", "virtual",
    "void", "volatile", "while",
];

/// Punctuator table, longest lexeme first so the punctuator channel always
/// takes the longest match.
const PUNCTUATORS: &[&str] = &[
    "<<=", ">>=", // three chars
    "++", "--", "&&", "||", "==", "!=", "<=", ">=", "+=", "-=", "*=", "/=", "%=", "&=", "|=",
    "^=", "<<", ">>", "->", "??", "::", "=>", // two chars
    "{", "}", "[", "]", "(", ")", ".", ",", ":", ";", "+", "-", "*", "/", "%", "&", "|", "^",
    "!", "~", "=", "<", ">", "?", // one char
];

/// The keyword table, exposed for the external colorization surface.
pub fn keywords() -> &'static [&'static str] {
    KEYWORDS
}

/// The punctuator table (longest first), exposed for the external
/// colorization surface.
pub fn punctuators() -> &'static [&'static str] {
    PUNCTUATORS
}

/// Exact, case-sensitive keyword membership test.
pub fn is_keyword(text: &str) -> bool {
    KEYWORDS.binary_search(&text).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_table_is_sorted() {
        let mut sorted = KEYWORDS.to_vec();
        sorted.sort_unstable();
        assert_eq!(sorted, KEYWORDS);
    }

    #[test]
    fn test_punctuator_table_is_longest_first() {
        for pair in PUNCTUATORS.windows(2) {
            assert!(pair[0].len() >= pair[1].len(), "{:?} before {:?}", pair[0], pair[1]);
        }
    }

    #[test]
    fn test_multi_line_token_spans_every_line() {
        let token = Token::new(TokenKind::StringLiteral, "@\"a\nb\nc\"", 3, 0);
        assert_eq!(token.end_line(), 5);
        assert_eq!(token.spanned_lines(), 3);
    }

    #[test]
    fn test_doc_comment_detection() {
        assert!(Token::new(TokenKind::Comment, "/// docs", 1, 0).is_doc_comment());
        assert!(Token::new(TokenKind::Comment, "/** docs */", 1, 0).is_doc_comment());
        assert!(!Token::new(TokenKind::Comment, "// plain", 1, 0).is_doc_comment());
    }
}
