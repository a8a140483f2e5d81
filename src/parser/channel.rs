//! Lexer channels.
//!
//! The lexer is an ordered list of channels; at every input position the
//! first channel that consumes at least one character wins. Channel order is
//! part of the lexer contract: comments before string/character literals
//! before numeric literals before identifiers/keywords before punctuators
//! before preprocessor directives before whitespace, with an unknown-character
//! catch-all at the end so lexing can never loop forever.

use super::lexer::LexError;
use super::token::{is_keyword, punctuators, LexDiagnostic, Token, TokenKind};
use tracing::warn;

/// Character cursor over the decoded source, tracking line (1-based) and
/// column (0-based).
pub struct Cursor {
    chars: Vec<char>,
    pos: usize,
    line: u32,
    column: u32,
}

/// Saved cursor position for pattern backtracking inside a channel.
#[derive(Debug, Clone, Copy)]
pub struct CursorMark {
    pos: usize,
    line: u32,
    column: u32,
}

impl Cursor {
    pub fn new(source: &str) -> Self {
        Self {
            chars: source.chars().collect(),
            pos: 0,
            line: 1,
            column: 0,
        }
    }

    pub fn is_at_end(&self) -> bool {
        self.pos >= self.chars.len()
    }

    pub fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    pub fn peek_ahead(&self, n: usize) -> Option<char> {
        self.chars.get(self.pos + n).copied()
    }

    pub fn advance(&mut self) -> Option<char> {
        let ch = self.chars.get(self.pos).copied()?;
        self.pos += 1;
        if ch == '\n' {
            self.line += 1;
            self.column = 0;
        } else {
            self.column += 1;
        }
        Some(ch)
    }

    /// True when the upcoming characters equal `text`.
    pub fn starts_with(&self, text: &str) -> bool {
        text.chars()
            .enumerate()
            .all(|(i, ch)| self.peek_ahead(i) == Some(ch))
    }

    pub fn mark(&self) -> CursorMark {
        CursorMark {
            pos: self.pos,
            line: self.line,
            column: self.column,
        }
    }

    pub fn reset(&mut self, mark: CursorMark) {
        self.pos = mark.pos;
        self.line = mark.line;
        self.column = mark.column;
    }

    /// The lexeme consumed since `mark`.
    pub fn text_since(&self, mark: CursorMark) -> String {
        self.chars[mark.pos..self.pos].iter().collect()
    }

    pub fn line(&self) -> u32 {
        self.line
    }

    pub fn column(&self) -> u32 {
        self.column
    }
}

/// Collects tokens produced by the channels and attaches pending trivia to
/// the next significant token.
#[derive(Default)]
pub struct Sink {
    tokens: Vec<Token>,
    pending_trivia: Vec<Token>,
    diagnostics: Vec<LexDiagnostic>,
}

impl Sink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_token(&mut self, mut token: Token) {
        token.trivia = std::mem::take(&mut self.pending_trivia);
        self.tokens.push(token);
    }

    pub fn push_trivia(&mut self, token: Token) {
        self.pending_trivia.push(token);
    }

    pub fn push_diagnostic(&mut self, diagnostic: LexDiagnostic) {
        self.diagnostics.push(diagnostic);
    }

    /// Terminates the stream; trailing trivia attach to the `Eof` token.
    pub fn finish(mut self, eof: Token) -> super::token::TokenStream {
        self.push_token(eof);
        super::token::TokenStream {
            tokens: self.tokens,
            diagnostics: self.diagnostics,
        }
    }
}

/// One recognizer tried in priority order at the current position.
pub trait Channel {
    /// Returns `Ok(true)` when the channel consumed at least one character.
    fn consume(&self, cursor: &mut Cursor, sink: &mut Sink) -> Result<bool, LexError>;
}

fn unterminated(what: &str, mark: CursorMark) -> LexError {
    LexError {
        message: format!("unterminated {}", what),
        line: mark.line,
        column: mark.column,
    }
}

/// `//`, `///` and `/* ... */` comments, emitted as trivia.
pub struct CommentChannel;

impl Channel for CommentChannel {
    fn consume(&self, cursor: &mut Cursor, sink: &mut Sink) -> Result<bool, LexError> {
        if cursor.peek() != Some('/') {
            return Ok(false);
        }
        match cursor.peek_ahead(1) {
            Some('/') => {
                let mark = cursor.mark();
                while let Some(ch) = cursor.peek() {
                    if ch == '\n' {
                        break;
                    }
                    cursor.advance();
                }
                let text = cursor.text_since(mark);
                sink.push_trivia(Token::new(TokenKind::Comment, text, mark.line, mark.column));
                Ok(true)
            }
            Some('*') => {
                let mark = cursor.mark();
                cursor.advance();
                cursor.advance();
                loop {
                    if cursor.is_at_end() {
                        return Err(unterminated("block comment", mark));
                    }
                    if cursor.peek() == Some('*') && cursor.peek_ahead(1) == Some('/') {
                        cursor.advance();
                        cursor.advance();
                        break;
                    }
                    cursor.advance();
                }
                let text = cursor.text_since(mark);
                sink.push_trivia(Token::new(TokenKind::Comment, text, mark.line, mark.column));
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

/// Regular (`"..."`, backslash-escaped, single line) and verbatim
/// (`@"..."`, doubled-quote escaped, may span lines) string literals.
/// The regular form is tried first.
pub struct StringLiteralChannel;

impl Channel for StringLiteralChannel {
    fn consume(&self, cursor: &mut Cursor, sink: &mut Sink) -> Result<bool, LexError> {
        if cursor.peek() == Some('"') {
            let mark = cursor.mark();
            cursor.advance();
            loop {
                match cursor.peek() {
                    None | Some('\n') => return Err(unterminated("string literal", mark)),
                    Some('\\') => {
                        cursor.advance();
                        if cursor.advance().is_none() {
                            return Err(unterminated("string literal", mark));
                        }
                    }
                    Some('"') => {
                        cursor.advance();
                        break;
                    }
                    Some(_) => {
                        cursor.advance();
                    }
                }
            }
            let text = cursor.text_since(mark);
            sink.push_token(Token::new(TokenKind::StringLiteral, text, mark.line, mark.column));
            return Ok(true);
        }
        if cursor.peek() == Some('@') && cursor.peek_ahead(1) == Some('"') {
            let mark = cursor.mark();
            cursor.advance();
            cursor.advance();
            loop {
                match cursor.peek() {
                    None => return Err(unterminated("verbatim string literal", mark)),
                    Some('"') => {
                        cursor.advance();
                        if cursor.peek() == Some('"') {
                            // doubled quote stays inside the literal
                            cursor.advance();
                        } else {
                            break;
                        }
                    }
                    Some(_) => {
                        cursor.advance();
                    }
                }
            }
            let text = cursor.text_since(mark);
            sink.push_token(Token::new(TokenKind::StringLiteral, text, mark.line, mark.column));
            return Ok(true);
        }
        Ok(false)
    }
}

/// `'x'` and `'\n'` character literals.
pub struct CharacterLiteralChannel;

impl Channel for CharacterLiteralChannel {
    fn consume(&self, cursor: &mut Cursor, sink: &mut Sink) -> Result<bool, LexError> {
        if cursor.peek() != Some('\'') {
            return Ok(false);
        }
        let mark = cursor.mark();
        cursor.advance();
        match cursor.peek() {
            None | Some('\n') => return Err(unterminated("character literal", mark)),
            Some('\\') => {
                cursor.advance();
                if cursor.advance().is_none() {
                    return Err(unterminated("character literal", mark));
                }
            }
            Some(_) => {
                cursor.advance();
            }
        }
        if cursor.peek() != Some('\'') {
            return Err(unterminated("character literal", mark));
        }
        cursor.advance();
        let text = cursor.text_since(mark);
        sink.push_token(Token::new(TokenKind::CharacterLiteral, text, mark.line, mark.column));
        Ok(true)
    }
}

/// Numeric literals. The most specific real-number forms (fraction,
/// exponent, type suffix) are tried before hex integers, with plain decimal
/// integers as the fallback.
pub struct NumericLiteralChannel;

impl NumericLiteralChannel {
    fn consume_digits(cursor: &mut Cursor) -> usize {
        let mut n = 0;
        while matches!(cursor.peek(), Some(ch) if ch.is_ascii_digit()) {
            cursor.advance();
            n += 1;
        }
        n
    }

    fn consume_integer_suffix(cursor: &mut Cursor) {
        for _ in 0..2 {
            match cursor.peek() {
                Some('u') | Some('U') | Some('l') | Some('L') => {
                    cursor.advance();
                }
                _ => break,
            }
        }
    }

    /// Exponent part: `e`/`E`, optional sign, at least one digit.
    fn try_exponent(cursor: &mut Cursor) -> bool {
        if !matches!(cursor.peek(), Some('e') | Some('E')) {
            return false;
        }
        let mark = cursor.mark();
        cursor.advance();
        if matches!(cursor.peek(), Some('+') | Some('-')) {
            cursor.advance();
        }
        if Self::consume_digits(cursor) == 0 {
            cursor.reset(mark);
            return false;
        }
        true
    }

    fn try_real(cursor: &mut Cursor) -> bool {
        let mark = cursor.mark();
        if Self::consume_digits(cursor) == 0 {
            cursor.reset(mark);
            return false;
        }
        let mut is_real = false;
        if cursor.peek() == Some('.')
            && matches!(cursor.peek_ahead(1), Some(ch) if ch.is_ascii_digit())
        {
            cursor.advance();
            Self::consume_digits(cursor);
            is_real = true;
        }
        if Self::try_exponent(cursor) {
            is_real = true;
        }
        if matches!(
            cursor.peek(),
            Some('f') | Some('F') | Some('d') | Some('D') | Some('m') | Some('M')
        ) {
            cursor.advance();
            is_real = true;
        }
        if !is_real {
            cursor.reset(mark);
        }
        is_real
    }

    fn try_hex(cursor: &mut Cursor) -> bool {
        if cursor.peek() != Some('0') || !matches!(cursor.peek_ahead(1), Some('x') | Some('X')) {
            return false;
        }
        let mark = cursor.mark();
        cursor.advance();
        cursor.advance();
        let mut digits = 0;
        while matches!(cursor.peek(), Some(ch) if ch.is_ascii_hexdigit()) {
            cursor.advance();
            digits += 1;
        }
        if digits == 0 {
            cursor.reset(mark);
            return false;
        }
        Self::consume_integer_suffix(cursor);
        true
    }
}

impl Channel for NumericLiteralChannel {
    fn consume(&self, cursor: &mut Cursor, sink: &mut Sink) -> Result<bool, LexError> {
        if !matches!(cursor.peek(), Some(ch) if ch.is_ascii_digit()) {
            return Ok(false);
        }
        let mark = cursor.mark();
        let kind = if Self::try_real(cursor) {
            TokenKind::RealLiteral
        } else if Self::try_hex(cursor) {
            TokenKind::HexLiteral
        } else {
            Self::consume_digits(cursor);
            Self::consume_integer_suffix(cursor);
            TokenKind::IntegerLiteral
        };
        let text = cursor.text_since(mark);
        sink.push_token(Token::new(kind, text, mark.line, mark.column));
        Ok(true)
    }
}

/// Identifiers, re-tagged as keywords after the full span is consumed so
/// keyword prefixes (`internal2`) stay identifiers. A leading `@` always
/// produces an identifier (`@class`).
pub struct IdentifierChannel;

fn is_identifier_start(ch: char) -> bool {
    ch.is_ascii_alphabetic() || ch == '_'
}

fn is_identifier_part(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_'
}

impl Channel for IdentifierChannel {
    fn consume(&self, cursor: &mut Cursor, sink: &mut Sink) -> Result<bool, LexError> {
        let verbatim = cursor.peek() == Some('@')
            && matches!(cursor.peek_ahead(1), Some(ch) if is_identifier_start(ch));
        if !verbatim && !matches!(cursor.peek(), Some(ch) if is_identifier_start(ch)) {
            return Ok(false);
        }
        let mark = cursor.mark();
        if verbatim {
            cursor.advance();
        }
        cursor.advance();
        while matches!(cursor.peek(), Some(ch) if is_identifier_part(ch)) {
            cursor.advance();
        }
        let text = cursor.text_since(mark);
        let kind = if !verbatim && is_keyword(&text) {
            TokenKind::Keyword
        } else {
            TokenKind::Identifier
        };
        sink.push_token(Token::new(kind, text, mark.line, mark.column));
        Ok(true)
    }
}

/// Punctuators, longest match first against the fixed table.
pub struct PunctuatorChannel;

impl Channel for PunctuatorChannel {
    fn consume(&self, cursor: &mut Cursor, sink: &mut Sink) -> Result<bool, LexError> {
        for punct in punctuators() {
            if cursor.starts_with(punct) {
                let mark = cursor.mark();
                for _ in 0..punct.chars().count() {
                    cursor.advance();
                }
                sink.push_token(Token::new(
                    TokenKind::Punctuator,
                    *punct,
                    mark.line,
                    mark.column,
                ));
                return Ok(true);
            }
        }
        Ok(false)
    }
}

/// `#...` directives, consumed to end of line and emitted as trivia for
/// later special handling.
pub struct PreprocessorChannel;

impl Channel for PreprocessorChannel {
    fn consume(&self, cursor: &mut Cursor, sink: &mut Sink) -> Result<bool, LexError> {
        if cursor.peek() != Some('#') {
            return Ok(false);
        }
        let mark = cursor.mark();
        while let Some(ch) = cursor.peek() {
            if ch == '\n' {
                break;
            }
            cursor.advance();
        }
        let text = cursor.text_since(mark);
        sink.push_trivia(Token::new(TokenKind::Preprocessor, text, mark.line, mark.column));
        Ok(true)
    }
}

/// Whitespace skip; produces nothing.
pub struct WhitespaceChannel;

impl Channel for WhitespaceChannel {
    fn consume(&self, cursor: &mut Cursor, _sink: &mut Sink) -> Result<bool, LexError> {
        let mut consumed = false;
        while matches!(cursor.peek(), Some(' ') | Some('\t') | Some('\r') | Some('\n')) {
            cursor.advance();
            consumed = true;
        }
        Ok(consumed)
    }
}

/// Catch-all: consumes exactly one character and records a diagnostic.
/// With `fail_fast` the whole lex operation fails instead.
pub struct UnknownCharacterChannel {
    pub fail_fast: bool,
}

impl Channel for UnknownCharacterChannel {
    fn consume(&self, cursor: &mut Cursor, sink: &mut Sink) -> Result<bool, LexError> {
        let line = cursor.line();
        let column = cursor.column();
        let ch = match cursor.advance() {
            Some(ch) => ch,
            None => return Ok(false),
        };
        let message = format!("unknown character '{}'", ch);
        if self.fail_fast {
            return Err(LexError { message, line, column });
        }
        warn!(line, column, "discarding {}", message);
        sink.push_diagnostic(LexDiagnostic { line, column, message });
        Ok(true)
    }
}
