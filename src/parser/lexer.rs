//! Lexer for C# source text.
//!
//! Drives the ordered channel list from [`channel`](super::channel) over a
//! character cursor until the input is exhausted, then terminates the stream
//! with an `Eof` token. The lexer is restartable from the start of the input
//! (each [`Lexer::tokenize`] call uses a fresh cursor) but not from the
//! middle of a previous run.

use super::channel::{
    Channel, CharacterLiteralChannel, CommentChannel, Cursor, IdentifierChannel,
    NumericLiteralChannel, PreprocessorChannel, PunctuatorChannel, Sink, StringLiteralChannel,
    UnknownCharacterChannel, WhitespaceChannel,
};
use super::token::{Token, TokenKind, TokenStream};
use thiserror::Error;

/// Fatal lexer error: an unterminated literal or comment, or an unknown
/// character under the fail-fast policy.
#[derive(Debug, Clone, Error)]
#[error("lex error at line {line}, column {column}: {message}")]
pub struct LexError {
    pub message: String,
    pub line: u32,
    pub column: u32,
}

/// Channel-composed tokenizer.
pub struct Lexer {
    channels: Vec<Box<dyn Channel>>,
}

impl Lexer {
    /// Lexer with the default warn-and-continue policy for unknown
    /// characters.
    pub fn new() -> Self {
        Self::with_policy(false)
    }

    /// `fail_on_unknown_char` promotes the unknown-character diagnostic to a
    /// fatal [`LexError`].
    pub fn with_policy(fail_on_unknown_char: bool) -> Self {
        // The order is part of the contract: comments, then string/character
        // literals, then numerics, then identifiers/keywords, then
        // punctuators, then preprocessor directives, then whitespace, then
        // the catch-all.
        let channels: Vec<Box<dyn Channel>> = vec![
            Box::new(CommentChannel),
            Box::new(StringLiteralChannel),
            Box::new(CharacterLiteralChannel),
            Box::new(NumericLiteralChannel),
            Box::new(IdentifierChannel),
            Box::new(PunctuatorChannel),
            Box::new(PreprocessorChannel),
            Box::new(WhitespaceChannel),
            Box::new(UnknownCharacterChannel {
                fail_fast: fail_on_unknown_char,
            }),
        ];
        Self { channels }
    }

    /// Tokenize the entire input.
    pub fn tokenize(&self, source: &str) -> Result<TokenStream, LexError> {
        let mut cursor = Cursor::new(source);
        let mut sink = Sink::new();

        while !cursor.is_at_end() {
            let mut consumed = false;
            for channel in &self.channels {
                if channel.consume(&mut cursor, &mut sink)? {
                    consumed = true;
                    break;
                }
            }
            // The catch-all consumes one character whenever it is reached,
            // so a full pass that consumed nothing is impossible.
            debug_assert!(consumed, "no channel consumed input");
        }

        Ok(sink.finish(Token::new(
            TokenKind::Eof,
            "",
            cursor.line(),
            cursor.column(),
        )))
    }
}

impl Default for Lexer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex(source: &str) -> TokenStream {
        Lexer::new().tokenize(source).unwrap()
    }

    fn kinds(stream: &TokenStream) -> Vec<TokenKind> {
        stream.tokens.iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_simple_tokens() {
        let stream = lex("class Foo { }");
        let tokens = &stream.tokens;

        assert_eq!(tokens[0].kind, TokenKind::Keyword);
        assert_eq!(tokens[0].text, "class");
        assert_eq!(tokens[1].kind, TokenKind::Identifier);
        assert_eq!(tokens[1].text, "Foo");
        assert_eq!(tokens[2].text, "{");
        assert_eq!(tokens[3].text, "}");
        assert_eq!(tokens[4].kind, TokenKind::Eof);
    }

    #[test]
    fn test_keyword_vs_identifier() {
        let stream = lex("internal");
        assert_eq!(stream.tokens[0].kind, TokenKind::Keyword);

        let stream = lex("internal2");
        assert_eq!(stream.tokens.len(), 2);
        assert_eq!(stream.tokens[0].kind, TokenKind::Identifier);
        assert_eq!(stream.tokens[0].text, "internal2");
    }

    #[test]
    fn test_verbatim_identifier() {
        let stream = lex("@class");
        assert_eq!(stream.tokens[0].kind, TokenKind::Identifier);
        assert_eq!(stream.tokens[0].text, "@class");
    }

    #[test]
    fn test_numeric_classification() {
        let stream = lex("0xFF 3.14 42 42L 3.14e10 7f 2e5");
        assert_eq!(
            kinds(&stream),
            vec![
                TokenKind::HexLiteral,
                TokenKind::RealLiteral,
                TokenKind::IntegerLiteral,
                TokenKind::IntegerLiteral,
                TokenKind::RealLiteral,
                TokenKind::RealLiteral,
                TokenKind::RealLiteral,
                TokenKind::Eof,
            ]
        );
        assert_eq!(stream.tokens[3].text, "42L");
    }

    #[test]
    fn test_regular_string_literal() {
        let stream = lex("\"a\\\"b\"");
        assert_eq!(stream.tokens.len(), 2);
        assert_eq!(stream.tokens[0].kind, TokenKind::StringLiteral);
        assert_eq!(stream.tokens[0].text, "\"a\\\"b\"");
    }

    #[test]
    fn test_verbatim_string_literal() {
        let stream = lex("@\"a\"\"b\"");
        assert_eq!(stream.tokens.len(), 2);
        assert_eq!(stream.tokens[0].kind, TokenKind::StringLiteral);
        assert_eq!(stream.tokens[0].text, "@\"a\"\"b\"");
    }

    #[test]
    fn test_verbatim_string_spans_lines() {
        let stream = lex("@\"line1\nline2\" x");
        assert_eq!(stream.tokens[0].kind, TokenKind::StringLiteral);
        assert_eq!(stream.tokens[0].spanned_lines(), 2);
        assert_eq!(stream.tokens[1].line, 2);
    }

    #[test]
    fn test_comments_become_trivia() {
        let stream = lex("// leading\nint x; /* block */ int y;");
        let tokens = &stream.tokens;

        assert_eq!(tokens[0].text, "int");
        assert_eq!(tokens[0].trivia.len(), 1);
        assert_eq!(tokens[0].trivia[0].kind, TokenKind::Comment);
        assert_eq!(tokens[0].trivia[0].text, "// leading");
        // the block comment rides on the second `int`
        assert_eq!(tokens[3].text, "int");
        assert_eq!(tokens[3].trivia[0].text, "/* block */");
    }

    #[test]
    fn test_trailing_trivia_attach_to_eof() {
        let stream = lex("int x; // done");
        let eof = &stream.tokens[stream.eof_index()];
        assert_eq!(eof.kind, TokenKind::Eof);
        assert_eq!(eof.trivia.len(), 1);
    }

    #[test]
    fn test_preprocessor_directive_is_trivia() {
        let stream = lex("#if DEBUG\nint x;\n#endif\n");
        assert_eq!(stream.tokens[0].text, "int");
        assert_eq!(stream.tokens[0].trivia[0].kind, TokenKind::Preprocessor);
        assert_eq!(stream.tokens[0].trivia[0].text, "#if DEBUG");
        let eof = &stream.tokens[stream.eof_index()];
        assert_eq!(eof.trivia[0].text, "#endif");
    }

    #[test]
    fn test_round_trip_of_meaningful_content() {
        let source = "class if <<= { } internal2 == != while";
        let stream = lex(source);
        let rebuilt: String = stream
            .tokens
            .iter()
            .filter(|t| t.kind != TokenKind::Eof)
            .map(|t| t.text.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        assert_eq!(rebuilt, source);
    }

    #[test]
    fn test_unknown_character_is_discarded_with_diagnostic() {
        let stream = lex("int $ x;");
        let texts: Vec<&str> = stream.tokens.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["int", "x", ";", ""]);
        assert_eq!(stream.diagnostics.len(), 1);
        assert!(stream.diagnostics[0].message.contains('$'));
    }

    #[test]
    fn test_unknown_character_fails_under_strict_policy() {
        let result = Lexer::with_policy(true).tokenize("int $ x;");
        assert!(result.is_err());
    }

    #[test]
    fn test_unterminated_string_is_fatal() {
        assert!(Lexer::new().tokenize("\"abc\nint x;").is_err());
        assert!(Lexer::new().tokenize("@\"abc").is_err());
    }

    #[test]
    fn test_longest_punctuator_wins() {
        let stream = lex("a <<= b");
        assert_eq!(stream.tokens[1].text, "<<=");
    }
}
