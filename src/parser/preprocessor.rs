//! Preprocessor-side token stream handling.
//!
//! Directive lines (`#if`, `#region`, ...) are already tagged by the
//! lexer's preprocessor channel and carried as trivia. The second half of
//! the contract lives here: [`UsingDirectiveFilter`] walks the significant
//! token stream and elides whole `using` import directives by sub-parsing
//! them with a privately owned parser rooted at a single rule. A failed
//! sub-parse is a no-op, which is what keeps `using (resource)` statements
//! and `using var` declarations intact for the main grammar.

use super::csharp::{self, RuleKind};
use super::grammar::{Grammar, GrammarError};
use super::parser::Parser;
use super::token::{Token, TokenKind, TokenStream};

/// Post-lex filter that removes `using` import directives from the stream.
///
/// Stateless across invocations apart from the grammar its private parser
/// interprets.
pub struct UsingDirectiveFilter {
    grammar: Grammar,
}

impl UsingDirectiveFilter {
    pub fn new() -> Result<Self, GrammarError> {
        Ok(Self {
            grammar: csharp::grammar()?,
        })
    }

    /// Returns a stream with every parseable `using` directive removed.
    /// Trivia attached to elided tokens migrate to the next kept token so
    /// comment analysis loses nothing.
    pub fn apply(&self, stream: &TokenStream) -> TokenStream {
        let parser = Parser::new(&self.grammar);
        let mut kept: Vec<Token> = Vec::with_capacity(stream.tokens.len());
        let mut carried: Vec<Token> = Vec::new();
        let mut index = 0;

        while index < stream.tokens.len() {
            let token = &stream.tokens[index];
            if token.kind == TokenKind::Keyword && token.text == "using" {
                if let Ok((_, end)) =
                    parser.parse_at(stream, RuleKind::UsingDirective, index, false)
                {
                    for elided in &stream.tokens[index..end] {
                        carried.extend(elided.trivia.iter().cloned());
                    }
                    index = end;
                    continue;
                }
            }
            let mut token = token.clone();
            if !carried.is_empty() {
                carried.extend(std::mem::take(&mut token.trivia));
                token.trivia = std::mem::take(&mut carried);
            }
            kept.push(token);
            index += 1;
        }

        TokenStream {
            tokens: kept,
            diagnostics: stream.diagnostics.clone(),
        }
    }
}
