//! Backtracking recursive-descent interpreter over the grammar arena.
//!
//! Evaluation is continuation-passing: when a later part of the parse fails,
//! earlier ordered-choice decisions are revisited in declared order, so an
//! alternative that is a strict prefix of a longer one does not block the
//! longer match. Repetitions are greedy and guarded against zero-width
//! sub-matches; negative lookahead consumes nothing. Failed attempts leave
//! no nodes behind — the node buffer is restored on every backtrack.
//!
//! The interpreter tracks the furthest position any terminal failed at and
//! the terminals expected there; that pair becomes the [`RecognitionError`]
//! when no alternative of the root rule matches the full input.

use super::ast::{AstNode, ParseTree};
use super::csharp::RuleKind;
use super::grammar::{Expr, Grammar};
use super::token::{Token, TokenKind, TokenStream};
use thiserror::Error;

/// The parser could not match the root rule against the full input.
#[derive(Debug, Clone, Error)]
#[error("cannot parse input at line {line}, column {column}: expected {}", .expected.join(" or "))]
pub struct RecognitionError {
    pub line: u32,
    pub column: u32,
    /// Terminal descriptions expected at the furthest reached position.
    pub expected: Vec<String>,
}

/// Grammar-driven parser. Cheap to construct; borrows the validated grammar.
pub struct Parser<'g> {
    grammar: &'g Grammar,
}

impl<'g> Parser<'g> {
    pub fn new(grammar: &'g Grammar) -> Self {
        Self { grammar }
    }

    /// Parses the whole stream as one `root`, consuming the stream into the
    /// resulting tree. Fails unless the match extends to the `Eof` token.
    pub fn parse(&self, stream: TokenStream, root: RuleKind) -> Result<ParseTree, RecognitionError> {
        let (node, _) = self.parse_at(&stream, root, 0, true)?;
        Ok(ParseTree {
            tokens: stream.tokens,
            root: node,
        })
    }

    /// Parses one occurrence of `root` starting at token index `start`.
    /// With `to_eof` false the match may end anywhere; the consumed end
    /// index is returned alongside the node. Used for bounded sub-parses.
    pub fn parse_at(
        &self,
        stream: &TokenStream,
        root: RuleKind,
        start: usize,
        to_eof: bool,
    ) -> Result<(AstNode, usize), RecognitionError> {
        let grammar = self.grammar;
        let body = grammar.body(root);
        let eof = stream.eof_index();
        let mut run = Run {
            grammar,
            tokens: &stream.tokens,
            furthest: start,
            expected: Vec::new(),
            tracking: true,
        };
        let mut out: Vec<AstNode> = Vec::new();
        let mut matched_end = start;
        let ok = run.eval(body, start, &mut out, &mut |run, pos, _out| {
            if to_eof && pos != eof {
                run.miss(pos, "end of file");
                return false;
            }
            matched_end = pos;
            true
        });
        if ok {
            Ok((AstNode::rule(root, out, start, matched_end), matched_end))
        } else {
            let at = run.furthest.min(eof);
            let token = &stream.tokens[at];
            Err(RecognitionError {
                line: token.line,
                column: token.column,
                expected: run.expected,
            })
        }
    }
}

/// Continuation invoked with the position (and node buffer) after a
/// successful partial match; returning `false` asks the callee to try its
/// next alternative.
type Cont<'a, 'g, 't> = &'a mut dyn FnMut(&mut Run<'g, 't>, usize, &mut Vec<AstNode>) -> bool;

struct Run<'g, 't> {
    grammar: &'g Grammar,
    tokens: &'t [Token],
    furthest: usize,
    expected: Vec<String>,
    tracking: bool,
}

impl<'g, 't> Run<'g, 't> {
    /// Invariant: when `eval` returns `false`, `out` is back to its entry
    /// length.
    fn eval(
        &mut self,
        expr: &'g Expr,
        pos: usize,
        out: &mut Vec<AstNode>,
        k: Cont<'_, 'g, 't>,
    ) -> bool {
        match expr {
            Expr::Sequence(items) => self.eval_seq(items, 0, pos, out, k),
            Expr::Choice(alternatives) => {
                let mark = out.len();
                for alternative in alternatives {
                    if self.eval(alternative, pos, out, &mut *k) {
                        return true;
                    }
                    out.truncate(mark);
                }
                false
            }
            Expr::Optional(inner) => {
                let mark = out.len();
                if self.eval(inner, pos, out, &mut *k) {
                    return true;
                }
                out.truncate(mark);
                k(self, pos, out)
            }
            Expr::ZeroOrMore(inner) => self.eval_repetition(inner, pos, out, k),
            Expr::OneOrMore(inner) => {
                let inner: &'g Expr = inner;
                self.eval(inner, pos, out, &mut |run, next, out| {
                    if next == pos {
                        // a zero-width match satisfies the repetition once
                        return k(run, next, out);
                    }
                    run.eval_repetition(inner, next, out, &mut *k)
                })
            }
            Expr::Not(inner) => {
                // lookahead failures are not real expectations
                let was_tracking = self.tracking;
                self.tracking = false;
                let mut scratch = Vec::new();
                let matched = self.eval(inner, pos, &mut scratch, &mut |_, _, _| true);
                self.tracking = was_tracking;
                if matched {
                    false
                } else {
                    k(self, pos, out)
                }
            }
            Expr::AnyToken => {
                if self.tokens[pos].kind == TokenKind::Eof {
                    self.miss(pos, "any token");
                    false
                } else {
                    self.leaf(pos, out, k)
                }
            }
            Expr::Kind(token_kind) => {
                let actual = self.tokens[pos].kind;
                if actual != *token_kind {
                    self.miss(pos, token_kind.describe());
                    return false;
                }
                if actual == TokenKind::Eof {
                    // matching end of input consumes nothing
                    return k(self, pos, out);
                }
                self.leaf(pos, out, k)
            }
            Expr::Word(text) => {
                let token = &self.tokens[pos];
                if token.kind != TokenKind::Eof && token.text == *text {
                    self.leaf(pos, out, k)
                } else {
                    self.miss(pos, format!("'{}'", text));
                    false
                }
            }
            Expr::Rule(rule) => {
                let rule = *rule;
                let grammar = self.grammar;
                let body = grammar.body(rule);
                let mark = out.len();
                self.eval(body, pos, out, &mut |run, next, out| {
                    let children = out.split_off(mark);
                    out.push(AstNode::rule(rule, children, pos, next));
                    if k(run, next, out) {
                        return true;
                    }
                    // unwrap the node so the body can keep backtracking
                    if let Some(node) = out.pop() {
                        out.extend(node.children);
                    }
                    false
                })
            }
        }
    }

    fn eval_seq(
        &mut self,
        items: &'g [Expr],
        index: usize,
        pos: usize,
        out: &mut Vec<AstNode>,
        k: Cont<'_, 'g, 't>,
    ) -> bool {
        let Some(item) = items.get(index) else {
            return k(self, pos, out);
        };
        let mark = out.len();
        let ok = self.eval(item, pos, out, &mut |run, next, out| {
            run.eval_seq(items, index + 1, next, out, &mut *k)
        });
        if !ok {
            out.truncate(mark);
        }
        ok
    }

    /// Greedy repetition: the longest run of matches is tried first, backing
    /// off one match at a time if the continuation fails. A sub-match that
    /// consumes nothing terminates the loop.
    fn eval_repetition(
        &mut self,
        inner: &'g Expr,
        pos: usize,
        out: &mut Vec<AstNode>,
        k: Cont<'_, 'g, 't>,
    ) -> bool {
        let mark = out.len();
        let ok = self.eval(inner, pos, out, &mut |run, next, out| {
            if next == pos {
                return false;
            }
            run.eval_repetition(inner, next, out, &mut *k)
        });
        if ok {
            return true;
        }
        out.truncate(mark);
        k(self, pos, out)
    }

    fn leaf(&mut self, pos: usize, out: &mut Vec<AstNode>, k: Cont<'_, 'g, 't>) -> bool {
        out.push(AstNode::leaf(pos));
        if k(self, pos + 1, out) {
            true
        } else {
            out.pop();
            false
        }
    }

    fn miss(&mut self, pos: usize, what: impl Into<String>) {
        if !self.tracking {
            return;
        }
        if pos > self.furthest {
            self.furthest = pos;
            self.expected.clear();
        }
        if pos == self.furthest {
            let what = what.into();
            if !self.expected.contains(&what) {
                self.expected.push(what);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::ast::NodeKind;
    use crate::parser::grammar::{
        any, choice, not, one_or_more, opt, rule, seq, word, zero_or_more, GrammarBuilder,
    };
    use crate::parser::lexer::Lexer;

    fn stream(source: &str) -> TokenStream {
        Lexer::new().tokenize(source).unwrap()
    }

    #[test]
    fn test_choice_is_not_short_circuited_by_a_prefix_alternative() {
        // first alternative accepts a strict prefix of the second's language;
        // an input only the second accepts must still parse
        let mut builder = GrammarBuilder::new();
        builder.define(
            RuleKind::Expression,
            choice(vec![word("a"), seq(vec![word("a"), word("b")])]),
        );
        let grammar = builder.build().unwrap();
        let tree = Parser::new(&grammar)
            .parse(stream("a b"), RuleKind::Expression)
            .unwrap();
        assert_eq!(tree.root.children.len(), 2);
    }

    #[test]
    fn test_choice_order_is_preserved_on_ambiguous_input() {
        let mut builder = GrammarBuilder::new();
        builder.define(
            RuleKind::Expression,
            choice(vec![rule(RuleKind::Literal), rule(RuleKind::Block)]),
        );
        builder.define(RuleKind::Literal, seq(vec![word("a"), word("b")]));
        builder.define(RuleKind::Block, seq(vec![word("a"), any()]));
        let grammar = builder.build().unwrap();
        let tree = Parser::new(&grammar)
            .parse(stream("a b"), RuleKind::Expression)
            .unwrap();
        assert_eq!(tree.root.children[0].rule_kind(), Some(RuleKind::Literal));
    }

    #[test]
    fn test_sequence_backtracks_fully_on_sub_failure() {
        let mut builder = GrammarBuilder::new();
        builder.define(
            RuleKind::Expression,
            seq(vec![
                choice(vec![seq(vec![word("a"), word("b")]), word("a")]),
                word("c"),
            ]),
        );
        let grammar = builder.build().unwrap();
        // the first alternative consumes "a" and fails on "b"; the parse
        // must restore the position and recover through the second
        let tree = Parser::new(&grammar)
            .parse(stream("a c"), RuleKind::Expression)
            .unwrap();
        assert_eq!(tree.root.children.len(), 2);
    }

    #[test]
    fn test_zero_width_repetition_terminates() {
        let mut builder = GrammarBuilder::new();
        builder.define(RuleKind::Expression, zero_or_more(opt(word("x"))));
        let grammar = builder.build().unwrap();
        assert!(Parser::new(&grammar).parse(stream(""), RuleKind::Expression).is_ok());
        assert!(Parser::new(&grammar).parse(stream("x x"), RuleKind::Expression).is_ok());

        let mut builder = GrammarBuilder::new();
        builder.define(RuleKind::Expression, one_or_more(opt(word("x"))));
        let grammar = builder.build().unwrap();
        assert!(Parser::new(&grammar).parse(stream(""), RuleKind::Expression).is_ok());
    }

    #[test]
    fn test_negative_lookahead_consumes_nothing() {
        // "any tokens that are not the terminator, then the terminator"
        let mut builder = GrammarBuilder::new();
        builder.define(
            RuleKind::Expression,
            seq(vec![
                zero_or_more(seq(vec![not(word(";")), any()])),
                word(";"),
            ]),
        );
        let grammar = builder.build().unwrap();
        let parser = Parser::new(&grammar);
        assert!(parser.parse(stream("a b c ;"), RuleKind::Expression).is_ok());
        assert!(parser.parse(stream(";"), RuleKind::Expression).is_ok());
        assert!(parser.parse(stream("a b"), RuleKind::Expression).is_err());
    }

    #[test]
    fn test_failed_alternatives_leave_no_nodes() {
        let mut builder = GrammarBuilder::new();
        builder.define(
            RuleKind::Expression,
            choice(vec![
                seq(vec![rule(RuleKind::Literal), word("!")]),
                seq(vec![word("a"), word("b")]),
            ]),
        );
        builder.define(RuleKind::Literal, word("a"));
        let grammar = builder.build().unwrap();
        let tree = Parser::new(&grammar)
            .parse(stream("a b"), RuleKind::Expression)
            .unwrap();
        // no Literal node from the failed first alternative survives
        assert!(tree.root.children.iter().all(|c| c.rule_kind().is_none()));
        assert_eq!(tree.root.children.len(), 2);
    }

    #[test]
    fn test_recognition_error_reports_furthest_position() {
        let mut builder = GrammarBuilder::new();
        builder.define(
            RuleKind::Expression,
            seq(vec![word("a"), word("b"), word("c")]),
        );
        let grammar = builder.build().unwrap();
        let err = Parser::new(&grammar)
            .parse(stream("a b x"), RuleKind::Expression)
            .unwrap_err();
        assert_eq!(err.line, 1);
        assert_eq!(err.column, 4);
        assert!(err.expected.contains(&"'c'".to_string()), "{:?}", err.expected);
    }

    #[test]
    fn test_rule_override_isolates_one_rule() {
        let mut builder = GrammarBuilder::new();
        builder.define(
            RuleKind::Expression,
            seq(vec![word("a"), rule(RuleKind::Literal)]),
        );
        builder.define(RuleKind::Literal, word("b"));
        let mut grammar = builder.build().unwrap();
        assert!(Parser::new(&grammar).parse(stream("a b"), RuleKind::Expression).is_ok());

        grammar.override_rule(RuleKind::Literal, word("mocked"));
        let parser = Parser::new(&grammar);
        assert!(parser.parse(stream("a mocked"), RuleKind::Expression).is_ok());
        assert!(parser.parse(stream("a b"), RuleKind::Expression).is_err());
    }

    #[test]
    fn test_parse_at_allows_bounded_matches() {
        let mut builder = GrammarBuilder::new();
        builder.define(RuleKind::Expression, seq(vec![word("a"), word("b")]));
        let grammar = builder.build().unwrap();
        let input = stream("a b c");
        let (_, end) = Parser::new(&grammar)
            .parse_at(&input, RuleKind::Expression, 0, false)
            .unwrap();
        assert_eq!(end, 2);
        assert!(Parser::new(&grammar).parse(input, RuleKind::Expression).is_err());
    }

    #[test]
    fn test_leaf_nodes_reference_tokens() {
        let mut builder = GrammarBuilder::new();
        builder.define(RuleKind::Expression, seq(vec![word("a"), word("b")]));
        let grammar = builder.build().unwrap();
        let tree = Parser::new(&grammar)
            .parse(stream("a b"), RuleKind::Expression)
            .unwrap();
        match tree.root.children[1].kind {
            NodeKind::Token(index) => assert_eq!(tree.token(index).text, "b"),
            NodeKind::Rule(_) => panic!("expected a leaf"),
        }
    }
}
