//! Declarative grammar: rule arena, expression combinators and build-time
//! validation.
//!
//! Rule handles are the fieldless [`RuleKind`] enum, so every rule exists
//! before any body does; bodies are assigned through [`GrammarBuilder`] and a
//! validation pass confirms that every referenced rule was eventually given a
//! body. A missing body is a [`GrammarError`] raised when the grammar is
//! built, never a parse-time failure.

use super::csharp::{RuleKind, RULE_COUNT};
use super::token::TokenKind;
use thiserror::Error;

/// Programming error in the grammar definition, detected before any file is
/// parsed.
#[derive(Debug, Clone, Error)]
pub enum GrammarError {
    #[error("rule {referenced:?} is referenced by {by:?} but was never given a body")]
    UndefinedRule { referenced: RuleKind, by: RuleKind },
}

/// A grammar expression.
#[derive(Debug, Clone)]
pub enum Expr {
    /// All sub-expressions in order; the whole sequence backtracks on any
    /// sub-failure.
    Sequence(Vec<Expr>),
    /// Alternatives tried in declared order. Order is part of the accepted
    /// language.
    Choice(Vec<Expr>),
    /// Greedy repetition, zero or more matches.
    ZeroOrMore(Box<Expr>),
    /// Greedy repetition, at least one match.
    OneOrMore(Box<Expr>),
    /// One match or zero-width success.
    Optional(Box<Expr>),
    /// Succeeds without consuming input iff the inner expression fails here.
    Not(Box<Expr>),
    /// Any single token except `Eof`.
    AnyToken,
    /// A token of the given kind.
    Kind(TokenKind),
    /// A token with this exact lexeme (keywords, punctuators, contextual
    /// words lexed as identifiers).
    Word(&'static str),
    /// Reference to another rule; recursion is resolved through the arena.
    Rule(RuleKind),
}

pub fn seq(items: Vec<Expr>) -> Expr {
    Expr::Sequence(items)
}

pub fn choice(items: Vec<Expr>) -> Expr {
    Expr::Choice(items)
}

pub fn zero_or_more(inner: Expr) -> Expr {
    Expr::ZeroOrMore(Box::new(inner))
}

pub fn one_or_more(inner: Expr) -> Expr {
    Expr::OneOrMore(Box::new(inner))
}

pub fn opt(inner: Expr) -> Expr {
    Expr::Optional(Box::new(inner))
}

pub fn not(inner: Expr) -> Expr {
    Expr::Not(Box::new(inner))
}

pub fn any() -> Expr {
    Expr::AnyToken
}

pub fn kind(token_kind: TokenKind) -> Expr {
    Expr::Kind(token_kind)
}

pub fn word(text: &'static str) -> Expr {
    Expr::Word(text)
}

pub fn rule(rule: RuleKind) -> Expr {
    Expr::Rule(rule)
}

/// Two-phase grammar construction: assign bodies, then [`build`] validates
/// the whole graph.
///
/// [`build`]: GrammarBuilder::build
pub struct GrammarBuilder {
    rules: Vec<Option<Expr>>,
}

impl GrammarBuilder {
    pub fn new() -> Self {
        Self {
            rules: vec![None; RULE_COUNT],
        }
    }

    /// Assigns `body` to `rule`. Assigning twice is a programming error.
    pub fn define(&mut self, rule: RuleKind, body: Expr) {
        debug_assert!(
            self.rules[rule.index()].is_none(),
            "rule {:?} defined twice",
            rule
        );
        self.rules[rule.index()] = Some(body);
    }

    /// Validates that every referenced rule has a body and freezes the
    /// grammar.
    pub fn build(self) -> Result<Grammar, GrammarError> {
        let grammar = Grammar { rules: self.rules };
        grammar.validate()?;
        Ok(grammar)
    }
}

impl Default for GrammarBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A validated rule graph.
pub struct Grammar {
    rules: Vec<Option<Expr>>,
}

impl Grammar {
    pub(crate) fn body(&self, rule: RuleKind) -> &Expr {
        self.rules[rule.index()]
            .as_ref()
            .expect("grammar was validated at build time")
    }

    pub fn is_defined(&self, rule: RuleKind) -> bool {
        self.rules[rule.index()].is_some()
    }

    /// Replaces one rule's body, leaving the rest of the graph untouched.
    /// Intended for isolating a single rule in tests.
    pub fn override_rule(&mut self, rule: RuleKind, body: Expr) {
        self.rules[rule.index()] = Some(body);
    }

    fn validate(&self) -> Result<(), GrammarError> {
        for (index, body) in self.rules.iter().enumerate() {
            let Some(body) = body else { continue };
            let by = RuleKind::from_index(index);
            let mut result = Ok(());
            visit_references(body, &mut |referenced| {
                if result.is_ok() && !self.is_defined(referenced) {
                    result = Err(GrammarError::UndefinedRule { referenced, by });
                }
            });
            result?;
        }
        Ok(())
    }
}

fn visit_references(expr: &Expr, f: &mut impl FnMut(RuleKind)) {
    match expr {
        Expr::Sequence(items) | Expr::Choice(items) => {
            for item in items {
                visit_references(item, f);
            }
        }
        Expr::ZeroOrMore(inner) | Expr::OneOrMore(inner) | Expr::Optional(inner)
        | Expr::Not(inner) => visit_references(inner, f),
        Expr::Rule(rule) => f(*rule),
        Expr::AnyToken | Expr::Kind(_) | Expr::Word(_) => {}
    }
}
