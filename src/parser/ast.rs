//! Concrete syntax tree produced by the parser.
//!
//! Inner nodes carry the grammar rule that matched; leaves carry an index
//! into the token stream. The tree owns nothing but indices — the tokens
//! live in the [`ParseTree`] alongside the root, so visitors borrow both.

use super::csharp::RuleKind;
use super::token::{Token, TokenKind};

/// Discriminant of an AST node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// Successful match of a grammar rule.
    Rule(RuleKind),
    /// A single matched token, by stream index.
    Token(usize),
}

/// One node of the concrete syntax tree.
///
/// `start`/`end` delimit the half-open token range the node covers.
#[derive(Debug, Clone)]
pub struct AstNode {
    pub kind: NodeKind,
    pub children: Vec<AstNode>,
    pub start: usize,
    pub end: usize,
}

impl AstNode {
    pub fn rule(rule: RuleKind, children: Vec<AstNode>, start: usize, end: usize) -> Self {
        Self {
            kind: NodeKind::Rule(rule),
            children,
            start,
            end,
        }
    }

    pub fn leaf(token_index: usize) -> Self {
        Self {
            kind: NodeKind::Token(token_index),
            children: Vec::new(),
            start: token_index,
            end: token_index + 1,
        }
    }

    pub fn rule_kind(&self) -> Option<RuleKind> {
        match self.kind {
            NodeKind::Rule(rule) => Some(rule),
            NodeKind::Token(_) => None,
        }
    }

    pub fn token_index(&self) -> Option<usize> {
        match self.kind {
            NodeKind::Token(index) => Some(index),
            NodeKind::Rule(_) => None,
        }
    }

    /// First direct child matching the given rule.
    pub fn child_of_rule(&self, rule: RuleKind) -> Option<&AstNode> {
        self.children
            .iter()
            .find(|c| c.rule_kind() == Some(rule))
    }
}

/// Parser output: the token stream plus the root node spanning it.
#[derive(Debug, Clone)]
pub struct ParseTree {
    pub tokens: Vec<Token>,
    pub root: AstNode,
}

impl ParseTree {
    pub fn token(&self, index: usize) -> &Token {
        &self.tokens[index]
    }

    /// Index of the terminating `Eof` token.
    pub fn eof_index(&self) -> usize {
        self.tokens.len() - 1
    }

    /// 1-based line of the first token a node covers.
    pub fn start_line(&self, node: &AstNode) -> u32 {
        self.tokens[node.start.min(self.eof_index())].line
    }

    /// Concatenated text of every token under `node`, without separators.
    /// Suited to dotted names (`A.B.C`), not to statements.
    pub fn node_text(&self, node: &AstNode) -> String {
        let mut text = String::new();
        self.collect_text(node, &mut text);
        text
    }

    fn collect_text(&self, node: &AstNode, text: &mut String) {
        match node.kind {
            NodeKind::Token(index) => text.push_str(&self.tokens[index].text),
            NodeKind::Rule(_) => {
                for child in &node.children {
                    self.collect_text(child, text);
                }
            }
        }
    }

    /// First direct leaf child of `node` that is an identifier token.
    /// Declaration rules keep their name as a direct child, so this is how
    /// structural visitors read declaration names.
    pub fn direct_identifier(&self, node: &AstNode) -> Option<&Token> {
        node.children.iter().find_map(|child| {
            let index = child.token_index()?;
            let token = &self.tokens[index];
            (token.kind == TokenKind::Identifier).then_some(token)
        })
    }

    /// Texts of direct leaf children, used for modifier and operator
    /// inspection.
    pub fn direct_leaf_texts<'a>(&'a self, node: &'a AstNode) -> impl Iterator<Item = &'a str> {
        node.children
            .iter()
            .filter_map(|child| child.token_index())
            .map(|index| self.tokens[index].text.as_str())
    }
}
