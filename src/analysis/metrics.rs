//! Metric visitors.
//!
//! These run after the structural visitors in the walker's registration
//! order, so the entity stack already points at the innermost entity when a
//! metric is recorded.

use super::model::{EntityId, EntityKind, MetricId};
use super::{AstVisitor, VisitContext};
use crate::parser::ast::{AstNode, ParseTree};
use crate::parser::csharp::RuleKind;
use crate::parser::token::{Token, TokenKind};
use rustc_hash::{FxHashMap, FxHashSet};

/// Counts physical lines that carry at least one significant token, per
/// entity. Multi-line tokens (verbatim strings) count every line they span.
pub struct LinesOfCodeVisitor {
    lines: FxHashMap<EntityId, FxHashSet<u32>>,
}

impl LinesOfCodeVisitor {
    pub fn new() -> Self {
        Self {
            lines: FxHashMap::default(),
        }
    }
}

impl Default for LinesOfCodeVisitor {
    fn default() -> Self {
        Self::new()
    }
}

impl AstVisitor for LinesOfCodeVisitor {
    fn visits_tokens(&self) -> bool {
        true
    }

    fn visit_token(&mut self, token: &Token, ctx: &mut VisitContext) {
        if token.kind == TokenKind::Eof {
            return;
        }
        let lines = self.lines.entry(ctx.current()).or_default();
        for line in token.line..=token.end_line() {
            lines.insert(line);
        }
    }

    fn leave_file(&mut self, _tree: &ParseTree, ctx: &mut VisitContext) {
        for (entity, lines) in self.lines.drain() {
            ctx.record_on(entity, MetricId::LinesOfCode, lines.len() as f64);
        }
    }
}

/// Splits comment trivia into comment lines and commented-out code lines
/// using a best-effort code-shape heuristic. Documentation comments always
/// count as comment lines.
pub struct CommentMetricsVisitor {
    ignore_header: bool,
    past_header: bool,
}

impl CommentMetricsVisitor {
    /// With `ignore_header` set, comments before the first significant
    /// token of the file (typically a license banner) are not counted.
    pub fn new(ignore_header: bool) -> Self {
        Self {
            ignore_header,
            past_header: false,
        }
    }
}

fn looks_like_code(line: &str) -> bool {
    line.ends_with(';')
        || line.ends_with('{')
        || line.ends_with('}')
        || line.contains("();")
        || line.starts_with("if (")
        || line.starts_with("for (")
        || line.starts_with("while (")
        || line.starts_with("switch (")
        || line.starts_with("return ")
}

/// (comment lines, commented-out code lines) for one comment token.
fn classify_comment(comment: &Token) -> (f64, f64) {
    if comment.is_doc_comment() {
        return (comment.spanned_lines() as f64, 0.0);
    }
    let body = comment
        .text
        .trim_start_matches("/*")
        .trim_end_matches("*/");
    let mut comment_lines = 0.0;
    let mut code_lines = 0.0;
    for line in body.lines() {
        let line = line
            .trim()
            .trim_start_matches("//")
            .trim_start_matches('*')
            .trim();
        if !line.is_empty() && looks_like_code(line) {
            code_lines += 1.0;
        } else {
            comment_lines += 1.0;
        }
    }
    (comment_lines, code_lines)
}

impl AstVisitor for CommentMetricsVisitor {
    fn visits_tokens(&self) -> bool {
        true
    }

    fn visit_token(&mut self, token: &Token, ctx: &mut VisitContext) {
        let skip = self.ignore_header && !self.past_header;
        if token.kind != TokenKind::Eof {
            self.past_header = true;
        }
        if skip {
            return;
        }
        for trivia in &token.trivia {
            if trivia.kind != TokenKind::Comment {
                continue;
            }
            let (comment_lines, code_lines) = classify_comment(trivia);
            if comment_lines > 0.0 {
                ctx.record(MetricId::CommentLines, comment_lines);
            }
            if code_lines > 0.0 {
                ctx.record(MetricId::CommentedOutCodeLines, code_lines);
            }
        }
    }
}

const STATEMENT_RULES: [RuleKind; 19] = [
    RuleKind::LabeledStatement,
    RuleKind::DeclarationStatement,
    RuleKind::EmptyStatement,
    RuleKind::ExpressionStatement,
    RuleKind::IfStatement,
    RuleKind::SwitchStatement,
    RuleKind::WhileStatement,
    RuleKind::DoStatement,
    RuleKind::ForStatement,
    RuleKind::ForeachStatement,
    RuleKind::BreakStatement,
    RuleKind::ContinueStatement,
    RuleKind::GotoStatement,
    RuleKind::ReturnStatement,
    RuleKind::ThrowStatement,
    RuleKind::TryStatement,
    RuleKind::UsingStatement,
    RuleKind::LockStatement,
    RuleKind::YieldStatement,
];

/// Counts statements; blocks are containers, not statements.
pub struct StatementVisitor;

impl StatementVisitor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for StatementVisitor {
    fn default() -> Self {
        Self::new()
    }
}

impl AstVisitor for StatementVisitor {
    fn subscribed(&self) -> &'static [RuleKind] {
        &STATEMENT_RULES
    }

    fn visit_node(&mut self, _node: &AstNode, _tree: &ParseTree, ctx: &mut VisitContext) {
        ctx.record(MetricId::Statements, 1.0);
    }
}

/// Cyclomatic-style complexity: one unit per branch-introducing construct,
/// counted only inside the nearest enclosing member so nested members never
/// double-count.
pub struct ComplexityVisitor;

impl ComplexityVisitor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ComplexityVisitor {
    fn default() -> Self {
        Self::new()
    }
}

impl AstVisitor for ComplexityVisitor {
    fn subscribed(&self) -> &'static [RuleKind] {
        &[
            RuleKind::IfStatement,
            RuleKind::WhileStatement,
            RuleKind::DoStatement,
            RuleKind::ForStatement,
            RuleKind::ForeachStatement,
            RuleKind::SwitchLabel,
            RuleKind::CatchClause,
            RuleKind::ConditionalExpression,
            RuleKind::ConditionalAndExpression,
            RuleKind::ConditionalOrExpression,
        ]
    }

    fn visit_node(&mut self, node: &AstNode, tree: &ParseTree, ctx: &mut VisitContext) {
        if ctx.current_kind() != EntityKind::Member {
            return;
        }
        let units = match node.rule_kind() {
            Some(RuleKind::IfStatement)
            | Some(RuleKind::WhileStatement)
            | Some(RuleKind::DoStatement)
            | Some(RuleKind::ForStatement)
            | Some(RuleKind::ForeachStatement)
            | Some(RuleKind::CatchClause) => 1.0,
            // only `case` labels branch; `default` is the fall-through
            Some(RuleKind::SwitchLabel) => {
                if tree.direct_leaf_texts(node).next() == Some("case") {
                    1.0
                } else {
                    0.0
                }
            }
            // the pass-through node exists for every expression; only the
            // operator form branches
            Some(RuleKind::ConditionalExpression) => {
                if tree.direct_leaf_texts(node).any(|t| t == "?") {
                    1.0
                } else {
                    0.0
                }
            }
            Some(RuleKind::ConditionalAndExpression) => {
                tree.direct_leaf_texts(node).filter(|t| *t == "&&").count() as f64
            }
            Some(RuleKind::ConditionalOrExpression) => {
                tree.direct_leaf_texts(node).filter(|t| *t == "||").count() as f64
            }
            _ => 0.0,
        };
        if units > 0.0 {
            ctx.record(MetricId::Complexity, units);
        }
    }
}

#[derive(Clone, Copy, PartialEq)]
enum Container {
    TopLevel,
    ClassLike,
    Interface,
}

/// Counts the effectively-public API surface and the part of it lacking a
/// documentation comment. Accessibility defaults depend on the container:
/// top-level types default to internal, class and struct members to
/// private, interface members to public.
pub struct PublicApiVisitor {
    containers: Vec<(Container, bool)>,
}

impl PublicApiVisitor {
    pub fn new() -> Self {
        Self {
            containers: Vec::new(),
        }
    }
}

impl Default for PublicApiVisitor {
    fn default() -> Self {
        Self::new()
    }
}

const ACCESS_MODIFIERS: [&str; 4] = ["public", "protected", "internal", "private"];

fn is_type_rule(rule: RuleKind) -> bool {
    matches!(
        rule,
        RuleKind::ClassDeclaration
            | RuleKind::StructDeclaration
            | RuleKind::InterfaceDeclaration
            | RuleKind::EnumDeclaration
    )
}

impl AstVisitor for PublicApiVisitor {
    fn subscribed(&self) -> &'static [RuleKind] {
        &[
            RuleKind::ClassDeclaration,
            RuleKind::StructDeclaration,
            RuleKind::InterfaceDeclaration,
            RuleKind::EnumDeclaration,
            RuleKind::MethodDeclaration,
            RuleKind::ConstructorDeclaration,
            RuleKind::PropertyDeclaration,
            RuleKind::FieldDeclaration,
            RuleKind::EventFieldDeclaration,
        ]
    }

    fn visit_node(&mut self, node: &AstNode, tree: &ParseTree, ctx: &mut VisitContext) {
        let Some(rule) = node.rule_kind() else { return };
        let modifiers: Vec<String> = node
            .children
            .iter()
            .filter(|child| child.rule_kind() == Some(RuleKind::Modifier))
            .map(|child| tree.node_text(child))
            .collect();
        let declared_public = modifiers.iter().any(|m| m == "public");
        let has_access_modifier = modifiers
            .iter()
            .any(|m| ACCESS_MODIFIERS.contains(&m.as_str()));

        let (container, enclosing_public) = self
            .containers
            .last()
            .copied()
            .unwrap_or((Container::TopLevel, true));
        let default_public = !is_type_rule(rule) && container == Container::Interface;
        let own_public = declared_public || (!has_access_modifier && default_public);
        let effective = own_public && enclosing_public;

        if effective {
            ctx.record(MetricId::PublicApi, 1.0);
            let documented = tree
                .token(node.start)
                .trivia
                .iter()
                .any(|t| t.is_doc_comment());
            if !documented {
                ctx.record(MetricId::UndocumentedPublicApi, 1.0);
            }
        }

        if is_type_rule(rule) {
            let kind = if rule == RuleKind::InterfaceDeclaration {
                Container::Interface
            } else {
                Container::ClassLike
            };
            self.containers.push((kind, effective));
        }
    }

    fn leave_node(&mut self, node: &AstNode, _tree: &ParseTree, _ctx: &mut VisitContext) {
        if node.rule_kind().is_some_and(is_type_rule) {
            self.containers.pop();
        }
    }
}
