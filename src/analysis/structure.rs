//! Structural visitors: they build the entity tree as the walker descends.
//!
//! Each visitor pushes an entity when it enters its node and pops it on
//! leave, so every later-registered visitor sees the innermost entity as
//! the current one. Keys are hierarchical: namespaces `A.B`, types
//! `A.B.Outer.Inner`, members `A.B.Type#name:line` (the start line keeps
//! overloads apart).

use super::model::{EntityKind, MetricId};
use super::{AstVisitor, VisitContext};
use crate::parser::ast::{AstNode, ParseTree};
use crate::parser::csharp::RuleKind;

/// Creates a Namespace entity per namespace declaration, nesting keys when
/// namespaces nest.
pub struct NamespaceVisitor;

impl NamespaceVisitor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for NamespaceVisitor {
    fn default() -> Self {
        Self::new()
    }
}

impl AstVisitor for NamespaceVisitor {
    fn subscribed(&self) -> &'static [RuleKind] {
        &[RuleKind::NamespaceDeclaration]
    }

    fn visit_node(&mut self, node: &AstNode, tree: &ParseTree, ctx: &mut VisitContext) {
        let name = node
            .child_of_rule(RuleKind::QualifiedIdentifier)
            .map(|n| tree.node_text(n))
            .unwrap_or_default();
        let prefix = ctx.nearest_key(EntityKind::Namespace).map(str::to_string);
        let key = match prefix {
            Some(prefix) => format!("{}.{}", prefix, name),
            None => name.clone(),
        };
        ctx.create_entity(EntityKind::Namespace, key, name, tree.start_line(node));
    }

    fn leave_node(&mut self, _node: &AstNode, _tree: &ParseTree, ctx: &mut VisitContext) {
        ctx.close_entity();
    }
}

/// Creates a Type entity per class/struct/interface/enum declaration and
/// counts it into the `Classes` metric.
pub struct TypeVisitor;

impl TypeVisitor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for TypeVisitor {
    fn default() -> Self {
        Self::new()
    }
}

impl AstVisitor for TypeVisitor {
    fn subscribed(&self) -> &'static [RuleKind] {
        &[
            RuleKind::ClassDeclaration,
            RuleKind::StructDeclaration,
            RuleKind::InterfaceDeclaration,
            RuleKind::EnumDeclaration,
        ]
    }

    fn visit_node(&mut self, node: &AstNode, tree: &ParseTree, ctx: &mut VisitContext) {
        let name = tree
            .direct_identifier(node)
            .map(|t| t.text.clone())
            .unwrap_or_default();
        // nested types qualify through the enclosing type, top-level types
        // through the enclosing namespace
        let prefix = if ctx.current_kind() == EntityKind::Type {
            Some(ctx.model.entity(ctx.current()).key.clone())
        } else {
            ctx.nearest_key(EntityKind::Namespace).map(str::to_string)
        };
        let key = match prefix {
            Some(prefix) => format!("{}.{}", prefix, name),
            None => name.clone(),
        };
        ctx.create_entity(EntityKind::Type, key, name, tree.start_line(node));
        ctx.record(MetricId::Classes, 1.0);
    }

    fn leave_node(&mut self, _node: &AstNode, _tree: &ParseTree, ctx: &mut VisitContext) {
        ctx.close_entity();
    }
}

/// Creates a Member entity per method or constructor declaration.
pub struct MemberVisitor;

impl MemberVisitor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for MemberVisitor {
    fn default() -> Self {
        Self::new()
    }
}

impl AstVisitor for MemberVisitor {
    fn subscribed(&self) -> &'static [RuleKind] {
        &[RuleKind::MethodDeclaration, RuleKind::ConstructorDeclaration]
    }

    fn visit_node(&mut self, node: &AstNode, tree: &ParseTree, ctx: &mut VisitContext) {
        let name = tree
            .direct_identifier(node)
            .map(|t| t.text.clone())
            .unwrap_or_default();
        let line = tree.start_line(node);
        let container = ctx.model.entity(ctx.current()).key.clone();
        let key = format!("{}#{}:{}", container, name, line);
        ctx.create_entity(EntityKind::Member, key, name, line);
        ctx.record(MetricId::Methods, 1.0);
    }

    fn leave_node(&mut self, _node: &AstNode, _tree: &ParseTree, ctx: &mut VisitContext) {
        ctx.close_entity();
    }
}

/// Creates a Member entity per property accessor (`get`/`set`/`add`/
/// `remove`), named after the property it belongs to.
pub struct AccessorVisitor {
    properties: Vec<String>,
}

impl AccessorVisitor {
    pub fn new() -> Self {
        Self {
            properties: Vec::new(),
        }
    }
}

impl Default for AccessorVisitor {
    fn default() -> Self {
        Self::new()
    }
}

const ACCESSOR_KEYWORDS: [&str; 4] = ["get", "set", "add", "remove"];

impl AstVisitor for AccessorVisitor {
    fn subscribed(&self) -> &'static [RuleKind] {
        &[RuleKind::PropertyDeclaration, RuleKind::AccessorDeclaration]
    }

    fn visit_node(&mut self, node: &AstNode, tree: &ParseTree, ctx: &mut VisitContext) {
        match node.rule_kind() {
            Some(RuleKind::PropertyDeclaration) => {
                let name = tree
                    .direct_identifier(node)
                    .map(|t| t.text.clone())
                    .unwrap_or_default();
                self.properties.push(name);
            }
            Some(RuleKind::AccessorDeclaration) => {
                let keyword = tree
                    .direct_leaf_texts(node)
                    .find(|text| ACCESSOR_KEYWORDS.contains(text))
                    .unwrap_or("get");
                let property = self.properties.last().map(String::as_str).unwrap_or("");
                let name = format!("{}.{}", property, keyword);
                let line = tree.start_line(node);
                let container = ctx.model.entity(ctx.current()).key.clone();
                let key = format!("{}#{}:{}", container, name, line);
                ctx.create_entity(EntityKind::Member, key, name, line);
                ctx.record(MetricId::Accessors, 1.0);
            }
            _ => {}
        }
    }

    fn leave_node(&mut self, node: &AstNode, _tree: &ParseTree, ctx: &mut VisitContext) {
        match node.rule_kind() {
            Some(RuleKind::PropertyDeclaration) => {
                self.properties.pop();
            }
            Some(RuleKind::AccessorDeclaration) => ctx.close_entity(),
            _ => {}
        }
    }
}
