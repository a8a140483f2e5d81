//! AST walker and visitor framework.
//!
//! Visitors subscribe to grammar rules (and optionally to every node or
//! every token); the walker builds a rule-index → visitor-index dispatch
//! table once at construction and performs a single depth-first traversal
//! per file. Enter callbacks run in registration order, then children, then
//! leave callbacks in the same order. Registration order is the documented
//! contract: structural visitors (which push and pop the entity stack) must
//! be registered before the metric visitors that read the current entity.
//!
//! Visitors never talk to each other — all shared state goes through
//! [`VisitContext`], which owns the entity stack and the metric recording
//! API.

pub mod metrics;
pub mod model;
pub mod structure;

use crate::error::ScanError;
use crate::parser::ast::{AstNode, NodeKind, ParseTree};
use crate::parser::csharp::{RuleKind, RULE_COUNT};
use crate::parser::token::Token;
use model::{EntityArena, EntityId, EntityKind, MetricId};
use std::path::Path;

/// Shared state the visitors communicate through.
pub struct VisitContext<'a> {
    pub model: &'a mut EntityArena,
    stack: Vec<EntityId>,
}

impl<'a> VisitContext<'a> {
    /// `origin` is the entity the traversal starts in, normally the File
    /// entity created by the scanner.
    pub fn new(model: &'a mut EntityArena, origin: EntityId) -> Self {
        Self {
            model,
            stack: vec![origin],
        }
    }

    /// Entity the traversal is currently inside.
    pub fn current(&self) -> EntityId {
        *self.stack.last().expect("the origin entity is never popped")
    }

    pub fn current_kind(&self) -> EntityKind {
        self.model.entity(self.current()).kind
    }

    /// Pushes a new entity as a child of the current one.
    pub fn create_entity(
        &mut self,
        kind: EntityKind,
        key: impl Into<String>,
        name: impl Into<String>,
        start_line: u32,
    ) -> EntityId {
        let id = self.model.add(self.current(), kind, key, name, start_line);
        self.stack.push(id);
        id
    }

    /// Pops the entity pushed by the matching [`create_entity`] call.
    ///
    /// [`create_entity`]: VisitContext::create_entity
    pub fn close_entity(&mut self) {
        if self.stack.len() > 1 {
            self.stack.pop();
        }
    }

    /// Records a metric delta on the current entity.
    pub fn record(&mut self, metric: MetricId, delta: f64) {
        let id = self.current();
        self.model.record(id, metric, delta);
    }

    /// Records a metric on a specific entity; used by visitors that buffer
    /// per-entity state until `leave_file`.
    pub fn record_on(&mut self, id: EntityId, metric: MetricId, delta: f64) {
        self.model.record(id, metric, delta);
    }

    /// Key of the nearest enclosing entity of `kind`, if any.
    pub fn nearest_key(&self, kind: EntityKind) -> Option<&str> {
        self.stack
            .iter()
            .rev()
            .map(|&id| self.model.entity(id))
            .find(|e| e.kind == kind)
            .map(|e| e.key.as_str())
    }
}

/// One pass over the AST. All callbacks default to no-ops so visitors only
/// implement what they subscribe to.
pub trait AstVisitor {
    /// Rules whose nodes this visitor wants to enter and leave.
    fn subscribed(&self) -> &'static [RuleKind] {
        &[]
    }

    /// Subscribe to every rule node regardless of kind.
    fn visits_all_nodes(&self) -> bool {
        false
    }

    /// Subscribe to every leaf token (plus the `Eof` token at the end of
    /// the file, so trailing trivia are observable).
    fn visits_tokens(&self) -> bool {
        false
    }

    fn visit_file(&mut self, _tree: &ParseTree, _ctx: &mut VisitContext) {}

    fn leave_file(&mut self, _tree: &ParseTree, _ctx: &mut VisitContext) {}

    fn visit_node(&mut self, _node: &AstNode, _tree: &ParseTree, _ctx: &mut VisitContext) {}

    fn leave_node(&mut self, _node: &AstNode, _tree: &ParseTree, _ctx: &mut VisitContext) {}

    fn visit_token(&mut self, _token: &Token, _ctx: &mut VisitContext) {}

    /// Audit hook: the scanner reports files that failed to lex or parse,
    /// so check-style visitors can react without aborting the scan.
    fn parse_failed(&mut self, _path: &Path, _error: &ScanError) {}
}

/// Drives an ordered visitor list over one parse tree.
pub struct AstWalker {
    visitors: Vec<Box<dyn AstVisitor>>,
    /// rule index → indices of subscribed visitors, in registration order
    dispatch: Vec<Vec<usize>>,
    token_subscribers: Vec<usize>,
}

impl AstWalker {
    pub fn new(visitors: Vec<Box<dyn AstVisitor>>) -> Self {
        let mut dispatch: Vec<Vec<usize>> = vec![Vec::new(); RULE_COUNT];
        let mut token_subscribers = Vec::new();
        for (index, visitor) in visitors.iter().enumerate() {
            if visitor.visits_all_nodes() {
                for slot in dispatch.iter_mut() {
                    slot.push(index);
                }
            } else {
                for rule in visitor.subscribed() {
                    dispatch[rule.index()].push(index);
                }
            }
            if visitor.visits_tokens() {
                token_subscribers.push(index);
            }
        }
        Self {
            visitors,
            dispatch,
            token_subscribers,
        }
    }

    /// One depth-first traversal bracketed by `visit_file`/`leave_file`.
    pub fn walk(&mut self, tree: &ParseTree, ctx: &mut VisitContext) {
        for visitor in self.visitors.iter_mut() {
            visitor.visit_file(tree, ctx);
        }
        self.walk_node(&tree.root, tree, ctx);
        // the Eof leaf is not part of the AST but carries trailing trivia
        for i in 0..self.token_subscribers.len() {
            let index = self.token_subscribers[i];
            self.visitors[index].visit_token(tree.token(tree.eof_index()), ctx);
        }
        for visitor in self.visitors.iter_mut() {
            visitor.leave_file(tree, ctx);
        }
    }

    fn walk_node(&mut self, node: &AstNode, tree: &ParseTree, ctx: &mut VisitContext) {
        match node.kind {
            NodeKind::Token(token_index) => {
                for i in 0..self.token_subscribers.len() {
                    let index = self.token_subscribers[i];
                    self.visitors[index].visit_token(tree.token(token_index), ctx);
                }
            }
            NodeKind::Rule(rule) => {
                let rule_index = rule.index();
                for i in 0..self.dispatch[rule_index].len() {
                    let index = self.dispatch[rule_index][i];
                    self.visitors[index].visit_node(node, tree, ctx);
                }
                for child in &node.children {
                    self.walk_node(child, tree, ctx);
                }
                for i in 0..self.dispatch[rule_index].len() {
                    let index = self.dispatch[rule_index][i];
                    self.visitors[index].leave_node(node, tree, ctx);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::csharp::{grammar, RuleKind};
    use crate::parser::lexer::Lexer;
    use crate::parser::parser::Parser;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn parse(source: &str) -> ParseTree {
        let grammar = grammar().unwrap();
        let stream = Lexer::new().tokenize(source).unwrap();
        Parser::new(&grammar)
            .parse(stream, RuleKind::CompilationUnit)
            .unwrap()
    }

    struct Recorder {
        log: Rc<RefCell<Vec<String>>>,
        tag: &'static str,
    }

    impl AstVisitor for Recorder {
        fn subscribed(&self) -> &'static [RuleKind] {
            &[RuleKind::ClassDeclaration]
        }

        fn visit_node(&mut self, _node: &AstNode, _tree: &ParseTree, _ctx: &mut VisitContext) {
            self.log.borrow_mut().push(format!("{}:enter", self.tag));
        }

        fn leave_node(&mut self, _node: &AstNode, _tree: &ParseTree, _ctx: &mut VisitContext) {
            self.log.borrow_mut().push(format!("{}:leave", self.tag));
        }
    }

    #[test]
    fn test_enter_and_leave_fire_in_registration_order() {
        let tree = parse("class C { }");
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut model = EntityArena::new("p", "p");
        let origin = model.root();
        let mut ctx = VisitContext::new(&mut model, origin);
        let mut walker = AstWalker::new(vec![
            Box::new(Recorder { log: Rc::clone(&log), tag: "first" }),
            Box::new(Recorder { log: Rc::clone(&log), tag: "second" }),
        ]);
        walker.walk(&tree, &mut ctx);
        assert_eq!(
            *log.borrow(),
            vec!["first:enter", "second:enter", "first:leave", "second:leave"]
        );
    }

    struct TokenCounter {
        count: Rc<RefCell<usize>>,
    }

    impl AstVisitor for TokenCounter {
        fn visits_tokens(&self) -> bool {
            true
        }

        fn visit_token(&mut self, _token: &Token, _ctx: &mut VisitContext) {
            *self.count.borrow_mut() += 1;
        }
    }

    #[test]
    fn test_token_subscription_sees_every_leaf_and_eof() {
        let tree = parse("class C { }");
        let count = Rc::new(RefCell::new(0));
        let mut model = EntityArena::new("p", "p");
        let origin = model.root();
        let mut ctx = VisitContext::new(&mut model, origin);
        let mut walker =
            AstWalker::new(vec![Box::new(TokenCounter { count: Rc::clone(&count) })]);
        walker.walk(&tree, &mut ctx);
        // every significant token is an AST leaf, plus the Eof hook
        assert_eq!(*count.borrow(), tree.tokens.len());
    }

    struct StackProbe {
        seen: Rc<RefCell<Vec<EntityKind>>>,
    }

    impl AstVisitor for StackProbe {
        fn subscribed(&self) -> &'static [RuleKind] {
            &[RuleKind::MethodDeclaration]
        }

        fn visit_node(&mut self, _node: &AstNode, _tree: &ParseTree, ctx: &mut VisitContext) {
            self.seen.borrow_mut().push(ctx.current_kind());
        }
    }

    #[test]
    fn test_structural_visitors_establish_context_before_later_visitors() {
        let tree = parse("class C { void M() { } }");
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut model = EntityArena::new("p", "p");
        let origin = model.root();
        let mut ctx = VisitContext::new(&mut model, origin);
        let mut walker = AstWalker::new(vec![
            Box::new(structure::TypeVisitor::new()),
            Box::new(StackProbe { seen: Rc::clone(&seen) }),
        ]);
        walker.walk(&tree, &mut ctx);
        // by the time the probe sees the method, the type visitor has
        // already pushed the type entity
        assert_eq!(*seen.borrow(), vec![EntityKind::Type]);
    }
}
