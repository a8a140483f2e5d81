//! Scanner entry points: one file or a whole directory through the
//! lex → elide → parse → visit → index pipeline.
//!
//! Failures are file-granular. Lexing and parsing happen before any entity
//! is created for the file, so a failed file leaves no trace in the shared
//! project tree; the per-file merge is the only atomicity boundary. Under
//! the default configuration the scan logs a failure and continues with the
//! next file.

use crate::analysis::metrics::{
    CommentMetricsVisitor, ComplexityVisitor, LinesOfCodeVisitor, PublicApiVisitor,
    StatementVisitor,
};
use crate::analysis::model::{EntityArena, EntityKind, MetricId};
use crate::analysis::structure::{AccessorVisitor, MemberVisitor, NamespaceVisitor, TypeVisitor};
use crate::analysis::{AstVisitor, AstWalker, VisitContext};
use crate::bridge::ResourceBridge;
use crate::error::ScanError;
use crate::parser::ast::ParseTree;
use crate::parser::csharp::{self, RuleKind};
use crate::parser::grammar::{Grammar, GrammarError};
use crate::parser::lexer::Lexer;
use crate::parser::parser::Parser;
use crate::parser::preprocessor::UsingDirectiveFilter;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, error};
use walkdir::WalkDir;

/// Character encoding of the scanned sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Encoding {
    #[default]
    Utf8,
    Latin1,
}

/// Scan configuration.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    pub encoding: Encoding,
    /// Abort the whole scan on the first file-level failure instead of
    /// logging and continuing.
    pub stop_on_failure: bool,
    /// Exclude comments before the first token of a file (license banners)
    /// from the comment metrics.
    pub ignore_header_comments: bool,
    /// Promote unknown characters from a logged diagnostic to a fatal
    /// lexer error.
    pub fail_on_unknown_char: bool,
    /// File suffixes picked up by directory scans.
    pub suffixes: Vec<String>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            encoding: Encoding::Utf8,
            stop_on_failure: false,
            ignore_header_comments: false,
            fail_on_unknown_char: false,
            suffixes: vec![".cs".to_string()],
        }
    }
}

/// One file that failed to lex or parse, with its cause.
#[derive(Debug)]
pub struct FileFailure {
    pub path: PathBuf,
    pub error: ScanError,
}

/// Outcome of a scan session: the finalized entity tree, the symbol index
/// and the files that failed.
pub struct ScanResult {
    pub model: EntityArena,
    pub bridge: ResourceBridge,
    pub failures: Vec<FileFailure>,
}

impl ScanResult {
    /// Convenience accessor for a project-level metric.
    pub fn project_metric(&self, metric: MetricId) -> f64 {
        self.model.entity(self.model.root()).metric(metric)
    }
}

/// Builds one visitor instance per scanned file. Check-style visitors are
/// registered through [`Scanner::register_visitor`] and run after the
/// built-in structural and metric visitors.
pub type VisitorFactory = Box<dyn Fn() -> Box<dyn AstVisitor>>;

/// Drives the pipeline. Building a scanner validates the grammar, so a
/// grammar configuration error fails here, before any file is read.
pub struct Scanner {
    config: ScanConfig,
    grammar: Grammar,
    using_filter: UsingDirectiveFilter,
    extra_visitors: Vec<VisitorFactory>,
}

impl Scanner {
    pub fn new(config: ScanConfig) -> Result<Self, GrammarError> {
        Ok(Self {
            config,
            grammar: csharp::grammar()?,
            using_filter: UsingDirectiveFilter::new()?,
            extra_visitors: Vec::new(),
        })
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    /// Registers an additional visitor, instantiated per file after the
    /// built-in visitors. Registered visitors also receive the
    /// `parse_failed` audit notification for files that never parse.
    pub fn register_visitor(&mut self, factory: impl Fn() -> Box<dyn AstVisitor> + 'static) {
        self.extra_visitors.push(Box::new(factory));
    }

    /// Scans a single file into a fresh project tree.
    pub fn scan_file(&self, path: &Path) -> Result<ScanResult, ScanError> {
        self.scan_paths(vec![path.to_path_buf()])
    }

    /// Scans every file under `dir` whose name ends with a configured
    /// suffix, in deterministic sorted order.
    pub fn scan_directory(&self, dir: &Path) -> Result<ScanResult, ScanError> {
        let mut paths: Vec<PathBuf> = WalkDir::new(dir)
            .into_iter()
            .filter_map(Result::ok)
            .filter(|entry| entry.file_type().is_file())
            .map(|entry| entry.into_path())
            .filter(|path| self.matches_suffix(path))
            .collect();
        paths.sort();
        self.scan_paths(paths)
    }

    /// Scans an in-memory source under a virtual path; useful for embedders
    /// and tests.
    pub fn scan_source(&self, virtual_path: &str, source: &str) -> Result<ScanResult, ScanError> {
        let path = Path::new(virtual_path);
        let mut model = EntityArena::new("project", "project");
        let mut bridge = ResourceBridge::new();
        let mut failures = Vec::new();
        if let Err(cause) = self.scan_one_source(path, source, &mut model, &mut bridge) {
            if let Some(fatal) = self.handle_failure(path, cause, &mut failures) {
                return Err(fatal);
            }
        }
        model.finalize();
        Ok(ScanResult {
            model,
            bridge,
            failures,
        })
    }

    fn matches_suffix(&self, path: &Path) -> bool {
        let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
        self.config.suffixes.iter().any(|s| name.ends_with(s.as_str()))
    }

    fn scan_paths(&self, paths: Vec<PathBuf>) -> Result<ScanResult, ScanError> {
        let mut model = EntityArena::new("project", "project");
        let mut bridge = ResourceBridge::new();
        let mut failures = Vec::new();

        for path in paths {
            debug!(path = %path.display(), "scanning");
            let outcome = self
                .read_source(&path)
                .and_then(|source| self.scan_one_source(&path, &source, &mut model, &mut bridge));
            if let Err(cause) = outcome {
                if let Some(fatal) = self.handle_failure(&path, cause, &mut failures) {
                    return Err(fatal);
                }
            }
        }

        model.finalize();
        Ok(ScanResult {
            model,
            bridge,
            failures,
        })
    }

    /// Logs the failure and notifies a fresh visitor set through the audit
    /// hook. Returns the error back when the scan is configured to abort;
    /// otherwise records it and the scan continues.
    fn handle_failure(
        &self,
        path: &Path,
        cause: ScanError,
        failures: &mut Vec<FileFailure>,
    ) -> Option<ScanError> {
        error!(path = %path.display(), %cause, "file failed to scan");
        let mut visitors = self.make_visitors();
        for visitor in visitors.iter_mut() {
            visitor.parse_failed(path, &cause);
        }
        if self.config.stop_on_failure {
            Some(cause)
        } else {
            failures.push(FileFailure {
                path: path.to_path_buf(),
                error: cause,
            });
            None
        }
    }

    fn scan_one_source(
        &self,
        path: &Path,
        source: &str,
        model: &mut EntityArena,
        bridge: &mut ResourceBridge,
    ) -> Result<(), ScanError> {
        // lex and parse first: a failure here must leave the project tree
        // untouched
        let tree = self.parse_source(source)?;

        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("<unnamed>")
            .to_string();
        let file = model.add(
            model.root(),
            EntityKind::File,
            path.display().to_string(),
            file_name,
            1,
        );
        model.record(file, MetricId::Files, 1.0);
        model.record(file, MetricId::Lines, source.lines().count() as f64);

        let mut ctx = VisitContext::new(model, file);
        let mut walker = AstWalker::new(self.make_visitors());
        walker.walk(&tree, &mut ctx);

        bridge.index_file(model, file, path);
        Ok(())
    }

    fn parse_source(&self, source: &str) -> Result<ParseTree, ScanError> {
        let lexer = Lexer::with_policy(self.config.fail_on_unknown_char);
        let stream = lexer.tokenize(source)?;
        let stream = self.using_filter.apply(&stream);
        let parser = Parser::new(&self.grammar);
        Ok(parser.parse(stream, RuleKind::CompilationUnit)?)
    }

    /// The documented visitor order: structural visitors establish the
    /// entity context, metric visitors consume it, registered check-style
    /// visitors come last.
    fn make_visitors(&self) -> Vec<Box<dyn AstVisitor>> {
        let mut visitors: Vec<Box<dyn AstVisitor>> = vec![
            Box::new(NamespaceVisitor::new()),
            Box::new(TypeVisitor::new()),
            Box::new(MemberVisitor::new()),
            Box::new(AccessorVisitor::new()),
            Box::new(LinesOfCodeVisitor::new()),
            Box::new(CommentMetricsVisitor::new(self.config.ignore_header_comments)),
            Box::new(StatementVisitor::new()),
            Box::new(ComplexityVisitor::new()),
            Box::new(PublicApiVisitor::new()),
        ];
        for factory in &self.extra_visitors {
            visitors.push(factory());
        }
        visitors
    }

    fn read_source(&self, path: &Path) -> Result<String, ScanError> {
        let bytes = fs::read(path).map_err(|source| ScanError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        match self.config.encoding {
            Encoding::Utf8 => String::from_utf8(bytes).map_err(|_| ScanError::Decode {
                path: path.to_path_buf(),
            }),
            Encoding::Latin1 => Ok(bytes.into_iter().map(|b| b as char).collect()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::token::Token;
    use std::cell::RefCell;
    use std::rc::Rc;

    struct AuditVisitor {
        failures: Rc<RefCell<Vec<PathBuf>>>,
    }

    impl AstVisitor for AuditVisitor {
        fn visit_token(&mut self, _token: &Token, _ctx: &mut VisitContext) {}

        fn parse_failed(&mut self, path: &Path, _error: &ScanError) {
            self.failures.borrow_mut().push(path.to_path_buf());
        }
    }

    #[test]
    fn test_registered_visitors_receive_the_audit_notification() {
        let mut scanner = Scanner::new(ScanConfig::default()).expect("grammar must build");
        let seen = Rc::new(RefCell::new(Vec::new()));
        let for_factory = Rc::clone(&seen);
        scanner.register_visitor(move || {
            Box::new(AuditVisitor {
                failures: Rc::clone(&for_factory),
            })
        });

        let result = scanner
            .scan_source("broken.cs", "class {{{ nope")
            .expect("continue-on-failure is the default");
        assert_eq!(result.failures.len(), 1);
        assert_eq!(seen.borrow().len(), 1);
        assert!(seen.borrow()[0].ends_with("broken.cs"));
    }

    #[test]
    fn test_latin1_sources_are_decoded() {
        let config = ScanConfig {
            encoding: Encoding::Latin1,
            ..ScanConfig::default()
        };
        let scanner = Scanner::new(config).expect("grammar must build");
        // 0xE9 is 'é' in Latin-1 and invalid on its own in UTF-8
        let source = b"class C { } // caf\xe9";
        let dir = std::env::temp_dir().join(format!("sharpscan_latin1_{}", std::process::id()));
        std::fs::create_dir_all(&dir).expect("temp dir creation failed");
        let path = dir.join("latin.cs");
        std::fs::write(&path, source).expect("temp file write failed");

        let result = scanner.scan_file(&path).expect("scan failed");
        assert!(result.failures.is_empty(), "{:?}", result.failures);
        assert_eq!(result.project_metric(MetricId::Classes), 1.0);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_invalid_utf8_is_a_decode_failure() {
        let scanner = Scanner::new(ScanConfig::default()).expect("grammar must build");
        let dir = std::env::temp_dir().join(format!("sharpscan_utf8_{}", std::process::id()));
        std::fs::create_dir_all(&dir).expect("temp dir creation failed");
        let path = dir.join("bad.cs");
        std::fs::write(&path, b"class C { } // caf\xe9").expect("temp file write failed");

        let result = scanner.scan_file(&path).expect("continue-on-failure is the default");
        assert_eq!(result.failures.len(), 1);
        assert!(matches!(result.failures[0].error, ScanError::Decode { .. }));

        let _ = std::fs::remove_dir_all(&dir);
    }
}
