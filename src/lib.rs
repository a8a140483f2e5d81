//! # Introduction
//!
//! sharpscan is a static-analysis front end for C# source. It tokenizes
//! source text with a channel-composed lexer, parses the token stream
//! against a declarative backtracking grammar, and walks the resulting
//! syntax tree with an ordered visitor pipeline that builds a hierarchical
//! source-entity model (Project ⊃ File ⊃ Namespace ⊃ Type ⊃ Member) and
//! accumulates structural metrics. A post-scan symbol index resolves fully
//! qualified names back to the file that declared them.
//!
//! ## Analysis pipeline
//!
//! ```text
//! Source → Lexer (+ preprocessor channel) → Tokens → Parser → AST
//!        → Walker + visitors → Entity tree + metrics → Symbol index
//! ```
//!
//! 1. [`parser`] — tokenization, the C# grammar, and the backtracking
//!    recognizer producing the concrete syntax tree.
//! 2. [`analysis`] — the visitor framework, the entity model, and the
//!    structural/metric visitors.
//! 3. [`scanner`] — per-file and per-directory entry points with
//!    file-granular fault isolation.
//! 4. [`bridge`] — the per-session qualified-name → file index.
//!
//! ## Failure model
//!
//! Unknown characters are discarded with a logged diagnostic (or promoted
//! to a fatal error by configuration). A file the grammar cannot recognize
//! fails alone: the scan records the cause and continues, unless
//! stop-on-failure is configured. Grammar configuration errors surface when
//! the scanner is constructed, before any file is read.

pub mod analysis;
pub mod bridge;
pub mod error;
pub mod parser;
pub mod scanner;

pub use analysis::model::{EntityArena, EntityId, EntityKind, MetricId, SourceEntity};
pub use bridge::ResourceBridge;
pub use error::ScanError;
pub use scanner::{Encoding, FileFailure, ScanConfig, ScanResult, Scanner};
