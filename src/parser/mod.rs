//! C# source text to concrete syntax tree.
//!
//! - [`token`]: token/trivia definitions and the keyword/punctuator tables
//! - [`channel`]: the ordered lexer channels
//! - [`lexer`]: channel-driven tokenization (source text → token stream)
//! - [`preprocessor`]: using-directive elision over the token stream
//! - [`grammar`]: rule arena, combinators and build-time validation
//! - [`csharp`]: the C# rule set
//! - [`parser`]: backtracking interpretation (tokens → AST)
//! - [`ast`]: AST node definitions
//!
//! # Parser implementation
//!
//! Hand-written channel lexer feeding a grammar-driven backtracking
//! recognizer. No external parser generator dependencies.

pub mod ast;
pub mod channel;
pub mod csharp;
pub mod grammar;
pub mod lexer;
pub mod parser;
pub mod preprocessor;
pub mod token;
