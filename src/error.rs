//! Scan error taxonomy.
//!
//! Per-file failures are ordinary values: the scanner returns them through
//! `Result` and collects them into the scan result instead of unwinding.
//! Grammar configuration errors surface before any file is read.

use crate::parser::grammar::GrammarError;
use crate::parser::lexer::LexError;
use crate::parser::parser::RecognitionError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path} is not valid in the configured encoding")]
    Decode { path: PathBuf },

    /// Fatal lexer failure for one file.
    #[error(transparent)]
    Lex(#[from] LexError),

    /// The parser could not match the compilation unit; fatal for the file
    /// only.
    #[error(transparent)]
    Recognition(#[from] RecognitionError),

    /// Programming error in the grammar definition; fatal for the whole
    /// scan, before any file is processed.
    #[error(transparent)]
    Grammar(#[from] GrammarError),
}
