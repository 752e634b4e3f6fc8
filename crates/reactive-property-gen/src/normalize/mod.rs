//! Source normalizer.
//!
//! Raw unit text is validated with `syn` and re-rendered in one canonical
//! layout, so output is stable regardless of how the text was produced.
mod layout;


pub use layout::{render_file, render_inline};

use quote::ToTokens;
use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};
use thiserror::Error as ThisError;

///
/// NormalizeError
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum NormalizeError {
    #[error("syntax error in unit '{key}' at {line}:{column}: {message}")]
    Syntax {
        key: String,
        message: String,
        line: usize,
        column: usize,
    },

    #[error("normalization cancelled")]
    Cancelled,
}

impl NormalizeError {
    fn syntax(key: &str, err: &syn::Error) -> Self {
        let start = err.span().start();

        Self::Syntax {
            key: key.to_string(),
            message: err.to_string(),
            line: start.line,
            column: start.column + 1,
        }
    }
}

///
/// CancellationToken
///
/// Cooperative cancellation shared between a caller and a running pass.
/// Clones observe the same flag.
///

#[derive(Clone, Debug, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    pub fn check(&self) -> Result<(), NormalizeError> {
        if self.is_cancelled() {
            Err(NormalizeError::Cancelled)
        } else {
            Ok(())
        }
    }
}

/// Validate `raw` and render it in canonical layout.
///
/// Cancellation is observed before parsing, between parsing and rendering,
/// and before returning; a cancelled call yields no text.
pub fn normalize(
    key: &str,
    raw: &str,
    cancel: &CancellationToken,
) -> Result<String, NormalizeError> {
    cancel.check()?;
    let file = syn::parse_file(raw).map_err(|err| NormalizeError::syntax(key, &err))?;

    cancel.check()?;
    let text = render_file(file.to_token_stream());

    // the rendered text must parse as well
    syn::parse_file(&text).map_err(|err| NormalizeError::syntax(key, &err))?;

    cancel.check()?;

    Ok(text)
}
