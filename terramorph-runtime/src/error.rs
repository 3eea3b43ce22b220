//! Runtime-level failures that aren't a provider/state-store outcome and
//! so don't arise inside a handler's own [`terramorph_core::Diagnostics`]
//! value: a callback panicking, or the walk being cancelled. Converted
//! into [`Diagnostic`] records the same way every other crate in this
//! workspace turns its scoped error type into caller-visible diagnostics.

use terramorph_core::{Diagnostic, Kind, Severity};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("callback for {vertex} panicked")]
    CallbackPanicked { vertex: String, detail: String },

    #[error("walk cancelled before all vertices were evaluated")]
    Cancelled,
}

impl From<Error> for Diagnostic {
    fn from(err: Error) -> Self {
        match err {
            Error::CallbackPanicked { vertex, detail } => Diagnostic {
                severity: Severity::Error,
                kind: None,
                summary: format!("callback for {vertex} panicked"),
                detail,
            },
            Error::Cancelled => Diagnostic {
                severity: Severity::Error,
                kind: Some(Kind::Cancelled),
                summary: "walk cancelled".to_string(),
                detail: "cancellation observed before all vertices were evaluated".to_string(),
            },
        }
    }
}
