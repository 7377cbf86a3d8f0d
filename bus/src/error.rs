//! Error taxonomy for the bus service layer.
//!
//! [`ServiceError`] covers the fatal classes: startup failures (name
//! acquisition, object-path registration) and transport send/loop
//! failures, which the daemon treats as unrecoverable. Per-call protocol
//! errors never surface here - they end as error replies on the bus.
//! [`OpsError`] is the domain failure a business-logic call may return;
//! it crosses the dispatch boundary as a value and is mapped 1:1 to an
//! error reply carrying its text.

use thiserror::Error;

/// Fatal service-level failures.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("error requesting bus name {name}: {detail}")]
    NameAcquisition { name: String, detail: String },

    #[error("failed to register object path {path}: {detail}")]
    ObjectPath { path: String, detail: String },

    #[error("error sending bus message: {0}")]
    Send(String),

    #[error("event loop failure: {0}")]
    Loop(#[from] std::io::Error),
}

/// A named failure signalled by business logic.
///
/// Carries the human-readable text that ends up in the error reply.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct OpsError(pub String);

impl OpsError {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }
}
