//! Error handling for the multibar library.
//!
//! Configuration mistakes (unknown styles, duplicate titles, missing groups),
//! malformed text schemas and download failures are all reported through the
//! [`Error`] enum. Painting never surfaces errors: a failed terminal write is
//! logged and the redraw loop keeps running.

use std::io;
use thiserror::Error;

/// Errors that can happen when using multibar.
#[derive(Error, Debug)]
pub enum Error {
    /// A renderer style, group or tracker could not be found.
    ///
    /// The payload names what was looked up, e.g. `stepper style 9` or
    /// `group "downloads"`.
    #[error("Not found: {0}")]
    NotFound(String),

    /// A tracker with the same title already lives in the target group.
    #[error("Already exists: {0}")]
    AlreadyExists(String),

    /// A text schema could not be parsed.
    ///
    /// Schemas are parsed when a renderer is built, so this error is returned
    /// by the builder and never by the redraw loop.
    #[error("Invalid template: {0}")]
    Template(String),

    /// The call does not match the coordinator layout, e.g. adding a flat
    /// tracker to a grouped coordinator.
    #[error("Wrong layout: {0}")]
    Layout(String),

    /// The coordinator was already closed.
    #[error("The progress coordinator is closed")]
    Closed,

    /// Error from the underlying URL parser or the expected URL format.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// A background runtime for a download task could not be created.
    #[error("Runtime error: {0}")]
    Runtime(String),

    /// I/O Error.
    #[error("I/O error")]
    IOError {
        #[from]
        source: io::Error,
    },

    /// Error from the Reqwest library.
    #[error("Reqwest Error")]
    Reqwest {
        #[from]
        source: reqwest::Error,
    },

    /// Error raised by the HTTP middleware stack (retry, tracing).
    #[error("HTTP middleware error")]
    Middleware {
        #[from]
        source: reqwest_middleware::Error,
    },
}

/// Result type alias for operations that can fail with a multibar error.
pub type Result<T> = std::result::Result<T, Error>;
