// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Error types for the interception pipeline
//!
//! Two failure families exist: construction-time failures, reported once
//! through `Error::ProxyConstruction`, and invocation-time failures, which
//! propagate unchanged up the chain so interception never masks an
//! application failure.

use thiserror::Error;

use crate::metadata::ClassId;

/// Result type alias for coil operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the interception pipeline
#[derive(Error, Debug)]
pub enum Error {
    /// Proxy type could not be produced or instantiated.
    ///
    /// Wraps every underlying failure from class resolution, constructor
    /// lookup, and instantiation; the original cause is preserved in
    /// `source` for diagnostics.
    #[error("proxy construction failed for `{class}`: {detail}")]
    ProxyConstruction {
        class: ClassId,
        detail: String,
        #[source]
        source: Option<Box<Error>>,
    },

    /// Failure raised by interceptor or target code, carried unchanged
    #[error("invocation failed: {0}")]
    Invocation(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Invoked method does not exist on the target class
    #[error("unknown method `{method}` on `{class}`")]
    UnknownMethod { class: ClassId, method: String },

    /// Class identity not known to the metadata provider
    #[error("unknown class `{0}`")]
    UnknownClass(ClassId),

    /// Method carries the wrong body kind for this call site
    #[error("method `{method}` does not carry a {expected} body")]
    BodyMismatch {
        method: String,
        expected: &'static str,
    },

    /// Call argument is missing or has an unexpected type
    #[error("argument {index} is not a `{expected}`")]
    ArgumentType { index: usize, expected: &'static str },

    /// Return value has an unexpected type
    #[error("value is not a `{expected}`")]
    ValueType { expected: &'static str },

    /// Instance slot is empty, usually because a nested invocation of the
    /// same interceptor or target is already in flight
    #[error("instance of `{class}` is unavailable")]
    InstanceUnavailable { class: ClassId },
}

impl Error {
    /// Wrap a user failure for propagation through an interceptor chain
    pub fn invocation(cause: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Error::Invocation(cause.into())
    }

    pub(crate) fn construction(class: &ClassId, detail: impl Into<String>) -> Self {
        Error::ProxyConstruction {
            class: class.clone(),
            detail: detail.into(),
            source: None,
        }
    }

    pub(crate) fn construction_caused(
        class: &ClassId,
        detail: impl Into<String>,
        cause: Error,
    ) -> Self {
        Error::ProxyConstruction {
            class: class.clone(),
            detail: detail.into(),
            source: Some(Box::new(cause)),
        }
    }
}
