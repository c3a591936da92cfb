//! Graph error types.

use thiserror::Error;

use crate::graph::entry::rejection_reason;
use crate::graph::Component;

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors resolving the component graph. All of them are fatal to boot.
#[derive(Debug, Error)]
pub enum GraphError {
    /// A constructor or its validation failed.
    #[error("{component} load error: {source}")]
    Construction {
        component: Component,
        #[source]
        source: BoxError,
    },

    /// The requested entry point is not implemented.
    #[error("invalid entry point '{0}': {reason}", reason = rejection_reason(.0))]
    UnknownEntryPoint(String),
}

impl GraphError {
    pub fn construction<E>(component: Component, source: E) -> Self
    where
        E: Into<BoxError>,
    {
        GraphError::Construction {
            component,
            source: source.into(),
        }
    }

    /// Component whose construction failed, if any.
    pub fn component(&self) -> Option<Component> {
        match self {
            GraphError::Construction { component, .. } => Some(*component),
            GraphError::UnknownEntryPoint(_) => None,
        }
    }
}
