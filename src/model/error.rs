use thiserror::Error;

/// Errors raised while applying updates to a [`Model`](super::Model).
#[derive(Debug, Error)]
pub enum ModelError {
    /// A dynamic update named a field the state shape does not declare.
    #[error("unknown field `{field}` in update")]
    InvalidUpdate { field: String },

    /// A dynamic update could not be decoded into the shape's patch type.
    #[error("malformed update")]
    MalformedUpdate(#[source] serde_json::Error),

    /// Responders kept producing updates past the cascade limit.
    #[error("responder cascade did not settle after {limit} updates")]
    ReentrantUpdateOverflow { limit: usize },
}
