//! Error taxonomy for catalog operations
//!
//! Every error carries a stable `code` so clients can tell "retry with
//! different input" from "log in again" from "server fault". The code (and the
//! offending argument, when there is one) is attached to GraphQL errors as
//! extensions through `ErrorExtensions::extend`.

use async_graphql::ErrorExtensions;
use thiserror::Error;

/// Result alias used by the catalog services
pub type CatalogResult<T> = std::result::Result<T, CatalogError>;

#[derive(Error, Debug)]
pub enum CatalogError {
    /// A mutation was attempted without an authenticated identity
    #[error("not authenticated")]
    Authorization,

    /// Login with an unknown username or a wrong credential
    #[error("wrong credentials")]
    Authentication,

    /// A create/update was rejected by the store
    #[error("{message}")]
    UserInput {
        message: String,
        /// The argument value the client should change before retrying
        invalid_arg: String,
        #[source]
        source: anyhow::Error,
    },

    /// Bearer token missing, malformed, or expired
    #[error("invalid token: {0}")]
    InvalidToken(String),

    /// Unexpected store failure on a read path
    #[error("internal error: {0}")]
    Store(#[from] anyhow::Error),
}

impl CatalogError {
    pub fn user_input(
        message: impl Into<String>,
        invalid_arg: impl ToString,
        source: impl Into<anyhow::Error>,
    ) -> Self {
        Self::UserInput {
            message: message.into(),
            invalid_arg: invalid_arg.to_string(),
            source: source.into(),
        }
    }

    /// Machine-readable kind code exposed as `extensions.code`
    pub fn code(&self) -> &'static str {
        match self {
            Self::Authorization => "UNAUTHENTICATED",
            Self::Authentication => "WRONG_CREDENTIALS",
            Self::UserInput { .. } => "BAD_USER_INPUT",
            Self::InvalidToken(_) => "INVALID_TOKEN",
            Self::Store(_) => "INTERNAL_SERVER_ERROR",
        }
    }
}

impl ErrorExtensions for CatalogError {
    fn extend(&self) -> async_graphql::Error {
        async_graphql::Error::new(self.to_string()).extend_with(|_, e| {
            e.set("code", self.code());
            if let Self::UserInput {
                invalid_arg,
                source,
                ..
            } = self
            {
                e.set("invalidArgs", invalid_arg.as_str());
                e.set("cause", source.to_string());
            }
        })
    }
}
