//! Conversion of domain errors into GraphQL errors with `extensions.code`

use std::fmt::Display;

use async_graphql::{Error, ErrorExtensions, ID};

use crate::pagination::PaginationError;
use crate::services::LikeError;

impl ErrorExtensions for PaginationError {
    fn extend(&self) -> Error {
        let code = match self {
            PaginationError::InvalidCursor(_) => "INVALID_CURSOR",
            PaginationError::InvalidPageSize(_) => "BAD_USER_INPUT",
            PaginationError::DataStore(e) => return internal_error(e),
        };

        Error::new(self.to_string()).extend_with(|_, e| e.set("code", code))
    }
}

impl ErrorExtensions for LikeError {
    fn extend(&self) -> Error {
        let code = match self {
            LikeError::AlreadyLiked => "ALREADY_LIKED",
            LikeError::NotFound => "NOT_FOUND",
            LikeError::Database(e) => return internal_error(e),
        };

        Error::new(self.to_string()).extend_with(|_, e| e.set("code", code))
    }
}

/// Opaque error for unexpected failures; details go to the log only.
pub fn internal_error(err: impl Display) -> Error {
    tracing::error!(error = %err, "Internal error while resolving GraphQL field");
    Error::new("Internal server error").extend_with(|_, e| e.set("code", "INTERNAL"))
}

pub fn not_found(what: &str) -> Error {
    Error::new(format!("{} not found", what)).extend_with(|_, e| e.set("code", "NOT_FOUND"))
}

/// Parse a GraphQL `ID` into a database id.
pub fn parse_id(id: &ID) -> async_graphql::Result<i32> {
    id.parse::<i32>().map_err(|_| {
        Error::new(format!("Invalid ID: {}", id.as_str()))
            .extend_with(|_, e| e.set("code", "BAD_USER_INPUT"))
    })
}
