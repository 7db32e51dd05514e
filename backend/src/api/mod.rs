//! Non-GraphQL HTTP routes

pub mod health;
