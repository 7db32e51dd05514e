//! Meshi Backend - GraphQL API for restaurant discovery
//!
//! Restaurants ("meshi"), municipalities, users and likes are served over
//! GraphQL at /graphql. Listings use keyset pagination, see [`pagination`].

pub mod api;
pub mod app;
pub mod config;
pub mod db;
pub mod graphql;
pub mod pagination;
pub mod services;
