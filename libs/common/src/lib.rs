//! Shared infrastructure for the rest-auth services
//!
//! This crate provides the pieces every service needs to talk to the outside
//! world: PostgreSQL connection pooling, the Redis key-expiry cache, and the
//! infrastructure error types that keep transport failures distinct from
//! domain errors.

pub mod cache;
pub mod database;
pub mod error;
