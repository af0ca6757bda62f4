//! UK postcode lookup server.
//!
//! A single-endpoint web service that answers: "where are these postcodes?"
//! Coordinates come from two on-disk shards, only one of which is held in
//! memory at a time.

pub mod codec;
pub mod config;
pub mod dataset;
pub mod postcode;
pub mod resolver;
pub mod store;
pub mod token;
pub mod web;
