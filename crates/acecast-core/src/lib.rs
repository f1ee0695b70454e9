// Core domain crate: data model, scoring, venue reference data, the
// prediction cache and the provider boundaries.

pub mod config;
pub mod db;
pub mod gateway;
pub mod model;
pub mod scoring;
pub mod venues;
