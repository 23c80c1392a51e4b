//! plotledger - industrial plot ownership registry and outreach store.
//!
//! Owns the relational schema for two records keyed by plotcode: property
//! ownership data and its one-to-one outreach enrichment. Provides migrations
//! for SQLite and PostgreSQL backends, typed repositories over the indexed
//! lookups, and portable export/import between backends.

pub mod cli;
pub mod config;
pub mod migrations;
pub mod models;
pub mod repository;
pub mod schema;
