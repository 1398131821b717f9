//! Recipe discovery client.
//!
//! A typed or spoken query is fanned out into two independent requests
//! against a recipe service: a catalog search, whose results are sorted into
//! overlapping browse rows, and a recipe generation.  Both land in one
//! search session without masking each other, and a newer query always
//! wins over a slower older one.
//!
//! * [`recipe`]: record types and the category reducer.
//! * [`voice`]: speech + typing → one submission stream.
//! * [`search`]: session state and the two-branch orchestrator.
//! * [`detail`]: single recipe fetch.
//! * [`api`]: recipe service client.
//! * [`config`]: TOML settings.
//! * [`cli`]: terminal front end.

pub mod api;
pub mod cli;
pub mod config;
pub mod detail;
pub mod recipe;
pub mod search;
pub mod voice;
