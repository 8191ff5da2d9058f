//! # facetry
//!
//! Command-line front-end for the Facetry metamodel engine.
//!
//! The binary in `main.rs` only sets up logging and dispatches to `cli`;
//! everything else lives here so it can be driven from tests.

pub mod cli;
