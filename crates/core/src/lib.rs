//! Core business logic for Warbler.
//!
//! Services sit between the web layer and the repositories: they validate
//! input, enforce ownership and the follow rules, and assemble the views the
//! pages need (feeds, profiles, social graphs).

pub mod services;

pub use services::*;
