//! Centralized constants for the tiller bootstrapper.
//!
//! All project-wide constant values live here.
//! Change a value in one place and it applies everywhere.

pub mod paths;
pub mod repository;
pub mod rbac;
pub mod tiller;
pub mod wait;
