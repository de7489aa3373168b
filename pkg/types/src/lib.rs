//! Data model shared by the tiller bootstrapper crates.

pub mod chart;
pub mod config;
pub mod deployment;
pub mod error;
pub mod home;
pub mod rbac;
pub mod release;
pub mod repository;
pub mod tunnel;
pub mod validate;

pub use error::{Error, ResourceKind, Result, TeardownFailure};
