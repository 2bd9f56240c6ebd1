//! Pushpack - signed Safari-style web push package builder
//!
//! This crate builds the distribution bundle a client-side notification
//! agent verifies before trusting its contents: templated configuration
//! document plus icon assets, a SHA-1 digest manifest, a detached PKCS#7
//! signature over that manifest, and a flat zip archive of all of it.

// Enforce strict code quality and reliability
#![deny(
    // Safety
    unsafe_code,

    // Correctness
    missing_debug_implementations,
    unreachable_pub,

    // Future compatibility
    future_incompatible,

    // Rust 2018 idioms
    rust_2018_idioms,
)]
#![warn(
    // Error handling best practices
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::unimplemented,
    clippy::todo,

    // Performance
    clippy::inefficient_to_string,
    clippy::large_enum_variant,

    // Best practices
    clippy::clone_on_ref_ptr,
    clippy::wildcard_imports,
    clippy::enum_glob_use,
    clippy::if_not_else,
    clippy::needless_continue,
    clippy::explicit_iter_loop,
    clippy::explicit_into_iter_loop,
)]

pub mod api;
pub mod exceptions;
pub mod exit_codes;
pub mod logger;
pub mod pkg;
pub mod version;

// Re-export main API types
pub use api::{BuildOptions, build_push_package, verify_push_package};
pub use exceptions::{PushPackError, Result};

// Re-export pipeline types for advanced usage
pub use pkg::{
    BuildReceipt, BuildStage, Certificate, Package, PackageGenerator, SubstitutionValues,
    TemplateSet, VerifyResult,
};
