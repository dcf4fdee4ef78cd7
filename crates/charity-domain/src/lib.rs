//! Domain types shared across the charity platform crates.
//!
//! This crate contains only pure types with no framework dependencies.
//! Import in `usecase/` and `domain/` layers; never in `infra/` or `handlers/`.

pub mod account;
pub mod donation;
pub mod institution;
pub mod pagination;
