//! # Domain Layer
//!
//! Ledger records, composite views, value objects and errors.
//!
//! This module contains NO I/O dependencies. Repository, oracle and cache
//! access go through the traits in `ports`.

pub mod entities;
pub mod errors;
pub mod value_objects;

pub use entities::*;
pub use errors::*;
pub use value_objects::*;
