//! # Ports Layer
//!
//! - **Driving Ports (Inbound)**: APIs consumed by adapters (API handler)
//! - **Driven Ports (Outbound)**: SPIs implemented by adapters (ledger index,
//!   balance oracle, result cache)

pub mod inbound;
pub mod outbound;

pub use inbound::*;
pub use outbound::*;
