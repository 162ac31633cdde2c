//! Top-level facade crate for vitalproxy.
//!
//! Re-exports core types and the gateway library so users can depend on a single crate.

pub mod core {
    pub use vitalproxy_core::*;
}

pub mod gateway {
    pub use vitalproxy_gateway::*;
}
