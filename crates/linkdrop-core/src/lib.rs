//! Cross-cutting HTTP plumbing shared by Linkdrop services:
//! health probes, request-id and trace layers, timestamp serialization, tracing init.

pub mod health;
pub mod middleware;
pub mod serde;
pub mod tracing;
