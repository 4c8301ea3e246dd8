//! Session-level stream analyses
//!
//! Both analyzers are batch passes over an ordered capture: their only
//! state is the message list they are handed. Per-ECU temporal order
//! matters - the nearest-prior-request search and the seed/key pairing
//! are strictly order-dependent within each ECU's partition.

pub mod negative;
pub mod security;
