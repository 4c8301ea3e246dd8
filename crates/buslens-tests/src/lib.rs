//! Integration tests for the buslens decoding engine
//!
//! This crate contains end-to-end tests that exercise the full
//! pipeline over realistic captures:
//! - per-message decoding (classification, UDS/KWP2000/OBD-II)
//! - stream analyses (security access, negative-response resolution)
//! - knowledge overlay
//!
//! # Test Structure
//!
//! - `decode_pipeline_test.rs` - mixed-protocol capture decoding
//! - `security_flow_test.rs` - handshake timelines and 0x7F cause
//!   recovery over multi-ECU captures

// This crate only contains tests, no library code
