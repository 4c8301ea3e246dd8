//! buslens-decode - diagnostic message decoding engine
//!
//! Turns raw hexadecimal bus-capture payloads into structured,
//! human-readable diagnostic events for UDS (ISO 14229), KWP2000
//! (ISO 14230) and OBD-II (SAE J1979), and reconstructs session-level
//! behavior (security-access handshakes, negative-response causes) from
//! ordered message history.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                       decode_message                         │
//! │  Selects UDS / KWP2000 / OBD-II interpretation per message   │
//! │                                                              │
//! │        ┌──────────────┐        ┌──────────────┐              │
//! │        │ uds::decoder │        │ obd::decoder │              │
//! │        │ (ISO 14229/  │        │ (SAE J1979   │              │
//! │        │  ISO 14230)  │        │  modes)      │              │
//! │        └──────┬───────┘        └──────┬───────┘              │
//! │               └────────┬──────────────┘                      │
//! │                   ┌────┴────┐                                │
//! │                   │   dtc   │  (wire codecs, shared)         │
//! │                   └─────────┘                                │
//! └──────────────────────────────────────────────────────────────┘
//!
//!   Full ordered capture ──► analyze::security  (handshake timeline)
//!                        ──► analyze::negative  (0x7F cause lookup)
//! ```
//!
//! Per-message decoding is pure and stateless; the two analyzers are
//! batch passes whose only "memory" is the ordered message list they
//! are handed. All lookup tables are built once at process start.

pub mod analyze;
pub mod classify;
pub mod dtc;
pub mod isotp;
pub mod obd;
pub mod uds;

pub use analyze::negative::{resolve_rejected_target, RequestIndex, ResolvedTarget};
pub use analyze::security::{events_by_ecu, security_events};
pub use classify::{decode_message, select_protocol, service_name};
pub use dtc::{Dtc, DtcCategory, DtcStatus, ObdDtc};
pub use isotp::{classify_frame, FrameType, IsoTpFrame};
pub use uds::NegativeResponseCode;

// Re-export for convenience
pub use buslens_core::{
    DecodedMessage, DiagnosticProtocol, KnowledgeKind, KnowledgeStore, RawMessage, SecurityEvent,
    SecurityEventKind,
};
