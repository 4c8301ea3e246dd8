//! buslens-core - Core types for the buslens decoding engine
//!
//! This crate provides the data model shared by the decoders and stream
//! analyzers: the validated capture message, the decoded output types,
//! and the read-only knowledge store used to overlay human-readable
//! names onto decoded identifiers.
//!
//! Raw capture rows enter the engine exactly once, through
//! [`RawMessage::from_capture`], which normalizes and validates the hex
//! payload. Everything downstream of that boundary is total: decoders
//! degrade to empty or generic output on truncated data instead of
//! returning errors.

pub mod error;
pub mod event;
pub mod hex;
pub mod knowledge;
pub mod message;
pub mod time;

pub use error::{CoreError, CoreResult};
pub use event::{SecurityEvent, SecurityEventKind};
pub use knowledge::{KnowledgeKind, KnowledgeStore, StoreMeta};
pub use message::{DecodedMessage, DiagnosticProtocol, RawMessage};
