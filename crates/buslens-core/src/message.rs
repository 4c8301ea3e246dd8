//! Capture message model
//!
//! `RawMessage` is the validated form of one captured frame. The
//! validating constructor replaces the loose, optionally-populated
//! capture rows the surrounding application works with: downstream
//! decoders never re-check anything beyond "payload too short".

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::hex;

/// Diagnostic protocol interpretation for a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DiagnosticProtocol {
    /// SAE J1979 / ISO 15031 emissions diagnostics (modes 0x01-0x0A)
    #[serde(rename = "OBD-II")]
    Obd2,
    /// ISO 14229 Unified Diagnostic Services
    Uds,
    /// ISO 14230 Keyword Protocol 2000
    Kwp2000,
}

impl std::fmt::Display for DiagnosticProtocol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            DiagnosticProtocol::Obd2 => "OBD-II",
            DiagnosticProtocol::Uds => "UDS",
            DiagnosticProtocol::Kwp2000 => "KWP2000",
        };
        f.write_str(s)
    }
}

/// One captured frame, normalized and validated
///
/// Ordering of a capture is the order messages were recorded in; the
/// stream analyzers iterate exactly that sequence. Timestamps are
/// opaque strings - their format varies by capture source and is not
/// guaranteed globally sortable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawMessage {
    /// Capture timestamp, protocol-specific format (opaque)
    pub timestamp: String,
    /// Transport the frame was captured on (e.g. "DoIP", "ISO14230")
    pub transport: String,
    /// Sender address, upper-hex
    pub source_addr: String,
    /// Receiver address, upper-hex
    pub target_addr: String,
    /// Tester-to-ECU direction flag
    pub is_request: bool,
    /// Normalized payload: upper-hex, no prefix, no whitespace
    pub payload_hex: String,
}

impl RawMessage {
    /// Validating ingestion constructor.
    ///
    /// Normalizes the payload (strips `0x`/`0X`, drops whitespace,
    /// upper-cases) and rejects non-hex or odd-length payloads.
    /// Addresses are upper-cased with any `0x` prefix stripped.
    pub fn from_capture(
        timestamp: impl Into<String>,
        transport: impl Into<String>,
        source_addr: &str,
        target_addr: &str,
        is_request: bool,
        payload: &str,
    ) -> CoreResult<Self> {
        let payload_hex = hex::normalize(payload);
        if !payload_hex.is_empty() && !hex::is_hex(&payload_hex) {
            return Err(CoreError::InvalidPayload(payload_hex));
        }
        if payload_hex.len() % 2 != 0 {
            return Err(CoreError::OddLengthPayload(payload_hex.len()));
        }

        Ok(Self {
            timestamp: timestamp.into(),
            transport: transport.into(),
            source_addr: hex::normalize(source_addr),
            target_addr: hex::normalize(target_addr),
            is_request,
            payload_hex,
        })
    }

    /// Payload as bytes.
    pub fn payload_bytes(&self) -> Vec<u8> {
        hex::to_bytes(&self.payload_hex)
    }

    /// First payload byte (the service ID), if present.
    pub fn service_byte(&self) -> Option<u8> {
        u8::from_str_radix(self.payload_hex.get(0..2)?, 16).ok()
    }
}

/// Structured decoding of one message
///
/// A pure projection of `(RawMessage, protocol hint)`: safe to cache by
/// `(payload_hex, is_request, protocol)` and never mutated after
/// creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DecodedMessage {
    /// Service ID as two upper-hex digits
    pub service_id: String,
    /// Resolved service name, or `Service 0x<id>` when unknown
    pub service_name: String,
    /// Sub-function as two upper-hex digits, where the service has one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub_function: Option<String>,
    /// Human-readable description, possibly multi-line
    pub description: String,
    /// Protocol-specific key/value details (`did`, `routine_id`, `nrc`, ...)
    pub details: BTreeMap<String, String>,
}

impl DecodedMessage {
    /// Start a decoded message for a service with no decoded payload yet.
    pub fn new(service_id: u8, service_name: impl Into<String>) -> Self {
        Self {
            service_id: format!("{service_id:02X}"),
            service_name: service_name.into(),
            sub_function: None,
            description: String::new(),
            details: BTreeMap::new(),
        }
    }

}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_from_capture_normalizes() {
        let msg = RawMessage::from_capture(
            "12:00:01.100",
            "DoIP",
            "0x0e80",
            "1726",
            true,
            "0x22 f1 90",
        )
        .unwrap();
        assert_eq!(msg.payload_hex, "22F190");
        assert_eq!(msg.source_addr, "0E80");
        assert_eq!(msg.target_addr, "1726");
        assert_eq!(msg.service_byte(), Some(0x22));
        assert_eq!(msg.payload_bytes(), vec![0x22, 0xF1, 0x90]);
    }

    #[test]
    fn test_from_capture_rejects_bad_hex() {
        assert!(RawMessage::from_capture("t", "DoIP", "1", "2", true, "22G1").is_err());
        assert!(RawMessage::from_capture("t", "DoIP", "1", "2", true, "22F").is_err());
    }

    #[test]
    fn test_empty_payload_is_valid() {
        let msg = RawMessage::from_capture("t", "EOBD", "7E0", "7DF", false, "").unwrap();
        assert_eq!(msg.payload_hex, "");
        assert_eq!(msg.service_byte(), None);
    }
}
