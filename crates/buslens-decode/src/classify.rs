//! Protocol selection and per-message decode entry point
//!
//! A capture mixes OBD-II, UDS and KWP2000 traffic. Interpretation is
//! chosen per message from the service-ID range and the transport the
//! frame arrived on; an explicit protocol hint from the caller wins
//! over both.

use buslens_core::{DecodedMessage, DiagnosticProtocol, RawMessage};
use tracing::trace;

use crate::{obd, uds};

/// Transport string that marks KWP2000 traffic.
const KWP_TRANSPORT: &str = "ISO14230";

/// Select the diagnostic protocol for a message.
///
/// OBD-II claims modes 0x01-0x0A and their responses 0x41-0x4A;
/// everything else is UDS, or KWP2000 on an ISO 14230 transport.
pub fn select_protocol(service_id: u8, transport: &str) -> DiagnosticProtocol {
    if matches!(service_id, 0x01..=0x0A | 0x41..=0x4A) {
        DiagnosticProtocol::Obd2
    } else if transport == KWP_TRANSPORT {
        DiagnosticProtocol::Kwp2000
    } else {
        DiagnosticProtocol::Uds
    }
}

/// Resolve a service ID to a name through the fallback chain:
/// OBD-II table, UDS table, KWP2000 table, synthesized label.
pub fn service_name(service_id: u8) -> String {
    obd::service_name(service_id)
        .or_else(|| uds::service_name(service_id))
        .or_else(|| uds::kwp_service_name(service_id))
        .unwrap_or_else(|| format!("Service 0x{service_id:02X}"))
}

/// Decode one message.
///
/// Pure: the result is a function of the message and the hint alone,
/// and is safe to cache by `(payload_hex, is_request, protocol)`.
pub fn decode_message(msg: &RawMessage, hint: Option<DiagnosticProtocol>) -> DecodedMessage {
    let protocol = match (hint, msg.service_byte()) {
        (Some(p), _) => p,
        (None, Some(sid)) => select_protocol(sid, &msg.transport),
        (None, None) => DiagnosticProtocol::Uds,
    };
    trace!(%protocol, payload = %msg.payload_hex, "decoding message");

    let mut decoded = match protocol {
        DiagnosticProtocol::Obd2 => obd::decode_service(msg),
        DiagnosticProtocol::Uds | DiagnosticProtocol::Kwp2000 => {
            uds::decode_service(msg, protocol)
        }
    };

    // Too-short or unsupported payloads leave the description empty;
    // fall back to the resolved service name.
    if decoded.description.is_empty() {
        decoded.description = decoded.service_name.clone();
    }

    decoded
}
