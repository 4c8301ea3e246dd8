//! Security-access (0x27) handshake reconstruction
//!
//! A single forward pass over the ordered capture emits a timeline of
//! seed/key/accept/reject events per ECU and security level. The
//! sub-function parity carries the semantics: odd requests a seed for
//! level `(sub+1)/2`, even sends the key for level `sub/2`.

use std::collections::{BTreeMap, HashMap};

use buslens_core::{time, RawMessage, SecurityEvent, SecurityEventKind};
use tracing::trace;

use crate::uds::{service_id, NegativeResponseCode};

/// Fold an ordered capture into its security-access timeline.
pub fn security_events(messages: &[RawMessage]) -> Vec<SecurityEvent> {
    let mut events = Vec::new();
    // Last seed-response timestamp per (ecu, level), for latency
    // annotation of the key that follows
    let mut seed_seen: HashMap<(String, u8), String> = HashMap::new();

    for msg in messages {
        let bytes = msg.payload_bytes();
        if bytes.len() < 2 {
            continue;
        }
        let sid = bytes[0];

        // Rejected attempts surface as 0x7F on service 0x27
        if !msg.is_request && sid == service_id::NEGATIVE_RESPONSE {
            if bytes[1] == service_id::SECURITY_ACCESS {
                let reason = bytes
                    .get(2)
                    .map(|&code| NegativeResponseCode::from(code).text());
                events.push(SecurityEvent {
                    timestamp: msg.timestamp.clone(),
                    ecu_address: msg.source_addr.clone(),
                    level: 0,
                    kind: SecurityEventKind::Rejected,
                    payload: reason,
                    elapsed_ms: None,
                });
            }
            continue;
        }

        let security = (msg.is_request && sid == service_id::SECURITY_ACCESS)
            || (!msg.is_request && sid == service_id::SECURITY_ACCESS + service_id::RESPONSE_OFFSET);
        if !security {
            continue;
        }

        let sub = bytes[1];
        let seed = sub % 2 == 1;
        let level = if seed { (sub + 1) / 2 } else { sub / 2 };
        let kind = match (msg.is_request, seed) {
            (true, true) => SecurityEventKind::SeedRequest,
            (false, true) => SecurityEventKind::SeedResponse,
            (true, false) => SecurityEventKind::KeySend,
            (false, false) => SecurityEventKind::KeyAccepted,
        };

        let ecu = if msg.is_request {
            msg.target_addr.clone()
        } else {
            msg.source_addr.clone()
        };

        // Seed bytes on the response, key bytes on the send
        let fragment = match kind {
            SecurityEventKind::SeedResponse | SecurityEventKind::KeySend if bytes.len() > 2 => {
                Some(hex::encode_upper(&bytes[2..]))
            }
            _ => None,
        };

        let elapsed_ms = match kind {
            SecurityEventKind::KeySend | SecurityEventKind::KeyAccepted => seed_seen
                .get(&(ecu.clone(), level))
                .and_then(|seed_ts| time::elapsed_ms(seed_ts, &msg.timestamp)),
            _ => None,
        };
        if kind == SecurityEventKind::SeedResponse {
            seed_seen.insert((ecu.clone(), level), msg.timestamp.clone());
        }

        trace!(%ecu, level, ?kind, "security access event");
        events.push(SecurityEvent {
            timestamp: msg.timestamp.clone(),
            ecu_address: ecu,
            level,
            kind,
            payload: fragment,
            elapsed_ms,
        });
    }

    events
}

/// Partition a timeline by ECU address, preserving order within each
/// partition.
pub fn events_by_ecu(events: &[SecurityEvent]) -> BTreeMap<String, Vec<SecurityEvent>> {
    let mut by_ecu: BTreeMap<String, Vec<SecurityEvent>> = BTreeMap::new();
    for event in events {
        by_ecu
            .entry(event.ecu_address.clone())
            .or_default()
            .push(event.clone());
    }
    by_ecu
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn request(ts: &str, target: &str, payload: &str) -> RawMessage {
        RawMessage::from_capture(ts, "DoIP", "0E80", target, true, payload).unwrap()
    }

    fn response(ts: &str, source: &str, payload: &str) -> RawMessage {
        RawMessage::from_capture(ts, "DoIP", source, "0E80", false, payload).unwrap()
    }

    fn handshake() -> Vec<RawMessage> {
        vec![
            request("12:00:00.000", "1726", "2705"),
            response("12:00:00.050", "1726", "6705AABBCCDD"),
            request("12:00:00.100", "1726", "270611223344"),
            response("12:00:00.150", "1726", "6706"),
        ]
    }

    #[test]
    fn test_successful_handshake_timeline() {
        let events = security_events(&handshake());
        assert_eq!(events.len(), 4);

        assert_eq!(events[0].kind, SecurityEventKind::SeedRequest);
        assert_eq!(events[0].level, 3);
        assert_eq!(events[0].ecu_address, "1726");

        assert_eq!(events[1].kind, SecurityEventKind::SeedResponse);
        assert_eq!(events[1].payload.as_deref(), Some("AABBCCDD"));

        assert_eq!(events[2].kind, SecurityEventKind::KeySend);
        assert_eq!(events[2].payload.as_deref(), Some("11223344"));
        assert_eq!(events[2].elapsed_ms, Some(50));

        assert_eq!(events[3].kind, SecurityEventKind::KeyAccepted);
        assert_eq!(events[3].level, 3);
        assert_eq!(events[3].elapsed_ms, Some(100));
    }

    #[test]
    fn test_rejected_attempt() {
        let messages = vec![
            request("12:00:00.000", "1726", "270611223344"),
            response("12:00:00.050", "1726", "7F2735"),
        ];
        let events = security_events(&messages);
        assert_eq!(events.len(), 2);
        assert_eq!(events[1].kind, SecurityEventKind::Rejected);
        assert_eq!(events[1].payload.as_deref(), Some("Invalid Key"));
        assert_eq!(events[1].ecu_address, "1726");
    }

    #[test]
    fn test_non_security_traffic_ignored() {
        let messages = vec![
            request("12:00:00.000", "1726", "22F190"),
            response("12:00:00.050", "1726", "62F1901234"),
            response("12:00:00.060", "1726", "7F2231"),
        ];
        assert!(security_events(&messages).is_empty());
    }

    #[test]
    fn test_unparseable_timestamps_skip_latency() {
        let messages = vec![
            response("N/A", "1726", "6705AABB"),
            request("N/A", "1726", "27061122"),
        ];
        let events = security_events(&messages);
        assert_eq!(events[1].kind, SecurityEventKind::KeySend);
        assert_eq!(events[1].elapsed_ms, None);
    }

    #[test]
    fn test_events_by_ecu_preserves_order() {
        let messages = vec![
            request("12:00:00.000", "1726", "2701"),
            request("12:00:00.010", "17FC", "2703"),
            response("12:00:00.020", "1726", "6701AA"),
            response("12:00:00.030", "17FC", "6703BB"),
        ];
        let by_ecu = events_by_ecu(&security_events(&messages));
        assert_eq!(by_ecu.len(), 2);
        assert_eq!(by_ecu["1726"].len(), 2);
        assert_eq!(by_ecu["1726"][0].kind, SecurityEventKind::SeedRequest);
        assert_eq!(by_ecu["1726"][1].kind, SecurityEventKind::SeedResponse);
        assert_eq!(by_ecu["17FC"][0].level, 2);
    }

    #[test]
    fn test_short_payload_ignored() {
        let messages = vec![request("12:00:00.000", "1726", "27")];
        assert!(security_events(&messages).is_empty());
    }
}
