//! Stream analyses over multi-ECU captures: security-access timelines
//! and negative-response cause recovery

use buslens_core::{KnowledgeKind, KnowledgeStore, RawMessage, SecurityEventKind};
use buslens_decode::{
    decode_message, events_by_ecu, resolve_rejected_target, security_events, RequestIndex,
};
use pretty_assertions::assert_eq;

fn request(ts: &str, target: &str, payload: &str) -> RawMessage {
    RawMessage::from_capture(ts, "DoIP", "0E80", target, true, payload).unwrap()
}

fn response(ts: &str, source: &str, payload: &str) -> RawMessage {
    RawMessage::from_capture(ts, "DoIP", source, "0E80", false, payload).unwrap()
}

/// Two ECUs: 1726 completes a level-3 unlock after one invalid key;
/// 17FC gets locked out on level 1.
fn capture() -> Vec<RawMessage> {
    vec![
        request("10:00:00.000", "1726", "2705"),
        response("10:00:00.040", "1726", "6705DEADBEEF"),
        request("10:00:00.080", "1726", "2706FFFFFFFF"),
        response("10:00:00.120", "1726", "7F2735"),
        request("10:00:00.500", "1726", "2705"),
        response("10:00:00.540", "1726", "6705CAFEBABE"),
        request("10:00:00.580", "1726", "270611223344"),
        response("10:00:00.620", "1726", "6706"),
        request("10:00:01.000", "17FC", "2701"),
        response("10:00:01.040", "17FC", "7F2736"),
    ]
}

#[test]
fn test_timeline_across_ecus() {
    let events = security_events(&capture());
    assert_eq!(events.len(), 10);

    let by_ecu = events_by_ecu(&events);
    assert_eq!(by_ecu.len(), 2);

    let bcm = &by_ecu["1726"];
    assert_eq!(bcm.len(), 8);
    assert_eq!(bcm[0].kind, SecurityEventKind::SeedRequest);
    assert_eq!(bcm[0].level, 3);
    assert_eq!(bcm[3].kind, SecurityEventKind::Rejected);
    assert_eq!(bcm[3].payload.as_deref(), Some("Invalid Key"));
    assert_eq!(bcm[5].payload.as_deref(), Some("CAFEBABE"));
    assert_eq!(bcm[7].kind, SecurityEventKind::KeyAccepted);
    // Key accepted 80ms after the second seed response
    assert_eq!(bcm[7].elapsed_ms, Some(80));

    let gateway = &by_ecu["17FC"];
    assert_eq!(gateway[1].kind, SecurityEventKind::Rejected);
    assert_eq!(gateway[1].payload.as_deref(), Some("Exceeded Number Of Attempts"));
}

#[test]
fn test_rejected_description_matches_timeline() {
    let messages = capture();
    let decoded = decode_message(&messages[3], None);
    assert!(decoded.description.starts_with("Negative Response"));
    assert!(decoded.description.contains("Security Access"));
    assert!(decoded.description.contains("Invalid Key"));
    assert_eq!(decoded.details["rejected_service"], "27");
    assert_eq!(decoded.details["nrc"], "35");
}

#[test]
fn test_negative_resolution_with_knowledge() {
    let mut store = KnowledgeStore::new();
    store.insert(KnowledgeKind::Did, "F190", "VIN");
    store.insert(KnowledgeKind::Routine, "0203", "Injector quantity test");

    let messages = vec![
        request("11:00:00.000", "1726", "22F190"),
        response("11:00:00.040", "1726", "7F2233"),
        request("11:00:01.000", "1726", "310102030A"),
        response("11:00:01.040", "1726", "7F3172"),
    ];
    let index = RequestIndex::build(&messages);

    let did = resolve_rejected_target(&messages, &index, 1, &store).unwrap();
    assert_eq!(did.identifier, "F190");
    assert_eq!(did.name.as_deref(), Some("VIN"));

    // Routine ID sits past the sub-function byte
    let routine = resolve_rejected_target(&messages, &index, 3, &store).unwrap();
    assert_eq!(routine.identifier, "0203");
    assert_eq!(routine.kind, KnowledgeKind::Routine);
    assert_eq!(routine.name.as_deref(), Some("Injector quantity test"));
}

#[test]
fn test_negative_details_complete_without_resolution() {
    // No prior request anywhere: details still carry service and NRC
    let messages = vec![response("11:00:00.000", "1726", "7F2E31")];
    let index = RequestIndex::build(&messages);
    assert!(resolve_rejected_target(&messages, &index, 0, &KnowledgeStore::new()).is_none());

    let decoded = decode_message(&messages[0], None);
    assert_eq!(decoded.details["rejected_service"], "2E");
    assert_eq!(decoded.details["nrc"], "31");
    assert!(decoded.description.contains("Request Out Of Range"));
}

#[test]
fn test_resolution_scoped_to_responding_ecu() {
    let messages = vec![
        request("12:00:00.000", "1726", "22F190"),
        request("12:00:00.010", "17FC", "22F18C"),
        response("12:00:00.050", "1726", "7F2231"),
    ];
    let index = RequestIndex::build(&messages);
    let target = resolve_rejected_target(&messages, &index, 2, &KnowledgeStore::new()).unwrap();
    // 1726 rejected its own request, not 17FC's later one
    assert_eq!(target.identifier, "F190");
    assert_eq!(target.request_position, 0);
}
