//! Per-service UDS/KWP2000 payload decoding
//!
//! One pure function per service, dispatched on the first payload byte.
//! Every sub-decoder guards its minimum length and fails soft: a
//! truncated payload produces an empty description and whatever details
//! could be extracted, and the caller falls back to the service name.

use buslens_core::{DecodedMessage, DiagnosticProtocol, RawMessage};
use tracing::debug;

use super::{
    dtc_sub_function, kwp_service_name, nrc::NegativeResponseCode, reset_type,
    routine_sub_function, service_id, service_name, session_type,
};
use crate::dtc::Dtc;

/// Decode a UDS or KWP2000 message into its structured form.
///
/// `protocol` selects the preferred name table; the byte-level service
/// layouts are shared between the two protocols.
pub fn decode_service(msg: &RawMessage, protocol: DiagnosticProtocol) -> DecodedMessage {
    let bytes = msg.payload_bytes();
    let kwp = protocol == DiagnosticProtocol::Kwp2000;

    let Some(&sid) = bytes.first() else {
        return DecodedMessage {
            service_id: String::new(),
            service_name: String::new(),
            sub_function: None,
            description: String::new(),
            details: Default::default(),
        };
    };

    let mut decoded = DecodedMessage::new(sid, display_name(sid, kwp));

    // Dispatch on the request-side service ID so each arm handles its
    // request and positive-response layout together. 0x60 and 0x7F are
    // service IDs in their own right, not response offsets.
    let base = if (0x40..0x81).contains(&sid)
        && sid != service_id::NEGATIVE_RESPONSE
        && sid != service_id::MANUFACTURER_SPECIFIC
    {
        sid - service_id::RESPONSE_OFFSET
    } else {
        sid
    };
    let is_response = base != sid || !msg.is_request;

    match base {
        service_id::DIAGNOSTIC_SESSION_CONTROL => decode_session_control(&bytes, &mut decoded),
        service_id::ECU_RESET => decode_ecu_reset(&bytes, is_response, &mut decoded),
        service_id::CLEAR_DIAGNOSTIC_INFO => decode_clear_diagnostics(&bytes, &mut decoded),
        service_id::READ_DTC_INFO => decode_read_dtc_info(&bytes, is_response, &mut decoded),
        service_id::READ_DATA_BY_ID => decode_data_by_id(&bytes, is_response, "Read", &mut decoded),
        service_id::SECURITY_ACCESS => decode_security_access(&bytes, msg.is_request, &mut decoded),
        service_id::WRITE_DATA_BY_ID => {
            decode_data_by_id(&bytes, is_response, "Write", &mut decoded)
        }
        service_id::ROUTINE_CONTROL => decode_routine_control(&bytes, &mut decoded),
        service_id::TESTER_PRESENT => decode_tester_present(&bytes, is_response, &mut decoded),
        service_id::NEGATIVE_RESPONSE => decode_negative_response(&bytes, &mut decoded),
        service_id::MANUFACTURER_SPECIFIC => decode_manufacturer_specific(&bytes, &mut decoded),
        other => {
            // No payload decoder: the resolved name (or the
            // synthesized `Service 0x<id>` label) is the description
            debug!(service_id = %format!("{other:02X}"), "service not in dispatch table");
            decoded.description = decoded.service_name.clone();
        }
    }

    decoded
}

/// Preferred-table name resolution: the KWP2000 table first on an ISO
/// 14230 capture, the UDS table first otherwise, then the synthesized
/// `Service 0x<id>` label.
pub(crate) fn display_name(sid: u8, kwp: bool) -> String {
    let resolved = if kwp {
        kwp_service_name(sid).or_else(|| service_name(sid))
    } else {
        service_name(sid).or_else(|| kwp_service_name(sid))
    };
    resolved.unwrap_or_else(|| format!("Service 0x{sid:02X}"))
}

fn hex_upper(bytes: &[u8]) -> String {
    hex::encode_upper(bytes)
}

fn decode_session_control(bytes: &[u8], out: &mut DecodedMessage) {
    let Some(&sub) = bytes.get(1) else {
        return;
    };
    out.sub_function = Some(format!("{sub:02X}"));

    let session = session_type::name(sub)
        .map(str::to_string)
        .unwrap_or_else(|| format!("Session Type 0x{sub:02X}"));
    out.description = format!("{}: {}", out.service_name, session);
    out.details.insert("session_type".to_string(), session);
}

fn decode_ecu_reset(bytes: &[u8], is_response: bool, out: &mut DecodedMessage) {
    let Some(&sub) = bytes.get(1) else {
        return;
    };
    out.sub_function = Some(format!("{sub:02X}"));

    let reset = reset_type::name(sub)
        .map(str::to_string)
        .unwrap_or_else(|| format!("Reset Type 0x{sub:02X}"));
    out.description = format!("{}: {}", out.service_name, reset);

    // Positive responses may carry a power-down time byte
    if is_response {
        if let Some(&seconds) = bytes.get(2) {
            if seconds != 0xFF {
                out.description.push_str(&format!("\nPower down time: {seconds}s"));
            }
        }
    }
    out.details.insert("reset_type".to_string(), reset);
}

fn decode_clear_diagnostics(bytes: &[u8], out: &mut DecodedMessage) {
    use crate::dtc::dtc_group;

    if bytes.len() < 4 {
        // Positive response 0x54 carries no group echo
        out.description = out.service_name.clone();
        return;
    }

    let group = ((bytes[1] as u32) << 16) | ((bytes[2] as u32) << 8) | bytes[3] as u32;
    let label = match group {
        dtc_group::ALL => "All Groups".to_string(),
        dtc_group::POWERTRAIN => "Powertrain Group".to_string(),
        dtc_group::CHASSIS => "Chassis Group".to_string(),
        dtc_group::BODY => "Body Group".to_string(),
        dtc_group::NETWORK => "Network Group".to_string(),
        other => format!("Group 0x{other:06X}"),
    };
    out.description = format!("{}: {}", out.service_name, label);
    out.details.insert("group".to_string(), format!("{group:06X}"));
}

fn decode_read_dtc_info(bytes: &[u8], is_response: bool, out: &mut DecodedMessage) {
    let Some(&sub) = bytes.get(1) else {
        return;
    };
    out.sub_function = Some(format!("{sub:02X}"));

    let report = dtc_sub_function::name(sub)
        .map(str::to_string)
        .unwrap_or_else(|| format!("Sub-function 0x{sub:02X}"));
    out.description = format!("{}: {}", out.service_name, report);

    if !is_response {
        // Mask-based report requests carry the status mask byte
        let mask_based = matches!(
            sub,
            dtc_sub_function::REPORT_NUMBER_OF_DTC_BY_STATUS_MASK
                | dtc_sub_function::REPORT_DTC_BY_STATUS_MASK
        );
        if mask_based {
            if let Some(&mask) = bytes.get(2) {
                out.description.push_str(&format!(" (mask 0x{mask:02X})"));
            }
        }
        return;
    }

    // reportDTCByStatusMask response: availability mask + packed
    // (3-byte DTC + 1-byte status) records
    if sub == dtc_sub_function::REPORT_DTC_BY_STATUS_MASK && bytes.len() >= 3 {
        out.description
            .push_str(&format!("\nStatus availability: 0x{:02X}", bytes[2]));

        let mut count = 0usize;
        for chunk in bytes[3..].chunks_exact(4) {
            let dtc = Dtc::new(chunk[0], chunk[1], chunk[2], chunk[3]);
            let flags = dtc.status.set_flags().join(", ");
            match dtc.description() {
                Some(text) => out
                    .description
                    .push_str(&format!("\n{} ({text}) [{flags}]", dtc.code())),
                None => out.description.push_str(&format!("\n{} [{flags}]", dtc.code())),
            }
            count += 1;
        }
        out.details.insert("dtc_count".to_string(), count.to_string());
    }
}

fn decode_data_by_id(bytes: &[u8], is_response: bool, verb: &str, out: &mut DecodedMessage) {
    if bytes.len() < 3 {
        return;
    }

    let did = format!("{:02X}{:02X}", bytes[1], bytes[2]);
    out.details.insert("did".to_string(), did.clone());

    let value = &bytes[3..];
    if !value.is_empty() {
        out.details.insert("value".to_string(), hex_upper(value));
    }

    out.description = match (is_response, value.is_empty()) {
        (false, true) => format!("{verb} DID 0x{did}"),
        // WriteDataByIdentifier requests carry the value to write
        (false, false) => format!("{verb} DID 0x{did}: {}", hex_upper(value)),
        (true, true) => format!("{verb} DID 0x{did} Response"),
        (true, false) => format!("{verb} DID 0x{did}: {}", hex_upper(value)),
    };
}

fn decode_security_access(bytes: &[u8], is_request: bool, out: &mut DecodedMessage) {
    let Some(&sub) = bytes.get(1) else {
        return;
    };
    out.sub_function = Some(format!("{sub:02X}"));

    let seed = sub % 2 == 1;
    let level = if seed { (sub + 1) / 2 } else { sub / 2 };
    let action = match (is_request, seed) {
        (true, true) => "Request Seed",
        (false, true) => "Seed Response",
        (true, false) => "Send Key",
        (false, false) => "Key Accepted",
    };

    out.description = format!("{}: {action} (level {level})", out.service_name);
    let fragment = &bytes[2..];
    if !fragment.is_empty() {
        out.details.insert("value".to_string(), hex_upper(fragment));
    }
    out.details
        .insert("type".to_string(), if seed { "seed" } else { "key" }.to_string());
    out.details.insert("level".to_string(), level.to_string());
}

fn decode_routine_control(bytes: &[u8], out: &mut DecodedMessage) {
    let Some(&sub) = bytes.get(1) else {
        return;
    };
    out.sub_function = Some(format!("{sub:02X}"));

    if bytes.len() < 4 {
        return;
    }

    let routine_id = format!("{:02X}{:02X}", bytes[2], bytes[3]);
    let action = routine_sub_function::name(sub)
        .map(str::to_string)
        .unwrap_or_else(|| format!("Routine Control 0x{sub:02X}"));

    out.description = format!("{action} 0x{routine_id}");
    if let Some(&status) = bytes.get(4) {
        out.description.push_str(&format!("\nStatus: 0x{status:02X}"));
        out.details.insert("status".to_string(), format!("{status:02X}"));
    }
    out.details.insert("routine_id".to_string(), routine_id);
}

fn decode_tester_present(bytes: &[u8], is_response: bool, out: &mut DecodedMessage) {
    let sub = bytes.get(1).copied();
    if let Some(sub) = sub {
        out.sub_function = Some(format!("{sub:02X}"));
    }

    out.description = match (is_response, sub) {
        (false, Some(0x80)) => "Tester Present (suppress response)".to_string(),
        (false, _) => "Tester Present".to_string(),
        (true, _) => "Tester Present Response".to_string(),
    };
}

fn decode_negative_response(bytes: &[u8], out: &mut DecodedMessage) {
    let Some(&rejected) = bytes.get(1) else {
        return;
    };
    out.details
        .insert("rejected_service".to_string(), format!("{rejected:02X}"));

    let rejected_name = crate::classify::service_name(rejected);
    let Some(&code) = bytes.get(2) else {
        out.description = format!("Negative Response: {rejected_name}");
        return;
    };

    let nrc = NegativeResponseCode::from(code);
    out.description = format!("Negative Response: {rejected_name} - {}", nrc.text());
    out.details.insert("nrc".to_string(), format!("{code:02X}"));
}

fn decode_manufacturer_specific(bytes: &[u8], out: &mut DecodedMessage) {
    out.description = "Manufacturer Specific Service".to_string();
    if bytes.len() > 1 {
        out.details.insert("value".to_string(), hex_upper(&bytes[1..]));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use buslens_core::RawMessage;
    use pretty_assertions::assert_eq;

    fn request(payload: &str) -> RawMessage {
        RawMessage::from_capture("12:00:00.000", "DoIP", "0E80", "1726", true, payload).unwrap()
    }

    fn response(payload: &str) -> RawMessage {
        RawMessage::from_capture("12:00:00.100", "DoIP", "1726", "0E80", false, payload).unwrap()
    }

    fn decode(msg: &RawMessage) -> DecodedMessage {
        decode_service(msg, DiagnosticProtocol::Uds)
    }

    #[test]
    fn test_read_did_request() {
        let decoded = decode(&request("22F190"));
        assert_eq!(decoded.service_id, "22");
        assert_eq!(decoded.description, "Read DID 0xF190");
        assert_eq!(decoded.details["did"], "F190");
    }

    #[test]
    fn test_read_did_response_with_value() {
        let decoded = decode(&response("62F1901234"));
        assert!(decoded.description.contains("DID 0xF190"));
        assert_eq!(decoded.details["value"], "1234");
        assert_eq!(decoded.service_name, "Read Data By Identifier Response");
    }

    #[test]
    fn test_write_did_request() {
        let decoded = decode(&request("2EF1903132"));
        assert_eq!(decoded.description, "Write DID 0xF190: 3132");
        assert_eq!(decoded.details["did"], "F190");
        assert_eq!(decoded.details["value"], "3132");
    }

    #[test]
    fn test_security_access_seed_request() {
        let decoded = decode(&request("2705"));
        assert_eq!(decoded.details["type"], "seed");
        assert_eq!(decoded.details["level"], "3");
        assert_eq!(decoded.description, "Security Access: Request Seed (level 3)");
    }

    #[test]
    fn test_security_access_key_flow() {
        let seed = decode(&response("6705AABBCCDD"));
        assert_eq!(seed.details["type"], "seed");
        assert_eq!(seed.details["value"], "AABBCCDD");

        let key = decode(&request("270611223344"));
        assert_eq!(key.details["type"], "key");
        assert_eq!(key.details["level"], "3");
        assert_eq!(key.description, "Security Access: Send Key (level 3)");
    }

    #[test]
    fn test_negative_response_security_access() {
        let decoded = decode(&response("7F2735"));
        assert!(decoded.description.starts_with("Negative Response"));
        assert!(decoded.description.contains("Security Access"));
        assert!(decoded.description.contains("Invalid Key"));
        assert_eq!(decoded.details["rejected_service"], "27");
        assert_eq!(decoded.details["nrc"], "35");
    }

    #[test]
    fn test_negative_response_unknown_nrc() {
        let decoded = decode(&response("7F224B"));
        assert!(decoded.description.contains("NRC 0x4B"));
        assert_eq!(decoded.details["rejected_service"], "22");
        assert_eq!(decoded.details["nrc"], "4B");
    }

    #[test]
    fn test_session_control() {
        let decoded = decode(&request("1003"));
        assert_eq!(decoded.sub_function.as_deref(), Some("03"));
        assert_eq!(
            decoded.description,
            "Diagnostic Session Control: Extended Diagnostic Session"
        );

        let kwp = decode_service(
            &request("1081"),
            DiagnosticProtocol::Kwp2000,
        );
        assert_eq!(
            kwp.description,
            "Start Diagnostic Session: Standard Session (KWP2000)"
        );

        let unknown = decode(&request("10C7"));
        assert!(unknown.description.contains("Session Type 0xC7"));
    }

    #[test]
    fn test_ecu_reset() {
        let decoded = decode(&request("1101"));
        assert_eq!(decoded.description, "ECU Reset: Hard Reset");
        assert_eq!(decoded.details["reset_type"], "Hard Reset");
    }

    #[test]
    fn test_routine_control_with_status() {
        let decoded = decode(&response("7101020300"));
        assert_eq!(decoded.description, "Start Routine 0x0203\nStatus: 0x00");
        assert_eq!(decoded.details["routine_id"], "0203");
        assert_eq!(decoded.details["status"], "00");
    }

    #[test]
    fn test_read_dtc_info_response_with_records() {
        // 0x59 0x02, mask 0xFF, P0133 active, U0123 pending
        let decoded = decode(&response("5902FF01330009C1230004"));
        assert!(decoded.description.contains("Report DTC By Status Mask"));
        assert!(decoded.description.contains("Status availability: 0xFF"));
        assert!(decoded.description.contains("P0133"));
        assert!(decoded.description.contains("O2 Sensor Circuit Slow Response"));
        assert!(decoded.description.contains("TestFailed, Confirmed"));
        assert!(decoded.description.contains("U0123 [Pending]"));
        assert_eq!(decoded.details["dtc_count"], "2");
    }

    #[test]
    fn test_tester_present_suppress() {
        let decoded = decode(&request("3E80"));
        assert_eq!(decoded.description, "Tester Present (suppress response)");
        let plain = decode(&request("3E00"));
        assert_eq!(plain.description, "Tester Present");
    }

    #[test]
    fn test_clear_diagnostics_all_groups() {
        let decoded = decode(&request("14FFFFFF"));
        assert_eq!(
            decoded.description,
            "Clear Diagnostic Information: All Groups"
        );
        assert_eq!(decoded.details["group"], "FFFFFF");
    }

    #[test]
    fn test_manufacturer_specific() {
        let decoded = decode(&request("60A1B2"));
        assert_eq!(decoded.description, "Manufacturer Specific Service");
        assert_eq!(decoded.details["value"], "A1B2");
    }

    #[test]
    fn test_unknown_service() {
        let decoded = decode(&request("BB01"));
        assert_eq!(decoded.description, "Service 0xBB");
        assert_eq!(decoded.service_name, "Service 0xBB");
    }

    #[test]
    fn test_truncated_payload_fails_soft() {
        // Bare service byte: empty description, no details, no panic
        for payload in ["22", "27", "31", "19", "10", "7F"] {
            let decoded = decode(&request(payload));
            assert_eq!(decoded.description, "");
            assert!(decoded.details.is_empty());
        }
    }

    #[test]
    fn test_purity_same_input_same_output() {
        let msg = request("22F190");
        assert_eq!(decode(&msg), decode(&msg));
    }
}
