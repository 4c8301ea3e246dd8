//! OBD-II (SAE J1979) mode decoding
//!
//! Emissions-related diagnostics use modes 0x01-0x0A, with responses
//! at mode + 0x40. Only the modes the dashboard renders get a full
//! payload decode; the rest resolve to their mode name and nothing
//! else.

pub mod pid;

use buslens_core::{DecodedMessage, RawMessage};

use crate::dtc;

/// SAE J1979 mode constants
pub mod mode {
    pub const CURRENT_DATA: u8 = 0x01;
    pub const FREEZE_FRAME_DATA: u8 = 0x02;
    pub const STORED_DTCS: u8 = 0x03;
    pub const CLEAR_DTCS: u8 = 0x04;
    pub const O2_MONITORING: u8 = 0x05;
    pub const TEST_RESULTS: u8 = 0x06;
    pub const PENDING_DTCS: u8 = 0x07;
    pub const CONTROL_OPERATION: u8 = 0x08;
    pub const VEHICLE_INFO: u8 = 0x09;
    pub const PERMANENT_DTCS: u8 = 0x0A;

    pub const RESPONSE_OFFSET: u8 = 0x40;
}

fn mode_name(base: u8) -> Option<&'static str> {
    match base {
        mode::CURRENT_DATA => Some("Show Current Data"),
        mode::FREEZE_FRAME_DATA => Some("Show Freeze Frame Data"),
        mode::STORED_DTCS => Some("Show Stored DTCs"),
        mode::CLEAR_DTCS => Some("Clear DTCs and Stored Values"),
        mode::O2_MONITORING => Some("O2 Sensor Monitoring Test Results"),
        mode::TEST_RESULTS => Some("On-Board Monitoring Test Results"),
        mode::PENDING_DTCS => Some("Show Pending DTCs"),
        mode::CONTROL_OPERATION => Some("Control On-Board System"),
        mode::VEHICLE_INFO => Some("Request Vehicle Information"),
        mode::PERMANENT_DTCS => Some("Show Permanent DTCs"),
        _ => None,
    }
}

/// Mode 09 info-type names
fn info_type_name(info: u8) -> Option<&'static str> {
    match info {
        0x00 => Some("Supported Info Types"),
        0x01 => Some("VIN Message Count"),
        0x02 => Some("VIN"),
        0x03 => Some("Calibration ID Message Count"),
        0x04 => Some("Calibration ID"),
        0x05 => Some("CVN Message Count"),
        0x06 => Some("Calibration Verification Numbers"),
        0x08 => Some("In-use Performance Tracking"),
        0x0A => Some("ECU Name"),
        _ => None,
    }
}

/// OBD-II service name for a mode byte, mapping responses back to
/// their request mode.
pub fn service_name(mode_byte: u8) -> Option<String> {
    if let Some(name) = mode_name(mode_byte) {
        return Some(name.to_string());
    }
    if mode_byte > mode::RESPONSE_OFFSET {
        if let Some(name) = mode_name(mode_byte - mode::RESPONSE_OFFSET) {
            return Some(format!("{name} Response"));
        }
    }
    None
}

/// Decode an OBD-II message into its structured form.
///
/// Unsupported modes leave the description empty; the classifier falls
/// back to the mode name.
pub fn decode_service(msg: &RawMessage) -> DecodedMessage {
    let bytes = msg.payload_bytes();

    let Some(&mode_byte) = bytes.first() else {
        return DecodedMessage {
            service_id: String::new(),
            service_name: String::new(),
            sub_function: None,
            description: String::new(),
            details: Default::default(),
        };
    };

    let name = service_name(mode_byte).unwrap_or_else(|| format!("Service 0x{mode_byte:02X}"));
    let mut decoded = DecodedMessage::new(mode_byte, name);

    let is_response = mode_byte > mode::RESPONSE_OFFSET;
    let base = if is_response {
        mode_byte - mode::RESPONSE_OFFSET
    } else {
        mode_byte
    };

    match base {
        mode::CURRENT_DATA | mode::FREEZE_FRAME_DATA => {
            decode_pid_payload(&bytes, is_response, &mut decoded)
        }
        mode::STORED_DTCS => decode_dtc_list(&bytes, is_response, "Stored", &mut decoded),
        mode::PENDING_DTCS => decode_dtc_list(&bytes, is_response, "Pending", &mut decoded),
        mode::PERMANENT_DTCS => decode_dtc_list(&bytes, is_response, "Permanent", &mut decoded),
        mode::CLEAR_DTCS => decoded.description = decoded.service_name.clone(),
        mode::VEHICLE_INFO => decode_vehicle_info(&bytes, is_response, &mut decoded),
        _ => {}
    }

    decoded
}

fn decode_pid_payload(bytes: &[u8], is_response: bool, out: &mut DecodedMessage) {
    if bytes.len() < 2 {
        return;
    }

    if is_response {
        // Response: one PID byte followed by its data bytes
        let pid = bytes[1];
        let label = pid::name(pid)
            .map(str::to_string)
            .unwrap_or_else(|| format!("PID 0x{pid:02X}"));
        out.details.insert("pid".to_string(), format!("{pid:02X}"));

        let data = &bytes[2..];
        if data.is_empty() {
            out.description = format!("PID 0x{pid:02X}: {label}");
        } else {
            out.description =
                format!("PID 0x{pid:02X}: {label} = {}", hex::encode_upper(data));
            out.details.insert("value".to_string(), hex::encode_upper(data));
        }
    } else {
        // Request: each following byte is a PID
        let lines: Vec<String> = bytes[1..]
            .iter()
            .map(|&pid| {
                let label = pid::name(pid)
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("PID 0x{pid:02X}"));
                format!("PID 0x{pid:02X}: {label}")
            })
            .collect();
        out.description = lines.join("\n");
        out.details.insert(
            "pid".to_string(),
            bytes[1..]
                .iter()
                .map(|&pid| format!("{pid:02X}"))
                .collect::<Vec<_>>()
                .join(","),
        );
    }
}

fn decode_dtc_list(bytes: &[u8], is_response: bool, kind: &str, out: &mut DecodedMessage) {
    if !is_response {
        out.description = out.service_name.clone();
        return;
    }
    if bytes.len() < 2 {
        return;
    }

    let count = bytes[1];
    out.details.insert("dtc_count".to_string(), count.to_string());

    if count == 0 {
        out.description = format!("No {} DTCs", kind.to_lowercase());
        return;
    }

    let mut lines = vec![format!("{kind} DTCs ({count}):")];
    for pair in bytes[2..].chunks_exact(2) {
        let wire = format!("{:02X}{:02X}", pair[0], pair[1]);
        let decoded = dtc::decode_obd(&wire);
        lines.push(format!("{} - {}", decoded.code, decoded.description));
    }
    out.description = lines.join("\n");
}

fn decode_vehicle_info(bytes: &[u8], is_response: bool, out: &mut DecodedMessage) {
    if bytes.len() < 2 {
        return;
    }

    let info = bytes[1];
    out.sub_function = Some(format!("{info:02X}"));
    let label = info_type_name(info)
        .map(str::to_string)
        .unwrap_or_else(|| format!("Info Type 0x{info:02X}"));

    if !is_response {
        out.description = format!("Vehicle Information: {label}");
        return;
    }

    // VIN responses interpret the data as ASCII after the message-count
    // byte
    if info == 0x02 && bytes.len() > 3 {
        let vin: String = bytes[3..]
            .iter()
            .filter(|&&b| b.is_ascii_graphic())
            .map(|&b| b as char)
            .collect();
        out.description = format!("Vehicle Information: VIN = {vin}");
        out.details.insert("vin".to_string(), vin);
        return;
    }

    out.description = format!("Vehicle Information: {label}");
    if bytes.len() > 2 {
        out.details
            .insert("value".to_string(), hex::encode_upper(&bytes[2..]));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn request(payload: &str) -> RawMessage {
        RawMessage::from_capture("10:00:00.000", "EOBD", "7DF", "7E0", true, payload).unwrap()
    }

    fn response(payload: &str) -> RawMessage {
        RawMessage::from_capture("10:00:00.050", "EOBD", "7E8", "7DF", false, payload).unwrap()
    }

    #[test]
    fn test_mode_01_request_pid_list() {
        let decoded = decode_service(&request("010C0D"));
        assert_eq!(decoded.service_name, "Show Current Data");
        assert_eq!(
            decoded.description,
            "PID 0x0C: Engine RPM\nPID 0x0D: Vehicle Speed"
        );
        assert_eq!(decoded.details["pid"], "0C,0D");
    }

    #[test]
    fn test_mode_01_response_with_value() {
        let decoded = decode_service(&response("410C1AF8"));
        assert_eq!(decoded.service_name, "Show Current Data Response");
        assert_eq!(decoded.description, "PID 0x0C: Engine RPM = 1AF8");
        assert_eq!(decoded.details["value"], "1AF8");
    }

    #[test]
    fn test_mode_03_response_dtc_list() {
        // Count 2: P0133, P0420
        let decoded = decode_service(&response("430201330420"));
        assert!(decoded.description.starts_with("Stored DTCs (2):"));
        assert!(decoded.description.contains("P0133 - O2 Sensor Circuit Slow Response"));
        assert!(decoded.description.contains("P0420 - Catalyst System Efficiency"));
        assert_eq!(decoded.details["dtc_count"], "2");
    }

    #[test]
    fn test_mode_03_response_empty() {
        let decoded = decode_service(&response("4300"));
        assert_eq!(decoded.description, "No stored DTCs");
    }

    #[test]
    fn test_mode_09_vin_response() {
        // 49 02 01 + "WVWZZZ" as ASCII
        let decoded = decode_service(&response("49020157565758585A"));
        assert!(decoded.description.starts_with("Vehicle Information: VIN = "));
        assert_eq!(decoded.details["vin"], "WVWXXZ");
    }

    #[test]
    fn test_mode_09_vin_request() {
        let decoded = decode_service(&request("0902"));
        assert_eq!(decoded.description, "Vehicle Information: VIN");
    }

    #[test]
    fn test_unsupported_mode_empty_description() {
        let decoded = decode_service(&request("0601"));
        assert_eq!(decoded.description, "");
        assert_eq!(decoded.service_name, "On-Board Monitoring Test Results");
    }

    #[test]
    fn test_unknown_pid_synthesized_label() {
        let decoded = decode_service(&request("01FF"));
        assert_eq!(decoded.description, "PID 0xFF: PID 0xFF");
    }
}
