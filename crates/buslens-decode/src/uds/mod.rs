//! UDS (ISO 14229) / KWP2000 (ISO 14230) service decoding
//!
//! This module owns the service-ID dispatch table and the static name
//! tables shared by the decoder: session types, reset types,
//! ReadDTCInformation sub-functions and negative response codes.

pub mod decoder;
mod nrc;

pub use decoder::decode_service;
pub use nrc::NegativeResponseCode;

/// Standard UDS service ID constants
pub mod service_id {
    pub const DIAGNOSTIC_SESSION_CONTROL: u8 = 0x10;
    pub const ECU_RESET: u8 = 0x11;
    pub const CLEAR_DIAGNOSTIC_INFO: u8 = 0x14;
    pub const READ_DTC_INFO: u8 = 0x19;
    pub const READ_DATA_BY_ID: u8 = 0x22;
    pub const SECURITY_ACCESS: u8 = 0x27;
    pub const WRITE_DATA_BY_ID: u8 = 0x2E;
    pub const ROUTINE_CONTROL: u8 = 0x31;
    pub const TESTER_PRESENT: u8 = 0x3E;
    pub const MANUFACTURER_SPECIFIC: u8 = 0x60;
    pub const NEGATIVE_RESPONSE: u8 = 0x7F;

    /// Positive responses echo the request service ID plus this offset.
    pub const RESPONSE_OFFSET: u8 = 0x40;
}

/// RoutineControl (0x31) sub-functions
pub mod routine_sub_function {
    /// Start routine
    pub const START_ROUTINE: u8 = 0x01;
    /// Stop routine
    pub const STOP_ROUTINE: u8 = 0x02;
    /// Request routine results
    pub const REQUEST_ROUTINE_RESULTS: u8 = 0x03;

    /// Action label for a sub-function.
    pub fn name(sub: u8) -> Option<&'static str> {
        match sub {
            START_ROUTINE => Some("Start Routine"),
            STOP_ROUTINE => Some("Stop Routine"),
            REQUEST_ROUTINE_RESULTS => Some("Request Routine Results"),
            _ => None,
        }
    }
}

/// ECUReset (0x11) reset types
pub mod reset_type {
    pub const HARD_RESET: u8 = 0x01;
    pub const KEY_OFF_ON_RESET: u8 = 0x02;
    pub const SOFT_RESET: u8 = 0x03;
    pub const ENABLE_RAPID_POWER_SHUTDOWN: u8 = 0x04;
    pub const DISABLE_RAPID_POWER_SHUTDOWN: u8 = 0x05;

    pub fn name(value: u8) -> Option<&'static str> {
        match value {
            HARD_RESET => Some("Hard Reset"),
            KEY_OFF_ON_RESET => Some("Key Off/On Reset"),
            SOFT_RESET => Some("Soft Reset"),
            ENABLE_RAPID_POWER_SHUTDOWN => Some("Enable Rapid Power Shutdown"),
            DISABLE_RAPID_POWER_SHUTDOWN => Some("Disable Rapid Power Shutdown"),
            _ => None,
        }
    }
}

/// DiagnosticSessionControl (0x10) session types
///
/// The union across capture sources: ISO 14229 sessions plus the
/// KWP2000 0x81-0x92 variants some gateways pass through unchanged.
pub mod session_type {
    pub fn name(value: u8) -> Option<&'static str> {
        match value {
            0x01 => Some("Default Session"),
            0x02 => Some("Programming Session"),
            0x03 => Some("Extended Diagnostic Session"),
            0x04 => Some("Safety System Diagnostic Session"),
            0x81 => Some("Standard Session (KWP2000)"),
            0x84 => Some("End Of Line Session (KWP2000)"),
            0x85 => Some("Programming Session (KWP2000)"),
            0x89 => Some("Standby Session (KWP2000)"),
            0x90 => Some("Passive Session (KWP2000)"),
            0x92 => Some("Extended Session (KWP2000)"),
            _ => None,
        }
    }
}

/// ReadDTCInformation (0x19) sub-functions
pub mod dtc_sub_function {
    pub const REPORT_NUMBER_OF_DTC_BY_STATUS_MASK: u8 = 0x01;
    pub const REPORT_DTC_BY_STATUS_MASK: u8 = 0x02;
    pub const REPORT_DTC_SNAPSHOT_IDENTIFICATION: u8 = 0x03;
    pub const REPORT_DTC_SNAPSHOT_RECORD_BY_DTC_NUMBER: u8 = 0x04;
    pub const REPORT_DTC_STORED_DATA_BY_RECORD_NUMBER: u8 = 0x05;
    pub const REPORT_DTC_EXTENDED_DATA_RECORD_BY_DTC_NUMBER: u8 = 0x06;
    pub const REPORT_SUPPORTED_DTC: u8 = 0x0A;

    pub fn name(sub: u8) -> Option<&'static str> {
        match sub {
            REPORT_NUMBER_OF_DTC_BY_STATUS_MASK => Some("Report Number Of DTC By Status Mask"),
            REPORT_DTC_BY_STATUS_MASK => Some("Report DTC By Status Mask"),
            REPORT_DTC_SNAPSHOT_IDENTIFICATION => Some("Report DTC Snapshot Identification"),
            REPORT_DTC_SNAPSHOT_RECORD_BY_DTC_NUMBER => {
                Some("Report DTC Snapshot Record By DTC Number")
            }
            REPORT_DTC_STORED_DATA_BY_RECORD_NUMBER => {
                Some("Report DTC Stored Data By Record Number")
            }
            REPORT_DTC_EXTENDED_DATA_RECORD_BY_DTC_NUMBER => {
                Some("Report DTC Extended Data Record By DTC Number")
            }
            REPORT_SUPPORTED_DTC => Some("Report Supported DTC"),
            _ => None,
        }
    }
}

/// UDS service name for a request service ID.
fn uds_request_name(service_id: u8) -> Option<&'static str> {
    match service_id {
        0x10 => Some("Diagnostic Session Control"),
        0x11 => Some("ECU Reset"),
        0x14 => Some("Clear Diagnostic Information"),
        0x19 => Some("Read DTC Information"),
        0x22 => Some("Read Data By Identifier"),
        0x23 => Some("Read Memory By Address"),
        0x27 => Some("Security Access"),
        0x28 => Some("Communication Control"),
        0x2A => Some("Read Data By Periodic Identifier"),
        0x2C => Some("Dynamically Define Data Identifier"),
        0x2E => Some("Write Data By Identifier"),
        0x2F => Some("Input Output Control By Identifier"),
        0x31 => Some("Routine Control"),
        0x34 => Some("Request Download"),
        0x35 => Some("Request Upload"),
        0x36 => Some("Transfer Data"),
        0x37 => Some("Request Transfer Exit"),
        0x3D => Some("Write Memory By Address"),
        0x3E => Some("Tester Present"),
        0x60 => Some("Manufacturer Specific"),
        0x85 => Some("Control DTC Setting"),
        0x86 => Some("Response On Event"),
        0x87 => Some("Link Control"),
        _ => None,
    }
}

/// KWP2000 service name for a request service ID, where it differs
/// from or does not exist in UDS.
fn kwp_request_name(service_id: u8) -> Option<&'static str> {
    match service_id {
        0x10 => Some("Start Diagnostic Session"),
        0x12 => Some("Read Freeze Frame Data"),
        0x17 => Some("Read Status Of DTC"),
        0x18 => Some("Read DTC By Status"),
        0x1A => Some("Read ECU Identification"),
        0x21 => Some("Read Data By Local Identifier"),
        0x2C => Some("Dynamically Define Local Identifier"),
        0x30 => Some("Input Output Control By Local Identifier"),
        0x31 => Some("Start Routine By Local Identifier"),
        0x32 => Some("Stop Routine By Local Identifier"),
        0x33 => Some("Request Routine Results By Local Identifier"),
        0x38 => Some("Start Routine By Address"),
        0x39 => Some("Stop Routine By Address"),
        0x3A => Some("Request Routine Results By Address"),
        0x3B => Some("Write Data By Local Identifier"),
        0x81 => Some("Start Communication"),
        0x82 => Some("Stop Communication"),
        0x83 => Some("Access Timing Parameter"),
        _ => None,
    }
}

/// Resolve a service ID against the UDS name table, mapping positive
/// responses back to their request name with a "Response" suffix.
pub fn service_name(service_id: u8) -> Option<String> {
    lookup_with_response_offset(service_id, uds_request_name)
}

/// Resolve a service ID against the KWP2000 name table.
pub fn kwp_service_name(service_id: u8) -> Option<String> {
    lookup_with_response_offset(service_id, kwp_request_name)
}

fn lookup_with_response_offset(
    service_id: u8,
    table: fn(u8) -> Option<&'static str>,
) -> Option<String> {
    if service_id == service_id::NEGATIVE_RESPONSE {
        return Some("Negative Response".to_string());
    }
    if let Some(name) = table(service_id) {
        return Some(name.to_string());
    }
    // Positive responses sit at request + 0x40. 0x81+ are KWP request
    // IDs in their own right, never response offsets.
    if (0x40..0x81).contains(&service_id) {
        if let Some(name) = table(service_id - service_id::RESPONSE_OFFSET) {
            return Some(format!("{name} Response"));
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_response_offset_naming() {
        assert_eq!(service_name(0x22).as_deref(), Some("Read Data By Identifier"));
        assert_eq!(
            service_name(0x62).as_deref(),
            Some("Read Data By Identifier Response")
        );
        assert_eq!(service_name(0x7F).as_deref(), Some("Negative Response"));
        assert_eq!(service_name(0xBB), None);
    }

    #[test]
    fn test_every_positive_response_references_request_name() {
        // Response-offset invariant across the whole request table
        for sid in 0x00u8..=0x40 {
            if let Some(request_name) = uds_request_name(sid) {
                let response_name = service_name(sid + 0x40).unwrap();
                assert_eq!(response_name, format!("{request_name} Response"));
            }
        }
    }

    #[test]
    fn test_kwp_names() {
        assert_eq!(kwp_service_name(0x81).as_deref(), Some("Start Communication"));
        assert_eq!(
            kwp_service_name(0x21).as_deref(),
            Some("Read Data By Local Identifier")
        );
        assert_eq!(
            kwp_service_name(0x50).as_deref(),
            Some("Start Diagnostic Session Response")
        );
    }
}
