//! DTC (Diagnostic Trouble Code) wire codecs
//!
//! Two wire encodings feed the same canonical 5-character code
//! `[P|C|B|U][0-3][hex]{3}`:
//!
//! - OBD-II packs a DTC into 2 bytes (SAE J2012). The second character
//!   of the canonical code carries the low 2 bits of the first nibble,
//!   so decoding is lossless and `encode(decode(x)) == x` for every
//!   16-bit wire value.
//! - UDS carries a 3-byte DTC plus a 1-byte status bitmask
//!   (ISO 14229-1); the 8 status flags reconstruct the status byte
//!   bit-for-bit.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use serde::Serialize;

use buslens_core::hex;

/// DTC status byte bit definitions per ISO 14229-1
pub mod status_bit {
    /// Bit 0: Test Failed
    pub const TEST_FAILED: u8 = 0x01;
    /// Bit 1: Test Failed This Operation Cycle
    pub const TEST_FAILED_THIS_OPERATION_CYCLE: u8 = 0x02;
    /// Bit 2: Pending DTC
    pub const PENDING: u8 = 0x04;
    /// Bit 3: Confirmed DTC
    pub const CONFIRMED: u8 = 0x08;
    /// Bit 4: Test Not Completed Since Last Clear
    pub const TEST_NOT_COMPLETED_SINCE_LAST_CLEAR: u8 = 0x10;
    /// Bit 5: Test Failed Since Last Clear
    pub const TEST_FAILED_SINCE_LAST_CLEAR: u8 = 0x20;
    /// Bit 6: Test Not Completed This Operation Cycle
    pub const TEST_NOT_COMPLETED_THIS_OPERATION_CYCLE: u8 = 0x40;
    /// Bit 7: Warning Indicator Requested
    pub const WARNING_INDICATOR_REQUESTED: u8 = 0x80;

    /// Common mask for active faults (test failed + confirmed)
    pub const ACTIVE_MASK: u8 = TEST_FAILED | CONFIRMED;
}

/// DTC group addresses for ClearDiagnosticInformation (0x14)
pub mod dtc_group {
    /// All DTC groups (clear all)
    pub const ALL: u32 = 0xFFFFFF;
    /// Powertrain group (P codes)
    pub const POWERTRAIN: u32 = 0x000000;
    /// Chassis group (C codes)
    pub const CHASSIS: u32 = 0x400000;
    /// Body group (B codes)
    pub const BODY: u32 = 0x800000;
    /// Network group (U codes)
    pub const NETWORK: u32 = 0xC00000;
}

/// DTC category from the top 2 bits of the first byte/nibble
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DtcCategory {
    /// P codes - Powertrain
    Powertrain,
    /// C codes - Chassis
    Chassis,
    /// B codes - Body
    Body,
    /// U codes - Network
    Network,
}

impl DtcCategory {
    /// Category from the DTC high byte.
    pub fn from_high_byte(high_byte: u8) -> Self {
        match (high_byte >> 6) & 0x03 {
            0 => DtcCategory::Powertrain,
            1 => DtcCategory::Chassis,
            2 => DtcCategory::Body,
            _ => DtcCategory::Network,
        }
    }

    /// Category prefix character.
    pub fn prefix(&self) -> char {
        match self {
            DtcCategory::Powertrain => 'P',
            DtcCategory::Chassis => 'C',
            DtcCategory::Body => 'B',
            DtcCategory::Network => 'U',
        }
    }

    fn from_prefix(prefix: char) -> Option<Self> {
        match prefix.to_ascii_uppercase() {
            'P' => Some(DtcCategory::Powertrain),
            'C' => Some(DtcCategory::Chassis),
            'B' => Some(DtcCategory::Body),
            'U' => Some(DtcCategory::Network),
            _ => None,
        }
    }

    fn bits(&self) -> u8 {
        match self {
            DtcCategory::Powertrain => 0,
            DtcCategory::Chassis => 1,
            DtcCategory::Body => 2,
            DtcCategory::Network => 3,
        }
    }
}

// =============================================================================
// OBD-II 2-byte codec
// =============================================================================

/// A decoded OBD-II trouble code
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ObdDtc {
    /// Canonical 5-character code, or the raw input when malformed
    pub code: String,
    /// SAE-defined (generic) vs manufacturer-specific, from bit 1 of
    /// the first nibble
    pub generic: bool,
    /// Generic SAE description, classification fallback, or
    /// "Invalid DTC format"
    pub description: String,
}

/// Decode a 4-hex-digit OBD-II DTC wire value.
///
/// Anything that is not exactly 4 hex digits is returned verbatim as
/// the code with an "Invalid DTC format" description.
pub fn decode_obd(wire: &str) -> ObdDtc {
    let normalized = hex::normalize(wire);
    if normalized.len() != 4 || !hex::is_hex(&normalized) {
        return ObdDtc {
            code: wire.to_string(),
            generic: false,
            description: "Invalid DTC format".to_string(),
        };
    }

    let first_nibble = u8::from_str_radix(&normalized[..1], 16).unwrap_or(0);
    let category = DtcCategory::from_high_byte(first_nibble << 4);
    let generic = (first_nibble & 0b10) == 0;
    let code = format!("{}{}{}", category.prefix(), first_nibble & 0x03, &normalized[1..]);

    let description = match GENERIC_DESCRIPTIONS.get(code.as_str()) {
        Some(text) => (*text).to_string(),
        None if generic => "Generic (SAE defined)".to_string(),
        None => "Manufacturer specific".to_string(),
    };

    ObdDtc {
        code,
        generic,
        description,
    }
}

/// Encode a canonical 5-character code back to its 4-hex-digit wire
/// form. `None` when the code is not canonical.
pub fn encode_obd(code: &str) -> Option<String> {
    let mut chars = code.chars();
    let category = DtcCategory::from_prefix(chars.next()?)?;
    let rest: String = chars.collect();
    if rest.len() != 4 {
        return None;
    }

    let low_bits = rest[..1].parse::<u8>().ok()?;
    if low_bits > 3 || !hex::is_hex(&rest[1..]) {
        return None;
    }

    let first_nibble = (category.bits() << 2) | low_bits;
    Some(format!("{first_nibble:X}{}", rest[1..].to_ascii_uppercase()))
}

// =============================================================================
// UDS 3-byte DTC + status
// =============================================================================

/// Parsed DTC status byte
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DtcStatus {
    /// Bit 0: Test failed at time of request
    pub test_failed: bool,
    /// Bit 1: Test failed during current operation cycle
    pub test_failed_this_operation_cycle: bool,
    /// Bit 2: DTC is pending (failed but not yet confirmed)
    pub pending: bool,
    /// Bit 3: DTC is confirmed (malfunction confirmed and stored)
    pub confirmed: bool,
    /// Bit 4: Test not completed since last clear
    pub test_not_completed_since_last_clear: bool,
    /// Bit 5: Test failed since last clear
    pub test_failed_since_last_clear: bool,
    /// Bit 6: Test not completed this operation cycle
    pub test_not_completed_this_operation_cycle: bool,
    /// Bit 7: Warning indicator (MIL) requested
    pub warning_indicator_requested: bool,
}

impl DtcStatus {
    /// Parse a status byte into structured flags.
    pub fn from_byte(status: u8) -> Self {
        Self {
            test_failed: (status & status_bit::TEST_FAILED) != 0,
            test_failed_this_operation_cycle: (status
                & status_bit::TEST_FAILED_THIS_OPERATION_CYCLE)
                != 0,
            pending: (status & status_bit::PENDING) != 0,
            confirmed: (status & status_bit::CONFIRMED) != 0,
            test_not_completed_since_last_clear: (status
                & status_bit::TEST_NOT_COMPLETED_SINCE_LAST_CLEAR)
                != 0,
            test_failed_since_last_clear: (status & status_bit::TEST_FAILED_SINCE_LAST_CLEAR) != 0,
            test_not_completed_this_operation_cycle: (status
                & status_bit::TEST_NOT_COMPLETED_THIS_OPERATION_CYCLE)
                != 0,
            warning_indicator_requested: (status & status_bit::WARNING_INDICATOR_REQUESTED) != 0,
        }
    }

    /// Reassemble the raw status byte from the flags.
    pub fn to_byte(&self) -> u8 {
        let mut status = 0u8;
        if self.test_failed {
            status |= status_bit::TEST_FAILED;
        }
        if self.test_failed_this_operation_cycle {
            status |= status_bit::TEST_FAILED_THIS_OPERATION_CYCLE;
        }
        if self.pending {
            status |= status_bit::PENDING;
        }
        if self.confirmed {
            status |= status_bit::CONFIRMED;
        }
        if self.test_not_completed_since_last_clear {
            status |= status_bit::TEST_NOT_COMPLETED_SINCE_LAST_CLEAR;
        }
        if self.test_failed_since_last_clear {
            status |= status_bit::TEST_FAILED_SINCE_LAST_CLEAR;
        }
        if self.test_not_completed_this_operation_cycle {
            status |= status_bit::TEST_NOT_COMPLETED_THIS_OPERATION_CYCLE;
        }
        if self.warning_indicator_requested {
            status |= status_bit::WARNING_INDICATOR_REQUESTED;
        }
        status
    }

    /// Whether the DTC is currently active (test failed + confirmed).
    pub fn is_active(&self) -> bool {
        self.test_failed && self.confirmed
    }

    /// Whether the raw status matches a given mask.
    pub fn matches_mask(&self, mask: u8) -> bool {
        (self.to_byte() & mask) != 0
    }

    /// Names of the set flags, for rendering.
    pub fn set_flags(&self) -> Vec<&'static str> {
        let mut flags = Vec::new();
        if self.test_failed {
            flags.push("TestFailed");
        }
        if self.test_failed_this_operation_cycle {
            flags.push("TestFailedThisOperationCycle");
        }
        if self.pending {
            flags.push("Pending");
        }
        if self.confirmed {
            flags.push("Confirmed");
        }
        if self.test_not_completed_since_last_clear {
            flags.push("TestNotCompletedSinceLastClear");
        }
        if self.test_failed_since_last_clear {
            flags.push("TestFailedSinceLastClear");
        }
        if self.test_not_completed_this_operation_cycle {
            flags.push("TestNotCompletedThisOperationCycle");
        }
        if self.warning_indicator_requested {
            flags.push("WarningIndicatorRequested");
        }
        flags
    }
}

/// A UDS DTC: 3-byte number plus status
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Dtc {
    /// 3-byte DTC number (high, mid, low)
    pub bytes: [u8; 3],
    /// Parsed status byte
    pub status: DtcStatus,
}

impl Dtc {
    /// Create from raw bytes.
    pub fn new(high: u8, mid: u8, low: u8, status: u8) -> Self {
        Self {
            bytes: [high, mid, low],
            status: DtcStatus::from_byte(status),
        }
    }

    /// The DTC category.
    pub fn category(&self) -> DtcCategory {
        DtcCategory::from_high_byte(self.bytes[0])
    }

    /// Canonical 5-character code (e.g. P0133). Bytes 0-1 carry the
    /// code; byte 2 is the failure-type byte, rendered separately.
    pub fn code(&self) -> String {
        format!(
            "{}{}{:01X}{:02X}",
            self.category().prefix(),
            (self.bytes[0] >> 4) & 0x03,
            self.bytes[0] & 0x0F,
            self.bytes[1],
        )
    }

    /// Failure-type byte (the third DTC byte).
    pub fn failure_type(&self) -> u8 {
        self.bytes[2]
    }

    /// Upper-hex identifier of the 3-byte number, the knowledge-base
    /// key for manufacturer DTC names.
    pub fn to_id(&self) -> String {
        format!("{:02X}{:02X}{:02X}", self.bytes[0], self.bytes[1], self.bytes[2])
    }

    /// Generic SAE description for the canonical code, when one exists.
    /// Unknown UDS DTCs carry no description - the knowledge overlay is
    /// the consumer's fallback.
    pub fn description(&self) -> Option<&'static str> {
        GENERIC_DESCRIPTIONS.get(self.code().as_str()).copied()
    }
}

// =============================================================================
// Generic SAE-defined descriptions
// =============================================================================

/// Generic OBD-II / SAE J2012 descriptions for common codes, built once
/// at first use.
static GENERIC_DESCRIPTIONS: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("P0010", "Camshaft Position Actuator Circuit (Bank 1)"),
        ("P0011", "Camshaft Position Timing Over-Advanced (Bank 1)"),
        ("P0016", "Crankshaft/Camshaft Position Correlation (Bank 1 Sensor A)"),
        ("P0030", "HO2S Heater Control Circuit (Bank 1 Sensor 1)"),
        ("P0100", "Mass or Volume Air Flow Circuit"),
        ("P0101", "Mass or Volume Air Flow Circuit Range/Performance"),
        ("P0102", "Mass or Volume Air Flow Circuit Low Input"),
        ("P0103", "Mass or Volume Air Flow Circuit High Input"),
        ("P0105", "Manifold Absolute Pressure Circuit"),
        ("P0110", "Intake Air Temperature Circuit"),
        ("P0115", "Engine Coolant Temperature Circuit"),
        ("P0116", "Engine Coolant Temperature Circuit Range/Performance"),
        ("P0120", "Throttle Position Sensor Circuit"),
        ("P0125", "Insufficient Coolant Temperature for Closed Loop"),
        ("P0130", "O2 Sensor Circuit (Bank 1 Sensor 1)"),
        ("P0131", "O2 Sensor Circuit Low Voltage (Bank 1 Sensor 1)"),
        ("P0132", "O2 Sensor Circuit High Voltage (Bank 1 Sensor 1)"),
        ("P0133", "O2 Sensor Circuit Slow Response (Bank 1 Sensor 1)"),
        ("P0135", "O2 Sensor Heater Circuit (Bank 1 Sensor 1)"),
        ("P0171", "System Too Lean (Bank 1)"),
        ("P0172", "System Too Rich (Bank 1)"),
        ("P0174", "System Too Lean (Bank 2)"),
        ("P0300", "Random/Multiple Cylinder Misfire Detected"),
        ("P0301", "Cylinder 1 Misfire Detected"),
        ("P0302", "Cylinder 2 Misfire Detected"),
        ("P0303", "Cylinder 3 Misfire Detected"),
        ("P0304", "Cylinder 4 Misfire Detected"),
        ("P0325", "Knock Sensor Circuit (Bank 1)"),
        ("P0335", "Crankshaft Position Sensor Circuit"),
        ("P0340", "Camshaft Position Sensor Circuit (Bank 1)"),
        ("P0401", "Exhaust Gas Recirculation Flow Insufficient"),
        ("P0420", "Catalyst System Efficiency Below Threshold (Bank 1)"),
        ("P0430", "Catalyst System Efficiency Below Threshold (Bank 2)"),
        ("P0440", "Evaporative Emission System"),
        ("P0442", "Evaporative Emission System Leak Detected (Small Leak)"),
        ("P0455", "Evaporative Emission System Leak Detected (Large Leak)"),
        ("P0500", "Vehicle Speed Sensor"),
        ("P0505", "Idle Air Control System"),
        ("P0562", "System Voltage Low"),
        ("P0563", "System Voltage High"),
        ("P0600", "Serial Communication Link"),
        ("P0601", "Internal Control Module Memory Check Sum Error"),
        ("P0603", "Internal Control Module Keep Alive Memory Error"),
        ("P0605", "Internal Control Module ROM Error"),
        ("P0700", "Transmission Control System Malfunction"),
        ("C0035", "Left Front Wheel Speed Sensor Circuit"),
        ("C0040", "Right Front Wheel Speed Sensor Circuit"),
        ("B0001", "Driver Frontal Stage 1 Deployment Control"),
        ("U0100", "Lost Communication with ECM/PCM"),
        ("U0101", "Lost Communication with TCM"),
        ("U0121", "Lost Communication with ABS Control Module"),
        ("U0140", "Lost Communication with Body Control Module"),
        ("U0155", "Lost Communication with Instrument Panel Cluster"),
    ])
});
