//! SAE J1979 Mode 01/02 PID name table (0x00-0x60)

use std::collections::HashMap;

use once_cell::sync::Lazy;

/// Raw PID name entries, 0x00-0x60 per SAE J1979 rev 2014.
const PID_ENTRIES: &[(u8, &str)] = &[
    (0x00, "PIDs Supported [01-20]"),
    (0x01, "Monitor Status Since DTCs Cleared"),
    (0x02, "Freeze DTC"),
    (0x03, "Fuel System Status"),
    (0x04, "Calculated Engine Load"),
    (0x05, "Engine Coolant Temperature"),
    (0x06, "Short Term Fuel Trim - Bank 1"),
    (0x07, "Long Term Fuel Trim - Bank 1"),
    (0x08, "Short Term Fuel Trim - Bank 2"),
    (0x09, "Long Term Fuel Trim - Bank 2"),
    (0x0A, "Fuel Pressure"),
    (0x0B, "Intake Manifold Absolute Pressure"),
    (0x0C, "Engine RPM"),
    (0x0D, "Vehicle Speed"),
    (0x0E, "Timing Advance"),
    (0x0F, "Intake Air Temperature"),
    (0x10, "Mass Air Flow Rate"),
    (0x11, "Throttle Position"),
    (0x12, "Commanded Secondary Air Status"),
    (0x13, "Oxygen Sensors Present (2 banks)"),
    (0x14, "Oxygen Sensor 1 - Voltage/Trim"),
    (0x15, "Oxygen Sensor 2 - Voltage/Trim"),
    (0x16, "Oxygen Sensor 3 - Voltage/Trim"),
    (0x17, "Oxygen Sensor 4 - Voltage/Trim"),
    (0x18, "Oxygen Sensor 5 - Voltage/Trim"),
    (0x19, "Oxygen Sensor 6 - Voltage/Trim"),
    (0x1A, "Oxygen Sensor 7 - Voltage/Trim"),
    (0x1B, "Oxygen Sensor 8 - Voltage/Trim"),
    (0x1C, "OBD Standards Compliance"),
    (0x1D, "Oxygen Sensors Present (4 banks)"),
    (0x1E, "Auxiliary Input Status"),
    (0x1F, "Run Time Since Engine Start"),
    (0x20, "PIDs Supported [21-40]"),
    (0x21, "Distance Traveled With MIL On"),
    (0x22, "Fuel Rail Pressure (relative)"),
    (0x23, "Fuel Rail Gauge Pressure"),
    (0x24, "Oxygen Sensor 1 - Lambda/Voltage"),
    (0x25, "Oxygen Sensor 2 - Lambda/Voltage"),
    (0x26, "Oxygen Sensor 3 - Lambda/Voltage"),
    (0x27, "Oxygen Sensor 4 - Lambda/Voltage"),
    (0x28, "Oxygen Sensor 5 - Lambda/Voltage"),
    (0x29, "Oxygen Sensor 6 - Lambda/Voltage"),
    (0x2A, "Oxygen Sensor 7 - Lambda/Voltage"),
    (0x2B, "Oxygen Sensor 8 - Lambda/Voltage"),
    (0x2C, "Commanded EGR"),
    (0x2D, "EGR Error"),
    (0x2E, "Commanded Evaporative Purge"),
    (0x2F, "Fuel Tank Level Input"),
    (0x30, "Warm-ups Since Codes Cleared"),
    (0x31, "Distance Traveled Since Codes Cleared"),
    (0x32, "Evap System Vapor Pressure"),
    (0x33, "Absolute Barometric Pressure"),
    (0x34, "Oxygen Sensor 1 - Lambda/Current"),
    (0x35, "Oxygen Sensor 2 - Lambda/Current"),
    (0x36, "Oxygen Sensor 3 - Lambda/Current"),
    (0x37, "Oxygen Sensor 4 - Lambda/Current"),
    (0x38, "Oxygen Sensor 5 - Lambda/Current"),
    (0x39, "Oxygen Sensor 6 - Lambda/Current"),
    (0x3A, "Oxygen Sensor 7 - Lambda/Current"),
    (0x3B, "Oxygen Sensor 8 - Lambda/Current"),
    (0x3C, "Catalyst Temperature Bank 1 Sensor 1"),
    (0x3D, "Catalyst Temperature Bank 2 Sensor 1"),
    (0x3E, "Catalyst Temperature Bank 1 Sensor 2"),
    (0x3F, "Catalyst Temperature Bank 2 Sensor 2"),
    (0x40, "PIDs Supported [41-60]"),
    (0x41, "Monitor Status This Drive Cycle"),
    (0x42, "Control Module Voltage"),
    (0x43, "Absolute Load Value"),
    (0x44, "Commanded Equivalence Ratio"),
    (0x45, "Relative Throttle Position"),
    (0x46, "Ambient Air Temperature"),
    (0x47, "Absolute Throttle Position B"),
    (0x48, "Absolute Throttle Position C"),
    (0x49, "Accelerator Pedal Position D"),
    (0x4A, "Accelerator Pedal Position E"),
    (0x4B, "Accelerator Pedal Position F"),
    (0x4C, "Commanded Throttle Actuator"),
    (0x4D, "Time Run With MIL On"),
    (0x4E, "Time Since Trouble Codes Cleared"),
    (0x4F, "Maximum Values (Lambda, O2, MAP, MAF)"),
    (0x50, "Maximum Air Flow Rate From MAF"),
    (0x51, "Fuel Type"),
    (0x52, "Ethanol Fuel Percentage"),
    (0x53, "Absolute Evap System Vapor Pressure"),
    (0x54, "Evap System Vapor Pressure"),
    (0x55, "Short Term Secondary O2 Trim Bank 1/3"),
    (0x56, "Long Term Secondary O2 Trim Bank 1/3"),
    (0x57, "Short Term Secondary O2 Trim Bank 2/4"),
    (0x58, "Long Term Secondary O2 Trim Bank 2/4"),
    (0x59, "Fuel Rail Absolute Pressure"),
    (0x5A, "Relative Accelerator Pedal Position"),
    (0x5B, "Hybrid Battery Pack Remaining Life"),
    (0x5C, "Engine Oil Temperature"),
    (0x5D, "Fuel Injection Timing"),
    (0x5E, "Engine Fuel Rate"),
    (0x5F, "Emission Requirements"),
    (0x60, "PIDs Supported [61-80]"),
];

static PID_NAMES: Lazy<HashMap<u8, &'static str>> =
    Lazy::new(|| PID_ENTRIES.iter().copied().collect());

/// Name for a Mode 01/02 PID, when it is in the standard table.
pub fn name(pid: u8) -> Option<&'static str> {
    PID_NAMES.get(&pid).copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_common_pids() {
        assert_eq!(name(0x0C), Some("Engine RPM"));
        assert_eq!(name(0x0D), Some("Vehicle Speed"));
        assert_eq!(name(0x05), Some("Engine Coolant Temperature"));
    }

    #[test]
    fn test_out_of_table() {
        assert_eq!(name(0x61), None);
        assert_eq!(name(0xFF), None);
    }

    #[test]
    fn test_table_covers_full_range() {
        for pid in 0x00u8..=0x60 {
            assert!(name(pid).is_some(), "missing PID 0x{pid:02X}");
        }
    }
}
