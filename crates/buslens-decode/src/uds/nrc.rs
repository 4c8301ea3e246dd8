//! UDS Negative Response Codes (NRC)

use std::fmt;

/// UDS Negative Response Codes (NRC)
///
/// The union of the NRC sets seen across capture sources: the ISO
/// 14229-1 core set, the transfer group, response pending, the
/// session-scoped rejections and the vehicle-condition group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NegativeResponseCode {
    // General NRCs
    GeneralReject,
    ServiceNotSupported,
    SubFunctionNotSupported,
    IncorrectMessageLengthOrFormat,
    ResponseTooLong,

    // Condition NRCs
    BusyRepeatRequest,
    ConditionsNotCorrect,

    // Sequence NRCs
    RequestSequenceError,
    NoResponseFromSubnet,
    FailurePreventsExecution,

    // Request NRCs
    RequestOutOfRange,
    SecurityAccessDenied,
    InvalidKey,
    ExceededNumberOfAttempts,
    RequiredTimeDelayNotExpired,

    // Upload/Download NRCs
    UploadDownloadNotAccepted,
    TransferDataSuspended,
    GeneralProgrammingFailure,
    WrongBlockSequenceCounter,

    // Response Pending
    ResponsePending,

    // Sub-function NRCs
    SubFunctionNotSupportedInActiveSession,
    ServiceNotSupportedInActiveSession,

    // Vehicle condition
    RpmTooHigh,
    RpmTooLow,
    EngineRunning,
    EngineNotRunning,
    EngineRunTimeTooLow,
    TemperatureTooHigh,
    TemperatureTooLow,
    VehicleSpeedTooHigh,
    VehicleSpeedTooLow,
    ThrottleTooHigh,
    ThrottleTooLow,
    TransmissionNotInNeutral,
    TransmissionNotInGear,
    BrakeSwitchNotClosed,
    ShifterNotInPark,
    TorqueConverterClutchLocked,
    VoltageTooHigh,
    VoltageTooLow,

    /// Unknown/reserved NRC
    Unknown(u8),
}

impl From<u8> for NegativeResponseCode {
    fn from(value: u8) -> Self {
        match value {
            0x10 => Self::GeneralReject,
            0x11 => Self::ServiceNotSupported,
            0x12 => Self::SubFunctionNotSupported,
            0x13 => Self::IncorrectMessageLengthOrFormat,
            0x14 => Self::ResponseTooLong,
            0x21 => Self::BusyRepeatRequest,
            0x22 => Self::ConditionsNotCorrect,
            0x24 => Self::RequestSequenceError,
            0x25 => Self::NoResponseFromSubnet,
            0x26 => Self::FailurePreventsExecution,
            0x31 => Self::RequestOutOfRange,
            0x33 => Self::SecurityAccessDenied,
            0x35 => Self::InvalidKey,
            0x36 => Self::ExceededNumberOfAttempts,
            0x37 => Self::RequiredTimeDelayNotExpired,
            0x70 => Self::UploadDownloadNotAccepted,
            0x71 => Self::TransferDataSuspended,
            0x72 => Self::GeneralProgrammingFailure,
            0x73 => Self::WrongBlockSequenceCounter,
            0x78 => Self::ResponsePending,
            0x7E => Self::SubFunctionNotSupportedInActiveSession,
            0x7F => Self::ServiceNotSupportedInActiveSession,
            0x81 => Self::RpmTooHigh,
            0x82 => Self::RpmTooLow,
            0x83 => Self::EngineRunning,
            0x84 => Self::EngineNotRunning,
            0x85 => Self::EngineRunTimeTooLow,
            0x86 => Self::TemperatureTooHigh,
            0x87 => Self::TemperatureTooLow,
            0x88 => Self::VehicleSpeedTooHigh,
            0x89 => Self::VehicleSpeedTooLow,
            0x8A => Self::ThrottleTooHigh,
            0x8B => Self::ThrottleTooLow,
            0x8C => Self::TransmissionNotInNeutral,
            0x8D => Self::TransmissionNotInGear,
            0x8F => Self::BrakeSwitchNotClosed,
            0x90 => Self::ShifterNotInPark,
            0x91 => Self::TorqueConverterClutchLocked,
            0x92 => Self::VoltageTooHigh,
            0x93 => Self::VoltageTooLow,
            other => Self::Unknown(other),
        }
    }
}

impl From<NegativeResponseCode> for u8 {
    fn from(nrc: NegativeResponseCode) -> Self {
        match nrc {
            NegativeResponseCode::GeneralReject => 0x10,
            NegativeResponseCode::ServiceNotSupported => 0x11,
            NegativeResponseCode::SubFunctionNotSupported => 0x12,
            NegativeResponseCode::IncorrectMessageLengthOrFormat => 0x13,
            NegativeResponseCode::ResponseTooLong => 0x14,
            NegativeResponseCode::BusyRepeatRequest => 0x21,
            NegativeResponseCode::ConditionsNotCorrect => 0x22,
            NegativeResponseCode::RequestSequenceError => 0x24,
            NegativeResponseCode::NoResponseFromSubnet => 0x25,
            NegativeResponseCode::FailurePreventsExecution => 0x26,
            NegativeResponseCode::RequestOutOfRange => 0x31,
            NegativeResponseCode::SecurityAccessDenied => 0x33,
            NegativeResponseCode::InvalidKey => 0x35,
            NegativeResponseCode::ExceededNumberOfAttempts => 0x36,
            NegativeResponseCode::RequiredTimeDelayNotExpired => 0x37,
            NegativeResponseCode::UploadDownloadNotAccepted => 0x70,
            NegativeResponseCode::TransferDataSuspended => 0x71,
            NegativeResponseCode::GeneralProgrammingFailure => 0x72,
            NegativeResponseCode::WrongBlockSequenceCounter => 0x73,
            NegativeResponseCode::ResponsePending => 0x78,
            NegativeResponseCode::SubFunctionNotSupportedInActiveSession => 0x7E,
            NegativeResponseCode::ServiceNotSupportedInActiveSession => 0x7F,
            NegativeResponseCode::RpmTooHigh => 0x81,
            NegativeResponseCode::RpmTooLow => 0x82,
            NegativeResponseCode::EngineRunning => 0x83,
            NegativeResponseCode::EngineNotRunning => 0x84,
            NegativeResponseCode::EngineRunTimeTooLow => 0x85,
            NegativeResponseCode::TemperatureTooHigh => 0x86,
            NegativeResponseCode::TemperatureTooLow => 0x87,
            NegativeResponseCode::VehicleSpeedTooHigh => 0x88,
            NegativeResponseCode::VehicleSpeedTooLow => 0x89,
            NegativeResponseCode::ThrottleTooHigh => 0x8A,
            NegativeResponseCode::ThrottleTooLow => 0x8B,
            NegativeResponseCode::TransmissionNotInNeutral => 0x8C,
            NegativeResponseCode::TransmissionNotInGear => 0x8D,
            NegativeResponseCode::BrakeSwitchNotClosed => 0x8F,
            NegativeResponseCode::ShifterNotInPark => 0x90,
            NegativeResponseCode::TorqueConverterClutchLocked => 0x91,
            NegativeResponseCode::VoltageTooHigh => 0x92,
            NegativeResponseCode::VoltageTooLow => 0x93,
            NegativeResponseCode::Unknown(v) => v,
        }
    }
}

impl NegativeResponseCode {
    /// Human-readable text. Unknown codes render as `NRC 0x<hex>`.
    pub fn text(&self) -> String {
        let s = match self {
            Self::GeneralReject => "General Reject",
            Self::ServiceNotSupported => "Service Not Supported",
            Self::SubFunctionNotSupported => "Sub-function Not Supported",
            Self::IncorrectMessageLengthOrFormat => "Incorrect Message Length Or Format",
            Self::ResponseTooLong => "Response Too Long",
            Self::BusyRepeatRequest => "Busy - Repeat Request",
            Self::ConditionsNotCorrect => "Conditions Not Correct",
            Self::RequestSequenceError => "Request Sequence Error",
            Self::NoResponseFromSubnet => "No Response From Subnet Component",
            Self::FailurePreventsExecution => "Failure Prevents Execution Of Requested Action",
            Self::RequestOutOfRange => "Request Out Of Range",
            Self::SecurityAccessDenied => "Security Access Denied",
            Self::InvalidKey => "Invalid Key",
            Self::ExceededNumberOfAttempts => "Exceeded Number Of Attempts",
            Self::RequiredTimeDelayNotExpired => "Required Time Delay Not Expired",
            Self::UploadDownloadNotAccepted => "Upload/Download Not Accepted",
            Self::TransferDataSuspended => "Transfer Data Suspended",
            Self::GeneralProgrammingFailure => "General Programming Failure",
            Self::WrongBlockSequenceCounter => "Wrong Block Sequence Counter",
            Self::ResponsePending => "Request Correctly Received - Response Pending",
            Self::SubFunctionNotSupportedInActiveSession => {
                "Sub-function Not Supported In Active Session"
            }
            Self::ServiceNotSupportedInActiveSession => "Service Not Supported In Active Session",
            Self::RpmTooHigh => "RPM Too High",
            Self::RpmTooLow => "RPM Too Low",
            Self::EngineRunning => "Engine Is Running",
            Self::EngineNotRunning => "Engine Is Not Running",
            Self::EngineRunTimeTooLow => "Engine Run Time Too Low",
            Self::TemperatureTooHigh => "Temperature Too High",
            Self::TemperatureTooLow => "Temperature Too Low",
            Self::VehicleSpeedTooHigh => "Vehicle Speed Too High",
            Self::VehicleSpeedTooLow => "Vehicle Speed Too Low",
            Self::ThrottleTooHigh => "Throttle/Pedal Too High",
            Self::ThrottleTooLow => "Throttle/Pedal Too Low",
            Self::TransmissionNotInNeutral => "Transmission Range Not In Neutral",
            Self::TransmissionNotInGear => "Transmission Range Not In Gear",
            Self::BrakeSwitchNotClosed => "Brake Switch Not Closed",
            Self::ShifterNotInPark => "Shifter Lever Not In Park",
            Self::TorqueConverterClutchLocked => "Torque Converter Clutch Locked",
            Self::VoltageTooHigh => "Voltage Too High",
            Self::VoltageTooLow => "Voltage Too Low",
            Self::Unknown(v) => return format!("NRC 0x{v:02X}"),
        };
        s.to_string()
    }
}

impl fmt::Display for NegativeResponseCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text())
    }
}

impl fmt::UpperHex for NegativeResponseCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value: u8 = (*self).into();
        fmt::UpperHex::fmt(&value, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_codes() {
        assert_eq!(NegativeResponseCode::from(0x35).text(), "Invalid Key");
        assert_eq!(
            NegativeResponseCode::from(0x36).text(),
            "Exceeded Number Of Attempts"
        );
        assert_eq!(
            NegativeResponseCode::from(0x33).text(),
            "Security Access Denied"
        );
    }

    #[test]
    fn test_unknown_code_renders_hex() {
        assert_eq!(NegativeResponseCode::from(0x4B).text(), "NRC 0x4B");
    }

    #[test]
    fn test_u8_round_trip() {
        for value in 0u8..=0xFF {
            let nrc = NegativeResponseCode::from(value);
            assert_eq!(u8::from(nrc), value);
        }
    }
}
