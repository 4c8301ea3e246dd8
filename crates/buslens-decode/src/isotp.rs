//! ISO 15765-2 (ISO-TP) frame classification
//!
//! Some capture sources hand the engine raw link-layer data with the
//! ISO-TP protocol control information still in front of the diagnostic
//! payload. The classifier reads the top nibble of byte 0 and splits
//! the frame into its type and the embedded payload fragment. It does
//! no reassembly - that is the transport's job, out of scope here.

use serde::Serialize;

use buslens_core::hex;

/// ISO-TP frame type, from the top nibble of the PCI byte
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FrameType {
    /// 0x0 - complete payload in one frame
    SingleFrame,
    /// 0x1 - first segment, carries the 12-bit total length
    FirstFrame,
    /// 0x2 - follow-up segment with a 4-bit sequence counter
    ConsecutiveFrame,
    /// 0x3 - receiver flow control
    FlowControl,
    /// Anything else, including empty or garbled data
    Unknown,
}

impl FrameType {
    /// Conventional two-letter code (SF/FF/CF/FC).
    pub fn code(&self) -> &'static str {
        match self {
            FrameType::SingleFrame => "SF",
            FrameType::FirstFrame => "FF",
            FrameType::ConsecutiveFrame => "CF",
            FrameType::FlowControl => "FC",
            FrameType::Unknown => "??",
        }
    }
}

impl std::fmt::Display for FrameType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            FrameType::SingleFrame => "Single Frame",
            FrameType::FirstFrame => "First Frame",
            FrameType::ConsecutiveFrame => "Consecutive Frame",
            FrameType::FlowControl => "Flow Control",
            FrameType::Unknown => "Unknown",
        };
        f.write_str(s)
    }
}

/// A classified frame: type plus the embedded payload fragment
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IsoTpFrame {
    pub frame_type: FrameType,
    /// Diagnostic payload bytes carried by this frame
    pub payload: Vec<u8>,
    /// Total message length, for first frames (12-bit field)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_length: Option<u16>,
    /// Sequence counter, for consecutive frames
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sequence: Option<u8>,
    /// Flow status nibble, for flow-control frames
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flow_status: Option<u8>,
}

impl IsoTpFrame {
    fn unknown(payload: Vec<u8>) -> Self {
        Self {
            frame_type: FrameType::Unknown,
            payload,
            total_length: None,
            sequence: None,
            flow_status: None,
        }
    }
}

/// Classify a raw hex frame.
///
/// Total: absent or garbled data degrades to `Unknown` with whatever
/// payload could be salvaged, never an error.
pub fn classify_frame(raw_hex: &str) -> IsoTpFrame {
    let bytes = hex::to_bytes(&hex::normalize(raw_hex));
    let Some(&pci) = bytes.first() else {
        return IsoTpFrame::unknown(Vec::new());
    };

    match pci >> 4 {
        0x0 => {
            // SF: low nibble is the payload length
            let len = (pci & 0x0F) as usize;
            let end = (1 + len).min(bytes.len());
            IsoTpFrame {
                frame_type: FrameType::SingleFrame,
                payload: bytes[1..end].to_vec(),
                total_length: None,
                sequence: None,
                flow_status: None,
            }
        }
        0x1 => {
            // FF: 12-bit length = low nibble << 8 | byte 1
            let total = bytes
                .get(1)
                .map(|&b| (((pci & 0x0F) as u16) << 8) | b as u16);
            let payload = if bytes.len() > 2 {
                bytes[2..].to_vec()
            } else {
                Vec::new()
            };
            IsoTpFrame {
                frame_type: FrameType::FirstFrame,
                payload,
                total_length: total,
                sequence: None,
                flow_status: None,
            }
        }
        0x2 => IsoTpFrame {
            frame_type: FrameType::ConsecutiveFrame,
            payload: bytes[1..].to_vec(),
            total_length: None,
            sequence: Some(pci & 0x0F),
            flow_status: None,
        },
        0x3 => IsoTpFrame {
            frame_type: FrameType::FlowControl,
            payload: bytes[1..].to_vec(),
            total_length: None,
            sequence: None,
            flow_status: Some(pci & 0x0F),
        },
        _ => IsoTpFrame::unknown(bytes[1..].to_vec()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_single_frame() {
        let frame = classify_frame("0322F190");
        assert_eq!(frame.frame_type, FrameType::SingleFrame);
        assert_eq!(frame.payload, vec![0x22, 0xF1, 0x90]);
    }

    #[test]
    fn test_single_frame_truncated_length() {
        // Declared length exceeds available bytes: take what is there
        let frame = classify_frame("0622F1");
        assert_eq!(frame.frame_type, FrameType::SingleFrame);
        assert_eq!(frame.payload, vec![0x22, 0xF1]);
    }

    #[test]
    fn test_first_frame() {
        let frame = classify_frame("10 14 62 F1 90 01 02 03");
        assert_eq!(frame.frame_type, FrameType::FirstFrame);
        assert_eq!(frame.frame_type.code(), "FF");
        assert_eq!(frame.total_length, Some(0x014));
        assert_eq!(frame.payload, vec![0x62, 0xF1, 0x90, 0x01, 0x02, 0x03]);
    }

    #[test]
    fn test_consecutive_frame() {
        let frame = classify_frame("2104050607080910");
        assert_eq!(frame.frame_type, FrameType::ConsecutiveFrame);
        assert_eq!(frame.sequence, Some(1));
        assert_eq!(frame.payload.len(), 7);
    }

    #[test]
    fn test_flow_control() {
        let frame = classify_frame("300000");
        assert_eq!(frame.frame_type, FrameType::FlowControl);
        assert_eq!(frame.flow_status, Some(0));
        assert_eq!(frame.payload, vec![0x00, 0x00]);
    }

    #[test]
    fn test_unknown_and_empty() {
        assert_eq!(classify_frame("").frame_type, FrameType::Unknown);
        assert_eq!(classify_frame("").payload, Vec::<u8>::new());

        let frame = classify_frame("F1AABB");
        assert_eq!(frame.frame_type, FrameType::Unknown);
        assert_eq!(frame.payload, vec![0xAA, 0xBB]);
    }
}
