//! Security-access timeline events

use serde::Serialize;

/// What happened at one step of a seed/key handshake
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SecurityEventKind {
    /// Tester asked for a seed (odd sub-function request)
    SeedRequest,
    /// ECU returned the seed bytes (odd sub-function response)
    SeedResponse,
    /// Tester sent the computed key (even sub-function request)
    KeySend,
    /// ECU accepted the key (even sub-function response)
    KeyAccepted,
    /// ECU rejected the security-access attempt (0x7F on 0x27)
    Rejected,
}

impl std::fmt::Display for SecurityEventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            SecurityEventKind::SeedRequest => "Seed Request",
            SecurityEventKind::SeedResponse => "Seed Response",
            SecurityEventKind::KeySend => "Key Send",
            SecurityEventKind::KeyAccepted => "Key Accepted",
            SecurityEventKind::Rejected => "Rejected",
        };
        f.write_str(s)
    }
}

/// One entry in the reconstructed security-access timeline
#[derive(Debug, Clone, Serialize)]
pub struct SecurityEvent {
    /// Capture timestamp of the underlying message (opaque)
    pub timestamp: String,
    /// The ECU under handshake: request target or response source
    pub ecu_address: String,
    /// Security level, derived from sub-function parity
    pub level: u8,
    /// Event classification
    pub kind: SecurityEventKind,
    /// Seed/key bytes for seed responses and key sends, or the
    /// rejection reason for rejected attempts
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<String>,
    /// Milliseconds since the preceding seed response at the same ECU
    /// and level, when both timestamps parse as `HH:MM:SS.mmm`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub elapsed_ms: Option<i64>,
}
