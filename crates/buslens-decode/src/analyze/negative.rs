//! Negative-response cause resolution
//!
//! A 0x7F response names the rejected service and the NRC, but not
//! which DID or routine the rejected request targeted. That has to be
//! recovered from message history: the nearest prior request to the
//! responding ECU for the same service.
//!
//! The lookup runs against a `RequestIndex` built once per analysis
//! pass - `(ecu, service) -> ordered request positions` - so each
//! resolution is a binary search rather than a backward scan over the
//! capture.

use std::collections::HashMap;

use buslens_core::{KnowledgeKind, KnowledgeStore, RawMessage};
use tracing::debug;

use crate::uds::service_id;

/// Index of request positions per `(ecu address, service ID)`
#[derive(Debug, Default)]
pub struct RequestIndex {
    positions: HashMap<(String, u8), Vec<usize>>,
}

impl RequestIndex {
    /// Build the index in one pass over the capture. Positions are
    /// appended in capture order, so each bucket is sorted.
    pub fn build(messages: &[RawMessage]) -> Self {
        let mut positions: HashMap<(String, u8), Vec<usize>> = HashMap::new();
        for (pos, msg) in messages.iter().enumerate() {
            if !msg.is_request {
                continue;
            }
            let Some(sid) = msg.service_byte() else {
                continue;
            };
            positions
                .entry((msg.target_addr.clone(), sid))
                .or_default()
                .push(pos);
        }
        Self { positions }
    }

    /// Nearest request position strictly before `position` for the
    /// given ECU and service.
    pub fn nearest_before(&self, ecu: &str, service: u8, position: usize) -> Option<usize> {
        let bucket = self.positions.get(&(ecu.to_string(), service))?;
        let idx = bucket.partition_point(|&p| p < position);
        (idx > 0).then(|| bucket[idx - 1])
    }
}

/// The recovered target of a rejected request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTarget {
    /// DID or routine ID, upper-hex
    pub identifier: String,
    /// Which knowledge namespace the identifier belongs to
    pub kind: KnowledgeKind,
    /// Name from the knowledge store, when one is registered
    pub name: Option<String>,
    /// Capture position of the matched request
    pub request_position: usize,
}

/// Recover the DID or routine a negative response rejected.
///
/// Only Read DID (0x22), Write DID (0x2E) and Routine Control (0x31)
/// rejections carry a recoverable identifier. `None` when the message
/// at `position` is not such a 0x7F response or no matching prior
/// request exists; the caller's rejected-service/NRC rendering does
/// not depend on this succeeding.
pub fn resolve_rejected_target(
    messages: &[RawMessage],
    index: &RequestIndex,
    position: usize,
    knowledge: &KnowledgeStore,
) -> Option<ResolvedTarget> {
    let msg = messages.get(position)?;
    let bytes = msg.payload_bytes();
    if msg.is_request || bytes.first() != Some(&service_id::NEGATIVE_RESPONSE) {
        return None;
    }

    let rejected = *bytes.get(1)?;
    let kind = match rejected {
        service_id::READ_DATA_BY_ID | service_id::WRITE_DATA_BY_ID => KnowledgeKind::Did,
        service_id::ROUTINE_CONTROL => KnowledgeKind::Routine,
        _ => return None,
    };

    // The rejected request went to the ECU now responding
    let request_position = index.nearest_before(&msg.source_addr, rejected, position)?;
    let request = &messages[request_position];

    // DID sits right after the service byte; the routine ID follows
    // the routine-control sub-function byte
    let identifier = match kind {
        KnowledgeKind::Routine => request.payload_hex.get(4..8),
        _ => request.payload_hex.get(2..6),
    }?
    .to_string();

    let name = knowledge.resolve(kind, &identifier).map(String::from);
    if name.is_none() {
        debug!(%identifier, ?kind, "rejected target not in knowledge base");
    }

    Some(ResolvedTarget {
        identifier,
        kind,
        name,
        request_position,
    })
}
