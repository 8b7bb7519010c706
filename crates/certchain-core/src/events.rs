// Registry notifications
//
// Every successful mutation appends fixed-payload events to the log. A
// rejected operation appends nothing.

use serde::{Deserialize, Serialize};

use certchain_types::{Address, TokenId};

/// A notification emitted by a registry mutation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum RegistryEvent {
    /// Mint (`from` is the sentinel), transfer, or burn (`to` is the sentinel)
    OwnershipChanged {
        from: Address,
        to: Address,
        id: TokenId,
    },
    /// Approve, or clear approval (`approved` is the sentinel)
    ApprovalSet {
        owner: Address,
        approved: Address,
        id: TokenId,
    },
    /// Operator grant or revocation
    OperatorApprovalSet {
        owner: Address,
        operator: Address,
        approved: bool,
    },
    /// Record destroyed
    RecordBurned { owner: Address, id: TokenId },
    /// Certification requested
    CertificateApplied {
        company: Address,
        auditor: Address,
        id: TokenId,
    },
}

impl RegistryEvent {
    /// Short event name, used in logs
    pub fn name(&self) -> &'static str {
        match self {
            RegistryEvent::OwnershipChanged { .. } => "OwnershipChanged",
            RegistryEvent::ApprovalSet { .. } => "ApprovalSet",
            RegistryEvent::OperatorApprovalSet { .. } => "OperatorApprovalSet",
            RegistryEvent::RecordBurned { .. } => "RecordBurned",
            RegistryEvent::CertificateApplied { .. } => "CertificateApplied",
        }
    }
}

/// Append-only event log
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Vec<RegistryEvent>,
}

impl EventLog {
    /// Create an empty log
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an event
    pub fn emit(&mut self, event: RegistryEvent) {
        tracing::trace!(event = event.name(), "emitting event");
        self.events.push(event);
    }

    /// Every event emitted since creation or the last drain
    pub fn all(&self) -> &[RegistryEvent] {
        &self.events
    }

    /// Remove and return every event
    pub fn drain(&mut self) -> Vec<RegistryEvent> {
        std::mem::take(&mut self.events)
    }

    /// Number of buffered events
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether no events are buffered
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
