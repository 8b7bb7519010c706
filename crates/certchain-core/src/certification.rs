// Certification workflow
//
// Per-record certificate data and the audit state machine:
//
//   Applied -> QmsUploaded -> Audited1 -> Audited2 (closed)
//
// The book only enforces step ordering and slot bounds. Caller identity and
// escrow custody are checked by the registry before a transition is applied.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use certchain_error::{RegistryError, RegistryResult};
use certchain_types::{Address, ContentHash, Timestamp, TokenId};

/// Workflow progress of one certificate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CertStage {
    /// Application recorded, no QMS document yet
    Applied,
    /// QMS document hash recorded
    QmsUploaded,
    /// First audit report recorded
    Audited1,
    /// Second audit report recorded; no further audits
    Audited2,
}

impl CertStage {
    /// Whether the audit slots are exhausted
    pub fn is_closed(&self) -> bool {
        matches!(self, CertStage::Audited2)
    }
}

impl fmt::Display for CertStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CertStage::Applied => "applied",
            CertStage::QmsUploaded => "qms_uploaded",
            CertStage::Audited1 => "audited_1",
            CertStage::Audited2 => "audited_2",
        };
        write!(f, "{}", name)
    }
}

/// Certificate data captured at application time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Certificate {
    pub application_timestamp: Timestamp,
    pub cost: u64,
    pub auditor: Address,
    pub company: Address,
    pub standard: String,
    pub agency: String,
    /// Empty until the company uploads its QMS document
    pub qms_hash: ContentHash,
}

/// One filled audit slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AuditSlot {
    pub timestamp: Timestamp,
    pub report_hash: ContentHash,
}

/// Both audit slots, zero-valued where unfilled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CertAudit {
    pub first: AuditSlot,
    pub second: AuditSlot,
}

/// Which audit slot a report landed in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditRound {
    First,
    Second,
}

/// Certificate plus its workflow state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CertificateEntry {
    pub certificate: Certificate,
    pub stage: CertStage,
    pub audits: CertAudit,
}

impl CertificateEntry {
    fn new(certificate: Certificate) -> Self {
        Self {
            certificate,
            stage: CertStage::Applied,
            audits: CertAudit::default(),
        }
    }

    /// Check that an audit is allowed and return the slot it would fill.
    pub fn check_audit(&self, id: TokenId) -> RegistryResult<AuditRound> {
        match self.stage {
            CertStage::Applied => Err(RegistryError::PreconditionFailed(format!(
                "token {} has no QMS document uploaded",
                id
            ))),
            CertStage::QmsUploaded => Ok(AuditRound::First),
            CertStage::Audited1 => Ok(AuditRound::Second),
            CertStage::Audited2 => Err(RegistryError::SlotsExhausted(format!(
                "token {} has already been audited twice",
                id
            ))),
        }
    }

    fn record_qms(&mut self, hash: ContentHash) {
        self.certificate.qms_hash = hash;
        if self.stage == CertStage::Applied {
            self.stage = CertStage::QmsUploaded;
        }
    }

    fn record_audit(&mut self, round: AuditRound, slot: AuditSlot) {
        match round {
            AuditRound::First => {
                self.audits.first = slot;
                self.stage = CertStage::Audited1;
            }
            AuditRound::Second => {
                self.audits.second = slot;
                self.stage = CertStage::Audited2;
            }
        }
    }
}

/// Certificates keyed by record id.
///
/// Entries outlive the record they describe: burned ids are never reissued,
/// so audit history stays readable.
#[derive(Debug, Clone, Default)]
pub struct CertificateBook {
    entries: HashMap<TokenId, CertificateEntry>,
}

impl CertificateBook {
    /// Create an empty book
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a new application for `id`
    pub fn open(&mut self, id: TokenId, certificate: Certificate) {
        self.entries.insert(id, CertificateEntry::new(certificate));
    }

    /// Entry for `id`, if a certificate was ever opened for it
    pub fn entry(&self, id: TokenId) -> Option<&CertificateEntry> {
        self.entries.get(&id)
    }

    /// Entry for `id`, failing with `NotFound`
    pub fn require(&self, id: TokenId) -> RegistryResult<&CertificateEntry> {
        self.entry(id)
            .ok_or_else(|| RegistryError::NotFound(format!("no certificate for token {}", id)))
    }

    /// Store the QMS document hash. Accepted at every stage; a re-upload
    /// overwrites the hash without moving the stage.
    pub fn upload_qms(&mut self, id: TokenId, hash: ContentHash) -> RegistryResult<CertStage> {
        let entry = self
            .entries
            .get_mut(&id)
            .ok_or_else(|| RegistryError::NotFound(format!("no certificate for token {}", id)))?;
        entry.record_qms(hash);
        Ok(entry.stage)
    }

    /// Fill the next audit slot. Preconditions must already be checked.
    pub fn audit(&mut self, id: TokenId, slot: AuditSlot) -> RegistryResult<AuditRound> {
        let entry = self
            .entries
            .get_mut(&id)
            .ok_or_else(|| RegistryError::NotFound(format!("no certificate for token {}", id)))?;
        let round = entry.check_audit(id)?;
        entry.record_audit(round, slot);
        Ok(round)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn certificate() -> Certificate {
        Certificate {
            application_timestamp: 100,
            cost: 10,
            auditor: Address::from("auditor"),
            company: Address::from("company"),
            standard: "ISO 9001".into(),
            agency: "agency".into(),
            qms_hash: ContentHash::empty(),
        }
    }

    fn slot(timestamp: Timestamp, report: &str) -> AuditSlot {
        AuditSlot {
            timestamp,
            report_hash: ContentHash::of(report),
        }
    }

    #[test]
    fn test_stage_progression() {
        let id = TokenId::new(1);
        let mut book = CertificateBook::new();
        book.open(id, certificate());
        assert_eq!(book.entry(id).unwrap().stage, CertStage::Applied);

        assert!(matches!(
            book.audit(id, slot(1, "early")),
            Err(RegistryError::PreconditionFailed(_))
        ));

        assert_eq!(book.upload_qms(id, ContentHash::of("QMS")).unwrap(), CertStage::QmsUploaded);
        assert_eq!(book.audit(id, slot(2, "r1")).unwrap(), AuditRound::First);
        assert_eq!(book.audit(id, slot(3, "r2")).unwrap(), AuditRound::Second);
        assert!(book.entry(id).unwrap().stage.is_closed());

        assert!(matches!(
            book.audit(id, slot(4, "r3")),
            Err(RegistryError::SlotsExhausted(_))
        ));

        let audits = book.entry(id).unwrap().audits;
        assert_eq!(audits.first, slot(2, "r1"));
        assert_eq!(audits.second, slot(3, "r2"));
    }

    #[test]
    fn test_reupload_keeps_stage() {
        let id = TokenId::new(1);
        let mut book = CertificateBook::new();
        book.open(id, certificate());
        book.upload_qms(id, ContentHash::of("v1")).unwrap();
        book.audit(id, slot(2, "r1")).unwrap();

        assert_eq!(book.upload_qms(id, ContentHash::of("v2")).unwrap(), CertStage::Audited1);
        assert_eq!(book.entry(id).unwrap().certificate.qms_hash, ContentHash::of("v2"));
    }

    #[test]
    fn test_missing_certificate() {
        let book = CertificateBook::new();
        assert!(matches!(book.require(TokenId::new(9)), Err(RegistryError::NotFound(_))));
    }
}
