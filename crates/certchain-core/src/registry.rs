// Certificate registry
//
// The public operation surface. Every mutating operation validates all of
// its preconditions before touching state, so a rejected call leaves the
// registry, including its event log, exactly as it was.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use tracing::{debug, info};

use certchain_error::{ensure, CertChainError, RegistryError, RegistryResult};
use certchain_types::{Address, ContentHash, InterfaceId, TokenId};

use crate::access::{require_participant, AccessControl};
use crate::approval::{Approvals, SpenderRole};
use crate::certification::{AuditRound, AuditSlot, CertAudit, CertStage, Certificate, CertificateBook, CertificateEntry};
use crate::config::RegistryConfig;
use crate::events::{EventLog, RegistryEvent};
use crate::interface::SupportedInterfaces;
use crate::ownership::OwnershipRegistry;
use crate::receiver::{ReceiverBook, TokenReceiver};
use crate::time::{Clock, SystemClock};

/// Registry of certificate records, their owners and the certification workflow
pub struct CertRegistry {
    config: RegistryConfig,
    access: AccessControl,
    clock: Arc<dyn Clock>,
    ownership: OwnershipRegistry,
    approvals: Approvals,
    certificates: CertificateBook,
    receivers: ReceiverBook,
    interfaces: SupportedInterfaces,
    events: EventLog,
}

impl CertRegistry {
    /// Create an empty registry.
    ///
    /// The registry owner named in `config` is fixed for the registry's lifetime.
    /// A sentinel owner fails with `InvalidRecipient`; any other invalid field
    /// fails with `InvalidArgument`.
    pub fn new(config: RegistryConfig, clock: Arc<dyn Clock>) -> RegistryResult<Self> {
        let access = AccessControl::new(config.registry_owner.clone())?;
        config
            .validate()
            .map_err(|e| RegistryError::InvalidArgument(e.to_string()))?;
        info!(
            name = %config.name,
            symbol = %config.symbol,
            registry_owner = %access.registry_owner(),
            "created registry"
        );
        Ok(Self {
            config,
            access,
            clock,
            ownership: OwnershipRegistry::new(),
            approvals: Approvals::new(),
            certificates: CertificateBook::new(),
            receivers: ReceiverBook::new(),
            interfaces: SupportedInterfaces::registry_defaults(),
            events: EventLog::new(),
        })
    }

    /// Create an empty registry reading wall-clock time
    pub fn with_system_clock(config: RegistryConfig) -> RegistryResult<Self> {
        Self::new(config, Arc::new(SystemClock))
    }

    //-------------------------------------------------------------------------
    // Metadata
    //-------------------------------------------------------------------------

    /// Collection name
    pub fn name(&self) -> &str {
        &self.config.name
    }

    /// Collection symbol
    pub fn symbol(&self) -> &str {
        &self.config.symbol
    }

    /// Display decimals
    pub fn decimals(&self) -> u8 {
        self.config.decimals
    }

    /// Identity holding records in escrow
    pub fn registry_owner(&self) -> &Address {
        self.access.registry_owner()
    }

    /// Metadata URI of `id`, empty by default
    pub fn token_uri(&self, id: TokenId) -> RegistryResult<String> {
        self.ownership.token_uri(id).map(str::to_string)
    }

    /// Whether the registry advertises capability group `id`
    pub fn supports_interface(&self, id: InterfaceId) -> RegistryResult<bool> {
        self.interfaces.supports(id)
    }

    //-------------------------------------------------------------------------
    // Ownership queries
    //-------------------------------------------------------------------------

    /// Number of existing records
    pub fn total_supply(&self) -> usize {
        self.ownership.total_supply()
    }

    /// Number of records held by `owner`
    pub fn balance_of(&self, owner: &Address) -> RegistryResult<usize> {
        self.ownership.balance_of(owner)
    }

    /// Current owner of `id`
    pub fn owner_of(&self, id: TokenId) -> RegistryResult<Address> {
        self.ownership.owner_of(id).cloned()
    }

    /// Whether `id` currently exists
    pub fn exists(&self, id: TokenId) -> bool {
        self.ownership.exists(id)
    }

    /// The `index`-th record held by `owner`
    pub fn token_of_owner_by_index(&self, owner: &Address, index: usize) -> RegistryResult<TokenId> {
        self.ownership.token_of_owner_by_index(owner, index)
    }

    /// The `index`-th existing record
    pub fn token_by_index(&self, index: usize) -> RegistryResult<TokenId> {
        self.ownership.token_by_index(index)
    }

    //-------------------------------------------------------------------------
    // Approval queries
    //-------------------------------------------------------------------------

    /// Approved spender of `id`, or the sentinel if there is none
    pub fn get_approved(&self, id: TokenId) -> RegistryResult<Address> {
        self.ownership.owner_of(id)?;
        Ok(self.approvals.approved(id).cloned().unwrap_or_else(Address::zero))
    }

    /// Whether `operator` holds a blanket grant from `owner`
    pub fn is_approved_for_all(&self, owner: &Address, operator: &Address) -> RegistryResult<bool> {
        require_participant(owner, "owner")?;
        require_participant(operator, "operator")?;
        Ok(self.approvals.is_operator(owner, operator))
    }

    /// Whether `who` may move or burn `id`
    pub fn is_approved_or_owner(&self, who: &Address, id: TokenId) -> RegistryResult<bool> {
        require_participant(who, "spender")?;
        let owner = self.ownership.owner_of(id)?;
        Ok(self.approvals.role_of(who, owner, id).is_some())
    }

    //-------------------------------------------------------------------------
    // Certificate queries
    //-------------------------------------------------------------------------

    /// Certificate data of an existing record
    pub fn get_cert_data(&self, id: TokenId) -> RegistryResult<Certificate> {
        self.ownership.owner_of(id)?;
        Ok(self.certificates.require(id)?.certificate.clone())
    }

    /// Audit slots of `id`, zero-valued where unfilled.
    ///
    /// Burned records keep their audit history; only never-issued ids fail.
    pub fn get_cert_audit(&self, id: TokenId) -> RegistryResult<CertAudit> {
        ensure!(
            self.ownership.was_issued(id),
            RegistryError::NotFound(format!("token {} was never issued", id))
        );
        Ok(self
            .certificates
            .entry(id)
            .map(|entry| entry.audits)
            .unwrap_or_default())
    }

    /// Workflow stage of `id`
    pub fn cert_stage(&self, id: TokenId) -> RegistryResult<CertStage> {
        Ok(self.certificates.require(id)?.stage)
    }

    /// Full certificate entry of `id`, including burned records
    pub fn certificate_entry(&self, id: TokenId) -> Option<&CertificateEntry> {
        self.certificates.entry(id)
    }

    //-------------------------------------------------------------------------
    // Events
    //-------------------------------------------------------------------------

    /// Every event emitted since creation or the last `take_events`
    pub fn events(&self) -> &[RegistryEvent] {
        self.events.all()
    }

    /// Remove and return every buffered event
    pub fn take_events(&mut self) -> Vec<RegistryEvent> {
        self.events.drain()
    }

    //-------------------------------------------------------------------------
    // Receivers
    //-------------------------------------------------------------------------

    /// Give `address` the receiver capability used by safe transfers
    pub fn register_receiver(&mut self, address: Address, receiver: Arc<dyn TokenReceiver>) {
        debug!(address = %address, "registered receiver");
        self.receivers.register(address, receiver);
    }

    /// Remove the receiver capability from `address`
    pub fn unregister_receiver(&mut self, address: &Address) -> bool {
        self.receivers.unregister(address)
    }

    //-------------------------------------------------------------------------
    // Issuance
    //-------------------------------------------------------------------------

    /// Issue a bare record to `to`, with no certificate attached
    pub fn mint(&mut self, to: &Address) -> RegistryResult<TokenId> {
        let id = self
            .ownership
            .mint(to)
            .map_err(|e| rejected("mint", to, e))?;
        self.events.emit(RegistryEvent::OwnershipChanged {
            from: Address::zero(),
            to: to.clone(),
            id,
        });
        Ok(id)
    }

    /// Set the metadata URI of `id`. Registry owner only.
    pub fn set_token_uri(&mut self, caller: &Address, id: TokenId, uri: &str) -> RegistryResult<()> {
        self.try_set_token_uri(caller, id, uri)
            .map_err(|e| rejected("set_token_uri", caller, e))
    }

    fn try_set_token_uri(&mut self, caller: &Address, id: TokenId, uri: &str) -> RegistryResult<()> {
        self.ownership.owner_of(id)?;
        ensure!(
            self.access.is_registry_owner(caller),
            RegistryError::Unauthorized(format!("{} cannot set the URI of token {}", caller, id))
        );
        self.ownership.set_token_uri(id, uri)?;
        debug!(id = %id, uri = uri, "set token uri");
        Ok(())
    }

    //-------------------------------------------------------------------------
    // Certification workflow
    //-------------------------------------------------------------------------

    /// Apply for certification as `caller` (the company).
    ///
    /// Mints a record held in escrow by the registry owner and opens its certificate.
    pub fn apply(
        &mut self,
        caller: &Address,
        standard: &str,
        agency: &str,
        cost: u64,
        auditor: &Address,
    ) -> RegistryResult<TokenId> {
        self.try_apply(caller, standard, agency, cost, auditor)
            .map_err(|e| rejected("apply", caller, e))
    }

    fn try_apply(
        &mut self,
        caller: &Address,
        standard: &str,
        agency: &str,
        cost: u64,
        auditor: &Address,
    ) -> RegistryResult<TokenId> {
        ensure!(
            cost > 0,
            RegistryError::InvalidAmount("certificate cost must be positive".into())
        );
        require_participant(auditor, "auditor")?;
        ensure!(
            auditor != caller,
            RegistryError::SelfReference(format!("{} cannot audit its own certificate", caller))
        );
        self.access.require_not_registry_owner(caller)?;
        require_participant(caller, "company")?;

        let escrow = self.access.registry_owner().clone();
        let id = self.ownership.mint(&escrow)?;
        self.certificates.open(
            id,
            Certificate {
                application_timestamp: self.clock.now(),
                cost,
                auditor: auditor.clone(),
                company: caller.clone(),
                standard: standard.to_string(),
                agency: agency.to_string(),
                qms_hash: ContentHash::empty(),
            },
        );

        self.events.emit(RegistryEvent::OwnershipChanged {
            from: Address::zero(),
            to: escrow,
            id,
        });
        self.events.emit(RegistryEvent::CertificateApplied {
            company: caller.clone(),
            auditor: auditor.clone(),
            id,
        });

        info!(id = %id, company = %caller, auditor = %auditor, cost, "certificate applied");
        Ok(id)
    }

    /// Upload the QMS document for `id`. Company only, while the record is in escrow.
    pub fn upload_qms(&mut self, caller: &Address, id: TokenId, document: &[u8]) -> RegistryResult<()> {
        self.try_upload_qms(caller, id, document)
            .map_err(|e| rejected("upload_qms", caller, e))
    }

    fn try_upload_qms(&mut self, caller: &Address, id: TokenId, document: &[u8]) -> RegistryResult<()> {
        let owner = self.ownership.owner_of(id)?;
        let entry = self.certificates.require(id)?;
        ensure!(
            &entry.certificate.company == caller,
            RegistryError::Unauthorized(format!("{} is not the company of token {}", caller, id))
        );
        self.access.require_escrow(owner, &format!("token {}", id))?;

        let hash = ContentHash::of(document);
        let stage = self.certificates.upload_qms(id, hash)?;
        info!(id = %id, qms_hash = %hash, stage = %stage, "QMS uploaded");
        Ok(())
    }

    /// Record an audit report for `id`. Auditor only, while the record is in escrow.
    pub fn audit(&mut self, caller: &Address, id: TokenId, report: &[u8]) -> RegistryResult<AuditRound> {
        self.try_audit(caller, id, report)
            .map_err(|e| rejected("audit", caller, e))
    }

    fn try_audit(&mut self, caller: &Address, id: TokenId, report: &[u8]) -> RegistryResult<AuditRound> {
        let owner = self.ownership.owner_of(id)?;
        let entry = self.certificates.require(id)?;
        ensure!(
            &entry.certificate.auditor == caller,
            RegistryError::Unauthorized(format!("{} is not the auditor of token {}", caller, id))
        );
        self.access.require_escrow(owner, &format!("token {}", id))?;
        entry.check_audit(id)?;

        let slot = AuditSlot {
            timestamp: self.clock.now(),
            report_hash: ContentHash::of(report),
        };
        let report_hash = slot.report_hash;
        let round = self.certificates.audit(id, slot)?;
        info!(id = %id, round = ?round, report_hash = %report_hash, "audit recorded");
        Ok(round)
    }

    //-------------------------------------------------------------------------
    // Approvals
    //-------------------------------------------------------------------------

    /// Approve `spender` to move or burn `id`. Owner only.
    pub fn approve(&mut self, caller: &Address, spender: &Address, id: TokenId) -> RegistryResult<()> {
        self.try_approve(caller, spender, id)
            .map_err(|e| rejected("approve", caller, e))
    }

    fn try_approve(&mut self, caller: &Address, spender: &Address, id: TokenId) -> RegistryResult<()> {
        require_participant(spender, "spender")?;
        let owner = self.require_owner(caller, id)?;

        self.approvals.approve(id, spender.clone());
        self.events.emit(RegistryEvent::ApprovalSet {
            owner,
            approved: spender.clone(),
            id,
        });
        debug!(id = %id, spender = %spender, "approval set");
        Ok(())
    }

    /// Clear the approval of `id`. Owner only.
    ///
    /// Returns whether an approval was cleared; clearing an empty approval
    /// is a no-op and emits nothing.
    pub fn clear_approval(&mut self, caller: &Address, id: TokenId) -> RegistryResult<bool> {
        self.try_clear_approval(caller, id)
            .map_err(|e| rejected("clear_approval", caller, e))
    }

    fn try_clear_approval(&mut self, caller: &Address, id: TokenId) -> RegistryResult<bool> {
        let owner = self.require_owner(caller, id)?;
        if self.approvals.clear(id).is_none() {
            return Ok(false);
        }
        self.events.emit(RegistryEvent::ApprovalSet {
            owner,
            approved: Address::zero(),
            id,
        });
        debug!(id = %id, "approval cleared");
        Ok(true)
    }

    /// Grant or revoke `operator` over every current and future record of `caller`
    pub fn set_approval_for_all(
        &mut self,
        caller: &Address,
        operator: &Address,
        approved: bool,
    ) -> RegistryResult<()> {
        require_participant(operator, "operator")
            .map_err(|e| rejected("set_approval_for_all", caller, e))?;

        self.approvals.set_operator(caller, operator, approved);
        self.events.emit(RegistryEvent::OperatorApprovalSet {
            owner: caller.clone(),
            operator: operator.clone(),
            approved,
        });
        debug!(owner = %caller, operator = %operator, approved, "operator approval set");
        Ok(())
    }

    //-------------------------------------------------------------------------
    // Transfers
    //-------------------------------------------------------------------------

    /// Move `id` from `from` to `to` without consulting the recipient
    pub fn transfer_from(
        &mut self,
        caller: &Address,
        from: &Address,
        to: &Address,
        id: TokenId,
    ) -> RegistryResult<()> {
        self.try_transfer(caller, from, to, id, None)
            .map_err(|e| rejected("transfer_from", caller, e))
    }

    /// Move `id` from `from` to `to`, requiring a receiver recipient to accept it
    pub fn safe_transfer_from(
        &mut self,
        caller: &Address,
        from: &Address,
        to: &Address,
        id: TokenId,
    ) -> RegistryResult<()> {
        self.safe_transfer_from_with_data(caller, from, to, id, &[])
    }

    /// Safe transfer passing `data` to the recipient's acceptance callback
    pub fn safe_transfer_from_with_data(
        &mut self,
        caller: &Address,
        from: &Address,
        to: &Address,
        id: TokenId,
        data: &[u8],
    ) -> RegistryResult<()> {
        self.try_transfer(caller, from, to, id, Some(data))
            .map_err(|e| rejected("safe_transfer_from", caller, e))
    }

    fn try_transfer(
        &mut self,
        caller: &Address,
        from: &Address,
        to: &Address,
        id: TokenId,
        acceptance_data: Option<&[u8]>,
    ) -> RegistryResult<()> {
        require_participant(to, "recipient")?;
        let owner = self.ownership.owner_of(id)?;
        ensure!(
            owner == from,
            RegistryError::OwnershipMismatch(format!("{} does not own token {}", from, id))
        );
        let role = self.require_spender(caller, owner, id)?;

        if let Some(data) = acceptance_data {
            self.receivers.check_acceptance(caller, from, to, id, data)?;
        }

        self.ownership.reassign(from, to, id)?;
        self.approvals.clear(id);
        self.events.emit(RegistryEvent::OwnershipChanged {
            from: from.clone(),
            to: to.clone(),
            id,
        });

        info!(id = %id, from = %from, to = %to, by = %caller, role = ?role, "record transferred");
        Ok(())
    }

    //-------------------------------------------------------------------------
    // Burning
    //-------------------------------------------------------------------------

    /// Destroy `id`. Owner, approved spender or operator only.
    pub fn burn(&mut self, caller: &Address, id: TokenId) -> RegistryResult<()> {
        self.try_burn(caller, None, id)
            .map_err(|e| rejected("burn", caller, e))
    }

    /// Destroy `id`, additionally asserting that `owner` holds it
    pub fn burn_from(&mut self, caller: &Address, owner: &Address, id: TokenId) -> RegistryResult<()> {
        self.try_burn(caller, Some(owner), id)
            .map_err(|e| rejected("burn_from", caller, e))
    }

    fn try_burn(&mut self, caller: &Address, expected_owner: Option<&Address>, id: TokenId) -> RegistryResult<()> {
        let owner = self.ownership.owner_of(id)?;
        if let Some(expected) = expected_owner {
            ensure!(
                owner == expected,
                RegistryError::OwnershipMismatch(format!("{} does not own token {}", expected, id))
            );
        }
        let role = self.require_spender(caller, owner, id)?;

        let owner = self.ownership.remove(id)?;
        self.approvals.clear(id);
        self.events.emit(RegistryEvent::OwnershipChanged {
            from: owner.clone(),
            to: Address::zero(),
            id,
        });
        self.events.emit(RegistryEvent::RecordBurned {
            owner: owner.clone(),
            id,
        });

        info!(id = %id, owner = %owner, by = %caller, role = ?role, "record burned");
        Ok(())
    }

    //-------------------------------------------------------------------------
    // Authorization helpers
    //-------------------------------------------------------------------------

    fn require_owner(&self, caller: &Address, id: TokenId) -> RegistryResult<Address> {
        let owner = self.ownership.owner_of(id)?;
        ensure!(
            owner == caller,
            RegistryError::Unauthorized(format!("{} does not own token {}", caller, id))
        );
        Ok(owner.clone())
    }

    fn require_spender(&self, caller: &Address, owner: &Address, id: TokenId) -> RegistryResult<SpenderRole> {
        self.approvals.role_of(caller, owner, id).ok_or_else(|| {
            RegistryError::Unauthorized(format!(
                "{} is neither owner, approved spender nor operator of token {}",
                caller, id
            ))
        })
    }

    //-------------------------------------------------------------------------
    // Invariants
    //-------------------------------------------------------------------------

    /// Verify the consistency of the owner map, both indices and the approval table.
    ///
    /// Fails with `PreconditionFailed` describing the first violation found.
    pub fn check_invariants(&self) -> RegistryResult<()> {
        let global = self.ownership.global_index();
        ensure!(
            global.is_consistent(),
            violation("global index lookup disagrees with its sequence")
        );

        let mut seen = HashSet::new();
        let mut indexed = 0usize;
        for (owner, owned) in self.ownership.owner_indices() {
            ensure!(
                owned.is_consistent(),
                violation(format!("index of {} disagrees with its sequence", owner))
            );
            for id in owned.iter() {
                ensure!(seen.insert(id), violation(format!("token {} indexed twice", id)));
                ensure!(
                    self.ownership.owner_of(id).ok() == Some(owner),
                    violation(format!("token {} indexed under {} but owned elsewhere", id, owner))
                );
                ensure!(
                    global.contains(id),
                    violation(format!("token {} missing from the global index", id))
                );
            }
            indexed += owned.len();
        }

        let owned_records = self.ownership.owner_entries().count();
        ensure!(
            indexed == global.len() && owned_records == global.len(),
            violation(format!(
                "{} indexed by owner, {} in owner map, {} in global index",
                indexed,
                owned_records,
                global.len()
            ))
        );

        for (id, spender) in self.approvals.approved_entries() {
            ensure!(
                self.ownership.exists(*id),
                violation(format!("approval of {} outlived token {}", spender, id))
            );
        }
        Ok(())
    }
}

impl fmt::Debug for CertRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CertRegistry")
            .field("name", &self.config.name)
            .field("registry_owner", self.access.registry_owner())
            .field("total_supply", &self.ownership.total_supply())
            .field("events", &self.events.len())
            .finish()
    }
}

fn violation(detail: impl Into<String>) -> RegistryError {
    RegistryError::PreconditionFailed(format!("invariant violated: {}", detail.into()))
}

fn rejected(operation: &'static str, caller: &Address, err: RegistryError) -> RegistryError {
    debug!(
        operation,
        caller = %caller,
        code = err.error_code(),
        error = %err,
        "operation rejected"
    );
    err
}
