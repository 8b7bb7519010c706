//! Approvals, transfers and safe transfers

use std::sync::{Arc, Mutex};

use pretty_assertions::assert_eq;

use certchain_core::{
    Address, CertRegistry, FixedClock, FixedReceiver, RegistryConfig, RegistryError,
    RegistryEvent, TokenId, TokenReceiver, RECEIVER_ACCEPTED,
};

fn registry() -> CertRegistry {
    CertRegistry::new(
        RegistryConfig::with_owner("registry-owner"),
        Arc::new(FixedClock::new(0)),
    )
    .unwrap()
}

fn alice() -> Address {
    Address::from("alice")
}

fn bob() -> Address {
    Address::from("bob")
}

fn carol() -> Address {
    Address::from("carol")
}

/// Receiver that records every callback it sees
#[derive(Default)]
struct RecordingReceiver {
    calls: Mutex<Vec<(Address, Address, TokenId, Vec<u8>)>>,
}

impl TokenReceiver for RecordingReceiver {
    fn on_token_received(
        &self,
        operator: &Address,
        from: &Address,
        id: TokenId,
        data: &[u8],
    ) -> Result<[u8; 4], String> {
        self.calls
            .lock()
            .map_err(|e| e.to_string())?
            .push((operator.clone(), from.clone(), id, data.to_vec()));
        Ok(RECEIVER_ACCEPTED)
    }
}

#[test]
fn test_owner_transfer_moves_indices() {
    let mut registry = registry();
    let id = registry.mint(&alice()).unwrap();

    registry.transfer_from(&alice(), &alice(), &bob(), id).unwrap();

    assert_eq!(registry.owner_of(id).unwrap(), bob());
    assert_eq!(registry.balance_of(&alice()).unwrap(), 0);
    assert_eq!(registry.balance_of(&bob()).unwrap(), 1);
    assert_eq!(registry.token_of_owner_by_index(&bob(), 0).unwrap(), id);
    assert_eq!(
        registry.events().last(),
        Some(&RegistryEvent::OwnershipChanged {
            from: alice(),
            to: bob(),
            id,
        })
    );
    registry.check_invariants().unwrap();
}

#[test]
fn test_transfer_rejections_leave_state_untouched() {
    let mut registry = registry();
    let id = registry.mint(&alice()).unwrap();
    let before = registry.events().len();

    assert!(matches!(
        registry.transfer_from(&alice(), &alice(), &Address::zero(), id),
        Err(RegistryError::InvalidRecipient(_))
    ));
    assert!(matches!(
        registry.transfer_from(&alice(), &alice(), &bob(), TokenId::new(5)),
        Err(RegistryError::NotFound(_))
    ));
    assert!(matches!(
        registry.transfer_from(&alice(), &bob(), &carol(), id),
        Err(RegistryError::OwnershipMismatch(_))
    ));
    assert!(matches!(
        registry.transfer_from(&bob(), &alice(), &carol(), id),
        Err(RegistryError::Unauthorized(_))
    ));

    assert_eq!(registry.owner_of(id).unwrap(), alice());
    assert_eq!(registry.events().len(), before);
}

#[test]
fn test_approved_spender_transfer_clears_approval() {
    let mut registry = registry();
    let id = registry.mint(&alice()).unwrap();

    registry.approve(&alice(), &bob(), id).unwrap();
    assert_eq!(registry.get_approved(id).unwrap(), bob());
    assert!(registry.is_approved_or_owner(&bob(), id).unwrap());

    registry.transfer_from(&bob(), &alice(), &carol(), id).unwrap();

    assert_eq!(registry.owner_of(id).unwrap(), carol());
    assert!(registry.get_approved(id).unwrap().is_zero());
    assert!(!registry.is_approved_or_owner(&bob(), id).unwrap());
}

#[test]
fn test_operator_transfer() {
    let mut registry = registry();
    let operator = Address::from("operator");
    let id = registry.mint(&alice()).unwrap();

    registry.set_approval_for_all(&alice(), &operator, true).unwrap();
    assert!(registry.is_approved_for_all(&alice(), &operator).unwrap());

    registry.transfer_from(&operator, &alice(), &bob(), id).unwrap();

    assert_eq!(registry.owner_of(id).unwrap(), bob());
    assert!(registry.get_approved(id).unwrap().is_zero());
    assert!(!registry.is_approved_or_owner(&operator, id).unwrap());

    registry.set_approval_for_all(&alice(), &operator, false).unwrap();
    assert!(!registry.is_approved_for_all(&alice(), &operator).unwrap());
}

#[test]
fn test_approve_rules() {
    let mut registry = registry();
    let id = registry.mint(&alice()).unwrap();

    assert!(matches!(
        registry.approve(&bob(), &carol(), id),
        Err(RegistryError::Unauthorized(_))
    ));
    assert!(matches!(
        registry.approve(&alice(), &Address::zero(), id),
        Err(RegistryError::InvalidRecipient(_))
    ));
    assert!(matches!(
        registry.approve(&alice(), &bob(), TokenId::new(9)),
        Err(RegistryError::NotFound(_))
    ));
    assert!(matches!(
        registry.get_approved(TokenId::new(9)),
        Err(RegistryError::NotFound(_))
    ));
    assert!(matches!(
        registry.set_approval_for_all(&alice(), &Address::zero(), true),
        Err(RegistryError::InvalidRecipient(_))
    ));
    assert!(matches!(
        registry.is_approved_for_all(&Address::zero(), &bob()),
        Err(RegistryError::InvalidRecipient(_))
    ));
}

#[test]
fn test_is_approved_or_owner() {
    let mut registry = registry();
    let operator = Address::from("operator");
    let id = registry.mint(&alice()).unwrap();

    assert_eq!(registry.is_approved_or_owner(&alice(), id), Ok(true));
    assert_eq!(registry.is_approved_or_owner(&bob(), id), Ok(false));

    registry.approve(&alice(), &bob(), id).unwrap();
    assert_eq!(registry.is_approved_or_owner(&bob(), id), Ok(true));

    registry.set_approval_for_all(&alice(), &operator, true).unwrap();
    assert_eq!(registry.is_approved_or_owner(&operator, id), Ok(true));
    assert_eq!(registry.is_approved_or_owner(&carol(), id), Ok(false));

    assert!(matches!(
        registry.is_approved_or_owner(&Address::zero(), id),
        Err(RegistryError::InvalidRecipient(_))
    ));
    assert!(matches!(
        registry.is_approved_or_owner(&alice(), TokenId::new(9)),
        Err(RegistryError::NotFound(_))
    ));
}

#[test]
fn test_is_approved_for_all_rejects_sentinels() {
    let registry = registry();

    assert_eq!(registry.is_approved_for_all(&alice(), &bob()), Ok(false));
    assert!(matches!(
        registry.is_approved_for_all(&alice(), &Address::zero()),
        Err(RegistryError::InvalidRecipient(_))
    ));
    assert!(matches!(
        registry.is_approved_for_all(&Address::zero(), &Address::zero()),
        Err(RegistryError::InvalidRecipient(_))
    ));
}

#[test]
fn test_clear_approval_is_idempotent() {
    let mut registry = registry();
    let id = registry.mint(&alice()).unwrap();
    registry.take_events();

    assert_eq!(registry.clear_approval(&alice(), id), Ok(false));
    assert_eq!(registry.clear_approval(&alice(), id), Ok(false));
    assert!(registry.events().is_empty());

    registry.approve(&alice(), &bob(), id).unwrap();
    assert_eq!(registry.clear_approval(&alice(), id), Ok(true));
    assert_eq!(
        registry.take_events(),
        vec![
            RegistryEvent::ApprovalSet {
                owner: alice(),
                approved: bob(),
                id,
            },
            RegistryEvent::ApprovalSet {
                owner: alice(),
                approved: Address::zero(),
                id,
            },
        ]
    );

    assert!(matches!(
        registry.clear_approval(&bob(), id),
        Err(RegistryError::Unauthorized(_))
    ));
}

#[test]
fn test_burn_by_approved_spender_clears_approval() {
    let mut registry = registry();
    let id = registry.mint(&alice()).unwrap();
    registry.approve(&alice(), &bob(), id).unwrap();

    registry.burn(&bob(), id).unwrap();

    assert!(!registry.exists(id));
    registry.check_invariants().unwrap();
}

#[test]
fn test_safe_transfer_to_plain_account() {
    let mut registry = registry();
    let id = registry.mint(&alice()).unwrap();

    registry.safe_transfer_from(&alice(), &alice(), &bob(), id).unwrap();
    assert_eq!(registry.owner_of(id).unwrap(), bob());
}

#[test]
fn test_safe_transfer_passes_callback_arguments() {
    let mut registry = registry();
    let vault = Address::from("vault");
    let receiver = Arc::new(RecordingReceiver::default());
    registry.register_receiver(vault.clone(), receiver.clone());

    let id = registry.mint(&alice()).unwrap();
    registry.approve(&alice(), &bob(), id).unwrap();
    registry
        .safe_transfer_from_with_data(&bob(), &alice(), &vault, id, b"hello")
        .unwrap();

    assert_eq!(registry.owner_of(id).unwrap(), vault);
    assert_eq!(
        *receiver.calls.lock().unwrap(),
        vec![(bob(), alice(), id, b"hello".to_vec())]
    );
}

#[test]
fn test_safe_transfer_rejected_by_receiver() {
    let mut registry = registry();
    let refuser = Address::from("refuser");
    let confused = Address::from("confused");
    registry.register_receiver(refuser.clone(), Arc::new(FixedReceiver::Reject("no thanks".into())));
    registry.register_receiver(confused.clone(), Arc::new(FixedReceiver::Answer([0, 0, 0, 0])));

    let id = registry.mint(&alice()).unwrap();
    let before = registry.events().len();

    assert!(matches!(
        registry.safe_transfer_from(&alice(), &alice(), &refuser, id),
        Err(RegistryError::RecipientRejected(_))
    ));
    assert!(matches!(
        registry.safe_transfer_from(&alice(), &alice(), &confused, id),
        Err(RegistryError::RecipientRejected(_))
    ));

    assert_eq!(registry.owner_of(id).unwrap(), alice());
    assert_eq!(registry.events().len(), before);

    registry.transfer_from(&alice(), &alice(), &refuser, id).unwrap();
    assert_eq!(registry.owner_of(id).unwrap(), refuser);

    assert!(registry.unregister_receiver(&confused));
}
