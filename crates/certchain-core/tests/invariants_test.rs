//! Index consistency under random operation sequences

use std::sync::Arc;

use proptest::prelude::*;

use certchain_core::{Address, CertRegistry, FixedClock, RegistryConfig, TokenId};

const HOLDERS: [&str; 4] = ["alice", "bob", "carol", "dave"];

#[derive(Debug, Clone)]
enum Op {
    Mint(usize),
    Transfer(u64, usize),
    Burn(u64),
    Approve(u64, usize),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0..HOLDERS.len()).prop_map(Op::Mint),
        (1..12u64, 0..HOLDERS.len()).prop_map(|(id, to)| Op::Transfer(id, to)),
        (1..12u64).prop_map(Op::Burn),
        (1..12u64, 0..HOLDERS.len()).prop_map(|(id, to)| Op::Approve(id, to)),
    ]
}

proptest! {
    #[test]
    fn prop_indices_stay_consistent(ops in prop::collection::vec(op(), 1..60)) {
        let mut registry = CertRegistry::new(
            RegistryConfig::with_owner("registry-owner"),
            Arc::new(FixedClock::new(0)),
        )
        .unwrap();

        for op in ops {
            // Rejected operations are expected; only consistency matters here.
            match op {
                Op::Mint(to) => {
                    let _ = registry.mint(&Address::from(HOLDERS[to]));
                }
                Op::Transfer(id, to) => {
                    let id = TokenId::new(id);
                    if let Ok(owner) = registry.owner_of(id) {
                        let _ = registry.transfer_from(&owner, &owner, &Address::from(HOLDERS[to]), id);
                        prop_assert!(registry.get_approved(id).unwrap().is_zero());
                    }
                }
                Op::Burn(id) => {
                    let id = TokenId::new(id);
                    if let Ok(owner) = registry.owner_of(id) {
                        registry.burn(&owner, id).unwrap();
                        prop_assert!(!registry.exists(id));
                    }
                }
                Op::Approve(id, spender) => {
                    let id = TokenId::new(id);
                    if let Ok(owner) = registry.owner_of(id) {
                        let _ = registry.approve(&owner, &Address::from(HOLDERS[spender]), id);
                    }
                }
            }
            prop_assert_eq!(registry.check_invariants(), Ok(()));
        }

        let held: usize = HOLDERS
            .iter()
            .map(|holder| registry.balance_of(&Address::from(*holder)).unwrap())
            .sum();
        prop_assert_eq!(held, registry.total_supply());
    }
}
