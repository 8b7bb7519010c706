// Safe-transfer recipients
//
// An identity may register a `TokenReceiver`. Safe transfers to such an
// identity call `on_token_received` synchronously, before any state changes,
// and abort unless it answers with `RECEIVER_ACCEPTED`. Identities with no
// registered receiver are plain accounts and accept everything.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use certchain_error::{RegistryError, RegistryResult};
use certchain_types::{Address, TokenId};

/// Acknowledgment a receiver must return to accept a record
pub const RECEIVER_ACCEPTED: [u8; 4] = [0x15, 0x0b, 0x7a, 0x02];

/// Capability of an identity to accept or refuse incoming records
pub trait TokenReceiver: Send + Sync {
    /// Called during a safe transfer of `id` from `from` by `operator`.
    ///
    /// Return `Ok(RECEIVER_ACCEPTED)` to accept. Any other value, or an error,
    /// rejects the transfer.
    fn on_token_received(
        &self,
        operator: &Address,
        from: &Address,
        id: TokenId,
        data: &[u8],
    ) -> Result<[u8; 4], String>;
}

/// Receivers registered per identity
#[derive(Default, Clone)]
pub struct ReceiverBook {
    receivers: HashMap<Address, Arc<dyn TokenReceiver>>,
}

impl ReceiverBook {
    /// Create an empty book
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `receiver` for `address`, replacing any previous one
    pub fn register(&mut self, address: Address, receiver: Arc<dyn TokenReceiver>) {
        self.receivers.insert(address, receiver);
    }

    /// Remove the receiver of `address`
    pub fn unregister(&mut self, address: &Address) -> bool {
        self.receivers.remove(address).is_some()
    }

    /// Whether `address` implements the receiver capability
    pub fn is_receiver(&self, address: &Address) -> bool {
        self.receivers.contains_key(address)
    }

    /// Ask the recipient to accept `id`. Plain accounts always accept.
    pub fn check_acceptance(
        &self,
        operator: &Address,
        from: &Address,
        to: &Address,
        id: TokenId,
        data: &[u8],
    ) -> RegistryResult<()> {
        let receiver = match self.receivers.get(to) {
            Some(receiver) => receiver,
            None => return Ok(()),
        };

        match receiver.on_token_received(operator, from, id, data) {
            Ok(ack) if ack == RECEIVER_ACCEPTED => Ok(()),
            Ok(ack) => Err(RegistryError::RecipientRejected(format!(
                "{} answered 0x{:02x}{:02x}{:02x}{:02x} for token {}",
                to, ack[0], ack[1], ack[2], ack[3], id
            ))),
            Err(reason) => Err(RegistryError::RecipientRejected(format!(
                "{} refused token {}: {}",
                to, id, reason
            ))),
        }
    }
}

impl fmt::Debug for ReceiverBook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReceiverBook")
            .field("receivers", &self.receivers.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// A receiver with a fixed answer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FixedReceiver {
    /// Always acknowledges correctly
    Accept,
    /// Always fails with the given reason
    Reject(String),
    /// Always answers with the given (wrong) acknowledgment
    Answer([u8; 4]),
}

impl TokenReceiver for FixedReceiver {
    fn on_token_received(
        &self,
        _operator: &Address,
        _from: &Address,
        _id: TokenId,
        _data: &[u8],
    ) -> Result<[u8; 4], String> {
        match self {
            FixedReceiver::Accept => Ok(RECEIVER_ACCEPTED),
            FixedReceiver::Reject(reason) => Err(reason.clone()),
            FixedReceiver::Answer(ack) => Ok(*ack),
        }
    }
}
