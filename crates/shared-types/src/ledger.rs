//! # Ledger Transactions
//!
//! Smart-contract view of a ledger transaction: an optional state block
//! anchoring a committee's state, ordered request blocks addressed to
//! contracts, and the token outputs per address.
//!
//! Transactions are content-addressed: the id is the Keccak-256 digest of the
//! bincode-encoded essence, so a `Transaction` can only be obtained through
//! `TransactionBuilder` or `Transaction::from_bytes` and is immutable after.

use crate::entities::{
    balance_of_color, keccak256, Address, Balance, Color, Hash, RequestId, TransactionId,
};
use crate::errors::{BlockValidationError, TransactionError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Maximum payload carried by one request block.
pub const MAX_REQUEST_PAYLOAD: usize = 64 * 1024;

/// Maximum number of request blocks (a block index is a `u16`).
pub const MAX_REQUESTS_PER_TX: usize = u16::MAX as usize;

/// Tags a color as the state-anchor token of one committee and commits to the
/// committee's new state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateBlock {
    pub color: Color,
    pub state_index: u32,
    /// Root digest of the committee's authenticated state.
    pub state_hash: Hash,
    pub timestamp: i64,
}

impl StateBlock {
    pub fn new(color: Color, state_index: u32, state_hash: Hash, timestamp: i64) -> Self {
        Self {
            color,
            state_index,
            state_hash,
            timestamp,
        }
    }
}

/// Invokes an entry point of the contract at `target`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestBlock {
    pub target: Address,
    pub entry_point: u16,
    pub payload: Vec<u8>,
}

impl RequestBlock {
    pub fn new(target: Address, entry_point: u16, payload: Vec<u8>) -> Self {
        Self {
            target,
            entry_point,
            payload,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
struct TransactionEssence {
    state: Option<StateBlock>,
    requests: Vec<RequestBlock>,
    outputs: BTreeMap<Address, Vec<Balance>>,
}

/// An observed ledger transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    id: TransactionId,
    essence: TransactionEssence,
}

impl Transaction {
    pub fn id(&self) -> TransactionId {
        self.id
    }

    pub fn state(&self) -> Option<&StateBlock> {
        self.essence.state.as_ref()
    }

    pub fn requests(&self) -> &[RequestBlock] {
        &self.essence.requests
    }

    /// Token outputs, ordered by address.
    pub fn outputs(&self) -> &BTreeMap<Address, Vec<Balance>> {
        &self.essence.outputs
    }

    /// Balances sent to `addr` by this transaction (empty if none).
    pub fn output_of(&self, addr: &Address) -> &[Balance] {
        self.essence
            .outputs
            .get(addr)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Id of the request block at `index`.
    pub fn request_id(&self, index: u16) -> RequestId {
        RequestId::new(self.id, index)
    }

    /// Address holding the state-anchor token, if this transaction carries a
    /// state block.
    ///
    /// The anchor token is a singleton: the first output (in address order)
    /// holding exactly one token of the state color wins. An output whose
    /// balance of that color overflows never anchors.
    pub fn state_anchor_address(&self) -> Option<Address> {
        let color = self.state()?.color;
        self.essence
            .outputs
            .iter()
            .find(|(_, balances)| balance_of_color(balances, &color) == Some(1))
            .map(|(addr, _)| *addr)
    }

    /// Structurally validate the state and request blocks against the
    /// committee at `addr`.
    pub fn validate_blocks(&self, addr: &Address) -> Result<(), BlockValidationError> {
        for (index, request) in self.essence.requests.iter().enumerate() {
            // Bounded by the builder, see `MAX_REQUESTS_PER_TX`.
            let index = index as u16;
            if request.target.is_zero() {
                return Err(BlockValidationError::ZeroTarget { index });
            }
            if request.payload.len() > MAX_REQUEST_PAYLOAD {
                return Err(BlockValidationError::PayloadTooLarge {
                    index,
                    size: request.payload.len(),
                    max: MAX_REQUEST_PAYLOAD,
                });
            }
        }

        let own = self.output_of(addr);
        let overflow = |color: Color| BlockValidationError::BalanceOverflow {
            address: *addr,
            color,
        };
        let mut minted =
            balance_of_color(own, &Color::NEW).ok_or_else(|| overflow(Color::NEW))?;

        if let Some(state) = self.state() {
            if state.color == Color::IOTA {
                return Err(BlockValidationError::BaseColorState);
            }
            let held =
                balance_of_color(own, &state.color).ok_or_else(|| overflow(state.color))?;
            if state.color == Color::NEW {
                // Origin transaction: the state token is minted here and
                // shares the NEW color with request tokens.
                if held >= 1 {
                    minted -= 1;
                }
            } else if held > 1 {
                return Err(BlockValidationError::StateTokenNotUnique {
                    address: *addr,
                    held,
                });
            }
        }

        let requests = self
            .essence
            .requests
            .iter()
            .filter(|r| r.target == *addr)
            .count();
        if requests as i64 > minted {
            return Err(BlockValidationError::MissingRequestTokens {
                address: *addr,
                requests,
                minted,
            });
        }
        Ok(())
    }

    /// Wire encoding of the essence.
    pub fn to_bytes(&self) -> Result<Vec<u8>, TransactionError> {
        bincode::serialize(&self.essence).map_err(|e| TransactionError::Codec(e.to_string()))
    }

    /// Decode a transaction and recompute its id.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, TransactionError> {
        let essence: TransactionEssence =
            bincode::deserialize(bytes).map_err(|e| TransactionError::Codec(e.to_string()))?;
        Self::from_essence(essence)
    }

    fn from_essence(essence: TransactionEssence) -> Result<Self, TransactionError> {
        if essence.requests.len() > MAX_REQUESTS_PER_TX {
            return Err(TransactionError::TooManyRequests {
                count: essence.requests.len(),
                max: MAX_REQUESTS_PER_TX,
            });
        }
        let encoded =
            bincode::serialize(&essence).map_err(|e| TransactionError::Codec(e.to_string()))?;
        Ok(Self {
            id: TransactionId::new(keccak256(&encoded)),
            essence,
        })
    }
}

/// Builder for [`Transaction`].
#[derive(Debug, Clone, Default)]
pub struct TransactionBuilder {
    essence: TransactionEssence,
}

impl TransactionBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_state(mut self, state: StateBlock) -> Self {
        self.essence.state = Some(state);
        self
    }

    pub fn with_request(mut self, request: RequestBlock) -> Self {
        self.essence.requests.push(request);
        self
    }

    /// Add `balance` to the output of `addr`.
    pub fn with_output(mut self, addr: Address, balance: Balance) -> Self {
        self.essence.outputs.entry(addr).or_default().push(balance);
        self
    }

    pub fn build(self) -> Result<Transaction, TransactionError> {
        Transaction::from_essence(self.essence)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::ID_LENGTH;

    fn addr(n: u8) -> Address {
        Address::new([n; ID_LENGTH])
    }

    fn color(n: u8) -> Color {
        Color::new([n; ID_LENGTH])
    }

    fn state_block(c: Color) -> StateBlock {
        StateBlock::new(c, 1, [0xAA; 32], 1_600_000_000)
    }

    #[test]
    fn test_id_is_content_addressed() {
        let a = TransactionBuilder::new()
            .with_output(addr(1), Balance::new(Color::IOTA, 10))
            .build()
            .unwrap();
        let b = TransactionBuilder::new()
            .with_output(addr(1), Balance::new(Color::IOTA, 10))
            .build()
            .unwrap();
        let c = TransactionBuilder::new()
            .with_output(addr(1), Balance::new(Color::IOTA, 11))
            .build()
            .unwrap();

        assert_eq!(a.id(), b.id());
        assert_ne!(a.id(), c.id());
    }

    #[test]
    fn test_bytes_roundtrip_preserves_id() {
        let tx = TransactionBuilder::new()
            .with_state(state_block(color(5)))
            .with_request(RequestBlock::new(addr(2), 1, b"bet".to_vec()))
            .with_output(addr(2), Balance::new(color(5), 1))
            .with_output(addr(2), Balance::new(Color::NEW, 1))
            .build()
            .unwrap();

        let decoded = Transaction::from_bytes(&tx.to_bytes().unwrap()).unwrap();
        assert_eq!(decoded, tx);
    }

    #[test]
    fn test_from_bytes_rejects_garbage() {
        assert!(matches!(
            Transaction::from_bytes(&[0xFF; 3]),
            Err(TransactionError::Codec(_))
        ));
    }

    #[test]
    fn test_state_anchor_picks_singleton_output() {
        let tx = TransactionBuilder::new()
            .with_state(state_block(color(5)))
            .with_output(addr(1), Balance::new(color(5), 2))
            .with_output(addr(3), Balance::new(color(5), 1))
            .build()
            .unwrap();

        assert_eq!(tx.state_anchor_address(), Some(addr(3)));
    }

    #[test]
    fn test_state_anchor_absent_without_state_block() {
        let tx = TransactionBuilder::new()
            .with_output(addr(1), Balance::new(color(5), 1))
            .build()
            .unwrap();

        assert_eq!(tx.state_anchor_address(), None);
    }

    #[test]
    fn test_state_anchor_skips_overflowing_output() {
        // Wrapping arithmetic would sum these to exactly 1.
        let tx = TransactionBuilder::new()
            .with_state(state_block(color(5)))
            .with_output(addr(1), Balance::new(color(5), i64::MAX))
            .with_output(addr(1), Balance::new(color(5), i64::MAX))
            .with_output(addr(1), Balance::new(color(5), 3))
            .with_output(addr(2), Balance::new(color(5), i64::MAX))
            .with_output(addr(2), Balance::new(color(5), 2))
            .build()
            .unwrap();

        assert_eq!(tx.state_anchor_address(), None);
    }

    #[test]
    fn test_validate_accepts_backed_requests() {
        let tx = TransactionBuilder::new()
            .with_state(state_block(color(5)))
            .with_request(RequestBlock::new(addr(2), 1, vec![]))
            .with_request(RequestBlock::new(addr(2), 2, vec![]))
            .with_output(addr(2), Balance::new(color(5), 1))
            .with_output(addr(2), Balance::new(Color::NEW, 2))
            .build()
            .unwrap();

        assert_eq!(tx.validate_blocks(&addr(2)), Ok(()));
    }

    #[test]
    fn test_validate_rejects_unbacked_requests() {
        let tx = TransactionBuilder::new()
            .with_request(RequestBlock::new(addr(2), 1, vec![]))
            .with_request(RequestBlock::new(addr(2), 1, vec![]))
            .with_output(addr(2), Balance::new(Color::NEW, 1))
            .build()
            .unwrap();

        assert!(matches!(
            tx.validate_blocks(&addr(2)),
            Err(BlockValidationError::MissingRequestTokens {
                requests: 2,
                minted: 1,
                ..
            })
        ));
    }

    #[test]
    fn test_validate_origin_state_consumes_minted_token() {
        let tx = TransactionBuilder::new()
            .with_state(state_block(Color::NEW))
            .with_request(RequestBlock::new(addr(2), 0, vec![]))
            .with_output(addr(2), Balance::new(Color::NEW, 1))
            .build()
            .unwrap();

        assert!(matches!(
            tx.validate_blocks(&addr(2)),
            Err(BlockValidationError::MissingRequestTokens { minted: 0, .. })
        ));
    }

    #[test]
    fn test_validate_rejects_zero_target() {
        let tx = TransactionBuilder::new()
            .with_request(RequestBlock::new(Address::default(), 0, vec![]))
            .build()
            .unwrap();

        assert_eq!(
            tx.validate_blocks(&addr(2)),
            Err(BlockValidationError::ZeroTarget { index: 0 })
        );
    }

    #[test]
    fn test_validate_rejects_oversized_payload() {
        let tx = TransactionBuilder::new()
            .with_request(RequestBlock::new(
                addr(2),
                0,
                vec![0u8; MAX_REQUEST_PAYLOAD + 1],
            ))
            .with_output(addr(2), Balance::new(Color::NEW, 1))
            .build()
            .unwrap();

        assert!(matches!(
            tx.validate_blocks(&addr(2)),
            Err(BlockValidationError::PayloadTooLarge { index: 0, .. })
        ));
    }

    #[test]
    fn test_validate_rejects_base_color_state() {
        let tx = TransactionBuilder::new()
            .with_state(state_block(Color::IOTA))
            .build()
            .unwrap();

        assert_eq!(
            tx.validate_blocks(&addr(2)),
            Err(BlockValidationError::BaseColorState)
        );
    }

    #[test]
    fn test_validate_rejects_duplicated_state_token() {
        let tx = TransactionBuilder::new()
            .with_state(state_block(color(5)))
            .with_output(addr(2), Balance::new(color(5), 3))
            .build()
            .unwrap();

        assert!(matches!(
            tx.validate_blocks(&addr(2)),
            Err(BlockValidationError::StateTokenNotUnique { held: 3, .. })
        ));
    }

    #[test]
    fn test_requests_to_other_addresses_are_ignored() {
        let tx = TransactionBuilder::new()
            .with_request(RequestBlock::new(addr(9), 0, vec![]))
            .build()
            .unwrap();

        assert_eq!(tx.validate_blocks(&addr(2)), Ok(()));
    }

    #[test]
    fn test_validate_rejects_overflowing_balances() {
        let state_overflow = TransactionBuilder::new()
            .with_state(state_block(color(5)))
            .with_output(addr(2), Balance::new(color(5), i64::MAX))
            .with_output(addr(2), Balance::new(color(5), 2))
            .build()
            .unwrap();
        assert_eq!(
            state_overflow.validate_blocks(&addr(2)),
            Err(BlockValidationError::BalanceOverflow {
                address: addr(2),
                color: color(5),
            })
        );

        let minted_overflow = TransactionBuilder::new()
            .with_request(RequestBlock::new(addr(2), 0, vec![]))
            .with_output(addr(2), Balance::new(Color::NEW, i64::MAX))
            .with_output(addr(2), Balance::new(Color::NEW, 1))
            .build()
            .unwrap();
        assert_eq!(
            minted_overflow.validate_blocks(&addr(2)),
            Err(BlockValidationError::BalanceOverflow {
                address: addr(2),
                color: Color::NEW,
            })
        );
    }
}
