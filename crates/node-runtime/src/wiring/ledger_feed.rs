//! Ledger events carried on the publisher feed.
//!
//! Three topics carry ledger events, with transactions in their hex-encoded
//! wire form (`Transaction::to_bytes`):
//!
//! ```text
//! ledger_tx <tx>                          → LedgerEvent::StateTransaction
//! ledger_addr <address> <tx>              → LedgerEvent::AddressUpdate
//! ledger_balances <address> <tx> [<tx>..] → LedgerEvent::Balances
//! ```
//!
//! Balance snapshots are the outputs each transaction sends to `address`.

use cn_02_dispatcher::LedgerEvent;
use shared_types::{Address, AddressBalances, IdentifierError, Transaction, TransactionError};
use std::sync::Arc;
use thiserror::Error;

/// Topic of a transaction to route by its state anchor.
pub const LEDGER_TX_TOPIC: &str = "ledger_tx";

/// Topic of a transaction touching one address.
pub const LEDGER_ADDRESS_TOPIC: &str = "ledger_addr";

/// Topic of a balance refresh for one address.
pub const LEDGER_BALANCES_TOPIC: &str = "ledger_balances";

/// Topics decoded into ledger events.
pub const LEDGER_TOPICS: [&str; 3] = [LEDGER_TX_TOPIC, LEDGER_ADDRESS_TOPIC, LEDGER_BALANCES_TOPIC];

/// A ledger feed message that could not be decoded.
#[derive(Debug, Error)]
pub enum LedgerFeedError {
    /// A required field is absent.
    #[error("{topic} message is missing the {field} field")]
    MissingField {
        /// Message topic.
        topic: &'static str,
        /// Name of the absent field.
        field: &'static str,
    },

    /// The address field is malformed.
    #[error("Invalid address: {0}")]
    Address(#[from] IdentifierError),

    /// A transaction field is not hex.
    #[error("Invalid transaction hex: {0}")]
    Hex(#[from] hex::FromHexError),

    /// A transaction field does not decode.
    #[error("Invalid transaction: {0}")]
    Transaction(#[from] TransactionError),
}

/// Decode a split feed message into a ledger event.
///
/// Messages on other topics give `Ok(None)`.
pub fn parse_ledger_event(message: &[String]) -> Result<Option<LedgerEvent>, LedgerFeedError> {
    let Some((topic, fields)) = message.split_first() else {
        return Ok(None);
    };
    let event = match topic.as_str() {
        LEDGER_TX_TOPIC => {
            let tx = field(fields, 0, LEDGER_TX_TOPIC, "transaction")?;
            LedgerEvent::StateTransaction(decode_transaction(tx)?)
        }
        LEDGER_ADDRESS_TOPIC => {
            let address = Address::from_hex(field(fields, 0, LEDGER_ADDRESS_TOPIC, "address")?)?;
            let transaction =
                decode_transaction(field(fields, 1, LEDGER_ADDRESS_TOPIC, "transaction")?)?;
            let mut balances = AddressBalances::new();
            balances.insert(transaction.id(), transaction.output_of(&address).to_vec());
            LedgerEvent::AddressUpdate {
                address,
                balances,
                transaction,
            }
        }
        LEDGER_BALANCES_TOPIC => {
            let address = Address::from_hex(field(fields, 0, LEDGER_BALANCES_TOPIC, "address")?)?;
            field(fields, 1, LEDGER_BALANCES_TOPIC, "transaction")?;
            let mut balances = AddressBalances::new();
            for tx in &fields[1..] {
                let transaction = decode_transaction(tx)?;
                balances.insert(transaction.id(), transaction.output_of(&address).to_vec());
            }
            LedgerEvent::Balances { address, balances }
        }
        _ => return Ok(None),
    };
    Ok(Some(event))
}

/// Encode `transaction` as a feed field.
pub fn encode_transaction(transaction: &Transaction) -> Result<String, TransactionError> {
    Ok(hex::encode(transaction.to_bytes()?))
}

fn decode_transaction(field: &str) -> Result<Arc<Transaction>, LedgerFeedError> {
    let bytes = hex::decode(field)?;
    Ok(Arc::new(Transaction::from_bytes(&bytes)?))
}

fn field<'a>(
    fields: &'a [String],
    index: usize,
    topic: &'static str,
    name: &'static str,
) -> Result<&'a str, LedgerFeedError> {
    fields
        .get(index)
        .map(String::as_str)
        .ok_or(LedgerFeedError::MissingField { topic, field: name })
}
