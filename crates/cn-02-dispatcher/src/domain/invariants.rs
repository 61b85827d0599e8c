//! # Domain Invariants
//!
//! Rules that must hold for the messages one dispatch delivers.

use super::entities::CommitteeMessage;

/// Invariant: causal delivery order.
///
/// The messages produced for one transaction are
/// `[Balances] [StateTransaction] Request*`, with:
/// - a `Balances` message first whenever a state or request message follows,
///   and no `Balances` message alone;
/// - at most one state message, before every request;
/// - requests in strictly ascending block index order.
pub fn invariant_causal_order(messages: &[CommitteeMessage]) -> bool {
    let mut rest = messages;

    let has_balances = matches!(rest.first(), Some(CommitteeMessage::Balances { .. }));
    if has_balances {
        rest = &rest[1..];
    }
    if matches!(rest.first(), Some(CommitteeMessage::StateTransaction { .. })) {
        rest = &rest[1..];
    }

    let mut last_index: Option<u16> = None;
    for msg in rest {
        match msg {
            CommitteeMessage::Request { index, .. } => {
                if last_index.is_some_and(|last| *index <= last) {
                    return false;
                }
                last_index = Some(*index);
            }
            _ => return false,
        }
    }

    let delivers_more = messages.len() > usize::from(has_balances);
    has_balances == delivers_more
}
