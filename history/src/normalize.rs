//! Projection of raw ledger records into [`TransactionRecord`]s
//!
//! All four record sources go through [`RecordNormalizer::normalize`], so the
//! payment id, confirmation and pending rules live in exactly one place.

use std::collections::BTreeSet;
use tracing::warn;

use crate::confirmations::confirmations;
use crate::error::HistoryError;
use crate::ledger::{
    IncomingPayment, Ledger, NetworkType, OutgoingTransfer, PayType, PendingState,
    PendingTransfer, SubaddressIndex,
};
use crate::metrics::record_defaulted;
use crate::payment_id::normalize_payment_id;
use crate::record::{Direction, RewardType, TransactionRecord, Transfer};

/// Ledger source a raw record came from, in history append order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RecordKind {
    ConfirmedIncoming,
    ConfirmedOutgoing,
    PendingOutgoing,
    PendingIncoming,
}

impl RecordKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ConfirmedIncoming => "confirmed_incoming",
            Self::ConfirmedOutgoing => "confirmed_outgoing",
            Self::PendingOutgoing => "pending_outgoing",
            Self::PendingIncoming => "pending_incoming",
        }
    }
}

/// A raw record borrowed from a ledger query result
#[derive(Debug, Clone, Copy)]
pub enum RawRecord<'a> {
    ConfirmedIncoming(&'a IncomingPayment),
    ConfirmedOutgoing(&'a OutgoingTransfer),
    PendingOutgoing(&'a PendingTransfer),
    PendingIncoming(&'a IncomingPayment),
}

impl RawRecord<'_> {
    pub fn kind(&self) -> RecordKind {
        match self {
            Self::ConfirmedIncoming(_) => RecordKind::ConfirmedIncoming,
            Self::ConfirmedOutgoing(_) => RecordKind::ConfirmedOutgoing,
            Self::PendingOutgoing(_) => RecordKind::PendingOutgoing,
            Self::PendingIncoming(_) => RecordKind::PendingIncoming,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Self::PendingOutgoing(_) | Self::PendingIncoming(_))
    }
}

/// Fee, change and net amount of an outgoing transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutgoingAmounts {
    pub fee: u64,
    /// Change returned to the wallet, 0 when unknown
    pub change: u64,
    /// `amount_in - change - fee`
    pub amount: u64,
    /// Set when an inconsistent input forced a subtraction to clamp at zero
    pub clamped: Option<&'static str>,
}

impl OutgoingAmounts {
    pub fn derive(amount_in: u64, amount_out: u64, change: Option<u64>) -> Self {
        let change = change.unwrap_or(0);
        let mut clamped = None;

        let fee = amount_in.checked_sub(amount_out).unwrap_or_else(|| {
            clamped = Some("fee_underflow");
            0
        });
        let amount = amount_in
            .checked_sub(change)
            .and_then(|rest| rest.checked_sub(fee))
            .unwrap_or_else(|| {
                clamped.get_or_insert("change_overflow");
                0
            });

        Self {
            fee,
            change,
            amount,
            clamped,
        }
    }
}

/// Maps raw records to [`TransactionRecord`]s against one ledger at one
/// wallet height.
pub struct RecordNormalizer<'a, L: ?Sized> {
    ledger: &'a L,
    wallet_height: u64,
    network: NetworkType,
}

impl<'a, L: Ledger + ?Sized> RecordNormalizer<'a, L> {
    pub fn new(ledger: &'a L, wallet_height: u64) -> Self {
        Self {
            ledger,
            wallet_height,
            network: ledger.network_type(),
        }
    }

    /// Normalize one raw record.
    ///
    /// Fails only when a ledger lookup made on the record's behalf (label or
    /// address resolution) fails. Inconsistent amounts are clamped instead.
    pub fn normalize(&self, raw: RawRecord<'_>) -> Result<TransactionRecord, HistoryError> {
        let mut record = match raw {
            RawRecord::ConfirmedIncoming(payment) | RawRecord::PendingIncoming(payment) => {
                self.incoming(payment)?
            }
            RawRecord::ConfirmedOutgoing(transfer) => {
                let mut record = self.outgoing(transfer)?;
                record.transfers = self.resolve_transfers(transfer)?;
                record
            }
            RawRecord::PendingOutgoing(pending) => {
                let mut record = self.outgoing(&pending.transfer)?;
                record.block_height = 0;
                record.failed = pending.state == PendingState::Failed;
                record
            }
        };

        record.pending = raw.is_pending();
        record.confirmations = if record.pending {
            0
        } else {
            confirmations(self.wallet_height, record.block_height)
        };

        Ok(record)
    }

    fn incoming(&self, payment: &IncomingPayment) -> Result<TransactionRecord, HistoryError> {
        let label = self
            .ledger
            .subaddress_label(payment.subaddr_index)
            .map_err(|e| HistoryError::ledger_query("subaddress_label", e))?;

        Ok(TransactionRecord {
            payment_id: normalize_payment_id(&payment.payment_id.to_hex()),
            amount: payment.amount,
            block_height: payment.block_height,
            timestamp: payment.timestamp,
            unlock_time: payment.unlock_time,
            subaddr_account: payment.subaddr_index.major,
            subaddr_indices: BTreeSet::from([payment.subaddr_index.minor]),
            label,
            is_stake: payment.pay_type == PayType::Stake,
            reward_type: RewardType::from(payment.pay_type),
            ..TransactionRecord::new(payment.tx_hash.to_hex(), Direction::In)
        })
    }

    fn outgoing(&self, transfer: &OutgoingTransfer) -> Result<TransactionRecord, HistoryError> {
        let hash = transfer.tx_hash.to_hex();
        let amounts =
            OutgoingAmounts::derive(transfer.amount_in, transfer.amount_out, transfer.change);

        if let Some(reason) = amounts.clamped {
            warn!(
                tx_hash = %hash,
                amount_in = transfer.amount_in,
                amount_out = transfer.amount_out,
                change = ?transfer.change,
                reason,
                "Inconsistent outgoing amounts, clamped to zero"
            );
            record_defaulted(reason);
        }

        // A label only makes sense when the transfer spent from one subaddress.
        let label = match transfer.subaddr_indices.iter().next() {
            Some(&minor) if transfer.subaddr_indices.len() == 1 => self
                .ledger
                .subaddress_label(SubaddressIndex::new(transfer.subaddr_account, minor))
                .map_err(|e| HistoryError::ledger_query("subaddress_label", e))?,
            _ => String::new(),
        };

        Ok(TransactionRecord {
            payment_id: normalize_payment_id(&transfer.payment_id.to_hex()),
            amount: amounts.amount,
            fee: amounts.fee,
            block_height: transfer.block_height,
            timestamp: transfer.timestamp,
            subaddr_account: transfer.subaddr_account,
            subaddr_indices: transfer.subaddr_indices.clone(),
            label,
            is_stake: transfer.pay_type == PayType::Stake,
            ..TransactionRecord::new(hash, Direction::Out)
        })
    }

    fn resolve_transfers(
        &self,
        transfer: &OutgoingTransfer,
    ) -> Result<Vec<Transfer>, HistoryError> {
        transfer
            .destinations
            .iter()
            .map(|destination| -> Result<Transfer, HistoryError> {
                let address = self
                    .ledger
                    .resolve_address(self.network, &transfer.payment_id, &destination.address)
                    .map_err(|e| HistoryError::ledger_query("resolve_address", e))?;
                Ok(Transfer {
                    amount: destination.amount,
                    address,
                })
            })
            .collect()
    }
}
