//! Ledger collaborator interface
//!
//! The history index never talks to the chain or the wallet file directly. It
//! consumes query results from a [`Ledger`] and projects them into
//! [`TransactionRecord`](crate::record::TransactionRecord)s.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::error::LedgerError;

/// 32-byte transaction hash
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TxHash(pub [u8; 32]);

impl TxHash {
    /// Lowercase hex rendering
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

/// Raw payment id as stored by the wallet: short (8-byte) ids occupy the
/// first bytes of the slot and are zero padded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PaymentId(pub [u8; 32]);

impl PaymentId {
    /// Build from a short 8-byte id, zero padding the remainder
    pub fn short(id: [u8; 8]) -> Self {
        let mut bytes = [0u8; 32];
        bytes[..8].copy_from_slice(&id);
        Self(bytes)
    }

    /// Lowercase hex rendering of the full slot
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

/// Account (major) / subaddress (minor) pair
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubaddressIndex {
    pub major: u32,
    pub minor: u32,
}

impl SubaddressIndex {
    pub fn new(major: u32, minor: u32) -> Self {
        Self { major, minor }
    }
}

/// Classification of a payment as recorded by the wallet
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayType {
    In,
    Out,
    Stake,
    Miner,
    ServiceNode,
    Governance,
    /// Also the landing spot for values this crate does not know
    #[default]
    #[serde(other)]
    Unspecified,
}

impl From<u8> for PayType {
    /// Numeric wallet codes; unknown codes fall back to `Unspecified`.
    fn from(code: u8) -> Self {
        match code {
            1 => Self::In,
            2 => Self::Out,
            3 => Self::Stake,
            4 => Self::Miner,
            5 => Self::ServiceNode,
            6 => Self::Governance,
            _ => Self::Unspecified,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NetworkType {
    #[default]
    Mainnet,
    Testnet,
    Devnet,
    Fakechain,
}

/// Unrendered destination of an outgoing transfer. Turning it into an address
/// string is the ledger's job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressRef {
    pub spend_public_key: [u8; 32],
    pub view_public_key: [u8; 32],
    pub is_subaddress: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Destination {
    pub amount: u64,
    pub address: AddressRef,
}

/// A received payment, confirmed or sitting in the pool
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncomingPayment {
    pub tx_hash: TxHash,
    pub payment_id: PaymentId,
    pub amount: u64,
    pub block_height: u64,
    pub subaddr_index: SubaddressIndex,
    pub timestamp: u64,
    pub unlock_time: u64,
    pub pay_type: PayType,
}

/// A transfer sent by this wallet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutgoingTransfer {
    pub tx_hash: TxHash,
    pub payment_id: PaymentId,
    pub amount_in: u64,
    pub amount_out: u64,
    /// `None` when the wallet does not know the change amount
    pub change: Option<u64>,
    pub block_height: u64,
    pub subaddr_account: u32,
    pub subaddr_indices: BTreeSet<u32>,
    pub timestamp: u64,
    pub pay_type: PayType,
    pub destinations: Vec<Destination>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PendingState {
    #[default]
    Pending,
    Failed,
}

/// An outgoing transfer that has not been mined yet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingTransfer {
    #[serde(flatten)]
    pub transfer: OutgoingTransfer,
    pub state: PendingState,
}

/// Inclusive height window for the confirmed-history queries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeightRange {
    pub min_height: u64,
    pub max_height: u64,
}

impl HeightRange {
    pub fn new(min_height: u64, max_height: u64) -> Self {
        Self {
            min_height,
            max_height,
        }
    }
}

impl Default for HeightRange {
    fn default() -> Self {
        Self::new(0, u64::MAX)
    }
}

/// Source of raw wallet records.
///
/// Implementations must be safe to call from the blocking pool when the
/// history is refreshed in the background.
pub trait Ledger {
    /// Confirmed incoming payments mined within `[min_height, max_height]`
    fn confirmed_incoming(
        &self,
        min_height: u64,
        max_height: u64,
    ) -> Result<Vec<IncomingPayment>, LedgerError>;

    /// Confirmed outgoing transfers mined within `[min_height, max_height]`
    fn confirmed_outgoing(
        &self,
        min_height: u64,
        max_height: u64,
    ) -> Result<Vec<OutgoingTransfer>, LedgerError>;

    fn pending_outgoing(&self) -> Result<Vec<PendingTransfer>, LedgerError>;

    /// Incoming payments seen in the transaction pool
    fn pending_incoming(&self) -> Result<Vec<IncomingPayment>, LedgerError>;

    fn subaddress_label(&self, index: SubaddressIndex) -> Result<String, LedgerError>;

    /// Render a destination as an address string, integrating `payment_id`
    /// where the network rules call for it
    fn resolve_address(
        &self,
        network: NetworkType,
        payment_id: &PaymentId,
        destination: &AddressRef,
    ) -> Result<String, LedgerError>;

    /// Height the wallet is synced to
    fn current_height(&self) -> Result<u64, LedgerError>;

    fn network_type(&self) -> NetworkType;
}
