use serde::{Serialize, Serializer};
use std::collections::BTreeSet;

use crate::ledger::PayType;

/// Serialize u64 as a decimal string for JavaScript compatibility
fn serialize_u64_as_string<S>(value: &u64, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&value.to_string())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Direction {
    In,
    Out,
}

/// Reward classification of an incoming payment
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum RewardType {
    #[default]
    Unspecified,
    Miner,
    ServiceNode,
}

impl From<PayType> for RewardType {
    fn from(pay_type: PayType) -> Self {
        match pay_type {
            PayType::ServiceNode => Self::ServiceNode,
            PayType::Miner => Self::Miner,
            _ => Self::Unspecified,
        }
    }
}

/// One destination of an outgoing transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Transfer {
    /// Amount sent to this destination (decimal string)
    #[serde(serialize_with = "serialize_u64_as_string")]
    pub amount: u64,
    /// Rendered destination address
    pub address: String,
}

/// A normalized history entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRecord {
    /// Transaction hash (hex encoded)
    pub hash: String,
    /// Payment id in display form (16 hex chars for short ids)
    pub payment_id: String,
    /// Net amount attributed to this record (decimal string)
    #[serde(serialize_with = "serialize_u64_as_string")]
    pub amount: u64,
    /// Fee paid, zero for incoming records (decimal string)
    #[serde(serialize_with = "serialize_u64_as_string")]
    pub fee: u64,
    pub direction: Direction,
    /// Block height, 0 while unmined (decimal string)
    #[serde(serialize_with = "serialize_u64_as_string")]
    pub block_height: u64,
    /// Confirmations at the wallet height of the rebuild (decimal string)
    #[serde(serialize_with = "serialize_u64_as_string")]
    pub confirmations: u64,
    /// Unix seconds (decimal string)
    #[serde(serialize_with = "serialize_u64_as_string")]
    pub timestamp: u64,
    #[serde(serialize_with = "serialize_u64_as_string")]
    pub unlock_time: u64,
    pub subaddr_account: u32,
    pub subaddr_indices: BTreeSet<u32>,
    /// Subaddress label, empty when none applies
    pub label: String,
    pub pending: bool,
    pub failed: bool,
    pub is_stake: bool,
    pub reward_type: RewardType,
    /// Per-destination breakdown, confirmed outgoing records only
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub transfers: Vec<Transfer>,
}

impl TransactionRecord {
    /// Empty record with the given hash and direction; all other fields default.
    pub fn new(hash: impl Into<String>, direction: Direction) -> Self {
        Self {
            hash: hash.into(),
            payment_id: String::new(),
            amount: 0,
            fee: 0,
            direction,
            block_height: 0,
            confirmations: 0,
            timestamp: 0,
            unlock_time: 0,
            subaddr_account: 0,
            subaddr_indices: BTreeSet::new(),
            label: String::new(),
            pending: false,
            failed: false,
            is_stake: false,
            reward_type: RewardType::Unspecified,
            transfers: Vec::new(),
        }
    }
}
