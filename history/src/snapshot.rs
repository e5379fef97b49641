//! Immutable history generations
//!
//! A [`HistorySnapshot`] is produced in full by one successful rebuild and
//! never modified afterwards. Readers hold it through an `Arc`, so a later
//! rebuild publishing a newer generation does not disturb them.

use std::time::{SystemTime, UNIX_EPOCH};

use crate::normalize::RecordKind;
use crate::record::{Direction, TransactionRecord};

/// Number of records a generation took from each ledger source
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SourceCounts {
    pub confirmed_incoming: usize,
    pub confirmed_outgoing: usize,
    pub pending_outgoing: usize,
    pub pending_incoming: usize,
}

impl SourceCounts {
    pub(crate) fn add(&mut self, kind: RecordKind) {
        let slot = match kind {
            RecordKind::ConfirmedIncoming => &mut self.confirmed_incoming,
            RecordKind::ConfirmedOutgoing => &mut self.confirmed_outgoing,
            RecordKind::PendingOutgoing => &mut self.pending_outgoing,
            RecordKind::PendingIncoming => &mut self.pending_incoming,
        };
        *slot += 1;
    }

    pub fn total(&self) -> usize {
        self.confirmed_incoming
            + self.confirmed_outgoing
            + self.pending_outgoing
            + self.pending_incoming
    }
}

/// One complete generation of the transaction history
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HistorySnapshot {
    records: Vec<TransactionRecord>,
    /// 0 for the initial empty snapshot, +1 per successful rebuild
    generation: u64,
    /// Wallet height the confirmations were computed against
    wallet_height: u64,
    /// Unix millis when the snapshot was published
    built_at_ms: u64,
    source_counts: SourceCounts,
}

impl HistorySnapshot {
    /// The empty generation a store starts with
    pub fn empty() -> Self {
        Self::default()
    }

    pub(crate) fn new(
        records: Vec<TransactionRecord>,
        generation: u64,
        wallet_height: u64,
        source_counts: SourceCounts,
    ) -> Self {
        let built_at_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
            .unwrap_or_default();

        Self {
            records,
            generation,
            wallet_height,
            built_at_ms,
            source_counts,
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn wallet_height(&self) -> u64 {
        self.wallet_height
    }

    pub fn built_at_ms(&self) -> u64 {
        self.built_at_ms
    }

    /// Per-source breakdown of [`len`](Self::len)
    pub fn source_counts(&self) -> SourceCounts {
        self.source_counts
    }

    pub fn get(&self, index: usize) -> Option<&TransactionRecord> {
        self.records.get(index)
    }

    /// First record in append order with the given hash
    pub fn find_by_hash(&self, hash: &str) -> Option<&TransactionRecord> {
        self.records.iter().find(|record| record.hash == hash)
    }

    pub fn records(&self) -> &[TransactionRecord] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TransactionRecord> {
        self.records.iter()
    }

    pub fn pending(&self) -> impl Iterator<Item = &TransactionRecord> {
        self.records.iter().filter(|record| record.pending)
    }

    pub fn by_direction(&self, direction: Direction) -> impl Iterator<Item = &TransactionRecord> {
        self.records
            .iter()
            .filter(move |record| record.direction == direction)
    }
}

impl<'a> IntoIterator for &'a HistorySnapshot {
    type Item = &'a TransactionRecord;
    type IntoIter = std::slice::Iter<'a, TransactionRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
