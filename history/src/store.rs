//! Concurrent transaction history store
//!
//! Readers clone the `Arc` of the current [`HistorySnapshot`] under a short
//! shared lock and work on that generation without holding any lock. A
//! rebuild holds the rebuild mutex for its whole run, so rebuilds never
//! overlap, builds the next generation off to the side and publishes it with
//! one pointer swap. A failed rebuild publishes nothing.

use parking_lot::{Mutex, RwLock};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use crate::error::HistoryError;
use crate::ledger::{HeightRange, Ledger};
use crate::metrics::{record_rebuild, set_record_count, Timer};
use crate::normalize::{RawRecord, RecordKind, RecordNormalizer};
use crate::record::TransactionRecord;
use crate::snapshot::{HistorySnapshot, SourceCounts};

/// Queryable, normalized index over a wallet's transaction activity
pub struct TransactionHistory {
    current: RwLock<Arc<HistorySnapshot>>,
    rebuild_lock: Mutex<()>,
    range: HeightRange,
}

impl Default for TransactionHistory {
    fn default() -> Self {
        Self::new()
    }
}

impl TransactionHistory {
    /// Empty history querying the full confirmed height range
    pub fn new() -> Self {
        Self::with_range(HeightRange::default())
    }

    /// Empty history querying only confirmed records within `range`
    pub fn with_range(range: HeightRange) -> Self {
        Self {
            current: RwLock::new(Arc::new(HistorySnapshot::empty())),
            rebuild_lock: Mutex::new(()),
            range,
        }
    }

    pub fn range(&self) -> HeightRange {
        self.range
    }

    /// Shared handle to the current generation
    pub fn snapshot(&self) -> Arc<HistorySnapshot> {
        Arc::clone(&self.current.read())
    }

    /// Number of records in the current generation
    pub fn count(&self) -> usize {
        self.current.read().len()
    }

    /// Record at `index` in append order, `None` when out of range
    pub fn record_at(&self, index: i64) -> Option<TransactionRecord> {
        let index = usize::try_from(index).ok()?;
        self.current.read().get(index).cloned()
    }

    /// First record in append order whose hash equals `hash`
    pub fn record_by_hash(&self, hash: &str) -> Option<TransactionRecord> {
        self.current.read().find_by_hash(hash).cloned()
    }

    /// Copy of every record in the current generation, in append order
    pub fn all_records(&self) -> Vec<TransactionRecord> {
        self.current.read().records().to_vec()
    }

    /// Rebuild from the ledger at the ledger's own current height
    #[instrument(skip(self, ledger))]
    pub fn refresh<L: Ledger + ?Sized>(&self, ledger: &L) -> Result<usize, HistoryError> {
        let wallet_height = ledger
            .current_height()
            .map_err(|e| HistoryError::ledger_query("current_height", e))?;
        self.rebuild(ledger, wallet_height)
    }

    /// Re-query all four ledger sources, normalize every record and publish
    /// the result as the new generation. Returns the new record count.
    ///
    /// On error the previously published generation stays visible unchanged.
    #[instrument(
        skip(self, ledger),
        fields(min_height = self.range.min_height, max_height = self.range.max_height)
    )]
    pub fn rebuild<L: Ledger + ?Sized>(
        &self,
        ledger: &L,
        wallet_height: u64,
    ) -> Result<usize, HistoryError> {
        let _guard = self.rebuild_lock.lock();
        let timer = Timer::start();

        match self.build(ledger, wallet_height) {
            Ok(snapshot) => {
                let count = snapshot.len();
                let generation = snapshot.generation();
                let sources = snapshot.source_counts();
                *self.current.write() = Arc::new(snapshot);

                record_rebuild(timer.elapsed(), true);
                set_record_count(count);
                info!(
                    generation,
                    count,
                    confirmed_incoming = sources.confirmed_incoming,
                    confirmed_outgoing = sources.confirmed_outgoing,
                    pending_outgoing = sources.pending_outgoing,
                    pending_incoming = sources.pending_incoming,
                    wallet_height,
                    latency_ms = %timer.elapsed().as_millis(),
                    "Transaction history rebuilt"
                );
                Ok(count)
            }
            Err(e) => {
                record_rebuild(timer.elapsed(), false);
                warn!(
                    error = %e,
                    wallet_height,
                    kept_generation = self.current.read().generation(),
                    "Transaction history rebuild failed, keeping previous snapshot"
                );
                Err(e)
            }
        }
    }

    /// Build the next generation without touching the published one.
    /// Must be called with `rebuild_lock` held.
    fn build<L: Ledger + ?Sized>(
        &self,
        ledger: &L,
        wallet_height: u64,
    ) -> Result<HistorySnapshot, HistoryError> {
        let HeightRange {
            min_height,
            max_height,
        } = self.range;

        let incoming = ledger
            .confirmed_incoming(min_height, max_height)
            .map_err(|e| HistoryError::ledger_query("confirmed_incoming", e))?;
        let outgoing = ledger
            .confirmed_outgoing(min_height, max_height)
            .map_err(|e| HistoryError::ledger_query("confirmed_outgoing", e))?;
        let pending_outgoing = ledger
            .pending_outgoing()
            .map_err(|e| HistoryError::ledger_query("pending_outgoing", e))?;
        let pending_incoming = ledger
            .pending_incoming()
            .map_err(|e| HistoryError::ledger_query("pending_incoming", e))?;

        for (kind, count) in [
            (RecordKind::ConfirmedIncoming, incoming.len()),
            (RecordKind::ConfirmedOutgoing, outgoing.len()),
            (RecordKind::PendingOutgoing, pending_outgoing.len()),
            (RecordKind::PendingIncoming, pending_incoming.len()),
        ] {
            debug!(source = kind.as_str(), count, "Fetched raw records");
        }

        let normalizer = RecordNormalizer::new(ledger, wallet_height);
        let mut source_counts = SourceCounts::default();
        let records = incoming
            .iter()
            .map(RawRecord::ConfirmedIncoming)
            .chain(outgoing.iter().map(RawRecord::ConfirmedOutgoing))
            .chain(pending_outgoing.iter().map(RawRecord::PendingOutgoing))
            .chain(pending_incoming.iter().map(RawRecord::PendingIncoming))
            .map(|raw| {
                source_counts.add(raw.kind());
                normalizer.normalize(raw)
            })
            .collect::<Result<Vec<_>, _>>()?;

        let generation = self.current.read().generation() + 1;
        Ok(HistorySnapshot::new(
            records,
            generation,
            wallet_height,
            source_counts,
        ))
    }
}
