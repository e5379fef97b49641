//! Unit tests for record normalization
//!
//! Run with: cargo test --test normalize_tests

mod support;

use std::collections::BTreeSet;

use support::{address, hash_hex, incoming, outgoing, FakeLedger, Query};
use wallet_history::error::{HistoryError, LedgerError};
use wallet_history::ledger::{
    Destination, NetworkType, PayType, PaymentId, PendingState, PendingTransfer, SubaddressIndex,
};
use wallet_history::normalize::{RawRecord, RecordKind, RecordNormalizer};
use wallet_history::{Direction, RewardType};

fn short_payment_id() -> PaymentId {
    PaymentId::short([0xa1, 0xb2, 0xc3, 0xd4, 0xe5, 0xf6, 0xa7, 0xb8])
}

fn long_payment_id() -> PaymentId {
    let mut bytes = [0u8; 32];
    bytes[..8].copy_from_slice(&[0xa1, 0xb2, 0xc3, 0xd4, 0xe5, 0xf6, 0xa7, 0xb8]);
    bytes[31] = 0x01;
    PaymentId(bytes)
}

// =============================================================================
// Confirmed incoming
// =============================================================================

#[test]
fn test_confirmed_incoming_mapping() {
    let ledger = FakeLedger::new();
    ledger.set_label(SubaddressIndex::new(2, 7), "savings");

    let mut payment = incoming(0x11, 1_000, 40);
    payment.subaddr_index = SubaddressIndex::new(2, 7);
    payment.unlock_time = 55;
    payment.payment_id = short_payment_id();

    let normalizer = RecordNormalizer::new(&ledger, 100);
    let record = normalizer
        .normalize(RawRecord::ConfirmedIncoming(&payment))
        .unwrap();

    assert_eq!(record.hash, hash_hex(0x11));
    assert_eq!(record.direction, Direction::In);
    assert_eq!(record.amount, 1_000);
    assert_eq!(record.fee, 0);
    assert_eq!(record.block_height, 40);
    assert_eq!(record.confirmations, 60);
    assert_eq!(record.timestamp, payment.timestamp);
    assert_eq!(record.unlock_time, 55);
    assert_eq!(record.subaddr_account, 2);
    assert_eq!(record.subaddr_indices, BTreeSet::from([7]));
    assert_eq!(record.label, "savings");
    assert_eq!(record.payment_id, "a1b2c3d4e5f6a7b8");
    assert!(!record.pending);
    assert!(!record.failed);
    assert!(!record.is_stake);
    assert_eq!(record.reward_type, RewardType::Unspecified);
    assert!(record.transfers.is_empty());
}

#[test]
fn test_incoming_reward_types() {
    let ledger = FakeLedger::new();
    let normalizer = RecordNormalizer::new(&ledger, 10);

    let cases = [
        (PayType::ServiceNode, RewardType::ServiceNode, false),
        (PayType::Miner, RewardType::Miner, false),
        (PayType::Stake, RewardType::Unspecified, true),
        (PayType::Governance, RewardType::Unspecified, false),
        (PayType::Unspecified, RewardType::Unspecified, false),
    ];

    for (pay_type, reward_type, is_stake) in cases {
        let mut payment = incoming(0x12, 5, 1);
        payment.pay_type = pay_type;
        let record = normalizer
            .normalize(RawRecord::ConfirmedIncoming(&payment))
            .unwrap();
        assert_eq!(record.reward_type, reward_type, "pay type {:?}", pay_type);
        assert_eq!(record.is_stake, is_stake, "pay type {:?}", pay_type);
    }
}

#[test]
fn test_unknown_numeric_pay_type_defaults_to_unspecified() {
    let ledger = FakeLedger::new();
    let normalizer = RecordNormalizer::new(&ledger, 10);

    let mut payment = incoming(0x13, 5, 1);
    payment.pay_type = PayType::from(42);
    let record = normalizer
        .normalize(RawRecord::ConfirmedIncoming(&payment))
        .unwrap();

    assert_eq!(record.reward_type, RewardType::Unspecified);
    assert!(!record.is_stake);
}

#[test]
fn test_incoming_above_wallet_height_has_no_confirmations() {
    let ledger = FakeLedger::new();
    let normalizer = RecordNormalizer::new(&ledger, 100);
    let payment = incoming(0x14, 5, 150);

    let record = normalizer
        .normalize(RawRecord::ConfirmedIncoming(&payment))
        .unwrap();
    assert_eq!(record.confirmations, 0);
}

#[test]
fn test_long_payment_id_kept_in_full() {
    let ledger = FakeLedger::new();
    let normalizer = RecordNormalizer::new(&ledger, 10);
    let mut payment = incoming(0x15, 5, 1);
    payment.payment_id = long_payment_id();

    let record = normalizer
        .normalize(RawRecord::ConfirmedIncoming(&payment))
        .unwrap();
    assert_eq!(record.payment_id.len(), 64);
    assert_eq!(record.payment_id, long_payment_id().to_hex());
}

#[test]
fn test_absent_payment_id_normalizes_to_sixteen_zeros() {
    let ledger = FakeLedger::new();
    let normalizer = RecordNormalizer::new(&ledger, 10);
    let payment = incoming(0x16, 5, 1);

    let record = normalizer
        .normalize(RawRecord::ConfirmedIncoming(&payment))
        .unwrap();
    assert_eq!(record.payment_id, "0000000000000000");
}

// =============================================================================
// Confirmed outgoing
// =============================================================================

#[test]
fn test_outgoing_with_unknown_change() {
    let ledger = FakeLedger::new();
    let normalizer = RecordNormalizer::new(&ledger, 100);
    let transfer = outgoing(0x21, 110, 100, 40);

    let record = normalizer
        .normalize(RawRecord::ConfirmedOutgoing(&transfer))
        .unwrap();

    assert_eq!(record.direction, Direction::Out);
    assert_eq!(record.fee, 10);
    assert_eq!(record.amount, 100);
    assert_eq!(record.confirmations, 60);
    assert!(!record.pending);
    assert_eq!(record.reward_type, RewardType::Unspecified);
}

#[test]
fn test_outgoing_with_known_change() {
    let ledger = FakeLedger::new();
    let normalizer = RecordNormalizer::new(&ledger, 100);
    let mut transfer = outgoing(0x22, 1_000, 990, 40);
    transfer.change = Some(400);

    let record = normalizer
        .normalize(RawRecord::ConfirmedOutgoing(&transfer))
        .unwrap();

    assert_eq!(record.fee, 10);
    assert_eq!(record.amount, 590);
}

#[test]
fn test_outgoing_inconsistent_amounts_do_not_fail() {
    let ledger = FakeLedger::new();
    let normalizer = RecordNormalizer::new(&ledger, 100);
    let mut transfer = outgoing(0x23, 100, 150, 40);
    transfer.change = Some(500);

    let record = normalizer
        .normalize(RawRecord::ConfirmedOutgoing(&transfer))
        .unwrap();

    assert_eq!(record.fee, 0);
    assert_eq!(record.amount, 0);
}

#[test]
fn test_outgoing_label_only_for_single_subaddress() {
    let ledger = FakeLedger::new();
    ledger.set_label(SubaddressIndex::new(1, 3), "rent");
    let normalizer = RecordNormalizer::new(&ledger, 100);

    let mut single = outgoing(0x24, 110, 100, 40);
    single.subaddr_account = 1;
    single.subaddr_indices = BTreeSet::from([3]);
    let record = normalizer
        .normalize(RawRecord::ConfirmedOutgoing(&single))
        .unwrap();
    assert_eq!(record.label, "rent");
    assert_eq!(record.subaddr_account, 1);

    let mut several = single.clone();
    several.subaddr_indices = BTreeSet::from([3, 4]);
    let record = normalizer
        .normalize(RawRecord::ConfirmedOutgoing(&several))
        .unwrap();
    assert_eq!(record.label, "");
    assert_eq!(record.subaddr_indices, BTreeSet::from([3, 4]));

    let mut none = single;
    none.subaddr_indices = BTreeSet::new();
    let record = normalizer
        .normalize(RawRecord::ConfirmedOutgoing(&none))
        .unwrap();
    assert_eq!(record.label, "");
}

#[test]
fn test_outgoing_transfers_resolved_in_source_order() {
    let ledger = FakeLedger::with_network(NetworkType::Testnet);
    let normalizer = RecordNormalizer::new(&ledger, 100);

    let mut transfer = outgoing(0x25, 1_000, 900, 40);
    transfer.payment_id = short_payment_id();
    transfer.destinations = vec![
        Destination {
            amount: 600,
            address: address(0x0a),
        },
        Destination {
            amount: 300,
            address: address(0x0b),
        },
    ];

    let record = normalizer
        .normalize(RawRecord::ConfirmedOutgoing(&transfer))
        .unwrap();

    assert_eq!(record.transfers.len(), 2);
    assert_eq!(record.transfers[0].amount, 600);
    assert_eq!(record.transfers[0].address, "T-std-0a0a0a0a-a1b2");
    assert_eq!(record.transfers[1].amount, 300);
    assert_eq!(record.transfers[1].address, "T-std-0b0b0b0b-a1b2");
}

#[test]
fn test_outgoing_stake_flag() {
    let ledger = FakeLedger::new();
    let normalizer = RecordNormalizer::new(&ledger, 100);
    let mut transfer = outgoing(0x26, 110, 100, 40);
    transfer.pay_type = PayType::Stake;

    let record = normalizer
        .normalize(RawRecord::ConfirmedOutgoing(&transfer))
        .unwrap();
    assert!(record.is_stake);
    assert_eq!(record.reward_type, RewardType::Unspecified);
}

// =============================================================================
// Pending outgoing
// =============================================================================

#[test]
fn test_pending_outgoing_mapping() {
    let ledger = FakeLedger::new();
    let normalizer = RecordNormalizer::new(&ledger, 100);
    let pending = PendingTransfer {
        transfer: outgoing(0x31, 110, 100, 90),
        state: PendingState::Pending,
    };

    let record = normalizer
        .normalize(RawRecord::PendingOutgoing(&pending))
        .unwrap();

    assert!(record.pending);
    assert!(!record.failed);
    assert_eq!(record.confirmations, 0);
    assert_eq!(record.block_height, 0);
    assert_eq!(record.fee, 10);
    assert_eq!(record.amount, 100);
    assert!(record.transfers.is_empty());
}

#[test]
fn test_failed_pending_outgoing() {
    let ledger = FakeLedger::new();
    let normalizer = RecordNormalizer::new(&ledger, 100);
    let pending = PendingTransfer {
        transfer: outgoing(0x32, 110, 100, 0),
        state: PendingState::Failed,
    };

    let record = normalizer
        .normalize(RawRecord::PendingOutgoing(&pending))
        .unwrap();
    assert!(record.pending);
    assert!(record.failed);
}

// =============================================================================
// Pending incoming
// =============================================================================

#[test]
fn test_pool_incoming_mapping() {
    let ledger = FakeLedger::new();
    ledger.set_label(SubaddressIndex::new(0, 0), "primary");
    let normalizer = RecordNormalizer::new(&ledger, 100);

    let mut payment = incoming(0x41, 70, 10);
    payment.pay_type = PayType::Miner;

    let record = normalizer
        .normalize(RawRecord::PendingIncoming(&payment))
        .unwrap();

    assert!(record.pending);
    assert_eq!(record.confirmations, 0);
    assert_eq!(record.amount, 70);
    assert_eq!(record.label, "primary");
    assert_eq!(record.reward_type, RewardType::Miner);
    assert_eq!(record.direction, Direction::In);
}

// =============================================================================
// Ledger failures and kinds
// =============================================================================

#[test]
fn test_label_failure_is_reported() {
    let ledger = FakeLedger::new();
    ledger.fail_on(Some(Query::SubaddressLabel));
    let normalizer = RecordNormalizer::new(&ledger, 100);
    let payment = incoming(0x51, 5, 1);

    let err = normalizer
        .normalize(RawRecord::ConfirmedIncoming(&payment))
        .unwrap_err();
    assert!(matches!(
        err,
        HistoryError::LedgerQuery {
            query: "subaddress_label",
            source: LedgerError::Unavailable(_),
        }
    ));
}

#[test]
fn test_address_failure_is_reported() {
    let ledger = FakeLedger::new();
    ledger.fail_on(Some(Query::ResolveAddress));
    let normalizer = RecordNormalizer::new(&ledger, 100);
    let transfer = outgoing(0x52, 110, 100, 40);

    let err = normalizer
        .normalize(RawRecord::ConfirmedOutgoing(&transfer))
        .unwrap_err();
    assert!(matches!(
        err,
        HistoryError::LedgerQuery {
            query: "resolve_address",
            ..
        }
    ));
}

#[test]
fn test_pending_outgoing_skips_address_resolution() {
    let ledger = FakeLedger::new();
    ledger.fail_on(Some(Query::ResolveAddress));
    let normalizer = RecordNormalizer::new(&ledger, 100);
    let pending = PendingTransfer {
        transfer: outgoing(0x53, 110, 100, 0),
        state: PendingState::Pending,
    };

    assert!(normalizer
        .normalize(RawRecord::PendingOutgoing(&pending))
        .is_ok());
}

#[test]
fn test_raw_record_kinds() {
    let payment = incoming(0x61, 1, 1);
    let transfer = outgoing(0x62, 2, 1, 1);
    let pending = PendingTransfer {
        transfer: transfer.clone(),
        state: PendingState::Pending,
    };

    let cases = [
        (RawRecord::ConfirmedIncoming(&payment), RecordKind::ConfirmedIncoming, false),
        (RawRecord::ConfirmedOutgoing(&transfer), RecordKind::ConfirmedOutgoing, false),
        (RawRecord::PendingOutgoing(&pending), RecordKind::PendingOutgoing, true),
        (RawRecord::PendingIncoming(&payment), RecordKind::PendingIncoming, true),
    ];

    for (raw, kind, pending) in cases {
        assert_eq!(raw.kind(), kind);
        assert_eq!(raw.is_pending(), pending);
    }
    assert_eq!(RecordKind::PendingIncoming.as_str(), "pending_incoming");
}
