//! Confirmation depth derived from wallet and block heights.

/// Number of confirmations a transaction mined at `block_height` has when the
/// wallet is synced to `wallet_height`. Zero when the block is not below the
/// wallet height.
pub fn confirmations(wallet_height: u64, block_height: u64) -> u64 {
    wallet_height.saturating_sub(block_height)
}
