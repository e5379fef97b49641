//! Display form of payment identifiers.

/// Length of a short payment id in hex characters.
pub const SHORT_PAYMENT_ID_HEX_LEN: usize = 16;

/// Canonicalize a hex-rendered payment id.
///
/// Long ids whose tail past the first 16 characters is all `'0'` are short
/// ids padded into the long slot; those are cut back to 16 characters.
/// Anything else, including ids shorter than 16 characters, is returned as-is.
pub fn normalize_payment_id(raw: &str) -> String {
    match raw.get(SHORT_PAYMENT_ID_HEX_LEN..) {
        Some(tail) if tail.bytes().all(|b| b == b'0') => {
            raw[..SHORT_PAYMENT_ID_HEX_LEN].to_string()
        }
        _ => raw.to_string(),
    }
}
