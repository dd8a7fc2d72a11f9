//! # Internal Barcodes (EAN-13)
//!
//! Check-digit math for internally allocated product barcodes.
//!
//! Codes are built from a per-store monotonic sequence (allocated by
//! vela-db's sequence allocator, which owns the concurrency discipline):
//!
//! ```text
//! ┌──────┬────────────────────────┬───┐
//! │  20  │  0000000042            │ ? │
//! │prefix│  10-digit sequence     │chk│
//! └──────┴────────────────────────┴───┘
//! ```
//!
//! The `20` prefix keeps internal codes inside GS1's reserved in-store
//! range. This module is pure: given a sequence number it produces the
//! code, and given a code it can verify it.

use crate::INTERNAL_BARCODE_PREFIX;

/// Highest sequence number that still fits the 10-digit body.
pub const MAX_BARCODE_SEQUENCE: i64 = 9_999_999_999;

/// Computes the EAN-13 check digit over the first 12 digits.
///
/// Digits at even 0-based positions weigh 1, odd positions weigh 3;
/// check digit = `(10 - sum % 10) % 10`.
pub fn ean13_check_digit(digits: &[u8]) -> u8 {
    debug_assert_eq!(digits.len(), 12);
    let sum: u32 = digits
        .iter()
        .enumerate()
        .map(|(i, &d)| if i % 2 == 0 { d as u32 } else { d as u32 * 3 })
        .sum();
    ((10 - sum % 10) % 10) as u8
}

/// Formats a full 13-digit internal barcode for a sequence number.
///
/// Returns `None` when the sequence no longer fits the 10-digit body;
/// the allocator treats that as exhaustion, not as something to wrap.
///
/// ## Example
/// ```rust
/// use vela_core::barcode::internal_barcode;
///
/// let code = internal_barcode(1).unwrap();
/// assert_eq!(code.len(), 13);
/// assert!(code.starts_with("20"));
/// ```
pub fn internal_barcode(sequence: i64) -> Option<String> {
    if !(0..=MAX_BARCODE_SEQUENCE).contains(&sequence) {
        return None;
    }

    let body = format!("{INTERNAL_BARCODE_PREFIX}{sequence:010}");
    let digits: Vec<u8> = body.bytes().map(|b| b - b'0').collect();
    let check = ean13_check_digit(&digits);
    Some(format!("{body}{check}"))
}

/// Verifies a 13-digit code: correct length, all digits, check digit valid.
pub fn is_valid_ean13(code: &str) -> bool {
    if code.len() != 13 || !code.bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }
    let digits: Vec<u8> = code.bytes().map(|b| b - b'0').collect();
    ean13_check_digit(&digits[..12]) == digits[12]
}

// =============================================================================
// Unit Tests
// =============================================================================
