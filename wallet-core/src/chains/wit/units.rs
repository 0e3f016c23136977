// wallet-core/src/chains/wit/units.rs
//
// nanowit <-> WIT. 1 WIT = 10^9 nanowits.

use crate::error::WalletError;

pub const WIT_SYMBOL: &str = "WIT";
pub const WIT_DECIMALS: u8 = 9;
pub const NANOWITS_PER_WIT: u64 = 1_000_000_000;

/// Format raw units thành human-readable string (trailing zeros bỏ đi).
pub fn format_units(raw: u64, decimals: u8) -> String {
    let raw = raw.to_string();
    if decimals == 0 || raw == "0" {
        return raw;
    }

    let raw_len = raw.len();
    let decimals = decimals as usize;

    if raw_len <= decimals {
        // Số nhỏ hơn 1 (e.g., 0.001)
        let decimal_part = format!("{}{}", "0".repeat(decimals - raw_len), raw);
        format!("0.{}", decimal_part.trim_end_matches('0'))
    } else {
        let (integer_part, decimal_part) = raw.split_at(raw_len - decimals);
        let trimmed = decimal_part.trim_end_matches('0');
        if trimmed.is_empty() {
            integer_part.to_string()
        } else {
            format!("{}.{}", integer_part, trimmed)
        }
    }
}

/// `1_500_000_000` → `"1.5"`
pub fn nanowit_to_wit(nanowits: u64) -> String {
    format_units(nanowits, WIT_DECIMALS)
}

/// `"1.5"` → `1_500_000_000`. At most 9 fractional digits, no sign, no exponent.
pub fn wit_to_nanowit(wit: &str) -> Result<u64, WalletError> {
    let invalid = |why: &str| WalletError::Validation(format!("invalid WIT amount '{}': {}", wit, why));
    let s = wit.trim();
    let (integer, fraction) = match s.split_once('.') {
        Some((i, f)) => (i, f),
        None => (s, ""),
    };
    if integer.is_empty() && fraction.is_empty() {
        return Err(invalid("empty"));
    }
    if !integer.chars().chain(fraction.chars()).all(|c| c.is_ascii_digit()) {
        return Err(invalid("not a decimal number"));
    }
    if fraction.len() > WIT_DECIMALS as usize {
        return Err(invalid("more than 9 decimal places"));
    }

    let whole: u64 = if integer.is_empty() {
        0
    } else {
        integer.parse().map_err(|_| invalid("too large"))?
    };
    let padded = format!("{:0<width$}", fraction, width = WIT_DECIMALS as usize);
    let frac: u64 = padded.parse().map_err(|_| invalid("bad fraction"))?;

    whole
        .checked_mul(NANOWITS_PER_WIT)
        .and_then(|n| n.checked_add(frac))
        .ok_or_else(|| invalid("too large"))
}
