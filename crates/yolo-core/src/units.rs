//! Decimal amount <-> smallest-unit integer conversion.

use alloy_primitives::U256;

/// Convert a human-entered decimal amount (e.g. "0.1") into its smallest-unit
/// integer at `decimals` precision.
///
/// Trailing fractional zeros beyond the precision are accepted; any other
/// excess precision is rejected rather than silently truncated.
pub fn to_base_units(amount: &str, decimals: u8) -> Result<U256, String> {
    let trimmed = amount.trim();
    if trimmed.is_empty() {
        return Err("amount is empty".to_string());
    }
    if trimmed.starts_with('-') {
        return Err("amount must not be negative".to_string());
    }
    let unsigned = trimmed.strip_prefix('+').unwrap_or(trimmed);

    let (int_part, frac_part) = match unsigned.split_once('.') {
        Some((int_part, frac_part)) => (int_part, frac_part),
        None => (unsigned, ""),
    };
    if int_part.is_empty() && frac_part.is_empty() {
        return Err("amount has no digits".to_string());
    }
    if !int_part.bytes().all(|b| b.is_ascii_digit())
        || !frac_part.bytes().all(|b| b.is_ascii_digit())
    {
        return Err("amount must be a plain decimal number".to_string());
    }

    let precision = usize::from(decimals);
    let frac_part = if frac_part.len() > precision {
        let (kept, dropped) = frac_part.split_at(precision);
        if dropped.bytes().any(|b| b != b'0') {
            return Err(format!("amount has more than {} fractional digits", decimals));
        }
        kept
    } else {
        frac_part
    };

    let mut digits = String::with_capacity(int_part.len() + precision);
    digits.push_str(int_part);
    digits.push_str(frac_part);
    digits.extend(std::iter::repeat('0').take(precision - frac_part.len()));
    let digits = digits.trim_start_matches('0');
    if digits.is_empty() {
        return Ok(U256::ZERO);
    }
    U256::from_str_radix(digits, 10).map_err(|e| format!("amount out of range: {}", e))
}

/// Render a smallest-unit integer as a decimal string with trailing zeros trimmed.
pub fn format_units(value: U256, decimals: u8) -> String {
    let raw = value.to_string();
    let precision = usize::from(decimals);
    if precision == 0 {
        return raw;
    }
    let padded = if raw.len() <= precision {
        format!("{}{}", "0".repeat(precision + 1 - raw.len()), raw)
    } else {
        raw
    };
    let (int_part, frac_part) = padded.split_at(padded.len() - precision);
    let frac_part = frac_part.trim_end_matches('0');
    if frac_part.is_empty() {
        int_part.to_string()
    } else {
        format!("{}.{}", int_part, frac_part)
    }
}
