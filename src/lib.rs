pub mod cli;
pub mod countdown;
mod error;

pub use countdown::{count_up, countdown};
pub use error::Error;

/// A duration unit: its suffix, how many seconds it holds and how many
/// fractional digits it shows when formatted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Symbol {
    pub sym: char,
    pub mult: u32,
    pub precision: usize,
}

/// Known units, strictly ascending by multiplier. The first one applies to
/// numbers without a suffix, the last one is the target when no arguments
/// are given.
pub const SYMBOLS: [Symbol; 4] = [
    Symbol { sym: 's', mult: 1, precision: 3 },
    Symbol { sym: 'm', mult: 60, precision: 0 },
    Symbol { sym: 'h', mult: 3600, precision: 0 },
    Symbol { sym: 'd', mult: 86400, precision: 0 },
];

/// Totals at or above this many seconds are rejected.
pub const CEILING: f64 = u32::MAX as f64;

// Absorbs binary representation error before truncating fractional digits,
// so 1.001 shows as 1.001 and not 1.000.
const FRACTION_EPSILON: f64 = 1e-6;

pub fn default_target() -> f64 {
    f64::from(SYMBOLS[SYMBOLS.len() - 1].mult)
}

/// Length in bytes of the decimal literal at the start of `s`, counting any
/// leading whitespace. Zero when `s` does not start with a number.
fn literal_len(s: &str) -> usize {
    let b = s.as_bytes();
    let digits_from = |mut i: usize| {
        while i < b.len() && b[i].is_ascii_digit() {
            i += 1;
        }
        i
    };

    let mut i = 0;
    while i < b.len() && b[i].is_ascii_whitespace() {
        i += 1;
    }
    if i < b.len() && (b[i] == b'+' || b[i] == b'-') {
        i += 1;
    }

    let int_end = digits_from(i);
    let mut digits = int_end - i;
    i = int_end;
    if i < b.len() && b[i] == b'.' {
        let frac_end = digits_from(i + 1);
        digits += frac_end - (i + 1);
        if digits > 0 {
            i = frac_end;
        }
    }
    if digits == 0 {
        return 0;
    }

    // exponent only counts when digits follow it, "1e" is a number and a suffix
    if i < b.len() && (b[i] == b'e' || b[i] == b'E') {
        let mut j = i + 1;
        if j < b.len() && (b[j] == b'+' || b[j] == b'-') {
            j += 1;
        }
        let exp_end = digits_from(j);
        if exp_end > j {
            i = exp_end;
        }
    }
    i
}

/// Parses one token such as `90`, `1.5h` or `1h30m` into seconds.
///
/// Every number may be followed by a unit suffix from [`SYMBOLS`]; without
/// one it counts as seconds. An unknown alphabetic suffix is an error.
pub fn parse_token(token: &str) -> Result<f64, Error> {
    let wrong = || Error::WrongTime(token.to_string());

    if token.is_empty() {
        return Err(wrong());
    }

    let mut rest = token;
    let mut total = 0.0;
    while !rest.is_empty() {
        let len = literal_len(rest);
        if len == 0 {
            return Err(wrong());
        }
        let mut part: f64 = rest[..len].trim_start().parse().map_err(|_| wrong())?;
        rest = &rest[len..];

        if let Some(c) = rest.chars().next()
            && c.is_alphabetic()
        {
            let symbol = SYMBOLS.iter().find(|s| s.sym == c).ok_or_else(wrong)?;
            part *= f64::from(symbol.mult);
            rest = &rest[c.len_utf8()..];
        }
        total += part;
    }

    if total.is_nan() || total < 0.0 {
        return Err(wrong());
    }
    Ok(total)
}

/// Sums every token into a target duration in seconds, or returns the
/// default of one day when there are none.
pub fn parse_args<S: AsRef<str>>(tokens: &[S]) -> Result<f64, Error> {
    if tokens.is_empty() {
        return Ok(default_target());
    }

    let mut total = 0.0;
    for token in tokens {
        let token = token.as_ref();
        total += parse_token(token)?;
        if total >= CEILING {
            return Err(Error::TooLarge(token.to_string()));
        }
    }
    Ok(total)
}

/// Formats seconds as one field per unit, largest first, e.g.
/// `00d 01h 01m 01.500s`. Fractional digits are truncated, never rounded.
pub fn format_duration(secs: f64) -> String {
    // also maps NaN to zero
    let mut remaining = if secs > 0.0 { secs } else { 0.0 };
    let mut out = String::with_capacity(24);

    for (i, symbol) in SYMBOLS.iter().enumerate().rev() {
        let mult = f64::from(symbol.mult);
        let piece = remaining / mult;
        let whole = piece.trunc();

        out.push_str(&format!("{:02}", whole as u64));
        if symbol.precision > 0 {
            let scale = 10f64.powi(symbol.precision as i32);
            let frac = ((piece - whole) * scale + FRACTION_EPSILON)
                .floor()
                .min(scale - 1.0);
            out.push_str(&format!(".{:0width$}", frac as u64, width = symbol.precision));
        }
        out.push(symbol.sym);
        if i > 0 {
            out.push(' ');
        }

        remaining = (remaining - whole * mult).max(0.0);
    }
    out
}
