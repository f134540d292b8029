use std::io::{self, Write};

/// Column separator written after every value.
pub const VALUE_DELIMITER: &str = ",\t";

/// Shortest round-trip decimal rendering of `value`.
///
/// Exponents in `[-4, 16)` are written positionally with a mandatory fractional
/// part (`15.0`, `0.0001`); anything else switches to scientific notation with
/// a signed, two-digit-minimum exponent (`1e-05`, `1.5e+16`).
pub fn format_shortest_f64(value: f64) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        let spelling = if value > 0.0 { "inf" } else { "-inf" };
        return spelling.to_string();
    }
    if value == 0.0 {
        let spelling = if value.is_sign_negative() { "-0.0" } else { "0.0" };
        return spelling.to_string();
    }

    let magnitude = value.abs();
    let scientific = format!("{magnitude:e}");
    let Some((mantissa, exponent)) = scientific.split_once('e') else {
        return scientific;
    };
    let Ok(exponent) = exponent.parse::<i32>() else {
        return scientific;
    };

    let sign = if value.is_sign_negative() { "-" } else { "" };
    let shortest: String = mantissa.chars().filter(|ch| *ch != '.').collect();
    let digits = nearest_even_tie(magnitude, &shortest, exponent).unwrap_or(shortest);

    if !(-4..16).contains(&exponent) {
        let (lead, rest) = digits.split_at(1);
        let mantissa = if rest.is_empty() {
            lead.to_string()
        } else {
            format!("{lead}.{rest}")
        };
        let exponent_sign = if exponent < 0 { '-' } else { '+' };
        return format!("{sign}{mantissa}e{exponent_sign}{:02}", exponent.unsigned_abs());
    }

    let positional = if exponent >= 0 {
        let integer_len = exponent as usize + 1;
        if digits.len() <= integer_len {
            format!("{digits}{}.0", "0".repeat(integer_len - digits.len()))
        } else {
            let (integer, fraction) = digits.split_at(integer_len);
            format!("{integer}.{fraction}")
        }
    } else {
        let leading_zeros = exponent.unsigned_abs() as usize - 1;
        format!("0.{}{digits}", "0".repeat(leading_zeros))
    };

    format!("{sign}{positional}")
}

/// Picks the even final digit when `magnitude` lies exactly halfway between
/// two equally short digit strings that both read back as `magnitude`.
///
/// `shortest` and `exponent` describe the `{:e}` rendering, which rounds such
/// ties away from zero.
fn nearest_even_tie(magnitude: f64, shortest: &str, exponent: i32) -> Option<String> {
    let last = shortest.bytes().last()? - b'0';
    if last % 2 == 0 {
        return None;
    }

    let exact = format!("{magnitude:.800e}");
    let (mantissa, exact_exponent) = exact.split_once('e')?;
    if exact_exponent.parse::<i32>().ok()? != exponent {
        return None;
    }
    let exact_digits: String = mantissa.chars().filter(|ch| *ch != '.').collect();
    let exact_digits = exact_digits.trim_end_matches('0');
    if exact_digits.len() != shortest.len() + 1 || !exact_digits.ends_with('5') {
        return None;
    }

    let truncated = &exact_digits[..shortest.len()];
    let candidate = if truncated != shortest {
        truncated.to_string()
    } else if last == 9 {
        return None;
    } else {
        let mut bumped = shortest[..shortest.len() - 1].to_string();
        bumped.push(char::from(b'0' + last + 1));
        bumped
    };

    let reads_back = format!("0.{candidate}e{}", exponent + 1).parse::<f64>().ok()? == magnitude;
    reads_back.then_some(candidate)
}

pub fn write_value<W: Write>(writer: &mut W, value: f64) -> io::Result<()> {
    writer.write_all(format_shortest_f64(value).as_bytes())?;
    writer.write_all(VALUE_DELIMITER.as_bytes())
}

pub fn write_literal<W: Write>(writer: &mut W, literal: &str) -> io::Result<()> {
    writer.write_all(literal.as_bytes())?;
    writer.write_all(VALUE_DELIMITER.as_bytes())
}
