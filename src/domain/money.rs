//! Integer money helpers. Amounts are stored in the smallest currency unit.

/// Parameters used to price an order at checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PricingPolicy {
    /// Tax rate in basis points (1900 = 19 %).
    pub tax_rate_basis_points: i64,
    /// Flat fee charged on delivery orders.
    pub delivery_fee_cents: i64,
}

impl Default for PricingPolicy {
    fn default() -> Self {
        Self {
            tax_rate_basis_points: 1900,
            delivery_fee_cents: 500_000,
        }
    }
}

/// Totals computed for an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize)]
pub struct OrderTotals {
    pub subtotal_cents: i64,
    pub tax_cents: i64,
    pub delivery_fee_cents: i64,
    pub discount_cents: i64,
    pub total_cents: i64,
}

/// Applies `basis_points` to `amount_cents`, rounding half away from zero.
pub fn apply_rate(amount_cents: i64, basis_points: i64) -> i64 {
    let product = amount_cents * basis_points;
    if product >= 0 {
        (product + 5_000) / 10_000
    } else {
        (product - 5_000) / 10_000
    }
}

/// Formats cents as a decimal string with thousands separators, e.g. `12.345,50`.
pub fn format_cents(cents: i64) -> String {
    let negative = cents < 0;
    let abs = cents.unsigned_abs();
    let units = (abs / 100).to_string();
    let fraction = abs % 100;

    let mut grouped = String::with_capacity(units.len() + units.len() / 3);
    for (index, ch) in units.chars().enumerate() {
        if index > 0 && (units.len() - index) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }

    let sign = if negative { "-" } else { "" };
    format!("{sign}{grouped},{fraction:02}")
}

/// Parses a user-entered amount into cents.
///
/// Accepts `12.50`, `12,5`, `1250` and grouped thousands as printed by
/// [`format_cents`] (`1.234`, `1.234.567,89`). When both separators appear
/// the last one is the decimal mark; a lone separator followed by exactly
/// three digits groups thousands.
pub fn parse_cents(input: &str) -> Option<i64> {
    let trimmed = input.trim().replace(' ', "");
    let (negative, body) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed.as_str()),
    };

    let (units, fraction) = match (body.rfind('.'), body.rfind(',')) {
        (Some(dot), Some(comma)) => {
            let decimal_at = dot.max(comma);
            let grouping = if decimal_at == dot { ',' } else { '.' };
            (ungroup(&body[..decimal_at], grouping)?, &body[decimal_at + 1..])
        }
        (Some(at), None) | (None, Some(at)) => {
            let separator = if body[at..].starts_with('.') { '.' } else { ',' };
            let tail = &body[at + 1..];
            if body.matches(separator).count() > 1 || tail.len() == 3 {
                (ungroup(body, separator)?, "")
            } else {
                (body[..at].to_string(), tail)
            }
        }
        (None, None) => (body.to_string(), ""),
    };

    let all_digits = |part: &str| part.bytes().all(|byte| byte.is_ascii_digit());
    if fraction.len() > 2 || !all_digits(&units) || !all_digits(fraction) {
        return None;
    }
    if units.is_empty() && fraction.is_empty() {
        return None;
    }

    let units: i64 = if units.is_empty() { 0 } else { units.parse().ok()? };
    let fraction: i64 = match fraction.len() {
        0 => 0,
        1 => fraction.parse::<i64>().ok()? * 10,
        _ => fraction.parse().ok()?,
    };

    let cents = units.checked_mul(100)?.checked_add(fraction)?;
    Some(if negative { -cents } else { cents })
}

/// Joins digit groups split by `separator`; every group after the first has
/// exactly three digits.
fn ungroup(units: &str, separator: char) -> Option<String> {
    let mut groups = units.split(separator);
    let first = groups.next()?;
    if first.is_empty() || first.len() > 3 || first.starts_with('0') {
        return None;
    }

    let mut joined = first.to_string();
    for group in groups {
        if group.len() != 3 {
            return None;
        }
        joined.push_str(group);
    }
    Some(joined)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn apply_rate_rounds_half_up() {
        assert_eq!(apply_rate(10_000, 1900), 1_900);
        assert_eq!(apply_rate(150, 1900), 29);
        assert_eq!(apply_rate(0, 1900), 0);
    }

    #[test]
    fn format_cents_groups_thousands() {
        assert_eq!(format_cents(0), "0,00");
        assert_eq!(format_cents(1250), "12,50");
        assert_eq!(format_cents(123_456_789), "1.234.567,89");
        assert_eq!(format_cents(-500), "-5,00");
    }

    #[test]
    fn parse_cents_accepts_common_formats() {
        assert_eq!(parse_cents("12.50"), Some(1250));
        assert_eq!(parse_cents("12,5"), Some(1250));
        assert_eq!(parse_cents(" 8 "), Some(800));
        assert_eq!(parse_cents("-1.5"), Some(-150));
        assert_eq!(parse_cents("abc"), None);
        assert_eq!(parse_cents(""), None);
        assert_eq!(parse_cents("--5"), None);
    }

    #[test]
    fn parse_cents_reads_back_formatted_amounts() {
        for cents in [0, 1250, 123_400, 123_456_789, -500] {
            assert_eq!(parse_cents(&format_cents(cents)), Some(cents));
        }
        assert_eq!(parse_cents("1.234"), Some(123_400));
        assert_eq!(parse_cents("25.000"), Some(2_500_000));
        assert_eq!(parse_cents("1,234.50"), Some(123_450));
        assert_eq!(parse_cents("1.23.456"), None);
        assert_eq!(parse_cents("0.125"), None);
    }
}
