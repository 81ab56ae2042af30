//! Price arithmetic in minor units (cents)

/// Parses a Steam currency string such as `"$0.50"`, `"1.234,56€"` or
/// `"12,34 pуб."` into minor units
///
/// The decimal separator is the last `.` or `,` when one or two digits follow
/// it; the other separator (or a space) groups thousands. A trailing group of
/// three digits is read as thousands, as in `"¥ 1,234"`. Leading symbols and
/// anything after the number are ignored. Returns `None` when the grouping is
/// inconsistent or the value is not positive.
pub fn parse_currency(raw: &str) -> Option<u64> {
    let start = raw.find(|c: char| c.is_ascii_digit())?;
    if raw[..start].ends_with(['.', ',']) {
        return None;
    }

    let mut number = String::new();
    let mut chars = raw[start..].chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '0'..='9' | '.' | ',' => number.push(c),
            ' ' | '\u{a0}' | '\u{202f}' if chars.peek().is_some_and(char::is_ascii_digit) => {
                number.push(' ')
            }
            _ => break,
        }
    }
    let number = number.trim_end_matches(['.', ',']);

    let (integer, fraction, decimal) = match number.rfind(['.', ',']) {
        Some(pos) if (1..=2).contains(&(number.len() - pos - 1)) => {
            (&number[..pos], &number[pos + 1..], number[pos..].chars().next())
        }
        _ => (number, "", None),
    };

    if !fraction.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let fraction: u64 = match fraction.len() {
        0 => 0,
        1 => fraction.parse::<u64>().ok()? * 10,
        _ => fraction.parse().ok()?,
    };

    let cents = parse_grouped(integer, decimal)?
        .checked_mul(100)?
        .checked_add(fraction)?;
    (cents > 0).then_some(cents)
}

/// Whole units with an optional thousands separator, which must differ from `decimal`
fn parse_grouped(integer: &str, decimal: Option<char>) -> Option<u64> {
    let mut separator = None;
    for c in integer.chars().filter(|c| !c.is_ascii_digit()) {
        if Some(c) == decimal || separator.is_some_and(|s| s != c) {
            return None;
        }
        separator = Some(c);
    }

    match separator {
        None => integer.parse().ok(),
        Some(separator) => {
            let groups: Vec<&str> = integer.split(separator).collect();
            let well_formed = (1..=3).contains(&groups[0].len())
                && groups[1..].iter().all(|group| group.len() == 3);
            if !well_formed {
                return None;
            }
            groups.concat().parse().ok()
        }
    }
}

/// Undercuts the lowest listing by one cent, never going below one cent
pub fn suggested_price(lowest_minor: u64) -> u64 {
    lowest_minor.saturating_sub(1).max(1)
}

/// Cents to a two-decimal major-unit price
pub fn to_major(minor: u64) -> f64 {
    minor as f64 / 100.0
}

/// Major-unit price to cents, rounding to the nearest cent
pub fn to_minor(major: f64) -> u64 {
    let cents = (major * 100.0).round();
    if cents.is_finite() && cents > 0.0 {
        cents as u64
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_currency() {
        assert_eq!(parse_currency("$0.50"), Some(50));
        assert_eq!(parse_currency("$0.03"), Some(3));
        assert_eq!(parse_currency("$1,204.17 USD"), Some(120_417));
        assert_eq!(parse_currency("$1,204.17"), Some(120_417));
        assert_eq!(parse_currency("12.5"), Some(1_250));
        assert_eq!(parse_currency("$0.00"), None);
        assert_eq!(parse_currency("N/A"), None);
        assert_eq!(parse_currency(""), None);
    }

    #[test]
    fn test_parse_currency_comma_decimal() {
        assert_eq!(parse_currency("0,50€"), Some(50));
        assert_eq!(parse_currency("1.234,56€"), Some(123_456));
        assert_eq!(parse_currency("12,34 pуб."), Some(1_234));
        assert_eq!(parse_currency("1 234,56 pуб."), Some(123_456));
        assert_eq!(parse_currency("R$ 1.234.567,89"), Some(123_456_789));
        assert_eq!(parse_currency("0,0€"), None);
    }

    #[test]
    fn test_parse_currency_whole_units() {
        assert_eq!(parse_currency("¥ 1,234"), Some(123_400));
        assert_eq!(parse_currency("₩ 12,345,678"), Some(1_234_567_800));
        assert_eq!(parse_currency("7 zł"), Some(700));
    }

    #[test]
    fn test_parse_currency_rejects_ambiguous_grouping() {
        assert_eq!(parse_currency("1,2,3"), None);
        assert_eq!(parse_currency("12.34567"), None);
        assert_eq!(parse_currency("1.234.56"), None);
        assert_eq!(parse_currency("1,23,456.00"), None);
        assert_eq!(parse_currency("$.50"), None);
    }

    #[test]
    fn test_suggested_price_floor() {
        assert_eq!(suggested_price(50), 49);
        assert_eq!(suggested_price(2), 1);
        assert_eq!(suggested_price(1), 1);
        for lowest in 2..500 {
            assert_eq!(suggested_price(lowest), lowest - 1);
        }
    }

    #[test]
    fn test_major_minor_conversion() {
        assert_eq!(to_major(49), 0.49);
        assert_eq!(to_major(1), 0.01);
        assert_eq!(to_major(120_417), 1204.17);
        assert_eq!(to_minor(0.49), 49);
        assert_eq!(to_minor(0.29), 29);
        assert_eq!(to_minor(1204.17), 120_417);
        assert_eq!(to_minor(0.0), 0);
    }
}
