//! Number formatting shared by the normalized payloads

/// Suffix tiers, smallest first
const MARKET_CAP_TIERS: [(f64, &str); 4] = [(1e3, "K"), (1e6, "M"), (1e9, "B"), (1e12, "T")];

/// Formats a USD amount with a T/B/M/K suffix, e.g. `1.5e12 -> "$1.5T"`
///
/// Suffixed values keep at most two decimals with trailing zeros trimmed;
/// values under a thousand are rounded to whole dollars. Negative amounts
/// keep their sign in front of the dollar sign. The tier is picked after
/// rounding, so `999_999_999` reads `$1B`.
pub fn format_market_cap(value: f64) -> String {
    if !value.is_finite() {
        return "$0".to_string();
    }

    let sign = if value < 0.0 { "-" } else { "" };
    let abs = value.abs();

    if abs.round() < 1e3 {
        return format!("{}${}", sign, abs.round() as u64);
    }

    let round2 = |unit: f64| (abs / unit * 100.0).round() / 100.0;
    let (unit, suffix) = MARKET_CAP_TIERS
        .into_iter()
        .find(|&(unit, _)| round2(unit) < 1e3)
        .unwrap_or((1e12, "T"));

    format!("{}${}{}", sign, trim_decimals(round2(unit), 2), suffix)
}

/// Formats a price: two decimals above $1, more precision for sub-dollar coins
pub fn format_price(value: f64) -> String {
    if value >= 1.0 {
        format!("${}", with_thousands(value, 2))
    } else if value > 0.0 {
        format!("${:.4}", value)
    } else {
        "$0".to_string()
    }
}

/// Formats a percentage change with an explicit sign, e.g. `"+2.1%"`
pub fn format_change(pct: f64) -> String {
    if pct > 0.0 {
        format!("+{:.1}%", pct)
    } else {
        format!("{:.1}%", pct)
    }
}

/// Annualizes an 8-hour funding rate (fraction) to an APR percentage
///
/// Three funding periods per day, 365 days a year.
pub fn annualize_funding(rate_8h: f64) -> f64 {
    rate_8h * 3.0 * 365.0 * 100.0
}

/// Human label for an APR percentage, e.g. `10.95 -> "≈ 11% APR"`
pub fn format_apr(apr_pct: f64) -> String {
    format!("≈ {}% APR", apr_pct.round() as i64)
}

/// Rounds to one decimal place
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Rounds to `places` decimals and drops trailing zeros
fn trim_decimals(value: f64, places: usize) -> String {
    let s = format!("{:.*}", places, value);
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        s
    }
}

/// Formats with comma thousands separators
fn with_thousands(value: f64, places: usize) -> String {
    let s = format!("{:.*}", places, value);
    let (int_part, frac_part) = match s.split_once('.') {
        Some((i, f)) => (i.to_string(), Some(f.to_string())),
        None => (s.clone(), None),
    };

    let mut grouped = String::new();
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    match frac_part {
        Some(f) => format!("{}.{}", grouped, f),
        None => grouped,
    }
}
