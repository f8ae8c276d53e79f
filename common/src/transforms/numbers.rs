/// `$1234.50`
pub fn format_usd(value: f64) -> String {
    format!("${value:.2}")
}

/// ` (+0.28%)`, with an explicit sign for anything non-negative.
pub fn format_pct_change(pct: f64) -> String {
    let sign = if pct >= 0.0 { "+" } else { "" };
    format!(" ({sign}{pct:.2}%)")
}

/// Whole numbers lose their fraction: `85` not `85.0`.
pub fn format_score(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}%", value as i64)
    } else {
        format!("{value}%")
    }
}
