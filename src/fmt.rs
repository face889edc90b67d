use chrono::NaiveDate;

/// Format a float as a dollar amount with thousands separators: $1,234.56
pub fn money(val: f64) -> String {
    let negative = val < 0.0;
    let with_commas = group_thousands(val.abs());
    if negative {
        format!("-${with_commas}")
    } else {
        format!("${with_commas}")
    }
}

/// Bare two-decimal amount for table cells: 1,234.56 (no currency symbol).
pub fn amount(val: f64) -> String {
    if val < 0.0 {
        format!("-{}", group_thousands(val.abs()))
    } else {
        group_thousands(val)
    }
}

fn group_thousands(abs: f64) -> String {
    let cents = format!("{:.2}", abs);
    let (int_part, dec_part) = cents.split_once('.').unwrap_or((cents.as_str(), "00"));

    let mut with_commas = String::new();
    for (i, c) in int_part.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            with_commas.push(',');
        }
        with_commas.push(c);
    }
    let with_commas: String = with_commas.chars().rev().collect();
    format!("{with_commas}.{dec_part}")
}

/// Full display date, day not zero-padded: "5 Mar 2024".
pub fn display_date(date: NaiveDate) -> String {
    date.format("%-d %b %Y").to_string()
}

/// Human-readable file size for status output.
pub fn format_bytes(size: u64) -> String {
    const KIB: u64 = 1024;
    const MIB: u64 = 1024 * 1024;
    if size >= MIB {
        format!("{:.1} MiB", size as f64 / MIB as f64)
    } else if size >= KIB {
        format!("{:.1} KiB", size as f64 / KIB as f64)
    } else {
        format!("{size} B")
    }
}
