//! Number and text formatting for console output.

/// Formats a number with comma separators for thousands.
///
/// ```
/// use entra_audit_tools::utils::format::format_number;
///
/// assert_eq!(format_number(1234), "1,234");
/// assert_eq!(format_number(42), "42");
/// ```
pub fn format_number(n: usize) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Formats a count with its noun, pluralizing with a trailing `s`.
///
/// ```
/// use entra_audit_tools::utils::format::format_count;
///
/// assert_eq!(format_count(1, "record"), "1 record");
/// assert_eq!(format_count(2500, "record"), "2,500 records");
/// ```
pub fn format_count(n: usize, noun: &str) -> String {
    if n == 1 {
        format!("1 {}", noun)
    } else {
        format!("{} {}s", format_number(n), noun)
    }
}
