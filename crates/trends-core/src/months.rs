//! Calendar-month ordering for the monthly time axis.
//!
//! The source dataset keys months by their full English names. Ordering is a
//! fixed 12-name lookup; month strings outside that set are never coerced to
//! a numeric position — they sort after December, deterministically by name.

/// The twelve English month names, in calendar order.
pub const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Zero-based calendar index of a full English month name.
///
/// Returns `None` for anything outside the fixed set (abbreviations, other
/// languages, numeric months). The match is exact and case-sensitive, like
/// the dataset itself.
pub fn month_index(name: &str) -> Option<usize> {
    MONTH_NAMES.iter().position(|m| *m == name)
}

/// `true` when `name` is one of the twelve recognised month names.
pub fn is_known_month(name: &str) -> bool {
    month_index(name).is_some()
}

/// Sort key that places recognised months in calendar order and everything
/// else after December.
///
/// The unrecognised bucket is ordered by the raw name so the overall sort
/// stays deterministic.
pub fn sort_key(name: &str) -> (usize, &str) {
    match month_index(name) {
        Some(idx) => (idx, ""),
        None => (MONTH_NAMES.len(), name),
    }
}

/// Short display form of a month name: its first three characters.
///
/// Falls back to the whole string when it is shorter than three characters.
pub fn short_label(name: &str) -> &str {
    name.char_indices()
        .nth(3)
        .map(|(idx, _)| &name[..idx])
        .unwrap_or(name)
}
