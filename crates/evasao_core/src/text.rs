//! Repair of mis-decoded accented text
//!
//! The enrollment microdata is UTF-8 text that ends up decoded as Latin-1,
//! so every accented character arrives as a two-character sequence such as
//! `Ã§`. The repair is a pure string transform with no knowledge of the
//! column it is applied to.

/// Known mojibake sequences and their accented replacements, applied in order.
pub const MOJIBAKE_REPAIRS: [(&str, &str); 8] = [
    ("Ã§", "ç"),
    ("Ã£", "ã"),
    ("Ã³", "ó"),
    ("Ãª", "ê"),
    ("Ã¡", "á"),
    ("Ã\u{ad}", "í"),
    ("Ãº", "ú"),
    ("Ã©", "é"),
];

/// Stray markers left over after the repairs above.
pub const STRAY_MARKERS: [(&str, &str); 2] = [("Ã", "a"), ("Â", "")];

/// Rewrite known mis-decoded sequences and strip stray markers.
///
/// Idempotent: the output never contains `Ã` or `Â`, so a second pass
/// finds nothing to rewrite.
pub fn normalize_text(value: &str) -> String {
    if !value.contains(&['Ã', 'Â'][..]) {
        return value.to_string();
    }

    let mut repaired = value.to_string();
    for (broken, fixed) in MOJIBAKE_REPAIRS.iter().chain(STRAY_MARKERS.iter()) {
        if repaired.contains(broken) {
            repaired = repaired.replace(broken, fixed);
        }
    }
    repaired
}

/// Normalize a categorical feature value.
///
/// Same as [`normalize_text`] plus decimal-comma to decimal-point, so that
/// `"1,01"` read from the CSV and `"1.01"` typed by a caller land on the
/// same category.
pub fn clean_category(value: &str) -> String {
    normalize_text(value).replace(',', ".")
}
