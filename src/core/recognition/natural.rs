//! Natural ordering for camera filenames (`IMG_2` before `IMG_10`).

use regex::Regex;
use std::cmp::Ordering;
use std::sync::OnceLock;

fn chunks(s: &str) -> impl Iterator<Item = &str> {
    static CHUNK: OnceLock<Regex> = OnceLock::new();
    CHUNK
        .get_or_init(|| Regex::new(r"\d+|\D+").expect("static pattern"))
        .find_iter(s)
        .map(|m| m.as_str())
}

fn cmp_digits(a: &str, b: &str) -> Ordering {
    let a_trimmed = a.trim_start_matches('0');
    let b_trimmed = b.trim_start_matches('0');
    a_trimmed
        .len()
        .cmp(&b_trimmed.len())
        .then_with(|| a_trimmed.cmp(b_trimmed))
        // "007" after "7" keeps the order total
        .then_with(|| a.len().cmp(&b.len()))
}

/// Compare two names chunk by chunk: digit runs numerically, text
/// case-insensitively, falling back to a plain comparison on ties.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let mut left = chunks(a);
    let mut right = chunks(b);

    loop {
        match (left.next(), right.next()) {
            (None, None) => return a.cmp(b),
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(x), Some(y)) => {
                let x_digit = x.starts_with(|c: char| c.is_ascii_digit());
                let y_digit = y.starts_with(|c: char| c.is_ascii_digit());
                let ord = match (x_digit, y_digit) {
                    (true, true) => cmp_digits(x, y),
                    _ => x.to_lowercase().cmp(&y.to_lowercase()),
                };
                if ord != Ordering::Equal {
                    return ord;
                }
            }
        }
    }
}
