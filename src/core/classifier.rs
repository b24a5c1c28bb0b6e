//! File name classification.
//!
//! Rules are evaluated on the lowercased whole name, first match wins:
//! protected media suffix, RAR volume (`-.r08`), nuisance extension,
//! numbered segment (`.001`), generic part (`.part12`).

use std::path::Path;

use crate::models::category::{CategoryKey, Classification};

/// Media containers and streams that are never deleted.
pub const SAFE_EXTENSIONS: &[&str] = &[
    ".mp4", ".mkv", ".avi", ".mov", ".wmv", ".m4v", ".mpg", ".mpeg", ".flv", ".vob", ".webm",
    ".divx", ".3gp", ".h264", ".h265",
];

/// Archive containers, checksum/index/info sidecars and still images.
pub const UNWANTED_EXTENSIONS: &[&str] = &[
    ".rar", ".zip", ".7z", ".sfv", ".idx", ".nfo", ".txt", ".par", ".par2", ".jpg", ".jpeg",
    ".png", ".gif",
];

pub fn classify(file_name: &str) -> Classification {
    let lower = file_name.to_lowercase();

    if is_protected(&lower) {
        return Classification::Keep;
    }

    if is_rar_volume(&lower) {
        return Classification::Unwanted(CategoryKey::rar_part());
    }

    if let Some(ext) = UNWANTED_EXTENSIONS.iter().find(|ext| lower.ends_with(*ext)) {
        let key = Path::new(&lower)
            .extension()
            .map(|e| CategoryKey::extension(&e.to_string_lossy()))
            .unwrap_or_else(|| CategoryKey::extension(ext));
        return Classification::Unwanted(key);
    }

    if is_numbered_segment(&lower) || is_part_segment(&lower) {
        return Classification::Unwanted(CategoryKey::numbered());
    }

    Classification::Keep
}

pub fn is_unwanted(file_name: &str) -> bool {
    classify(file_name).is_unwanted()
}

fn is_protected(lower: &str) -> bool {
    SAFE_EXTENSIONS.iter().any(|ext| lower.ends_with(ext))
}

/// `-.r` followed by exactly two digits at the end of the name.
fn is_rar_volume(lower: &str) -> bool {
    match split_trailing_digits(lower) {
        (head, 2) => head.ends_with("-.r"),
        _ => false,
    }
}

/// A dot followed by exactly three digits at the end of the name.
fn is_numbered_segment(lower: &str) -> bool {
    match split_trailing_digits(lower) {
        (head, 3) => head.ends_with('.'),
        _ => false,
    }
}

/// `.part` followed by one or more digits at the end of the name.
fn is_part_segment(lower: &str) -> bool {
    match split_trailing_digits(lower) {
        (head, n) if n > 0 => head.ends_with(".part"),
        _ => false,
    }
}

/// Splits off the run of ASCII digits at the end of `s`, returning the rest
/// and the number of digits removed.
fn split_trailing_digits(s: &str) -> (&str, usize) {
    let head = s.trim_end_matches(|c: char| c.is_ascii_digit());
    (head, s.len() - head.len())
}
