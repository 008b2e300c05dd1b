//! Folder and file naming for the destination tree.

use std::borrow::Cow;
use std::path::Path;

/// Folder for photos that belong to nobody
pub const UNASSIGNED_FOLDER: &str = "Não Agrupadas";
/// Classroom folder used when neither the roster nor the group has one
pub const DEFAULT_CLASSROOM: &str = "SemTurma";

const FORBIDDEN: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Make `text` safe as a single path component.
///
/// Forbidden characters become `_` and surrounding whitespace is trimmed.
/// A bare `.` or `..` has its dots replaced too, so a component can never
/// climb out of its parent. Applying this twice changes nothing.
pub fn sanitize_component(text: &str) -> String {
    let replaced: String = text
        .chars()
        .map(|c| if FORBIDDEN.contains(&c) { '_' } else { c })
        .collect();
    let trimmed = replaced.trim();

    match trimmed {
        "." | ".." => "_".repeat(trimmed.len()),
        _ => trimmed.to_string(),
    }
}

/// Undo UTF-8 text that was decoded as Latin-1 (`JoÃ£o` → `João`).
///
/// Only attempted when the text carries the usual lead characters, and only
/// applied when every character fits in one byte and those bytes form valid
/// UTF-8. Otherwise the text comes back untouched.
pub fn repair_mojibake(text: &str) -> Cow<'_, str> {
    if !text.contains(&['Ã', 'Â'][..]) {
        return Cow::Borrowed(text);
    }

    let bytes: Option<Vec<u8>> = text
        .chars()
        .map(|c| u8::try_from(u32::from(c)).ok())
        .collect();

    match bytes.map(String::from_utf8) {
        Some(Ok(repaired)) => Cow::Owned(repaired),
        _ => Cow::Borrowed(text),
    }
}

/// `qr` followed by the payload, with any leading `qr`/`QR`/`Qr`/`qR` dropped
pub fn qr_tag(qr_code: &str) -> String {
    let code = qr_code.trim();
    let rest = match code.get(..2) {
        Some(prefix) if prefix.eq_ignore_ascii_case("qr") => &code[2..],
        _ => code,
    };
    format!("qr{}", rest)
}

/// `<stem>_<qr tag><.ext>` for a photo copied into a participant folder.
///
/// The tag is sanitized like any other path component.
pub fn tagged_file_name(original_file_name: &str, qr_code: &str) -> String {
    let path = Path::new(original_file_name);
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy())
        .unwrap_or_default();
    let ext = path
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();

    format!("{}_{}{}", stem, sanitize_component(&qr_tag(qr_code)), ext)
}

/// `<name> - <payload>`, sanitized
pub fn participant_folder_name(participant_name: &str, qr_code: &str) -> String {
    sanitize_component(&format!("{} - {}", participant_name, qr_code))
}
