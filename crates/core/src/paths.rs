//! Parent-path math across POSIX and drive-letter path syntaxes.
//!
//! Pure and total: absence of a parent is a value, never an error.

/// Compute the parent of `path`, or `None` for filesystem roots and empty
/// input.
///
/// The final segment is stripped at whichever separator (`/` or `\`) occurs
/// last. If the remaining prefix is a bare drive letter and the original
/// path used backslashes, the parent is the drive root (`C:\`), not the
/// bare drive.
pub fn parent_of(path: &str) -> Option<String> {
    if path.is_empty() || is_navigable_root(path) {
        return None;
    }
    let sep = path.rfind(['/', '\\'])?;
    if sep == 0 {
        // "/usr" -> "/". A lone separator is already a root, handled above.
        return Some("/".to_string());
    }
    let prefix = &path[..sep];
    if is_bare_drive(prefix) && path.contains('\\') {
        return Some(format!("{prefix}\\"));
    }
    Some(prefix.to_string())
}

/// True for path forms that have no parent: `/`, a bare drive (`C:`), or a
/// drive root (`C:\`). Used to disable "navigate up".
pub fn is_navigable_root(path: &str) -> bool {
    match path.as_bytes() {
        b"/" => true,
        [drive, b':'] => drive.is_ascii_alphabetic(),
        [drive, b':', b'\\'] => drive.is_ascii_alphabetic(),
        _ => false,
    }
}

fn is_bare_drive(s: &str) -> bool {
    matches!(s.as_bytes(), [drive, b':'] if drive.is_ascii_alphabetic())
}
