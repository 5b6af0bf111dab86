//! Version label derivation.
//!
//! The label is the natural key of an application version: the bundle
//! filename with its final extension removed.

use std::path::is_separator;

/// Split a filename into `(base, extension)`.
///
/// The extension starts at the last `.` of the final path element and
/// includes the dot. A name without a dot in its final element has an
/// empty extension.
pub fn split_extension(filename: &str) -> (&str, &str) {
    for (idx, ch) in filename.char_indices().rev() {
        if is_separator(ch) {
            break;
        }
        if ch == '.' {
            return filename.split_at(idx);
        }
    }
    (filename, "")
}

/// Derive the version label for a bundle filename.
///
/// ```
/// use appversion::derive_label;
///
/// assert_eq!(derive_label("release-1.2.zip"), "release-1.2");
/// assert_eq!(derive_label("b.tar.gz"), "b.tar");
/// assert_eq!(derive_label("bundle"), "bundle");
/// ```
pub fn derive_label(filename: &str) -> String {
    split_extension(filename).0.to_string()
}
