use std::path::Path;

use crate::models::ConvertError;

/// Number of bytes needed for a `width * height` pixel stream packed 8 per byte.
pub fn packed_len(width: usize, height: usize) -> usize {
    (width * height).div_ceil(8)
}

/// Size of the fixed header plus offset table for `count` glyphs.
pub fn header_size(count: usize) -> usize {
    8 + count * 4
}

/// Create the directory holding `path` if it does not exist yet.
///
/// Bare file names have no directory component and need nothing.
pub(crate) fn ensure_parent_dir(path: &Path) -> Result<(), ConvertError> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => std::fs::create_dir_all(parent)
            .map_err(|err| ConvertError::io(parent, err)),
        _ => Ok(()),
    }
}
