//! Library lookup across a list of search roots.

use std::path::{Path, PathBuf};

use tracing::trace;
use walkdir::WalkDir;

use crate::error::{CheckError, Result};

/// Locate a library by name under the given search roots.
///
/// - An absolute `name` is returned unchanged; whether it exists is left
///   to the later open.
/// - Otherwise each root is probed for `root/name` directly, in order.
/// - If no root has a direct match, each root is searched recursively for
///   a file with that name, again in root order. The order in which a
///   recursive walk visits subdirectories is implementation-defined
///   (whatever order the directory walk yields).
///
/// A library that cannot be found anywhere is a fatal error; the resolver
/// cannot produce a partial result.
pub fn find_library(name: &str, roots: &[PathBuf]) -> Result<PathBuf>
{
    let requested = Path::new(name);
    if requested.is_absolute() {
        return Ok(requested.to_path_buf());
    }

    // Check for in root first
    for root in roots {
        let direct = root.join(name);
        if direct.exists() {
            trace!(name, root = %root.display(), "direct hit");
            return Ok(direct);
        }
    }

    // Lookup in subdirs
    for root in roots {
        for entry in WalkDir::new(root).into_iter().filter_map(std::result::Result::ok) {
            if entry.file_type().is_file() && entry.file_name() == requested.as_os_str() {
                trace!(name, found = %entry.path().display(), "recursive hit");
                return Ok(entry.into_path());
            }
        }
    }

    Err(CheckError::LibraryNotFound(name.to_string()))
}
