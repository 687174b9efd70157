//! Filesystem helpers: directory creation and forced recursive copies.

use std::path::{Path, PathBuf};

use buildcloud_common::error::{BuildcloudError, Result};
use walkdir::WalkDir;

/// Creates `parent/name` (and any missing ancestors) and returns its path.
///
/// # Errors
///
/// Returns an error if the directory cannot be created.
pub fn ensure_dir(name: &str, parent: &Path) -> Result<PathBuf> {
    let path = parent.join(name);
    std::fs::create_dir_all(&path).map_err(|e| BuildcloudError::io(&path, e))?;
    Ok(path)
}

/// Copies a single file, creating the destination's parent directory.
///
/// # Errors
///
/// Returns an error if the source cannot be read or the destination written.
pub fn copy_file(src: &Path, dst: &Path) -> Result<()> {
    if let Some(parent) = dst.parent() {
        std::fs::create_dir_all(parent).map_err(|e| BuildcloudError::io(parent, e))?;
    }
    let _ = std::fs::copy(src, dst).map_err(|e| BuildcloudError::io(src, e))?;
    Ok(())
}

/// Recursively copies `src` into `dst`, merging with whatever already exists
/// there and overwriting files of the same name.
///
/// Any entry whose base name matches one of `ignore` is skipped along with
/// everything beneath it. Patterns support `*` wildcards.
///
/// # Errors
///
/// Returns an error if the source tree cannot be walked or an entry cannot
/// be copied.
pub fn copy_tree(src: &Path, dst: &Path, ignore: &[&str]) -> Result<()> {
    let walker = WalkDir::new(src)
        .follow_links(false)
        .into_iter()
        .filter_entry(|entry| {
            entry.depth() == 0
                || !entry
                    .file_name()
                    .to_str()
                    .is_some_and(|name| ignore.iter().any(|p| matches_pattern(p, name)))
        });

    for entry in walker {
        let entry = entry.map_err(|e| {
            let path = e.path().map_or_else(|| src.to_path_buf(), Path::to_path_buf);
            BuildcloudError::io(path, e.into())
        })?;
        let relative = entry
            .path()
            .strip_prefix(src)
            .map_err(|_| BuildcloudError::Config {
                message: format!("{} escapes {}", entry.path().display(), src.display()),
            })?;
        let target = dst.join(relative);

        let file_type = entry.file_type();
        if file_type.is_dir() {
            std::fs::create_dir_all(&target).map_err(|e| BuildcloudError::io(&target, e))?;
        } else if file_type.is_symlink() {
            copy_symlink(entry.path(), &target)?;
        } else {
            let _ = std::fs::copy(entry.path(), &target)
                .map_err(|e| BuildcloudError::io(entry.path(), e))?;
        }
    }

    tracing::debug!(src = %src.display(), dst = %dst.display(), "copied tree");
    Ok(())
}

#[cfg(unix)]
fn copy_symlink(link: &Path, target: &Path) -> Result<()> {
    let pointee = std::fs::read_link(link).map_err(|e| BuildcloudError::io(link, e))?;
    if target.symlink_metadata().is_ok() {
        std::fs::remove_file(target).map_err(|e| BuildcloudError::io(target, e))?;
    }
    std::os::unix::fs::symlink(&pointee, target).map_err(|e| BuildcloudError::io(target, e))
}

#[cfg(not(unix))]
fn copy_symlink(link: &Path, target: &Path) -> Result<()> {
    let _ = std::fs::copy(link, target).map_err(|e| BuildcloudError::io(link, e))?;
    Ok(())
}

/// Matches `name` against a shell-style pattern where `*` matches any run of
/// characters (including none). All other characters match literally.
#[must_use]
pub fn matches_pattern(pattern: &str, name: &str) -> bool {
    let mut parts = pattern.split('*');
    let Some(first) = parts.next() else {
        return name.is_empty();
    };
    let Some(mut rest) = name.strip_prefix(first) else {
        return false;
    };

    let tail: Vec<&str> = parts.collect();
    let Some((last, middle)) = tail.split_last() else {
        return rest.is_empty();
    };
    for part in middle {
        match rest.find(part) {
            Some(idx) => rest = &rest[idx + part.len()..],
            None => return false,
        }
    }
    rest.len() >= last.len() && rest.ends_with(last)
}
