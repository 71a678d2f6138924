//! Path primitives shared across the pipeline.
//!
//! Artifact names are built by appending semantic suffixes to a file stem
//! while keeping the extension, so derivations compose without collision:
//! `scan.mnc` -> `scan.denoised.mnc` -> `scan.denoised.norm.mnc`.

use std::env;
use std::io;
use std::path::{Path, PathBuf};

/// NIfTI extension (without leading dot).
pub const EXT_NIFTI: &str = "nii";
/// Gzip extension (without leading dot).
pub const EXT_GZIP: &str = "gz";
/// MINC extension (without leading dot).
pub const EXT_MINC: &str = "mnc";
/// Linear/nonlinear transform extension (without leading dot).
pub const EXT_TRANSFORM: &str = "xfm";

/// Expand `~` and make a user-supplied path absolute.
///
/// Relative paths are resolved against the current working directory.
/// The path is not required to exist.
pub fn process_path(raw: &str) -> io::Result<PathBuf> {
    let expanded = shellexpand::tilde(raw).to_string();
    let path = PathBuf::from(expanded);
    if path.is_absolute() {
        Ok(path)
    } else {
        Ok(env::current_dir()?.join(path))
    }
}

/// Append a dot-separated semantic suffix before the extension.
///
/// `add_suffix("scan.mnc", "denoised")` -> `scan.denoised.mnc`.
/// Stem and extension are both preserved, so repeated application
/// composes: `scan.denoised.norm.mnc`.
pub fn add_suffix(path: &Path, suffix: &str) -> PathBuf {
    build_with_stem_suffix(path, &format!(".{}", suffix.trim_start_matches('.')))
}

/// Append text directly to the stem, with no separator.
///
/// Used for companion files like the template mask:
/// `append_to_stem("model.mnc", "_mask")` -> `model_mask.mnc`.
pub fn append_to_stem(path: &Path, text: &str) -> PathBuf {
    build_with_stem_suffix(path, text)
}

fn build_with_stem_suffix(path: &Path, text: &str) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = match path.extension() {
        Some(ext) => format!("{}{}.{}", stem, text, ext.to_string_lossy()),
        None => format!("{}{}", stem, text),
    };
    match path.parent() {
        Some(parent) => parent.join(name),
        None => PathBuf::from(name),
    }
}

/// Whether a scan file name ends in the gzipped NIfTI extension.
pub fn is_gzipped(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.eq_ignore_ascii_case(EXT_GZIP))
        .unwrap_or(false)
}
