//! Artifact roles and derived workspace paths.
//!
//! Every artifact path is a pure function of the materialized scan name
//! and the workspace directory, built from a fixed suffix table. The
//! derivation is stable (same inputs, same paths) and suffix-composable:
//! each stage appends its own suffix to its primary input, so no stage
//! ever overwrites another's output.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::paths::{add_suffix, EXT_MINC, EXT_NIFTI, EXT_TRANSFORM};

/// Semantic suffix for the denoised volume.
pub const SUFFIX_DENOISED: &str = "denoised";
/// Semantic suffix for the normalized, linearly registered volume.
pub const SUFFIX_NORM: &str = "norm";
/// Semantic suffix for the brain mask.
pub const SUFFIX_MASK: &str = "mask";
/// Semantic suffix for the brain-extracted volume.
pub const SUFFIX_EXTRACTED: &str = "extracted";
/// Semantic suffix for the nonlinearly registered volume.
pub const SUFFIX_NONLINEAR: &str = "nl";
/// Semantic suffix for the DBM scalar field.
pub const SUFFIX_DBM: &str = "dbm";
/// Semantic suffix for the dimension-reordered DBM field.
pub const SUFFIX_RESHAPED: &str = "reshaped";

/// Semantic role of a pipeline artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactRole {
    /// The materialized NIfTI scan (decompressed copy or symlink).
    RawNifti,
    /// The scan converted to the working MINC format.
    Raw,
    Denoised,
    Norm,
    /// Linear transform produced alongside the normalized volume.
    NormTransform,
    Mask,
    Extracted,
    Nonlinear,
    /// Nonlinear transform produced alongside the warped volume.
    NonlinearTransform,
    Dbm,
    DbmReshaped,
    /// The final DBM map converted back to NIfTI.
    DbmNifti,
}

/// Derived workspace paths for every artifact of one run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactMap {
    /// Scan base name with all extensions stripped; names the output subdir.
    pub stem: String,
    pub raw_nifti: PathBuf,
    pub raw: PathBuf,
    pub denoised: PathBuf,
    pub norm: PathBuf,
    pub norm_transform: PathBuf,
    pub mask: PathBuf,
    pub extracted: PathBuf,
    pub nonlinear: PathBuf,
    pub nonlinear_transform: PathBuf,
    pub dbm: PathBuf,
    pub dbm_reshaped: PathBuf,
    pub dbm_nifti: PathBuf,
}

impl ArtifactMap {
    /// Derive every artifact path from the materialized scan name.
    pub fn derive(materialized_name: &str, workspace: &Path) -> Self {
        let raw_nifti = workspace.join(materialized_name);
        let stem = raw_nifti
            .file_stem()
            .unwrap_or_default()
            .to_string_lossy()
            .into_owned();
        let raw = raw_nifti.with_extension(EXT_MINC);
        let denoised = add_suffix(&raw, SUFFIX_DENOISED);
        let norm = add_suffix(&denoised, SUFFIX_NORM);
        let norm_transform = norm.with_extension(EXT_TRANSFORM);
        let mask = add_suffix(&norm, SUFFIX_MASK);
        let extracted = add_suffix(&norm, SUFFIX_EXTRACTED);
        let nonlinear = add_suffix(&extracted, SUFFIX_NONLINEAR);
        let nonlinear_transform = nonlinear.with_extension(EXT_TRANSFORM);
        let dbm = add_suffix(&nonlinear, SUFFIX_DBM);
        let dbm_reshaped = add_suffix(&dbm, SUFFIX_RESHAPED);
        let dbm_nifti = dbm_reshaped.with_extension(EXT_NIFTI);

        Self {
            stem,
            raw_nifti,
            raw,
            denoised,
            norm,
            norm_transform,
            mask,
            extracted,
            nonlinear,
            nonlinear_transform,
            dbm,
            dbm_reshaped,
            dbm_nifti,
        }
    }

    /// Path for a role.
    pub fn path(&self, role: ArtifactRole) -> &Path {
        match role {
            ArtifactRole::RawNifti => &self.raw_nifti,
            ArtifactRole::Raw => &self.raw,
            ArtifactRole::Denoised => &self.denoised,
            ArtifactRole::Norm => &self.norm,
            ArtifactRole::NormTransform => &self.norm_transform,
            ArtifactRole::Mask => &self.mask,
            ArtifactRole::Extracted => &self.extracted,
            ArtifactRole::Nonlinear => &self.nonlinear,
            ArtifactRole::NonlinearTransform => &self.nonlinear_transform,
            ArtifactRole::Dbm => &self.dbm,
            ArtifactRole::DbmReshaped => &self.dbm_reshaped,
            ArtifactRole::DbmNifti => &self.dbm_nifti,
        }
    }

    /// The curated save-subset: denoised, mask, extracted, nonlinear,
    /// and the final DBM NIfTI.
    pub fn staging_subset(&self) -> [&Path; 5] {
        [
            &self.denoised,
            &self.mask,
            &self.extracted,
            &self.nonlinear,
            &self.dbm_nifti,
        ]
    }
}
