//! Datatype gate (input pre-classification).
//!
//! Every command-line path passes through [`accept`] before any rule table
//! sees it. The checks run in a fixed order:
//!
//! ```text
//! directory?           ── Skip(Directory)
//! missing?             ── Err(NotFound)        fatal
//! '[' or ']' in name?  ── Err(BracketInName)   fatal
//! not .nii / .nii.gz?  ── Skip(NotNifti)
//! datatype allowed?    ── Skip(UnsupportedDatatype) | Accept
//! ```
//!
//! The datatype is read from the image header only after the cheap checks
//! pass, so missing files never reach the loader.

use crate::error::{PresetError, Result};
use crate::loader::ImageLoader;
use nifti::NiftiType;
use std::fmt;
use std::path::Path;

bitflags::bitflags! {
    /// Voxel datatypes, as a set.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct VoxelTypes: u16 {
        const UINT8   = 1 << 0;
        const INT8    = 1 << 1;
        const INT16   = 1 << 2;
        const UINT16  = 1 << 3;
        const INT32   = 1 << 4;
        const UINT32  = 1 << 5;
        const INT64   = 1 << 6;
        const UINT64  = 1 << 7;
        const FLOAT32 = 1 << 8;
        const FLOAT64 = 1 << 9;
    }
}

impl VoxelTypes {
    /// Real-valued scalar types the viewer can scale with a display range.
    pub const SUPPORTED: Self = Self::all();

    /// The set bit for `datatype`, or `None` for complex, RGB and 128-bit types.
    pub fn from_nifti(datatype: NiftiType) -> Option<Self> {
        let flag = match datatype {
            NiftiType::Uint8 => Self::UINT8,
            NiftiType::Int8 => Self::INT8,
            NiftiType::Int16 => Self::INT16,
            NiftiType::Uint16 => Self::UINT16,
            NiftiType::Int32 => Self::INT32,
            NiftiType::Uint32 => Self::UINT32,
            NiftiType::Int64 => Self::INT64,
            NiftiType::Uint64 => Self::UINT64,
            NiftiType::Float32 => Self::FLOAT32,
            NiftiType::Float64 => Self::FLOAT64,
            _ => return None,
        };
        Some(flag)
    }

    pub fn allows(self, datatype: Option<NiftiType>) -> bool {
        datatype.and_then(Self::from_nifti).is_some_and(|flag| self.contains(flag))
    }
}

/// A command-line path probed on the local filesystem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputFile {
    pub path: String,
    pub exists: bool,
    pub is_directory: bool,
    pub is_nifti: bool,
}

impl InputFile {
    pub fn probe(path: &str) -> Self {
        let fs_path = Path::new(path);
        Self {
            path: path.to_string(),
            exists: fs_path.exists(),
            is_directory: fs_path.is_dir(),
            is_nifti: is_nifti_name(path),
        }
    }
}

/// True when `name` ends with one of the NIfTI suffixes (`.nii`, `.nii.gz`).
pub fn is_nifti_name(name: &str) -> bool {
    regex!(r"\.nii(\.gz)?$").is_match(name)
}

/// Why a file was left out of the command.
#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    Directory,
    NotNifti,
    UnsupportedDatatype(Option<NiftiType>),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::Directory => f.write_str("is a directory"),
            SkipReason::NotNifti => f.write_str("is not a NIfTI image (.nii or .nii.gz)"),
            SkipReason::UnsupportedDatatype(Some(datatype)) => write!(f, "has unsupported datatype {datatype:?}"),
            SkipReason::UnsupportedDatatype(None) => f.write_str("has an unknown datatype code"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Verdict {
    Accept,
    Skip(SkipReason),
}

/// Decide whether `file` takes part in rule evaluation.
pub fn accept(file: &InputFile, allowed: VoxelTypes, loader: &dyn ImageLoader) -> Result<Verdict> {
    if file.is_directory {
        return Ok(Verdict::Skip(SkipReason::Directory));
    }
    if !file.exists {
        return Err(PresetError::NotFound { path: file.path.clone() });
    }
    if file.path.contains(['[', ']']) {
        return Err(PresetError::BracketInName { path: file.path.clone() });
    }
    if !file.is_nifti {
        return Ok(Verdict::Skip(SkipReason::NotNifti));
    }

    let datatype = loader.datatype(Path::new(&file.path))?;
    if allowed.allows(datatype) {
        Ok(Verdict::Accept)
    } else {
        Ok(Verdict::Skip(SkipReason::UnsupportedDatatype(datatype)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::testing::FakeLoader;

    fn file(path: &str) -> InputFile {
        InputFile { path: path.to_string(), exists: true, is_directory: false, is_nifti: is_nifti_name(path) }
    }

    #[test]
    fn nifti_suffixes() {
        for name in ["a.nii", "dir/b.nii.gz", "T1w.nii.gz"] {
            assert!(is_nifti_name(name), "{name}");
        }
        for name in ["a.json", "a.nii.bak", "a.gz", "nii", "a.nii.gz.yml"] {
            assert!(!is_nifti_name(name), "{name}");
        }
    }

    #[test]
    fn supported_types_cover_real_scalars_only() {
        let allowed = VoxelTypes::SUPPORTED;
        assert!(allowed.allows(Some(NiftiType::Uint8)));
        assert!(allowed.allows(Some(NiftiType::Float64)));
        assert!(!allowed.allows(Some(NiftiType::Complex64)));
        assert!(!allowed.allows(Some(NiftiType::Rgb24)));
        assert!(!allowed.allows(Some(NiftiType::Float128)));
        assert!(!allowed.allows(None));
    }

    #[test]
    fn checks_run_in_order() {
        let loader = FakeLoader::new().with_datatype("rgb.nii", Some(NiftiType::Rgb24));
        let allowed = VoxelTypes::SUPPORTED;

        let dir = InputFile { is_directory: true, exists: true, ..file("sub-01") };
        assert_eq!(accept(&dir, allowed, &loader).unwrap(), Verdict::Skip(SkipReason::Directory));

        let missing = InputFile { exists: false, ..file("gone[1].nii") };
        assert!(matches!(accept(&missing, allowed, &loader), Err(PresetError::NotFound { .. })));

        assert!(matches!(accept(&file("t1[0].nii"), allowed, &loader), Err(PresetError::BracketInName { .. })));
        assert!(matches!(accept(&file("t1].json"), allowed, &loader), Err(PresetError::BracketInName { .. })));

        assert_eq!(accept(&file("sub-01.json"), allowed, &loader).unwrap(), Verdict::Skip(SkipReason::NotNifti));
        assert_eq!(
            accept(&file("rgb.nii"), allowed, &loader).unwrap(),
            Verdict::Skip(SkipReason::UnsupportedDatatype(Some(NiftiType::Rgb24)))
        );
        assert_eq!(accept(&file("t1.nii.gz"), allowed, &loader).unwrap(), Verdict::Accept);
    }

    #[test]
    fn narrower_allow_list() {
        let loader = FakeLoader::new().with_datatype("f64.nii", Some(NiftiType::Float64));
        let verdict = accept(&file("f64.nii"), VoxelTypes::FLOAT32 | VoxelTypes::INT16, &loader).unwrap();
        assert_eq!(verdict, Verdict::Skip(SkipReason::UnsupportedDatatype(Some(NiftiType::Float64))));
    }

    #[test]
    fn probe_reads_the_filesystem() {
        let dir = tempfile::tempdir().unwrap();
        let image = dir.path().join("t1.nii.gz");
        std::fs::write(&image, b"").unwrap();

        let probed = InputFile::probe(image.to_str().unwrap());
        assert!(probed.exists && probed.is_nifti && !probed.is_directory);

        let probed = InputFile::probe(dir.path().to_str().unwrap());
        assert!(probed.exists && probed.is_directory && !probed.is_nifti);
    }
}
