//! Image loading.
//!
//! The engine never touches NIfTI files directly. It asks an [`ImageLoader`]
//! for two things:
//!
//! - the declared voxel datatype (header only), used by the datatype gate;
//! - the voxel intensity extremes, used by intensity rules.
//!
//! [`NiftiLoader`] is the real implementation. [`CachedLoader`] wraps any
//! loader and remembers voxel statistics per path for the length of a run, so
//! several intensity rules matching one image load it once.

use crate::error::{PresetError, Result};
use ndarray::ArrayD;
use ndarray::parallel::prelude::*;
use nifti::{IntoNdArray, NiftiHeader, NiftiObject, NiftiType, ReaderOptions};
use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Minimum and maximum voxel intensity of one image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VoxelStats {
    pub min: f64,
    pub max: f64,
}

impl VoxelStats {
    /// Reduce a voxel array to its extremes. NaN voxels are ignored.
    ///
    /// Returns `None` for an empty array or one holding only NaNs.
    pub fn from_voxels(voxels: &ArrayD<f64>) -> Option<Self> {
        let (min, max) = voxels
            .par_iter()
            .copied()
            .fold(|| (f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)))
            .reduce(|| (f64::INFINITY, f64::NEG_INFINITY), |a, b| (a.0.min(b.0), a.1.max(b.1)));

        if min > max { None } else { Some(Self { min, max }) }
    }
}

/// Source of voxel datatypes and intensities.
pub trait ImageLoader: std::fmt::Debug {
    /// Declared voxel datatype, or `None` when the header carries a code the
    /// NIfTI standard does not define.
    fn datatype(&self, path: &Path) -> Result<Option<NiftiType>>;

    /// Intensity extremes of the whole volume.
    fn voxel_stats(&self, path: &Path) -> Result<VoxelStats>;
}

/// Reads `.nii` / `.nii.gz` files with the `nifti` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct NiftiLoader;

impl ImageLoader for NiftiLoader {
    fn datatype(&self, path: &Path) -> Result<Option<NiftiType>> {
        let header = NiftiHeader::from_file(path).map_err(|err| PresetError::image_load(path, err))?;
        Ok(header.data_type().ok())
    }

    fn voxel_stats(&self, path: &Path) -> Result<VoxelStats> {
        let object = ReaderOptions::new().read_file(path).map_err(|err| PresetError::image_load(path, err))?;
        let voxels = object.into_volume().into_ndarray::<f64>().map_err(|err| PresetError::image_load(path, err))?;

        tracing::debug!(path = %path.display(), shape = ?voxels.shape(), "loaded voxel data");

        VoxelStats::from_voxels(&voxels).ok_or_else(|| PresetError::image_load(path, "image holds no voxel values"))
    }
}

/// Memoizes [`ImageLoader::voxel_stats`] per path.
///
/// Datatype lookups are passed through: each file is gated once per run.
#[derive(Debug)]
pub struct CachedLoader<L> {
    inner: L,
    stats: RefCell<HashMap<PathBuf, VoxelStats>>,
}

impl<L: ImageLoader> CachedLoader<L> {
    pub fn new(inner: L) -> Self {
        Self { inner, stats: RefCell::new(HashMap::new()) }
    }

    pub fn inner(&self) -> &L {
        &self.inner
    }
}

impl<L: ImageLoader> ImageLoader for CachedLoader<L> {
    fn datatype(&self, path: &Path) -> Result<Option<NiftiType>> {
        self.inner.datatype(path)
    }

    fn voxel_stats(&self, path: &Path) -> Result<VoxelStats> {
        if let Some(stats) = self.stats.borrow().get(path) {
            return Ok(*stats);
        }
        let stats = self.inner.voxel_stats(path)?;
        self.stats.borrow_mut().insert(path.to_path_buf(), stats);
        Ok(stats)
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! In-memory loader used by engine and API tests.

    use super::*;
    use std::cell::Cell;

    #[derive(Debug, Default)]
    pub(crate) struct FakeLoader {
        datatypes: HashMap<PathBuf, Option<NiftiType>>,
        stats: HashMap<PathBuf, VoxelStats>,
        pub(crate) stat_loads: Cell<usize>,
    }

    impl FakeLoader {
        pub(crate) fn new() -> Self {
            Self::default()
        }

        pub(crate) fn with_datatype(mut self, path: impl Into<PathBuf>, datatype: Option<NiftiType>) -> Self {
            self.datatypes.insert(path.into(), datatype);
            self
        }

        pub(crate) fn with_max(mut self, path: impl Into<PathBuf>, max: f64) -> Self {
            self.stats.insert(path.into(), VoxelStats { min: 0.0, max });
            self
        }
    }

    impl ImageLoader for FakeLoader {
        fn datatype(&self, path: &Path) -> Result<Option<NiftiType>> {
            Ok(self.datatypes.get(path).copied().unwrap_or(Some(NiftiType::Float32)))
        }

        fn voxel_stats(&self, path: &Path) -> Result<VoxelStats> {
            self.stat_loads.set(self.stat_loads.get() + 1);
            self.stats.get(path).copied().ok_or_else(|| PresetError::image_load(path, "no fake voxels"))
        }
    }
}
