use crate::engine::{self, Invocation, Partition, VoxelTypes};
use crate::error::Result;
use crate::loader::ImageLoader;
use crate::preset::{PartitionMode, Preset};
use crate::viewer::Viewer;
use std::time::{Duration, Instant};

pub use crate::engine::{FileReport, Outcome};

/// Options that affect resolution.
#[derive(Debug, Clone)]
pub struct Options {
    /// Voxel datatypes accepted by the gate.
    pub allowed: VoxelTypes,
    /// Overrides the preset's partition mode.
    pub partition: Option<PartitionMode>,
}

impl Default for Options {
    fn default() -> Self {
        Self { allowed: VoxelTypes::SUPPORTED, partition: None }
    }
}

/// Result of [`resolve`] and [`resolve_with`].
#[derive(Debug, Clone)]
pub struct Resolution {
    /// One report per argument, in input order.
    pub files: Vec<FileReport>,
    /// Matched and unmatched groups.
    pub partition: Partition,
    /// Partition mode that produced `partition`.
    pub mode: PartitionMode,
    /// Total elapsed time.
    pub elapsed: Duration,
}

impl Resolution {
    /// Arguments left out with a warning.
    pub fn skipped(&self) -> impl Iterator<Item = &FileReport> {
        self.files.iter().filter(|report| matches!(report.outcome, Outcome::Skipped(_)))
    }
}

/// Resolve directives for `args` with default [`Options`].
///
/// # Example
/// ```no_run
/// use fsleyes_preset::{CachedLoader, NiftiLoader, Preset, Viewer, build_command, resolve};
///
/// let preset = Preset::bundled()?;
/// let loader = CachedLoader::new(NiftiLoader);
/// let args = vec!["sub-01_T2w_seg.nii.gz".to_string(), "sub-01_T2w.nii.gz".to_string()];
///
/// let resolution = resolve(&args, &preset, &loader)?;
/// println!("{}", build_command(&Viewer::detect(), &resolution));
/// # Ok::<(), fsleyes_preset::PresetError>(())
/// ```
pub fn resolve(args: &[String], preset: &Preset, loader: &dyn ImageLoader) -> Result<Resolution> {
    resolve_with(args, preset, loader, &Options::default())
}

/// Resolve directives for `args` using the provided `options`.
///
/// Stops at the first fatal input error (missing file, bracket in a name).
pub fn resolve_with(args: &[String], preset: &Preset, loader: &dyn ImageLoader, options: &Options) -> Result<Resolution> {
    let start = Instant::now();
    let mode = options.partition.unwrap_or(preset.partition);

    let pipeline = engine::Pipeline::new(preset, loader, options.allowed);
    let (files, partition) = pipeline.run(args, mode)?;

    Ok(Resolution { files, partition, mode, elapsed: start.elapsed() })
}

/// The full viewer invocation for `resolution`.
pub fn build_command(viewer: &Viewer, resolution: &Resolution) -> Invocation {
    engine::linearize(viewer, &resolution.partition)
}
