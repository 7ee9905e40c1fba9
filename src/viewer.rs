//! Viewer location and launch.
//!
//! The viewer executable is resolved once at startup into a [`Viewer`] and
//! injected into command linearization; nothing else queries the platform.

use crate::engine::Invocation;
use crate::error::{PresetError, Result};
use std::path::Path;
use std::process::{Command, ExitStatus};

/// Known FSLeyes installations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Viewer {
    /// Linux workstation with the pinned FSL 6.0.4 install.
    LinuxLaboratory,
    /// Any other Linux machine.
    Linux,
    /// macOS, where `fsleyes` is expected on `PATH`.
    Mac,
    /// Explicit path from the preset file.
    Custom(String),
}

impl Viewer {
    pub const LINUX_LABORATORY_PATH: &'static str = "/usr/local/fsl-6.0.4/bin/fsleyes";
    pub const LINUX_PATH: &'static str = "/usr/local/fsl/bin/fsleyes";
    pub const MAC_PATH: &'static str = "fsleyes";

    /// Pick the viewer for the host platform.
    pub fn detect() -> Self {
        Self::detect_for(std::env::consts::OS, |path| path.is_file())
    }

    /// The preset's `viewer` path when set, the platform default otherwise.
    pub fn from_preset(configured: Option<&str>) -> Self {
        match configured {
            Some(path) => Viewer::Custom(path.to_string()),
            None => Self::detect(),
        }
    }

    /// Platform resolution with the filesystem probe factored out.
    pub fn detect_for(os: &str, is_file: impl Fn(&Path) -> bool) -> Self {
        match os {
            "macos" => Viewer::Mac,
            "linux" if is_file(Path::new(Self::LINUX_LABORATORY_PATH)) => Viewer::LinuxLaboratory,
            _ => Viewer::Linux,
        }
    }

    pub fn program(&self) -> &str {
        match self {
            Viewer::LinuxLaboratory => Self::LINUX_LABORATORY_PATH,
            Viewer::Linux => Self::LINUX_PATH,
            Viewer::Mac => Self::MAC_PATH,
            Viewer::Custom(path) => path,
        }
    }
}

/// Run `invocation` and wait for the viewer to exit.
///
/// With `echo`, the command line is logged first. Arguments are passed as argv
/// tokens; no shell is involved.
pub fn launch(invocation: &Invocation, echo: bool) -> Result<ExitStatus> {
    if echo {
        tracing::info!("Executing: {invocation}");
    }

    Command::new(&invocation.program)
        .args(&invocation.args)
        .status()
        .map_err(|source| PresetError::Launch { program: invocation.program.clone(), source })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mac_uses_path_lookup() {
        assert_eq!(Viewer::detect_for("macos", |_| true), Viewer::Mac);
        assert_eq!(Viewer::Mac.program(), "fsleyes");
    }

    #[test]
    fn linux_prefers_the_laboratory_install() {
        let lab = Viewer::detect_for("linux", |path| path == Path::new(Viewer::LINUX_LABORATORY_PATH));
        assert_eq!(lab, Viewer::LinuxLaboratory);
        assert_eq!(lab.program(), "/usr/local/fsl-6.0.4/bin/fsleyes");

        assert_eq!(Viewer::detect_for("linux", |_| false), Viewer::Linux);
        assert_eq!(Viewer::detect_for("freebsd", |_| true), Viewer::Linux);
    }

    #[test]
    fn custom_path() {
        assert_eq!(Viewer::Custom("/opt/fsl/bin/fsleyes".to_string()).program(), "/opt/fsl/bin/fsleyes");
    }

    #[test]
    fn preset_viewer_overrides_detection() {
        let viewer = Viewer::from_preset(Some("/opt/fsl/bin/fsleyes"));
        assert_eq!(viewer, Viewer::Custom("/opt/fsl/bin/fsleyes".to_string()));
        assert_eq!(Viewer::from_preset(None), Viewer::detect());
    }

    #[test]
    fn launch_reports_missing_programs() {
        let invocation = Invocation { program: "/nonexistent/fsleyes-preset-viewer".to_string(), args: vec![] };
        let err = launch(&invocation, false).unwrap_err();
        assert!(matches!(err, PresetError::Launch { .. }), "{err:?}");
    }

    #[cfg(unix)]
    #[test]
    fn launch_passes_argv_tokens() {
        let invocation = Invocation { program: "true".to_string(), args: vec!["a b.nii".to_string(), "-cm".to_string()] };
        assert!(launch(&invocation, true).unwrap().success());
    }
}
