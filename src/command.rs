//! DJV View command line assembly and process launch.

use crate::error::{ActionError, Result};
use std::path::{Component, Path, PathBuf};
use std::process::{Command, Stdio};

/// A viewer option: a flag and its value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewerOption {
    pub flag: &'static str,
    pub value: String,
}

impl ViewerOption {
    fn new(flag: &'static str, value: impl Into<String>) -> Self {
        Self {
            flag,
            value: value.into(),
        }
    }

    /// The option as a single `-flag value` argument.
    pub fn to_argument(&self) -> String {
        format!("{} {}", self.flag, self.value)
    }
}

/// Number of options placed between the executable and the media path.
pub const VIEWER_OPTION_COUNT: usize = 5;

/// Full command for one viewer launch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchCommand {
    pub executable: PathBuf,
    pub options: Vec<ViewerOption>,
    pub media: PathBuf,
}

impl LaunchCommand {
    /// Builds the command for `media` played back at `frames_per_second`.
    ///
    /// Both paths are normalized. The option order is what the viewer's CLI
    /// expects and must not change.
    pub fn build(executable: &Path, media: &str, frames_per_second: u32) -> Self {
        let options = vec![
            ViewerOption::new("-file_proxy", "1/2"),
            ViewerOption::new("-file_cache", "True"),
            ViewerOption::new("-playback", "Forward"),
            ViewerOption::new("-playback_speed", frames_per_second.to_string()),
            ViewerOption::new("-time_units", "Frames"),
        ];

        Self {
            executable: normalize_path(executable),
            options,
            media: normalize_path(Path::new(media)),
        }
    }

    /// Ordered arguments: executable, one entry per option, media path.
    pub fn arguments(&self) -> Vec<String> {
        let mut args = Vec::with_capacity(self.options.len() + 2);
        args.push(self.executable.to_string_lossy().to_string());
        args.extend(self.options.iter().map(ViewerOption::to_argument));
        args.push(self.media.to_string_lossy().to_string());
        args
    }

    /// Argument vector handed to the process, flags and values split.
    pub fn argv(&self) -> Vec<String> {
        let mut argv = Vec::with_capacity(self.options.len() * 2 + 1);
        for option in &self.options {
            argv.push(option.flag.to_string());
            argv.push(option.value.clone());
        }
        argv.push(self.media.to_string_lossy().to_string());
        argv
    }
}

/// Starts a viewer process.
pub trait ProcessSpawner {
    fn spawn(&self, command: &LaunchCommand) -> Result<()>;
}

/// Spawns the viewer detached from this process; the child is never waited on.
#[derive(Debug, Default, Clone, Copy)]
pub struct DetachedSpawner;

impl ProcessSpawner for DetachedSpawner {
    fn spawn(&self, command: &LaunchCommand) -> Result<()> {
        let child = Command::new(&command.executable)
            .args(command.argv())
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|source| ActionError::Spawn {
                program: command.executable.clone(),
                source,
            })?;

        tracing::info!("Started {:?} (pid {})", command.executable, child.id());
        Ok(())
    }
}

/// Lexically normalizes a path: drops `.` components, folds `..` into the
/// preceding component and collapses repeated separators.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                let last = normalized.components().next_back();
                if matches!(last, Some(Component::Normal(_))) {
                    normalized.pop();
                } else if !matches!(last, Some(Component::RootDir) | Some(Component::Prefix(_))) {
                    normalized.push("..");
                }
            }
            other => normalized.push(other.as_os_str()),
        }
    }

    if normalized.as_os_str().is_empty() {
        PathBuf::from(".")
    } else {
        normalized
    }
}
