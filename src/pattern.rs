//! Platform-specific install layouts and per-segment matchers.
//!
//! A layout is an ordered list of path segments. The first segment is a
//! literal filesystem root; every following segment is a regular expression
//! matched against a single directory or file name at the corresponding
//! depth below that root.
//!
//! # Platform Layouts
//!
//! - **Windows**: `C:` / `Program Files` / `djv-<version>` / `bin` / `djv_view.exe`
//! - **macOS**: `Application` / `DJV.app` / `Contents` / `MacOS` / `DJV`
//! - **Other**: `usr` / `local` / `djv` / `djv_view`

use crate::error::{ActionError, Result};
use regex::Regex;
use std::fmt;
use std::path::{Path, PathBuf};

/// Host platform family, which decides the conventional install layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Windows,
    MacOs,
    Other,
}

impl Platform {
    /// Returns the platform family the crate was compiled for.
    pub fn current() -> Self {
        if cfg!(target_os = "windows") {
            Platform::Windows
        } else if cfg!(target_os = "macos") {
            Platform::MacOs
        } else {
            Platform::Other
        }
    }

    /// Returns the raw segment list for this platform's install layout.
    pub fn segments(&self) -> Vec<&'static str> {
        match self {
            Platform::Windows => vec!["C:", "Program Files", r"djv-\d.+", "bin", r"djv_view\.exe"],
            Platform::MacOs => vec!["Application", r"DJV\.app", "Contents", "MacOS", "DJV"],
            Platform::Other => vec!["usr", "local", "djv", "djv_view"],
        }
    }
}

/// Matcher for a single path component.
///
/// Matching is anchored at the start of the name only, so `djv` accepts
/// `djv-1.2.3` as well as `djv`.
#[derive(Debug, Clone)]
pub struct SegmentMatcher {
    source: String,
    regex: Regex,
}

impl SegmentMatcher {
    pub fn compile(pattern: &str) -> Result<Self> {
        let regex = Regex::new(&format!("^(?:{pattern})")).map_err(|e| ActionError::InvalidPattern {
            pattern: pattern.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            source: pattern.to_string(),
            regex,
        })
    }

    pub fn matches(&self, name: &str) -> bool {
        self.regex.is_match(name)
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }
}

/// A compiled install layout: literal root plus one matcher per depth level.
#[derive(Debug, Clone)]
pub struct PathPattern {
    root: PathBuf,
    segments: Vec<SegmentMatcher>,
}

impl PathPattern {
    /// Compiles `segments`, treating the first entry as the literal root.
    ///
    /// `base_dir` anchors a relative root (e.g. `usr` becomes `/usr` with a
    /// base of `/`). A Windows drive root such as `C:` is expanded to `C:\`
    /// since a bare drive letter names the current directory on that drive.
    pub fn compile(segments: &[&str], base_dir: Option<&Path>) -> Result<Self> {
        let (first, rest) = segments.split_first().ok_or_else(|| ActionError::InvalidPattern {
            pattern: String::new(),
            reason: "segment list is empty".to_string(),
        })?;

        if rest.is_empty() {
            return Err(ActionError::InvalidPattern {
                pattern: first.to_string(),
                reason: "segment list needs at least one pattern after the root".to_string(),
            });
        }

        let mut root = first.to_string();
        if is_drive_letter(&root) {
            root.push('\\');
        }

        let root = match base_dir {
            Some(base) if Path::new(&root).is_relative() => base.join(root),
            _ => PathBuf::from(root),
        };

        let segments = rest
            .iter()
            .map(|pattern| SegmentMatcher::compile(pattern))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { root, segments })
    }

    /// Compiles the conventional layout of `platform`.
    pub fn for_platform(platform: Platform, base_dir: Option<&Path>) -> Result<Self> {
        Self::compile(&platform.segments(), base_dir)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Matcher applied to entries found at `depth` below the root.
    pub fn segment(&self, depth: usize) -> Option<&SegmentMatcher> {
        self.segments.get(depth)
    }

    /// Index of the final (executable) matcher.
    pub fn final_depth(&self) -> usize {
        self.segments.len() - 1
    }
}

impl fmt::Display for PathPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = std::iter::once(self.root.display().to_string())
            .chain(self.segments.iter().map(|s| s.as_str().to_string()))
            .collect();
        write!(f, "[{}]", parts.join(", "))
    }
}

fn is_drive_letter(segment: &str) -> bool {
    let bytes = segment.as_bytes();
    bytes.len() == 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':'
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_platform_starts_with_a_literal_root() {
        for platform in [Platform::Windows, Platform::MacOs, Platform::Other] {
            let segments = platform.segments();
            assert!(segments.len() > 1);
            assert!(segments[0].chars().all(|c| c.is_alphanumeric() || c == ':'));
        }
    }

    #[test]
    fn drive_letter_root_gains_separator() {
        let pattern = PathPattern::compile(&["C:", "Program Files"], None).unwrap();
        assert_eq!(pattern.root(), Path::new("C:\\"));
    }

    #[test]
    fn relative_root_is_anchored_to_base_dir() {
        let pattern = PathPattern::for_platform(Platform::Other, Some(Path::new("/"))).unwrap();
        assert_eq!(pattern.root(), Path::new("/usr"));
        assert_eq!(pattern.final_depth(), 2);
    }

    #[test]
    fn segment_matching_is_anchored_at_start() {
        let matcher = SegmentMatcher::compile("djv").unwrap();
        assert!(matcher.matches("djv"));
        assert!(matcher.matches("djv-1.2.3"));
        assert!(!matcher.matches("opt-djv"));
    }

    #[test]
    fn invalid_regex_is_reported() {
        let err = PathPattern::compile(&["usr", "djv-("], None).unwrap_err();
        assert!(matches!(err, ActionError::InvalidPattern { .. }));
    }

    #[test]
    fn root_only_layout_is_rejected() {
        assert!(PathPattern::compile(&["usr"], None).is_err());
        assert!(PathPattern::compile(&[], None).is_err());
    }
}
