//! Frame sequence detection and range substitution.
//!
//! A sequence path carries one printf-style integer directive such as `%04d`
//! (e.g. `/shots/sh010/comp.%04d.exr`). Resolving it lists the containing
//! directory, collects the frame numbers of the sibling files and rewrites the
//! directive as an inclusive `start-end` range in the viewer's syntax:
//! `/shots/sh010/comp.1001-1010.exr`.

use crate::error::{ActionError, Result};
use regex::Regex;
use std::fs;
use std::path::PathBuf;
use std::sync::OnceLock;

fn placeholder_expression() -> &'static Regex {
    static PLACEHOLDER: OnceLock<Regex> = OnceLock::new();
    PLACEHOLDER.get_or_init(|| Regex::new(r"%[0-9]*d").expect("placeholder pattern is valid"))
}

/// Widest padding accepted in a directive; `u64` frames need at most 20 digits.
pub const MAX_FRAME_WIDTH: usize = 32;

/// A detected frame directive and the filename parts around it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameSequenceSpec {
    /// The directive exactly as written, e.g. `%04d`.
    pub placeholder: String,
    /// Byte offset of the directive in the original path.
    pub offset: usize,
    /// Minimum digits a formatted frame number occupies.
    pub width: usize,
    /// Pad with zeros (`%04d`) rather than spaces (`%4d`).
    pub zero_pad: bool,
    /// Filename text before the directive, without its trailing separator.
    pub stem: String,
    /// Filename text after the directive.
    pub suffix: String,
    /// Extension sibling files must end with.
    pub extension: String,
    /// Directory listed for sequence members.
    pub directory: PathBuf,
}

impl FrameSequenceSpec {
    /// Detects the single frame directive in `path`.
    ///
    /// Returns `Ok(None)` when there is none, `MultipleSequenceMarkers` when
    /// there is more than one and `InvalidSequenceDirective` when its width
    /// exceeds `MAX_FRAME_WIDTH`.
    pub fn detect(path: &str, extension: &str) -> Result<Option<Self>> {
        let mut found = placeholder_expression().find_iter(path);
        let Some(directive) = found.next() else {
            return Ok(None);
        };
        if found.next().is_some() {
            return Err(ActionError::MultipleSequenceMarkers);
        }

        let digits = &directive.as_str()[1..directive.as_str().len() - 1];
        let width = match digits {
            "" => 0,
            digits => digits
                .parse::<usize>()
                .ok()
                .filter(|width| *width <= MAX_FRAME_WIDTH)
                .ok_or_else(|| ActionError::InvalidSequenceDirective(directive.as_str().to_string()))?,
        };

        let offset = directive.start();
        let name_start = path[..offset]
            .rfind(is_separator)
            .map(|i| i + 1)
            .unwrap_or(0);
        let before = &path[name_start..offset];
        // Drop the separator between stem and frame number (`shot.` -> `shot`).
        let stem = match before.char_indices().last() {
            Some((i, _)) => before[..i].to_string(),
            None => String::new(),
        };
        let name_end = path[directive.end()..]
            .find(is_separator)
            .map(|i| directive.end() + i)
            .unwrap_or(path.len());

        let directory = match &path[..name_start] {
            "" => PathBuf::from("."),
            dir => PathBuf::from(dir),
        };

        Ok(Some(Self {
            placeholder: directive.as_str().to_string(),
            offset,
            width,
            zero_pad: digits.starts_with('0'),
            stem,
            suffix: path[directive.end()..name_end].to_string(),
            extension: extension.to_string(),
            directory,
        }))
    }

    /// Formats a frame number with the directive's width and padding.
    pub fn format_frame(&self, frame: u64) -> String {
        if self.zero_pad {
            format!("{:0width$}", frame, width = self.width)
        } else {
            format!("{:>width$}", frame, width = self.width)
        }
    }

    /// Frame numbers of the sequence members present in the directory.
    pub fn scan_frames(&self) -> Result<Vec<u64>> {
        let entries = fs::read_dir(&self.directory).map_err(|source| ActionError::SequenceScan {
            path: self.directory.clone(),
            source,
        })?;

        let frames = entries
            .flatten()
            .filter_map(|entry| entry.file_name().to_str().and_then(|name| self.member_frame(name)))
            .collect();

        Ok(frames)
    }

    /// Frame number of `name` if it belongs to this sequence.
    fn member_frame(&self, name: &str) -> Option<u64> {
        if !name.ends_with(&self.extension) || !name.contains(&self.stem) {
            return None;
        }
        name.rsplit('.').nth(1)?.parse().ok()
    }

    /// Rewrites `path` with `start-end` in place of the directive.
    pub fn substitute(&self, path: &str, start: u64, end: u64) -> String {
        let range = format!("{}-{}", self.format_frame(start), self.format_frame(end));
        let mut resolved = String::with_capacity(path.len() + range.len());
        resolved.push_str(&path[..self.offset]);
        resolved.push_str(&range);
        resolved.push_str(&path[self.offset + self.placeholder.len()..]);
        resolved
    }
}

/// Replaces the frame directive in `path` with the frame range found on disk.
///
/// Paths without a directive, and sequences with no members on disk, are
/// returned unchanged.
pub fn resolve(path: &str, file_extension: &str) -> Result<String> {
    let Some(spec) = FrameSequenceSpec::detect(path, file_extension)? else {
        return Ok(path.to_string());
    };

    let frames = spec.scan_frames()?;
    match (frames.iter().min(), frames.iter().max()) {
        (Some(&start), Some(&end)) => {
            tracing::debug!("Sequence {} spans frames {}-{}", path, start, end);
            Ok(spec.substitute(path, start, end))
        }
        _ => {
            tracing::debug!("No sequence members found for {} in {:?}", path, spec.directory);
            Ok(path.to_string())
        }
    }
}

/// Extension of a selected file: the text after its last `.`.
pub fn file_extension(path: &str) -> &str {
    path.rsplit('.').next().unwrap_or(path)
}

fn is_separator(c: char) -> bool {
    std::path::is_separator(c)
}
