//! Response partitioning.
//!
//! # Grammar
//!
//! ```text
//! completion := preamble? segment*
//! segment    := MARKER filename NEWLINE content
//! ```
//!
//! Each marker starts a segment that runs to the next marker or the end of the
//! completion. A segment is trimmed; its first line is the filename and the
//! rest, trimmed, is the content. Text before the first marker is preamble and
//! is dropped. Segments that do not fit the grammar are noise: they are logged
//! at debug level and skipped, never reported as errors.

use crate::prompt::ResponseShape;
use std::path::{Component, Path, PathBuf};

/// One file carved out of a completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactUnit {
    /// Path relative to the placement directory.
    pub path: PathBuf,
    pub content: String,
}

impl ArtifactUnit {
    pub fn new(path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
        }
    }
}

/// Splits completions on a marker token.
#[derive(Debug, Clone)]
pub struct Partitioner {
    marker: String,
    strip_fences: bool,
}

impl Partitioner {
    pub fn new(marker: impl Into<String>) -> Self {
        Self {
            marker: marker.into(),
            strip_fences: false,
        }
    }

    /// Also remove a markdown code fence wrapping each artifact.
    pub fn with_fence_stripping(mut self, strip: bool) -> Self {
        self.strip_fences = strip;
        self
    }

    pub fn marker(&self) -> &str {
        &self.marker
    }

    /// Partition a completion according to the shape its prompt asked for.
    ///
    /// A delimited response is split. A single-artifact response is split
    /// when it carries markers and otherwise kept whole under the
    /// caller-chosen filename.
    pub fn partition(&self, text: &str, shape: &ResponseShape) -> Vec<ArtifactUnit> {
        match shape {
            ResponseShape::Delimited => self.split(text),
            ResponseShape::Single { filename } => {
                let units = self.split(text);
                if units.is_empty() {
                    vec![self.whole(text, filename)]
                } else {
                    units
                }
            }
        }
    }

    /// Split a delimited completion into units, in order of appearance.
    pub fn split(&self, text: &str) -> Vec<ArtifactUnit> {
        if self.marker.is_empty() {
            return Vec::new();
        }

        let starts: Vec<usize> = text.match_indices(&self.marker).map(|(i, _)| i).collect();
        let Some(&first) = starts.first() else {
            return Vec::new();
        };

        if !text[..first].trim().is_empty() {
            tracing::debug!(chars = first, "dropping preamble before first delimiter");
        }

        let mut units = Vec::new();
        for (n, &start) in starts.iter().enumerate() {
            let body_start = start + self.marker.len();
            let end = starts.get(n + 1).copied().unwrap_or(text.len());
            let segment = text[body_start..end].trim();

            match self.parse_segment(segment) {
                Some(unit) => units.push(unit),
                None => tracing::debug!(segment = n + 1, "skipping partition noise"),
            }
        }
        units
    }

    /// Wrap the entire completion as one unit.
    pub fn whole(&self, text: &str, filename: &str) -> ArtifactUnit {
        let content = if self.strip_fences {
            strip_code_fence(text)
        } else {
            text.to_string()
        };
        ArtifactUnit::new(filename, content)
    }

    fn parse_segment(&self, segment: &str) -> Option<ArtifactUnit> {
        let (first_line, rest) = segment.split_once('\n')?;
        let filename = first_line.trim();
        if filename.is_empty() || !is_safe_relative(Path::new(filename)) {
            return None;
        }

        let content = rest.trim();
        if content.is_empty() {
            return None;
        }

        let content = if self.strip_fences {
            strip_code_fence(content)
        } else {
            content.to_string()
        };
        Some(ArtifactUnit::new(filename, content))
    }
}

/// Relative, and never climbs out of the directory it is joined to.
fn is_safe_relative(path: &Path) -> bool {
    path.components()
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
        && path.components().any(|c| matches!(c, Component::Normal(_)))
}

/// Remove a markdown fence that wraps the whole text.
///
/// Only an opening line starting with three backticks paired with a closing
/// line of exactly three backticks is removed; anything else is returned as is.
pub fn strip_code_fence(text: &str) -> String {
    let trimmed = text.trim();
    let lines: Vec<&str> = trimmed.lines().collect();
    if lines.len() >= 2
        && lines[0].trim_start().starts_with("```")
        && lines[lines.len() - 1].trim() == "```"
    {
        return lines[1..lines.len() - 1].join("\n").trim().to_string();
    }
    text.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reassemble(marker: &str, units: &[ArtifactUnit]) -> String {
        units
            .iter()
            .map(|u| format!("{} {}\n{}", marker, u.path.display(), u.content))
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn squash(text: &str) -> String {
        text.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    #[test]
    fn test_split_two_files() {
        let text = "// FILE: a.txt\nhello\n// FILE: b.txt\nworld\n";
        let units = Partitioner::new("// FILE:").split(text);

        assert_eq!(
            units,
            vec![
                ArtifactUnit::new("a.txt", "hello"),
                ArtifactUnit::new("b.txt", "world"),
            ]
        );
        assert_eq!(squash(&reassemble("// FILE:", &units)), squash(text));
    }

    #[test]
    fn test_split_uvm_files_with_preamble() {
        let text = "Here is your testbench.\n\n\
                    // FILE: and_driver.sv\nclass and_driver extends uvm_driver;\nendclass\n\n\
                    // FILE: and_test.sv\nclass and_test extends uvm_test;\nendclass";
        let units = Partitioner::new("// FILE:").split(text);

        assert_eq!(units.len(), 2);
        assert_eq!(units[0].path, PathBuf::from("and_driver.sv"));
        assert_eq!(
            units[0].content,
            "class and_driver extends uvm_driver;\nendclass"
        );
        assert_eq!(units[1].path, PathBuf::from("and_test.sv"));
        assert_eq!(units[1].content, "class and_test extends uvm_test;\nendclass");
    }

    #[test]
    fn test_split_without_marker_is_empty() {
        let units = Partitioner::new("// FILE:").split("module m; endmodule");
        assert!(units.is_empty());
    }

    #[test]
    fn test_split_skips_noise_segments() {
        let text = "// FILE:\n\n// FILE: lonely.sv\n// FILE: ok.sv\nmodule ok; endmodule\n// FILE: \n  content";
        let units = Partitioner::new("// FILE:").split(text);
        assert_eq!(units, vec![ArtifactUnit::new("ok.sv", "module ok; endmodule")]);
    }

    #[test]
    fn test_split_rejects_escaping_paths() {
        let text = "// FILE: ../evil.sv\nx\n// FILE: /etc/passwd\ny\n// FILE: rtl/and.sv\nz";
        let units = Partitioner::new("// FILE:").split(text);
        assert_eq!(units, vec![ArtifactUnit::new("rtl/and.sv", "z")]);
    }

    #[test]
    fn test_split_custom_marker() {
        let text = "### tb_pkg.sv\npackage tb_pkg; endpackage";
        let units = Partitioner::new("###").split(text);
        assert_eq!(
            units,
            vec![ArtifactUnit::new("tb_pkg.sv", "package tb_pkg; endpackage")]
        );
    }

    #[test]
    fn test_whole_keeps_text_unchanged() {
        let text = "\n  class parity_test extends uvm_test;\nendclass\n";
        let unit = Partitioner::new("// FILE:").whole(text, "parity_check_test.sv");
        assert_eq!(unit.path, PathBuf::from("parity_check_test.sv"));
        assert_eq!(unit.content, text);
    }

    #[test]
    fn test_partition_single_without_marker_is_whole() {
        let shape = ResponseShape::Single {
            filename: "reset_test.sv".to_string(),
        };
        let units = Partitioner::new("// FILE:").partition("class reset_test;", &shape);
        assert_eq!(units, vec![ArtifactUnit::new("reset_test.sv", "class reset_test;")]);
    }

    #[test]
    fn test_partition_single_with_markers_splits() {
        let shape = ResponseShape::Single {
            filename: "reset_test.sv".to_string(),
        };
        let text = "// FILE: reset_seq.sv\nseq\n// FILE: reset_test.sv\ntest";
        let units = Partitioner::new("// FILE:").partition(text, &shape);
        assert_eq!(units.len(), 2);
    }

    #[test]
    fn test_partition_delimited_without_marker_is_empty() {
        let units = Partitioner::new("// FILE:").partition("no files here", &ResponseShape::Delimited);
        assert!(units.is_empty());
    }

    #[test]
    fn test_fence_stripping() {
        let fenced = "```systemverilog\nclass a;\nendclass\n```";
        assert_eq!(strip_code_fence(fenced), "class a;\nendclass");
        assert_eq!(strip_code_fence("class a;"), "class a;");
        assert_eq!(strip_code_fence("```\nunclosed"), "```\nunclosed");

        let partitioner = Partitioner::new("// FILE:").with_fence_stripping(true);
        let units = partitioner.split("// FILE: a.sv\n```sv\nmodule a;\n```");
        assert_eq!(units[0].content, "module a;");

        let plain = Partitioner::new("// FILE:");
        let units = plain.split("// FILE: a.sv\n```sv\nmodule a;\n```");
        assert_eq!(units[0].content, "```sv\nmodule a;\n```");
    }
}
