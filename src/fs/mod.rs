//! Filesystem utilities for tbgen.
//!
//! Generated artifacts are written with replace-on-rename so a rerun always
//! overwrites a file in one step and never leaves a half-written artifact
//! behind at the final path.

mod replace;

pub use replace::{ensure_dir, replace_file};
