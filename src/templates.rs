//! Style-reference templates.
//!
//! Templates are plain SystemVerilog files read from the templates root and
//! pasted into prompts so generated code follows a house style. A missing or
//! unreadable template is not an error: it reads as an empty string and the
//! prompt simply goes without that reference.

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;

/// Artifact kinds that have a reference template.
///
/// These are also the units of work of the per-artifact-type strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TemplateRole {
    SequenceItem,
    Sequence,
    Test,
}

impl TemplateRole {
    /// All roles, in generation order.
    pub fn all() -> [TemplateRole; 3] {
        [Self::SequenceItem, Self::Sequence, Self::Test]
    }

    /// File name looked up under the templates root.
    pub fn file_name(&self) -> &'static str {
        match self {
            Self::SequenceItem => "template_seq_item.sv",
            Self::Sequence => "template_sequence.sv",
            Self::Test => "template_test.sv",
        }
    }

    /// Human-readable artifact kind used in prompts.
    pub fn label(&self) -> &'static str {
        match self {
            Self::SequenceItem => "sequence item",
            Self::Sequence => "sequence",
            Self::Test => "test",
        }
    }

    /// Suffix of the generated file name (`<design>_<suffix>.<ext>`).
    pub fn file_suffix(&self) -> &'static str {
        match self {
            Self::SequenceItem => "sequence_item",
            Self::Sequence => "sequence",
            Self::Test => "test",
        }
    }
}

impl fmt::Display for TemplateRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Read-once cache over a templates directory.
#[derive(Debug)]
pub struct TemplateStore {
    root: PathBuf,
    cache: HashMap<String, String>,
}

impl TemplateStore {
    /// Store reading from `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            cache: HashMap::new(),
        }
    }

    /// Text of the named template, or `""` when it is absent.
    ///
    /// The first lookup of a name reads the file; later lookups return the
    /// cached text, even if the file changes.
    pub fn load(&mut self, name: &str) -> String {
        if let Some(text) = self.cache.get(name) {
            return text.clone();
        }

        let path = self.root.join(name);
        let text = match std::fs::read_to_string(&path) {
            Ok(text) => {
                tracing::debug!(template = %path.display(), "loaded template");
                text
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!(template = %path.display(), "template not found, using empty text");
                String::new()
            }
            Err(e) => {
                tracing::warn!(template = %path.display(), error = %e, "failed to read template, using empty text");
                String::new()
            }
        };

        self.cache.insert(name.to_string(), text.clone());
        text
    }
}

/// The reference templates for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateSet {
    sequence_item: String,
    sequence: String,
    test: String,
}

impl TemplateSet {
    /// Load every role from the store.
    pub fn load(store: &mut TemplateStore) -> Self {
        let set = Self {
            sequence_item: store.load(TemplateRole::SequenceItem.file_name()),
            sequence: store.load(TemplateRole::Sequence.file_name()),
            test: store.load(TemplateRole::Test.file_name()),
        };

        let missing: Vec<&str> = TemplateRole::all()
            .iter()
            .filter(|role| set.get(**role).trim().is_empty())
            .map(|role| role.file_name())
            .collect();
        if !missing.is_empty() {
            tracing::info!(missing = %missing.join(", "), "some reference templates are empty or absent");
        }

        set
    }

    /// Build a set from literal texts.
    pub fn from_texts(
        sequence_item: impl Into<String>,
        sequence: impl Into<String>,
        test: impl Into<String>,
    ) -> Self {
        Self {
            sequence_item: sequence_item.into(),
            sequence: sequence.into(),
            test: test.into(),
        }
    }

    pub fn get(&self, role: TemplateRole) -> &str {
        match role {
            TemplateRole::SequenceItem => &self.sequence_item,
            TemplateRole::Sequence => &self.sequence,
            TemplateRole::Test => &self.test,
        }
    }

    /// True when no role has any text.
    pub fn is_empty(&self) -> bool {
        TemplateRole::all()
            .iter()
            .all(|role| self.get(*role).trim().is_empty())
    }
}
