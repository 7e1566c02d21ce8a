//! Feature records and the plan that holds them.

/// Well-known verification plan column headers.
pub mod columns {
    pub const FEATURE: &str = "Feature";
    pub const INPUTS: &str = "Testcase Inputs";
    pub const STEPS: &str = "Testcase Steps";
    pub const OUTPUTS: &str = "Testcase Outputs";
    pub const CONSTRAINTS: &str = "Constraints";
    pub const COVERAGE_METHOD: &str = "Coverage Method";
    pub const SCOREBOARD: &str = "Scoreboard and Checker";
    pub const REGISTER_VALUE_COVERAGE: &str = "Register Value Coverage";
}

/// One row of the verification plan.
///
/// Fields keep the sheet's column order. Accessors never fail: a column the
/// sheet does not have reads as an empty string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureRecord {
    sheet: String,
    position: usize,
    fields: Vec<(String, String)>,
}

impl FeatureRecord {
    /// Create a record. `position` is the 1-based index of the row within the plan.
    pub fn new(sheet: impl Into<String>, position: usize, fields: Vec<(String, String)>) -> Self {
        Self {
            sheet: sheet.into(),
            position,
            fields,
        }
    }

    /// Name of the sheet this row came from.
    pub fn sheet(&self) -> &str {
        &self.sheet
    }

    /// 1-based position of the row within the plan.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Raw value of a column.
    ///
    /// Matches the header exactly first, then ignoring case and surrounding
    /// whitespace. Missing columns read as `""`.
    pub fn get(&self, column: &str) -> &str {
        if let Some((_, value)) = self.fields.iter().find(|(name, _)| name == column) {
            return value;
        }
        let wanted = column.trim();
        self.fields
            .iter()
            .find(|(name, _)| name.trim().eq_ignore_ascii_case(wanted))
            .map(|(_, value)| value.as_str())
            .unwrap_or("")
    }

    /// Feature name, trimmed.
    pub fn feature(&self) -> &str {
        self.get(columns::FEATURE).trim()
    }

    pub fn inputs(&self) -> &str {
        self.get(columns::INPUTS)
    }

    pub fn steps(&self) -> &str {
        self.get(columns::STEPS)
    }

    pub fn outputs(&self) -> &str {
        self.get(columns::OUTPUTS)
    }

    pub fn constraints(&self) -> &str {
        self.get(columns::CONSTRAINTS)
    }

    pub fn coverage_method(&self) -> &str {
        self.get(columns::COVERAGE_METHOD)
    }

    pub fn scoreboard(&self) -> &str {
        self.get(columns::SCOREBOARD)
    }

    pub fn register_value_coverage(&self) -> &str {
        self.get(columns::REGISTER_VALUE_COVERAGE)
    }

    /// All fields in column order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    /// Fields whose value is not blank, in column order.
    pub fn non_empty_fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields().filter(|(_, value)| !value.trim().is_empty())
    }

    /// True when every cell of the row is blank.
    pub fn is_blank(&self) -> bool {
        self.non_empty_fields().next().is_none()
    }

    /// Identity used for logs, folders and filenames.
    ///
    /// Rows without a feature name fall back to `Unnamed_Feature_<position>`.
    pub fn unit_name(&self) -> String {
        let feature = self.feature();
        if feature.is_empty() {
            format!("Unnamed_Feature_{}", self.position)
        } else {
            feature.to_string()
        }
    }
}

/// The ordered collection of feature rows loaded for a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Plan {
    records: Vec<FeatureRecord>,
    columns: Vec<String>,
}

impl Plan {
    /// Build a plan from records; the column set is the first-seen-order union.
    pub fn from_records(records: Vec<FeatureRecord>) -> Self {
        let mut columns: Vec<String> = Vec::new();
        for record in &records {
            for (name, _) in record.fields() {
                if !columns.iter().any(|c| c == name) {
                    columns.push(name.to_string());
                }
            }
        }
        Self { records, columns }
    }

    pub fn records(&self) -> &[FeatureRecord] {
        &self.records
    }

    /// Superset of column headers across every sheet.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FeatureRecord> {
        self.records.iter()
    }
}

/// Normalize a unit name for use as a folder or file stem.
///
/// Lowercases, and turns spaces and path separators into underscores.
/// Distinct names can normalize to the same value ("Parity Check" and
/// "parity check"). Names that would resolve to the current or parent
/// directory become underscores, so the result is always a single path
/// component.
pub fn normalize_name(name: &str) -> String {
    let normalized: String = name
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| match c {
            ' ' | '/' | '\\' => '_',
            other => other,
        })
        .collect();

    match normalized.as_str() {
        "" | "." | ".." => "_".repeat(normalized.len().max(1)),
        _ => normalized,
    }
}
