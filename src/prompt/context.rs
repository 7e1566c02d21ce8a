//! Verbatim serialization of plan rows for prompts.
//!
//! Every non-blank field is emitted as `Column: value` with the value exactly
//! as it appears in the sheet. Blank fields are left out; nothing else is.

use crate::plan::{FeatureRecord, Plan, columns};
use std::collections::HashMap;

use super::template::vars;

/// Columns that the per-feature prompt names explicitly.
const HEADLINE_COLUMNS: [&str; 4] = [
    columns::FEATURE,
    columns::INPUTS,
    columns::STEPS,
    columns::OUTPUTS,
];

/// One record as `Column: value` lines.
pub fn describe_record(record: &FeatureRecord) -> String {
    record
        .non_empty_fields()
        .map(|(name, value)| format!("{}: {}", name, value))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Every record of the plan, numbered by row position, separated by blank lines.
pub fn describe_plan(plan: &Plan) -> String {
    plan.iter()
        .map(|record| {
            format!(
                "Feature {} (sheet: {}):\n{}",
                record.position(),
                record.sheet(),
                describe_record(record)
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Template variables for a per-feature prompt.
///
/// `reference` is the already-formatted template reference block (or empty).
pub(super) fn feature_vars(record: &FeatureRecord, reference: &str) -> HashMap<String, String> {
    vars([
        ("reference", reference.to_string()),
        ("feature", record.unit_name()),
        ("inputs", record.inputs().to_string()),
        ("steps", record.steps().to_string()),
        ("outputs", record.outputs().to_string()),
        ("details", additional_details(record)),
        ("requirements", requirements(record, !reference.is_empty())),
    ])
}

/// Non-blank fields other than the headline columns.
fn additional_details(record: &FeatureRecord) -> String {
    let extra: Vec<String> = record
        .non_empty_fields()
        .filter(|(name, _)| {
            !HEADLINE_COLUMNS
                .iter()
                .any(|h| name.trim().eq_ignore_ascii_case(h))
        })
        .map(|(name, value)| format!("- {}: {}", name, value))
        .collect();

    if extra.is_empty() {
        String::new()
    } else {
        format!(
            "Additional verification plan details:\n{}\n",
            extra.join("\n")
        )
    }
}

/// Requirement bullets, extended by the columns the row actually fills.
fn requirements(record: &FeatureRecord, has_reference: bool) -> String {
    let mut lines = vec![
        "- Create a UVM sequence sending transactions.".to_string(),
        "- Create a UVM test class starting the sequence.".to_string(),
    ];

    if filled(record.scoreboard()) {
        lines.push(format!(
            "- Add scoreboard checks based on '{}'.",
            columns::SCOREBOARD
        ));
    } else {
        lines.push("- Add scoreboard checks for the expected outputs.".to_string());
    }

    if filled(record.constraints()) {
        lines.push(format!(
            "- Use '{}' for sequence randomization.",
            columns::CONSTRAINTS
        ));
    }

    let coverage: Vec<&str> = [
        (columns::COVERAGE_METHOD, record.coverage_method()),
        (columns::REGISTER_VALUE_COVERAGE, record.register_value_coverage()),
    ]
    .into_iter()
    .filter(|(_, value)| filled(value))
    .map(|(column, _)| column)
    .collect();
    if !coverage.is_empty() {
        lines.push(format!(
            "- Ensure the coverage goals from {} are met.",
            coverage
                .iter()
                .map(|c| format!("'{}'", c))
                .collect::<Vec<_>>()
                .join(" and ")
        ));
    }

    if has_reference {
        lines.push("- Follow the style in the reference templates.".to_string());
    }

    lines.push("- Do NOT add explanations or comments outside the code.".to_string());
    lines.push("- Output valid SystemVerilog code only.".to_string());
    lines.join("\n")
}

fn filled(value: &str) -> bool {
    !value.trim().is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(position: usize, fields: &[(&str, &str)]) -> FeatureRecord {
        FeatureRecord::new(
            "Verification Plan",
            position,
            fields
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    #[test]
    fn test_describe_record_skips_blank_fields() {
        let r = record(
            1,
            &[
                ("Feature", "Reset"),
                ("Testcase Inputs", ""),
                ("Testcase Steps", "assert rst\nrelease rst"),
            ],
        );
        assert_eq!(
            describe_record(&r),
            "Feature: Reset\nTestcase Steps: assert rst\nrelease rst"
        );
    }

    #[test]
    fn test_describe_plan_numbers_every_row() {
        let plan = Plan::from_records(vec![
            record(1, &[("Feature", "A")]),
            record(2, &[("Feature", "B")]),
        ]);

        let text = describe_plan(&plan);
        assert!(text.contains("Feature 1 (sheet: Verification Plan):\nFeature: A"));
        assert!(text.contains("Feature 2 (sheet: Verification Plan):\nFeature: B"));
    }

    #[test]
    fn test_feature_vars_headline_fields() {
        let r = record(
            1,
            &[
                ("Feature", "Parity Check"),
                ("Testcase Inputs", "0xFF"),
                ("Testcase Steps", "send byte, assert parity"),
                ("Testcase Outputs", "parity_error=0"),
            ],
        );

        let vars = feature_vars(&r, "");
        assert_eq!(vars["feature"], "Parity Check");
        assert_eq!(vars["inputs"], "0xFF");
        assert_eq!(vars["steps"], "send byte, assert parity");
        assert_eq!(vars["outputs"], "parity_error=0");
        assert_eq!(vars["details"], "");
        assert_eq!(vars["reference"], "");
    }

    #[test]
    fn test_feature_vars_extra_columns_become_details() {
        let r = record(
            1,
            &[
                ("Feature", "Baud"),
                ("Constraints", "div > 0"),
                ("Sequences Coverage", "all bauds"),
            ],
        );

        let vars = feature_vars(&r, "");
        assert_eq!(
            vars["details"],
            "Additional verification plan details:\n- Constraints: div > 0\n- Sequences Coverage: all bauds\n"
        );
        assert!(vars["requirements"].contains("Use 'Constraints' for sequence randomization."));
    }

    #[test]
    fn test_requirements_follow_filled_columns() {
        let bare = record(1, &[("Feature", "A")]);
        let text = requirements(&bare, false);
        assert!(text.contains("scoreboard checks for the expected outputs"));
        assert!(!text.contains("coverage goals"));
        assert!(!text.contains("reference templates"));

        let rich = record(
            1,
            &[
                ("Feature", "A"),
                ("Scoreboard and Checker", "compare y"),
                ("Coverage Method", "cross"),
                ("Register Value Coverage", "ctrl"),
            ],
        );
        let text = requirements(&rich, true);
        assert!(text.contains("based on 'Scoreboard and Checker'"));
        assert!(text.contains("'Coverage Method' and 'Register Value Coverage'"));
        assert!(text.contains("Follow the style in the reference templates."));
    }
}
