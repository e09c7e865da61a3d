use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::json;
use serde_sarif::sarif::{
    ArtifactLocation, Invocation, Location, LogicalLocation, Message, MultiformatMessageString,
    PhysicalLocation, PropertyBag, ReportingDescriptor, Result as SarifResult, ResultLevel, Run,
    SCHEMA_URL, Sarif, Tool, ToolComponent,
};

use crate::entry::ClassEntry;
use crate::error::DecodeError;
use crate::jar_index::JarIndex;

const TOOL_NAME: &str = "deobf-index";

/// Non-fatal findings collected while building an index.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct IndexReport {
    pub decode_failures: Vec<DecodeFailure>,
    /// Classes indexed from their header alone, with no fields or methods.
    pub partial_decodes: Vec<DecodeFailure>,
    pub warnings: Vec<HeuristicWarning>,
}

/// An archive entry that could not be decoded and was left out of the index.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct DecodeFailure {
    pub entry: String,
    pub message: String,
}

/// A detector matched but could not decide between candidates.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct HeuristicWarning {
    pub class: String,
    pub detector: &'static str,
    pub candidates: Vec<String>,
    pub message: String,
}

impl IndexReport {
    pub fn is_clean(&self) -> bool {
        self.decode_failures.is_empty()
            && self.partial_decodes.is_empty()
            && self.warnings.is_empty()
    }

    pub(crate) fn record_decode_failure(&mut self, error: &DecodeError) {
        self.decode_failures.push(DecodeFailure {
            entry: error.entry.clone(),
            message: format!("{:#}", error.source),
        });
    }

    pub(crate) fn record_partial_decode(&mut self, entry: &str, reason: &str) {
        self.partial_decodes.push(DecodeFailure {
            entry: entry.to_string(),
            message: reason.to_string(),
        });
    }

    pub(crate) fn record_ambiguous_outer_class(
        &mut self,
        class: &ClassEntry,
        candidates: &[ClassEntry],
    ) {
        let candidates: Vec<String> = candidates
            .iter()
            .map(|candidate| candidate.name().to_string())
            .collect();
        let message = if candidates.is_empty() {
            format!("no outer class candidate for {class}")
        } else {
            format!(
                "cannot choose an outer class for {class} among {}",
                candidates.join(", ")
            )
        };
        self.warnings.push(HeuristicWarning {
            class: class.name().to_string(),
            detector: "outer_class",
            candidates,
            message,
        });
    }
}

/// Machine-readable overview of a built index.
#[derive(Clone, Debug, Serialize)]
pub struct IndexSummary {
    pub classes: usize,
    pub fields: usize,
    pub behaviors: usize,
    pub behavior_references: usize,
    pub field_references: usize,
    pub inner_classes: BTreeMap<String, String>,
    pub anonymous_classes: BTreeMap<String, String>,
    pub bridges: BTreeMap<String, String>,
    pub decode_failures: Vec<DecodeFailure>,
    pub partial_decodes: Vec<DecodeFailure>,
    pub warnings: Vec<HeuristicWarning>,
}

pub fn summarize(index: &JarIndex, report: &IndexReport) -> IndexSummary {
    let classes: Vec<&ClassEntry> = index.classes().collect();
    IndexSummary {
        classes: classes.len(),
        fields: classes.iter().map(|class| index.fields_of(class).count()).sum(),
        behaviors: classes
            .iter()
            .map(|class| index.behaviors_of(class).count())
            .sum(),
        behavior_references: index.behavior_reference_count(),
        field_references: index.field_reference_count(),
        inner_classes: index
            .outer_classes()
            .map(|(inner, outer)| (inner.name().to_string(), outer.name().to_string()))
            .collect(),
        anonymous_classes: index
            .anonymous_classes()
            .map(|(class, caller)| (class.name().to_string(), caller.to_string()))
            .collect(),
        bridges: index
            .bridges()
            .map(|(bridge, bridged)| (bridge.to_string(), bridged.to_string()))
            .collect(),
        decode_failures: report.decode_failures.clone(),
        partial_decodes: report.partial_decodes.clone(),
        warnings: report.warnings.clone(),
    }
}

/// Metadata captured for SARIF invocation properties.
#[derive(Clone, Debug, Default)]
pub struct InvocationStats {
    pub build_duration_ms: u128,
    pub entry_count: usize,
    pub class_count: usize,
}

pub fn build_invocation(stats: &InvocationStats, arguments: Vec<String>) -> Invocation {
    let command_line = arguments.join(" ");
    let mut properties = BTreeMap::new();
    properties.insert(
        "deobf_index.build_ms".to_string(),
        json!(stats.build_duration_ms),
    );
    properties.insert(
        "deobf_index.entry_count".to_string(),
        json!(stats.entry_count),
    );
    properties.insert(
        "deobf_index.class_count".to_string(),
        json!(stats.class_count),
    );

    Invocation::builder()
        .execution_successful(true)
        .arguments(arguments)
        .command_line(command_line)
        .properties(PropertyBag::builder().additional_properties(properties).build())
        .build()
}

struct RuleMetadata {
    id: &'static str,
    name: &'static str,
    description: &'static str,
}

const DECODE_FAILURE: RuleMetadata = RuleMetadata {
    id: "DECODE_FAILURE",
    name: "Undecodable class file",
    description: "Archive entry is not a class file this indexer can decode",
};

const PARTIAL_DECODE: RuleMetadata = RuleMetadata {
    id: "PARTIAL_DECODE",
    name: "Class indexed without members",
    description: "Class file carries an attribute the decoder does not know; its fields, methods and references are missing",
};

const AMBIGUOUS_OUTER_CLASS: RuleMetadata = RuleMetadata {
    id: "AMBIGUOUS_OUTER_CLASS",
    name: "Ambiguous outer class",
    description: "Synthetic constructor pattern matched but no single outer class fits",
};

fn rule_descriptor(metadata: &RuleMetadata) -> ReportingDescriptor {
    ReportingDescriptor::builder()
        .id(metadata.id)
        .name(metadata.name)
        .short_description(
            MultiformatMessageString::builder()
                .text(metadata.description)
                .build(),
        )
        .build()
}

fn result_message(text: impl Into<String>) -> Message {
    Message::builder().text(text.into()).build()
}

fn entry_location(entry: &str) -> Location {
    let artifact_location = ArtifactLocation::builder().uri(entry.to_string()).build();
    Location::builder()
        .physical_location(
            PhysicalLocation::builder()
                .artifact_location(artifact_location)
                .build(),
        )
        .build()
}

fn class_location(class_name: &str) -> Location {
    let logical = LogicalLocation::builder()
        .name(class_name)
        .kind("type")
        .build();
    Location::builder().logical_locations(vec![logical]).build()
}

/// Render the report as a SARIF 2.1.0 log. Decode failures are errors;
/// partial decodes and heuristic ambiguity are warnings.
pub fn build_sarif(report: &IndexReport, invocation: Invocation) -> Sarif {
    let mut results = Vec::new();
    for failure in &report.decode_failures {
        results.push(
            SarifResult::builder()
                .rule_id(DECODE_FAILURE.id)
                .level(ResultLevel::Error)
                .message(result_message(format!(
                    "failed to decode {}: {}",
                    failure.entry, failure.message
                )))
                .locations(vec![entry_location(&failure.entry)])
                .build(),
        );
    }
    for partial in &report.partial_decodes {
        results.push(
            SarifResult::builder()
                .rule_id(PARTIAL_DECODE.id)
                .level(ResultLevel::Warning)
                .message(result_message(format!(
                    "indexed {} without members: {}",
                    partial.entry, partial.message
                )))
                .locations(vec![entry_location(&partial.entry)])
                .build(),
        );
    }
    for warning in &report.warnings {
        results.push(
            SarifResult::builder()
                .rule_id(AMBIGUOUS_OUTER_CLASS.id)
                .level(ResultLevel::Warning)
                .message(result_message(warning.message.clone()))
                .locations(vec![class_location(&warning.class)])
                .build(),
        );
    }

    let driver = ToolComponent::builder()
        .name(TOOL_NAME)
        .rules(vec![
            rule_descriptor(&DECODE_FAILURE),
            rule_descriptor(&PARTIAL_DECODE),
            rule_descriptor(&AMBIGUOUS_OUTER_CLASS),
        ])
        .build();
    let tool = Tool {
        driver,
        extensions: None,
        properties: None,
    };
    let run = Run::builder()
        .tool(tool)
        .invocations(vec![invocation])
        .results(results)
        .build();

    Sarif::builder()
        .schema(SCHEMA_URL)
        .runs(vec![run])
        .version(json!("2.1.0"))
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report() -> IndexReport {
        let mut report = IndexReport::default();
        report.decode_failures.push(DecodeFailure {
            entry: "bad.class".to_string(),
            message: "invalid class file magic".to_string(),
        });
        report.record_ambiguous_outer_class(
            &ClassEntry::new("c"),
            &[ClassEntry::new("a"), ClassEntry::new("b")],
        );
        report
    }

    #[test]
    fn empty_report_renders_minimal_sarif() {
        let invocation = build_invocation(&InvocationStats::default(), Vec::new());
        let sarif = build_sarif(&IndexReport::default(), invocation);
        let value = serde_json::to_value(&sarif).expect("serialize SARIF");

        assert_eq!(value["version"], "2.1.0");
        assert_eq!(value["$schema"], SCHEMA_URL);
        assert_eq!(value["runs"][0]["tool"]["driver"]["name"], TOOL_NAME);
        assert!(
            value["runs"][0]["results"]
                .as_array()
                .expect("results array")
                .is_empty()
        );
        assert_eq!(
            value["runs"][0]["invocations"][0]["executionSuccessful"],
            true
        );
    }

    #[test]
    fn failures_are_errors_and_ambiguity_is_a_warning() {
        let invocation = build_invocation(&InvocationStats::default(), Vec::new());
        let sarif = build_sarif(&report(), invocation);
        let value = serde_json::to_value(&sarif).expect("serialize SARIF");
        let results = value["runs"][0]["results"]
            .as_array()
            .expect("results array");

        assert_eq!(results.len(), 2);
        assert_eq!(results[0]["ruleId"], "DECODE_FAILURE");
        assert_eq!(results[0]["level"], "error");
        assert_eq!(
            results[0]["locations"][0]["physicalLocation"]["artifactLocation"]["uri"],
            "bad.class"
        );
        assert_eq!(results[1]["ruleId"], "AMBIGUOUS_OUTER_CLASS");
        assert_eq!(results[1]["level"], "warning");
        assert_eq!(
            results[1]["locations"][0]["logicalLocations"][0]["name"],
            "c"
        );
    }

    #[test]
    fn partial_decodes_are_warnings_at_the_entry() {
        let mut report = IndexReport::default();
        assert!(report.is_clean());
        report.record_partial_decode("none/d.class", "unmatched attribute: Custom");
        assert!(!report.is_clean());

        let invocation = build_invocation(&InvocationStats::default(), Vec::new());
        let sarif = build_sarif(&report, invocation);
        let value = serde_json::to_value(&sarif).expect("serialize SARIF");
        let results = value["runs"][0]["results"]
            .as_array()
            .expect("results array");

        assert_eq!(results.len(), 1);
        assert_eq!(results[0]["ruleId"], "PARTIAL_DECODE");
        assert_eq!(results[0]["level"], "warning");
        assert_eq!(
            results[0]["locations"][0]["physicalLocation"]["artifactLocation"]["uri"],
            "none/d.class"
        );
        assert!(
            results[0]["message"]["text"]
                .as_str()
                .expect("message text")
                .contains("Custom")
        );
        let rules = value["runs"][0]["tool"]["driver"]["rules"]
            .as_array()
            .expect("rules array");
        assert!(rules.iter().any(|rule| rule["id"] == "PARTIAL_DECODE"));
    }

    #[test]
    fn ambiguity_warning_names_candidates() {
        let report = report();
        let warning = &report.warnings[0];

        assert_eq!(warning.detector, "outer_class");
        assert_eq!(warning.candidates, vec!["a", "b"]);
        assert!(warning.message.contains("a, b"));
        assert!(!report.is_clean());
    }
}
