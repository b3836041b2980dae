//! Human-readable renderings of query responses
//!
//! JSON output is the serde form of the response structs; this module only
//! covers `--format text`.

use crate::correlation::{CorrelationRequest, CorrelationResult};
use crate::error::ErrorResponse;
use crate::model::{Mouse, PhenotypeEntry};
use crate::search::SearchPage;
use crate::table::MeasurementTable;
use serde::Serialize;

const RULE: &str = "─────────────────────────────────────────";

/// Pretty JSON for any response object
pub fn to_json<T: Serialize>(value: &T) -> serde_json::Result<String> {
    serde_json::to_string_pretty(value)
}

pub fn correlation_report(request: &CorrelationRequest, result: &CorrelationResult) -> String {
    let mut report = String::new();

    report.push_str(&format!(
        "{} correlation: {} {} vs {} measurements\n",
        request.statistic, request.reference_kind, request.reference_id, request.candidate_kind
    ));
    report.push_str(&format!(
        "Showing {} of {} scored candidates\n",
        result.len(),
        result.total_count
    ));

    if result.is_empty() {
        report.push_str("\nNo candidate shares enough mice with the reference.\n");
        return report;
    }

    report.push_str(RULE);
    report.push('\n');
    let id_width = result.ids.iter().map(String::len).max().unwrap_or(0).max(2);
    for (rank, ((id, name), r)) in result
        .ids
        .iter()
        .zip(&result.names)
        .zip(&result.correlations)
        .enumerate()
    {
        report.push_str(&format!(
            "{:>3}. {:<width$}  {:>+.4}  {}\n",
            rank + 1,
            id,
            r,
            name,
            width = id_width
        ));
    }
    report
}

pub fn search_report(page: &SearchPage, start_index: i64) -> String {
    let mut report = String::new();
    if page.is_empty() {
        report.push_str(&format!("No matches on this page ({} total)\n", page.total_count));
        return report;
    }

    let first = start_index.max(1);
    report.push_str(&format!(
        "Matches {}-{} of {}\n",
        first,
        first + page.len() as i64 - 1,
        page.total_count
    ));
    for (id, name) in page.ids.iter().zip(&page.names) {
        report.push_str(&format!("{}\t{}\n", id, name));
    }
    report
}

pub fn table_report(table: &MeasurementTable) -> String {
    let mut report = String::new();
    report.push_str(&format!(
        "{} {} ({}, {} of {} mice measured)\n",
        table.kind,
        table.id,
        table.value_type,
        table.present_count(),
        table.len()
    ));

    let mut header = vec!["mouse_id", "strain", "diet", "value"];
    header.extend(table.factors.keys().map(String::as_str));
    report.push_str(&header.join("\t"));
    report.push('\n');

    let cell = |value: Option<String>| value.unwrap_or_else(|| "-".to_string());
    for (i, mouse_id) in table.mouse_ids.iter().enumerate() {
        let mut row = vec![
            mouse_id.clone(),
            cell(table.strains[i].clone()),
            cell(table.diets[i].clone()),
            cell(table.values[i].as_ref().map(ToString::to_string)),
        ];
        row.extend(table.factors.values().map(|column| cell(column[i].clone())));
        report.push_str(&row.join("\t"));
        report.push('\n');
    }
    report
}

pub fn mouse_report(mouse: &Mouse) -> String {
    let mut report = String::new();
    report.push_str(&format!("Mouse {}\n", mouse.mouse_id));
    if let Some(group) = &mouse.group {
        report.push_str(&format!("  group: {}\n", group));
    }
    if let Some(diet) = &mouse.diet_desc {
        report.push_str(&format!("  diet: {}\n", diet));
    }
    for (key, value) in &mouse.factors {
        report.push_str(&format!("  {}: {}\n", key, value));
    }

    match &mouse.expression_data {
        Some(expression) => {
            report.push_str(&format!("  expression: {} genes\n", expression.len()))
        }
        None => report.push_str("  expression: not arrayed\n"),
    }

    if !mouse.phenotypes.is_empty() {
        report.push_str("  phenotypes:\n");
        for (key, entry) in &mouse.phenotypes {
            match entry {
                PhenotypeEntry::Value(value) => {
                    report.push_str(&format!("    {} = {}\n", key, value));
                }
                PhenotypeEntry::Group(group) => {
                    for (key_id, value) in group {
                        report.push_str(&format!("    {}.{} = {}\n", key, key_id, value));
                    }
                }
            }
        }
    }
    report
}

pub fn mice_report(mice: &[Mouse]) -> String {
    let mut report = format!("{} mice\n", mice.len());
    for mouse in mice {
        report.push_str(&format!(
            "{}\t{}\t{}\t{}\n",
            mouse.mouse_id,
            mouse.group.as_deref().unwrap_or("-"),
            mouse.diet_desc.as_deref().unwrap_or("-"),
            if mouse.has_expression() { "arrayed" } else { "-" }
        ));
    }
    report
}

pub fn error_report(response: &ErrorResponse) -> String {
    let hint = if response.retryable {
        " (transient, retry may succeed)"
    } else {
        ""
    };
    format!("Error: {}{}\n", response.error, hint)
}
