use crate::cohens_d::EffectSizeRow;
use crate::correlation::CorrelationRow;
use crate::eta_squared::AnovaEtaRow;
use crate::metrics::EffectSizeReport;
use crate::partial_eta::PartialEtaRow;

/// Render a deterministic markdown report for a full run.
///
/// Each table shows at most `max_rows` rows.
pub fn render_report(report: &EffectSizeReport, max_rows: usize) -> String {
    let mut lines = Vec::new();

    lines.push("# Effect Size Report".to_string());
    lines.push(String::new());
    lines.push("## Run summary".to_string());
    if let Some(source) = &report.source {
        lines.push(format!("- source: {source}"));
    }
    lines.push(format!("- report_version: {}", report.report_version));
    lines.push(format!("- observations: {}", report.observations));
    lines.push(format!(
        "- group_column: {} ({})",
        report.group_column,
        report.groups.join(", ")
    ));
    lines.push(format!("- metrics: {}", report.metrics.join(", ")));
    lines.push(format!("- factors: {}", report.factors.join(", ")));
    lines.push(String::new());

    lines.push("## Cohen's d".to_string());
    lines.extend(cohens_d_lines(&report.cohens_d, max_rows));
    lines.push(String::new());

    lines.push("## Pearson correlations".to_string());
    lines.extend(correlation_lines(&report.correlations, max_rows));
    lines.push(String::new());

    lines.push("## Partial eta-squared".to_string());
    lines.extend(partial_eta_lines(&report.partial_eta_squared, max_rows));
    lines.push(String::new());

    lines.push("## One-way ANOVA with eta-squared".to_string());
    lines.extend(eta_squared_lines(&report.eta_squared, max_rows));
    lines.push(String::new());

    lines.push("## Performance".to_string());
    lines.push(format!("- total_ms: {}", report.performance.total_ms));
    lines.join("\n")
}

pub fn render_cohens_d(rows: &[EffectSizeRow], max_rows: usize) -> String {
    cohens_d_lines(rows, max_rows).join("\n")
}

pub fn render_correlations(rows: &[CorrelationRow], max_rows: usize) -> String {
    correlation_lines(rows, max_rows).join("\n")
}

pub fn render_partial_eta(rows: &[PartialEtaRow], max_rows: usize) -> String {
    partial_eta_lines(rows, max_rows).join("\n")
}

pub fn render_eta_squared(rows: &[AnovaEtaRow], max_rows: usize) -> String {
    eta_squared_lines(rows, max_rows).join("\n")
}

fn cohens_d_lines(rows: &[EffectSizeRow], max_rows: usize) -> Vec<String> {
    let mut lines = vec![
        "| Column | Pair | Cohen's d | Interpretation |".to_string(),
        "| --- | --- | --- | --- |".to_string(),
    ];
    for row in rows.iter().take(max_rows) {
        lines.push(format!(
            "| {} | {} | {} | {} |",
            cell(&row.column),
            cell(&row.pair),
            fmt_value(row.cohens_d),
            row.interpretation.label()
        ));
    }
    push_truncation(&mut lines, rows.len(), max_rows);
    lines
}

fn correlation_lines(rows: &[CorrelationRow], max_rows: usize) -> Vec<String> {
    let mut lines = vec![
        "| Variable 1 | Variable 2 | Pearson's r | P-value | Direction | Strength |".to_string(),
        "| --- | --- | --- | --- | --- | --- |".to_string(),
    ];
    for row in rows.iter().take(max_rows) {
        lines.push(format!(
            "| {} | {} | {} | {} | {} | {} |",
            cell(&row.variable_1),
            cell(&row.variable_2),
            fmt_value(row.pearson_r),
            fmt_p(row.p_value),
            row.direction.label(),
            row.strength.label()
        ));
    }
    push_truncation(&mut lines, rows.len(), max_rows);
    lines
}

fn partial_eta_lines(rows: &[PartialEtaRow], max_rows: usize) -> Vec<String> {
    let mut lines = vec![
        "| Variables | Factor | Partial Eta-squared (ηp²) | Interpretation |".to_string(),
        "| --- | --- | --- | --- |".to_string(),
    ];
    for row in rows.iter().take(max_rows) {
        lines.push(format!(
            "| {} | {} | {} | {} |",
            cell(&row.variable),
            cell(&row.factor),
            fmt_value(row.partial_eta_squared),
            row.interpretation.label()
        ));
    }
    push_truncation(&mut lines, rows.len(), max_rows);
    lines
}

fn eta_squared_lines(rows: &[AnovaEtaRow], max_rows: usize) -> Vec<String> {
    let mut lines = vec![
        "| Metric | Source | sum_sq | df | F | PR(>F) | Eta-squared (η²) |".to_string(),
        "| --- | --- | --- | --- | --- | --- | --- |".to_string(),
    ];
    for row in rows.iter().take(max_rows) {
        lines.push(format!(
            "| {} | {} | {} | {} | {} | {} | {} |",
            cell(&row.metric),
            cell(&row.source),
            fmt_value(row.sum_sq),
            row.df,
            fmt_optional(row.f_value, fmt_value),
            fmt_optional(row.p_value, fmt_p),
            fmt_optional(row.eta_squared, fmt_value)
        ));
    }
    push_truncation(&mut lines, rows.len(), max_rows);
    lines
}

fn push_truncation(lines: &mut Vec<String>, total: usize, max_rows: usize) {
    if total > max_rows {
        lines.push(String::new());
        lines.push(format!("_{} of {} rows shown._", max_rows, total));
    }
}

/// Escape the markdown column separator inside a cell.
fn cell(text: &str) -> String {
    text.replace('|', "\\|")
}

fn fmt_value(value: f64) -> String {
    if value.is_finite() {
        format!("{value:.4}")
    } else {
        value.to_string()
    }
}

fn fmt_p(value: f64) -> String {
    if value.is_finite() && value != 0.0 && value < 1e-4 {
        format!("{value:.2e}")
    } else {
        fmt_value(value)
    }
}

fn fmt_optional(value: Option<f64>, format: fn(f64) -> String) -> String {
    value.map(format).unwrap_or_else(|| "-".to_string())
}
