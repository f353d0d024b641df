//! Plain-text rendering of comparison results

use std::fmt::Write as _;

use mismo_compare::{differences, MatchRecord, TagComparison, TypeDifference, Verdict};

const NO_ENTRY: &str = "--";
const DIFFERS: &str = "X";

/// A bordered text table with left-aligned columns
#[derive(Debug, Default)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new<I, S>(headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            headers: headers.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    pub fn push_row<I, S>(&mut self, row: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.rows.push(row.into_iter().map(Into::into).collect());
    }

    /// True when no rows have been pushed
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn render(&self) -> String {
        let widths: Vec<usize> = (0..self.headers.len())
            .map(|col| {
                std::iter::once(&self.headers)
                    .chain(&self.rows)
                    .map(|row| cell(row, col).chars().count())
                    .max()
                    .unwrap_or_default()
            })
            .collect();

        let border: String = widths.iter().fold(String::from("+"), |mut acc, w| {
            acc.push_str(&"-".repeat(w + 2));
            acc.push('+');
            acc
        });

        let mut out = String::new();
        let _ = writeln!(out, "{border}");
        write_line(&mut out, &self.headers, &widths);
        let _ = writeln!(out, "{border}");
        for row in &self.rows {
            write_line(&mut out, row, &widths);
        }
        let _ = writeln!(out, "{border}");
        out
    }
}

fn cell(row: &[String], col: usize) -> &str {
    row.get(col).map_or("", String::as_str)
}

fn write_line(out: &mut String, row: &[String], widths: &[usize]) {
    out.push('|');
    for (col, width) in widths.iter().enumerate() {
        let _ = write!(out, " {:<width$} |", cell(row, col));
    }
    out.push('\n');
}

/// Full report: one section per compared tag, then the type differences
pub fn render(results: &[TagComparison<'_>], type_diffs: &[TypeDifference]) -> String {
    let mut out = String::new();
    for result in results {
        render_tag(&mut out, result);
    }

    let _ = writeln!(out, "== ELEMENT TYPE DIFFERENCES ==");
    let mut table = Table::new(["SIDE", "ELEMENT", "PATHS"]);
    for diff in type_diffs {
        table.push_row([diff.side.to_string(), diff.kind.clone(), diff.paths.join(", ")]);
    }
    if table.is_empty() {
        let _ = writeln!(out, "Both documents contain the same element types.");
    } else {
        out.push_str(&table.render());
    }
    out
}

fn render_tag(out: &mut String, result: &TagComparison<'_>) {
    let _ = writeln!(out, "== {} ==", result.tag);
    if let Some(unknown) = &result.unknown {
        let _ = writeln!(out, "{unknown}\n");
        return;
    }

    let mut summary = Table::new(["PRIMARY", "EXACT MATCH", "CLOSEST MATCH"]);
    for (xpath, record) in &result.table {
        let exact = record
            .exact_match()
            .map_or_else(|| NO_ENTRY.to_string(), |node| node.xpath_str());
        summary.push_row([xpath.clone(), exact, closest_label(record)]);
    }
    out.push_str(&summary.render());
    out.push('\n');

    for (xpath, record) in &result.table {
        if !matches!(record.verdict(), Verdict::Closest { .. }) {
            continue;
        }
        let _ = writeln!(out, "Closest match for {xpath}");
        let mut detail = Table::new(["PATH", "FIELD", "DIFF", "PRIMARY", "BASIS"]);
        for diff in differences(record) {
            let flag = if diff.differs() { DIFFERS } else { "" };
            detail.push_row([
                diff.path.clone(),
                diff.field.clone().unwrap_or_default(),
                flag.to_string(),
                diff.primary.clone().unwrap_or_else(|| NO_ENTRY.to_string()),
                diff.basis.clone().unwrap_or_else(|| NO_ENTRY.to_string()),
            ]);
        }
        out.push_str(&detail.render());
        out.push('\n');
    }
}

/// `<xpath> (n/total matches; d diffs)` for a closest match
///
/// `n` can exceed `total` when leaves repeat at one location; see
/// [`MatchRecord::differences_count`].
fn closest_label(record: &MatchRecord<'_>) -> String {
    match record.verdict() {
        Verdict::Closest {
            candidate,
            score,
            total,
        } => format!(
            "{} ({score}/{total} matches; {} diffs)",
            candidate.xpath_str(),
            record.differences_count().unwrap_or_default()
        ),
        Verdict::Exact(_) | Verdict::Unmatched => NO_ENTRY.to_string(),
    }
}
