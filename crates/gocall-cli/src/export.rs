//! Function listings as tables, CSV and JSON.

use std::io::{self, Write};

use gocall_graph::{CallKind, FunctionDescriptor, IndexedProject, Resolution, flatten_all};
use serde::Serialize;
use unicode_width::UnicodeWidthStr;

use crate::AppError;
use crate::cli::ListFormat;

const HEADERS: [&str; 7] = [
    "File",
    "Function",
    "Line",
    "Parameters",
    "Returns",
    "Externals",
    "FunctionCalls",
];
const EMPTY_LIST: &str = "None";

/// One row of a function listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FunctionRecord {
    /// File path relative to the project root.
    pub file: String,
    /// Canonical identity.
    pub function: String,
    /// Line of the declaration.
    pub line: u32,
    /// Parameters as `name type`.
    pub parameters: Vec<String>,
    /// Result types.
    pub returns: Vec<String>,
    /// Method and non-project targets, first occurrence order.
    pub externals: Vec<String>,
    /// Project functions called, first occurrence order.
    pub function_calls: Vec<String>,
}

impl FunctionRecord {
    fn new(project: &IndexedProject, resolution: &Resolution, descriptor: &FunctionDescriptor) -> Self {
        let mut externals: Vec<String> = Vec::new();
        let mut function_calls: Vec<String> = Vec::new();
        for site in flatten_all(resolution.calls_of(descriptor.id())) {
            let (bucket, name) = match &site.kind {
                CallKind::Local(id) | CallKind::CrossModule(id) => (&mut function_calls, id.to_string()),
                CallKind::Method { .. } | CallKind::External { .. } => {
                    (&mut externals, site.kind.to_string())
                }
                CallKind::Literal => continue,
            };
            if !bucket.contains(&name) {
                bucket.push(name);
            }
        }
        Self {
            file: project.relative_path(descriptor.file()).to_string(),
            function: descriptor.id().to_string(),
            line: descriptor.start_line,
            parameters: descriptor.parameter_texts(),
            returns: descriptor.returns.clone(),
            externals,
            function_calls,
        }
    }

    fn cells(&self, separator: &str) -> [String; 7] {
        [
            self.file.clone(),
            self.function.clone(),
            self.line.to_string(),
            join_or_none(&self.parameters, separator),
            join_or_none(&self.returns, separator),
            join_or_none(&self.externals, separator),
            join_or_none(&self.function_calls, separator),
        ]
    }
}

fn join_or_none(items: &[String], separator: &str) -> String {
    if items.is_empty() {
        EMPTY_LIST.to_owned()
    } else {
        items.join(separator)
    }
}

/// Records for every indexed function, ordered by file then line.
#[must_use]
pub fn function_records(project: &IndexedProject, resolution: &Resolution) -> Vec<FunctionRecord> {
    project
        .registry()
        .by_file()
        .into_values()
        .flatten()
        .map(|descriptor| FunctionRecord::new(project, resolution, descriptor))
        .collect()
}

/// Writes `records` in the requested `format`.
pub(crate) fn write_records(
    records: &[FunctionRecord],
    format: ListFormat,
    out: &mut impl Write,
) -> Result<(), AppError> {
    match format {
        ListFormat::Table => write_table(records, out).map_err(AppError::WriteOutput),
        ListFormat::Csv => write_csv(records, out).map_err(AppError::WriteOutput),
        ListFormat::Json => {
            serde_json::to_writer_pretty(&mut *out, records).map_err(AppError::SerialiseListing)?;
            writeln!(out).map_err(AppError::WriteOutput)
        }
    }
}

/// Writes an aligned table; lists are joined with `, `.
///
/// # Errors
///
/// Propagates failures from `out`.
pub fn write_table(records: &[FunctionRecord], out: &mut impl Write) -> io::Result<()> {
    let rows: Vec<[String; 7]> = records.iter().map(|record| record.cells(", ")).collect();
    let mut widths = HEADERS.map(UnicodeWidthStr::width);
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.width());
        }
    }

    write_table_row(out, &HEADERS, &widths)?;
    let rule: usize = widths.iter().sum::<usize>() + 3 * (widths.len() - 1);
    writeln!(out, "{}", "-".repeat(rule))?;
    for row in &rows {
        write_table_row(out, row, &widths)?;
    }
    Ok(())
}

fn write_table_row<S: AsRef<str>>(out: &mut impl Write, cells: &[S], widths: &[usize]) -> io::Result<()> {
    let mut line = String::new();
    for (index, (cell, width)) in cells.iter().zip(widths).enumerate() {
        if index > 0 {
            line.push_str(" | ");
        }
        let text = cell.as_ref();
        line.push_str(text);
        line.push_str(&" ".repeat(width.saturating_sub(text.width())));
    }
    writeln!(out, "{}", line.trim_end())
}

/// Writes CSV with a header row; lists are joined with `; `.
///
/// # Errors
///
/// Propagates failures from `out`.
pub fn write_csv(records: &[FunctionRecord], out: &mut impl Write) -> io::Result<()> {
    writeln!(out, "{}", HEADERS.join(","))?;
    for record in records {
        let fields: Vec<String> = record
            .cells("; ")
            .iter()
            .map(|cell| quote_csv_field(cell))
            .collect();
        writeln!(out, "{}", fields.join(","))?;
    }
    Ok(())
}

/// Wraps `field` in double quotes, doubling any embedded quote.
#[must_use]
pub fn quote_csv_field(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}
