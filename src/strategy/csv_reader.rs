//! CsvReader strategy: append one resource per delimited text row

use std::fs;

use super::import::GeometryImport;
use super::{BuildContext, Strategy, StrategyInfo};
use crate::config::{Definition, Globals, expand_template};
use crate::error::{self, Result};
use crate::resource::{Attributes, IDENTITY_KEY, Resource, ResourceList};

/// Splits one line on `delimiter`, honoring double-quoted fields
pub(crate) fn split_row(line: &str, delimiter: char) -> Vec<String> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut quoted = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if quoted => {
                if chars.peek() == Some(&'"') {
                    field.push('"');
                    chars.next();
                } else {
                    quoted = false;
                }
            }
            '"' if field.is_empty() => quoted = true,
            c if c == delimiter && !quoted => fields.push(std::mem::take(&mut field)),
            c => field.push(c),
        }
    }
    fields.push(field);
    fields
}

/// Parses a single-character delimiter keyword
pub(crate) fn delimiter_of(definition: &Definition) -> Result<char> {
    let text = definition.get_or("Delimiter", ",");
    match text.as_str() {
        "\\t" | "tab" => Ok('\t'),
        _ => {
            let mut chars = text.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Ok(c),
                _ => Err(definition.invalid("Delimiter", &text)),
            }
        }
    }
}

#[derive(Debug)]
pub struct CsvReaderStrategy {
    info: StrategyInfo,
    file: String,
    file_args: Vec<String>,
    delimiter: char,
    has_header: bool,
    header: Vec<String>,
    skip_lines: usize,
    ignore_comments: bool,
    identity: Option<String>,
    identity_args: Vec<String>,
    geometry: Option<GeometryImport>,
}

impl CsvReaderStrategy {
    pub fn new(definition: &Definition, ctx: &BuildContext<'_>) -> Result<Self> {
        Ok(Self {
            info: StrategyInfo::new(definition, "CsvReader"),
            file: definition.require("CsvFile")?,
            file_args: definition.argument_names("CsvFile"),
            delimiter: delimiter_of(definition)?,
            has_header: definition.get_bool("HasHeader", true)?,
            header: definition.get_list("Header"),
            skip_lines: definition.get_usize("SkipLines", 0)?,
            ignore_comments: definition.get_bool("IgnoreComments", true)?,
            identity: definition.get_str("Identity").filter(|t| !t.is_empty()),
            identity_args: definition.argument_names("Identity"),
            geometry: GeometryImport::from_definition(definition, ctx)?,
        })
    }

    fn path(&self, globals: &Globals) -> String {
        let args: Vec<String> = self
            .file_args
            .iter()
            .map(|name| globals.get(name).unwrap_or_default().to_string())
            .collect();
        expand_template(&self.file, &args)
    }

    /// Identity from the template bound to row values, else a non-empty
    /// `Identity` column, else `Row<n>`
    fn identity_for(&self, row: usize, attributes: &Attributes) -> String {
        let column = attributes.get(IDENTITY_KEY).map(str::trim).filter(|id| !id.is_empty());
        match (&self.identity, column) {
            (Some(template), column) => {
                let args: Vec<String> = self
                    .identity_args
                    .iter()
                    .map(|name| attributes.get(name).unwrap_or_default().to_string())
                    .collect();
                let identity = expand_template(template, &args);
                if let Some(column) = column.filter(|c| *c != identity) {
                    decision!(self.info, row, column, identity = %identity, "Identity column replaced by template");
                }
                identity
            }
            (None, Some(column)) => column.to_string(),
            (None, None) => format!("Row{row}"),
        }
    }

    /// Parses file content into resources
    pub fn read_str(&self, content: &str) -> Result<Vec<Resource>> {
        let mut lines = content
            .lines()
            .skip(self.skip_lines)
            .filter(|line| !line.trim().is_empty())
            .filter(|line| !(self.ignore_comments && line.trim_start().starts_with('#')));

        let columns: Vec<String> = if self.has_header {
            lines
                .next()
                .map(|line| {
                    split_row(line, self.delimiter)
                        .into_iter()
                        .map(|c| c.trim().to_string())
                        .collect()
                })
                .unwrap_or_default()
        } else {
            self.header.clone()
        };

        let mut resources = Vec::new();
        for (row, line) in lines.enumerate() {
            let fields = split_row(line, self.delimiter);
            let attributes: Attributes = fields
                .into_iter()
                .enumerate()
                .map(|(i, value)| {
                    let name = columns
                        .get(i)
                        .cloned()
                        .unwrap_or_else(|| format!("Column{i}"));
                    (name, value)
                })
                .collect();

            let identity = self.identity_for(row, &attributes);
            let mut resource = Resource::with_attributes(identity, attributes);
            if let Some(import) = &self.geometry {
                import.import(&mut resource)?;
            }
            resources.push(resource);
        }
        Ok(resources)
    }
}

impl Strategy for CsvReaderStrategy {
    fn info(&self) -> &StrategyInfo {
        &self.info
    }

    fn apply(&self, resources: &mut ResourceList, globals: &Globals) -> Result<usize> {
        let path = self.path(globals);
        let content = fs::read_to_string(&path).map_err(|e| error::file_read_failed(&path, e.to_string()))?;

        let rows = self.read_str(&content)?;
        let count = rows.len();
        for resource in rows {
            decision!(self.info, resource = %resource.identity(), "row loaded");
            resources.append(resource);
        }
        tracing::debug!(path = %path, rows = count, "read delimited file");
        Ok(count)
    }
}
