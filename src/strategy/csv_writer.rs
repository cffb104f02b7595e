//! CsvWriter strategy: one delimited row per active resource

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use super::csv_reader::delimiter_of;
use super::{BuildContext, Strategy, StrategyInfo};
use crate::config::{Definition, Globals, expand_template};
use crate::error::{self, Result};
use crate::geometry::{GeometryFormat, GeometryProvider};
use crate::resource::{Resource, ResourceList};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WriteMode {
    Create,
    Append,
}

#[derive(Debug)]
pub struct CsvWriterStrategy {
    info: StrategyInfo,
    file: String,
    file_args: Vec<String>,
    mode: WriteMode,
    delimiter: char,
    header: bool,
    keywords: Vec<String>,
    default_value: String,
    geometry_key: Option<String>,
    geometry_format: GeometryFormat,
    provider: Arc<dyn GeometryProvider>,
}

impl CsvWriterStrategy {
    pub fn new(definition: &Definition, ctx: &BuildContext<'_>) -> Result<Self> {
        let mode = match definition.get_or("Mode", "create").trim().to_lowercase().as_str() {
            "create" => WriteMode::Create,
            "append" => WriteMode::Append,
            _ => return Err(definition.invalid("Mode", &definition.get_or("Mode", ""))),
        };
        let geometry_format = match definition.get_str("GisType") {
            Some(name) => GeometryFormat::from_name(&name)?,
            None => GeometryFormat::default(),
        };

        Ok(Self {
            info: StrategyInfo::new(definition, "CsvWriter"),
            file: definition.require("CsvFile")?,
            file_args: definition.argument_names("CsvFile"),
            mode,
            delimiter: delimiter_of(definition)?,
            header: definition.get_bool("Header", true)?,
            keywords: definition.get_list("Keywords"),
            default_value: definition.get_or("DefaultValue", ""),
            geometry_key: definition.get_str("GisGeometryKey").filter(|k| !k.is_empty()),
            geometry_format,
            provider: Arc::clone(&ctx.geometry),
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

    /// Output columns: `Keywords` when given, else every keyword seen in order
    fn columns(&self, resources: &ResourceList) -> Vec<String> {
        let mut columns = if self.keywords.is_empty() {
            let mut seen: Vec<String> = Vec::new();
            for resource in resources.active_iter() {
                for key in resource.attributes().keys() {
                    if !seen.iter().any(|k| k == key) {
                        seen.push(key.to_string());
                    }
                }
            }
            seen
        } else {
            self.keywords.clone()
        };
        if let Some(key) = &self.geometry_key {
            if !columns.contains(key) {
                columns.push(key.clone());
            }
        }
        columns
    }

    fn quote(&self, field: &str) -> String {
        if field.contains(self.delimiter) || field.contains('"') || field.contains('\n') {
            format!("\"{}\"", field.replace('"', "\"\""))
        } else {
            field.to_string()
        }
    }

    fn field(&self, resource: &Resource, column: &str) -> Result<String> {
        if self.geometry_key.as_deref() == Some(column) {
            if let Some(geometry) = resource.geometry() {
                return self.provider.encode(geometry, self.geometry_format);
            }
        }
        Ok(resource
            .attributes()
            .joined(column, ",")
            .unwrap_or_else(|| self.default_value.clone()))
    }

    /// Renders the rows (and the header line when `with_header`)
    pub fn render(&self, resources: &ResourceList, with_header: bool) -> Result<String> {
        let columns = self.columns(resources);
        let separator = self.delimiter.to_string();
        let mut out = String::new();

        if with_header {
            let header: Vec<String> = columns.iter().map(|c| self.quote(c)).collect();
            out.push_str(&header.join(&separator));
            out.push('\n');
        }
        for resource in resources.active_iter() {
            let row = columns
                .iter()
                .map(|c| self.field(resource, c).map(|f| self.quote(&f)))
                .collect::<Result<Vec<_>>>()?;
            out.push_str(&row.join(&separator));
            out.push('\n');
        }
        Ok(out)
    }
}

impl Strategy for CsvWriterStrategy {
    fn info(&self) -> &StrategyInfo {
        &self.info
    }

    fn apply(&self, resources: &mut ResourceList, globals: &Globals) -> Result<usize> {
        let path = self.path(globals);
        let starts_empty = match self.mode {
            WriteMode::Create => true,
            WriteMode::Append => fs::metadata(&path).map(|m| m.len() == 0).unwrap_or(true),
        };
        let content = self.render(resources, self.header && starts_empty)?;

        if let Some(parent) = Path::new(&path).parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| error::file_write_failed(&path, e.to_string()))?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .write(true)
            .append(self.mode == WriteMode::Append)
            .truncate(self.mode == WriteMode::Create)
            .open(&path)
            .map_err(|e| error::file_write_failed(&path, e.to_string()))?;
        file.write_all(content.as_bytes())
            .map_err(|e| error::file_write_failed(&path, e.to_string()))?;

        let rows = resources.active_count();
        tracing::debug!(path = %path, rows, "wrote delimited file");
        Ok(rows)
    }
}
