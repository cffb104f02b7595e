//! Geometry import from a keyword holding WKT or hex WKB

use std::sync::Arc;

use super::BuildContext;
use crate::config::Definition;
use crate::error::{self, Result};
use crate::geometry::{GeometryFormat, GeometryProvider};
use crate::resource::Resource;

/// What to do with a resource whose geometry text does not parse
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InvalidGeometryAction {
    /// Discard the resource
    #[default]
    Disable,
    Error,
    /// Keep the resource without geometry
    Continue,
}

impl InvalidGeometryAction {
    fn parse(text: &str) -> Option<Self> {
        match text.trim().to_lowercase().as_str() {
            "disable" => Some(Self::Disable),
            "error" => Some(Self::Error),
            "continue" => Some(Self::Continue),
            _ => None,
        }
    }
}

/// `GisGeometryKey`, `GisType`, `RemoveGisKeywordAfterImport` and
/// `InvalidGeometryAction` of a reader
#[derive(Debug, Clone)]
pub struct GeometryImport {
    pub key: String,
    pub format: GeometryFormat,
    remove_key: bool,
    on_invalid: InvalidGeometryAction,
    provider: Arc<dyn GeometryProvider>,
}

impl GeometryImport {
    /// `None` when the definition names no geometry keyword
    pub fn from_definition(definition: &Definition, ctx: &BuildContext<'_>) -> Result<Option<Self>> {
        let Some(key) = definition.get_str("GisGeometryKey").filter(|k| !k.is_empty()) else {
            return Ok(None);
        };
        let format = match definition.get_str("GisType") {
            Some(name) => GeometryFormat::from_name(&name)?,
            None => GeometryFormat::default(),
        };
        let on_invalid = match definition.get_str("InvalidGeometryAction") {
            Some(text) => InvalidGeometryAction::parse(&text)
                .ok_or_else(|| definition.invalid("InvalidGeometryAction", &text))?,
            None => InvalidGeometryAction::default(),
        };

        Ok(Some(Self {
            key,
            format,
            remove_key: definition.get_bool("RemoveGisKeywordAfterImport", false)?,
            on_invalid,
            provider: Arc::clone(&ctx.geometry),
        }))
    }

    /// Sets the resource geometry from its keyword
    ///
    /// Resources without the keyword (or with an empty value) are left alone.
    pub fn import(&self, resource: &mut Resource) -> Result<()> {
        let Some(text) = resource.get(&self.key).filter(|t| !t.trim().is_empty()) else {
            return Ok(());
        };

        match self.provider.parse(text, self.format) {
            Ok(geometry) => {
                resource.set_geometry(Some(geometry));
                if self.remove_key {
                    resource.remove(&self.key);
                }
            }
            Err(e) => match self.on_invalid {
                InvalidGeometryAction::Error => {
                    return Err(error::geometry_import_failed(resource.identity(), e.to_string()));
                }
                InvalidGeometryAction::Disable => {
                    tracing::warn!(resource = %resource.identity(), error = %e, "invalid geometry, resource discarded");
                    resource.discard();
                }
                InvalidGeometryAction::Continue => {
                    tracing::warn!(resource = %resource.identity(), error = %e, "invalid geometry ignored");
                }
            },
        }
        Ok(())
    }
}
