//! Resource model
//!
//! A **Resource** is one catalog record: an identity, an ordered keyword bag,
//! an optional footprint geometry, named nested lists ("assets") and a discard
//! flag. A **ResourceList** owns Resources in insertion order.

mod attributes;
mod list;

pub use attributes::Attributes;
pub use list::{DiscardState, ResourceList};

use indexmap::IndexMap;

use crate::geometry::Geometry;

/// Attribute that always mirrors the resource identity
pub const IDENTITY_KEY: &str = "Identity";

/// A single catalog record
#[derive(Debug, Clone)]
pub struct Resource {
    identity: String,
    attributes: Attributes,
    geometry: Option<Geometry>,
    /// Keyed by lowercase asset name
    assets: IndexMap<String, ResourceList>,
    discarded: bool,
}

impl Resource {
    /// Create an active resource; the identity is also stored as an attribute
    pub fn new(identity: impl Into<String>) -> Self {
        let identity = identity.into();
        let mut attributes = Attributes::new();
        attributes.set(IDENTITY_KEY, identity.clone());
        Self {
            identity,
            attributes,
            geometry: None,
            assets: IndexMap::new(),
            discarded: false,
        }
    }

    /// Create a resource from an existing keyword bag
    pub fn with_attributes(identity: impl Into<String>, attributes: Attributes) -> Self {
        let mut resource = Self::new(identity);
        for (key, values) in attributes.iter() {
            if key != IDENTITY_KEY {
                resource.attributes.set_values(key, values.to_vec());
            }
        }
        resource
    }

    /// Builder-style attribute setter
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    pub fn with_geometry(mut self, geometry: Geometry) -> Self {
        self.geometry = Some(geometry);
        self
    }

    pub fn identity(&self) -> &str {
        &self.identity
    }

    /// Identity comparison is case-insensitive
    pub fn same_identity(&self, other: &Resource) -> bool {
        self.identity.eq_ignore_ascii_case(&other.identity)
    }

    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.attributes.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.attributes.contains(key)
    }

    /// Sets an attribute; the `Identity` keyword cannot be overwritten
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        if key != IDENTITY_KEY {
            self.attributes.set(key, value);
        }
    }

    pub fn set_values(&mut self, key: impl Into<String>, values: Vec<String>) {
        let key = key.into();
        if key != IDENTITY_KEY {
            self.attributes.set_values(key, values);
        }
    }

    pub fn remove(&mut self, key: &str) -> Option<Vec<String>> {
        if key == IDENTITY_KEY {
            return None;
        }
        self.attributes.remove(key)
    }

    pub fn geometry(&self) -> Option<&Geometry> {
        self.geometry.as_ref()
    }

    pub fn set_geometry(&mut self, geometry: Option<Geometry>) {
        self.geometry = geometry;
    }

    pub fn is_active(&self) -> bool {
        !self.discarded
    }

    pub fn is_discarded(&self) -> bool {
        self.discarded
    }

    pub fn discard(&mut self) {
        self.discarded = true;
    }

    pub fn activate(&mut self) {
        self.discarded = false;
    }

    pub fn set_discarded(&mut self, discarded: bool) {
        self.discarded = discarded;
    }

    pub fn toggle(&mut self) {
        self.discarded = !self.discarded;
    }

    pub fn has_asset(&self, name: &str) -> bool {
        self.assets.contains_key(&name.to_lowercase())
    }

    pub fn asset(&self, name: &str) -> Option<&ResourceList> {
        self.assets.get(&name.to_lowercase())
    }

    pub fn asset_mut(&mut self, name: &str) -> Option<&mut ResourceList> {
        self.assets.get_mut(&name.to_lowercase())
    }

    pub fn asset_names(&self) -> impl Iterator<Item = &str> {
        self.assets.keys().map(String::as_str)
    }

    /// Replaces (or adds) an asset list
    pub fn set_asset(&mut self, name: &str, list: ResourceList) {
        self.assets.insert(name.to_lowercase(), list);
    }

    pub fn get_or_create_asset(&mut self, name: &str) -> &mut ResourceList {
        self.assets.entry(name.to_lowercase()).or_default()
    }

    pub fn delete_asset(&mut self, name: &str) -> Option<ResourceList> {
        self.assets.shift_remove(&name.to_lowercase())
    }

    /// Borrows the attributes alongside one asset list
    pub fn split_asset_mut(&mut self, name: &str) -> (&Attributes, Option<&mut ResourceList>) {
        let asset = self.assets.get_mut(&name.to_lowercase());
        (&self.attributes, asset)
    }

    /// Copy without assets, always active
    pub fn clone_detached(&self) -> Resource {
        Resource {
            identity: self.identity.clone(),
            attributes: self.attributes.clone(),
            geometry: self.geometry.clone(),
            assets: IndexMap::new(),
            discarded: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_sets_identity_attribute() {
        let resource = Resource::new("EN0001");
        assert_eq!(resource.identity(), "EN0001");
        assert_eq!(resource.get(IDENTITY_KEY), Some("EN0001"));
        assert!(resource.is_active());
    }

    #[test]
    fn test_identity_attribute_is_immutable() {
        let mut resource = Resource::new("a");
        resource.set(IDENTITY_KEY, "b");
        assert!(resource.remove(IDENTITY_KEY).is_none());
        assert_eq!(resource.get(IDENTITY_KEY), Some("a"));
    }

    #[test]
    fn test_same_identity_ignores_case() {
        assert!(Resource::new("Image1").same_identity(&Resource::new("IMAGE1")));
        assert!(!Resource::new("Image1").same_identity(&Resource::new("Image2")));
    }

    #[test]
    fn test_discard_keeps_attributes() {
        let mut resource = Resource::new("a").with("x", "1");
        resource.discard();
        assert!(resource.is_discarded());
        assert_eq!(resource.get("x"), Some("1"));
        resource.toggle();
        assert!(resource.is_active());
    }

    #[test]
    fn test_asset_names_are_case_insensitive() {
        let mut resource = Resource::new("a");
        resource.get_or_create_asset("Overlaps").append(Resource::new("b"));
        assert!(resource.has_asset("OVERLAPS"));
        assert_eq!(resource.asset("overlaps").map(ResourceList::len), Some(1));
        assert!(resource.delete_asset("overLaps").is_some());
        assert!(!resource.has_asset("Overlaps"));
    }

    #[test]
    fn test_clone_detached_drops_assets_and_activates() {
        let mut resource = Resource::new("a").with("k", "v");
        resource.get_or_create_asset("x");
        resource.discard();

        let copy = resource.clone_detached();
        assert!(copy.is_active());
        assert!(!copy.has_asset("x"));
        assert_eq!(copy.get("k"), Some("v"));
    }
}
