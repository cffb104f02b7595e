//! Arena of resources with an identity index

use std::collections::HashMap;

use super::Resource;

/// Discard flags captured at a point in time
#[derive(Debug, Clone, Default)]
pub struct DiscardState {
    entries: Vec<(String, bool)>,
}

/// Ordered, owned collection of resources
///
/// Resources live in a `Vec` arena addressed by slot. An identity index gives
/// O(1) lookup; when two resources share an identity the later one shadows
/// the earlier in the index while both stay in the arena.
#[derive(Debug, Clone, Default)]
pub struct ResourceList {
    resources: Vec<Resource>,
    index: HashMap<String, usize>,
}

impl ResourceList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    /// Appends a resource and returns its slot
    pub fn append(&mut self, resource: Resource) -> usize {
        let slot = self.resources.len();
        self.index.insert(resource.identity().to_string(), slot);
        self.resources.push(resource);
        slot
    }

    pub fn get(&self, slot: usize) -> Option<&Resource> {
        self.resources.get(slot)
    }

    pub fn get_mut(&mut self, slot: usize) -> Option<&mut Resource> {
        self.resources.get_mut(slot)
    }

    pub fn slot_of(&self, identity: &str) -> Option<usize> {
        self.index.get(identity).copied()
    }

    pub fn by_id(&self, identity: &str) -> Option<&Resource> {
        self.slot_of(identity).and_then(|slot| self.resources.get(slot))
    }

    pub fn by_id_mut(&mut self, identity: &str) -> Option<&mut Resource> {
        self.slot_of(identity)
            .and_then(move |slot| self.resources.get_mut(slot))
    }

    /// Every resource, active or not
    pub fn iter(&self) -> impl Iterator<Item = &Resource> {
        self.resources.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Resource> {
        self.resources.iter_mut()
    }

    /// Lazy view over the active resources
    pub fn active_iter(&self) -> impl Iterator<Item = &Resource> {
        self.resources.iter().filter(|r| r.is_active())
    }

    pub fn active_iter_mut(&mut self) -> impl Iterator<Item = &mut Resource> {
        self.resources.iter_mut().filter(|r| r.is_active())
    }

    /// Snapshot of the slots that are active right now
    pub fn active_indices(&self) -> Vec<usize> {
        self.resources
            .iter()
            .enumerate()
            .filter(|(_, r)| r.is_active())
            .map(|(slot, _)| slot)
            .collect()
    }

    pub fn active_count(&self) -> usize {
        self.active_iter().count()
    }

    pub fn discard(&mut self, identity: &str) {
        if let Some(resource) = self.by_id_mut(identity) {
            resource.discard();
        }
    }

    pub fn activate(&mut self, identity: &str) {
        if let Some(resource) = self.by_id_mut(identity) {
            resource.activate();
        }
    }

    pub fn toggle_discard_all(&mut self) {
        self.resources.iter_mut().for_each(Resource::toggle);
    }

    pub fn reset_discard_all(&mut self) {
        self.resources.iter_mut().for_each(Resource::activate);
    }

    /// Removes discarded resources and returns how many were removed
    pub fn delete_discarded(&mut self) -> usize {
        let before = self.resources.len();
        self.resources.retain(Resource::is_active);
        self.rebuild_index();
        before - self.resources.len()
    }

    pub fn has_asset(&self, identity: &str, name: &str) -> bool {
        self.by_id(identity).is_some_and(|r| r.has_asset(name))
    }

    pub fn delete_asset(&mut self, identity: &str, name: &str) {
        if let Some(resource) = self.by_id_mut(identity) {
            resource.delete_asset(name);
        }
    }

    pub fn get_or_create_asset(&mut self, identity: &str, name: &str) -> Option<&mut ResourceList> {
        self.by_id_mut(identity)
            .map(|resource| resource.get_or_create_asset(name))
    }

    /// Save point of every discard flag
    pub fn discard_state(&self) -> DiscardState {
        DiscardState {
            entries: self
                .resources
                .iter()
                .map(|r| (r.identity().to_string(), r.is_discarded()))
                .collect(),
        }
    }

    /// Restores a save point; resources appended since are left untouched
    ///
    /// Flags are restored by slot while the saved resources still occupy
    /// their slots, and by identity once resources were removed or moved.
    pub fn restore_discard_state(&mut self, state: &DiscardState) {
        let aligned = state.entries.len() <= self.resources.len()
            && state
                .entries
                .iter()
                .zip(&self.resources)
                .all(|((identity, _), r)| identity == r.identity());

        if aligned {
            for (resource, (_, discarded)) in self.resources.iter_mut().zip(&state.entries) {
                resource.set_discarded(*discarded);
            }
        } else {
            for (identity, discarded) in &state.entries {
                if let Some(resource) = self.by_id_mut(identity) {
                    resource.set_discarded(*discarded);
                }
            }
        }
    }

    /// Runs `f` on a one-element list holding the resource at `slot`
    ///
    /// The resource is moved back into its slot afterwards. If `f` removed it,
    /// a detached copy is put back in the discarded state.
    pub fn isolate<T, F>(&mut self, slot: usize, f: F) -> T
    where
        F: FnOnce(&mut ResourceList) -> T,
    {
        let Some(current) = self.resources.get_mut(slot) else {
            return f(&mut ResourceList::new());
        };
        let mut fallback = current.clone_detached();
        fallback.discard();
        let resource = std::mem::replace(current, fallback);

        let mut single = ResourceList::new();
        single.append(resource);
        let result = f(&mut single);

        if let Some(resource) = single.resources.into_iter().next() {
            self.resources[slot] = resource;
        }
        result
    }

    /// Deep copy of the resources without their assets, all active
    pub fn clone_detached(&self) -> ResourceList {
        let mut copy = ResourceList::new();
        for resource in &self.resources {
            copy.append(resource.clone_detached());
        }
        copy
    }

    /// Detached copy of the active resources only
    pub fn clone_active(&self) -> ResourceList {
        let mut copy = ResourceList::new();
        for resource in self.active_iter() {
            copy.append(resource.clone_detached());
        }
        copy
    }

    /// Stable sort of the active resources in place
    ///
    /// Discarded resources keep their slots; the active ones are permuted
    /// among the slots the active view occupied.
    pub fn sort_active_by<F>(&mut self, mut compare: F)
    where
        F: FnMut(&Resource, &Resource) -> std::cmp::Ordering,
    {
        let slots = self.active_indices();
        let mut order = slots.clone();
        order.sort_by(|&a, &b| compare(&self.resources[a], &self.resources[b]));

        let mut taken: Vec<Option<Resource>> = self.resources.drain(..).map(Some).collect();
        let sorted: Vec<Resource> = order
            .iter()
            .filter_map(|&slot| taken[slot].take())
            .collect();
        // Fill active slots in sorted order, leave the rest where they were
        for (slot, resource) in slots.into_iter().zip(sorted) {
            taken[slot] = Some(resource);
        }
        self.resources = taken.into_iter().flatten().collect();
        self.rebuild_index();
    }

    fn rebuild_index(&mut self) {
        self.index.clear();
        for (slot, resource) in self.resources.iter().enumerate() {
            self.index.insert(resource.identity().to_string(), slot);
        }
    }
}

impl FromIterator<Resource> for ResourceList {
    fn from_iter<T: IntoIterator<Item = Resource>>(iter: T) -> Self {
        let mut list = ResourceList::new();
        for resource in iter {
            list.append(resource);
        }
        list
    }
}
