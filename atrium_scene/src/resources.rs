//! GPU-side resource accounting for gallery teardown. The renderer owns
//! the actual buffers and textures; controllers track what they had
//! allocated so disposal can prove every handle was released exactly
//! once.

use std::collections::BTreeMap;

use log::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ResourceKind {
    Geometry,
    Material,
    Texture,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct ResourceHandle {
    pub kind: ResourceKind,
    pub label: String,
}

impl ResourceHandle {
    pub fn new(kind: ResourceKind, label: &str) -> Self {
        Self {
            kind,
            label: label.to_string(),
        }
    }
}

/// Per-controller release ledger. `release_all` is what dispose calls;
/// anything still outstanding afterwards is a leak, and a second release
/// of the same handle is counted rather than honored.
#[derive(Debug, Default)]
pub struct ResourceLedger {
    outstanding: BTreeMap<ResourceHandle, u32>,
    released: Vec<ResourceHandle>,
    double_releases: u32,
}

impl ResourceLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allocate(&mut self, handle: ResourceHandle) {
        *self.outstanding.entry(handle).or_insert(0) += 1;
    }

    /// Release one handle. Returns false (and logs) when the handle was
    /// never allocated or already fully released.
    pub fn release(&mut self, handle: &ResourceHandle) -> bool {
        match self.outstanding.get_mut(handle) {
            Some(count) if *count > 0 => {
                *count -= 1;
                if *count == 0 {
                    self.outstanding.remove(handle);
                }
                self.released.push(handle.clone());
                true
            }
            _ => {
                self.double_releases += 1;
                warn!(
                    "release of untracked resource {:?} '{}'",
                    handle.kind, handle.label
                );
                false
            }
        }
    }

    /// Release everything still outstanding, in allocation-map order.
    /// Returns how many handles were released.
    pub fn release_all(&mut self) -> usize {
        let pending: Vec<ResourceHandle> = self
            .outstanding
            .iter()
            .flat_map(|(handle, count)| std::iter::repeat(handle.clone()).take(*count as usize))
            .collect();
        let released = pending.len();
        self.outstanding.clear();
        self.released.extend(pending);
        released
    }

    pub fn outstanding(&self) -> usize {
        self.outstanding.values().map(|count| *count as usize).sum()
    }

    pub fn released(&self) -> &[ResourceHandle] {
        &self.released
    }

    pub fn double_releases(&self) -> u32 {
        self.double_releases
    }
}
