//! Capability registration (startup, append-only) and lookup (read-only).

use std::collections::HashMap;

use crate::descriptor::{CapabilityDescriptor, CapabilityKind};
use crate::error::{CapabilityError, CapabilityResult};

/// Collects descriptors from provider modules during startup.
///
/// Identities are unique per kind; a collision is reported, never overwritten.
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    descriptors: Vec<CapabilityDescriptor>,
    index: HashMap<(CapabilityKind, String), usize>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one descriptor.
    pub fn register(&mut self, descriptor: CapabilityDescriptor) -> CapabilityResult<()> {
        let key = (descriptor.kind(), descriptor.identity().to_string());
        if self.index.contains_key(&key) {
            return Err(CapabilityError::DuplicateCapability {
                kind: key.0,
                identity: key.1,
            });
        }

        log::debug!("Registered {} '{}'", key.0.name(), key.1);
        self.index.insert(key, self.descriptors.len());
        self.descriptors.push(descriptor);
        Ok(())
    }

    /// Add every descriptor a provider produced, in order.
    pub fn register_all<I>(&mut self, descriptors: I) -> CapabilityResult<()>
    where
        I: IntoIterator<Item = CapabilityDescriptor>,
    {
        descriptors
            .into_iter()
            .try_for_each(|descriptor| self.register(descriptor))
    }

    /// Number of descriptors registered so far.
    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// Freeze into a read-only registry.
    pub fn build(self) -> CapabilityRegistry {
        log::info!(
            "Capability registry frozen with {} entries",
            self.descriptors.len()
        );
        CapabilityRegistry {
            descriptors: self.descriptors,
            index: self.index,
        }
    }
}

/// Immutable mapping from `(kind, identity)` to descriptor.
///
/// Built once by [`RegistryBuilder`]; shared behind an `Arc` and read from
/// any number of tasks without locking.
#[derive(Debug, Default)]
pub struct CapabilityRegistry {
    descriptors: Vec<CapabilityDescriptor>,
    index: HashMap<(CapabilityKind, String), usize>,
}

impl CapabilityRegistry {
    /// Exact lookup by kind and identity.
    pub fn lookup_exact(
        &self,
        kind: CapabilityKind,
        identity: &str,
    ) -> CapabilityResult<&CapabilityDescriptor> {
        self.index
            .get(&(kind, identity.to_string()))
            .map(|&i| &self.descriptors[i])
            .ok_or_else(|| CapabilityError::NotFound {
                kind,
                identity: identity.to_string(),
            })
    }

    /// All descriptors of one kind, in registration order.
    pub fn list(
        &self,
        kind: CapabilityKind,
    ) -> impl Iterator<Item = &CapabilityDescriptor> + Clone + '_ {
        self.descriptors.iter().filter(move |d| d.kind() == kind)
    }

    /// All resource templates, in registration order.
    ///
    /// The iterator is lazy and `Clone`, so a caller can restart the scan.
    pub fn all_templates(&self) -> impl Iterator<Item = &CapabilityDescriptor> + Clone + '_ {
        self.list(CapabilityKind::ResourceTemplate)
    }

    pub fn count(&self, kind: CapabilityKind) -> usize {
        self.list(kind).count()
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}
