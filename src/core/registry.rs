use std::collections::HashMap;

use super::descriptor::TypeDescriptor;
use super::traits::{Record, Resource};
use crate::errors::ApiError;

type Binder = fn(serde_json::Value) -> Result<Record, ApiError>;

struct RegisteredType {
    descriptor: TypeDescriptor,
    binder: Binder,
}

/// Explicit mapping from stable type identifiers to their descriptors.
///
/// Built once at start-up and then shared read-only (typically behind an
/// `Arc`); there is no interior mutability, so concurrent searches never
/// observe each other.
#[derive(Default)]
pub struct Registry {
    types: HashMap<&'static str, RegisteredType>,
}

fn bind_record<T: Resource>(raw: serde_json::Value) -> Result<Record, ApiError> {
    T::bind(raw)?.into_record()
}

impl Registry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `T` under `T::TYPE_ID`, replacing an earlier registration of the same id.
    #[must_use]
    pub fn register<T: Resource>(mut self) -> Self {
        let descriptor = T::describe().with_identifier();
        debug_assert_eq!(
            descriptor.name,
            T::TYPE_ID,
            "descriptor name must match the resource TYPE_ID"
        );
        tracing::debug!(
            type_id = T::TYPE_ID,
            table = descriptor.table,
            attributes = descriptor.attributes.len(),
            relations = descriptor.relations.len(),
            "Registered resource type"
        );
        self.types.insert(
            T::TYPE_ID,
            RegisteredType {
                descriptor,
                binder: bind_record::<T>,
            },
        );
        self
    }

    /// Descriptor for `type_id`.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::UnknownType` if nothing was registered under `type_id`.
    pub fn get(&self, type_id: &str) -> Result<&TypeDescriptor, ApiError> {
        self.types
            .get(type_id)
            .map(|t| &t.descriptor)
            .ok_or_else(|| ApiError::unknown_type(type_id))
    }

    /// Validate raw request data through the registered type and return it as a record.
    ///
    /// # Errors
    ///
    /// `UnknownType` for unregistered ids, `BadRequest` when the data does not bind.
    pub fn bind(&self, type_id: &str, raw: serde_json::Value) -> Result<Record, ApiError> {
        let registered = self
            .types
            .get(type_id)
            .ok_or_else(|| ApiError::unknown_type(type_id))?;
        (registered.binder)(raw)
    }

    #[must_use]
    pub fn contains(&self, type_id: &str) -> bool {
        self.types.contains_key(type_id)
    }

    /// Registered identifiers, sorted.
    #[must_use]
    pub fn type_ids(&self) -> Vec<&'static str> {
        let mut ids: Vec<_> = self.types.keys().copied().collect();
        ids.sort_unstable();
        ids
    }
}
