// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Metadata provider contract
//!
//! The pipeline never discovers declarative markers itself; a provider hands
//! it pre-built class descriptors.

use std::collections::HashMap;
use std::sync::Arc;

use crate::metadata::{ClassId, ClassMetadata};

/// Source of class descriptors
pub trait MetadataProvider: Send + Sync {
    /// Look up the descriptor for a class identity
    fn class_metadata(&self, class: &ClassId) -> Option<Arc<ClassMetadata>>;
}

/// Map-backed provider populated up front
#[derive(Default)]
pub struct StaticMetadataProvider {
    classes: HashMap<ClassId, Arc<ClassMetadata>>,
}

impl StaticMetadataProvider {
    /// Create an empty provider
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a provider from a set of class descriptors
    pub fn of(classes: impl IntoIterator<Item = Arc<ClassMetadata>>) -> Self {
        let mut provider = Self::new();
        for class in classes {
            provider.register(class);
        }
        provider
    }

    /// Register a class descriptor, replacing any previous one with the
    /// same identity
    pub fn register(&mut self, class: Arc<ClassMetadata>) {
        self.classes.insert(class.id().clone(), class);
    }

    /// Number of registered classes
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    /// Whether the provider is empty
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

impl MetadataProvider for StaticMetadataProvider {
    fn class_metadata(&self, class: &ClassId) -> Option<Arc<ClassMetadata>> {
        self.classes.get(class).cloned()
    }
}
