// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Interceptor metadata reader
//!
//! Bridges a [`MetadataProvider`] to resolved [`InterceptorMetadata`],
//! caching per class and role so repeated proxy creation reuses one
//! immutable record.

use std::sync::Arc;

use dashmap::DashMap;

use crate::error::{Error, Result};
use crate::metadata::{ClassId, InterceptorMetadata, InterceptorRole, MetadataProvider};

/// Builds and caches interceptor metadata from provider-supplied descriptors
pub struct InterceptorMetadataReader {
    provider: Arc<dyn MetadataProvider>,
    interceptors: DashMap<ClassId, Arc<InterceptorMetadata>>,
    target_classes: DashMap<ClassId, Arc<InterceptorMetadata>>,
}

impl InterceptorMetadataReader {
    /// Create a reader over a provider
    pub fn new(provider: Arc<dyn MetadataProvider>) -> Self {
        InterceptorMetadataReader {
            provider,
            interceptors: DashMap::new(),
            target_classes: DashMap::new(),
        }
    }

    /// Metadata for a dedicated interceptor class
    pub fn interceptor_metadata(&self, class: &ClassId) -> Result<Arc<InterceptorMetadata>> {
        self.read(class, InterceptorRole::Interceptor)
    }

    /// Metadata for a target class that may self-intercept
    pub fn target_class_metadata(&self, class: &ClassId) -> Result<Arc<InterceptorMetadata>> {
        self.read(class, InterceptorRole::TargetClass)
    }

    fn read(&self, class: &ClassId, role: InterceptorRole) -> Result<Arc<InterceptorMetadata>> {
        let cache = match role {
            InterceptorRole::Interceptor => &self.interceptors,
            InterceptorRole::TargetClass => &self.target_classes,
        };
        if let Some(cached) = cache.get(class) {
            return Ok(cached.clone());
        }

        let descriptor = self
            .provider
            .class_metadata(class)
            .ok_or_else(|| Error::UnknownClass(class.clone()))?;
        let metadata = InterceptorMetadata::of(&descriptor, role);
        tracing::debug!(class = %class, role = ?role, "resolved interceptor metadata");
        cache.insert(class.clone(), metadata.clone());
        Ok(metadata)
    }
}
