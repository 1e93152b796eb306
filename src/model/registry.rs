// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Model registries
//!
//! A registry answers "which interception model applies to this class".
//! Lookups must always succeed; a class nobody bound interceptors to gets
//! a shared empty model.

use std::collections::HashMap;
use std::sync::Arc;

use dashmap::DashMap;

use crate::metadata::{ClassId, InterceptorMetadata};
use crate::model::InterceptionModel;

/// Source of interception models, consulted per target class
pub trait InterceptionModelRegistry: Send + Sync {
    /// Model for `target`; never fails, may be empty
    fn interception_model(&self, target: &ClassId) -> Arc<InterceptionModel>;
}

/// Registry built from explicit interceptor-to-class bindings
///
/// Models are materialized lazily and cached, including the empty model for
/// unbound classes, so repeated lookups are allocation-free.
pub struct BindingModelRegistry {
    bindings: HashMap<ClassId, Vec<Arc<InterceptorMetadata>>>,
    cache: DashMap<ClassId, Arc<InterceptionModel>>,
}

impl BindingModelRegistry {
    /// Start building a registry
    pub fn builder() -> BindingModelRegistryBuilder {
        BindingModelRegistryBuilder {
            bindings: HashMap::new(),
        }
    }

    /// Number of classes with explicit bindings
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

impl InterceptionModelRegistry for BindingModelRegistry {
    fn interception_model(&self, target: &ClassId) -> Arc<InterceptionModel> {
        if let Some(model) = self.cache.get(target) {
            return model.clone();
        }
        let model = match self.bindings.get(target) {
            Some(interceptors) => {
                let mut builder = InterceptionModel::builder(target.clone());
                for interceptor in interceptors {
                    builder = builder.apply(interceptor.clone());
                }
                Arc::new(builder.build())
            }
            None => Arc::new(InterceptionModel::empty(target.clone())),
        };
        tracing::debug!(
            class = %target,
            bound = !model.is_empty(),
            "materialized interception model"
        );
        self.cache.insert(target.clone(), model.clone());
        model
    }
}

/// Builder accumulating bindings in declaration order
pub struct BindingModelRegistryBuilder {
    bindings: HashMap<ClassId, Vec<Arc<InterceptorMetadata>>>,
}

impl BindingModelRegistryBuilder {
    /// Bind `interceptor` to `target` for every category the interceptor
    /// declares
    pub fn bind(mut self, target: ClassId, interceptor: Arc<InterceptorMetadata>) -> Self {
        self.bindings.entry(target).or_default().push(interceptor);
        self
    }

    pub fn build(self) -> BindingModelRegistry {
        BindingModelRegistry {
            bindings: self.bindings,
            cache: DashMap::new(),
        }
    }
}
