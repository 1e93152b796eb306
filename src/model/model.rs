// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Interception model: which interceptors apply to a target class, per
//! category

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use serde::Serialize;

use crate::metadata::{ClassId, InterceptionCategory, InterceptorMetadata};

/// Ordered interceptor bindings for one target class
///
/// Chains are kept per category; order within a chain is binding order and
/// determines wrapping order at dispatch time.
#[derive(Debug)]
pub struct InterceptionModel {
    target: ClassId,
    chains: HashMap<InterceptionCategory, Vec<Arc<InterceptorMetadata>>>,
}

impl InterceptionModel {
    /// Start building a model for `target`
    pub fn builder(target: ClassId) -> InterceptionModelBuilder {
        InterceptionModelBuilder {
            target,
            chains: HashMap::new(),
        }
    }

    /// A model with no interceptors bound
    pub fn empty(target: ClassId) -> Self {
        InterceptionModel {
            target,
            chains: HashMap::new(),
        }
    }

    /// Class this model targets
    pub fn target(&self) -> &ClassId {
        &self.target
    }

    /// Interceptors bound for a category, in binding order
    pub fn interceptors(&self, category: InterceptionCategory) -> &[Arc<InterceptorMetadata>] {
        self.chains
            .get(&category)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Whether any category has a non-empty chain
    pub fn is_empty(&self) -> bool {
        self.chains.values().all(Vec::is_empty)
    }

    /// Serializable snapshot of the model, for diagnostics
    pub fn describe(&self) -> ModelDescription {
        let chains = self
            .chains
            .iter()
            .filter(|(_, chain)| !chain.is_empty())
            .map(|(category, chain)| {
                (
                    category.to_string(),
                    chain
                        .iter()
                        .map(|im| im.interceptor_class().id().to_string())
                        .collect(),
                )
            })
            .collect();
        ModelDescription {
            target: self.target.to_string(),
            chains,
        }
    }
}

/// Plain-data view of a model, suitable for serialization
#[derive(Debug, Serialize)]
pub struct ModelDescription {
    pub target: String,
    pub chains: BTreeMap<String, Vec<String>>,
}

/// Builder that accumulates interceptor bindings in order
pub struct InterceptionModelBuilder {
    target: ClassId,
    chains: HashMap<InterceptionCategory, Vec<Arc<InterceptorMetadata>>>,
}

impl InterceptionModelBuilder {
    /// Bind an interceptor to one category
    pub fn intercept(
        mut self,
        category: InterceptionCategory,
        interceptor: Arc<InterceptorMetadata>,
    ) -> Self {
        self.chains.entry(category).or_default().push(interceptor);
        self
    }

    /// Bind an interceptor to every category it declares methods for
    pub fn apply(mut self, interceptor: Arc<InterceptorMetadata>) -> Self {
        for category in interceptor.categories() {
            self.chains
                .entry(category)
                .or_default()
                .push(interceptor.clone());
        }
        self
    }

    pub fn build(self) -> InterceptionModel {
        InterceptionModel {
            target: self.target,
            chains: self.chains,
        }
    }
}
