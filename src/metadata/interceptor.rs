// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Interceptor metadata
//!
//! Per-class record of which methods participate in which interception
//! categories, with inheritance and override semantics resolved at
//! construction. Immutable afterwards; shared freely between proxies.

use std::collections::HashMap;
use std::sync::Arc;

use crate::metadata::{ClassMetadata, InterceptionCategory, MethodMetadata};

/// Role a class plays when its interceptor metadata is read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InterceptorRole {
    /// A dedicated interceptor class bound to targets through a registry
    Interceptor,
    /// A target class whose own methods self-intercept its invocations
    TargetClass,
}

/// Which methods on a class act as interceptors, per category
///
/// Ordering is significant: superclass-declared methods come before
/// subclass-declared ones, so inherited interception logic runs first, and
/// an overridden method is represented only by its most-derived version.
#[derive(Debug)]
pub struct InterceptorMetadata {
    class: Arc<ClassMetadata>,
    is_interceptor: bool,
    is_target_class: bool,
    methods: HashMap<InterceptionCategory, Vec<Arc<MethodMetadata>>>,
}

impl InterceptorMetadata {
    /// Resolve interceptor metadata for a class in the given role
    pub fn of(class: &Arc<ClassMetadata>, role: InterceptorRole) -> Arc<Self> {
        Arc::new(InterceptorMetadata {
            class: class.clone(),
            is_interceptor: role == InterceptorRole::Interceptor,
            is_target_class: role == InterceptorRole::TargetClass,
            methods: resolve_interceptor_methods(class),
        })
    }

    /// The class these methods belong to
    pub fn interceptor_class(&self) -> &Arc<ClassMetadata> {
        &self.class
    }

    /// Ordered interceptor methods for a category; empty when the class
    /// declares none (never a failure)
    pub fn interceptor_methods(&self, category: InterceptionCategory) -> &[Arc<MethodMetadata>] {
        self.methods
            .get(&category)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Whether this class is usable as a dedicated interceptor
    pub fn is_interceptor(&self) -> bool {
        self.is_interceptor
    }

    /// Whether this is a target class carrying its own interception methods
    pub fn is_target_class(&self) -> bool {
        self.is_target_class
    }

    /// Categories for which this class declares at least one method
    pub fn categories(&self) -> impl Iterator<Item = InterceptionCategory> + '_ {
        InterceptionCategory::ALL
            .into_iter()
            .filter(|c| !self.interceptor_methods(*c).is_empty())
    }
}

/// Walk the hierarchy root-first, collecting category-marked methods.
///
/// An overriding subclass method replaces the superclass entry and moves to
/// the subclass position; unoverridden superclass methods keep their
/// outer-to-inner ordering ahead of subclass additions.
fn resolve_interceptor_methods(
    class: &Arc<ClassMetadata>,
) -> HashMap<InterceptionCategory, Vec<Arc<MethodMetadata>>> {
    let mut lineage = Vec::new();
    let mut current = Some(class);
    while let Some(c) = current {
        lineage.push(c.clone());
        current = c.superclass();
    }
    lineage.reverse();

    let mut resolved: HashMap<InterceptionCategory, Vec<Arc<MethodMetadata>>> = HashMap::new();
    for level in &lineage {
        for method in level.declared_methods() {
            for category in method.categories() {
                let chain = resolved.entry(category).or_default();
                if let Some(pos) = chain.iter().position(|m| method.overrides(m)) {
                    chain.remove(pos);
                }
                chain.push(method.clone());
            }
        }
    }
    resolved
}
