// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Proxy class descriptors

use std::sync::Arc;

use crate::metadata::ClassMetadata;

/// How a proxy relates to its target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProxyMode {
    /// The proxy wraps a pre-built target instance it delegates to
    Wrap,
    /// The proxy stands in for the target class itself and constructs the
    /// instance it fronts
    Subclass,
}

/// Descriptor of a generated proxy class
#[derive(Debug)]
pub struct ProxyClass {
    target_class: Arc<ClassMetadata>,
    mode: ProxyMode,
}

impl ProxyClass {
    pub fn new(target_class: Arc<ClassMetadata>, mode: ProxyMode) -> Self {
        ProxyClass { target_class, mode }
    }

    pub fn target_class(&self) -> &Arc<ClassMetadata> {
        &self.target_class
    }

    pub fn mode(&self) -> ProxyMode {
        self.mode
    }
}

/// Source of proxy class descriptors
///
/// Implementations may cache or specialize descriptors per target; the
/// default just pairs the target metadata with the requested mode.
pub trait ProxyClassProvider: Send + Sync {
    fn proxy_class(&self, target_class: &Arc<ClassMetadata>, mode: ProxyMode) -> Arc<ProxyClass>;
}

/// Provider that derives the descriptor directly from target metadata
#[derive(Debug, Default)]
pub struct DescriptorProxyClassProvider;

impl DescriptorProxyClassProvider {
    pub fn new() -> Self {
        Self
    }
}

impl ProxyClassProvider for DescriptorProxyClassProvider {
    fn proxy_class(&self, target_class: &Arc<ClassMetadata>, mode: ProxyMode) -> Arc<ProxyClass> {
        Arc::new(ProxyClass::new(target_class.clone(), mode))
    }
}
