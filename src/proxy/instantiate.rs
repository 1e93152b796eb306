// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Instance creation for proxies and interceptors
//!
//! Prefers the no-arg constructor; falls back to the class's registered
//! raw allocator when no such constructor exists. Raw allocation skips
//! constructor bodies entirely, matching the needs of subclassing proxies
//! whose real construction already happened elsewhere.

use std::sync::Arc;

use crate::dispatch::{CallArgs, Instance};
use crate::error::{Error, Result};
use crate::metadata::ClassMetadata;

/// Strategy for producing fresh instances from class metadata
#[derive(Debug, Default)]
pub struct Instantiator;

impl Instantiator {
    pub fn new() -> Self {
        Self
    }

    /// Run the no-arg constructor, if the class declares one
    pub fn try_default_construct(&self, class: &Arc<ClassMetadata>) -> Option<Result<Instance>> {
        class
            .no_arg_constructor()
            .map(|ctor| ctor.invoke(CallArgs::new()))
    }

    /// Allocate without running any constructor body, if the class allows it
    pub fn try_raw_allocate(&self, class: &Arc<ClassMetadata>) -> Option<Instance> {
        class.raw_allocator().map(|alloc| alloc())
    }

    /// Produce an instance by the first applicable strategy
    pub fn instantiate(&self, class: &Arc<ClassMetadata>) -> Result<Instance> {
        if let Some(outcome) = self.try_default_construct(class) {
            return outcome.map_err(|cause| {
                Error::construction_caused(
                    class.id(),
                    "no-arg constructor failed",
                    cause,
                )
            });
        }
        if let Some(instance) = self.try_raw_allocate(class) {
            tracing::debug!(class = %class.id(), "raw-allocated instance");
            return Ok(instance);
        }
        Err(Error::construction(
            class.id(),
            "no no-arg constructor and no raw-allocation fallback available",
        ))
    }
}
