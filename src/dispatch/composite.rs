// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Layered dispatch
//!
//! A composite stitches several dispatchers into one: the first layer's
//! terminal proceeds into the second layer, and so on, with the innermost
//! proceed invoking the target held in the dispatch context.

use std::sync::Arc;

use crate::dispatch::{CallValue, DispatchContext, MethodDispatcher, ProceedFn};
use crate::error::Result;

/// Dispatcher that chains an ordered stack of dispatchers
pub struct CompositeDispatcher {
    layers: Vec<Arc<dyn MethodDispatcher>>,
}

impl CompositeDispatcher {
    pub fn new(layers: Vec<Arc<dyn MethodDispatcher>>) -> Self {
        CompositeDispatcher { layers }
    }

    /// Wrap a single dispatcher
    pub fn single(layer: Arc<dyn MethodDispatcher>) -> Self {
        CompositeDispatcher {
            layers: vec![layer],
        }
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }
}

fn dispatch_layers(
    layers: &[Arc<dyn MethodDispatcher>],
    ctx: &mut DispatchContext,
    proceed: ProceedFn<'_>,
) -> Result<CallValue> {
    match layers.split_first() {
        Some((head, rest)) => {
            let mut next =
                |inner: &mut DispatchContext| dispatch_layers(rest, inner, &mut *proceed);
            head.dispatch(ctx, &mut next)
        }
        None => proceed(ctx),
    }
}

impl MethodDispatcher for CompositeDispatcher {
    fn dispatch(&self, ctx: &mut DispatchContext, proceed: ProceedFn<'_>) -> Result<CallValue> {
        dispatch_layers(&self.layers, ctx, proceed)
    }
}
