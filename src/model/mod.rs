// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Interception models and their registries

mod model;
mod registry;

pub use model::{InterceptionModel, InterceptionModelBuilder, ModelDescription};
pub use registry::{BindingModelRegistry, BindingModelRegistryBuilder, InterceptionModelRegistry};
