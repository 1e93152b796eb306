// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Metadata model
//!
//! Immutable class/method descriptors, per-class interceptor metadata with
//! override resolution, and the provider/reader pair that feeds them in.

mod class;
mod interceptor;
mod provider;
mod reader;

pub use class::{
    ClassId, ClassMetadata, ClassMetadataBuilder, ConstructFn, ConstructorMetadata,
    InterceptionCategory, Marker, MethodBody, MethodMetadata, MethodSignature, RawAllocateFn,
    TypeName,
};
pub use interceptor::{InterceptorMetadata, InterceptorRole};
pub use provider::{MetadataProvider, StaticMetadataProvider};
pub use reader::InterceptorMetadataReader;
