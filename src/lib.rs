// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! # Coil - Interception Pipeline
//!
//! A synchronous interceptor framework: describe classes and their methods
//! as metadata, bind interceptors to target classes through models, and call
//! targets through proxies that run the bound chains with proceed semantics.
//! No code generation and no macros; classes are plain data and method
//! bodies are closures.
//!
//! ## Features
//!
//! - Class metadata: methods, constructors, superclass chains, overrides
//! - Interceptor metadata: per-category methods, superclass-first ordering
//! - Six interception categories: around-invoke, around-timeout, and the
//!   four lifecycle transitions
//! - Interception models: ordered per-category chains per target class
//! - Binding registry with cached model materialization
//! - Wrapping and subclassing proxies, layerable through composites
//! - Self-interception: target classes may declare their own interceptor
//!   methods, which run after all registry-bound chains
//! - Proceed semantics: an interceptor that does not proceed short-circuits
//!   the whole chain
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use coil::{
//!     BindingModelRegistry, CallArgs, CallValue, ClassMetadata, DefaultHandlerFactory,
//!     InterceptionCategory, InterceptorMetadata, InterceptorProxyCreator, InterceptorRole,
//!     InvocationContext, MethodSignature,
//! };
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let counter = ClassMetadata::builder("Counter")
//!         .default_constructor(|| 0u32)
//!         .business_method(
//!             MethodSignature::new("record"),
//!             |recv: &mut (dyn std::any::Any + Send), _args: &mut CallArgs| {
//!                 let n = recv.downcast_mut::<u32>().unwrap();
//!                 *n += 1;
//!                 Ok(CallValue::of(*n))
//!             },
//!         )
//!         .build();
//!
//!     let audit = ClassMetadata::builder("Audit")
//!         .default_constructor(|| ())
//!         .interceptor_method(
//!             MethodSignature::new("audit"),
//!             InterceptionCategory::AroundInvoke,
//!             |_recv: &mut (dyn std::any::Any + Send), inv: &mut dyn InvocationContext| {
//!                 println!("before {:?}", inv.method().map(|m| m.name().to_string()));
//!                 let outcome = inv.proceed()?;
//!                 println!("after");
//!                 Ok(outcome)
//!             },
//!         )
//!         .build();
//!
//!     let registry = BindingModelRegistry::builder()
//!         .bind(
//!             counter.id().clone(),
//!             InterceptorMetadata::of(&audit, InterceptorRole::Interceptor),
//!         )
//!         .build();
//!     let creator = InterceptorProxyCreator::single(
//!         Arc::new(registry),
//!         Arc::new(DefaultHandlerFactory::new()),
//!     );
//!
//!     let metadata = InterceptorMetadata::of(&counter, InterceptorRole::TargetClass);
//!     let proxy =
//!         creator.create_proxy_from_class(&counter, &[], CallArgs::new(), &metadata)?;
//!     let value = proxy.invoke("record", CallArgs::new())?;
//!     assert_eq!(value.downcast::<u32>()?, 1);
//!     Ok(())
//! }
//! ```

pub mod dispatch;
pub mod error;
pub mod metadata;
pub mod model;
pub mod proxy;

// Re-exports for convenience

// Errors
pub use error::{Error, Result};

// Metadata
pub use metadata::{
    ClassId, ClassMetadata, ClassMetadataBuilder, ConstructorMetadata, InterceptionCategory,
    InterceptorMetadata, InterceptorMetadataReader, InterceptorRole, Marker, MetadataProvider,
    MethodBody, MethodMetadata, MethodSignature, StaticMetadataProvider, TypeName,
};

// Models and registries
pub use model::{
    BindingModelRegistry, InterceptionModel, InterceptionModelRegistry, ModelDescription,
};

// Dispatch
pub use dispatch::{
    CallArgs, CallValue, CompositeDispatcher, DefaultHandlerFactory, DispatchContext,
    DispatchMode, Instance, InterceptionHandler, InterceptionHandlerFactory,
    InterceptorDispatcher, InvocationContext, MethodDispatcher, ProceedFn,
};

// Proxies
pub use proxy::{
    DescriptorProxyClassProvider, Instantiator, InterceptorProxyCreator, ProxyClass,
    ProxyClassProvider, ProxyMode, Surrogate,
};

/// Coil version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
