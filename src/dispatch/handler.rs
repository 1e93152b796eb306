// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Interceptor instance handlers
//!
//! A handler owns the instance of one interceptor class for the lifetime of
//! a dispatcher and runs chain links against it. Handlers come from
//! factories so callers can plug in dependency-injected instances; the
//! default factory simply instantiates the class through its metadata.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::dispatch::{CallValue, Instance, InvocationContext};
use crate::error::{Error, Result};
use crate::metadata::{ClassId, InterceptionCategory, InterceptorMetadata, MethodMetadata};
use crate::proxy::Instantiator;

/// Runs one interceptor method against a held interceptor instance
pub trait InterceptionHandler: Send + Sync {
    /// Invoke `method` on the handler's instance with the in-flight
    /// invocation
    fn invoke(&self, method: &Arc<MethodMetadata>, ctx: &mut dyn InvocationContext)
        -> Result<CallValue>;
}

/// Creates handlers for interceptor classes
pub trait InterceptionHandlerFactory: Send + Sync {
    /// Whether this factory handles interceptors of the given category
    fn supports(&self, category: InterceptionCategory) -> bool;

    /// Create a handler holding a fresh instance of the interceptor class
    fn create(&self, metadata: &Arc<InterceptorMetadata>) -> Result<Arc<dyn InterceptionHandler>>;
}

/// Factory that instantiates interceptor classes through their metadata
#[derive(Debug, Default)]
pub struct DefaultHandlerFactory {
    instantiator: Instantiator,
}

impl DefaultHandlerFactory {
    pub fn new() -> Self {
        Self::default()
    }
}

impl InterceptionHandlerFactory for DefaultHandlerFactory {
    fn supports(&self, _category: InterceptionCategory) -> bool {
        true
    }

    fn create(&self, metadata: &Arc<InterceptorMetadata>) -> Result<Arc<dyn InterceptionHandler>> {
        let class = metadata.interceptor_class();
        let instance = self.instantiator.instantiate(class)?;
        tracing::debug!(class = %class.id(), "instantiated interceptor");
        Ok(Arc::new(DefaultInterceptionHandler {
            class: class.id().clone(),
            instance: Mutex::new(Some(instance)),
        }))
    }
}

/// Handler backed by an owned interceptor instance
///
/// The instance is moved out of the slot for the duration of each call so a
/// proceed that re-enters another handler never contends on this lock.
pub struct DefaultInterceptionHandler {
    class: ClassId,
    instance: Mutex<Option<Instance>>,
}

impl DefaultInterceptionHandler {
    /// Wrap an externally constructed interceptor instance
    pub fn of(class: ClassId, instance: Instance) -> Self {
        DefaultInterceptionHandler {
            class,
            instance: Mutex::new(Some(instance)),
        }
    }
}

impl InterceptionHandler for DefaultInterceptionHandler {
    fn invoke(
        &self,
        method: &Arc<MethodMetadata>,
        ctx: &mut dyn InvocationContext,
    ) -> Result<CallValue> {
        let mut instance = self
            .instance
            .lock()
            .take()
            .ok_or_else(|| Error::InstanceUnavailable {
                class: self.class.clone(),
            })?;
        let outcome = method.invoke_interceptor(instance.as_mut(), ctx);
        *self.instance.lock() = Some(instance);
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::{CallArgs, Invocation};
    use crate::metadata::{ClassMetadata, InterceptorRole, MethodSignature};

    fn counting_interceptor() -> Arc<ClassMetadata> {
        ClassMetadata::builder("CountingInterceptor")
            .default_constructor(|| 0u32)
            .interceptor_method(
                MethodSignature::new("around"),
                InterceptionCategory::AroundInvoke,
                |recv: &mut (dyn std::any::Any + Send), inv: &mut dyn InvocationContext| {
                    *recv.downcast_mut::<u32>().unwrap() += 1;
                    inv.proceed()
                },
            )
            .build()
    }

    #[test]
    fn test_default_factory_creates_working_handler() {
        let class = counting_interceptor();
        let metadata = InterceptorMetadata::of(&class, InterceptorRole::Interceptor);
        let factory = DefaultHandlerFactory::new();
        let handler = factory.create(&metadata).unwrap();

        let method = class.find_method("around").unwrap();
        let mut args = CallArgs::new();
        let mut slot: Option<Instance> = None;
        let mut terminal = |_slot: &mut Option<Instance>, _args: &mut CallArgs| {
            Ok(CallValue::of("done"))
        };
        let mut invocation = Invocation::new(
            None,
            InterceptionCategory::AroundInvoke,
            &mut args,
            &[],
            &mut slot,
            &mut terminal,
        );
        let result = handler.invoke(&method, &mut invocation).unwrap();
        assert_eq!(result.downcast_ref::<&str>(), Some(&"done"));
    }

    #[test]
    fn test_factory_supports_all_categories() {
        let factory = DefaultHandlerFactory::new();
        for category in InterceptionCategory::ALL {
            assert!(factory.supports(category));
        }
    }
}
