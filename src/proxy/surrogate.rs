// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Proxy surrogate
//!
//! A [`Surrogate`] is the object handed to callers in place of the target.
//! Calls go through the installed dispatcher; a surrogate without one
//! delegates straight to the target method, which lets creation code
//! instantiate first and wire interception afterwards.

use std::fmt;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

use crate::dispatch::{CallArgs, CallValue, DispatchContext, Instance, MethodDispatcher};
use crate::error::{Error, Result};
use crate::metadata::InterceptionCategory;
use crate::proxy::{ProxyClass, ProxyMode};

/// Stand-in for a proxied instance
pub struct Surrogate {
    class: Arc<ProxyClass>,
    state: Arc<Mutex<Option<Instance>>>,
    dispatcher: RwLock<Option<Arc<dyn MethodDispatcher>>>,
}

impl Surrogate {
    /// Create a surrogate over an instance slot, with no dispatcher yet
    pub(crate) fn new(class: Arc<ProxyClass>, state: Arc<Mutex<Option<Instance>>>) -> Self {
        Surrogate {
            class,
            state,
            dispatcher: RwLock::new(None),
        }
    }

    /// Descriptor of the proxy class this surrogate instantiates
    pub fn proxy_class(&self) -> &Arc<ProxyClass> {
        &self.class
    }

    /// Install the dispatcher that future calls route through
    pub fn install_dispatcher(&self, dispatcher: Arc<dyn MethodDispatcher>) {
        *self.dispatcher.write() = Some(dispatcher);
    }

    /// Currently installed dispatcher, if any
    pub fn dispatcher(&self) -> Option<Arc<dyn MethodDispatcher>> {
        self.dispatcher.read().clone()
    }

    /// Invoke a business method through the interception pipeline
    pub fn invoke(&self, method_name: &str, args: CallArgs) -> Result<CallValue> {
        let target_class = self.class.target_class();
        let method = target_class
            .find_method(method_name)
            .ok_or_else(|| Error::UnknownMethod {
                class: target_class.id().clone(),
                method: method_name.to_string(),
            })?;
        self.dispatch(DispatchContext::business(method, args))
    }

    /// Invoke a business method through the around-timeout chain, as a timer
    /// callback would
    pub fn invoke_timeout(&self, method_name: &str, args: CallArgs) -> Result<CallValue> {
        let target_class = self.class.target_class();
        let method = target_class
            .find_method(method_name)
            .ok_or_else(|| Error::UnknownMethod {
                class: target_class.id().clone(),
                method: method_name.to_string(),
            })?;
        self.dispatch(DispatchContext::timeout(method, args))
    }

    /// Run the post-construct chain
    pub fn post_construct(&self) -> Result<CallValue> {
        self.dispatch(DispatchContext::lifecycle(InterceptionCategory::PostConstruct))
    }

    /// Run the pre-destroy chain
    pub fn pre_destroy(&self) -> Result<CallValue> {
        self.dispatch(DispatchContext::lifecycle(InterceptionCategory::PreDestroy))
    }

    /// Run the post-activate chain
    pub fn post_activate(&self) -> Result<CallValue> {
        self.dispatch(DispatchContext::lifecycle(InterceptionCategory::PostActivate))
    }

    /// Run the pre-passivate chain
    pub fn pre_passivate(&self) -> Result<CallValue> {
        self.dispatch(DispatchContext::lifecycle(InterceptionCategory::PrePassivate))
    }

    fn dispatch(&self, mut ctx: DispatchContext) -> Result<CallValue> {
        let dispatcher = self.dispatcher();
        match (dispatcher, self.class.mode()) {
            (Some(dispatcher), ProxyMode::Wrap) => {
                // The wrapping dispatcher owns the same instance slot; its
                // terminal ends the call, so the outer proceed is inert.
                let mut outer = |inner: &mut DispatchContext| inner.invoke_target();
                dispatcher.dispatch(&mut ctx, &mut outer)
            }
            (Some(dispatcher), ProxyMode::Subclass) => {
                let instance = self.state.lock().take().ok_or_else(|| {
                    Error::InstanceUnavailable {
                        class: self.class.target_class().id().clone(),
                    }
                })?;
                ctx = ctx.with_instance(instance);
                let mut outer = |inner: &mut DispatchContext| inner.invoke_target();
                let outcome = dispatcher.dispatch(&mut ctx, &mut outer);
                *self.state.lock() = ctx.take_instance();
                outcome
            }
            (None, _) => {
                // No dispatcher installed yet: a plain direct call.
                let instance = self.state.lock().take().ok_or_else(|| {
                    Error::InstanceUnavailable {
                        class: self.class.target_class().id().clone(),
                    }
                })?;
                ctx = ctx.with_instance(instance);
                let outcome = ctx.invoke_target();
                *self.state.lock() = ctx.take_instance();
                outcome
            }
        }
    }

    /// Inspect the underlying instance while no call is in flight
    pub fn with_instance<T, R>(&self, f: impl FnOnce(&T) -> R) -> Result<R>
    where
        T: std::any::Any + Send,
    {
        let guard = self.state.lock();
        let instance = guard.as_ref().ok_or_else(|| Error::InstanceUnavailable {
            class: self.class.target_class().id().clone(),
        })?;
        let typed = instance
            .downcast_ref::<T>()
            .ok_or_else(|| Error::ValueType {
                expected: std::any::type_name::<T>(),
            })?;
        Ok(f(typed))
    }
}

impl fmt::Debug for Surrogate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Surrogate")
            .field("class", &self.class)
            .field("dispatched", &self.dispatcher.read().is_some())
            .finish()
    }
}
