// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Interceptor-aware method dispatch
//!
//! [`InterceptorDispatcher`] flattens the interception models bound to a
//! target class into one chain per category and drives it with proceed
//! semantics. It runs in one of two modes: wrapping an existing target
//! instance it owns, or subclassing, where the terminal step delegates to
//! an outer proceed so dispatchers can be layered. Self-interception links
//! run with the target left in the invocation slot; their bodies reach it
//! through [`InvocationContext::target_mut`].

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::dispatch::{
    CallArgs, CallValue, ChainLink, Instance, InterceptionHandler, InterceptionHandlerFactory,
    Invocation, InvocationContext,
};
use crate::error::{Error, Result};
use crate::metadata::{ClassMetadata, InterceptionCategory, InterceptorMetadata, MethodMetadata};
use crate::model::InterceptionModel;

/// Outer continuation a dispatcher may delegate to when its own chain is
/// exhausted
pub type ProceedFn<'a> = &'a mut dyn FnMut(&mut DispatchContext) -> Result<CallValue>;

/// Mutable state of one dispatched call
///
/// Owns its arguments and (in subclassing mode) the target instance so it
/// can be rebuilt as the call descends through layered dispatchers.
pub struct DispatchContext {
    method: Option<Arc<MethodMetadata>>,
    category: InterceptionCategory,
    args: CallArgs,
    instance: Option<Instance>,
}

impl DispatchContext {
    /// Context for a business method call
    pub fn business(method: Arc<MethodMetadata>, args: CallArgs) -> Self {
        DispatchContext {
            method: Some(method),
            category: InterceptionCategory::AroundInvoke,
            args,
            instance: None,
        }
    }

    /// Context for a timer callback routed through the around-timeout chain
    pub fn timeout(method: Arc<MethodMetadata>, args: CallArgs) -> Self {
        DispatchContext {
            method: Some(method),
            category: InterceptionCategory::AroundTimeout,
            args,
            instance: None,
        }
    }

    /// Context for a lifecycle event with no associated method
    pub fn lifecycle(category: InterceptionCategory) -> Self {
        DispatchContext {
            method: None,
            category,
            args: CallArgs::new(),
            instance: None,
        }
    }

    /// Attach the target instance, builder-style (subclassing mode)
    pub fn with_instance(mut self, instance: Instance) -> Self {
        self.instance = Some(instance);
        self
    }

    pub fn method(&self) -> Option<&Arc<MethodMetadata>> {
        self.method.as_ref()
    }

    pub fn category(&self) -> InterceptionCategory {
        self.category
    }

    pub fn args(&self) -> &CallArgs {
        &self.args
    }

    pub fn args_mut(&mut self) -> &mut CallArgs {
        &mut self.args
    }

    /// Take back the instance after dispatch completes
    pub fn take_instance(&mut self) -> Option<Instance> {
        self.instance.take()
    }

    /// Run the target method directly on the held instance, bypassing any
    /// interception
    pub fn invoke_target(&mut self) -> Result<CallValue> {
        match &self.method {
            Some(method) => {
                let instance =
                    self.instance
                        .as_mut()
                        .ok_or_else(|| Error::InstanceUnavailable {
                            class: method.declaring_class().clone(),
                        })?;
                method.invoke_business(instance.as_mut(), &mut self.args)
            }
            None => Ok(CallValue::unit()),
        }
    }
}

/// Dispatches one layer of interception for a proxied call
pub trait MethodDispatcher: Send + Sync {
    /// Run this layer's chain around `proceed`
    fn dispatch(&self, ctx: &mut DispatchContext, proceed: ProceedFn<'_>) -> Result<CallValue>;
}

/// How the dispatcher reaches the real target
pub enum DispatchMode {
    /// The dispatcher owns the target instance; its terminal invokes the
    /// target directly and never calls the outer proceed
    Wrap { target: Arc<Mutex<Option<Instance>>> },
    /// The target lives in the dispatch context; the terminal delegates to
    /// the outer proceed so layers compose
    Subclass,
}

impl DispatchMode {
    /// Wrap mode around a concrete instance
    pub fn wrap(instance: Instance) -> Self {
        DispatchMode::Wrap {
            target: Arc::new(Mutex::new(Some(instance))),
        }
    }
}

/// Chain-building dispatcher for one target class
pub struct InterceptorDispatcher {
    mode: DispatchMode,
    target_class: Arc<ClassMetadata>,
    models: Vec<Arc<InterceptionModel>>,
    handlers: HashMap<(usize, usize, InterceptionCategory), Arc<dyn InterceptionHandler>>,
    self_metadata: Arc<InterceptorMetadata>,
}

impl InterceptorDispatcher {
    /// Build a dispatcher, eagerly creating one handler per interceptor
    /// occurrence in each model. `self_metadata` describes the target class
    /// in its role as its own interceptor.
    pub fn new(
        mode: DispatchMode,
        target_class: Arc<ClassMetadata>,
        models: Vec<Arc<InterceptionModel>>,
        factories: &[Arc<dyn InterceptionHandlerFactory>],
        self_metadata: Arc<InterceptorMetadata>,
    ) -> Result<Self> {
        let mut handlers: HashMap<(usize, usize, InterceptionCategory), Arc<dyn InterceptionHandler>> =
            HashMap::new();
        for (model_index, model) in models.iter().enumerate() {
            for category in InterceptionCategory::ALL {
                for (occurrence, interceptor) in model.interceptors(category).iter().enumerate() {
                    let factory = factories
                        .iter()
                        .find(|f| f.supports(category))
                        .ok_or_else(|| {
                            Error::construction(
                                target_class.id(),
                                format!("no handler factory supports category {category}"),
                            )
                        })?;
                    let handler = factory.create(interceptor).map_err(|cause| {
                        Error::construction_caused(
                            target_class.id(),
                            format!(
                                "failed to create handler for interceptor {}",
                                interceptor.interceptor_class().id()
                            ),
                            cause,
                        )
                    })?;
                    handlers.insert((model_index, occurrence, category), handler);
                }
            }
        }
        tracing::debug!(
            class = %target_class.id(),
            models = models.len(),
            handlers = handlers.len(),
            "built interceptor dispatcher"
        );
        Ok(InterceptorDispatcher {
            mode,
            target_class,
            models,
            handlers,
            self_metadata,
        })
    }

    /// Flatten all models into the chain for one category, registry order
    /// first, self-interception methods last
    fn resolve_chain(&self, category: InterceptionCategory) -> Vec<ChainLink> {
        let mut chain = Vec::new();
        for (model_index, model) in self.models.iter().enumerate() {
            for (occurrence, interceptor) in model.interceptors(category).iter().enumerate() {
                let handler = &self.handlers[&(model_index, occurrence, category)];
                for method in interceptor.interceptor_methods(category) {
                    chain.push(ChainLink::handler(method.clone(), handler.clone()));
                }
            }
        }
        if self.self_metadata.is_target_class() {
            for method in self.self_metadata.interceptor_methods(category) {
                chain.push(ChainLink::target_self(method.clone()));
            }
        }
        chain
    }
}

impl MethodDispatcher for InterceptorDispatcher {
    fn dispatch(&self, ctx: &mut DispatchContext, proceed: ProceedFn<'_>) -> Result<CallValue> {
        let category = ctx.category;
        let chain = self.resolve_chain(category);
        let method = ctx.method.clone();
        tracing::trace!(
            class = %self.target_class.id(),
            category = %category,
            links = chain.len(),
            "dispatching"
        );

        match &self.mode {
            DispatchMode::Wrap { target } => {
                // The wrapped instance is the chain's slot for the duration
                // of the call, so self-interception and the terminal see the
                // same object. The outer proceed ends here.
                let mut slot = target.lock().take();
                let terminal_method = method.clone();
                let mut terminal =
                    move |slot: &mut Option<Instance>, args: &mut CallArgs| match &terminal_method {
                        Some(m) => {
                            let instance =
                                slot.as_mut().ok_or_else(|| Error::InstanceUnavailable {
                                    class: m.declaring_class().clone(),
                                })?;
                            m.invoke_business(instance.as_mut(), args)
                        }
                        None => Ok(CallValue::unit()),
                    };
                let mut invocation = Invocation::new(
                    method.as_ref(),
                    category,
                    &mut ctx.args,
                    &chain,
                    &mut slot,
                    &mut terminal,
                );
                let outcome = invocation.proceed();
                *target.lock() = slot;
                outcome
            }
            DispatchMode::Subclass => {
                // The terminal hands control back to the outer proceed,
                // rebuilding a context from the slot and arguments so the
                // next layer sees the same call.
                let terminal_method = method.clone();
                let mut terminal = |slot: &mut Option<Instance>, args: &mut CallArgs| {
                    let mut inner = DispatchContext {
                        method: terminal_method.clone(),
                        category,
                        args: std::mem::take(args),
                        instance: slot.take(),
                    };
                    let outcome = proceed(&mut inner);
                    *args = inner.args;
                    *slot = inner.instance;
                    outcome
                };
                let mut slot = ctx.instance.take();
                let mut invocation = Invocation::new(
                    method.as_ref(),
                    category,
                    &mut ctx.args,
                    &chain,
                    &mut slot,
                    &mut terminal,
                );
                let outcome = invocation.proceed();
                ctx.instance = slot;
                outcome
            }
        }
    }
}
