// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Invocation chain with proceed semantics
//!
//! A resolved chain is an ordered list of interceptor links plus a terminal
//! step. Each link receives the in-flight [`Invocation`] through the
//! [`InvocationContext`] trait and decides whether to proceed; the terminal
//! runs the real target method. The target instance stays in the chain's
//! slot for the whole call; self-interception links borrow it through
//! [`InvocationContext::target_mut`] between proceeds, so the terminal can
//! always reach it.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::dispatch::InterceptionHandler;
use crate::error::{Error, Result};
use crate::metadata::{InterceptionCategory, MethodMetadata};

/// Opaque target or interceptor instance
pub type Instance = Box<dyn Any + Send>;

/// Business method body: receives the target instance and call arguments
pub type BusinessFn =
    dyn Fn(&mut (dyn Any + Send), &mut CallArgs) -> Result<CallValue> + Send + Sync;

/// Interceptor method body: receives the interceptor instance and the
/// in-flight invocation
pub type InterceptorFn =
    dyn Fn(&mut (dyn Any + Send), &mut dyn InvocationContext) -> Result<CallValue> + Send + Sync;

/// Dynamic argument list for an intercepted call
#[derive(Default)]
pub struct CallArgs {
    values: Vec<Box<dyn Any + Send>>,
}

impl CallArgs {
    /// Create an empty argument list
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an argument, builder-style
    pub fn with<T: Any + Send>(mut self, value: T) -> Self {
        self.push(value);
        self
    }

    /// Append an argument
    pub fn push<T: Any + Send>(&mut self, value: T) {
        self.values.push(Box::new(value));
    }

    /// Borrow an argument by position and type
    pub fn get<T: Any + Send>(&self, index: usize) -> Result<&T> {
        self.values
            .get(index)
            .and_then(|v| v.downcast_ref::<T>())
            .ok_or(Error::ArgumentType {
                index,
                expected: std::any::type_name::<T>(),
            })
    }

    /// Mutably borrow an argument by position and type
    pub fn get_mut<T: Any + Send>(&mut self, index: usize) -> Result<&mut T> {
        self.values
            .get_mut(index)
            .and_then(|v| v.downcast_mut::<T>())
            .ok_or(Error::ArgumentType {
                index,
                expected: std::any::type_name::<T>(),
            })
    }

    /// Number of arguments
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the list is empty
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl fmt::Debug for CallArgs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CallArgs(len={})", self.values.len())
    }
}

/// Dynamic return value of an intercepted call
pub struct CallValue(Option<Box<dyn Any + Send>>);

impl CallValue {
    /// A unit (void) result
    pub fn unit() -> Self {
        CallValue(None)
    }

    /// Wrap a concrete value
    pub fn of<T: Any + Send>(value: T) -> Self {
        CallValue(Some(Box::new(value)))
    }

    /// Whether this is a unit result
    pub fn is_unit(&self) -> bool {
        self.0.is_none()
    }

    /// Extract the value by type
    pub fn downcast<T: Any + Send>(self) -> Result<T> {
        self.0
            .ok_or(Error::ValueType {
                expected: std::any::type_name::<T>(),
            })
            .and_then(|v| {
                v.downcast::<T>().map(|b| *b).map_err(|_| Error::ValueType {
                    expected: std::any::type_name::<T>(),
                })
            })
    }

    /// Borrow the value by type
    pub fn downcast_ref<T: Any + Send>(&self) -> Option<&T> {
        self.0.as_ref().and_then(|v| v.downcast_ref::<T>())
    }
}

impl fmt::Debug for CallValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_unit() {
            f.write_str("CallValue::unit")
        } else {
            f.write_str("CallValue(..)")
        }
    }
}

/// View of an in-flight invocation handed to every interceptor method
pub trait InvocationContext {
    /// Run the next chain element; the last proceed runs the real target
    /// method. Not calling this short-circuits the chain.
    fn proceed(&mut self) -> Result<CallValue>;

    /// Metadata of the invoked business method, absent for lifecycle
    /// dispatch
    fn method(&self) -> Option<&MethodMetadata>;

    /// Category this chain was resolved for
    fn category(&self) -> InterceptionCategory;

    /// Call arguments
    fn args(&self) -> &CallArgs;

    /// Mutable call arguments (an interceptor may rewrite them before
    /// proceeding)
    fn args_mut(&mut self) -> &mut CallArgs;

    /// Mutably borrow the in-flight target instance, when one is reachable
    ///
    /// Self-interception methods use this to read or mutate the target; the
    /// borrow must end before `proceed` is called. Absent for handler-owned
    /// interceptors dispatched without a target slot.
    fn target_mut(&mut self) -> Option<&mut (dyn Any + Send)> {
        None
    }
}

/// One element of a resolved chain
#[derive(Clone)]
pub(crate) struct ChainLink {
    method: Arc<MethodMetadata>,
    kind: LinkKind,
}

#[derive(Clone)]
enum LinkKind {
    /// Method on a dedicated interceptor instance owned by a handler
    Handler(Arc<dyn InterceptionHandler>),
    /// Self-interception method running against the target instance itself
    TargetSelf,
}

impl ChainLink {
    pub(crate) fn handler(method: Arc<MethodMetadata>, handler: Arc<dyn InterceptionHandler>) -> Self {
        ChainLink {
            method,
            kind: LinkKind::Handler(handler),
        }
    }

    pub(crate) fn target_self(method: Arc<MethodMetadata>) -> Self {
        ChainLink {
            method,
            kind: LinkKind::TargetSelf,
        }
    }
}

/// Terminal step invoked when the chain cursor runs past the last link
pub(crate) type TerminalFn<'a> =
    dyn FnMut(&mut Option<Instance>, &mut CallArgs) -> Result<CallValue> + 'a;

/// Explicit chain cursor
///
/// Holds the flattened link sequence, the position of the next link, the
/// target instance slot, and the terminal step. Created fresh per dispatched
/// call; all shared metadata it references is immutable.
pub struct Invocation<'a> {
    method: Option<&'a Arc<MethodMetadata>>,
    category: InterceptionCategory,
    args: &'a mut CallArgs,
    chain: &'a [ChainLink],
    cursor: usize,
    slot: &'a mut Option<Instance>,
    terminal: &'a mut TerminalFn<'a>,
}

impl<'a> Invocation<'a> {
    pub(crate) fn new(
        method: Option<&'a Arc<MethodMetadata>>,
        category: InterceptionCategory,
        args: &'a mut CallArgs,
        chain: &'a [ChainLink],
        slot: &'a mut Option<Instance>,
        terminal: &'a mut TerminalFn<'a>,
    ) -> Self {
        Invocation {
            method,
            category,
            args,
            chain,
            cursor: 0,
            slot,
            terminal,
        }
    }

    fn invoke_link(&mut self, link: ChainLink) -> Result<CallValue> {
        match link.kind {
            LinkKind::Handler(handler) => handler.invoke(&link.method, self),
            LinkKind::TargetSelf => {
                if self.slot.is_none() {
                    return Err(Error::InstanceUnavailable {
                        class: link.method.declaring_class().clone(),
                    });
                }
                // The target stays in the slot so the terminal can reach it
                // when this link proceeds; the body borrows it through
                // `target_mut`. The receiver is an inert placeholder.
                let mut receiver = ();
                link.method.invoke_interceptor(&mut receiver, self)
            }
        }
    }
}

impl InvocationContext for Invocation<'_> {
    fn proceed(&mut self) -> Result<CallValue> {
        if self.cursor < self.chain.len() {
            let link = self.chain[self.cursor].clone();
            self.cursor += 1;
            self.invoke_link(link)
        } else {
            (self.terminal)(&mut *self.slot, &mut *self.args)
        }
    }

    fn method(&self) -> Option<&MethodMetadata> {
        self.method.map(|m| m.as_ref())
    }

    fn category(&self) -> InterceptionCategory {
        self.category
    }

    fn args(&self) -> &CallArgs {
        self.args
    }

    fn args_mut(&mut self) -> &mut CallArgs {
        self.args
    }

    fn target_mut(&mut self) -> Option<&mut (dyn Any + Send)> {
        self.slot.as_mut().map(|instance| instance.as_mut())
    }
}
