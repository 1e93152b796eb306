// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Dispatch engine: invocation chains, handlers, and dispatchers

mod composite;
mod dispatcher;
mod handler;
mod invocation;

pub use composite::CompositeDispatcher;
pub use dispatcher::{DispatchContext, DispatchMode, InterceptorDispatcher, MethodDispatcher, ProceedFn};
pub use handler::{
    DefaultHandlerFactory, DefaultInterceptionHandler, InterceptionHandler,
    InterceptionHandlerFactory,
};
pub use invocation::{
    BusinessFn, CallArgs, CallValue, Instance, InterceptorFn, Invocation, InvocationContext,
};

pub(crate) use invocation::ChainLink;
