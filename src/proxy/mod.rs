// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Proxy creation and surrogates

mod class;
mod creator;
mod instantiate;
mod surrogate;

pub use class::{DescriptorProxyClassProvider, ProxyClass, ProxyClassProvider, ProxyMode};
pub use creator::InterceptorProxyCreator;
pub use instantiate::Instantiator;
pub use surrogate::Surrogate;
