/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 the r9 authors
 */

//! Pluggable name resolution for an RPC client runtime.
//!
//! A [`Resolver`] maps a target URI to a continuously updated set of backend
//! address groups plus opaque service configuration, delivered through a
//! [`ResolveListener`]. All side-effecting resolver calls and all listener
//! deliveries run on a [`SyncContext`], a serialized single-flight task
//! queue; blocking work belongs on the offload runtime handle carried by
//! [`ResolverArgs`] and re-enters the context as a new task.

mod sync;
pub use sync::{SyncContext, SyncHandle};

mod result;
pub use result::{ArcConfig, ConfigOrError, ResolutionResult, ResolutionResultBuilder};

mod args;
pub use args::{
    MetricRecorder, NoProxy, NopMetricRecorder, ProxyDetector, ResolverArgs, ResolverArgsBuilder,
    ServiceConfigParser,
};

mod listener;
pub use listener::{AddressListener, AddressListenerAdapter, ArcResolveListener, ResolveListener};

mod resolver;
pub use resolver::{BoxResolver, Resolver};

mod factory;
pub use factory::{ResolverFactory, ResolverRegistry};

pub mod driver;
