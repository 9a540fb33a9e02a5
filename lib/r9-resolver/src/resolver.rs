/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 the r9 authors
 */

use crate::listener::ArcResolveListener;

/// A pluggable component resolving one target to addresses and config.
///
/// Lifecycle: unstarted, started, shutdown (terminal). `start`, `refresh`
/// and `shutdown` are always invoked from the sync context carried in the
/// construction args, so implementations need no internal locking, and none
/// of them may block; resolution work runs asynchronously and reaches the
/// caller only through the listener.
///
/// Starting a resolver twice, including after shutdown, is a caller error.
/// Implementations are not required to detect it but must not corrupt state
/// or reorder deliveries when it happens.
pub trait Resolver: Send {
    /// The authority used to authenticate connections to the resolved
    /// servers. Computed without blocking and stable for the lifetime of
    /// the resolver; two resolvers built by the same factory from the same
    /// target return the same value.
    fn authority(&self) -> &str;

    fn start(&mut self, listener: ArcResolveListener);

    /// Advisory hint to re-resolve. Only legal once started. An
    /// implementation may coalesce or ignore rapid repeated calls.
    fn refresh(&mut self) {}

    /// Stop future listener deliveries. An offloaded lookup already in
    /// flight may still complete; its delivery attempt must become a no-op,
    /// not an error.
    fn shutdown(&mut self);
}

pub type BoxResolver = Box<dyn Resolver>;
