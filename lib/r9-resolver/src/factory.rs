/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 the r9 authors
 */

use std::sync::Arc;

use url::Url;

use crate::args::ResolverArgs;
use crate::resolver::BoxResolver;

/// Creates [`Resolver`](crate::Resolver) instances for targets whose scheme
/// it handles.
pub trait ResolverFactory: Send + Sync {
    /// Build a resolver for `target`, deciding solely on the URI scheme.
    ///
    /// `Ok(None)` means the scheme is not handled by this factory. `Err` is
    /// a fatal construction error for a target this factory does handle,
    /// e.g. a malformed address list; it surfaces at the call site and is
    /// never deferred into async delivery.
    fn new_resolver(&self, target: &Url, args: &ResolverArgs)
    -> anyhow::Result<Option<BoxResolver>>;

    fn default_scheme(&self) -> &'static str;
}

/// An explicit, substitutable collection of resolver factories.
///
/// There is no ambient process-wide instance; the driver of the client
/// runtime builds one (usually [`ResolverRegistry::new_default`]) and passes
/// it through [`ResolverArgs`]. Factories are consulted in registration
/// order, which makes scheme dispatch deterministic.
pub struct ResolverRegistry {
    factories: Vec<Arc<dyn ResolverFactory>>,
}

impl ResolverRegistry {
    pub fn new() -> Self {
        ResolverRegistry {
            factories: Vec::new(),
        }
    }

    /// A registry seeded with the built-in `dns` and `static` factories.
    pub fn new_default() -> Self {
        let mut registry = ResolverRegistry::new();
        registry.register(Arc::new(crate::driver::host::DnsResolverFactory));
        registry.register(Arc::new(crate::driver::static_addr::StaticResolverFactory));
        registry
    }

    pub fn register(&mut self, factory: Arc<dyn ResolverFactory>) {
        self.factories.push(factory);
    }

    /// The scheme assumed when a caller supplies a bare authority string
    /// instead of a full target URI.
    pub fn default_scheme(&self) -> &'static str {
        self.factories
            .first()
            .map(|f| f.default_scheme())
            .unwrap_or("dns")
    }

    pub fn new_resolver(
        &self,
        target: &Url,
        args: &ResolverArgs,
    ) -> anyhow::Result<Option<BoxResolver>> {
        for factory in &self.factories {
            if let Some(resolver) = factory.new_resolver(target, args)? {
                return Ok(Some(resolver));
            }
        }
        Ok(None)
    }
}

impl Default for ResolverRegistry {
    fn default() -> Self {
        ResolverRegistry::new_default()
    }
}
