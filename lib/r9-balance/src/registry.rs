/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 the r9 authors
 */

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::{Arc, Mutex};

use anyhow::anyhow;
use once_cell::sync::Lazy;
use serde_json::{Map, Value};

use r9_types::status::Status;

use r9_resolver::ConfigOrError;

use crate::cds::CdsPolicyProvider;
use crate::provider::ArcPolicyProvider;
use crate::round_robin::RoundRobinPolicyProvider;

static PROCESS_DEFAULT_REGISTRY: Lazy<Arc<PolicyRegistry>> =
    Lazy::new(|| Arc::new(PolicyRegistry::new_default()));

/// Registration and lookup of load balancing policy providers.
///
/// The registry is an explicit instance passed through configuration, not
/// ambient static state; [`PolicyRegistry::process_default`] exists for
/// convenience and can always be substituted. Registration is expected to
/// happen at startup, before concurrent lookups begin.
pub struct PolicyRegistry {
    providers: Mutex<Vec<ArcPolicyProvider>>,
}

impl PolicyRegistry {
    pub fn new() -> Self {
        PolicyRegistry {
            providers: Mutex::new(Vec::new()),
        }
    }

    /// A registry seeded with the built-in providers.
    pub fn new_default() -> Self {
        let registry = PolicyRegistry::new();
        registry
            .register(Arc::new(RoundRobinPolicyProvider))
            .expect("built-in provider registration");
        registry
            .register(Arc::new(CdsPolicyProvider))
            .expect("built-in provider registration");
        registry
    }

    /// The shared process-wide default instance.
    pub fn process_default() -> Arc<PolicyRegistry> {
        Arc::clone(&PROCESS_DEFAULT_REGISTRY)
    }

    /// Add `provider` under its declared policy name. Several providers may
    /// share a name; lookup picks by priority, ties broken in favor of the
    /// provider registered first.
    pub fn register(&self, provider: ArcPolicyProvider) -> anyhow::Result<()> {
        if provider.policy_name().is_empty() {
            return Err(anyhow!("provider declares an empty policy name"));
        }
        let mut providers = self.providers.lock().unwrap();
        providers.push(provider);
        Ok(())
    }

    /// The highest priority available provider for `name`, if any.
    /// Unavailable providers are skipped; the name match is case sensitive.
    pub fn provider(&self, name: &str) -> Option<ArcPolicyProvider> {
        let providers = self.providers.lock().unwrap();
        let mut best: Option<&ArcPolicyProvider> = None;
        for p in providers.iter() {
            if p.policy_name() != name || !p.is_available() {
                continue;
            }
            match best {
                Some(b) if p.priority() <= b.priority() => {}
                _ => best = Some(p),
            }
        }
        best.cloned()
    }

    /// Delegate raw policy config parsing to the provider for `name`.
    ///
    /// Never unwinds: an unknown name and a panicking parser both degrade
    /// to a non-ok [`ConfigOrError`], since the raw map is data from a
    /// possibly untrusted control plane.
    pub fn parse_policy_config(&self, name: &str, raw: &Map<String, Value>) -> ConfigOrError {
        let Some(provider) = self.provider(name) else {
            return ConfigOrError::from_error(Status::not_found(format!(
                "no available load balancing policy provider named {name}"
            )));
        };
        match catch_unwind(AssertUnwindSafe(|| provider.parse_config(raw))) {
            Ok(parsed) => parsed,
            Err(_) => ConfigOrError::from_error(Status::internal(format!(
                "config parser for policy {name} panicked"
            ))),
        }
    }
}

impl Default for PolicyRegistry {
    fn default() -> Self {
        PolicyRegistry::new_default()
    }
}
