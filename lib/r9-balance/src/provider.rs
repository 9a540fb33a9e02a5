/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 the r9 authors
 */

use std::sync::Arc;

use serde_json::{Map, Value};

use r9_resolver::ConfigOrError;

use crate::balancer::{BalancerHelper, BoxLoadBalancer};

/// A registerable factory for one named load balancing policy.
pub trait PolicyProvider: Send + Sync {
    /// The policy name this provider answers to. Opaque, case sensitive,
    /// matched exactly.
    fn policy_name(&self) -> &'static str;

    /// Selection weight when several providers share a name; the registry
    /// picks the available provider with the highest priority.
    fn priority(&self) -> u8;

    /// Whether this provider can be used in the current process, e.g. its
    /// optional dependencies are present.
    fn is_available(&self) -> bool {
        true
    }

    fn new_balancer(&self, helper: &BalancerHelper) -> BoxLoadBalancer;

    /// Parse raw policy configuration into a validated config value.
    ///
    /// The raw map comes from a possibly untrusted control plane; every
    /// failure is captured into the returned [`ConfigOrError`].
    fn parse_config(&self, raw: &Map<String, Value>) -> ConfigOrError;
}

pub type ArcPolicyProvider = Arc<dyn PolicyProvider>;
