/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 the r9 authors
 */

//! Pluggable load balancing policies for an RPC client runtime.
//!
//! A [`PolicyRegistry`] maps policy names, typically found in resolved
//! service configuration, to [`PolicyProvider`] implementations and parses
//! raw policy configuration into validated values. The `cds_experimental`
//! policy turns such configuration into dynamic cluster references, the
//! seeds of the [`graph::ClusterGraph`] a hierarchical policy builder
//! maintains.

mod balancer;
pub use balancer::{BalancerHelper, BoxLoadBalancer, LoadBalancer, ResolvedUpdate};

mod provider;
pub use provider::{ArcPolicyProvider, PolicyProvider};

mod registry;
pub use registry::PolicyRegistry;

mod round_robin;
pub use round_robin::{ROUND_ROBIN_POLICY_NAME, RoundRobinPolicyProvider};

pub mod cds;
pub mod graph;
