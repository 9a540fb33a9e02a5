/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 the r9 authors
 */

//! The cluster discovery (CDS) balancing policy.
//!
//! Its configuration names a cluster to be resolved through the control
//! plane later, so parsing here produces the seed of a runtime dependency
//! graph rather than a finished endpoint picker. Look the provider up
//! through the registry under [`CDS_POLICY_NAME`], not directly.

use std::str::FromStr;

use anyhow::Context;
use serde_json::{Map, Value};
use slog::slog_info;

use r9_types::name::NodeName;
use r9_types::status::Status;

use r9_resolver::ConfigOrError;

use crate::balancer::{BalancerHelper, BoxLoadBalancer, LoadBalancer, ResolvedUpdate};
use crate::provider::PolicyProvider;

pub const CDS_POLICY_NAME: &str = "cds_experimental";

/// A validated CDS policy configuration: one dynamic cluster reference.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CdsConfig {
    /// Name of the cluster to query the control plane for.
    pub cluster: NodeName,
    /// False for clusters in the statically subscribed set the dependency
    /// manager already maintains. True for a cluster referenced only
    /// through another cluster's configuration, which must be watched on
    /// demand and may in turn reference further dynamic clusters.
    pub is_dynamic: bool,
}

fn parse_cds_config(raw: &Map<String, Value>) -> anyhow::Result<CdsConfig> {
    let cluster = r9_json::get_required_str(raw, "cluster")?;
    let cluster = NodeName::from_str(cluster).context("invalid cluster name")?;
    let is_dynamic = r9_json::get_optional_bool(raw, "is_dynamic")?.unwrap_or(false);
    Ok(CdsConfig {
        cluster,
        is_dynamic,
    })
}

pub struct CdsPolicyProvider;

impl PolicyProvider for CdsPolicyProvider {
    fn policy_name(&self) -> &'static str {
        CDS_POLICY_NAME
    }

    fn priority(&self) -> u8 {
        5
    }

    fn new_balancer(&self, helper: &BalancerHelper) -> BoxLoadBalancer {
        Box::new(CdsBalancer {
            helper: helper.clone(),
            current: None,
        })
    }

    fn parse_config(&self, raw: &Map<String, Value>) -> ConfigOrError {
        match parse_cds_config(raw) {
            Ok(config) => ConfigOrError::from_config(config),
            Err(e) => ConfigOrError::from_error(Status::unavailable(format!(
                "failed to parse CDS policy config: {e:#}; input: {}",
                Value::Object(raw.clone())
            ))),
        }
    }
}

/// Tracks the cluster reference named by the current service config.
///
/// The hierarchical builder reads [`CdsBalancer::cluster`] to seed or
/// update its dependency graph; this balancer itself never performs
/// control plane calls.
pub struct CdsBalancer {
    helper: BalancerHelper,
    current: Option<CdsConfig>,
}

impl CdsBalancer {
    pub fn cluster(&self) -> Option<&CdsConfig> {
        self.current.as_ref()
    }
}

impl LoadBalancer for CdsBalancer {
    fn accept_resolved(&mut self, update: ResolvedUpdate) -> Status {
        let parsed = match update.service_config() {
            Some(c) => c,
            None => {
                return Status::unavailable("resolution update carries no CDS policy config");
            }
        };
        match parsed.config_as::<CdsConfig>() {
            Some(config) => {
                if self.current.as_ref() != Some(config) {
                    if let Some(logger) = self.helper.logger() {
                        slog_info!(logger, "cds cluster reference changed";
                            "cluster" => config.cluster.as_str(),
                            "is_dynamic" => config.is_dynamic,
                        );
                    }
                    self.current = Some(config.clone());
                }
                Status::ok()
            }
            None => match parsed.error() {
                Some(e) => e.clone(),
                None => Status::unavailable("service config is not a CDS policy config"),
            },
        }
    }

    fn handle_error(&mut self, error: Status) {
        // keep the current watch; the channel level decides when to retry
        log::warn!("cds: resolution error: {error}");
    }

    fn shutdown(&mut self) {
        self.current = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(v: Value) -> Map<String, Value> {
        match v {
            Value::Object(m) => m,
            _ => unreachable!(),
        }
    }

    #[test]
    fn parse_minimal() {
        let parsed = CdsPolicyProvider.parse_config(&raw(json!({"cluster": "orders"})));
        let config = parsed.config_as::<CdsConfig>().unwrap();
        assert_eq!(config.cluster.as_str(), "orders");
        assert!(!config.is_dynamic);
    }

    #[test]
    fn parse_dynamic() {
        let parsed =
            CdsPolicyProvider.parse_config(&raw(json!({"cluster": "orders", "is_dynamic": true})));
        let config = parsed.config_as::<CdsConfig>().unwrap();
        assert!(config.is_dynamic);
    }

    #[test]
    fn parse_failures_degrade_to_error() {
        for v in [
            json!({}),
            json!({"cluster": ""}),
            json!({"cluster": 3}),
            json!({"cluster": "orders", "is_dynamic": []}),
        ] {
            let parsed = CdsPolicyProvider.parse_config(&raw(v));
            let e = parsed.error().unwrap();
            assert!(!e.is_ok());
            assert!(e.message().contains("CDS policy config"));
        }
    }
}
