/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 the r9 authors
 */

use log::warn;
use serde_json::{Map, Value};

use r9_types::net::EndpointGroup;
use r9_types::status::Status;

use r9_resolver::ConfigOrError;

use crate::balancer::{BalancerHelper, BoxLoadBalancer, LoadBalancer, ResolvedUpdate};
use crate::provider::PolicyProvider;

pub const ROUND_ROBIN_POLICY_NAME: &str = "round_robin";

/// Leaf policy rotating across the resolved endpoint groups.
pub struct RoundRobinPolicyProvider;

impl PolicyProvider for RoundRobinPolicyProvider {
    fn policy_name(&self) -> &'static str {
        ROUND_ROBIN_POLICY_NAME
    }

    fn priority(&self) -> u8 {
        5
    }

    fn new_balancer(&self, _helper: &BalancerHelper) -> BoxLoadBalancer {
        Box::new(RoundRobinBalancer {
            groups: Vec::new(),
            next: 0,
        })
    }

    fn parse_config(&self, _raw: &Map<String, Value>) -> ConfigOrError {
        // round robin takes no configuration
        ConfigOrError::from_config(RoundRobinConfig)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RoundRobinConfig;

pub struct RoundRobinBalancer {
    groups: Vec<EndpointGroup>,
    next: usize,
}

impl RoundRobinBalancer {
    pub fn pick(&mut self) -> Option<&EndpointGroup> {
        if self.groups.is_empty() {
            return None;
        }
        let i = self.next % self.groups.len();
        self.next = self.next.wrapping_add(1);
        Some(&self.groups[i])
    }
}

impl LoadBalancer for RoundRobinBalancer {
    fn accept_resolved(&mut self, update: ResolvedUpdate) -> Status {
        self.groups = update.into_groups();
        self.next = 0;
        Status::ok()
    }

    fn handle_error(&mut self, error: Status) {
        // keep serving the last good endpoint list
        warn!("round_robin: resolution error, keeping current endpoints: {error}");
    }

    fn shutdown(&mut self) {
        self.groups.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use r9_resolver::ResolutionResult;
    use r9_types::status::StatusOr;
    use std::net::SocketAddr;
    use std::str::FromStr;

    fn update(addrs: &[&str]) -> ResolvedUpdate {
        let groups = addrs
            .iter()
            .map(|s| EndpointGroup::new(SocketAddr::from_str(s).unwrap()))
            .collect::<Vec<_>>();
        let result = ResolutionResult::builder()
            .addresses(StatusOr::from_value(groups))
            .build();
        ResolvedUpdate::try_new(&result).unwrap()
    }

    #[test]
    fn rotates_over_groups() {
        let mut lb = RoundRobinBalancer {
            groups: Vec::new(),
            next: 0,
        };
        assert!(lb.pick().is_none());

        assert!(lb.accept_resolved(update(&["10.0.0.1:80", "10.0.0.2:80"])).is_ok());
        let a1 = SocketAddr::from_str("10.0.0.1:80").unwrap();
        let a2 = SocketAddr::from_str("10.0.0.2:80").unwrap();
        assert_eq!(lb.pick().unwrap().addrs(), &[a1]);
        assert_eq!(lb.pick().unwrap().addrs(), &[a2]);
        assert_eq!(lb.pick().unwrap().addrs(), &[a1]);
    }

    #[test]
    fn error_keeps_last_good_list() {
        let mut lb = RoundRobinBalancer {
            groups: Vec::new(),
            next: 0,
        };
        lb.accept_resolved(update(&["10.0.0.1:80"]));
        lb.handle_error(Status::unavailable("resolver hiccup"));
        assert!(lb.pick().is_some());
    }
}
