/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 the r9 authors
 */

//! End to end: a resolver delivers a result whose service config selects the
//! CDS policy; the balancer layer parses it through the registry, consumes
//! the update on the sync context, and reports acceptance back.

use std::str::FromStr;
use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::{Map, Value, json};
use url::Url;

use r9_balance::cds::{CDS_POLICY_NAME, CdsConfig};
use r9_balance::{BalancerHelper, BoxLoadBalancer, PolicyRegistry, ResolvedUpdate};
use r9_resolver::{
    ConfigOrError, NoProxy, ResolutionResult, ResolveListener, ResolverArgs, ResolverRegistry,
    ServiceConfigParser, SyncContext,
};
use r9_types::name::NodeName;
use r9_types::status::Status;

/// Parses `{"loadBalancingConfig": {"<policy>": {...}}}` through the policy
/// registry, the way a channel turns resolved config into policy config.
struct RegistryBackedParser {
    registry: Arc<PolicyRegistry>,
}

impl ServiceConfigParser for RegistryBackedParser {
    fn parse_service_config(&self, raw: &Map<String, Value>) -> ConfigOrError {
        let Some(Value::Object(lb)) = raw.get("loadBalancingConfig") else {
            return ConfigOrError::from_error(Status::invalid_argument(
                "no loadBalancingConfig in service config",
            ));
        };
        let Some((policy, Value::Object(policy_raw))) = lb.iter().next() else {
            return ConfigOrError::from_error(Status::invalid_argument(
                "empty loadBalancingConfig",
            ));
        };
        self.registry.parse_policy_config(policy, policy_raw)
    }
}

struct BalancerListener {
    balancer: Mutex<BoxLoadBalancer>,
    accepted: mpsc::Sender<Status>,
}

impl ResolveListener for BalancerListener {
    fn on_result(&self, result: ResolutionResult) -> Status {
        let status = match ResolvedUpdate::try_new(&result) {
            Ok(update) => self.balancer.lock().unwrap().accept_resolved(update),
            Err(e) => {
                self.balancer.lock().unwrap().handle_error(e.clone());
                e
            }
        };
        let _ = self.accepted.send(status.clone());
        status
    }

    fn on_error(&self, error: Status) {
        self.balancer.lock().unwrap().handle_error(error.clone());
        let _ = self.accepted.send(error);
    }
}

#[test]
fn resolved_config_drives_cds_policy() {
    let ctx = SyncContext::spawn("test-policy-flow").unwrap();
    let policies = Arc::new(PolicyRegistry::new_default());

    let parser = RegistryBackedParser {
        registry: Arc::clone(&policies),
    };
    assert_eq!(CDS_POLICY_NAME, "cds_experimental");
    let raw = match json!({
        "loadBalancingConfig": {
            "cds_experimental": {"cluster": "orders", "is_dynamic": true}
        }
    }) {
        Value::Object(m) => m,
        _ => unreachable!(),
    };
    let parsed = parser.parse_service_config(&raw);
    let cds = parsed.config_as::<CdsConfig>().unwrap();
    assert_eq!(cds.cluster, NodeName::from_str("orders").unwrap());
    assert!(cds.is_dynamic);

    // wire a static resolver whose delivery carries that parsed config
    let args = ResolverArgs::builder()
        .default_port(443)
        .proxy_detector(Arc::new(NoProxy))
        .sync_handle(ctx.handle())
        .config_parser(Arc::new(parser))
        .build()
        .unwrap();
    let resolvers = ResolverRegistry::new_default();
    let target = Url::parse("static:///10.0.0.1:443").unwrap();
    let mut resolver = resolvers.new_resolver(&target, &args).unwrap().unwrap();

    let helper = BalancerHelper::new(ctx.handle(), Arc::clone(&policies), None);
    let provider = policies.provider(CDS_POLICY_NAME).unwrap();
    let balancer = provider.new_balancer(&helper);

    let (sender, receiver) = mpsc::channel();
    let listener = Arc::new(BalancerListener {
        balancer: Mutex::new(balancer),
        accepted: sender,
    });

    struct AttachConfig {
        inner: Arc<BalancerListener>,
        config: ConfigOrError,
    }

    impl ResolveListener for AttachConfig {
        fn on_result(&self, result: ResolutionResult) -> Status {
            let result = result.to_builder().service_config(self.config.clone()).build();
            self.inner.on_result(result)
        }

        fn on_error(&self, error: Status) {
            self.inner.on_error(error);
        }
    }

    resolver.start(Arc::new(AttachConfig {
        inner: listener,
        config: parsed,
    }));

    let accepted = receiver.recv_timeout(Duration::from_secs(5)).unwrap();
    assert!(accepted.is_ok());
}

#[test]
fn unknown_policy_name_degrades() {
    let policies = Arc::new(PolicyRegistry::new_default());
    let parser = RegistryBackedParser {
        registry: policies,
    };
    let raw = match json!({"loadBalancingConfig": {"no_such_policy": {}}}) {
        Value::Object(m) => m,
        _ => unreachable!(),
    };
    let parsed = parser.parse_service_config(&raw);
    assert!(parsed.error().is_some());
}
