/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 the r9 authors
 */

use std::net::SocketAddr;
use std::str::FromStr;
use std::sync::Arc;
use std::sync::mpsc;
use std::time::Duration;

use serde_json::{Map, Value};
use url::Url;

use r9_resolver::{
    ConfigOrError, NoProxy, ResolutionResult, ResolveListener, ResolverArgs, ResolverRegistry,
    ServiceConfigParser, SyncContext,
};
use r9_types::status::{Status, StatusCode};

struct NopParser;

impl ServiceConfigParser for NopParser {
    fn parse_service_config(&self, _raw: &Map<String, Value>) -> ConfigOrError {
        ConfigOrError::from_config(())
    }
}

enum Update {
    Result(ResolutionResult),
    Error(Status),
}

struct ChannelListener {
    sender: mpsc::Sender<Update>,
}

impl ResolveListener for ChannelListener {
    fn on_result(&self, result: ResolutionResult) -> Status {
        let _ = self.sender.send(Update::Result(result));
        Status::ok()
    }

    fn on_error(&self, error: Status) {
        let _ = self.sender.send(Update::Error(error));
    }
}

fn test_args(ctx: &SyncContext) -> ResolverArgs {
    ResolverArgs::builder()
        .default_port(443)
        .proxy_detector(Arc::new(NoProxy))
        .sync_handle(ctx.handle())
        .config_parser(Arc::new(NopParser))
        .build()
        .unwrap()
}

#[test]
fn static_delivery_and_refresh() {
    let ctx = SyncContext::spawn("test-static").unwrap();
    let args = test_args(&ctx);
    let registry = ResolverRegistry::new_default();

    let target = Url::parse("static:///10.0.0.1:443,10.0.0.2:443").unwrap();
    let mut resolver = registry.new_resolver(&target, &args).unwrap().unwrap();
    assert_eq!(resolver.authority(), "10.0.0.1:443,10.0.0.2:443");

    let (sender, receiver) = mpsc::channel();
    resolver.start(Arc::new(ChannelListener { sender }));

    let a1 = SocketAddr::from_str("10.0.0.1:443").unwrap();
    let a2 = SocketAddr::from_str("10.0.0.2:443").unwrap();
    for _ in 0..2 {
        // first start, then one refresh redelivery
        match receiver.recv_timeout(Duration::from_secs(5)).unwrap() {
            Update::Result(result) => {
                let groups = result.addresses().value().unwrap();
                assert_eq!(groups.len(), 2);
                assert_eq!(groups[0].addrs(), &[a1]);
                assert_eq!(groups[1].addrs(), &[a2]);
                assert!(result.service_config().is_none());
            }
            Update::Error(e) => panic!("unexpected error delivery: {e}"),
        }
        resolver.refresh();
    }
}

#[test]
fn no_delivery_after_shutdown() {
    let ctx = SyncContext::spawn("test-static-stop").unwrap();
    let args = test_args(&ctx);
    let registry = ResolverRegistry::new_default();

    let target = Url::parse("static:///10.0.0.1:443").unwrap();
    let mut resolver = registry.new_resolver(&target, &args).unwrap().unwrap();

    let (sender, receiver) = mpsc::channel();
    resolver.start(Arc::new(ChannelListener { sender }));
    resolver.shutdown();
    resolver.refresh();

    // the pre-shutdown delivery may or may not have made it through; after
    // the queue settles nothing further arrives
    while receiver.recv_timeout(Duration::from_millis(200)).is_ok() {}
    assert!(receiver.recv_timeout(Duration::from_millis(200)).is_err());
}

#[test]
fn malformed_static_target_is_a_construction_error() {
    let ctx = SyncContext::spawn("test-static-bad").unwrap();
    let args = test_args(&ctx);
    let registry = ResolverRegistry::new_default();

    let target = Url::parse("static:///not-an-addr").unwrap();
    let r = registry.new_resolver(&target, &args);
    assert!(r.is_err());
}

#[test]
fn unhandled_scheme_is_absent() {
    let ctx = SyncContext::spawn("test-scheme").unwrap();
    let args = test_args(&ctx);
    let registry = ResolverRegistry::new_default();

    let target = Url::parse("xds:///listener.orders").unwrap();
    assert!(registry.new_resolver(&target, &args).unwrap().is_none());
}

#[test]
fn dns_without_offload_delivers_error_status() {
    let ctx = SyncContext::spawn("test-dns-nooffload").unwrap();
    let args = test_args(&ctx);
    let registry = ResolverRegistry::new_default();

    let target = Url::parse("dns:///localhost:443").unwrap();
    let mut resolver = registry.new_resolver(&target, &args).unwrap().unwrap();
    assert_eq!(resolver.authority(), "localhost");

    let (sender, receiver) = mpsc::channel();
    resolver.start(Arc::new(ChannelListener { sender }));
    match receiver.recv_timeout(Duration::from_secs(5)).unwrap() {
        Update::Error(e) => assert_eq!(e.code(), StatusCode::Internal),
        Update::Result(_) => panic!("expected an error delivery"),
    }
}

#[test]
fn dns_lookup_through_offload_runtime() {
    let ctx = SyncContext::spawn("test-dns").unwrap();
    let rt = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(1)
        .enable_all()
        .build()
        .unwrap();

    let args = ResolverArgs::builder()
        .default_port(443)
        .proxy_detector(Arc::new(NoProxy))
        .sync_handle(ctx.handle())
        .config_parser(Arc::new(NopParser))
        .offload_handle(rt.handle().clone())
        .build()
        .unwrap();
    let registry = ResolverRegistry::new_default();

    let target = Url::parse("dns:///localhost:8080").unwrap();
    let mut resolver = registry.new_resolver(&target, &args).unwrap().unwrap();

    let (sender, receiver) = mpsc::channel();
    resolver.start(Arc::new(ChannelListener { sender }));
    match receiver.recv_timeout(Duration::from_secs(30)).unwrap() {
        Update::Result(result) => {
            let groups = result.addresses().value().unwrap();
            assert!(!groups.is_empty());
            for g in groups {
                assert_eq!(g.addrs()[0].port(), 8080);
            }
        }
        Update::Error(e) => panic!("localhost lookup failed: {e}"),
    }
}
