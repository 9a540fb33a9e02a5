/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 the r9 authors
 */

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::anyhow;
use arcstr::ArcStr;
use log::debug;
use slog::{Logger, slog_info, slog_warn};
use tokio::runtime::Handle;
use url::Url;

use r9_types::net::EndpointGroup;
use r9_types::status::{Status, StatusOr};

use crate::args::{MetricRecorder, ResolverArgs};
use crate::factory::ResolverFactory;
use crate::listener::ArcResolveListener;
use crate::resolver::{BoxResolver, Resolver};
use crate::result::ResolutionResult;
use crate::sync::SyncHandle;

const DNS_SCHEME: &str = "dns";

/// Factory for the `dns` scheme, e.g. `dns:///orders.prod.svc:443`.
///
/// The lookup itself runs on the offload runtime handle from the args; the
/// completed result re-enters the sync context before it touches the
/// listener.
pub struct DnsResolverFactory;

impl ResolverFactory for DnsResolverFactory {
    fn new_resolver(
        &self,
        target: &Url,
        args: &ResolverArgs,
    ) -> anyhow::Result<Option<BoxResolver>> {
        if target.scheme() != DNS_SCHEME {
            return Ok(None);
        }

        // "dns:///host:port" parses host into the path, "dns://host" into
        // the authority; accept both.
        let hostport = match target.host_str() {
            Some(h) if !h.is_empty() => match target.port() {
                Some(p) => format!("{h}:{p}"),
                None => h.to_string(),
            },
            _ => target.path().trim_start_matches('/').to_string(),
        };
        if hostport.is_empty() {
            return Err(anyhow!("no host in dns target {target}"));
        }
        let (host, port) = split_host_port(&hostport, args.default_port())?;

        let authority = match args.override_authority() {
            Some(a) => a.clone(),
            None => ArcStr::from(host.as_str()),
        };
        Ok(Some(Box::new(DnsResolver {
            authority,
            host: Arc::new(host),
            port,
            sync: args.sync_handle().clone(),
            offload: args.offload_handle().cloned(),
            logger: args.logger().cloned(),
            metrics: args.metric_recorder().cloned(),
            listener: None,
            stopped: Arc::new(AtomicBool::new(false)),
            in_flight: Arc::new(AtomicBool::new(false)),
        })))
    }

    fn default_scheme(&self) -> &'static str {
        DNS_SCHEME
    }
}

/// Split `host[:port]`, accepting bracketed ipv6 literals like `[::1]:443`.
/// The returned host carries no brackets.
fn split_host_port(hostport: &str, default_port: u16) -> anyhow::Result<(String, u16)> {
    if let Some(rest) = hostport.strip_prefix('[') {
        let Some((host, tail)) = rest.split_once(']') else {
            return Err(anyhow!("unclosed ipv6 literal in dns target {hostport}"));
        };
        let port = match tail.strip_prefix(':') {
            Some(p) => p
                .parse::<u16>()
                .map_err(|e| anyhow!("invalid port {p} in dns target: {e}"))?,
            None if tail.is_empty() => default_port,
            None => return Err(anyhow!("invalid dns target {hostport}")),
        };
        return Ok((host.to_string(), port));
    }
    match hostport.rsplit_once(':') {
        Some((h, p)) if !h.contains(':') => {
            let port = p
                .parse::<u16>()
                .map_err(|e| anyhow!("invalid port {p} in dns target: {e}"))?;
            Ok((h.to_string(), port))
        }
        _ => Ok((hostport.to_string(), default_port)),
    }
}

/// Gives the coalescing flag back when the lookup finishes, when the offload
/// runtime drops the lookup future, or when the sync context drops the
/// delivery task without running it.
struct FlightGuard(Arc<AtomicBool>);

impl Drop for FlightGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

struct DnsResolver {
    authority: ArcStr,
    host: Arc<String>,
    port: u16,
    sync: SyncHandle,
    offload: Option<Handle>,
    logger: Option<Logger>,
    metrics: Option<Arc<dyn MetricRecorder>>,
    listener: Option<ArcResolveListener>,
    stopped: Arc<AtomicBool>,
    in_flight: Arc<AtomicBool>,
}

impl DnsResolver {
    fn resolve(&self) {
        let Some(listener) = self.listener.clone() else {
            return;
        };
        // coalesce: a refresh while a lookup is in flight is a no-op
        if self.in_flight.swap(true, Ordering::AcqRel) {
            debug!("dns resolver {}: refresh coalesced", self.authority);
            return;
        }
        let guard = FlightGuard(Arc::clone(&self.in_flight));

        if let Some(m) = &self.metrics {
            m.add_count("resolver.dns.query.total", 1, &[("host", self.host.as_str())]);
        }

        let Some(offload) = self.offload.clone() else {
            drop(guard);
            let stopped = Arc::clone(&self.stopped);
            self.sync.execute(move || {
                if stopped.load(Ordering::Acquire) {
                    return;
                }
                listener.on_error(Status::internal(
                    "no offload runtime handle set for blocking dns resolution",
                ));
            });
            return;
        };

        let host = Arc::clone(&self.host);
        let port = self.port;
        let sync = self.sync.clone();
        let stopped = Arc::clone(&self.stopped);
        let logger = self.logger.clone();
        offload.spawn(async move {
            let ret = match tokio::net::lookup_host((host.as_str(), port)).await {
                Ok(iter) => Ok(iter.map(EndpointGroup::new).collect::<Vec<_>>()),
                Err(e) => Err(Status::unavailable(format!(
                    "dns lookup for {host} failed: {e}"
                ))),
            };
            sync.execute(move || {
                drop(guard);
                if stopped.load(Ordering::Acquire) {
                    debug!("dns resolver {host}: dropped delivery after shutdown");
                    return;
                }
                match ret {
                    Ok(groups) => {
                        if let Some(logger) = &logger {
                            slog_info!(logger, "dns resolution finished";
                                "host" => host.as_str(),
                                "groups" => groups.len(),
                            );
                        }
                        let result = ResolutionResult::builder()
                            .addresses(StatusOr::from_value(groups))
                            .build();
                        let _accepted = listener.on_result(result);
                    }
                    Err(e) => {
                        if let Some(logger) = &logger {
                            slog_warn!(logger, "dns resolution failed";
                                "host" => host.as_str(),
                                "reason" => e.to_string(),
                            );
                        }
                        listener.on_error(e);
                    }
                }
            });
        });
    }
}

impl Resolver for DnsResolver {
    fn authority(&self) -> &str {
        &self.authority
    }

    fn start(&mut self, listener: ArcResolveListener) {
        debug_assert!(self.listener.is_none(), "resolver started twice");
        if self.listener.is_some() || self.stopped.load(Ordering::Acquire) {
            return;
        }
        self.listener = Some(listener);
        self.resolve();
    }

    fn refresh(&mut self) {
        self.resolve();
    }

    fn shutdown(&mut self) {
        self.stopped.store(true, Ordering::Release);
        self.listener = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::listener::ResolveListener;
    use crate::sync::SyncContext;
    use std::time::Duration;

    struct NopListener;

    impl ResolveListener for NopListener {
        fn on_result(&self, _result: ResolutionResult) -> Status {
            Status::ok()
        }

        fn on_error(&self, _error: Status) {}
    }

    #[test]
    fn host_port_split() {
        assert_eq!(
            split_host_port("localhost:8080", 443).unwrap(),
            ("localhost".to_string(), 8080)
        );
        assert_eq!(
            split_host_port("localhost", 443).unwrap(),
            ("localhost".to_string(), 443)
        );
        assert_eq!(
            split_host_port("[::1]:8080", 443).unwrap(),
            ("::1".to_string(), 8080)
        );
        assert_eq!(
            split_host_port("[2001:db8::2]", 443).unwrap(),
            ("2001:db8::2".to_string(), 443)
        );
        assert!(split_host_port("[::1", 443).is_err());
        assert!(split_host_port("[::1]x", 443).is_err());
        assert!(split_host_port("localhost:notaport", 443).is_err());
    }

    #[test]
    fn refresh_survives_a_dropped_lookup() {
        let ctx = SyncContext::spawn("test-dns-flight").unwrap();
        let rt = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .build()
            .unwrap();
        let offload = rt.handle().clone();
        // a shut down runtime drops every future handed to it
        rt.shutdown_background();

        let mut resolver = DnsResolver {
            authority: ArcStr::from("localhost"),
            host: Arc::new("localhost".to_string()),
            port: 80,
            sync: ctx.handle(),
            offload: Some(offload),
            logger: None,
            metrics: None,
            listener: None,
            stopped: Arc::new(AtomicBool::new(false)),
            in_flight: Arc::new(AtomicBool::new(false)),
        };
        resolver.start(Arc::new(NopListener));

        // the dropped future must give the coalescing flag back
        let mut released = false;
        for _ in 0..100 {
            if !resolver.in_flight.load(Ordering::Acquire) {
                released = true;
                break;
            }
            std::thread::sleep(Duration::from_millis(10));
        }
        assert!(released);
    }
}
