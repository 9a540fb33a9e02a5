/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 the r9 authors
 */

use std::any::Any;
use std::fmt;
use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::anyhow;
use arcstr::ArcStr;
use serde_json::{Map, Value};
use slog::Logger;
use tokio::runtime::Handle;

use r9_types::attributes::{Attributes, Key};

use crate::factory::ResolverRegistry;
use crate::result::ConfigOrError;
use crate::sync::SyncHandle;

/// Detects whether a connection to `addr` must go through a proxy.
pub trait ProxyDetector: Send + Sync {
    fn proxy_for(&self, addr: &SocketAddr) -> Option<SocketAddr>;
}

pub struct NoProxy;

impl ProxyDetector for NoProxy {
    fn proxy_for(&self, _addr: &SocketAddr) -> Option<SocketAddr> {
        None
    }
}

/// Named counters with free-form attributes. The subsystem defines no
/// format beyond the names it emits.
pub trait MetricRecorder: Send + Sync {
    fn add_count(&self, name: &str, value: u64, attrs: &[(&str, &str)]);
}

pub struct NopMetricRecorder;

impl MetricRecorder for NopMetricRecorder {
    fn add_count(&self, _name: &str, _value: u64, _attrs: &[(&str, &str)]) {}
}

/// Parses and validates the service configuration chosen by the naming
/// system. Implementations capture every failure into the returned
/// [`ConfigOrError`] instead of panicking: the raw map is untrusted input.
pub trait ServiceConfigParser: Send + Sync {
    fn parse_service_config(&self, raw: &Map<String, Value>) -> ConfigOrError;
}

/// Immutable construction context handed to a resolver factory.
///
/// The required collaborators are validated at [`ResolverArgsBuilder::build`]
/// time; a missing one is a fatal construction error, never deferred into
/// async delivery.
#[derive(Clone)]
pub struct ResolverArgs {
    default_port: u16,
    proxy_detector: Arc<dyn ProxyDetector>,
    sync_handle: SyncHandle,
    config_parser: Arc<dyn ServiceConfigParser>,
    scheduler_handle: Option<Handle>,
    logger: Option<Logger>,
    offload_handle: Option<Handle>,
    override_authority: Option<ArcStr>,
    metric_recorder: Option<Arc<dyn MetricRecorder>>,
    resolver_registry: Option<Arc<ResolverRegistry>>,
    custom: Attributes,
}

impl ResolverArgs {
    pub fn builder() -> ResolverArgsBuilder {
        ResolverArgsBuilder::default()
    }

    /// Port to use when the target or the naming system supplies none.
    #[inline]
    pub fn default_port(&self) -> u16 {
        self.default_port
    }

    #[inline]
    pub fn proxy_detector(&self) -> &Arc<dyn ProxyDetector> {
        &self.proxy_detector
    }

    /// The context all side-effecting resolver calls and listener
    /// deliveries run on.
    #[inline]
    pub fn sync_handle(&self) -> &SyncHandle {
        &self.sync_handle
    }

    #[inline]
    pub fn config_parser(&self) -> &Arc<dyn ServiceConfigParser> {
        &self.config_parser
    }

    /// Runtime handle for delayed re-resolution tasks.
    #[inline]
    pub fn scheduler_handle(&self) -> Option<&Handle> {
        self.scheduler_handle.as_ref()
    }

    #[inline]
    pub fn logger(&self) -> Option<&Logger> {
        self.logger.as_ref()
    }

    /// Runtime handle for long-running or I/O bound resolution work.
    #[inline]
    pub fn offload_handle(&self) -> Option<&Handle> {
        self.offload_handle.as_ref()
    }

    #[inline]
    pub fn override_authority(&self) -> Option<&ArcStr> {
        self.override_authority.as_ref()
    }

    #[inline]
    pub fn metric_recorder(&self) -> Option<&Arc<dyn MetricRecorder>> {
        self.metric_recorder.as_ref()
    }

    #[inline]
    pub fn resolver_registry(&self) -> Option<&Arc<ResolverRegistry>> {
        self.resolver_registry.as_ref()
    }

    /// The value of the custom argument identified by `key`, if set.
    pub fn arg<T: Any + Send + Sync>(&self, key: &Key<T>) -> Option<&T> {
        self.custom.get(key)
    }
}

// most collaborators are trait objects, summarize what can be shown
impl fmt::Debug for ResolverArgs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolverArgs")
            .field("default_port", &self.default_port)
            .field("override_authority", &self.override_authority)
            .field("scheduler_handle", &self.scheduler_handle.is_some())
            .field("offload_handle", &self.offload_handle.is_some())
            .field("custom", &self.custom)
            .finish_non_exhaustive()
    }
}

#[derive(Default)]
pub struct ResolverArgsBuilder {
    default_port: Option<u16>,
    proxy_detector: Option<Arc<dyn ProxyDetector>>,
    sync_handle: Option<SyncHandle>,
    config_parser: Option<Arc<dyn ServiceConfigParser>>,
    scheduler_handle: Option<Handle>,
    logger: Option<Logger>,
    offload_handle: Option<Handle>,
    override_authority: Option<ArcStr>,
    metric_recorder: Option<Arc<dyn MetricRecorder>>,
    resolver_registry: Option<Arc<ResolverRegistry>>,
    custom: Option<Attributes>,
}

impl ResolverArgsBuilder {
    pub fn default_port(mut self, port: u16) -> Self {
        self.default_port = Some(port);
        self
    }

    pub fn proxy_detector(mut self, detector: Arc<dyn ProxyDetector>) -> Self {
        self.proxy_detector = Some(detector);
        self
    }

    pub fn sync_handle(mut self, handle: SyncHandle) -> Self {
        self.sync_handle = Some(handle);
        self
    }

    pub fn config_parser(mut self, parser: Arc<dyn ServiceConfigParser>) -> Self {
        self.config_parser = Some(parser);
        self
    }

    pub fn scheduler_handle(mut self, handle: Handle) -> Self {
        self.scheduler_handle = Some(handle);
        self
    }

    pub fn logger(mut self, logger: Logger) -> Self {
        self.logger = Some(logger);
        self
    }

    pub fn offload_handle(mut self, handle: Handle) -> Self {
        self.offload_handle = Some(handle);
        self
    }

    pub fn override_authority(mut self, authority: ArcStr) -> Self {
        self.override_authority = Some(authority);
        self
    }

    pub fn metric_recorder(mut self, recorder: Arc<dyn MetricRecorder>) -> Self {
        self.metric_recorder = Some(recorder);
        self
    }

    pub fn resolver_registry(mut self, registry: Arc<ResolverRegistry>) -> Self {
        self.resolver_registry = Some(registry);
        self
    }

    pub fn set_arg<T: Any + Send + Sync>(mut self, key: &Key<T>, value: T) -> Self {
        let builder = match self.custom.take() {
            Some(attrs) => attrs.to_builder(),
            None => Attributes::builder(),
        };
        self.custom = Some(builder.set(key, value).build());
        self
    }

    pub fn build(self) -> anyhow::Result<ResolverArgs> {
        Ok(ResolverArgs {
            default_port: self
                .default_port
                .ok_or_else(|| anyhow!("default port not set"))?,
            proxy_detector: self
                .proxy_detector
                .ok_or_else(|| anyhow!("proxy detector not set"))?,
            sync_handle: self
                .sync_handle
                .ok_or_else(|| anyhow!("sync context handle not set"))?,
            config_parser: self
                .config_parser
                .ok_or_else(|| anyhow!("service config parser not set"))?,
            scheduler_handle: self.scheduler_handle,
            logger: self.logger,
            offload_handle: self.offload_handle,
            override_authority: self.override_authority,
            metric_recorder: self.metric_recorder,
            resolver_registry: self.resolver_registry,
            custom: self.custom.unwrap_or_default(),
        })
    }
}
