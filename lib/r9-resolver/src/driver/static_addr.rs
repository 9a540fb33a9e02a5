/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 the r9 authors
 */

use std::net::SocketAddr;
use std::str::FromStr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{Context, anyhow};
use arcstr::ArcStr;
use url::Url;

use r9_types::net::EndpointGroup;
use r9_types::status::StatusOr;

use crate::args::ResolverArgs;
use crate::factory::ResolverFactory;
use crate::listener::ArcResolveListener;
use crate::resolver::{BoxResolver, Resolver};
use crate::result::ResolutionResult;
use crate::sync::SyncHandle;

const STATIC_SCHEME: &str = "static";

/// Factory for the `static` scheme.
///
/// The target path carries a comma separated socket address list, e.g.
/// `static:///10.0.0.1:443,10.0.0.2:443`. Each address becomes its own
/// endpoint group. A malformed list is a construction error.
pub struct StaticResolverFactory;

impl ResolverFactory for StaticResolverFactory {
    fn new_resolver(
        &self,
        target: &Url,
        args: &ResolverArgs,
    ) -> anyhow::Result<Option<BoxResolver>> {
        if target.scheme() != STATIC_SCHEME {
            return Ok(None);
        }

        let list = target.path().trim_start_matches('/');
        if list.is_empty() {
            return Err(anyhow!("no address list in static target {target}"));
        }
        let mut groups = Vec::new();
        for s in list.split(',') {
            let addr = SocketAddr::from_str(s)
                .context(format!("invalid socket address {s} in static target"))?;
            groups.push(EndpointGroup::new(addr));
        }

        let authority = match args.override_authority() {
            Some(a) => a.clone(),
            None => ArcStr::from(list),
        };
        Ok(Some(Box::new(StaticResolver {
            authority,
            groups,
            sync: args.sync_handle().clone(),
            listener: None,
            stopped: Arc::new(AtomicBool::new(false)),
        })))
    }

    fn default_scheme(&self) -> &'static str {
        STATIC_SCHEME
    }
}

struct StaticResolver {
    authority: ArcStr,
    groups: Vec<EndpointGroup>,
    sync: SyncHandle,
    listener: Option<ArcResolveListener>,
    stopped: Arc<AtomicBool>,
}

impl StaticResolver {
    fn deliver(&self) {
        let Some(listener) = self.listener.clone() else {
            return;
        };
        let groups = self.groups.clone();
        let stopped = Arc::clone(&self.stopped);
        self.sync.execute(move || {
            if stopped.load(Ordering::Acquire) {
                return;
            }
            let result = ResolutionResult::builder()
                .addresses(StatusOr::from_value(groups))
                .build();
            let _accepted = listener.on_result(result);
        });
    }
}

impl Resolver for StaticResolver {
    fn authority(&self) -> &str {
        &self.authority
    }

    fn start(&mut self, listener: ArcResolveListener) {
        debug_assert!(self.listener.is_none(), "resolver started twice");
        if self.listener.is_some() || self.stopped.load(Ordering::Acquire) {
            return;
        }
        self.listener = Some(listener);
        self.deliver();
    }

    fn refresh(&mut self) {
        self.deliver();
    }

    fn shutdown(&mut self) {
        self.stopped.store(true, Ordering::Release);
        self.listener = None;
    }
}
