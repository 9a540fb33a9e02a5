/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 the r9 authors
 */

use std::sync::Arc;

use slog::Logger;

use r9_types::attributes::Attributes;
use r9_types::net::EndpointGroup;
use r9_types::status::Status;

use r9_resolver::{ConfigOrError, ResolutionResult, SyncHandle};

use crate::registry::PolicyRegistry;

/// A resolution update already vetted for consumption by a balancer.
///
/// An update whose address value is an error, or resolves to an empty list,
/// is a resolution failure, not "no change"; [`ResolvedUpdate::try_new`]
/// turns both into the status the consumer retries on.
#[derive(Clone, Debug)]
pub struct ResolvedUpdate {
    groups: Vec<EndpointGroup>,
    attributes: Attributes,
    service_config: Option<ConfigOrError>,
}

impl ResolvedUpdate {
    pub fn try_new(result: &ResolutionResult) -> Result<Self, Status> {
        match result.addresses().value() {
            Some(groups) if !groups.is_empty() => Ok(ResolvedUpdate {
                groups: groups.clone(),
                attributes: result.attributes().clone(),
                service_config: result.service_config().cloned(),
            }),
            Some(_) => Err(Status::unavailable(
                "name resolution returned an empty address list",
            )),
            None => Err(result
                .addresses()
                .status()
                .cloned()
                .unwrap_or_else(|| Status::internal("resolution result carries no addresses"))),
        }
    }

    #[inline]
    pub fn groups(&self) -> &[EndpointGroup] {
        &self.groups
    }

    pub fn into_groups(self) -> Vec<EndpointGroup> {
        self.groups
    }

    #[inline]
    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    #[inline]
    pub fn service_config(&self) -> Option<&ConfigOrError> {
        self.service_config.as_ref()
    }
}

/// One node of a balancing policy tree.
///
/// All methods run on the owning channel's sync context, so implementations
/// hold no locks and must not block.
pub trait LoadBalancer: Send {
    /// Consume one vetted resolution update. The returned status is
    /// reported back to the resolver as the acceptance outcome.
    fn accept_resolved(&mut self, update: ResolvedUpdate) -> Status;

    /// Handle a resolution error delivered instead of an update.
    fn handle_error(&mut self, error: Status);

    fn shutdown(&mut self);
}

pub type BoxLoadBalancer = Box<dyn LoadBalancer>;

/// Supporting services a [`PolicyProvider`](crate::PolicyProvider) hands to
/// the balancers it creates.
#[derive(Clone)]
pub struct BalancerHelper {
    sync: SyncHandle,
    registry: Arc<PolicyRegistry>,
    logger: Option<Logger>,
}

impl BalancerHelper {
    pub fn new(sync: SyncHandle, registry: Arc<PolicyRegistry>, logger: Option<Logger>) -> Self {
        BalancerHelper {
            sync,
            registry,
            logger,
        }
    }

    #[inline]
    pub fn sync_handle(&self) -> &SyncHandle {
        &self.sync
    }

    /// The registry a hierarchical policy uses to build child policies.
    #[inline]
    pub fn registry(&self) -> &Arc<PolicyRegistry> {
        &self.registry
    }

    #[inline]
    pub fn logger(&self) -> Option<&Logger> {
        self.logger.as_ref()
    }
}
