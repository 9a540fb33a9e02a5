/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 the r9 authors
 */

use std::sync::Arc;

use r9_types::attributes::Attributes;
use r9_types::net::EndpointGroup;
use r9_types::status::Status;

use crate::result::ResolutionResult;

/// The callback surface a resolver pushes updates into.
///
/// Both methods are invoked on the resolver's sync context, one call
/// logically in flight at a time, in delivery order.
pub trait ResolveListener: Send + Sync {
    /// Handle one complete resolution update.
    ///
    /// The returned status tells the resolver whether the update was
    /// accepted downstream, typically by a load balancing layer. A resolver
    /// may use a rejection as a signal but is not required to react.
    fn on_result(&self, result: ResolutionResult) -> Status;

    /// Handle a resolution error. The listener side is responsible for
    /// eventually calling `refresh()` again, normally after a backoff; the
    /// resolver never self-retries.
    fn on_error(&self, error: Status);
}

pub type ArcResolveListener = Arc<dyn ResolveListener>;

/// The pre-[`ResolutionResult`] listener shape: a bare address list plus
/// attributes, with errors delivered separately.
pub trait AddressListener: Send + Sync {
    fn on_addresses(&self, groups: Vec<EndpointGroup>, attributes: Attributes);

    fn on_error(&self, error: Status);
}

/// Adapts an [`AddressListener`] to the [`ResolveListener`] contract.
///
/// An update whose address value is an error is forwarded to the old-style
/// `on_error`, and that status doubles as the acceptance status. Service
/// config outcomes are not representable on the old surface and are dropped.
pub struct AddressListenerAdapter<L: AddressListener> {
    inner: L,
}

impl<L: AddressListener> AddressListenerAdapter<L> {
    pub fn new(inner: L) -> Self {
        AddressListenerAdapter { inner }
    }
}

impl<L: AddressListener> ResolveListener for AddressListenerAdapter<L> {
    fn on_result(&self, result: ResolutionResult) -> Status {
        match result.addresses().value() {
            Some(groups) => {
                self.inner
                    .on_addresses(groups.clone(), result.attributes().clone());
                Status::ok()
            }
            None => {
                let error = result
                    .addresses()
                    .status()
                    .cloned()
                    .unwrap_or_else(|| Status::internal("resolution result carries no addresses"));
                self.inner.on_error(error.clone());
                error
            }
        }
    }

    fn on_error(&self, error: Status) {
        self.inner.on_error(error);
    }
}
