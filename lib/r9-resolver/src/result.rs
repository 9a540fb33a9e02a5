/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 the r9 authors
 */

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use r9_types::attributes::Attributes;
use r9_types::net::EndpointGroup;
use r9_types::status::{Status, StatusOr};

pub type ArcConfig = Arc<dyn Any + Send + Sync>;

/// Exactly one of an opaque parsed configuration object or a non-ok
/// [`Status`] describing the parse failure.
#[derive(Clone)]
pub struct ConfigOrError(Inner);

#[derive(Clone)]
enum Inner {
    Config(ArcConfig),
    Error(Status),
}

impl ConfigOrError {
    pub fn from_config<T: Any + Send + Sync>(config: T) -> Self {
        ConfigOrError(Inner::Config(Arc::new(config)))
    }

    pub fn from_arc_config(config: ArcConfig) -> Self {
        ConfigOrError(Inner::Config(config))
    }

    /// # Panics
    ///
    /// Panics if `status` is ok. Building the error variant from an ok
    /// status is a programming error at the construction site.
    pub fn from_error(status: Status) -> Self {
        assert!(
            !status.is_ok(),
            "cannot build the error variant of ConfigOrError from an ok status"
        );
        ConfigOrError(Inner::Error(status))
    }

    pub fn config(&self) -> Option<&ArcConfig> {
        match &self.0 {
            Inner::Config(c) => Some(c),
            Inner::Error(_) => None,
        }
    }

    pub fn config_as<T: Any + Send + Sync>(&self) -> Option<&T> {
        self.config().and_then(|c| c.downcast_ref::<T>())
    }

    pub fn error(&self) -> Option<&Status> {
        match &self.0 {
            Inner::Config(_) => None,
            Inner::Error(e) => Some(e),
        }
    }

    #[inline]
    pub fn is_ok(&self) -> bool {
        matches!(self.0, Inner::Config(_))
    }
}

impl fmt::Debug for ConfigOrError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            Inner::Config(_) => write!(f, "ConfigOrError(config)"),
            Inner::Error(e) => write!(f, "ConfigOrError(error: {e})"),
        }
    }
}

/// One complete update from a resolver: the address groups or the error in
/// resolving them, naming-system attributes, and the service config parse
/// outcome if the naming system supplied one.
///
/// The three parts always travel together so a consumer never observes a
/// partially updated world. An absent service config means "use defaults".
#[derive(Clone, Debug)]
pub struct ResolutionResult {
    addresses: StatusOr<Vec<EndpointGroup>>,
    attributes: Attributes,
    service_config: Option<ConfigOrError>,
}

impl ResolutionResult {
    pub fn builder() -> ResolutionResultBuilder {
        ResolutionResultBuilder {
            addresses: StatusOr::from_value(Vec::new()),
            attributes: Attributes::new(),
            service_config: None,
        }
    }

    pub fn to_builder(&self) -> ResolutionResultBuilder {
        ResolutionResultBuilder {
            addresses: self.addresses.clone(),
            attributes: self.attributes.clone(),
            service_config: self.service_config.clone(),
        }
    }

    #[inline]
    pub fn addresses(&self) -> &StatusOr<Vec<EndpointGroup>> {
        &self.addresses
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

pub struct ResolutionResultBuilder {
    addresses: StatusOr<Vec<EndpointGroup>>,
    attributes: Attributes,
    service_config: Option<ConfigOrError>,
}

impl ResolutionResultBuilder {
    pub fn addresses(mut self, addresses: StatusOr<Vec<EndpointGroup>>) -> Self {
        self.addresses = addresses;
        self
    }

    pub fn attributes(mut self, attributes: Attributes) -> Self {
        self.attributes = attributes;
        self
    }

    pub fn service_config(mut self, service_config: ConfigOrError) -> Self {
        self.service_config = Some(service_config);
        self
    }

    pub fn build(self) -> ResolutionResult {
        ResolutionResult {
            addresses: self.addresses,
            attributes: self.attributes,
            service_config: self.service_config,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use r9_types::status::StatusCode;

    #[test]
    fn config_and_error_are_exclusive() {
        let ok = ConfigOrError::from_config(42u32);
        assert!(ok.is_ok());
        assert!(ok.error().is_none());
        assert_eq!(ok.config_as::<u32>(), Some(&42));
        assert!(ok.config_as::<u64>().is_none());

        let err = ConfigOrError::from_error(Status::unavailable("bad config"));
        assert!(!err.is_ok());
        assert!(err.config().is_none());
        assert_eq!(err.error().unwrap().code(), StatusCode::Unavailable);
    }

    #[test]
    #[should_panic(expected = "ok status")]
    fn reject_error_from_ok_status() {
        let _ = ConfigOrError::from_error(Status::ok());
    }

    #[test]
    fn result_defaults() {
        let r = ResolutionResult::builder().build();
        assert!(r.addresses().is_ok());
        assert!(r.addresses().value().unwrap().is_empty());
        assert!(r.attributes().is_empty());
        assert!(r.service_config().is_none());
    }

    #[test]
    fn error_addresses_and_absent_config_are_independent() {
        let r = ResolutionResult::builder()
            .addresses(StatusOr::from_error(Status::unavailable("lookup failed")))
            .build();
        assert!(!r.addresses().is_ok());
        assert!(r.service_config().is_none());

        let r2 = r
            .to_builder()
            .service_config(ConfigOrError::from_config("policy".to_string()))
            .build();
        assert!(!r2.addresses().is_ok());
        assert!(r2.service_config().unwrap().is_ok());
    }
}
