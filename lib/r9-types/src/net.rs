/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 the r9 authors
 */

use std::fmt;
use std::net::SocketAddr;

use smallvec::SmallVec;

use crate::attributes::Attributes;

/// An equivalence class of socket addresses for one logical backend.
///
/// All addresses in a group are considered interchangeable. The group is
/// delivered verbatim from resolver to consumer; the attached [`Attributes`]
/// carry naming-system metadata for that backend only.
#[derive(Clone)]
pub struct EndpointGroup {
    addrs: SmallVec<[SocketAddr; 2]>,
    attributes: Attributes,
}

impl EndpointGroup {
    pub fn new(addr: SocketAddr) -> Self {
        let mut addrs = SmallVec::new();
        addrs.push(addr);
        EndpointGroup {
            addrs,
            attributes: Attributes::new(),
        }
    }

    pub fn with_addrs(addrs: impl IntoIterator<Item = SocketAddr>) -> Self {
        EndpointGroup {
            addrs: addrs.into_iter().collect(),
            attributes: Attributes::new(),
        }
    }

    pub fn set_attributes(mut self, attributes: Attributes) -> Self {
        self.attributes = attributes;
        self
    }

    #[inline]
    pub fn addrs(&self) -> &[SocketAddr] {
        &self.addrs
    }

    #[inline]
    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }
}

impl fmt::Debug for EndpointGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EndpointGroup")
            .field("addrs", &self.addrs)
            .field("attributes", &self.attributes)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn group_keeps_order() {
        let a1 = SocketAddr::from_str("127.0.0.1:8080").unwrap();
        let a2 = SocketAddr::from_str("[::1]:8080").unwrap();
        let g = EndpointGroup::with_addrs([a1, a2]);
        assert_eq!(g.addrs(), &[a1, a2]);
        assert!(g.attributes().is_empty());
    }
}
