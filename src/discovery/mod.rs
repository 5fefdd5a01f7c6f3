//! Discovery sources: SRV, XEP-0156 TXT, and host-meta.
//!
//! Each source takes the request's [`Methods`] accumulator, appends what it
//! finds and hands it back. Sources never fail; lookup, fetch and parse
//! errors are logged and the accumulator is returned unchanged.

use std::future::Future;

use crate::domain::Domain;
use crate::methods::Methods;
use crate::source::Source;

pub mod host_meta;
pub mod srv;
pub mod txt;

pub use host_meta::HostMetaDiscovery;
pub use srv::SrvDiscovery;
pub use txt::TxtDiscovery;

/// A discovery source.
pub trait Discovery: Send + Sync + 'static {
    /// Which source this is.
    fn source(&self) -> Source;

    /// Append endpoints found for `domain` and return the accumulator.
    fn discover(&self, domain: &Domain, methods: Methods) -> impl Future<Output = Methods> + Send;
}
