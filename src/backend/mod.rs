//! Network collaborators behind the discovery sources.
//!
//! - [`DnsLookup`] answers SRV and TXT queries
//! - [`DocumentFetch`] retrieves host-meta documents
//!
//! Each has a production implementation and a static in-memory one that
//! tests inject in its place.

pub mod dns;
pub mod http;

pub use dns::{DnsLookup, HickoryDns, SrvRecord, StaticDns, TxtRecord};
pub use http::{DocumentFetch, HttpFetcher, StaticDocuments};
