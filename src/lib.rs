//! Discovery of XMPP alternative connection methods.
//!
//! Given a domain, collects direct TCP endpoints from `_xmpp-client._tcp` SRV
//! records and BOSH / WebSocket URLs from XEP-0156 TXT records and the
//! host-meta document, and serves the result as JSON over HTTP.

#![deny(missing_docs)]

pub mod backend;
pub mod config;
pub mod discovery;
pub mod domain;
pub mod error;
pub mod methods;
pub mod resolver;
pub mod server;
pub mod source;

// Re-export key types
pub use config::Config;
pub use domain::Domain;
pub use error::{Error, Result};
pub use methods::{Endpoint, Method, Methods};
pub use resolver::AltConnectionResolver;
pub use server::{router, LookupQuery, Server, ServerGuard};
pub use source::{Source, Sources};
