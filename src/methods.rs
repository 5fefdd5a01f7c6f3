//! Connection methods and the per-request result accumulator.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

/// A connection method identifier.
///
/// Variant order is the JSON key order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Method {
    /// Direct TCP, discovered through SRV records.
    Tcp,
    /// BOSH (XEP-0206) over HTTPS.
    Xbosh,
    /// XMPP over WebSocket (RFC 7395).
    Websocket,
}

impl Method {
    /// Parse one of the HTTP-based method names used in TXT and host-meta data.
    pub fn from_alt_name(name: &str) -> Option<Self> {
        match name {
            "xbosh" => Some(Self::Xbosh),
            "websocket" => Some(Self::Websocket),
            _ => None,
        }
    }

    /// External name of the method.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Tcp => "tcp",
            Self::Xbosh => "xbosh",
            Self::Websocket => "websocket",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A discovered endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Endpoint {
    /// Host and port for direct TCP.
    Host {
        /// Port number.
        port: u16,
        /// Target hostname, without the trailing root dot.
        target: String,
    },
    /// `https://` or `wss://` URL.
    Url(String),
}

impl Endpoint {
    /// Host/port endpoint.
    pub fn host(target: impl Into<String>, port: u16) -> Self {
        Self::Host {
            port,
            target: target.into(),
        }
    }

    /// URL endpoint.
    pub fn url(url: impl Into<String>) -> Self {
        Self::Url(url.into())
    }
}

/// Method → endpoints, built up by the resolvers of one request.
///
/// Endpoints keep discovery order and are never deduplicated. A method only
/// appears once it has at least one endpoint, so it serializes to `{}` when
/// nothing was found.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Methods(BTreeMap<Method, Vec<Endpoint>>);

impl Methods {
    /// Create an empty accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an endpoint to a method's list.
    pub fn push(&mut self, method: Method, endpoint: Endpoint) {
        self.0.entry(method).or_default().push(endpoint);
    }

    /// Endpoints for a method, if any were discovered.
    pub fn get(&self, method: Method) -> Option<&[Endpoint]> {
        self.0.get(&method).map(Vec::as_slice)
    }

    /// Whether nothing has been discovered.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of methods with at least one endpoint.
    pub fn len(&self) -> usize {
        self.0.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_serializes_to_object() {
        assert_eq!(serde_json::to_string(&Methods::new()).unwrap(), "{}");
    }

    #[test]
    fn serializes_external_shape() {
        let mut methods = Methods::new();
        methods.push(Method::Websocket, Endpoint::url("wss://example.com/ws"));
        methods.push(Method::Tcp, Endpoint::host("xmpp.example.com", 5222));
        methods.push(Method::Xbosh, Endpoint::url("https://example.com/bosh"));
        methods.push(Method::Websocket, Endpoint::url("wss://example.com/ws"));

        assert_eq!(
            serde_json::to_string(&methods).unwrap(),
            r#"{"tcp":[{"port":5222,"target":"xmpp.example.com"}],"xbosh":["https://example.com/bosh"],"websocket":["wss://example.com/ws","wss://example.com/ws"]}"#
        );
    }

    #[test]
    fn alt_names() {
        assert_eq!(Method::from_alt_name("xbosh"), Some(Method::Xbosh));
        assert_eq!(Method::from_alt_name("websocket"), Some(Method::Websocket));
        assert_eq!(Method::from_alt_name("tcp"), None);
        assert_eq!(Method::from_alt_name("WebSocket"), None);
    }
}
