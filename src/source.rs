//! Discovery source selection.

/// One of the three discovery sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Source {
    /// `_xmpp-client._tcp` SRV records.
    Srv,
    /// `_xmppconnect` TXT records.
    Txt,
    /// `/.well-known/host-meta` document.
    HostMeta,
}

impl Source {
    /// All sources in execution order.
    pub const ALL: [Source; 3] = [Source::Srv, Source::Txt, Source::HostMeta];

    /// Canonical name used in the `sources` parameter.
    pub fn name(&self) -> &'static str {
        match self {
            Source::Srv => "srv",
            Source::Txt => "txt",
            Source::HostMeta => "host-meta",
        }
    }

    /// Exact, case-sensitive lookup by canonical name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.name() == name)
    }
}

/// The set of sources a caller asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sources {
    srv: bool,
    txt: bool,
    host_meta: bool,
}

impl Sources {
    /// Every source enabled.
    pub fn all() -> Self {
        Self {
            srv: true,
            txt: true,
            host_meta: true,
        }
    }

    /// No source enabled.
    pub fn none() -> Self {
        Self {
            srv: false,
            txt: false,
            host_meta: false,
        }
    }

    /// Build from the optional `sources` parameter.
    ///
    /// Absent means all sources. A present value is split on `,`; names that
    /// are not an exact match are ignored.
    pub fn from_param(param: Option<&str>) -> Self {
        match param {
            None => Self::all(),
            Some(list) => list
                .split(',')
                .filter_map(Source::from_name)
                .fold(Self::none(), Self::with),
        }
    }

    /// Enable a source.
    pub fn with(mut self, source: Source) -> Self {
        match source {
            Source::Srv => self.srv = true,
            Source::Txt => self.txt = true,
            Source::HostMeta => self.host_meta = true,
        }
        self
    }

    /// Whether a source is selected.
    pub fn contains(&self, source: Source) -> bool {
        match source {
            Source::Srv => self.srv,
            Source::Txt => self.txt,
            Source::HostMeta => self.host_meta,
        }
    }
}

impl Default for Sources {
    fn default() -> Self {
        Self::all()
    }
}
