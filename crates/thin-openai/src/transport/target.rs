use std::fmt;

use url::Url;

use super::{TransportError, TransportResult};

/// The two schemes the transport knows how to speak.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scheme {
    Http,
    Https,
}

impl Scheme {
    pub fn default_port(self) -> u16 {
        match self {
            Scheme::Http => 80,
            Scheme::Https => 443,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Scheme::Http => "http",
            Scheme::Https => "https",
        }
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A URL cracked into the pieces needed to open a connection and a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    scheme: Scheme,
    host: String,
    port: u16,
    path: String,
}

impl Target {
    /// Splits `input` into scheme, host, port and path (query included).
    ///
    /// Anything other than an absolute `http` or `https` URL with a host is
    /// rejected with [`TransportError::UrlParse`].
    pub fn parse(input: &str) -> TransportResult<Self> {
        let url = Url::parse(input).map_err(|err| TransportError::url_parse(input, err))?;

        let scheme = match url.scheme() {
            "http" => Scheme::Http,
            "https" => Scheme::Https,
            other => {
                return Err(TransportError::url_parse(
                    input,
                    format!("unsupported scheme `{other}`"),
                ))
            }
        };

        let host = match url.host_str() {
            Some(host) if !host.is_empty() => host.to_owned(),
            _ => return Err(TransportError::url_parse(input, "missing host")),
        };

        // `Url::port` hides a port equal to the scheme default, which is what we fall back to.
        let port = url.port().unwrap_or(scheme.default_port());

        let mut path = url.path().to_owned();
        if let Some(query) = url.query() {
            path.push('?');
            path.push_str(query);
        }

        Ok(Self {
            scheme,
            host,
            port,
            path,
        })
    }

    pub fn scheme(&self) -> Scheme {
        self.scheme
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Path and query, always starting with `/`.
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn is_secure(&self) -> bool {
        self.scheme == Scheme::Https
    }

    /// `host:port`, with IPv6 hosts kept in brackets.
    pub fn authority(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
