use std::{
    error::Error as _,
    io::{self, BufRead, BufReader, Read},
};

use reqwest::blocking::{Client, Response};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use tracing::{trace, warn};
use url::Url;

use super::{
    Connection, Method, PendingRequest, Scheme, Session, Target, TransportError, TransportResult,
};

/// Settings applied once, when the session is opened.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Sent as the `User-Agent` of every request.
    pub user_agent: String,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            user_agent: concat!("thin-openai/", env!("CARGO_PKG_VERSION")).to_owned(),
        }
    }
}

/// A session backed by a blocking `reqwest` client.
///
/// Idle pooling is switched off, so the socket behind a request is closed once
/// the request handle is dropped and never picked up by a later call. The
/// system proxy configuration is honored.
#[derive(Debug, Clone)]
pub struct ReqwestSession {
    client: Client,
}

impl ReqwestSession {
    pub fn open(config: &TransportConfig) -> TransportResult<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .pool_max_idle_per_host(0)
            .build()
            .map_err(|err| TransportError::SessionInit(err.into()))?;
        trace!(user_agent = %config.user_agent, "http session opened");
        Ok(Self { client })
    }
}

impl Session for ReqwestSession {
    type Connection = ReqwestConnection;

    // reqwest dials lazily, so connect failures (DNS, refusal) surface from `send`
    // and are classified as `TransportError::Connection` there.
    fn connect(&self, target: &Target) -> TransportResult<ReqwestConnection> {
        trace!(authority = %target.authority(), "connection opened");
        Ok(ReqwestConnection {
            client: self.client.clone(),
            authority: target.authority(),
        })
    }
}

pub struct ReqwestConnection {
    client: Client,
    authority: String,
}

impl Connection for ReqwestConnection {
    type Request = ReqwestRequest;

    fn open_request(
        &self,
        method: Method,
        path: &str,
        secure: bool,
    ) -> TransportResult<ReqwestRequest> {
        let scheme = if secure { Scheme::Https } else { Scheme::Http };
        let url = Url::parse(&format!("{scheme}://{}{path}", self.authority))
            .map_err(|err| TransportError::RequestCreate(err.into()))?;
        trace!(%method, %url, "request opened");
        Ok(ReqwestRequest {
            client: self.client.clone(),
            method,
            url,
            headers: HeaderMap::new(),
            response: None,
        })
    }
}

impl Drop for ReqwestConnection {
    fn drop(&mut self) {
        trace!(authority = %self.authority, "connection released");
    }
}

pub struct ReqwestRequest {
    client: Client,
    method: Method,
    url: Url,
    headers: HeaderMap,
    response: Option<BufReader<Response>>,
}

impl PendingRequest for ReqwestRequest {
    fn add_header(&mut self, name: &str, value: &str) {
        match (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            (Ok(name), Ok(value)) => {
                self.headers.append(name, value);
            }
            _ => warn!(header = name, "skipping malformed header"),
        }
    }

    fn send(&mut self, body: &[u8]) -> TransportResult<()> {
        let mut builder = self
            .client
            .request(self.method.into(), self.url.clone())
            .headers(std::mem::take(&mut self.headers));
        if !body.is_empty() {
            builder = builder.body(body.to_vec());
        }

        let response = builder.send().map_err(classify)?;
        self.response = Some(BufReader::new(response));
        Ok(())
    }

    // the blocking client only hands the response back once the head has been
    // read, so by now there is nothing left to wait for
    fn receive_response(&mut self) -> TransportResult<()> {
        match self.response {
            Some(_) => Ok(()),
            None => Err(TransportError::Receive("request was never sent".into())),
        }
    }

    fn status_code(&self) -> Option<u16> {
        self.response
            .as_ref()
            .map(|response| response.get_ref().status().as_u16())
    }

    fn query_data_available(&mut self) -> io::Result<usize> {
        match self.response.as_mut() {
            Some(response) => response.fill_buf().map(<[u8]>::len),
            None => Ok(0),
        }
    }

    fn read_data(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self.response.as_mut() {
            Some(response) => response.read(buf),
            None => Ok(0),
        }
    }
}

impl Drop for ReqwestRequest {
    fn drop(&mut self) {
        trace!(url = %self.url, "request released");
    }
}

fn classify(err: reqwest::Error) -> TransportError {
    if err.is_connect() {
        TransportError::Connection(err.into())
    } else if err.is_builder() {
        TransportError::RequestCreate(err.into())
    } else if err.is_timeout() || err.is_decode() || lost_response_head(&err) {
        TransportError::Receive(err.into())
    } else {
        TransportError::Send(err.into())
    }
}

/// The request went out but the peer hung up or answered with something
/// that is not an HTTP status line.
fn lost_response_head(err: &reqwest::Error) -> bool {
    let mut source = err.source();
    while let Some(cause) = source {
        if let Some(cause) = cause.downcast_ref::<hyper::Error>() {
            return cause.is_incomplete_message() || cause.is_parse();
        }
        source = cause.source();
    }
    false
}

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Delete => reqwest::Method::DELETE,
        }
    }
}
