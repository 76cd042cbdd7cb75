use std::io;

use super::{Method, Target, TransportResult};

/// The long-lived handle to an HTTP stack. One per client.
///
/// Every handle in this module is released when it is dropped. The transport
/// relies on that to free a request and its connection on every exit path.
pub trait Session {
    type Connection: Connection;

    /// Opens a connection to `target`'s host and port. The connection is only
    /// ever used for a single request.
    fn connect(&self, target: &Target) -> TransportResult<Self::Connection>;
}

/// A connection scoped to one round-trip.
pub trait Connection {
    type Request: PendingRequest;

    /// Creates the request context. `secure` selects TLS.
    fn open_request(
        &self,
        method: Method,
        path: &str,
        secure: bool,
    ) -> TransportResult<Self::Request>;
}

/// A request context: headers go in, a status and a body come out.
pub trait PendingRequest {
    /// Appends a `name: value` header line. Duplicate names are all sent.
    fn add_header(&mut self, name: &str, value: &str);

    /// Writes the request. An empty `body` sends a bodyless request.
    fn send(&mut self, body: &[u8]) -> TransportResult<()>;

    /// Blocks until the status line and headers have arrived.
    fn receive_response(&mut self) -> TransportResult<()>;

    fn status_code(&self) -> Option<u16>;

    /// Number of body bytes that can be read right now. Zero means the body is done.
    fn query_data_available(&mut self) -> io::Result<usize>;

    fn read_data(&mut self, buf: &mut [u8]) -> io::Result<usize>;
}
