//! Round-trips through the reqwest backed transport against a scripted TCP
//! server, so the exact bytes on the wire (chunking, early hang-ups) are under
//! the test's control.

use std::{
    io::{Read, Write},
    net::{TcpListener, TcpStream},
    thread::{self, JoinHandle},
    time::Duration,
};

use thin_openai::transport::{Headers, Method, Transport, TransportError};

/// What the server saw of one request.
struct Recorded {
    head: String,
    body: Vec<u8>,
}

impl Recorded {
    fn request_line(&self) -> &str {
        self.head.lines().next().unwrap_or_default()
    }

    fn header(&self, name: &str) -> Option<&str> {
        self.head.lines().skip(1).find_map(|line| {
            let (key, value) = line.split_once(':')?;
            key.eq_ignore_ascii_case(name).then(|| value.trim())
        })
    }
}

/// Accepts one connection per reply, answers each with the reply's pieces
/// (pausing between them) and then hangs up.
fn serve(replies: Vec<Vec<Vec<u8>>>) -> (String, JoinHandle<Vec<Recorded>>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();

    let handle = thread::spawn(move || {
        let mut recorded = Vec::new();
        for pieces in replies {
            let (mut stream, _) = listener.accept().unwrap();
            recorded.push(read_request(&mut stream));
            for piece in pieces {
                stream.write_all(&piece).unwrap();
                stream.flush().unwrap();
                thread::sleep(Duration::from_millis(20));
            }
        }
        recorded
    });

    (format!("http://{addr}"), handle)
}

fn read_request(stream: &mut TcpStream) -> Recorded {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    let head_end = loop {
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
        let read = stream.read(&mut chunk).unwrap();
        assert!(read > 0, "client hung up before finishing its request");
        buf.extend_from_slice(&chunk[..read]);
    };

    let head = String::from_utf8(buf[..head_end].to_vec()).unwrap();
    let mut body = buf[head_end..].to_vec();
    let recorded = Recorded {
        head,
        body: Vec::new(),
    };
    let content_length: usize = recorded
        .header("content-length")
        .map(|len| len.parse().unwrap())
        .unwrap_or(0);
    while body.len() < content_length {
        let read = stream.read(&mut chunk).unwrap();
        assert!(read > 0, "client hung up mid-body");
        body.extend_from_slice(&chunk[..read]);
    }

    Recorded { body, ..recorded }
}

fn whole(status: &str, body: &str) -> Vec<Vec<u8>> {
    vec![format!(
        "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    )
    .into_bytes()]
}

fn chunked(chunks: &[&str]) -> Vec<Vec<u8>> {
    let mut pieces =
        vec![b"HTTP/1.1 200 OK\r\nTransfer-Encoding: chunked\r\nConnection: close\r\n\r\n".to_vec()];
    for chunk in chunks {
        pieces.push(format!("{:x}\r\n{chunk}\r\n", chunk.len()).into_bytes());
    }
    pieces.push(b"0\r\n\r\n".to_vec());
    pieces
}

#[test]
fn chat_completion_body_comes_back_byte_for_byte() {
    let reply = r#"{"id":"1","object":"chat.completion","created":0,"model":"x","choices":[],"usage":{}}"#;
    let (base, server) = serve(vec![whole("200 OK", reply)]);
    let transport = Transport::open().unwrap();

    let mut headers = Headers::new();
    headers.insert("Authorization".to_string(), "Bearer k".to_string());
    let response = transport
        .request(
            Method::Post,
            &format!("{base}/v1/chat/completions"),
            br#"{"model":"x"}"#,
            &headers,
        )
        .unwrap();

    assert_eq!(response.status_code, 200);
    assert_eq!(response.body, reply.as_bytes());

    let seen = server.join().unwrap();
    assert_eq!(seen[0].request_line(), "POST /v1/chat/completions HTTP/1.1");
    assert_eq!(seen[0].header("authorization"), Some("Bearer k"));
    assert_eq!(seen[0].header("content-length"), Some("13"));
    assert_eq!(seen[0].body, br#"{"model":"x"}"#);
}

#[test]
fn chunked_body_is_concatenated() {
    let (base, server) = serve(vec![chunked(&["{\"data\":", "[1,2,", "3]}"])]);
    let transport = Transport::open().unwrap();

    let response = transport
        .request(Method::Get, &format!("{base}/v1/models?limit=3"), b"", &Headers::new())
        .unwrap();

    assert_eq!(response.status_code, 200);
    assert_eq!(response.text(), r#"{"data":[1,2,3]}"#);

    let seen = server.join().unwrap();
    assert_eq!(seen[0].request_line(), "GET /v1/models?limit=3 HTTP/1.1");
    assert!(seen[0].body.is_empty());
}

#[test]
fn error_statuses_are_ordinary_responses() {
    let (base, server) = serve(vec![whole("404 Not Found", r#"{"error":"nope"}"#)]);
    let transport = Transport::open().unwrap();

    let response = transport
        .request(Method::Delete, &format!("{base}/v1/files/abc"), b"", &Headers::new())
        .unwrap();

    assert_eq!(response.status_code, 404);
    assert_eq!(response.text(), r#"{"error":"nope"}"#);
    assert_eq!(
        server.join().unwrap()[0].request_line(),
        "DELETE /v1/files/abc HTTP/1.1"
    );
}

#[test]
fn same_get_twice_gives_the_same_result() {
    let reply = r#"{"object":"list","data":[]}"#;
    let (base, server) = serve(vec![whole("200 OK", reply), whole("200 OK", reply)]);
    let transport = Transport::open().unwrap();
    let url = format!("{base}/v1/models");

    let first = transport.request(Method::Get, &url, b"", &Headers::new()).unwrap();
    let second = transport.request(Method::Get, &url, b"", &Headers::new()).unwrap();

    assert_eq!(first, second);
    // one accepted connection per call
    assert_eq!(server.join().unwrap().len(), 2);
}

#[test]
fn hang_up_mid_body_returns_what_arrived() {
    let pieces = vec![
        b"HTTP/1.1 200 OK\r\nContent-Length: 100\r\nConnection: close\r\n\r\n".to_vec(),
        b"partial".to_vec(),
    ];
    let (base, server) = serve(vec![pieces]);
    let transport = Transport::open().unwrap();

    let response = transport
        .request(Method::Get, &format!("{base}/v1/slow"), b"", &Headers::new())
        .unwrap();

    assert_eq!(response.status_code, 200);
    assert_eq!(response.body, b"partial");
    server.join().unwrap();
}

#[test]
fn hang_up_before_status_line_is_a_receive_error() {
    // the server reads the whole request, then closes without a byte of reply
    let (base, server) = serve(vec![vec![]]);
    let transport = Transport::open().unwrap();

    let err = transport
        .request(Method::Post, &format!("{base}/v1/embeddings"), b"{}", &Headers::new())
        .unwrap_err();

    assert!(matches!(err, TransportError::Receive(_)), "{err:?}");
    assert_eq!(server.join().unwrap()[0].body, b"{}");
}

#[test]
fn garbage_instead_of_status_line_is_a_receive_error() {
    let (base, server) = serve(vec![vec![b"NOT HTTP AT ALL\r\n\r\n".to_vec()]]);
    let transport = Transport::open().unwrap();

    let err = transport
        .request(Method::Get, &format!("{base}/v1/models"), b"", &Headers::new())
        .unwrap_err();

    assert!(matches!(err, TransportError::Receive(_)), "{err:?}");
    server.join().unwrap();
}

#[test]
fn malformed_headers_are_skipped_and_the_rest_are_sent() {
    let (base, server) = serve(vec![whole("200 OK", "{}")]);
    let transport = Transport::open().unwrap();

    let mut headers = Headers::new();
    headers.insert("Bad Header".to_string(), "x".to_string());
    headers.insert("X-Bad-Value".to_string(), "line\nbreak".to_string());
    headers.insert("X-Ok".to_string(), "1".to_string());
    let response = transport
        .request(Method::Get, &format!("{base}/v1/models"), b"", &headers)
        .unwrap();

    assert_eq!(response.status_code, 200);
    let seen = server.join().unwrap();
    assert_eq!(seen[0].header("x-ok"), Some("1"));
    assert_eq!(seen[0].header("bad header"), None);
    assert_eq!(seen[0].header("x-bad-value"), None);
}

#[test]
fn refused_connection_is_a_connection_error() {
    let port = {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let transport = Transport::open().unwrap();

    let err = transport
        .request(Method::Get, &format!("http://127.0.0.1:{port}/"), b"", &Headers::new())
        .unwrap_err();

    assert!(matches!(err, TransportError::Connection(_)), "{err:?}");
}

#[test]
fn unsupported_scheme_is_rejected_up_front() {
    let transport = Transport::open().unwrap();

    let err = transport
        .request(Method::Get, "ftp://127.0.0.1/file", b"", &Headers::new())
        .unwrap_err();

    assert!(matches!(err, TransportError::UrlParse { .. }));
}

#[test]
fn closed_transport_refuses_requests() {
    let mut transport = Transport::open().unwrap();
    transport.close();
    transport.close();

    let err = transport
        .request(Method::Get, "http://127.0.0.1:9/", b"", &Headers::new())
        .unwrap_err();

    assert!(matches!(err, TransportError::SessionClosed));
}
