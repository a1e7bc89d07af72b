//! Opening-handshake scenarios: client/server header exchange, accept-key
//! derivation, and trailer handling.

use std::cell::RefCell;
use std::rc::Rc;

use http::header::HeaderValue;
use http::{Method, Request, Response};
use sha1::{Digest, Sha1};
use websock::handshake::headers::TryParse;
use websock::{Connection, Error, WebSocket};

#[derive(Default)]
struct MockState {
    sent: Vec<u8>,
    broken: Option<bool>,
}

struct MockConnection(Rc<RefCell<MockState>>);

impl MockConnection {
    fn create() -> (Box<MockConnection>, Rc<RefCell<MockState>>) {
        let state = Rc::new(RefCell::new(MockState::default()));
        (Box::new(MockConnection(state.clone())), state)
    }
}

impl Connection for MockConnection {
    fn send_data(&mut self, data: &[u8]) {
        self.0.borrow_mut().sent.extend_from_slice(data);
    }

    fn shutdown(&mut self, clean: bool) {
        self.0.borrow_mut().broken = Some(clean);
    }

    fn peer_id(&self) -> String {
        "mock-peer".to_owned()
    }
}

fn upgrade_request(key: &str) -> Request<()> {
    let mut request = Request::new(());
    *request.method_mut() = Method::GET;
    let headers = request.headers_mut();
    headers.insert("Connection", HeaderValue::from_static("upgrade"));
    headers.insert("Upgrade", HeaderValue::from_static("websocket"));
    headers.insert("Sec-WebSocket-Version", HeaderValue::from_static("13"));
    headers.insert("Sec-WebSocket-Key", HeaderValue::from_str(key).unwrap());
    request
}

#[test]
fn accept_key_derivation() {
    // key that base64-decodes to "abcdefghijklmnop"
    let key = "YWJjZGVmZ2hpamtsbW5vcA==";
    assert_eq!(base64::decode(key).unwrap(), b"abcdefghijklmnop");

    let (connection, _state) = MockConnection::create();
    let mut ws = WebSocket::new();
    let request = upgrade_request(key);
    let mut response = Response::new(());
    ws.open_as_server(connection, &request, &mut response, b"").unwrap();

    let mut sha1 = Sha1::new();
    sha1.update(key.as_bytes());
    sha1.update(b"258EAFA5-E914-47DA-95CA-C5AB0DC85B11");
    let expected = base64::encode(sha1.finalize().as_slice());

    assert_eq!(response.status().as_u16(), 101);
    assert_eq!(
        response.headers().get("Sec-WebSocket-Accept").unwrap(),
        expected.as_str()
    );
    assert_eq!(response.headers().get("Upgrade").unwrap(), "websocket");
    let connection_tokens: Vec<_> = response
        .headers()
        .get_all("Connection")
        .iter()
        .filter_map(|value| value.to_str().ok())
        .collect();
    assert!(connection_tokens.contains(&"upgrade"));
}

#[test]
fn rfc_sample_key_round_trips_between_roles() {
    // client prepares its request
    let mut client = WebSocket::new();
    let mut request = Request::new(());
    *request.method_mut() = Method::GET;
    client.start_open_as_client(&mut request);
    assert_eq!(request.headers().get("Sec-WebSocket-Version").unwrap(), "13");
    assert_eq!(request.headers().get("Upgrade").unwrap(), "websocket");

    // server validates it and produces its reply
    let (server_connection, server_state) = MockConnection::create();
    let mut server = WebSocket::new();
    let mut response = Response::new(());
    server.open_as_server(server_connection, &request, &mut response, b"").unwrap();

    // client accepts the reply
    let (client_connection, client_state) = MockConnection::create();
    client.complete_open_as_client(client_connection, &response).unwrap();

    // the session works end to end: client ping, server auto-pong
    let pongs = Rc::new(RefCell::new(Vec::new()));
    let sink = pongs.clone();
    client.set_pong_handler(move |data| sink.borrow_mut().push(data.to_vec()));

    client.ping(b"hi");
    let client_out = client_state.borrow().sent.clone();
    server.on_data_received(&client_out);
    let server_out = server_state.borrow().sent.clone();
    client.on_data_received(&server_out);

    assert_eq!(*pongs.borrow(), vec![b"hi".to_vec()]);
}

#[test]
fn client_rejects_tampered_accept() {
    let mut client = WebSocket::new();
    let mut request = Request::new(());
    *request.method_mut() = Method::GET;
    client.start_open_as_client(&mut request);

    let (server_connection, _state) = MockConnection::create();
    let mut server = WebSocket::new();
    let mut response = Response::new(());
    server.open_as_server(server_connection, &request, &mut response, b"").unwrap();

    response
        .headers_mut()
        .insert("Sec-WebSocket-Accept", HeaderValue::from_static("bm9wZQ=="));

    let (client_connection, state) = MockConnection::create();
    let result = client.complete_open_as_client(client_connection, &response);
    assert!(matches!(result, Err(Error::Protocol(_))));
    // a failed handshake emits nothing
    assert!(state.borrow().sent.is_empty());
}

#[test]
fn client_surfaces_http_error_status() {
    let mut client = WebSocket::new();
    let mut request = Request::new(());
    *request.method_mut() = Method::GET;
    client.start_open_as_client(&mut request);

    let mut response = Response::new(());
    *response.status_mut() = http::StatusCode::FORBIDDEN;

    let (client_connection, _state) = MockConnection::create();
    assert!(matches!(
        client.complete_open_as_client(client_connection, &response),
        Err(Error::Http(403))
    ));
}

#[test]
fn server_rejects_bad_request_and_leaves_response_untouched() {
    let mut request = upgrade_request("dGhlIHNhbXBsZSBub25jZQ==");
    request
        .headers_mut()
        .insert("Sec-WebSocket-Version", HeaderValue::from_static("8"));

    let (connection, state) = MockConnection::create();
    let mut ws = WebSocket::new();
    let mut response = Response::new(());
    assert!(ws.open_as_server(connection, &request, &mut response, b"").is_err());
    assert_eq!(response.status().as_u16(), 200);
    assert!(response.headers().get("Sec-WebSocket-Accept").is_none());
    assert!(state.borrow().sent.is_empty());
}

#[test]
fn trailer_bytes_are_processed_as_frames() {
    let request = upgrade_request("dGhlIHNhbXBsZSBub25jZQ==");

    // a masked ping that arrived in the same segment as the request
    let key = [0x01u8, 0x02, 0x03, 0x04];
    let mut trailer = vec![0x89, 0x82];
    trailer.extend_from_slice(&key);
    trailer.extend(b"hi".iter().enumerate().map(|(i, byte)| byte ^ key[i % 4]));

    let (connection, state) = MockConnection::create();
    let mut ws = WebSocket::new();
    let pings = Rc::new(RefCell::new(Vec::new()));
    let sink = pings.clone();
    ws.set_ping_handler(move |data| sink.borrow_mut().push(data.to_vec()));

    let mut response = Response::new(());
    ws.open_as_server(connection, &request, &mut response, &trailer).unwrap();

    assert_eq!(*pings.borrow(), vec![b"hi".to_vec()]);
    assert_eq!(state.borrow().sent, vec![0x8A, 0x02, b'h', b'i']);
}

#[test]
fn raw_request_bytes_parse_into_containers() {
    const DATA: &[u8] = b"\
        GET /chat HTTP/1.1\r\n\
        Host: example.com\r\n\
        Connection: Upgrade\r\n\
        Upgrade: websocket\r\n\
        Sec-WebSocket-Version: 13\r\n\
        Sec-WebSocket-Key: dGhlIHNhbXBsZSBub25jZQ==\r\n\
        \r\n";
    let (size, request) = Request::try_parse(DATA).unwrap().unwrap();
    assert_eq!(size, DATA.len());

    let (connection, _state) = MockConnection::create();
    let mut ws = WebSocket::new();
    let mut response = Response::new(());
    ws.open_as_server(connection, &request, &mut response, b"").unwrap();

    assert_eq!(
        response.headers().get("Sec-WebSocket-Accept").unwrap(),
        "s3pPLMBiTxaQ9kYGzzhZRbK+xOo="
    );
}
