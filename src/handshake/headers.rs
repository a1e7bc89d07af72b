//! Parsing raw HTTP bytes into `http` containers.
//!
//! The engine itself only ever sees parsed requests and responses; these
//! helpers exist for callers that hold un-parsed handshake traffic, for
//! example a server that reads the upgrade request straight off the socket.

use http::header::{HeaderMap, HeaderName, HeaderValue};
use http::{Request, Response, StatusCode, Version};
use httparse::Status;

use crate::error::{Error, ProtocolError, Result};

/// Limit the number of header lines.
const MAX_HEADERS: usize = 124;

/// Reads an HTTP message out of a buffer that may hold only part of it.
pub trait TryParse: Sized {
    /// Returns the parsed message and its length in bytes, or `None` when
    /// the buffer does not yet hold a complete message.
    fn try_parse(buf: &[u8]) -> Result<Option<(usize, Self)>>;
}

trait FromHttparse<T>: Sized {
    fn from_httparse(raw: T) -> Result<Self>;
}

impl TryParse for Request<()> {
    fn try_parse(buf: &[u8]) -> Result<Option<(usize, Self)>> {
        let mut hbuffer = [httparse::EMPTY_HEADER; MAX_HEADERS];
        let mut req = httparse::Request::new(&mut hbuffer);
        Ok(match req.parse(buf)? {
            Status::Partial => None,
            Status::Complete(size) => Some((size, Request::from_httparse(req)?)),
        })
    }
}

impl TryParse for Response<()> {
    fn try_parse(buf: &[u8]) -> Result<Option<(usize, Self)>> {
        let mut hbuffer = [httparse::EMPTY_HEADER; MAX_HEADERS];
        let mut resp = httparse::Response::new(&mut hbuffer);
        Ok(match resp.parse(buf)? {
            Status::Partial => None,
            Status::Complete(size) => Some((size, Response::from_httparse(resp)?)),
        })
    }
}

impl<'h, 'b: 'h> FromHttparse<httparse::Request<'h, 'b>> for Request<()> {
    fn from_httparse(raw: httparse::Request<'h, 'b>) -> Result<Self> {
        if raw.version.expect("Bug: no HTTP version") < /*1.*/ 1 {
            return Err(Error::Protocol(ProtocolError::WrongHttpVersion));
        }

        let mut request = Request::new(());
        *request.method_mut() = raw
            .method
            .expect("Bug: no method in header")
            .parse()
            .map_err(|_| Error::Protocol(ProtocolError::MalformedHttpMessage))?;
        *request.uri_mut() = raw
            .path
            .expect("Bug: no path in header")
            .parse()
            .map_err(|_| Error::Protocol(ProtocolError::MalformedHttpMessage))?;
        *request.version_mut() = Version::HTTP_11;
        *request.headers_mut() = HeaderMap::from_httparse(raw.headers)?;
        Ok(request)
    }
}

impl<'h, 'b: 'h> FromHttparse<httparse::Response<'h, 'b>> for Response<()> {
    fn from_httparse(raw: httparse::Response<'h, 'b>) -> Result<Self> {
        if raw.version.expect("Bug: no HTTP version") < /*1.*/ 1 {
            return Err(Error::Protocol(ProtocolError::WrongHttpVersion));
        }

        let mut response = Response::new(());
        *response.status_mut() = StatusCode::from_u16(raw.code.expect("Bug: no status code"))
            .map_err(|_| Error::Protocol(ProtocolError::MalformedHttpMessage))?;
        *response.version_mut() = Version::HTTP_11;
        *response.headers_mut() = HeaderMap::from_httparse(raw.headers)?;
        Ok(response)
    }
}

impl<'h, 'b: 'h> FromHttparse<&'b [httparse::Header<'h>]> for HeaderMap {
    fn from_httparse(raw: &'b [httparse::Header<'h>]) -> Result<Self> {
        let mut headers = HeaderMap::new();
        for header in raw {
            let name = HeaderName::from_bytes(header.name.as_bytes())
                .map_err(|_| Error::Protocol(ProtocolError::MalformedHttpMessage))?;
            let value = HeaderValue::from_bytes(header.value)
                .map_err(|_| Error::Protocol(ProtocolError::MalformedHttpMessage))?;
            headers.append(name, value);
        }
        Ok(headers)
    }
}
