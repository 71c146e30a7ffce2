//! Structured dump of a failed exchange.

use std::fmt;

use super::types::{HttpRequest, HttpResponse};
use super::AUTHORIZATION;

/// Bodies longer than this are truncated in the dump.
const MAX_BODY_CHARS: usize = 4096;

/// A request together with the response it produced.
///
/// The `Display` output lists method, URI, headers and body of the request
/// followed by status, reason, headers and body of the response.
/// Authorization values are never printed.
#[derive(Debug, Clone, PartialEq)]
pub struct Exchange {
    pub request: HttpRequest,
    pub response: HttpResponse,
}

impl Exchange {
    pub fn new(request: HttpRequest, response: HttpResponse) -> Self {
        Self { request, response }
    }
}

impl fmt::Display for Exchange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Request:")?;
        writeln!(f, "  {} {}", self.request.method, self.request.url)?;
        write_headers(f, &self.request.headers)?;
        write_body(f, &self.request.body_text())?;

        writeln!(f, "Response:")?;
        writeln!(
            f,
            "  {} {}",
            self.response.status.as_u16(),
            self.response.reason()
        )?;
        write_headers(f, &self.response.headers)?;
        write_body(f, &self.response.body_text())
    }
}

fn write_headers(f: &mut fmt::Formatter<'_>, headers: &[(String, String)]) -> fmt::Result {
    for (name, value) in headers {
        if name.eq_ignore_ascii_case(AUTHORIZATION) {
            writeln!(f, "  {}: <redacted>", name)?;
        } else {
            writeln!(f, "  {}: {}", name, value)?;
        }
    }
    Ok(())
}

fn write_body(f: &mut fmt::Formatter<'_>, body: &str) -> fmt::Result {
    if body.is_empty() {
        return Ok(());
    }
    writeln!(f)?;
    match body.char_indices().nth(MAX_BODY_CHARS) {
        Some((cut, _)) => writeln!(f, "  {}... ({} bytes total)", &body[..cut], body.len()),
        None => writeln!(f, "  {}", body),
    }
}
