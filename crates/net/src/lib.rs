//! URL-backed text source: fetch a document over HTTP(S) and hand it to the
//! scanner as an in-memory character source.
//!
//! The fetch is blocking and strictly sequential, matching the scanner's
//! resource model. Bodies are decoded as UTF-8 (lossily, with
//! chunk-boundary carry) and capped at [`MAX_BODY_BYTES`].

use std::fmt;
use std::io::Read;
use std::time::Duration;

use memchr::{memchr, memchr2};
use scan::StringSource;
use tools::Utf8Accumulator;

/// Hard cap on fetched body size.
pub const MAX_BODY_BYTES: u64 = 8 * 1024 * 1024;

const FETCH_TIMEOUT: Duration = Duration::from_secs(10);
const USER_AGENT: &str = "tagwalk/0.1";

/// A fetched document, decoded to text.
#[derive(Debug)]
pub struct FetchedText {
    /// What the caller asked for.
    pub requested_url: String,
    /// Final URL after redirects.
    pub url: String,
    pub status: u16,
    pub content_type: Option<String>,
    pub text: String,
}

impl FetchedText {
    /// Hand the body to the scanner.
    pub fn into_source(self) -> StringSource {
        StringSource::new(self.text)
    }

    /// True when the response advertised a markup content type.
    pub fn is_markup(&self) -> bool {
        self.content_type
            .as_deref()
            .is_some_and(content_type_is_markup)
    }
}

#[derive(Debug)]
pub enum FetchError {
    /// Connection, TLS, or protocol failure.
    Transport(String),
    /// The server answered with a non-success status.
    Status { status: u16, url: String },
    /// The body could not be read to completion.
    Read(std::io::Error),
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchError::Transport(message) => write!(f, "fetch failed: {message}"),
            FetchError::Status { status, url } => {
                write!(f, "server returned status {status} for {url}")
            }
            FetchError::Read(err) => write!(f, "failed to read response body: {err}"),
        }
    }
}

impl std::error::Error for FetchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FetchError::Read(err) => Some(err),
            _ => None,
        }
    }
}

/// Fetch `url` and decode its body to text.
pub fn fetch_text(url: &str) -> Result<FetchedText, FetchError> {
    let start = std::time::Instant::now();
    let agent = ureq::AgentBuilder::new()
        .timeout(FETCH_TIMEOUT)
        .user_agent(USER_AGENT)
        .build();
    let response = match agent.get(url).call() {
        Ok(response) => response,
        Err(ureq::Error::Status(status, response)) => {
            return Err(FetchError::Status {
                status,
                url: response.get_url().to_string(),
            });
        }
        Err(ureq::Error::Transport(transport)) => {
            return Err(FetchError::Transport(transport.to_string()));
        }
    };

    let final_url = response.get_url().to_string();
    let status = response.status();
    let content_type = response.header("content-type").map(str::to_string);

    let mut reader = response.into_reader().take(MAX_BODY_BYTES);
    let mut decoder = Utf8Accumulator::new();
    let mut text = String::new();
    let mut chunk = [0u8; 8 * 1024];
    loop {
        let read = reader.read(&mut chunk).map_err(FetchError::Read)?;
        if read == 0 {
            break;
        }
        decoder.push(&chunk[..read], &mut text);
    }
    decoder.finish(&mut text);

    log::debug!(
        target: "net.fetch",
        "fetched {final_url} status={status} bytes={} in {:?}",
        text.len(),
        start.elapsed()
    );
    Ok(FetchedText {
        requested_url: url.to_string(),
        url: final_url,
        status,
        content_type,
        text,
    })
}

/// Does a `Content-Type` header value name a markup document?
pub fn content_type_is_markup(value: &str) -> bool {
    contains_ignore_ascii_case(value, b"text/html")
        || contains_ignore_ascii_case(value, b"application/xhtml")
        || contains_ignore_ascii_case(value, b"text/xml")
}

fn contains_ignore_ascii_case(haystack: &str, needle: &[u8]) -> bool {
    let hay = haystack.as_bytes();
    let n = needle.len();
    if n == 0 {
        return true;
    }
    if hay.len() < n {
        return false;
    }
    let first = needle[0];
    let (lower, upper) = if first.is_ascii_alphabetic() {
        (first.to_ascii_lowercase(), first.to_ascii_uppercase())
    } else {
        (first, first)
    };
    let mut i = 0;
    while i + n <= hay.len() {
        let rel = if lower == upper {
            memchr(lower, &hay[i..])
        } else {
            memchr2(lower, upper, &hay[i..])
        };
        let Some(rel) = rel else {
            return false;
        };
        let pos = i + rel;
        if pos + n <= hay.len() && hay[pos..pos + n].eq_ignore_ascii_case(needle) {
            return true;
        }
        i = pos + 1;
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn markup_content_types_are_recognized() {
        assert!(content_type_is_markup("text/html"));
        assert!(content_type_is_markup("Text/HTML; charset=utf-8"));
        assert!(content_type_is_markup("application/xhtml+xml"));
        assert!(content_type_is_markup("text/xml"));
        assert!(!content_type_is_markup("application/json"));
        assert!(!content_type_is_markup("text/plain"));
        assert!(!content_type_is_markup(""));
    }

    #[test]
    fn needle_longer_than_haystack_never_matches() {
        assert!(!contains_ignore_ascii_case("x", b"text/html"));
    }

    #[test]
    fn fetched_text_reports_markup_by_header() {
        let fetched = FetchedText {
            requested_url: "http://example/".to_string(),
            url: "http://example/".to_string(),
            status: 200,
            content_type: Some("TEXT/HTML; charset=utf-8".to_string()),
            text: String::new(),
        };
        assert!(fetched.is_markup());
    }

    #[test]
    fn fetch_error_messages_name_the_failure() {
        let status = FetchError::Status {
            status: 404,
            url: "http://example/missing".to_string(),
        };
        assert_eq!(
            status.to_string(),
            "server returned status 404 for http://example/missing"
        );
        let transport = FetchError::Transport("dns failure".to_string());
        assert!(transport.to_string().contains("dns failure"));
    }

    #[test]
    fn into_source_feeds_the_scanner() {
        use scan::Navigator;
        let fetched = FetchedText {
            requested_url: "http://example/".to_string(),
            url: "http://example/".to_string(),
            status: 200,
            content_type: Some("text/html".to_string()),
            text: "<b>ok</b>".to_string(),
        };
        let mut nav = Navigator::new(fetched.into_source());
        let b = nav.descend().expect("scan").expect("expected <b>");
        assert_eq!(b.name(), "b");
    }
}
