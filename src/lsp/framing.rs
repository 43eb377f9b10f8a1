//! Content-Length framing (splitting a byte stream into frames).
//!
//! ```text
//! Content-Length: <n>\r\n
//! \r\n
//! <n bytes of JSON>
//! ```
use crate::lsp::error::FramingError;
use tracing::trace;

pub const SEPARATOR: &[u8] = b"\r\n\r\n";
pub const CONTENT_LENGTH: &str = "Content-Length: ";

/// Result of one attempt to cut a frame off the front of a buffer.
#[derive(Debug, PartialEq, Eq)]
pub enum Split<'a> {
    /// No complete frame yet. Nothing was consumed.
    NeedMore,
    /// `frame` is `buffer[..advance]`; `body` is its payload.
    Frame {
        advance: usize,
        frame: &'a [u8],
        body: &'a [u8],
    },
}

/// Largest body accepted; a bigger declared length is treated as a bad header.
pub const MAX_CONTENT_LENGTH: usize = 64 * 1024 * 1024;

const HEADER_NAME: &str = "content-length:";

/// Try to take exactly one frame from the start of `buffer`.
///
/// `at_eof` says the stream has ended. It never turns an incomplete frame
/// into an error; the caller decides what a dangling partial frame means.
pub fn split(buffer: &[u8], at_eof: bool) -> Result<Split<'_>, FramingError> {
    let Some(header_end) = find_separator(buffer) else {
        return Ok(need_more(buffer, at_eof));
    };
    let body_start = header_end + SEPARATOR.len();
    let length = content_length(&buffer[..header_end], body_start)?;
    if length > MAX_CONTENT_LENGTH {
        return Err(FramingError::TooLarge {
            length,
            discard: body_start,
        });
    }

    let advance = body_start + length;
    if buffer.len() < advance {
        return Ok(need_more(buffer, at_eof));
    }

    Ok(Split::Frame {
        advance,
        frame: &buffer[..advance],
        body: &buffer[body_start..advance],
    })
}

fn need_more(buffer: &[u8], at_eof: bool) -> Split<'_> {
    if at_eof && !buffer.is_empty() {
        trace!(pending = buffer.len(), "stream ended before a complete frame");
    }
    Split::NeedMore
}

fn find_separator(buffer: &[u8]) -> Option<usize> {
    buffer
        .windows(SEPARATOR.len())
        .position(|window| window == SEPARATOR)
}

/// Extract Content-Length from the header section, ignoring case. Other
/// header lines (e.g. Content-Type) are ignored.
fn content_length(header: &[u8], discard: usize) -> Result<usize, FramingError> {
    let header = String::from_utf8_lossy(header);
    for line in header.split("\r\n") {
        if let Some(value) = length_value(line) {
            return value
                .parse::<usize>()
                .map_err(|source| FramingError::InvalidContentLength {
                    value: value.to_string(),
                    discard,
                    source,
                });
        }
    }
    Err(FramingError::MissingContentLength {
        header: header.into_owned(),
        discard,
    })
}

/// The value of a Content-Length header on `line`. The name may follow
/// bytes left over from a dropped frame, but not another header-name
/// character (so `X-Content-Length` does not count).
fn length_value(line: &str) -> Option<&str> {
    let lower = line.to_ascii_lowercase();
    lower
        .match_indices(HEADER_NAME)
        .map(|(pos, _)| pos)
        .find(|&pos| {
            line[..pos]
                .chars()
                .next_back()
                .map_or(true, |c| !is_token_char(c))
        })
        .map(|pos| line[pos + HEADER_NAME.len()..].trim())
}

fn is_token_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}
