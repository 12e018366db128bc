//! Line formats for each category
//!
//! Every line is a tab-separated record starting with a local timestamp,
//! except `stat` lines which are persisted exactly as given.

use chrono::{DateTime, Local};

use crate::request_ip::RequestContext;

/// Timestamp layout at the head of each line
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Characters that would break the tab-separated layout, replaced by `+`
const TRIMMED_CHARS: [char; 5] = [' ', '\u{3000}', '\n', '\r', '\t'];

/// Replace whitespace and separators with `+` so free text stays in one field
pub fn all_trim(s: &str) -> String {
    s.chars()
        .map(|c| if TRIMMED_CHARS.contains(&c) { '+' } else { c })
        .collect()
}

pub fn timestamp(now: &DateTime<Local>) -> String {
    now.format(TIMESTAMP_FORMAT).to_string()
}

/// `ts \t msg \t client_ip \t uri`
pub fn access_line(now: &DateTime<Local>, msg: &str, request: &RequestContext<'_>) -> String {
    [
        timestamp(now),
        msg.to_string(),
        request.client_ip(),
        request.uri.to_string(),
    ]
    .join("\t")
}

/// `ts \t exception \t desc \t client_ip \t uri \t server`
///
/// Used for error, warning and notice lines. `desc` goes through
/// [`all_trim`]; request fields are empty without a request.
pub fn event_line(
    now: &DateTime<Local>,
    exception: &str,
    desc: &str,
    request: Option<&RequestContext<'_>>,
    server_ip: &str,
) -> String {
    let (client_ip, uri) = match request {
        Some(request) => (request.client_ip(), request.uri.to_string()),
        None => (String::new(), String::new()),
    };

    [
        timestamp(now),
        exception.to_string(),
        all_trim(desc),
        client_ip,
        uri,
        server_ip.to_string(),
    ]
    .join("\t")
}

/// `ts \t msg`, used for record and debug lines
pub fn timestamped_line(now: &DateTime<Local>, msg: &str) -> String {
    format!("{}\t{}", timestamp(now), msg)
}
