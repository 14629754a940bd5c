//! Shared HTTP plumbing for host adapters.

use exmb_error::{HostError, HostErrorKind, HostResult};
use reqwest::{Client, Response, StatusCode};

/// Build the client shared by every adapter.
pub fn build_client(user_agent: &str) -> HostResult<Client> {
    Client::builder()
        .user_agent(user_agent)
        .gzip(true)
        .build()
        .map_err(|e| HostError::new(HostErrorKind::Transport(format!("Failed to build HTTP client: {}", e))))
}

pub(crate) fn transport(e: reqwest::Error) -> HostError {
    HostError::new(HostErrorKind::Transport(format!("Request failed: {}", e)))
}

pub(crate) fn decode(e: impl std::fmt::Display) -> HostError {
    HostError::new(HostErrorKind::UnexpectedResponse {
        status: 200,
        message: format!("Failed to parse response: {}", e),
    })
}

/// Fail on non-success statuses, keeping the body as the message and in the debug log.
pub(crate) async fn ensure_success(response: Response) -> HostResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message = response.text().await.unwrap_or_default();
    tracing::debug!(status = status.as_u16(), body = %message, "Host returned error status");
    Err(HostError::new(match status {
        StatusCode::NOT_FOUND => HostErrorKind::NotFound(message),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            HostErrorKind::Transport(format!("Authorization failed ({}): {}", status.as_u16(), message))
        }
        _ => HostErrorKind::UnexpectedResponse {
            status: status.as_u16(),
            message,
        },
    }))
}

/// Strip `prefix`, then an optional `embed` segment, and cut at the first `/`, `?` or `#`.
pub(crate) fn path_id<'a>(url: &'a str, prefix: &str, embed: &[&str]) -> Option<&'a str> {
    let mut rest = url.strip_prefix(prefix)?;
    for segment in embed {
        if let Some(stripped) = rest.strip_prefix(segment) {
            rest = stripped;
            break;
        }
    }
    let id = rest.split(['/', '?', '#']).next().unwrap_or_default();
    (!id.is_empty()).then_some(id)
}
