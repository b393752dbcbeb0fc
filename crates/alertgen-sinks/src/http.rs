use std::time::Duration;

use alertgen_core::{CoreError, CoreResult, SinkError, SinkResult};
use reqwest::{Client, Response};

/// Builds the HTTP client shared by every request of one sink.
pub(crate) fn build_client(timeout: Duration) -> CoreResult<Client> {
    Client::builder()
        .timeout(timeout)
        .user_agent(concat!("alertgen/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| CoreError::internal(format!("failed to build HTTP client: {e}")))
}

/// Maps a reqwest failure onto the sink error taxonomy.
pub(crate) fn classify(err: reqwest::Error) -> SinkError {
    if err.is_timeout() {
        SinkError::Timeout
    } else {
        SinkError::Transport(err.to_string())
    }
}

/// Turns an error status into [`SinkError::Rejected`].
///
/// The body is only read when `read_body` is set; some providers return
/// nothing useful and reading it would cost another round of I/O.
pub(crate) async fn check_status(response: Response, read_body: bool) -> SinkResult<()> {
    let status = response.status();
    if !status.is_client_error() && !status.is_server_error() {
        return Ok(());
    }

    let body = if read_body {
        response.text().await.map_err(classify)?
    } else {
        String::new()
    };

    Err(SinkError::Rejected {
        status: status.as_u16(),
        body,
    })
}
