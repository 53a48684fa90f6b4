use std::time::Duration;

use tokio::net::TcpStream;

const PROBE_TIMEOUT: Duration = Duration::from_secs(1);

/// Whether something already accepts connections on `localhost:{port}`.
///
/// A refused or timed-out connect counts as free.
pub async fn is_port_in_use(port: u16) -> bool {
    matches!(
        tokio::time::timeout(PROBE_TIMEOUT, TcpStream::connect(("localhost", port))).await,
        Ok(Ok(_))
    )
}
