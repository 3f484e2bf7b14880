use std::sync::Arc;

use futures_util::StreamExt;
use reqwest::{Client, Request, Response};
use tokio::sync::broadcast::error::TryRecvError;
use tokio::sync::mpsc;
use tokio::time::Instant;

use crate::cancel::CancelReceiver;
use crate::metrics::{ErrorEvent, Sample};

/// Approximate bytes of a response status line ("HTTP/1.1 200 OK\r\n").
const STATUS_LINE_BYTES: u64 = 17;
/// Per-header overhead: ": " plus the trailing CRLF.
const HEADER_SEPARATOR_BYTES: u64 = 4;

/// One load-generating loop. Checks the cancellation signal at the top of
/// every iteration, performs one timed exchange, and emits the outcome. A
/// failed exchange never ends the loop; a closed output channel does.
pub(super) async fn worker_loop(
    client: Client,
    template: Arc<Request>,
    mut cancel_rx: CancelReceiver,
    sample_tx: mpsc::Sender<Sample>,
    error_tx: mpsc::Sender<ErrorEvent>,
) {
    loop {
        match cancel_rx.try_recv() {
            Err(TryRecvError::Empty) => {}
            Ok(()) | Err(TryRecvError::Closed | TryRecvError::Lagged(_)) => break,
        }

        match exchange(&client, &template).await {
            Ok(sample) => {
                if sample_tx.send(sample).await.is_err() {
                    break;
                }
            }
            Err(event) => {
                if error_tx.send(event).await.is_err() {
                    break;
                }
            }
        }
    }
}

/// One request/response exchange, timed from send to fully-drained body.
async fn exchange(client: &Client, template: &Request) -> Result<Sample, ErrorEvent> {
    let Some(request) = template.try_clone() else {
        return Err(ErrorEvent::Other("request template is not cloneable".to_owned()));
    };

    let start = Instant::now();
    let response = client.execute(request).await.map_err(classify)?;
    let status = response.status().as_u16();
    let header_bytes = header_size(&response);
    let body_bytes = drain_body(response).await.map_err(classify)?;
    let latency_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);

    Ok(Sample {
        status,
        latency_ms,
        size_bytes: header_bytes.saturating_add(body_bytes),
    })
}

fn classify(err: reqwest::Error) -> ErrorEvent {
    if err.is_timeout() {
        ErrorEvent::Timeout
    } else {
        ErrorEvent::Other(err.to_string())
    }
}

/// Reconstructed wire size of the response head. The client does not expose
/// raw header bytes, so this tracks `name: value\r\n` per header plus the
/// status line.
fn header_size(response: &Response) -> u64 {
    let mut size = STATUS_LINE_BYTES;
    for (name, value) in response.headers() {
        let name_bytes = u64::try_from(name.as_str().len()).unwrap_or(u64::MAX);
        let value_bytes = u64::try_from(value.as_bytes().len()).unwrap_or(u64::MAX);
        size = size
            .saturating_add(name_bytes)
            .saturating_add(value_bytes)
            .saturating_add(HEADER_SEPARATOR_BYTES);
    }
    size
}

async fn drain_body(response: Response) -> Result<u64, reqwest::Error> {
    let mut stream = response.bytes_stream();
    let mut total_bytes: u64 = 0;
    while let Some(chunk) = stream.next().await {
        let bytes = chunk?;
        total_bytes = total_bytes.saturating_add(u64::try_from(bytes.len()).unwrap_or(u64::MAX));
    }
    Ok(total_bytes)
}
