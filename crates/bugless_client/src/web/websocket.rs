use bugless_common::codec::encode_frame;
use bugless_common::{GetIssuesRequest, IssuesChunk};
use futures::stream::{self, StreamExt};
use futures::{future, SinkExt};
use log::{debug, warn};
use ws_stream_wasm::{WsErr, WsMessage, WsMeta, WsStream};

use crate::error::RpcError;
use crate::traits::{RpcStub, TransportStream};
use crate::transport::frame_stream;

fn ws_error(context: &str, error: WsErr) -> RpcError {
    RpcError::Transport(format!("{}: {}", context, error))
}

/// `GetIssues` over a WebSocket, one socket per call.
///
/// The socket is opened when the stream is first polled. The request goes
/// out as a single binary message once the socket is open; every binary
/// message after that is fed to [`frame_stream`]. Dropping the stream closes
/// the socket.
#[derive(Clone, Debug)]
pub struct WebSocketStub {
    url: String,
}

impl WebSocketStub {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl RpcStub for WebSocketStub {
    type Request = GetIssuesRequest;
    type Response = IssuesChunk;

    fn open_stream(&self, request: GetIssuesRequest) -> TransportStream<IssuesChunk> {
        let bytes = stream::once(connect(self.url.clone(), request)).flat_map(|socket| match socket {
            Ok(socket) => socket
                .filter_map(|message| {
                    future::ready(match message {
                        WsMessage::Binary(bytes) => Some(Ok(bytes)),
                        WsMessage::Text(_) => {
                            warn!("[WebSocketStub] ignoring text message");
                            None
                        }
                    })
                })
                .boxed_local(),
            Err(error) => stream::iter([Err(error)]).boxed_local(),
        });
        frame_stream(bytes)
    }
}

/// Opens the socket and sends the request frame.
async fn connect(url: String, request: GetIssuesRequest) -> Result<WsStream, RpcError> {
    let frame = encode_frame(&request)?;
    debug!("[WebSocketStub] connecting to {}", url);

    // Dropping the WsStream closes the socket
    let (_meta, mut socket) = WsMeta::connect(&url, None)
        .await
        .map_err(|e| ws_error("could not connect", e))?;

    debug!("[WebSocketStub] sending {} byte request", frame.len());
    socket
        .send(WsMessage::Binary(frame))
        .await
        .map_err(|e| ws_error("could not send request", e))?;
    Ok(socket)
}
