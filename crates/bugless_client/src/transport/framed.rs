use std::collections::VecDeque;

use bugless_common::codec::FrameDecoder;
use bugless_common::StreamFrame;
use futures::stream::{self, LocalBoxStream};
use futures::{Stream, StreamExt};
use log::{trace, warn};
use serde::de::DeserializeOwned;

use crate::error::RpcError;
use crate::traits::{StreamMessage, TransportStream};

struct FrameState<T> {
    bytes: LocalBoxStream<'static, Result<Vec<u8>, RpcError>>,
    decoder: FrameDecoder<StreamFrame<T>>,
    ready: VecDeque<StreamFrame<T>>,
    done: bool,
}

/// Turns raw transport chunks into a [`TransportStream`].
///
/// Chunk boundaries do not have to line up with frames. An `End` frame ends
/// the stream; an `Error` frame, a malformed frame or a byte stream that
/// stops before `End` becomes the stream's last item.
pub fn frame_stream<T, B>(bytes: B) -> TransportStream<T>
where
    T: DeserializeOwned + 'static,
    B: Stream<Item = Result<Vec<u8>, RpcError>> + 'static,
{
    let state = FrameState {
        bytes: bytes.boxed_local(),
        decoder: FrameDecoder::new(),
        ready: VecDeque::new(),
        done: false,
    };

    stream::unfold(state, |mut state| async move {
        loop {
            if state.done {
                return None;
            }

            if let Some(frame) = state.ready.pop_front() {
                let item = match frame {
                    StreamFrame::Status(status) => Ok(StreamMessage::Status(status)),
                    StreamFrame::Data(item) => Ok(StreamMessage::Data(item)),
                    StreamFrame::End => {
                        if !state.ready.is_empty() || state.decoder.pending() > 0 {
                            warn!("[frame_stream] ignoring bytes after end of stream");
                        }
                        return None;
                    }
                    StreamFrame::Error(status) => {
                        state.done = true;
                        Err(RpcError::from(status))
                    }
                };
                return Some((item, state));
            }

            match state.bytes.next().await {
                Some(Ok(chunk)) => {
                    trace!("[frame_stream] received {} bytes", chunk.len());
                    match state.decoder.push(&chunk) {
                        Ok(frames) => state.ready.extend(frames),
                        Err(error) => {
                            state.done = true;
                            return Some((Err(RpcError::from(error)), state));
                        }
                    }
                }
                Some(Err(error)) => {
                    state.done = true;
                    return Some((Err(error), state));
                }
                None => {
                    state.done = true;
                    let error = RpcError::Transport(format!(
                        "connection closed before end of stream ({} bytes pending)",
                        state.decoder.pending()
                    ));
                    return Some((Err(error), state));
                }
            }
        }
    })
    .boxed_local()
}

#[cfg(test)]
mod tests {
    use super::*;
    use bugless_common::codec::encode_frame;
    use bugless_common::{RpcStatus, StatusCode};
    use futures::executor::block_on;

    fn chunks(parts: Vec<Vec<u8>>) -> impl Stream<Item = Result<Vec<u8>, RpcError>> {
        stream::iter(parts.into_iter().map(Ok))
    }

    fn frames(frames: &[StreamFrame<u32>]) -> Vec<u8> {
        frames
            .iter()
            .flat_map(|frame| encode_frame(frame).unwrap())
            .collect()
    }

    #[test]
    fn test_frames_split_across_chunks() {
        let bytes = frames(&[
            StreamFrame::Status(RpcStatus::ok()),
            StreamFrame::Data(1),
            StreamFrame::Data(2),
            StreamFrame::End,
        ]);
        let parts = bytes.chunks(3).map(<[u8]>::to_vec).collect();

        let items = block_on(frame_stream::<u32, _>(chunks(parts)).collect::<Vec<_>>());
        assert_eq!(
            items,
            vec![
                Ok(StreamMessage::Status(RpcStatus::ok())),
                Ok(StreamMessage::Data(1)),
                Ok(StreamMessage::Data(2)),
            ]
        );
    }

    #[test]
    fn test_error_frame_is_last_item() {
        let bytes = frames(&[
            StreamFrame::Data(1),
            StreamFrame::Error(RpcStatus::new(StatusCode::InvalidArgument, "bad search")),
            StreamFrame::Data(2),
        ]);

        let items = block_on(frame_stream::<u32, _>(chunks(vec![bytes])).collect::<Vec<_>>());
        assert_eq!(
            items,
            vec![
                Ok(StreamMessage::Data(1)),
                Err(RpcError::Status {
                    code: StatusCode::InvalidArgument,
                    message: "bad search".to_string()
                }),
            ]
        );
    }

    #[test]
    fn test_connection_closed_without_end() {
        let bytes = frames(&[StreamFrame::Data(1)]);
        let items = block_on(frame_stream::<u32, _>(chunks(vec![bytes])).collect::<Vec<_>>());
        assert_eq!(items.len(), 2);
        assert!(matches!(items[1], Err(RpcError::Transport(_))));
    }

    #[test]
    fn test_garbage_is_codec_error() {
        let mut bytes = 2u64.to_le_bytes().to_vec();
        bytes.extend_from_slice(&[0xff, 0xff]);
        let items = block_on(frame_stream::<u32, _>(chunks(vec![bytes])).collect::<Vec<_>>());
        assert!(matches!(items.as_slice(), [Err(RpcError::Codec(_))]));
    }
}
