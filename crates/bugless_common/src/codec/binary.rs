use std::marker::PhantomData;

use codee::{Decoder, Encoder};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::CodecError;

/// Size of the length prefix in bytes.
pub const PREFIX_LEN: usize = 8;

/// Largest payload a peer may announce (16 MiB).
pub const MAX_FRAME_LEN: u64 = 16 * 1024 * 1024;

/// Encodes `value` as one length-prefixed frame.
pub fn encode_frame<T: Serialize>(value: &T) -> Result<Vec<u8>, CodecError> {
    let payload = bincode::serde::encode_to_vec(value, bincode::config::standard())
        .map_err(|e| CodecError::Encode(e.to_string()))?;

    let len = payload.len() as u64;
    let mut buffer = Vec::with_capacity(PREFIX_LEN + payload.len());
    buffer.extend_from_slice(&len.to_le_bytes());
    buffer.extend_from_slice(&payload);
    Ok(buffer)
}

/// Decodes exactly one frame. Trailing bytes after the announced payload are ignored.
pub fn decode_frame<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, CodecError> {
    let len = announced_len(bytes)?;
    let end = PREFIX_LEN + len;
    if bytes.len() < end {
        return Err(CodecError::Decode(format!(
            "incomplete frame: need {} bytes, have {}",
            len,
            bytes.len() - PREFIX_LEN
        )));
    }
    decode_payload(&bytes[PREFIX_LEN..end])
}

fn announced_len(bytes: &[u8]) -> Result<usize, CodecError> {
    let prefix: [u8; PREFIX_LEN] = bytes
        .get(..PREFIX_LEN)
        .and_then(|prefix| prefix.try_into().ok())
        .ok_or(CodecError::FrameTooShort { len: bytes.len() })?;
    let len = u64::from_le_bytes(prefix);
    if len > MAX_FRAME_LEN {
        return Err(CodecError::FrameTooLarge {
            len,
            max: MAX_FRAME_LEN,
        });
    }
    Ok(len as usize)
}

fn decode_payload<T: DeserializeOwned>(payload: &[u8]) -> Result<T, CodecError> {
    bincode::serde::decode_from_slice(payload, bincode::config::standard())
        .map(|(value, _)| value)
        .map_err(|e| CodecError::Decode(e.to_string()))
}

/// `codee` codec for length-prefixed bincode frames.
///
/// ```rust
/// use bugless_common::codec::FrameCodec;
/// use bugless_common::{StreamFrame, RpcStatus};
/// use codee::{Decoder, Encoder};
///
/// let frame: StreamFrame<u32> = StreamFrame::Status(RpcStatus::ok());
/// let bytes = FrameCodec::encode(&frame).unwrap();
/// let back: StreamFrame<u32> = FrameCodec::decode(bytes.as_slice()).unwrap();
/// assert_eq!(back, frame);
/// ```
pub struct FrameCodec;

impl<T: Serialize> Encoder<T> for FrameCodec {
    type Error = CodecError;
    type Encoded = Vec<u8>;

    fn encode(val: &T) -> Result<Self::Encoded, Self::Error> {
        encode_frame(val)
    }
}

impl<T: DeserializeOwned> Decoder<T> for FrameCodec {
    type Error = CodecError;
    type Encoded = [u8];

    fn decode(val: &Self::Encoded) -> Result<T, Self::Error> {
        decode_frame(val)
    }
}

/// Incremental decoder for a byte stream carrying back-to-back frames.
///
/// A transport chunk may hold several frames, or end in the middle of one;
/// the tail is kept until the rest arrives.
pub struct FrameDecoder<T> {
    buffer: Vec<u8>,
    _marker: PhantomData<fn() -> T>,
}

impl<T: DeserializeOwned> FrameDecoder<T> {
    pub fn new() -> Self {
        Self {
            buffer: Vec::new(),
            _marker: PhantomData,
        }
    }

    /// Appends `bytes` and returns every frame completed by them, in order.
    ///
    /// An error means the byte stream is broken; drop the decoder.
    pub fn push(&mut self, bytes: &[u8]) -> Result<Vec<T>, CodecError> {
        self.buffer.extend_from_slice(bytes);

        let mut frames = Vec::new();
        let mut offset = 0;
        while self.buffer.len() - offset >= PREFIX_LEN {
            let len = announced_len(&self.buffer[offset..])?;
            let end = offset + PREFIX_LEN + len;
            if end > self.buffer.len() {
                log::trace!(
                    "[FrameDecoder] incomplete frame: need {} bytes, have {}",
                    len,
                    self.buffer.len() - offset - PREFIX_LEN
                );
                break;
            }
            frames.push(decode_payload(&self.buffer[offset + PREFIX_LEN..end])?);
            offset = end;
        }

        self.buffer.drain(..offset);
        Ok(frames)
    }

    /// Bytes received but not yet part of a complete frame.
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }
}

impl<T: DeserializeOwned> Default for FrameDecoder<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{RpcStatus, StatusCode, StreamFrame};

    #[test]
    fn test_frame_layout() {
        let frame: StreamFrame<String> = StreamFrame::Data("party time 🎉".to_string());
        let enc = encode_frame(&frame).unwrap();

        // 8-byte length prefix + payload
        assert!(enc.len() > PREFIX_LEN);
        let length_bytes: [u8; 8] = enc[..8].try_into().unwrap();
        assert_eq!(u64::from_le_bytes(length_bytes) as usize, enc.len() - PREFIX_LEN);

        let dec: StreamFrame<String> = decode_frame(&enc).unwrap();
        assert_eq!(dec, frame);
    }

    #[test]
    fn test_short_and_oversized_frames() {
        assert_eq!(
            decode_frame::<u32>(&[1, 2, 3]),
            Err(CodecError::FrameTooShort { len: 3 })
        );

        let mut huge = (MAX_FRAME_LEN + 1).to_le_bytes().to_vec();
        huge.push(0);
        assert!(matches!(
            decode_frame::<u32>(&huge),
            Err(CodecError::FrameTooLarge { .. })
        ));
    }

    #[test]
    fn test_decoder_splits_batched_frames() {
        let mut bytes = encode_frame(&StreamFrame::<u32>::Status(RpcStatus::ok())).unwrap();
        bytes.extend(encode_frame(&StreamFrame::Data(7u32)).unwrap());
        bytes.extend(encode_frame(&StreamFrame::<u32>::End).unwrap());

        let mut decoder = FrameDecoder::<StreamFrame<u32>>::new();
        let frames = decoder.push(&bytes).unwrap();
        assert_eq!(
            frames,
            vec![
                StreamFrame::Status(RpcStatus::ok()),
                StreamFrame::Data(7),
                StreamFrame::End
            ]
        );
        assert_eq!(decoder.pending(), 0);
    }

    #[test]
    fn test_decoder_keeps_partial_frame() {
        let error = StreamFrame::<u32>::Error(RpcStatus::new(StatusCode::Unavailable, "backend down"));
        let bytes = encode_frame(&error).unwrap();
        let (head, tail) = bytes.split_at(5);

        let mut decoder = FrameDecoder::<StreamFrame<u32>>::new();
        assert!(decoder.push(head).unwrap().is_empty());
        assert_eq!(decoder.pending(), 5);

        assert_eq!(decoder.push(tail).unwrap(), vec![error]);
        assert_eq!(decoder.pending(), 0);
    }

    #[test]
    fn test_decoder_rejects_garbage() {
        let mut bytes = 2u64.to_le_bytes().to_vec();
        bytes.extend_from_slice(&[0xff, 0xff]);
        let mut decoder = FrameDecoder::<StreamFrame<u32>>::new();
        assert!(matches!(decoder.push(&bytes), Err(CodecError::Decode(_))));
    }
}
