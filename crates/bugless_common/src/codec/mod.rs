//! Wire framing for streaming calls.
//!
//! Every frame is an 8-byte little-endian length prefix followed by a
//! bincode (standard config) encoding of the payload. The client sends one
//! [`GetIssuesRequest`](crate::GetIssuesRequest) frame; the server answers
//! with [`StreamFrame`](crate::StreamFrame)s.

mod binary;

pub use binary::{decode_frame, encode_frame, FrameCodec, FrameDecoder, MAX_FRAME_LEN, PREFIX_LEN};
