//! [`RpcStub`](crate::RpcStub) implementations and the framing they share.
//!
//! - [`MemoryStub`]: in-process, for tests and demos.
//! - [`frame_stream`]: decodes length-prefixed frames from any byte stream.
//! - `WebSocketStub` (in `web`, wasm32 only) builds on `frame_stream`.

mod framed;
mod memory;

pub use framed::frame_stream;
pub use memory::{MemoryStub, StreamSender};
