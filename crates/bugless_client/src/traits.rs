use std::rc::Rc;

use bugless_common::RpcStatus;
use futures::executor::LocalSpawner;
use futures::future::LocalBoxFuture;
use futures::stream::LocalBoxStream;
use futures::task::{LocalSpawnExt, SpawnError};

use crate::error::RpcError;

/// A non-terminal message produced by a transport.
#[derive(Clone, Debug, PartialEq)]
pub enum StreamMessage<T> {
    Status(RpcStatus),
    Data(T),
}

/// What an [`RpcStub`] returns for one call.
///
/// The stream ending is the successful end of the call. An `Err` item is a
/// failed call; nothing after it is looked at. Dropping the stream tells the
/// transport the caller has lost interest.
pub type TransportStream<T> = LocalBoxStream<'static, Result<StreamMessage<T>, RpcError>>;

/// A client stub for one server-streaming method.
///
/// The stub owns everything about the wire (framing, connections, TLS).
/// Implementations are expected to do no work until the returned stream is
/// polled.
pub trait RpcStub {
    type Request;
    type Response: 'static;

    fn open_stream(&self, request: Self::Request) -> TransportStream<Self::Response>;
}

impl<S: RpcStub + ?Sized> RpcStub for Rc<S> {
    type Request = S::Request;
    type Response = S::Response;

    fn open_stream(&self, request: Self::Request) -> TransportStream<Self::Response> {
        (**self).open_stream(request)
    }
}

/// A single-threaded executor that drives stream delivery.
///
/// Tasks run one at a time and only between the caller's own callbacks,
/// the way a browser event loop schedules them.
pub trait Runtime {
    fn spawn_local(&self, task: LocalBoxFuture<'static, ()>) -> Result<(), SpawnError>;
}

impl Runtime for LocalSpawner {
    fn spawn_local(&self, task: LocalBoxFuture<'static, ()>) -> Result<(), SpawnError> {
        LocalSpawnExt::spawn_local(self, task)
    }
}

impl<R: Runtime + ?Sized> Runtime for Rc<R> {
    fn spawn_local(&self, task: LocalBoxFuture<'static, ()>) -> Result<(), SpawnError> {
        (**self).spawn_local(task)
    }
}
