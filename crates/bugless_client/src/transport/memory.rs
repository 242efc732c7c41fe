use std::cell::{Cell, RefCell};
use std::rc::Rc;

use bugless_common::RpcStatus;
use futures::channel::mpsc::{self, UnboundedSender};
use futures::StreamExt;
use log::trace;

use crate::error::RpcError;
use crate::traits::{RpcStub, StreamMessage, TransportStream};

struct MemoryInner<Req, Resp> {
    requests: RefCell<Vec<Req>>,
    senders: RefCell<Vec<StreamSender<Resp>>>,
}

/// An in-process [`RpcStub`].
///
/// Every `open_stream` records the request and creates a channel; the
/// matching [`StreamSender`] plays the server side. Clones share the same
/// record, so a test can keep one clone and give the other to a controller.
pub struct MemoryStub<Req, Resp> {
    inner: Rc<MemoryInner<Req, Resp>>,
}

impl<Req, Resp> Clone for MemoryStub<Req, Resp> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<Req, Resp> Default for MemoryStub<Req, Resp> {
    fn default() -> Self {
        Self {
            inner: Rc::new(MemoryInner {
                requests: RefCell::new(Vec::new()),
                senders: RefCell::new(Vec::new()),
            }),
        }
    }
}

impl<Req: Clone, Resp> MemoryStub<Req, Resp> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every request seen so far, oldest first.
    pub fn requests(&self) -> Vec<Req> {
        self.inner.requests.borrow().clone()
    }

    pub fn call_count(&self) -> usize {
        self.inner.requests.borrow().len()
    }

    /// Server side of the `index`-th call.
    pub fn sender(&self, index: usize) -> Option<StreamSender<Resp>> {
        self.inner.senders.borrow().get(index).cloned()
    }

    /// Server side of the most recent call.
    pub fn last_sender(&self) -> Option<StreamSender<Resp>> {
        self.inner.senders.borrow().last().cloned()
    }
}

impl<Req, Resp: 'static> RpcStub for MemoryStub<Req, Resp> {
    type Request = Req;
    type Response = Resp;

    fn open_stream(&self, request: Req) -> TransportStream<Resp> {
        let (tx, rx) = mpsc::unbounded();
        self.inner.requests.borrow_mut().push(request);
        self.inner.senders.borrow_mut().push(StreamSender {
            tx,
            finished: Rc::new(Cell::new(false)),
        });
        trace!(
            "[MemoryStub] opened stream #{}",
            self.inner.senders.borrow().len() - 1
        );
        rx.boxed_local()
    }
}

/// The server end of one [`MemoryStub`] call.
///
/// Sends after the stream was finished, failed or dropped by the client are
/// ignored and return `false`.
pub struct StreamSender<T> {
    tx: UnboundedSender<Result<StreamMessage<T>, RpcError>>,
    finished: Rc<Cell<bool>>,
}

impl<T> Clone for StreamSender<T> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
            finished: self.finished.clone(),
        }
    }
}

impl<T> StreamSender<T> {
    pub fn status(&self, status: RpcStatus) -> bool {
        self.send(Ok(StreamMessage::Status(status)))
    }

    pub fn data(&self, item: T) -> bool {
        self.send(Ok(StreamMessage::Data(item)))
    }

    /// Fails the call. Anything sent afterwards is dropped.
    pub fn fail(&self, error: RpcError) -> bool {
        let sent = self.send(Err(error));
        self.finish();
        sent
    }

    /// Ends the call successfully.
    pub fn finish(&self) {
        self.finished.set(true);
        self.tx.close_channel();
    }

    /// True once the client dropped its end before the server finished.
    pub fn is_cancelled(&self) -> bool {
        self.tx.is_closed() && !self.finished.get()
    }

    fn send(&self, message: Result<StreamMessage<T>, RpcError>) -> bool {
        if self.finished.get() {
            trace!("[StreamSender] dropping message sent after finish");
            return false;
        }
        self.tx.unbounded_send(message).is_ok()
    }
}
