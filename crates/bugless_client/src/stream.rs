use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use bugless_common::RpcStatus;
use futures::future::AbortHandle;
use log::{debug, trace};

use crate::error::RpcError;

/// One lifecycle event of a streaming call, as seen by handlers.
///
/// Zero or more `Status`/`Data` events are followed by exactly one terminal
/// event (`End` or `Error`).
#[derive(Clone, Debug, PartialEq)]
pub enum StreamEvent<T> {
    Status(RpcStatus),
    Data(T),
    End,
    Error(RpcError),
}

impl<T> StreamEvent<T> {
    pub fn is_terminal(&self) -> bool {
        matches!(self, StreamEvent::End | StreamEvent::Error(_))
    }

    fn name(&self) -> &'static str {
        match self {
            StreamEvent::Status(_) => "status",
            StreamEvent::Data(_) => "data",
            StreamEvent::End => "end",
            StreamEvent::Error(_) => "error",
        }
    }
}

/// Where a [`StreamHandle`] is in its lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HandleState {
    /// Events may still arrive.
    Open,
    /// The terminal event has been delivered.
    Finished,
    /// The caller closed the handle before the terminal event.
    Closed,
}

type Handler<A> = Box<dyn FnMut(&A)>;

struct Handlers<T> {
    status: Vec<Handler<RpcStatus>>,
    data: Vec<Handler<T>>,
    end: Vec<Handler<()>>,
    error: Vec<Handler<RpcError>>,
}

impl<T> Default for Handlers<T> {
    fn default() -> Self {
        Self {
            status: Vec::new(),
            data: Vec::new(),
            end: Vec::new(),
            error: Vec::new(),
        }
    }
}

impl<T> Handlers<T> {
    fn status(&mut self) -> &mut Vec<Handler<RpcStatus>> {
        &mut self.status
    }

    fn data(&mut self) -> &mut Vec<Handler<T>> {
        &mut self.data
    }

    fn end(&mut self) -> &mut Vec<Handler<()>> {
        &mut self.end
    }

    fn error(&mut self) -> &mut Vec<Handler<RpcError>> {
        &mut self.error
    }
}

struct Shared<T> {
    id: u64,
    state: Cell<HandleState>,
    handlers: RefCell<Handlers<T>>,
    abort: RefCell<Option<AbortHandle>>,
}

/// Subscription point for the events of one streaming call.
///
/// Handlers run on the runtime's single thread, one event at a time and in
/// the order the transport produced them. Delivery starts on the next turn of
/// the runtime, so handlers registered right after the call was opened see
/// every event. Registering on a handle that is no longer open is a no-op.
///
/// Clones share the same subscription; dropping a handle does not cancel the
/// call, [`close`](StreamHandle::close) does.
pub struct StreamHandle<T> {
    shared: Rc<Shared<T>>,
}

impl<T> Clone for StreamHandle<T> {
    fn clone(&self) -> Self {
        Self {
            shared: self.shared.clone(),
        }
    }
}

impl<T> fmt::Debug for StreamHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamHandle")
            .field("id", &self.shared.id)
            .field("state", &self.shared.state.get())
            .finish()
    }
}

impl<T: 'static> StreamHandle<T> {
    pub(crate) fn new(id: u64, abort: AbortHandle) -> Self {
        Self {
            shared: Rc::new(Shared {
                id,
                state: Cell::new(HandleState::Open),
                handlers: RefCell::new(Handlers::default()),
                abort: RefCell::new(Some(abort)),
            }),
        }
    }

    /// Identifier of the call, unique per controller. Used in log lines.
    pub fn id(&self) -> u64 {
        self.shared.id
    }

    pub fn state(&self) -> HandleState {
        self.shared.state.get()
    }

    pub fn is_open(&self) -> bool {
        self.state() == HandleState::Open
    }

    pub fn on_status(&self, handler: impl FnMut(&RpcStatus) + 'static) -> &Self {
        self.register(Handlers::status, Box::new(handler))
    }

    pub fn on_data(&self, handler: impl FnMut(&T) + 'static) -> &Self {
        self.register(Handlers::data, Box::new(handler))
    }

    pub fn on_end(&self, mut handler: impl FnMut() + 'static) -> &Self {
        self.register(Handlers::end, Box::new(move |_: &()| handler()))
    }

    pub fn on_error(&self, handler: impl FnMut(&RpcError) + 'static) -> &Self {
        self.register(Handlers::error, Box::new(handler))
    }

    /// Detaches every handler and cancels the call.
    ///
    /// Safe to call from inside a handler: no further handler runs for this
    /// handle, including the remaining handlers of the current event. The
    /// transport learns about the cancellation when its stream is dropped.
    /// A no-op once the terminal event has been delivered.
    pub fn close(&self) {
        if !self.is_open() {
            return;
        }
        debug!("[stream {}] closed by caller", self.shared.id);
        self.shared.state.set(HandleState::Closed);
        self.release();
    }

    fn register<A>(
        &self,
        slot: fn(&mut Handlers<T>) -> &mut Vec<Handler<A>>,
        handler: Handler<A>,
    ) -> &Self {
        if self.is_open() {
            slot(&mut self.shared.handlers.borrow_mut()).push(handler);
        } else {
            trace!(
                "[stream {}] ignoring handler registered in state {:?}",
                self.shared.id,
                self.state()
            );
        }
        self
    }

    /// Hands one event to the registered handlers.
    pub(crate) fn deliver(&self, event: StreamEvent<T>) {
        if !self.is_open() {
            return;
        }
        trace!("[stream {}] {} event", self.shared.id, event.name());

        match event {
            StreamEvent::Status(status) => self.run(Handlers::status, &status),
            StreamEvent::Data(item) => self.run(Handlers::data, &item),
            StreamEvent::End => {
                debug!("[stream {}] finished", self.shared.id);
                self.shared.state.set(HandleState::Finished);
                self.run(Handlers::end, &());
                self.release();
            }
            StreamEvent::Error(error) => {
                debug!("[stream {}] failed: {}", self.shared.id, error);
                self.shared.state.set(HandleState::Finished);
                self.run(Handlers::error, &error);
                self.release();
            }
        }
    }

    /// Runs the handlers of one kind without holding a borrow across the
    /// calls, so handlers may register more handlers or close the handle.
    fn run<A>(&self, slot: fn(&mut Handlers<T>) -> &mut Vec<Handler<A>>, arg: &A) {
        let mut running = std::mem::take(slot(&mut self.shared.handlers.borrow_mut()));
        for handler in running.iter_mut() {
            if self.state() == HandleState::Closed {
                break;
            }
            handler(arg);
        }

        if self.state() == HandleState::Closed {
            return;
        }
        let mut handlers = self.shared.handlers.borrow_mut();
        let slot = slot(&mut handlers);
        // Handlers registered while these ran go after them.
        running.append(slot);
        *slot = running;
    }

    fn release(&self) {
        *self.shared.handlers.borrow_mut() = Handlers::default();
        if let Some(abort) = self.shared.abort.borrow_mut().take() {
            abort.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bugless_common::StatusCode;

    fn handle() -> StreamHandle<u32> {
        let (abort, _registration) = AbortHandle::new_pair();
        StreamHandle::new(7, abort)
    }

    fn recorder() -> (Rc<RefCell<Vec<String>>>, impl Fn(String) + Clone) {
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = {
            let log = log.clone();
            move |entry: String| log.borrow_mut().push(entry)
        };
        (log, sink)
    }

    #[test]
    fn test_events_reach_handlers_in_order() {
        let handle = handle();
        let (log, sink) = recorder();
        let (s1, s2, s3) = (sink.clone(), sink.clone(), sink);
        handle
            .on_status(move |status| s1(format!("status {}", status.code.code())))
            .on_data(move |item| s2(format!("data {}", item)))
            .on_end(move || s3("end".to_string()));

        handle.deliver(StreamEvent::Status(RpcStatus::ok()));
        handle.deliver(StreamEvent::Data(1));
        handle.deliver(StreamEvent::Data(2));
        handle.deliver(StreamEvent::End);

        assert_eq!(*log.borrow(), vec!["status 0", "data 1", "data 2", "end"]);
        assert_eq!(handle.state(), HandleState::Finished);
    }

    #[test]
    fn test_nothing_after_terminal_event() {
        let handle = handle();
        let (log, sink) = recorder();
        let (s1, s2, s3) = (sink.clone(), sink.clone(), sink);
        handle
            .on_data(move |item| s1(format!("data {}", item)))
            .on_error(move |error| s2(format!("error {}", error.code().code())))
            .on_end(move || s3("end".to_string()));

        handle.deliver(StreamEvent::Error(RpcError::from(RpcStatus::new(
            StatusCode::NotFound,
            "issue not found",
        ))));
        handle.deliver(StreamEvent::Data(3));
        handle.deliver(StreamEvent::End);

        assert_eq!(*log.borrow(), vec!["error 5"]);
    }

    #[test]
    fn test_close_inside_handler_stops_remaining_handlers() {
        let handle = handle();
        let (log, sink) = recorder();
        let closer = handle.clone();
        let (s1, s2) = (sink.clone(), sink);
        handle
            .on_data(move |item| {
                s1(format!("first {}", item));
                closer.close();
            })
            .on_data(move |item| s2(format!("second {}", item)));

        handle.deliver(StreamEvent::Data(1));
        handle.deliver(StreamEvent::Data(2));

        assert_eq!(*log.borrow(), vec!["first 1"]);
        assert_eq!(handle.state(), HandleState::Closed);
    }

    #[test]
    fn test_handler_registered_during_delivery_sees_next_event() {
        let handle = handle();
        let (log, sink) = recorder();
        let inner = handle.clone();
        let registered = Rc::new(Cell::new(false));
        handle.on_data(move |_| {
            if !registered.replace(true) {
                let sink = sink.clone();
                inner.on_data(move |item| sink(format!("late {}", item)));
            }
        });

        handle.deliver(StreamEvent::Data(1));
        handle.deliver(StreamEvent::Data(2));

        assert_eq!(*log.borrow(), vec!["late 2"]);
    }

    #[test]
    fn test_close_after_finish_is_noop() {
        let handle = handle();
        handle.deliver(StreamEvent::End);
        handle.close();
        assert_eq!(handle.state(), HandleState::Finished);
    }

    #[test]
    fn test_register_after_close_is_ignored() {
        let handle = handle();
        handle.close();
        let (log, sink) = recorder();
        handle.on_data(move |item| sink(format!("data {}", item)));
        handle.deliver(StreamEvent::Data(1));
        assert!(log.borrow().is_empty());
    }
}
