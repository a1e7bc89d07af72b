//! Publish/subscribe channel for observational diagnostics.
//!
//! The endpoint reports noteworthy session events (transport breaks, close
//! handshake completion) through this channel. Nothing in the protocol
//! engine depends on whether anyone is listening.

use std::cell::RefCell;
use std::rc::Rc;

/// Closure handed back by [`DiagnosticsSender::subscribe`]; calling it
/// terminates the subscription.
pub type Unsubscribe = Box<dyn FnOnce()>;

struct Subscriber {
    id: usize,
    min_level: usize,
    handler: Box<dyn FnMut(&str, usize, &str)>,
}

/// Publishes diagnostic messages to any number of subscribers.
pub struct DiagnosticsSender {
    name: String,
    subscribers: Rc<RefCell<Vec<Subscriber>>>,
    next_id: RefCell<usize>,
}

impl DiagnosticsSender {
    /// Create a channel whose messages are attributed to `name`.
    pub fn new(name: impl Into<String>) -> Self {
        DiagnosticsSender {
            name: name.into(),
            subscribers: Rc::new(RefCell::new(Vec::new())),
            next_id: RefCell::new(0),
        }
    }

    /// Register `handler` to receive every message published at
    /// `min_level` or above. Handlers receive (sender name, level, message).
    pub fn subscribe(
        &self,
        handler: impl FnMut(&str, usize, &str) + 'static,
        min_level: usize,
    ) -> Unsubscribe {
        let id = {
            let mut next_id = self.next_id.borrow_mut();
            *next_id += 1;
            *next_id
        };
        self.subscribers.borrow_mut().push(Subscriber {
            id,
            min_level,
            handler: Box::new(handler),
        });
        let subscribers = Rc::downgrade(&self.subscribers);
        Box::new(move || {
            if let Some(subscribers) = subscribers.upgrade() {
                subscribers.borrow_mut().retain(|sub| sub.id != id);
            }
        })
    }

    /// Publish `message` at `level` to every interested subscriber.
    pub fn send(&self, level: usize, message: &str) {
        for sub in self.subscribers.borrow_mut().iter_mut() {
            if level >= sub.min_level {
                (sub.handler)(&self.name, level, message);
            }
        }
    }
}
