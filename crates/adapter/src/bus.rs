//! Typed publish/subscribe for engine events.
//!
//! Subscribers are keyed by [`EventName`] and run synchronously, in
//! subscription order, on the task that dispatches.

use std::collections::HashMap;

use tokio::sync::mpsc;

use crate::protocol::{EngineEvent, EventName};

type Handler = Box<dyn FnMut(&EngineEvent) + Send>;
type FaultHandler = Box<dyn FnMut(&BusFault) + Send>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Problems on the link that are not events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BusFault {
    /// A line could not be decoded.
    Malformed(String),
    /// The engine closed the link.
    Closed,
}

/// What a forwarded bus delivers to the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound {
    Event(EngineEvent),
    Fault(BusFault),
}

#[derive(Default)]
pub struct EventBus {
    next_id: u64,
    handlers: HashMap<EventName, Vec<(SubscriptionId, Handler)>>,
    fault_handlers: Vec<(SubscriptionId, FaultHandler)>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_id(&mut self) -> SubscriptionId {
        self.next_id += 1;
        SubscriptionId(self.next_id)
    }

    pub fn subscribe<F>(&mut self, name: EventName, handler: F) -> SubscriptionId
    where
        F: FnMut(&EngineEvent) + Send + 'static,
    {
        let id = self.next_id();
        self.handlers
            .entry(name)
            .or_default()
            .push((id, Box::new(handler)));
        id
    }

    pub fn on_fault<F>(&mut self, handler: F) -> SubscriptionId
    where
        F: FnMut(&BusFault) + Send + 'static,
    {
        let id = self.next_id();
        self.fault_handlers.push((id, Box::new(handler)));
        id
    }

    /// Remove a subscription. Returns whether it existed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        for list in self.handlers.values_mut() {
            if let Some(pos) = list.iter().position(|(sid, _)| *sid == id) {
                list.remove(pos);
                return true;
            }
        }
        if let Some(pos) = self.fault_handlers.iter().position(|(sid, _)| *sid == id) {
            self.fault_handlers.remove(pos);
            return true;
        }
        false
    }

    pub fn subscriber_count(&self, name: EventName) -> usize {
        self.handlers.get(&name).map_or(0, Vec::len)
    }

    /// Deliver `event` to its subscribers. Returns how many ran.
    pub fn dispatch(&mut self, event: &EngineEvent) -> usize {
        let name = event.name();
        let Some(list) = self.handlers.get_mut(&name) else {
            tracing::debug!(event = name.as_str(), "no subscribers");
            return 0;
        };
        for (_, handler) in list.iter_mut() {
            handler(event);
        }
        list.len()
    }

    pub fn fault(&mut self, fault: &BusFault) {
        for (_, handler) in self.fault_handlers.iter_mut() {
            handler(fault);
        }
    }

    /// Subscribe a channel to every event and fault.
    pub fn forward_into(&mut self, tx: mpsc::UnboundedSender<Inbound>) {
        for name in EventName::ALL {
            let tx = tx.clone();
            self.subscribe(name, move |event| {
                let _ = tx.send(Inbound::Event(event.clone()));
            });
        }
        self.on_fault(move |fault| {
            let _ = tx.send(Inbound::Fault(fault.clone()));
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::MyMoveEvent;
    use std::sync::{Arc, Mutex};

    #[test]
    fn dispatches_in_subscription_order() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut bus = EventBus::new();
        for tag in ["first", "second"] {
            let seen = Arc::clone(&seen);
            bus.subscribe(EventName::Victory, move |_| seen.lock().unwrap().push(tag));
        }
        let ran = bus.dispatch(&EngineEvent::Victory);
        assert_eq!(ran, 2);
        assert_eq!(*seen.lock().unwrap(), vec!["first", "second"]);
        assert_eq!(bus.dispatch(&EngineEvent::Defeat), 0);
    }

    #[test]
    fn unsubscribe_stops_delivery() {
        let count = Arc::new(Mutex::new(0));
        let mut bus = EventBus::new();
        let c = Arc::clone(&count);
        let id = bus.subscribe(EventName::MyMove, move |_| *c.lock().unwrap() += 1);
        let ev = EngineEvent::MyMove(MyMoveEvent { id: "a".into() });
        bus.dispatch(&ev);
        assert!(bus.unsubscribe(id));
        assert!(!bus.unsubscribe(id));
        bus.dispatch(&ev);
        assert_eq!(*count.lock().unwrap(), 1);
        assert_eq!(bus.subscriber_count(EventName::MyMove), 0);
    }

    #[tokio::test]
    async fn forwards_events_and_faults() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut bus = EventBus::new();
        bus.forward_into(tx);
        bus.dispatch(&EngineEvent::RoomFull);
        bus.fault(&BusFault::Closed);
        assert_eq!(rx.recv().await, Some(Inbound::Event(EngineEvent::RoomFull)));
        assert_eq!(rx.recv().await, Some(Inbound::Fault(BusFault::Closed)));
    }
}
