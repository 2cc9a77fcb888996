// Delayed message dispatch between entities
//
// Messages are never delivered while they are being sent. Each one is queued
// with a fire time (`now + delay`) and handed back by `drain_due` on a later
// (or the same) tick, in fire-time order. Messages fired at the same instant
// come out in the order they were sent.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// A message in flight
#[derive(Debug, Clone, PartialEq)]
pub struct Telegram<A, M> {
    /// Simulation time (seconds) at which the message becomes deliverable
    pub dispatch_time: f32,
    /// Who sent it, if anyone
    pub sender: Option<A>,
    /// Who should receive it
    pub receiver: A,
    /// Payload
    pub message: M,
}

#[derive(Debug)]
struct Scheduled<A, M> {
    sequence: u64,
    telegram: Telegram<A, M>,
}

impl<A, M> PartialEq for Scheduled<A, M> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<A, M> Eq for Scheduled<A, M> {}

impl<A, M> PartialOrd for Scheduled<A, M> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<A, M> Ord for Scheduled<A, M> {
    // Reversed so the max-heap pops the earliest telegram first
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .telegram
            .dispatch_time
            .total_cmp(&self.telegram.dispatch_time)
            .then_with(|| other.sequence.cmp(&self.sequence))
    }
}

/// Queue of telegrams keyed by fire time
#[derive(Debug)]
pub struct MessageDispatcher<A, M> {
    queue: BinaryHeap<Scheduled<A, M>>,
    next_sequence: u64,
}

impl<A, M> MessageDispatcher<A, M> {
    pub fn new() -> Self {
        Self {
            queue: BinaryHeap::new(),
            next_sequence: 0,
        }
    }

    /// Schedule a message. A non-positive delay makes it deliverable right away.
    pub fn dispatch(&mut self, now: f32, delay: f32, sender: Option<A>, receiver: A, message: M) {
        let telegram = Telegram {
            dispatch_time: now + delay.max(0.0),
            sender,
            receiver,
            message,
        };
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        self.queue.push(Scheduled { sequence, telegram });
    }

    /// Remove and return every telegram due at `now`, earliest first
    pub fn drain_due(&mut self, now: f32) -> Vec<Telegram<A, M>> {
        let mut due = Vec::new();
        while self
            .queue
            .peek()
            .is_some_and(|scheduled| scheduled.telegram.dispatch_time <= now)
        {
            if let Some(scheduled) = self.queue.pop() {
                due.push(scheduled.telegram);
            }
        }
        due
    }

    /// Number of pending telegrams
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Check if nothing is pending
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

impl<A, M> Default for MessageDispatcher<A, M> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dispatcher_creation() {
        let dispatcher: MessageDispatcher<u32, &str> = MessageDispatcher::new();
        assert!(dispatcher.is_empty());
        assert_eq!(dispatcher.len(), 0);
    }

    #[test]
    fn test_delayed_message_not_due_early() {
        let mut dispatcher = MessageDispatcher::new();
        dispatcher.dispatch(1.0, 0.5, None, 7u32, "hello");

        assert!(dispatcher.drain_due(1.2).is_empty());
        let due = dispatcher.drain_due(1.5);
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].receiver, 7);
        assert_eq!(due[0].message, "hello");
        assert!(dispatcher.is_empty());
    }

    #[test]
    fn test_zero_delay_is_immediately_due() {
        let mut dispatcher = MessageDispatcher::new();
        dispatcher.dispatch(3.0, 0.0, Some(1u32), 2u32, ());
        let due = dispatcher.drain_due(3.0);
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].sender, Some(1));
    }

    #[test]
    fn test_negative_delay_clamped() {
        let mut dispatcher = MessageDispatcher::new();
        dispatcher.dispatch(2.0, -1.0, None, 0u32, ());
        let due = dispatcher.drain_due(2.0);
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].dispatch_time, 2.0);
    }

    #[test]
    fn test_fire_time_order() {
        let mut dispatcher = MessageDispatcher::new();
        dispatcher.dispatch(0.0, 1.2, None, 0u32, "late");
        dispatcher.dispatch(0.0, 0.3, None, 0u32, "early");
        dispatcher.dispatch(0.0, 0.6, None, 0u32, "middle");

        let order: Vec<_> = dispatcher.drain_due(2.0).into_iter().map(|t| t.message).collect();
        assert_eq!(order, vec!["early", "middle", "late"]);
    }

    #[test]
    fn test_same_time_keeps_send_order() {
        let mut dispatcher = MessageDispatcher::new();
        for i in 0..5u32 {
            dispatcher.dispatch(0.0, 0.0, None, 0u32, i);
        }
        let order: Vec<_> = dispatcher.drain_due(0.0).into_iter().map(|t| t.message).collect();
        assert_eq!(order, vec![0, 1, 2, 3, 4]);
    }
}
