//! Debounced one-shot timers.

use std::time::Instant;

/// Pending work keyed by `K`, at most one entry per key.
///
/// Scheduling a key that is already pending moves its deadline instead of
/// queueing a second entry, so a burst of clicks on one button produces a
/// single revert after the last click.
#[derive(Debug)]
pub struct DeferredQueue<K> {
    pending: Vec<(K, Instant)>,
}

impl<K> Default for DeferredQueue<K> {
    fn default() -> Self {
        Self {
            pending: Vec::new(),
        }
    }
}

impl<K: PartialEq + Copy> DeferredQueue<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `key` at `due`, replacing any earlier deadline for it.
    pub fn schedule(&mut self, key: K, due: Instant) {
        match self.pending.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = due,
            None => self.pending.push((key, due)),
        }
    }

    /// Remove and return every key whose deadline is at or before `now`,
    /// earliest first.
    pub fn take_due(&mut self, now: Instant) -> Vec<K> {
        let mut due: Vec<(K, Instant)> = Vec::new();
        self.pending.retain(|&(key, at)| {
            if at <= now {
                due.push((key, at));
                false
            } else {
                true
            }
        });
        due.sort_by_key(|&(_, at)| at);
        due.into_iter().map(|(key, _)| key).collect()
    }

    pub fn is_pending(&self, key: K) -> bool {
        self.pending.iter().any(|(k, _)| *k == key)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_rescheduling_keeps_one_entry() {
        let start = Instant::now();
        let mut queue = DeferredQueue::new();

        queue.schedule(7u8, start + Duration::from_millis(100));
        queue.schedule(7u8, start + Duration::from_millis(150));

        assert_eq!(queue.len(), 1);
        assert!(queue.take_due(start + Duration::from_millis(120)).is_empty());

        let mut executions = 0;
        for _ in queue.take_due(start + Duration::from_millis(150)) {
            executions += 1;
        }
        assert_eq!(executions, 1);
        assert!(queue.is_empty());
        assert!(queue.take_due(start + Duration::from_secs(10)).is_empty());
    }

    #[test]
    fn test_due_keys_come_out_in_deadline_order() {
        let start = Instant::now();
        let mut queue = DeferredQueue::new();
        queue.schedule('b', start + Duration::from_millis(20));
        queue.schedule('a', start + Duration::from_millis(10));
        queue.schedule('c', start + Duration::from_millis(500));

        assert_eq!(queue.take_due(start + Duration::from_millis(30)), vec!['a', 'b']);
        assert!(queue.is_pending('c'));
    }
}
