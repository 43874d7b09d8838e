//! Single-threaded relative alarms on a virtual millisecond clock
//!
//! Alarms are fire-once and cancel-safe. Nothing fires on its own: the owner
//! advances the clock and pops due alarms, delivering each payload back into
//! the same event loop that scheduled it.

/// Handle of a scheduled alarm
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AlarmId(u64);

#[derive(Debug, Clone)]
struct Pending<T> {
    id: AlarmId,
    deadline: u64,
    payload: T,
}

#[derive(Debug, Clone)]
pub struct AlarmQueue<T> {
    now: u64,
    next_id: u64,
    pending: Vec<Pending<T>>,
}

impl<T> Default for AlarmQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> AlarmQueue<T> {
    pub fn new() -> Self {
        Self {
            now: 0,
            next_id: 1,
            pending: Vec::new(),
        }
    }

    /// Current virtual time in milliseconds
    pub fn now(&self) -> u64 {
        self.now
    }

    /// Schedule `payload` to fire `delay_ms` from now
    pub fn schedule(&mut self, delay_ms: u64, payload: T) -> AlarmId {
        let id = AlarmId(self.next_id);
        self.next_id += 1;
        self.pending.push(Pending {
            id,
            deadline: self.now.saturating_add(delay_ms),
            payload,
        });
        id
    }

    /// Cancel an alarm; cancelling a fired or unknown alarm is a no-op
    pub fn cancel(&mut self, id: AlarmId) -> bool {
        let before = self.pending.len();
        self.pending.retain(|alarm| alarm.id != id);
        self.pending.len() != before
    }

    /// Move an outstanding alarm to `delay_ms` from now
    pub fn reschedule(&mut self, id: AlarmId, delay_ms: u64) -> bool {
        match self.pending.iter_mut().find(|alarm| alarm.id == id) {
            Some(alarm) => {
                alarm.deadline = self.now.saturating_add(delay_ms);
                true
            }
            None => false,
        }
    }

    /// The earliest deadline among outstanding alarms
    pub fn next_deadline(&self) -> Option<u64> {
        self.pending.iter().map(|alarm| alarm.deadline).min()
    }

    /// Remove and return the earliest alarm due at or before `until`
    ///
    /// Ties fire in scheduling order. The clock moves to the alarm's
    /// deadline so that anything the payload schedules is relative to it.
    pub fn pop_due(&mut self, until: u64) -> Option<(AlarmId, T)> {
        let index = self
            .pending
            .iter()
            .enumerate()
            .filter(|(_, alarm)| alarm.deadline <= until)
            .min_by_key(|(_, alarm)| (alarm.deadline, alarm.id))
            .map(|(index, _)| index)?;

        let alarm = self.pending.remove(index);
        self.now = self.now.max(alarm.deadline);
        Some((alarm.id, alarm.payload))
    }

    /// Move the clock forward (never backward)
    pub fn set_now(&mut self, now: u64) {
        self.now = self.now.max(now);
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

    #[test]
    fn test_alarms_fire_in_deadline_order() {
        let mut alarms = AlarmQueue::new();
        alarms.schedule(200, "late");
        alarms.schedule(100, "early");

        assert_eq!(alarms.pop_due(50), None);
        assert_eq!(alarms.pop_due(500).map(|(_, p)| p), Some("early"));
        assert_eq!(alarms.now(), 100);
        assert_eq!(alarms.pop_due(500).map(|(_, p)| p), Some("late"));
        assert!(alarms.is_empty());
    }

    #[test]
    fn test_cancel_is_idempotent() {
        let mut alarms = AlarmQueue::new();
        let id = alarms.schedule(10, ());
        assert!(alarms.cancel(id));
        assert!(!alarms.cancel(id));
        assert_eq!(alarms.pop_due(100), None);
    }

    #[test]
    fn test_reschedule_moves_deadline() {
        let mut alarms = AlarmQueue::new();
        let id = alarms.schedule(10, ());
        alarms.set_now(5);
        assert!(alarms.reschedule(id, 20));
        assert_eq!(alarms.next_deadline(), Some(25));
        assert!(alarms.pop_due(20).is_none());
        assert!(alarms.pop_due(25).is_some());
        assert!(!alarms.reschedule(id, 5));
    }

    #[test]
    fn test_ties_fire_in_scheduling_order() {
        let mut alarms = AlarmQueue::new();
        alarms.schedule(10, 1);
        alarms.schedule(10, 2);
        assert_eq!(alarms.pop_due(10).map(|(_, p)| p), Some(1));
        assert_eq!(alarms.pop_due(10).map(|(_, p)| p), Some(2));
    }

    #[test]
    fn test_clock_never_moves_backward() {
        let mut alarms: AlarmQueue<()> = AlarmQueue::new();
        alarms.set_now(50);
        alarms.set_now(20);
        assert_eq!(alarms.now(), 50);
    }
}
