//! Nullable deferred scheduler: pending tasks keyed by identity.

use std::collections::BTreeMap;
use std::sync::Mutex;

use goc_host::{DeferredKey, DeferredScheduler, DeferredTask, HostError};
use goc_types::Timestamp;

use crate::lock;

#[derive(Debug, Default)]
pub struct NullScheduler {
    pending: Mutex<BTreeMap<DeferredKey, DeferredTask>>,
    rejecting: Mutex<Option<String>>,
}

impl NullScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pending(&self) -> Vec<DeferredTask> {
        lock(&self.pending).values().copied().collect()
    }

    pub fn get(&self, key: DeferredKey) -> Option<DeferredTask> {
        lock(&self.pending).get(&key).copied()
    }

    /// Refuse every new task with `reason` until [`Self::accept_tasks`].
    pub fn reject_tasks(&self, reason: &str) {
        *lock(&self.rejecting) = Some(reason.to_string());
    }

    pub fn accept_tasks(&self) {
        *lock(&self.rejecting) = None;
    }
}

impl DeferredScheduler for NullScheduler {
    fn schedule(&self, task: DeferredTask) -> Result<(), HostError> {
        self.check_task(&task)?;
        lock(&self.pending).insert(task.action.key(), task);
        Ok(())
    }

    fn check_task(&self, _task: &DeferredTask) -> Result<(), HostError> {
        match lock(&self.rejecting).as_ref() {
            Some(reason) => Err(HostError::Rejected(reason.clone())),
            None => Ok(()),
        }
    }

    fn cancel(&self, key: DeferredKey) -> Result<(), HostError> {
        lock(&self.pending).remove(&key);
        Ok(())
    }

    fn take_due(&self, now: Timestamp) -> Vec<DeferredTask> {
        let mut pending = lock(&self.pending);
        let due: Vec<DeferredKey> = pending
            .iter()
            .filter(|(_, task)| task.execute_at <= now)
            .map(|(key, _)| *key)
            .collect();
        let mut tasks: Vec<DeferredTask> = due.iter().filter_map(|key| pending.remove(key)).collect();
        tasks.sort_by_key(|t| t.execute_at);
        tasks
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use goc_host::DeferredAction;
    use goc_types::AccountName;

    fn refund(owner: &'static str, at: u64) -> DeferredTask {
        DeferredTask {
            action: DeferredAction::Refund {
                owner: AccountName::from_static(owner),
            },
            execute_at: Timestamp::new(at),
        }
    }

    #[test]
    fn same_key_replaces_pending_task() {
        let s = NullScheduler::new();
        s.schedule(refund("alice", 10)).unwrap();
        s.schedule(refund("alice", 50)).unwrap();
        assert_eq!(s.pending().len(), 1);
        assert!(s.take_due(Timestamp::new(10)).is_empty());
        assert_eq!(s.take_due(Timestamp::new(50)).len(), 1);
        assert!(s.pending().is_empty());
    }

    #[test]
    fn rejecting_scheduler_refuses_until_reset() {
        let s = NullScheduler::new();
        s.reject_tasks("full");
        assert_eq!(s.check_task(&refund("alice", 10)), Err(HostError::Rejected("full".into())));
        assert!(s.schedule(refund("alice", 10)).is_err());
        assert!(s.pending().is_empty());
        s.accept_tasks();
        s.schedule(refund("alice", 10)).unwrap();
        assert_eq!(s.pending().len(), 1);
    }

    #[test]
    fn due_tasks_come_out_earliest_first() {
        let s = NullScheduler::new();
        s.schedule(refund("bob", 30)).unwrap();
        s.schedule(refund("alice", 20)).unwrap();
        s.schedule(refund("carol", 99)).unwrap();
        let due = s.take_due(Timestamp::new(40));
        let times: Vec<u64> = due.iter().map(|t| t.execute_at.as_secs()).collect();
        assert_eq!(times, vec![20, 30]);
        s.cancel(refund("carol", 0).action.key()).unwrap();
        assert!(s.pending().is_empty());
    }
}
