//! Once-only asynchronous initialisation.
//!
//! States: `Unstarted → Loading → Ready | Failed`. The first caller drives the load;
//! callers arriving while it is pending queue a oneshot and receive the same outcome.
//! A failed load is remembered for inspection but the next caller starts a fresh one.
//! If the driving future is dropped mid-load the cache returns to `Unstarted` and the
//! queued callers receive [`LoadError::Abandoned`].

use std::cell::{Cell, RefCell};
use std::future::Future;

use futures_channel::oneshot;

use super::error::LoadError;

type Waiter<T> = oneshot::Sender<Result<T, LoadError>>;

enum Slot<T> {
    Unstarted,
    Loading(Vec<Waiter<T>>),
    Ready(T),
    Failed(LoadError),
}

/// Observable state of a [`LoadCache`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadPhase {
    Unstarted,
    Loading { waiters: usize },
    Ready,
    Failed(LoadError),
}

pub struct LoadCache<T> {
    slot: RefCell<Slot<T>>,
    attempts: Cell<u32>,
}

impl<T> Default for LoadCache<T> {
    fn default() -> Self {
        Self {
            slot: RefCell::new(Slot::Unstarted),
            attempts: Cell::new(0),
        }
    }
}

impl<T: Clone> LoadCache<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> LoadPhase {
        match &*self.slot.borrow() {
            Slot::Unstarted => LoadPhase::Unstarted,
            Slot::Loading(waiters) => LoadPhase::Loading {
                waiters: waiters.len(),
            },
            Slot::Ready(_) => LoadPhase::Ready,
            Slot::Failed(err) => LoadPhase::Failed(err.clone()),
        }
    }

    /// Number of loads started so far.
    pub fn attempts(&self) -> u32 {
        self.attempts.get()
    }

    /// Return the cached value, join a pending load, or start one with `load`.
    pub async fn get_or_load<F, Fut>(&self, load: F) -> Result<T, LoadError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, LoadError>>,
    {
        let waiter = {
            let mut slot = self.slot.borrow_mut();
            match &mut *slot {
                Slot::Ready(value) => return Ok(value.clone()),
                Slot::Loading(waiters) => {
                    let (tx, rx) = oneshot::channel();
                    waiters.push(tx);
                    Some(rx)
                }
                Slot::Unstarted | Slot::Failed(_) => {
                    *slot = Slot::Loading(Vec::new());
                    None
                }
            }
        };

        if let Some(rx) = waiter {
            return rx.await.unwrap_or(Err(LoadError::Abandoned));
        }

        self.attempts.set(self.attempts.get() + 1);
        let mut pending = PendingLoad {
            slot: &self.slot,
            armed: true,
        };
        let result = load().await;
        pending.armed = false;

        let settled = match &result {
            Ok(value) => Slot::Ready(value.clone()),
            Err(err) => Slot::Failed(err.clone()),
        };
        let previous = std::mem::replace(&mut *self.slot.borrow_mut(), settled);
        if let Slot::Loading(waiters) = previous {
            for waiter in waiters {
                let _ = waiter.send(result.clone());
            }
        }
        result
    }
}

/// Resets the slot if the driving future is dropped before the load settles.
struct PendingLoad<'a, T> {
    slot: &'a RefCell<Slot<T>>,
    armed: bool,
}

impl<T> Drop for PendingLoad<'_, T> {
    fn drop(&mut self) {
        if self.armed {
            // Dropping the queued senders wakes their receivers with `Canceled`.
            *self.slot.borrow_mut() = Slot::Unstarted;
        }
    }
}
