/// Scoped guard against re-entrant linked-pane propagation

use std::cell::Cell;
use std::rc::Rc;

/// Shared flag that is set while a linked fan-out is running.
#[derive(Debug, Clone, Default)]
pub struct LinkLock {
    held: Rc<Cell<bool>>,
}

/// Releases the lock on drop, on every exit path.
#[derive(Debug)]
pub struct LinkGuard {
    held: Rc<Cell<bool>>,
}

impl LinkLock {
    pub fn new() -> Self {
        Self::default()
    }

    /// `None` when a fan-out is already in progress.
    pub fn try_acquire(&self) -> Option<LinkGuard> {
        if self.held.replace(true) {
            return None;
        }
        Some(LinkGuard {
            held: Rc::clone(&self.held),
        })
    }

    pub fn is_held(&self) -> bool {
        self.held.get()
    }
}

impl Drop for LinkGuard {
    fn drop(&mut self) {
        self.held.set(false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guard_is_exclusive_and_released() {
        let lock = LinkLock::new();
        {
            let _g = lock.try_acquire().unwrap();
            assert!(lock.is_held());
            assert!(lock.try_acquire().is_none());
            assert!(lock.clone().try_acquire().is_none());
        }
        assert!(!lock.is_held());
        assert!(lock.try_acquire().is_some());
    }

    #[test]
    fn test_released_on_early_return() {
        fn fan_out(lock: &LinkLock, bail: bool) -> Option<()> {
            let _g = lock.try_acquire()?;
            if bail {
                return None;
            }
            Some(())
        }
        let lock = LinkLock::new();
        assert!(fan_out(&lock, true).is_none());
        assert!(!lock.is_held());
        assert!(fan_out(&lock, false).is_some());
    }
}
