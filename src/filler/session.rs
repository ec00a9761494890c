/// Single-batch guard for the expense-site content script
use super::FillState;
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use uuid::Uuid;

/// Shared flag the overlay's Cancel button flips
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Rc<Cell<bool>>);

impl CancelToken {
    pub fn cancel(&self) {
        self.0.set(true);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.get()
    }
}

/// Owns the "a batch is running" token for one page
#[derive(Debug, Clone, Default)]
pub struct AutomationController {
    active: Rc<RefCell<Option<Uuid>>>,
}

impl AutomationController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the controller, or `None` if a batch already holds it
    pub fn try_begin(&self) -> Option<BatchSession> {
        let mut active = self.active.borrow_mut();
        if active.is_some() {
            return None;
        }
        let id = Uuid::new_v4();
        *active = Some(id);
        Some(BatchSession {
            id,
            active: self.active.clone(),
            cancel: CancelToken::default(),
            state: Rc::new(Cell::new(FillState::Idle)),
        })
    }

    pub fn is_processing(&self) -> bool {
        self.active.borrow().is_some()
    }
}

/// A running batch; releases the controller when dropped
#[derive(Debug)]
pub struct BatchSession {
    id: Uuid,
    active: Rc<RefCell<Option<Uuid>>>,
    cancel: CancelToken,
    state: Rc<Cell<FillState>>,
}

impl BatchSession {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    pub fn state(&self) -> FillState {
        self.state.get()
    }

    pub fn set_state(&self, state: FillState) {
        log::debug!("Batch {} -> {:?}", self.id, state);
        self.state.set(state);
    }
}

impl Drop for BatchSession {
    fn drop(&mut self) {
        let mut active = self.active.borrow_mut();
        if *active == Some(self.id) {
            *active = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_one_session_at_a_time() {
        let controller = AutomationController::new();

        let session = controller.try_begin();
        assert!(session.is_some());
        assert!(controller.is_processing());
        assert!(controller.try_begin().is_none());

        drop(session);
        assert!(!controller.is_processing());
        assert!(controller.try_begin().is_some());
    }

    #[test]
    fn test_clones_share_the_token() {
        let controller = AutomationController::new();
        let other = controller.clone();

        let _session = controller.try_begin().unwrap();

        assert!(other.is_processing());
        assert!(other.try_begin().is_none());
    }

    #[test]
    fn test_cancel_token() {
        let controller = AutomationController::new();
        let session = controller.try_begin().unwrap();
        let token = session.cancel_token();

        assert!(!session.is_cancelled());
        token.cancel();
        assert!(session.is_cancelled());
    }

    #[test]
    fn test_new_session_starts_idle() {
        let controller = AutomationController::new();
        let session = controller.try_begin().unwrap();

        assert_eq!(session.state(), FillState::Idle);
        session.set_state(FillState::FillingDate);
        assert_eq!(session.state(), FillState::FillingDate);
    }
}
