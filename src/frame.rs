// Cooperative frame loops.
//
// Drag, draw and animation each run a loop that is rescheduled on every animation frame until
// its gesture ends. A gesture record owns a `TaskHandle`; the loop holds the matching
// `CancelToken`. Replacing or clearing the record drops the handle, which cancels the token, so
// the loop terminates on its next frame without comparing state objects.

use std::cell::Cell;
use std::rc::Rc;


#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum FrameStatus {
    Continue,
    Done,
}

#[derive(Debug)]
pub struct TaskHandle {
    cancelled: Rc<Cell<bool>>,
}

#[derive(Clone, Debug)]
pub struct CancelToken {
    cancelled: Rc<Cell<bool>>,
}

impl TaskHandle {
    pub fn new() -> Self { TaskHandle { cancelled: Rc::new(Cell::new(false)) } }

    pub fn token(&self) -> CancelToken { CancelToken { cancelled: Rc::clone(&self.cancelled) } }
}

impl Drop for TaskHandle {
    fn drop(&mut self) { self.cancelled.set(true); }
}

impl CancelToken {
    pub fn is_cancelled(&self) -> bool { self.cancelled.get() }
}

// Coalesces redraw requests: only the first request after a `fire` asks for a new frame.
#[derive(Debug, Default)]
pub struct Debounce {
    pending: Cell<bool>,
}

impl Debounce {
    pub fn new() -> Self { Debounce { pending: Cell::new(false) } }

    // Returns true if the caller must schedule a frame.
    pub fn request(&self) -> bool { !self.pending.replace(true) }

    // Returns true if there was a pending request.
    pub fn fire(&self) -> bool { self.pending.replace(false) }

    pub fn is_pending(&self) -> bool { self.pending.get() }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_cancelled_when_handle_dropped() {
        let handle = TaskHandle::new();
        let token = handle.token();
        assert!(!token.is_cancelled());
        drop(handle);
        assert!(token.is_cancelled());
    }

    #[test]
    fn token_cancelled_when_handle_replaced() {
        let mut slot = Some(TaskHandle::new());
        let token = slot.as_ref().unwrap().token();
        slot.replace(TaskHandle::new());
        assert!(token.is_cancelled());
        assert!(!slot.unwrap().token().is_cancelled());
    }

    #[test]
    fn debounce() {
        let debounce = Debounce::new();
        assert!(debounce.request());
        assert!(!debounce.request());
        assert!(!debounce.request());
        assert!(debounce.fire());
        assert!(!debounce.fire());
        assert!(debounce.request());
    }
}
