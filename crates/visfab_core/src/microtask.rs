//! Microtask queue
//!
//! The scheduler never flushes from inside the write that dirtied a
//! component. It queues a microtask instead, and whoever owns the event loop
//! drains the queue once the current synchronous work has unwound.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

/// A queued unit of work
pub type Microtask = Box<dyn FnOnce()>;

/// FIFO queue of microtasks
#[derive(Default)]
pub struct MicrotaskQueue {
    tasks: RefCell<VecDeque<Microtask>>,
}

impl std::fmt::Debug for MicrotaskQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MicrotaskQueue")
            .field("pending", &self.pending())
            .finish()
    }
}

impl MicrotaskQueue {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    pub fn queue<F: FnOnce() + 'static>(&self, task: F) {
        self.tasks.borrow_mut().push_back(Box::new(task));
    }

    pub fn pending(&self) -> usize {
        self.tasks.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.borrow().is_empty()
    }

    /// Run queued tasks, including ones queued while draining, until the
    /// queue is empty. Returns how many ran.
    pub fn run_until_idle(&self) -> usize {
        let mut ran = 0;
        loop {
            let next = self.tasks.borrow_mut().pop_front();
            let Some(task) = next else {
                break;
            };
            task();
            ran += 1;
        }
        ran
    }
}
