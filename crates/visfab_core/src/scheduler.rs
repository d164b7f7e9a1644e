//! Update scheduler
//!
//! Owns the dirty-component queue and the callback queues of one runtime.
//! Writes that dirty a component enqueue it and schedule a single microtask;
//! the microtask runs [`Scheduler::flush`], which drains everything that became
//! dirty in the meantime in one pass.
//!
//! `flush` calls callbacks in this order:
//!
//! 1. `update` + before-update callbacks of every dirty component, in queue
//!    order (parents before children), each followed by its patch
//! 2. binding callbacks, in reverse order (children before parents)
//! 3. after-update callbacks, in order (parents before children), except the
//!    mount callbacks of a first render, which are queued while children are
//!    still mounting and therefore run children first
//!
//! Callbacks may write to components again. Components dirtied while the
//! queue drains are appended to the same queue; the drain index lives on the
//! scheduler so a nested `flush` continues where the outer one stopped. A
//! component dirtied by an after-update callback starts another round of the
//! same flush, and the seen set keeps any after-update callback from running
//! twice within it.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use rustc_hash::FxHashMap;

use crate::component::{Callback, Component};
use crate::lifecycle::ComponentScope;
use crate::microtask::MicrotaskQueue;

/// Batched update scheduler shared by every component of a runtime
pub struct Scheduler {
    this: Weak<Scheduler>,
    microtasks: Rc<MicrotaskQueue>,
    dirty_components: RefCell<Vec<Component>>,
    /// Drain position; kept outside `flush` so nested calls resume
    flush_index: Cell<usize>,
    binding_callbacks: RefCell<Vec<Callback>>,
    render_callbacks: RefCell<Vec<Callback>>,
    flush_callbacks: RefCell<Vec<Callback>>,
    /// Keyed by callback address; holding the `Rc` pins the address for the pass
    seen_callbacks: RefCell<FxHashMap<usize, Callback>>,
    update_scheduled: Cell<bool>,
    flushes: Cell<u64>,
}

impl std::fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scheduler")
            .field("dirty", &self.dirty_components.borrow().len())
            .field("update_scheduled", &self.update_scheduled.get())
            .field("flushes", &self.flushes.get())
            .finish()
    }
}

fn callback_key(callback: &Callback) -> usize {
    Rc::as_ptr(callback) as *const () as usize
}

impl Scheduler {
    pub fn new(microtasks: Rc<MicrotaskQueue>) -> Rc<Self> {
        Rc::new_cyclic(|this| Scheduler {
            this: this.clone(),
            microtasks,
            dirty_components: RefCell::new(Vec::new()),
            flush_index: Cell::new(0),
            binding_callbacks: RefCell::new(Vec::new()),
            render_callbacks: RefCell::new(Vec::new()),
            flush_callbacks: RefCell::new(Vec::new()),
            seen_callbacks: RefCell::new(FxHashMap::default()),
            update_scheduled: Cell::new(false),
            flushes: Cell::new(0),
        })
    }

    pub fn microtasks(&self) -> &Rc<MicrotaskQueue> {
        &self.microtasks
    }

    /// Whether a flush microtask is queued and has not completed yet
    pub fn is_pending(&self) -> bool {
        self.update_scheduled.get()
    }

    /// Number of completed `flush` calls
    pub fn flush_count(&self) -> u64 {
        self.flushes.get()
    }

    /// Components currently waiting in the dirty queue
    pub fn dirty_count(&self) -> usize {
        self.dirty_components.borrow().len() - self.flush_index.get()
    }

    /// Queue a flush microtask unless one is already pending
    pub fn schedule_update(&self) {
        if self.update_scheduled.replace(true) {
            return;
        }
        let this = self.this.clone();
        self.microtasks.queue(move || {
            if let Some(scheduler) = this.upgrade() {
                scheduler.flush();
            }
        });
        tracing::trace!("flush scheduled");
    }

    pub(crate) fn enqueue(&self, component: Component) {
        self.dirty_components.borrow_mut().push(component);
        self.schedule_update();
    }

    /// Queue a callback for the after-update phase of the current pass
    pub fn add_render_callback(&self, callback: Callback) {
        self.render_callbacks.borrow_mut().push(callback);
    }

    /// Queue a callback that runs once the dirty queue is drained, before
    /// after-update callbacks. Binding callbacks run last-in first-out.
    pub fn add_binding_callback<F: Fn() + 'static>(&self, callback: F) {
        self.binding_callbacks.borrow_mut().push(Rc::new(callback));
    }

    /// Queue a one-shot callback for the end of the current (or next) flush
    pub fn add_flush_callback<F: Fn() + 'static>(&self, callback: F) {
        self.flush_callbacks.borrow_mut().push(Rc::new(callback));
    }

    /// Drain every dirty component and every queued callback
    pub fn flush(&self) {
        let _restore = ComponentScope::enter(None);
        let mut rounds = 0usize;

        loop {
            loop {
                let next = self
                    .dirty_components
                    .borrow()
                    .get(self.flush_index.get())
                    .cloned();
                let Some(component) = next else {
                    break;
                };
                self.flush_index.set(self.flush_index.get() + 1);
                let _current = ComponentScope::enter(Some(component.clone()));
                component.update();
            }

            self.dirty_components.borrow_mut().clear();
            self.flush_index.set(0);

            loop {
                let next = self.binding_callbacks.borrow_mut().pop();
                let Some(callback) = next else {
                    break;
                };
                callback();
            }

            let mut index = 0;
            loop {
                let next = self.render_callbacks.borrow().get(index).cloned();
                let Some(callback) = next else {
                    break;
                };
                index += 1;
                let first_run = self
                    .seen_callbacks
                    .borrow_mut()
                    .insert(callback_key(&callback), callback.clone())
                    .is_none();
                if first_run {
                    callback();
                }
            }
            self.render_callbacks.borrow_mut().clear();
            rounds += 1;

            if self.dirty_components.borrow().is_empty() {
                break;
            }
        }

        loop {
            let next = self.flush_callbacks.borrow_mut().pop();
            let Some(callback) = next else {
                break;
            };
            callback();
        }

        self.update_scheduled.set(false);
        self.seen_callbacks.borrow_mut().clear();
        self.flushes.set(self.flushes.get() + 1);
        tracing::trace!(rounds, flush = self.flushes.get(), "flush complete");
    }
}
