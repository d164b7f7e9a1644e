//! Component instances
//!
//! A component is a list of value slots (`ctx`) plus a fragment that renders
//! them. Writes go through [`Component::invalidate`], which records the slot
//! in the dirty mask and queues the component with its scheduler; the
//! scheduler later calls `update`, which hands the dirty mask to the fragment
//! for patching.

use std::cell::RefCell;
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicU64, Ordering};

use rustc_hash::FxHashMap;
use visfab_dom::{Document, Dom, NodeId};

use crate::context::ContextMap;
use crate::dirty::DirtyMask;
use crate::error::{Result, RuntimeError};
use crate::lifecycle::{self, ComponentScope};
use crate::scheduler::Scheduler;
use crate::value::{NotEqual, Value};

/// Shared callback (after-update, render queue entries)
pub type Callback = Rc<dyn Fn()>;
/// One-shot teardown
pub type Cleanup = Box<dyn FnOnce()>;
/// Mount callback; the returned cleanup runs on destroy (or disconnect)
pub type MountCallback = Rc<dyn Fn() -> Option<Cleanup>>;
/// Listener for a bound slot or a component event
pub type ValueCallback = Rc<dyn Fn(&Value)>;
/// Initial property values by name
pub type Props = FxHashMap<String, Value>;

static NEXT_COMPONENT_ID: AtomicU64 = AtomicU64::new(1);

// =============================================================================
// Definition
// =============================================================================

/// Rendering half of a component
pub trait Fragment {
    /// Build detached nodes
    fn create(&mut self) -> visfab_dom::Result<()> {
        Ok(())
    }

    /// Insert the built nodes under `target`, before `anchor`
    fn mount(&mut self, target: NodeId, anchor: Option<NodeId>) -> visfab_dom::Result<()>;

    /// Bring the nodes in line with `ctx`. Only slots set in `dirty` changed.
    fn patch(&mut self, ctx: &[Value], dirty: &DirtyMask) -> visfab_dom::Result<()>;

    /// Release listeners and actions; remove nodes when `detaching`
    fn destroy(&mut self, detaching: bool);
}

/// Static description of a component type
pub trait ComponentDefinition {
    fn name(&self) -> &'static str;

    /// Public property names and the slot each maps to
    fn props(&self) -> &[(&'static str, usize)];

    /// Produce the initial slot values. Lifecycle helpers may be called here.
    fn instance(&self, component: &Component, props: &Props) -> Vec<Value>;

    /// Recompute derived slots. Runs before every patch and once before the
    /// first render.
    fn update(&self, _component: &Component) {}

    /// Normalise a value written to slot `index`. Runs on every write,
    /// before the change check.
    fn coerce(&self, _index: usize, value: Value) -> Value {
        value
    }

    /// `None` for components with nothing to render
    fn create_fragment(&self, component: &Component, ctx: &[Value]) -> Option<Box<dyn Fragment>>;
}

/// Options for [`Component::init`]
#[derive(Default)]
pub struct ComponentOptions {
    /// Mount under this node right away
    pub target: Option<NodeId>,
    pub anchor: Option<NodeId>,
    pub props: Props,
    /// Replaces the context that would otherwise be inherited
    pub context: Option<ContextMap>,
    /// Defaults to the component currently being initialised
    pub parent: Option<Component>,
    /// Custom element hosting the component, if any
    pub host: Option<NodeId>,
    /// Mount callbacks wait for `connected` instead of the first flush
    pub custom_element: bool,
    pub not_equal: Option<NotEqual>,
}

impl ComponentOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn target(mut self, target: NodeId) -> Self {
        self.target = Some(target);
        self
    }

    pub fn anchor(mut self, anchor: NodeId) -> Self {
        self.anchor = Some(anchor);
        self
    }

    pub fn prop(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.props.insert(name.into(), value.into());
        self
    }

    pub fn context(mut self, context: ContextMap) -> Self {
        self.context = Some(context);
        self
    }

    pub fn parent(mut self, parent: Component) -> Self {
        self.parent = Some(parent);
        self
    }

    pub fn host(mut self, host: NodeId) -> Self {
        self.host = Some(host);
        self.custom_element = true;
        self
    }

    pub fn not_equal(mut self, not_equal: NotEqual) -> Self {
        self.not_equal = Some(not_equal);
        self
    }
}

// =============================================================================
// Instance
// =============================================================================

type FragmentHandle = Rc<RefCell<Box<dyn Fragment>>>;

enum FragmentState {
    /// `instance` has not returned yet
    Pending,
    /// Nothing to render
    Headless,
    Live {
        fragment: FragmentHandle,
        created: bool,
    },
    Destroyed,
}

struct InstanceState {
    ctx: Option<Vec<Value>>,
    dirty: DirtyMask,
    ready: bool,
    skip_bound: bool,
    fragment: FragmentState,
    root: Option<NodeId>,
    before_update: Vec<Callback>,
    after_update: Vec<Callback>,
    on_mount: Vec<MountCallback>,
    /// `None` once destroyed
    on_destroy: Option<Vec<Cleanup>>,
    on_disconnect: Vec<Cleanup>,
    bound: FxHashMap<usize, ValueCallback>,
    callbacks: FxHashMap<String, Vec<(u64, ValueCallback)>>,
    next_subscription: u64,
    context: ContextMap,
}

struct Instance {
    id: u64,
    definition: Rc<dyn ComponentDefinition>,
    scheduler: Rc<Scheduler>,
    dom: Weak<Document>,
    host: Option<NodeId>,
    not_equal: NotEqual,
    state: RefCell<InstanceState>,
}

/// Handle to a live component instance
#[derive(Clone)]
pub struct Component(Rc<Instance>);

/// Non-owning handle, held by fragments and listeners
#[derive(Clone)]
pub struct WeakComponent(Weak<Instance>);

impl WeakComponent {
    pub fn upgrade(&self) -> Option<Component> {
        self.0.upgrade().map(Component)
    }
}

impl std::fmt::Debug for Component {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Component")
            .field("id", &self.0.id)
            .field("name", &self.0.definition.name())
            .finish()
    }
}

impl PartialEq for Component {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for Component {}

impl Component {
    /// Create a component: compute its slots, build its fragment and, when a
    /// target is given, mount it and flush synchronously.
    pub fn init(
        scheduler: &Rc<Scheduler>,
        dom: &Dom,
        definition: Rc<dyn ComponentDefinition>,
        options: ComponentOptions,
    ) -> Result<Component> {
        let ComponentOptions {
            target,
            anchor,
            props,
            context,
            parent,
            host,
            custom_element,
            not_equal,
        } = options;

        let parent = parent.or_else(lifecycle::current_component);
        let context = context
            .or_else(|| parent.as_ref().map(Component::context))
            .unwrap_or_default();

        let component = Component(Rc::new(Instance {
            id: NEXT_COMPONENT_ID.fetch_add(1, Ordering::Relaxed),
            definition: definition.clone(),
            scheduler: scheduler.clone(),
            dom: Rc::downgrade(dom),
            host,
            not_equal: not_equal.unwrap_or(Value::safe_not_equal),
            state: RefCell::new(InstanceState {
                ctx: None,
                dirty: DirtyMask::clean(),
                ready: false,
                skip_bound: false,
                fragment: FragmentState::Pending,
                root: target.or_else(|| parent.as_ref().and_then(Component::root)),
                before_update: Vec::new(),
                after_update: Vec::new(),
                on_mount: Vec::new(),
                on_destroy: Some(Vec::new()),
                on_disconnect: Vec::new(),
                bound: FxHashMap::default(),
                callbacks: FxHashMap::default(),
                next_subscription: 0,
                context,
            }),
        }));

        let _scope = ComponentScope::enter(Some(component.clone()));

        for name in props.keys() {
            if !definition.props().iter().any(|(prop, _)| prop == name) {
                tracing::warn!(component = definition.name(), prop = %name, "unknown prop ignored");
            }
        }

        let ctx = definition.instance(&component, &props);
        component.0.state.borrow_mut().ctx = Some(ctx);
        definition.update(&component);
        component.0.state.borrow_mut().ready = true;
        component.run_before_update();

        let ctx = component.ctx();
        let fragment = match definition.create_fragment(&component, &ctx) {
            Some(fragment) => FragmentState::Live {
                fragment: Rc::new(RefCell::new(fragment)),
                created: false,
            },
            None => FragmentState::Headless,
        };
        component.0.state.borrow_mut().fragment = fragment;

        tracing::debug!(
            component = definition.name(),
            id = component.0.id,
            mounted = target.is_some(),
            "component initialised"
        );

        if let Some(target) = target {
            component.mount_with(target, anchor, custom_element)?;
            scheduler.flush();
        }

        Ok(component)
    }

    /// Mount a component created without a target
    pub fn mount(&self, target: NodeId, anchor: Option<NodeId>) -> Result<()> {
        let custom_element = self.0.host.is_some();
        self.mount_with(target, anchor, custom_element)
    }

    fn mount_with(&self, target: NodeId, anchor: Option<NodeId>, custom_element: bool) -> Result<()> {
        let fragment = {
            let mut state = self.0.state.borrow_mut();
            state.root = Some(target);
            match &mut state.fragment {
                FragmentState::Live { fragment, created } => {
                    let first = !*created;
                    *created = true;
                    Some((fragment.clone(), first))
                }
                FragmentState::Headless => None,
                FragmentState::Pending | FragmentState::Destroyed => {
                    return Err(RuntimeError::Destroyed)
                }
            }
        };

        if let Some((fragment, first)) = fragment {
            let mut fragment = fragment.borrow_mut();
            if first {
                fragment.create()?;
            }
            fragment.mount(target, anchor)?;
        }

        if !custom_element {
            let weak = self.downgrade();
            self.0.scheduler.add_render_callback(Rc::new(move || {
                if let Some(component) = weak.upgrade() {
                    component.run_mount_callbacks();
                }
            }));
        }

        let after_update = self.0.state.borrow().after_update.clone();
        for callback in after_update {
            self.0.scheduler.add_render_callback(callback);
        }
        Ok(())
    }

    // =========================================================================
    // Slots
    // =========================================================================

    /// Write `value` into slot `index`. Returns whether the value changed.
    ///
    /// The value passes through [`ComponentDefinition::coerce`] first. A
    /// changed value notifies the slot's binding (unless a batched `set` is
    /// running) and, once the component is ready, marks the slot dirty.
    pub fn invalidate(&self, index: usize, value: impl Into<Value>) -> bool {
        let value = self.0.definition.coerce(index, value.into());
        let bound = {
            let mut state = self.0.state.borrow_mut();
            if matches!(state.fragment, FragmentState::Destroyed) {
                return false;
            }
            let skip_bound = state.skip_bound;
            let Some(slot) = state.ctx.as_mut().and_then(|ctx| ctx.get_mut(index)) else {
                return false;
            };
            if !(self.0.not_equal)(slot, &value) {
                return false;
            }
            *slot = value.clone();
            if skip_bound {
                None
            } else {
                state.bound.get(&index).cloned()
            }
        };

        if let Some(bound) = bound {
            bound(&value);
        }
        if self.0.state.borrow().ready {
            self.make_dirty(index);
        }
        true
    }

    fn make_dirty(&self, index: usize) {
        let first = self.0.state.borrow_mut().dirty.mark(index);
        if first {
            self.0.scheduler.enqueue(self.clone());
        }
    }

    /// Batched property write. Bindings are not notified for these writes.
    pub fn set<I, K, V>(&self, props: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<Value>,
    {
        let definition = self.0.definition.clone();
        self.0.state.borrow_mut().skip_bound = true;
        for (name, value) in props {
            let name = name.as_ref();
            match definition.props().iter().find(|(prop, _)| *prop == name) {
                Some((_, index)) => {
                    self.invalidate(*index, value);
                }
                None => {
                    tracing::warn!(component = definition.name(), prop = name, "unknown prop ignored");
                }
            }
        }
        self.0.state.borrow_mut().skip_bound = false;
    }

    pub fn get(&self, index: usize) -> Option<Value> {
        self.0.state.borrow().ctx.as_ref()?.get(index).cloned()
    }

    /// Current value of a public property
    pub fn prop(&self, name: &str) -> Option<Value> {
        let index = self.prop_index(name)?;
        self.get(index)
    }

    pub fn prop_index(&self, name: &str) -> Option<usize> {
        self.0
            .definition
            .props()
            .iter()
            .find(|(prop, _)| *prop == name)
            .map(|(_, index)| *index)
    }

    /// Snapshot of every slot
    pub fn ctx(&self) -> Vec<Value> {
        self.0.state.borrow().ctx.clone().unwrap_or_default()
    }

    pub fn dirty(&self) -> DirtyMask {
        self.0.state.borrow().dirty.clone()
    }

    /// Report every change of property `name` to `callback`, starting with
    /// the current value. Returns `false` for unknown properties.
    pub fn bind<F: Fn(&Value) + 'static>(&self, name: &str, callback: F) -> bool {
        let Some(index) = self.prop_index(name) else {
            return false;
        };
        let callback: ValueCallback = Rc::new(callback);
        self.0.state.borrow_mut().bound.insert(index, callback.clone());
        if let Some(value) = self.get(index) {
            callback(&value);
        }
        true
    }

    // =========================================================================
    // Update
    // =========================================================================

    pub(crate) fn update(&self) {
        let fragment = {
            let state = self.0.state.borrow();
            match &state.fragment {
                FragmentState::Live { fragment, .. } => Some(fragment.clone()),
                FragmentState::Headless => None,
                FragmentState::Pending | FragmentState::Destroyed => return,
            }
        };

        self.0.definition.update(self);
        self.run_before_update();

        let (ctx, dirty) = {
            let mut state = self.0.state.borrow_mut();
            let dirty = state.dirty.take();
            (state.ctx.clone().unwrap_or_default(), dirty)
        };

        if let Some(fragment) = fragment {
            if let Err(error) = fragment.borrow_mut().patch(&ctx, &dirty) {
                tracing::error!(component = self.name(), %error, "patch failed");
            }
        }

        let after_update = self.0.state.borrow().after_update.clone();
        for callback in after_update {
            self.0.scheduler.add_render_callback(callback);
        }
    }

    fn run_before_update(&self) {
        let callbacks = self.0.state.borrow().before_update.clone();
        for callback in callbacks {
            callback();
        }
    }

    fn run_mount_callbacks(&self) {
        let callbacks = std::mem::take(&mut self.0.state.borrow_mut().on_mount);
        let cleanups: Vec<Cleanup> = callbacks.iter().filter_map(|callback| callback()).collect();

        let orphaned = {
            let mut state = self.0.state.borrow_mut();
            match state.on_destroy.as_mut() {
                Some(on_destroy) => {
                    on_destroy.extend(cleanups);
                    None
                }
                None => Some(cleanups),
            }
        };
        // destroyed before its mount callbacks ran
        for cleanup in orphaned.into_iter().flatten() {
            cleanup();
        }
    }

    /// Custom element attached: run mount callbacks, keep their cleanups for
    /// `disconnected`
    pub(crate) fn connected(&self) {
        if self.is_destroyed() {
            return;
        }
        let callbacks = self.0.state.borrow().on_mount.clone();
        let cleanups: Vec<Cleanup> = callbacks.iter().filter_map(|callback| callback()).collect();
        let previous = std::mem::replace(&mut self.0.state.borrow_mut().on_disconnect, cleanups);
        for cleanup in previous {
            cleanup();
        }
    }

    pub(crate) fn disconnected(&self) {
        let cleanups = std::mem::take(&mut self.0.state.borrow_mut().on_disconnect);
        for cleanup in cleanups {
            cleanup();
        }
    }

    // =========================================================================
    // Destroy
    // =========================================================================

    /// Run destroy callbacks, then tear down the fragment. Returns `false`
    /// when the component was already destroyed.
    pub fn destroy(&self, detaching: bool) -> bool {
        let (fragment, cleanups) = {
            let mut state = self.0.state.borrow_mut();
            if matches!(state.fragment, FragmentState::Pending | FragmentState::Destroyed) {
                return false;
            }
            let fragment = std::mem::replace(&mut state.fragment, FragmentState::Destroyed);
            (fragment, state.on_destroy.take().unwrap_or_default())
        };

        for cleanup in cleanups {
            cleanup();
        }
        if let FragmentState::Live { fragment, .. } = fragment {
            fragment.borrow_mut().destroy(detaching);
        }

        let mut state = self.0.state.borrow_mut();
        state.ctx = Some(Vec::new());
        state.dirty = DirtyMask::clean();
        state.before_update.clear();
        state.after_update.clear();
        state.on_mount.clear();
        state.bound.clear();
        drop(state);

        tracing::debug!(component = self.name(), id = self.0.id, detaching, "component destroyed");
        true
    }

    pub fn is_destroyed(&self) -> bool {
        matches!(self.0.state.borrow().fragment, FragmentState::Destroyed)
    }

    // =========================================================================
    // Component events
    // =========================================================================

    /// Subscribe to a component event
    pub fn on<F: Fn(&Value) + 'static>(&self, event_type: &str, callback: F) -> Subscription {
        let mut state = self.0.state.borrow_mut();
        state.next_subscription += 1;
        let id = state.next_subscription;
        state
            .callbacks
            .entry(event_type.to_string())
            .or_default()
            .push((id, Rc::new(callback)));
        Subscription {
            component: self.downgrade(),
            event_type: event_type.to_string(),
            id,
        }
    }

    /// Call every subscriber of `event_type`. Returns how many were called.
    pub fn dispatch(&self, event_type: &str, detail: impl Into<Value>) -> usize {
        let detail = detail.into();
        let callbacks: Vec<ValueCallback> = self
            .0
            .state
            .borrow()
            .callbacks
            .get(event_type)
            .map(|list| list.iter().map(|(_, callback)| callback.clone()).collect())
            .unwrap_or_default();
        for callback in &callbacks {
            callback(&detail);
        }
        callbacks.len()
    }

    // =========================================================================
    // Registration (used by the lifecycle helpers)
    // =========================================================================

    pub(crate) fn push_on_mount(&self, callback: MountCallback) {
        self.0.state.borrow_mut().on_mount.push(callback);
    }

    pub(crate) fn push_before_update(&self, callback: Callback) {
        self.0.state.borrow_mut().before_update.push(callback);
    }

    pub(crate) fn push_after_update(&self, callback: Callback) {
        self.0.state.borrow_mut().after_update.push(callback);
    }

    /// Returns the cleanup back when the component is already destroyed
    pub(crate) fn push_on_destroy(&self, cleanup: Cleanup) -> Option<Cleanup> {
        match self.0.state.borrow_mut().on_destroy.as_mut() {
            Some(list) => {
                list.push(cleanup);
                None
            }
            None => Some(cleanup),
        }
    }

    pub(crate) fn with_context<R>(&self, f: impl FnOnce(&mut ContextMap) -> R) -> R {
        f(&mut self.0.state.borrow_mut().context)
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn id(&self) -> u64 {
        self.0.id
    }

    pub fn name(&self) -> &'static str {
        self.0.definition.name()
    }

    pub fn scheduler(&self) -> &Rc<Scheduler> {
        &self.0.scheduler
    }

    pub fn dom(&self) -> Option<Dom> {
        self.0.dom.upgrade()
    }

    /// Custom element hosting this component
    pub fn host(&self) -> Option<NodeId> {
        self.0.host
    }

    /// Node the component is (or will be) mounted under
    pub fn root(&self) -> Option<NodeId> {
        self.0.state.borrow().root
    }

    pub fn context(&self) -> ContextMap {
        self.0.state.borrow().context.clone()
    }

    pub fn downgrade(&self) -> WeakComponent {
        WeakComponent(Rc::downgrade(&self.0))
    }
}

/// Handle returned by [`Component::on`]
#[derive(Debug)]
pub struct Subscription {
    component: WeakComponent,
    event_type: String,
    id: u64,
}

impl std::fmt::Debug for WeakComponent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.upgrade() {
            Some(component) => write!(f, "WeakComponent({component:?})"),
            None => f.write_str("WeakComponent(<dropped>)"),
        }
    }
}

impl Subscription {
    /// Remove the listener. Returns `false` if it was already removed.
    pub fn unsubscribe(&self) -> bool {
        let Some(component) = self.component.upgrade() else {
            return false;
        };
        let mut state = component.0.state.borrow_mut();
        let Some(list) = state.callbacks.get_mut(&self.event_type) else {
            return false;
        };
        let before = list.len();
        list.retain(|(id, _)| *id != self.id);
        before != list.len()
    }
}
