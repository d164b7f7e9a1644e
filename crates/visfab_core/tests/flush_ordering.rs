//! Integration tests for batched updates and lifecycle ordering
//!
//! These tests verify that:
//! - Writes in one synchronous block produce a single patch
//! - Parents update before children, children mount before parents
//! - Destroy runs its callbacks once and removes the rendered nodes
//! - Context flows from parent to child at creation time
//! - Custom element hosts run mount callbacks on connect

use std::cell::RefCell;
use std::rc::Rc;

use visfab_core::{
    after_update, before_update, get_context, on_destroy, on_mount, set_context, Cleanup, Component,
    ComponentDefinition, ComponentOptions, ComponentScope, DirtyMask, ElementHost, Fragment,
    MicrotaskQueue, Props, Scheduler, Value,
};
use visfab_dom::{Document, Dom, NodeId};

type Log = Rc<RefCell<Vec<String>>>;

/// Component with `value` and a derived `doubled` slot that logs every hook
struct Tracer {
    label: &'static str,
    log: Log,
    child: Option<Rc<Tracer>>,
}

impl Tracer {
    fn new(label: &'static str, log: &Log) -> Rc<Self> {
        Rc::new(Self {
            label,
            log: log.clone(),
            child: None,
        })
    }

    fn with_child(label: &'static str, log: &Log, child: Rc<Tracer>) -> Rc<Self> {
        Rc::new(Self {
            label,
            log: log.clone(),
            child: Some(child),
        })
    }
}

fn record(log: &Log, label: &str, what: &str) {
    log.borrow_mut().push(format!("{label}:{what}"));
}

impl ComponentDefinition for Tracer {
    fn name(&self) -> &'static str {
        self.label
    }

    fn props(&self) -> &[(&'static str, usize)] {
        &[("value", 0)]
    }

    fn instance(&self, _component: &Component, props: &Props) -> Vec<Value> {
        let label = self.label;

        let log = self.log.clone();
        before_update(move || record(&log, label, "before")).unwrap();
        let log = self.log.clone();
        after_update(move || record(&log, label, "after")).unwrap();
        let log = self.log.clone();
        on_mount(move || {
            record(&log, label, "mount");
            let log = log.clone();
            Some(Box::new(move || record(&log, label, "cleanup")) as Cleanup)
        })
        .unwrap();
        let log = self.log.clone();
        on_destroy(move || record(&log, label, "destroy")).unwrap();

        let value = props.get("value").cloned().unwrap_or(Value::Number(0.0));
        vec![value, Value::Null]
    }

    fn update(&self, component: &Component) {
        let value = component.get(0).and_then(|v| v.as_number()).unwrap_or(0.0);
        component.invalidate(1, value * 2.0);
    }

    fn create_fragment(&self, component: &Component, _ctx: &[Value]) -> Option<Box<dyn Fragment>> {
        Some(Box::new(TracerFragment {
            label: self.label,
            log: self.log.clone(),
            dom: component.dom()?,
            scheduler: component.scheduler().clone(),
            value: component.get(0).unwrap_or_default(),
            child_definition: self.child.clone(),
            node: None,
            child: None,
        }))
    }
}

struct TracerFragment {
    label: &'static str,
    log: Log,
    dom: Dom,
    scheduler: Rc<Scheduler>,
    value: Value,
    child_definition: Option<Rc<Tracer>>,
    node: Option<NodeId>,
    child: Option<Component>,
}

impl Fragment for TracerFragment {
    fn create(&mut self) -> visfab_dom::Result<()> {
        let node = self.dom.create_element("div");
        self.dom.set_attribute(node, "data-label", self.label)?;
        self.node = Some(node);
        if let Some(definition) = self.child_definition.clone() {
            let child = Component::init(
                &self.scheduler,
                &self.dom,
                definition,
                ComponentOptions::new().prop("value", self.value.clone()),
            )
            .expect("child init");
            self.child = Some(child);
        }
        Ok(())
    }

    fn mount(&mut self, target: NodeId, anchor: Option<NodeId>) -> visfab_dom::Result<()> {
        let node = self.node.expect("created before mount");
        self.dom.insert(target, node, anchor)?;
        if let Some(child) = &self.child {
            child.mount(node, None).expect("child mount");
        }
        Ok(())
    }

    fn patch(&mut self, ctx: &[Value], dirty: &DirtyMask) -> visfab_dom::Result<()> {
        record(&self.log, self.label, "patch");
        let node = self.node.expect("created before patch");
        if dirty.is_dirty(1) {
            self.dom.attr(node, "data-doubled", ctx[1].to_css().as_deref())?;
        }
        if dirty.is_dirty(0) {
            if let Some(child) = &self.child {
                child.set([("value", ctx[0].clone())]);
            }
        }
        Ok(())
    }

    fn destroy(&mut self, detaching: bool) {
        if let Some(child) = self.child.take() {
            child.destroy(false);
        }
        if detaching {
            if let Some(node) = self.node {
                let _ = self.dom.detach(node);
            }
        }
        record(&self.log, self.label, "teardown");
    }
}

struct Runtime {
    queue: Rc<MicrotaskQueue>,
    scheduler: Rc<Scheduler>,
    dom: Dom,
    log: Log,
}

fn runtime() -> Runtime {
    let queue = MicrotaskQueue::new();
    Runtime {
        scheduler: Scheduler::new(queue.clone()),
        queue,
        dom: Document::new(),
        log: Rc::new(RefCell::new(Vec::new())),
    }
}

impl Runtime {
    fn take_log(&self) -> Vec<String> {
        std::mem::take(&mut *self.log.borrow_mut())
    }
}

#[test]
fn test_writes_in_one_block_patch_once() {
    let rt = runtime();
    let tracer = Component::init(
        &rt.scheduler,
        &rt.dom,
        Tracer::new("solo", &rt.log),
        ComponentOptions::new().target(rt.dom.body()),
    )
    .unwrap();
    rt.take_log();

    tracer.set([("value", 1.0)]);
    tracer.set([("value", 2.0)]);
    tracer.invalidate(0, 3.0);

    assert_eq!(rt.queue.pending(), 1);
    assert!(rt.take_log().is_empty());

    rt.queue.run_until_idle();
    assert_eq!(rt.take_log(), vec!["solo:before", "solo:patch", "solo:after"]);

    let node = rt.dom.find_by_tag(rt.dom.body(), "div").unwrap();
    assert_eq!(rt.dom.attribute(node, "data-doubled").as_deref(), Some("6"));
}

#[test]
fn test_equal_write_schedules_nothing() {
    let rt = runtime();
    let tracer = Component::init(
        &rt.scheduler,
        &rt.dom,
        Tracer::new("solo", &rt.log),
        ComponentOptions::new().target(rt.dom.body()).prop("value", 4.0),
    )
    .unwrap();
    let flushes = rt.scheduler.flush_count();

    assert!(!tracer.invalidate(0, 4.0));
    assert!(rt.queue.is_empty());
    assert!(!rt.scheduler.is_pending());
    rt.queue.run_until_idle();
    assert_eq!(rt.scheduler.flush_count(), flushes);
}

#[test]
fn test_children_mount_first() {
    let rt = runtime();
    let child = Tracer::new("child", &rt.log);
    let _parent = Component::init(
        &rt.scheduler,
        &rt.dom,
        Tracer::with_child("parent", &rt.log, child),
        ComponentOptions::new().target(rt.dom.body()),
    )
    .unwrap();

    assert_eq!(
        rt.take_log(),
        vec![
            "parent:before",
            "child:before",
            "child:mount",
            "child:after",
            "parent:mount",
            "parent:after",
        ]
    );
    assert!(rt.queue.is_empty());
}

#[test]
fn test_parents_update_first() {
    let rt = runtime();
    let child = Tracer::new("child", &rt.log);
    let parent = Component::init(
        &rt.scheduler,
        &rt.dom,
        Tracer::with_child("parent", &rt.log, child),
        ComponentOptions::new().target(rt.dom.body()),
    )
    .unwrap();
    rt.take_log();

    parent.set([("value", 2.0)]);
    rt.queue.run_until_idle();

    assert_eq!(
        rt.take_log(),
        vec![
            "parent:before",
            "parent:patch",
            "child:before",
            "child:patch",
            "parent:after",
            "child:after",
        ]
    );
    // one flush covered both components
    assert_eq!(rt.scheduler.flush_count(), 2);
}

#[test]
fn test_destroy_runs_callbacks_once_and_detaches() {
    let rt = runtime();
    let child = Tracer::new("child", &rt.log);
    let parent = Component::init(
        &rt.scheduler,
        &rt.dom,
        Tracer::with_child("parent", &rt.log, child),
        ComponentOptions::new().target(rt.dom.body()),
    )
    .unwrap();
    rt.take_log();

    assert!(parent.destroy(true));
    assert_eq!(
        rt.take_log(),
        vec![
            "parent:destroy",
            "parent:cleanup",
            "child:destroy",
            "child:cleanup",
            "child:teardown",
            "parent:teardown",
        ]
    );
    assert!(rt.dom.children(rt.dom.body()).is_empty());

    assert!(!parent.destroy(true));
    assert!(!parent.invalidate(0, 9.0));
    assert!(rt.take_log().is_empty());
    assert!(rt.queue.is_empty());
}

#[test]
fn test_destroy_with_pending_update_skips_patch() {
    let rt = runtime();
    let tracer = Component::init(
        &rt.scheduler,
        &rt.dom,
        Tracer::new("solo", &rt.log),
        ComponentOptions::new().target(rt.dom.body()),
    )
    .unwrap();
    tracer.set([("value", 5.0)]);
    tracer.destroy(true);
    rt.take_log();

    rt.queue.run_until_idle();
    assert!(rt.take_log().is_empty());
}

#[test]
fn test_after_update_runs_once_per_flush() {
    struct Echo {
        log: Log,
    }

    struct EchoFragment {
        log: Log,
    }

    impl Fragment for EchoFragment {
        fn create(&mut self) -> visfab_dom::Result<()> {
            Ok(())
        }

        fn mount(&mut self, _target: NodeId, _anchor: Option<NodeId>) -> visfab_dom::Result<()> {
            Ok(())
        }

        fn patch(&mut self, ctx: &[Value], _dirty: &DirtyMask) -> visfab_dom::Result<()> {
            let count = ctx[0].as_number().unwrap_or(0.0);
            record(&self.log, "echo", &format!("patch {count}"));
            Ok(())
        }

        fn destroy(&mut self, _detaching: bool) {}
    }

    impl ComponentDefinition for Echo {
        fn name(&self) -> &'static str {
            "echo"
        }

        fn props(&self) -> &[(&'static str, usize)] {
            &[("count", 0)]
        }

        fn instance(&self, component: &Component, _props: &Props) -> Vec<Value> {
            let weak = component.downgrade();
            let log = self.log.clone();
            after_update(move || {
                let Some(component) = weak.upgrade() else {
                    return;
                };
                record(&log, "echo", "after");
                let count = component.get(0).and_then(|v| v.as_number()).unwrap_or(0.0);
                component.invalidate(0, count + 1.0);
            })
            .unwrap();
            vec![Value::Number(0.0)]
        }

        fn create_fragment(&self, _: &Component, _: &[Value]) -> Option<Box<dyn Fragment>> {
            Some(Box::new(EchoFragment { log: self.log.clone() }))
        }
    }

    let rt = runtime();
    let echo = Component::init(
        &rt.scheduler,
        &rt.dom,
        Rc::new(Echo { log: rt.log.clone() }),
        ComponentOptions::new(),
    )
    .unwrap();
    echo.mount(rt.dom.body(), None).unwrap();
    assert_eq!(rt.scheduler.flush_count(), 0);

    echo.invalidate(0, 10.0);
    rt.queue.run_until_idle();

    // the write from after_update is patched in a second round of the same
    // flush, and the callback is not re-entered
    assert_eq!(rt.take_log(), vec!["echo:patch 10", "echo:after", "echo:patch 11"]);
    assert_eq!(echo.get(0), Some(Value::Number(11.0)));
    assert_eq!(rt.scheduler.flush_count(), 1);
    assert!(echo.dirty().is_clean());
}

#[test]
fn test_context_is_inherited_at_creation() {
    struct Provider;

    impl ComponentDefinition for Provider {
        fn name(&self) -> &'static str {
            "provider"
        }

        fn props(&self) -> &[(&'static str, usize)] {
            &[]
        }

        fn instance(&self, _: &Component, _: &Props) -> Vec<Value> {
            set_context("theme", String::from("dark")).unwrap();
            Vec::new()
        }

        fn create_fragment(&self, _: &Component, _: &[Value]) -> Option<Box<dyn Fragment>> {
            None
        }
    }

    struct Consumer {
        seen: Rc<RefCell<Option<String>>>,
    }

    impl ComponentDefinition for Consumer {
        fn name(&self) -> &'static str {
            "consumer"
        }

        fn props(&self) -> &[(&'static str, usize)] {
            &[]
        }

        fn instance(&self, _: &Component, _: &Props) -> Vec<Value> {
            let theme = get_context::<String>("theme").unwrap();
            *self.seen.borrow_mut() = theme.map(|theme| theme.as_str().to_string());
            set_context("local", 1u32).unwrap();
            Vec::new()
        }

        fn create_fragment(&self, _: &Component, _: &[Value]) -> Option<Box<dyn Fragment>> {
            None
        }
    }

    let rt = runtime();
    let provider = Component::init(&rt.scheduler, &rt.dom, Rc::new(Provider), ComponentOptions::new()).unwrap();

    let seen = Rc::new(RefCell::new(None));
    let consumer = Component::init(
        &rt.scheduler,
        &rt.dom,
        Rc::new(Consumer { seen: seen.clone() }),
        ComponentOptions::new().parent(provider.clone()),
    )
    .unwrap();

    assert_eq!(seen.borrow().as_deref(), Some("dark"));
    assert!(consumer.context().contains("local"));
    assert!(!provider.context().contains("local"));

    // later parent writes are not pushed down
    {
        let _scope = ComponentScope::enter(Some(provider.clone()));
        set_context("late", true).unwrap();
    }
    assert!(provider.context().contains("late"));
    assert!(!consumer.context().contains("late"));
}

#[test]
fn test_custom_element_mounts_on_connect() {
    let rt = runtime();
    let host = rt.dom.create_element("x-tracer");
    let element = ElementHost::attach(&rt.dom, host, ":host { display: block; }").unwrap();

    let component = Component::init(
        &rt.scheduler,
        &rt.dom,
        Tracer::new("element", &rt.log),
        ComponentOptions::new().host(host).target(element.shadow_root()),
    )
    .unwrap();
    element.bind(component);

    // mount callbacks wait for the connection
    assert_eq!(rt.take_log(), vec!["element:before", "element:after"]);

    element.connected();
    element.disconnected();
    element.connected();
    assert_eq!(
        rt.take_log(),
        vec!["element:mount", "element:cleanup", "element:mount"]
    );

    let style = rt.dom.find_by_tag(element.shadow_root(), "style").unwrap();
    assert_eq!(rt.dom.parent(style), Some(element.shadow_root()));

    assert!(element.destroy());
    assert!(!element.destroy());
    assert_eq!(rt.take_log(), vec!["element:destroy", "element:teardown"]);
    assert!(rt.dom.find_by_tag(element.shadow_root(), "div").is_none());
}
