//! Headless scenarios
//!
//! A scenario is a JSON file describing a sequence of interactions with one
//! `vis-fab` element and the expectations to check along the way:
//!
//! ```json
//! {
//!   "name": "toggle then dismiss",
//!   "steps": [
//!     { "step": "call", "method": "toggle" },
//!     { "step": "expect_events", "events": ["open", "toggle"] },
//!     { "step": "drain" },
//!     { "step": "click", "on": "outside" },
//!     { "step": "expect_opened", "value": false }
//!   ]
//! }
//! ```

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::rc::Rc;

use anyhow::{Context, Result};
use serde::Deserialize;
use visfab_core::{MicrotaskQueue, Scheduler};
use visfab_dom::{Document, Dom, Event, ListenerOptions, NodeId};
use visfab_widgets::fab::{CLOSE, OPEN, TOGGLE};
use visfab_widgets::{register, FabConfig, FabElement, TAG};

#[derive(Debug, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub name: Option<String>,
    /// Attributes set right after the element is connected
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
    pub steps: Vec<Step>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Method {
    Open,
    Close,
    Toggle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClickTarget {
    /// The document body
    Outside,
    /// The button face
    Inside,
    /// The hidden checkbox
    Checkbox,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum Step {
    SetAttribute {
        name: String,
        value: String,
    },
    RemoveAttribute {
        name: String,
    },
    /// Batched property write; applied on the next drain
    Set {
        props: BTreeMap<String, String>,
    },
    Call {
        method: Method,
    },
    Click {
        on: ClickTarget,
        #[serde(default)]
        handled: bool,
    },
    /// Run queued microtasks
    Drain,
    Destroy,
    ExpectOpened {
        value: bool,
    },
    /// Events emitted since the previous `expect_events`
    ExpectEvents {
        events: Vec<String>,
    },
    ExpectStyle {
        property: String,
        value: Option<String>,
    },
    ExpectState {
        value: String,
    },
}

impl Scenario {
    pub fn from_json(content: &str) -> Result<Self> {
        serde_json::from_str(content).context("Failed to parse scenario")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::from_json(&content).with_context(|| format!("Invalid scenario {}", path.display()))
    }
}

/// Outcome of a scenario run
#[derive(Debug, Default)]
pub struct Report {
    pub steps: usize,
    pub failures: Vec<String>,
}

impl Report {
    pub fn passed(&self) -> bool {
        self.failures.is_empty()
    }
}

/// One document with one connected `vis-fab`
pub struct Runner {
    queue: Rc<MicrotaskQueue>,
    dom: Dom,
    node: NodeId,
    fab: Rc<FabElement>,
    events: Rc<RefCell<Vec<String>>>,
}

impl Runner {
    pub fn new(config: FabConfig) -> Result<Self> {
        let queue = MicrotaskQueue::new();
        let scheduler = Scheduler::new(queue.clone());
        let dom = Document::new();
        register(&dom, &scheduler, config).context("Failed to register vis-fab")?;

        let node = dom.create_custom_element(TAG)?;
        dom.append(dom.body(), node)?;
        let fab = dom
            .custom_element::<FabElement>(node)
            .context("vis-fab element was not upgraded")?;

        let events = Rc::new(RefCell::new(Vec::new()));
        for name in [OPEN, CLOSE, TOGGLE] {
            let events = events.clone();
            dom.add_event_listener(node, name, ListenerOptions::default(), move |event| {
                events.borrow_mut().push(event.event_type().to_string());
            });
        }

        Ok(Self {
            queue,
            dom,
            node,
            fab,
            events,
        })
    }

    pub fn run(&self, scenario: &Scenario) -> Result<Report> {
        for (name, value) in &scenario.attributes {
            self.dom.set_attribute(self.node, name, value)?;
        }

        let mut report = Report::default();
        for (index, step) in scenario.steps.iter().enumerate() {
            tracing::debug!(index, ?step, "step");
            if let Some(failure) = self.step(step).with_context(|| format!("step {index}"))? {
                report.failures.push(format!("step {index}: {failure}"));
            }
            report.steps += 1;
        }
        Ok(report)
    }

    /// Run one step. `Ok(Some(_))` is a failed expectation.
    fn step(&self, step: &Step) -> Result<Option<String>> {
        match step {
            Step::SetAttribute { name, value } => self.dom.set_attribute(self.node, name, value)?,
            Step::RemoveAttribute { name } => self.dom.remove_attribute(self.node, name)?,
            Step::Set { props } => self
                .fab
                .set(props.iter().map(|(name, value)| (name.as_str(), value.as_str())))?,
            Step::Call { method } => {
                match method {
                    Method::Open => self.fab.open()?,
                    Method::Close => self.fab.close()?,
                    Method::Toggle => self.fab.toggle()?,
                };
            }
            Step::Click { on, handled } => {
                let target = self.click_target(*on)?;
                let mut event = Event::click();
                if *handled {
                    event.prevent_default();
                }
                self.dom.dispatch_event(target, event);
            }
            Step::Drain => {
                let ran = self.queue.run_until_idle();
                tracing::trace!(ran, "drained microtasks");
            }
            Step::Destroy => {
                self.fab.destroy();
            }
            Step::ExpectOpened { value } => {
                let opened = self.fab.opened();
                if opened != *value {
                    return Ok(Some(format!("expected opened = {value}, got {opened}")));
                }
            }
            Step::ExpectEvents { events } => {
                let seen = std::mem::take(&mut *self.events.borrow_mut());
                if &seen != events {
                    return Ok(Some(format!("expected events {events:?}, got {seen:?}")));
                }
            }
            Step::ExpectStyle { property, value } => {
                let actual = self.wrapper().and_then(|wrapper| self.dom.style(wrapper, property));
                if &actual != value {
                    return Ok(Some(format!("expected {property} = {value:?}, got {actual:?}")));
                }
            }
            Step::ExpectState { value } => {
                let actual = self
                    .wrapper()
                    .and_then(|wrapper| self.dom.attribute(wrapper, "data-state"));
                if actual.as_deref() != Some(value.as_str()) {
                    return Ok(Some(format!("expected data-state = {value}, got {actual:?}")));
                }
            }
        }
        Ok(None)
    }

    fn wrapper(&self) -> Option<NodeId> {
        self.dom.find_by_tag(self.fab.shadow_root(), "div")
    }

    fn click_target(&self, on: ClickTarget) -> Result<NodeId> {
        let target = match on {
            ClickTarget::Outside => Some(self.dom.body()),
            ClickTarget::Checkbox => self.dom.find_by_tag(self.fab.shadow_root(), "input"),
            ClickTarget::Inside => self.wrapper().and_then(|wrapper| {
                self.dom
                    .children(wrapper)
                    .into_iter()
                    .find(|child| self.dom.attribute(*child, "class").as_deref() == Some("vis-fab"))
            }),
        };
        target.with_context(|| format!("no {on:?} click target (element destroyed?)"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOGGLE_SCENARIO: &str = r#"{
        "name": "toggle",
        "attributes": { "position": "top left" },
        "steps": [
            { "step": "expect_style", "property": "--positiony", "value": "initial" },
            { "step": "call", "method": "toggle" },
            { "step": "expect_events", "events": ["open", "toggle"] },
            { "step": "expect_state", "value": "closed" },
            { "step": "drain" },
            { "step": "expect_state", "value": "open" },
            { "step": "click", "on": "inside" },
            { "step": "expect_opened", "value": true },
            { "step": "click", "on": "outside", "handled": true },
            { "step": "expect_opened", "value": true },
            { "step": "click", "on": "outside" },
            { "step": "expect_opened", "value": false },
            { "step": "expect_events", "events": ["close"] },
            { "step": "remove_attribute", "name": "position" },
            { "step": "expect_style", "property": "--positiony", "value": "0" }
        ]
    }"#;

    #[test]
    fn test_parse_steps() {
        let scenario = Scenario::from_json(TOGGLE_SCENARIO).unwrap();
        assert_eq!(scenario.name.as_deref(), Some("toggle"));
        assert_eq!(scenario.steps.len(), 15);
        assert!(matches!(scenario.steps[1], Step::Call { method: Method::Toggle }));
        assert!(matches!(
            scenario.steps[8],
            Step::Click {
                on: ClickTarget::Outside,
                handled: true
            }
        ));
    }

    #[test]
    fn test_unknown_step_is_rejected() {
        let err = Scenario::from_json(r#"{ "steps": [{ "step": "hover" }] }"#).unwrap_err();
        assert!(format!("{err:#}").contains("hover"));
    }

    #[test]
    fn test_toggle_scenario_passes() {
        let scenario = Scenario::from_json(TOGGLE_SCENARIO).unwrap();
        let report = Runner::new(FabConfig::full()).unwrap().run(&scenario).unwrap();
        assert!(report.passed(), "{:?}", report.failures);
        assert_eq!(report.steps, 15);
    }

    #[test]
    fn test_failed_expectation_is_reported() {
        let scenario = Scenario::from_json(
            r#"{ "steps": [
                { "step": "set", "props": { "height": "70px" } },
                { "step": "expect_style", "property": "--height", "value": "70px" },
                { "step": "drain" },
                { "step": "expect_style", "property": "--height", "value": "70px" }
            ] }"#,
        )
        .unwrap();
        let report = Runner::new(FabConfig::full()).unwrap().run(&scenario).unwrap();
        assert_eq!(report.failures.len(), 1);
        assert!(report.failures[0].starts_with("step 1:"));
    }

    #[test]
    fn test_bundled_scenarios_pass() {
        for content in [
            include_str!("../scenarios/toggle.json"),
            include_str!("../scenarios/batched.json"),
        ] {
            let scenario = Scenario::from_json(content).unwrap();
            let report = Runner::new(FabConfig::full()).unwrap().run(&scenario).unwrap();
            assert!(report.passed(), "{:?}: {:?}", scenario.name, report.failures);
        }
    }

    #[test]
    fn test_destroyed_element_errors_on_call() {
        let scenario = Scenario::from_json(
            r#"{ "steps": [{ "step": "destroy" }, { "step": "call", "method": "open" }] }"#,
        )
        .unwrap();
        let err = Runner::new(FabConfig::full()).unwrap().run(&scenario).unwrap_err();
        assert!(format!("{err:#}").contains("destroyed"));
    }
}
