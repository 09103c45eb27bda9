use std::collections::VecDeque;

use crate::behaviors;
use crate::config::PageConfig;
use crate::dom::{Dom, NodeId, truncate_chars};
use crate::error::{Error, Result};
use crate::events::{EventState, ListenerStore};
use crate::html::parse_html;
use crate::observer::ObserverRegistry;
use crate::timers::TimerQueue;

#[derive(Debug)]
pub(crate) struct TraceState {
    pub(crate) enabled: bool,
    pub(crate) events: bool,
    pub(crate) timers: bool,
    pub(crate) observers: bool,
    logs: VecDeque<String>,
    limit: usize,
}

impl TraceState {
    fn new(config: &PageConfig) -> Self {
        Self {
            enabled: config.trace,
            events: true,
            timers: true,
            observers: true,
            logs: VecDeque::new(),
            limit: config.trace_log_limit,
        }
    }
}

/// A loaded page: the DOM, its listeners, a virtual clock and the
/// interactive behaviors wired at load time.
///
/// Methods on `Page` double as a test harness. They simulate what a user
/// does (`click`, `type_text`, `press_key`, scrolling) and assert on what the
/// page shows afterwards.
#[derive(Debug)]
pub struct Page {
    pub(crate) dom: Dom,
    pub(crate) listeners: ListenerStore,
    pub(crate) timers: TimerQueue,
    pub(crate) observers: ObserverRegistry,
    pub(crate) active_element: Option<NodeId>,
    pub(crate) now_ms: i64,
    pub(crate) config: PageConfig,
    pub(crate) trace: TraceState,
    navigations: Vec<String>,
}

impl Page {
    pub fn from_html(html: &str) -> Result<Self> {
        Self::with_config(html, PageConfig::default())
    }

    pub fn with_config(html: &str, config: PageConfig) -> Result<Self> {
        config.validate()?;
        let dom = parse_html(html)?;
        let mut page = Self {
            dom,
            listeners: ListenerStore::default(),
            timers: TimerQueue::default(),
            observers: ObserverRegistry::default(),
            active_element: None,
            now_ms: config.start_time_ms,
            trace: TraceState::new(&config),
            config,
            navigations: Vec::new(),
        };
        behaviors::install(&mut page)?;
        Ok(page)
    }

    pub fn config(&self) -> &PageConfig {
        &self.config
    }

    pub fn document(&self) -> NodeId {
        self.dom.root
    }

    pub fn select_one(&self, selector: &str) -> Result<NodeId> {
        self.dom
            .query_selector(selector)?
            .ok_or_else(|| Error::SelectorNotFound(selector.to_string()))
    }

    pub fn query(&self, selector: &str) -> Result<Vec<NodeId>> {
        self.dom.query_selector_all(selector)
    }

    pub fn active_element(&self) -> Option<NodeId> {
        self.active_element
    }

    /// Form submissions no listener intercepted, oldest first. Each entry is
    /// the form's `action` attribute, or its label when it has none.
    pub fn navigations(&self) -> &[String] {
        &self.navigations
    }

    pub fn click(&mut self, selector: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        if self.dom.disabled(target) {
            return Ok(());
        }

        let outcome = self.dispatch_event(target, "click")?;
        if outcome.default_prevented {
            return Ok(());
        }

        if is_submit_control(&self.dom, target) {
            if let Some(form) = self.form_owner(target) {
                self.submit_form(form)?;
            }
        }
        Ok(())
    }

    pub fn type_text(&mut self, selector: &str, text: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        if self.dom.disabled(target) || self.dom.readonly(target) {
            return Ok(());
        }

        let tag = self
            .dom
            .tag_name(target)
            .ok_or_else(|| Error::TypeMismatch {
                selector: selector.to_string(),
                expected: "input or textarea".into(),
                actual: "non-element".into(),
            })?
            .to_ascii_lowercase();
        if tag != "input" && tag != "textarea" {
            return Err(Error::TypeMismatch {
                selector: selector.to_string(),
                expected: "input or textarea".into(),
                actual: tag,
            });
        }

        self.dom.set_value(target, text)?;
        self.dispatch_event(target, "input")?;
        Ok(())
    }

    pub fn submit(&mut self, selector: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        if let Some(form) = self.form_owner(target) {
            self.submit_form(form)?;
        }
        Ok(())
    }

    pub fn focus(&mut self, selector: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        self.focus_node(target)
    }

    pub fn blur(&mut self, selector: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        self.blur_node(target)
    }

    /// Focuses the selected element, then dispatches `keydown` and `keyup`
    /// carrying `key`.
    pub fn press_key(&mut self, selector: &str, key: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        self.focus_node(target)?;
        self.dispatch_key(target, key)
    }

    /// Presses `key` on whatever has focus, or on the document itself.
    pub fn press_document_key(&mut self, key: &str) -> Result<()> {
        let target = self.active_element.unwrap_or(self.dom.root);
        self.dispatch_key(target, key)
    }

    fn dispatch_key(&mut self, target: NodeId, key: &str) -> Result<()> {
        self.dispatch_prepared_event(EventState::new("keydown", target).with_key(key))?;
        self.dispatch_prepared_event(EventState::new("keyup", target).with_key(key))?;
        Ok(())
    }

    pub(crate) fn focus_node(&mut self, node: NodeId) -> Result<()> {
        if self.dom.disabled(node) || self.active_element == Some(node) {
            return Ok(());
        }
        if let Some(current) = self.active_element {
            self.blur_node(current)?;
        }
        self.active_element = Some(node);
        self.dispatch_event(node, "focusin")?;
        self.dispatch_event(node, "focus")?;
        Ok(())
    }

    pub(crate) fn blur_node(&mut self, node: NodeId) -> Result<()> {
        if self.active_element != Some(node) {
            return Ok(());
        }
        self.dispatch_event(node, "focusout")?;
        self.dispatch_event(node, "blur")?;
        self.active_element = None;
        Ok(())
    }

    fn submit_form(&mut self, form: NodeId) -> Result<()> {
        let outcome = self.dispatch_event(form, "submit")?;
        if outcome.default_prevented {
            return Ok(());
        }
        let destination = self
            .dom
            .attr(form, "action")
            .filter(|action| !action.is_empty())
            .unwrap_or_else(|| self.trace_node_label(form));
        self.trace_line(format!("[form] navigate {destination}"));
        self.navigations.push(destination);
        Ok(())
    }

    /// Restores every control in `form` to its authored default after a
    /// cancellable `reset` event.
    pub(crate) fn reset_form(&mut self, form: NodeId) -> Result<()> {
        let outcome = self.dispatch_event(form, "reset")?;
        if outcome.default_prevented {
            return Ok(());
        }

        for control in self.dom.query_selector_all_from(form, "input, textarea, select")? {
            if is_checkable_input(&self.dom, control) {
                let default_checked = self.dom.attr(control, "checked").is_some();
                self.dom.set_checked(control, default_checked)?;
                continue;
            }
            let default_value = if self.dom.is_tag(control, "textarea") {
                self.dom.text_content(control)
            } else {
                self.dom.attr(control, "value").unwrap_or_default()
            };
            self.dom.set_value(control, &default_value)?;
        }
        Ok(())
    }

    fn form_owner(&self, node: NodeId) -> Option<NodeId> {
        if self.dom.is_tag(node, "form") {
            Some(node)
        } else {
            self.dom.find_ancestor_by_tag(node, "form")
        }
    }

    pub fn text(&self, selector: &str) -> Result<String> {
        let target = self.select_one(selector)?;
        Ok(self.dom.text_content(target))
    }

    pub fn value(&self, selector: &str) -> Result<String> {
        let target = self.select_one(selector)?;
        self.dom.value(target)
    }

    pub fn attr(&self, selector: &str, name: &str) -> Result<Option<String>> {
        let target = self.select_one(selector)?;
        Ok(self.dom.attr(target, name))
    }

    pub fn has_class(&self, selector: &str, class_name: &str) -> Result<bool> {
        let target = self.select_one(selector)?;
        self.dom.class_contains(target, class_name)
    }

    pub fn style(&self, selector: &str, property: &str) -> Result<String> {
        let target = self.select_one(selector)?;
        self.dom.style_get(target, property)
    }

    pub fn count(&self, selector: &str) -> Result<usize> {
        Ok(self.dom.query_selector_all(selector)?.len())
    }

    pub fn assert_text(&self, selector: &str, expected: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        let actual = self.dom.text_content(target);
        self.check(target, selector, expected, actual)
    }

    pub fn assert_value(&self, selector: &str, expected: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        let actual = self.dom.value(target)?;
        self.check(target, selector, expected, actual)
    }

    pub fn assert_attr(&self, selector: &str, name: &str, expected: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        let actual = self
            .dom
            .attr(target, name)
            .map(|value| format!("{name}={value}"))
            .unwrap_or_else(|| format!("no {name}"));
        self.check(target, selector, &format!("{name}={expected}"), actual)
    }

    pub fn assert_no_attr(&self, selector: &str, name: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        let actual = self
            .dom
            .attr(target, name)
            .map(|value| format!("{name}={value}"))
            .unwrap_or_else(|| format!("no {name}"));
        self.check(target, selector, &format!("no {name}"), actual)
    }

    /// Asserts that `class_name` is present (`expected = true`) or absent.
    pub fn assert_class(&self, selector: &str, class_name: &str, expected: bool) -> Result<()> {
        let target = self.select_one(selector)?;
        let actual = self.dom.class_contains(target, class_name)?;
        self.check(
            target,
            selector,
            &class_expectation(class_name, expected),
            class_expectation(class_name, actual),
        )
    }

    pub fn assert_style(&self, selector: &str, property: &str, expected: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        let actual = self.dom.style_get(target, property)?;
        self.check(target, selector, expected, actual)
    }

    pub fn assert_exists(&self, selector: &str) -> Result<()> {
        let _ = self.select_one(selector)?;
        Ok(())
    }

    pub fn assert_count(&self, selector: &str, expected: usize) -> Result<()> {
        let matches = self.dom.query_selector_all(selector)?;
        if matches.len() != expected {
            return Err(Error::AssertionFailed {
                selector: selector.to_string(),
                expected: expected.to_string(),
                actual: matches.len().to_string(),
                dom_snippet: matches
                    .first()
                    .map(|node| self.node_snippet(*node))
                    .unwrap_or_default(),
            });
        }
        Ok(())
    }

    pub fn dump_dom(&self, selector: &str) -> Result<String> {
        let target = self.select_one(selector)?;
        Ok(self.dom.dump_node(target))
    }

    fn check(&self, target: NodeId, selector: &str, expected: &str, actual: String) -> Result<()> {
        if actual != expected {
            return Err(Error::AssertionFailed {
                selector: selector.to_string(),
                expected: expected.to_string(),
                actual,
                dom_snippet: self.node_snippet(target),
            });
        }
        Ok(())
    }

    fn node_snippet(&self, node_id: NodeId) -> String {
        truncate_chars(&self.dom.dump_node(node_id), 200)
    }

    pub fn enable_trace(&mut self, enabled: bool) {
        self.trace.enabled = enabled;
    }

    pub fn set_trace_events(&mut self, enabled: bool) {
        self.trace.events = enabled;
    }

    pub fn set_trace_timers(&mut self, enabled: bool) {
        self.trace.timers = enabled;
    }

    pub fn set_trace_observers(&mut self, enabled: bool) {
        self.trace.observers = enabled;
    }

    pub fn set_trace_log_limit(&mut self, max_entries: usize) -> Result<()> {
        if max_entries == 0 {
            return Err(Error::runtime(
                "set_trace_log_limit requires at least 1 entry",
            ));
        }
        self.trace.limit = max_entries;
        while self.trace.logs.len() > self.trace.limit {
            self.trace.logs.pop_front();
        }
        Ok(())
    }

    pub fn take_trace_logs(&mut self) -> Vec<String> {
        std::mem::take(&mut self.trace.logs).into()
    }

    pub(crate) fn trace_event_line(&mut self, line: String) {
        if self.trace.enabled && self.trace.events {
            self.trace_line(line);
        }
    }

    pub(crate) fn trace_timer_line(&mut self, line: String) {
        if self.trace.enabled && self.trace.timers {
            self.trace_line(line);
        }
    }

    pub(crate) fn trace_observer_line(&mut self, line: String) {
        if self.trace.enabled && self.trace.observers {
            self.trace_line(line);
        }
    }

    pub(crate) fn trace_line(&mut self, line: String) {
        if !self.trace.enabled {
            return;
        }
        log::debug!(target: "booking_page::trace", "{line}");
        if self.trace.logs.len() >= self.trace.limit {
            self.trace.logs.pop_front();
        }
        self.trace.logs.push_back(line);
    }

    pub(crate) fn trace_node_label(&self, node: NodeId) -> String {
        if let Some(id) = self.dom.attr(node, "id") {
            if !id.is_empty() {
                return format!("#{id}");
            }
        }
        if node == self.dom.root {
            return "document".into();
        }
        self.dom
            .tag_name(node)
            .map(ToOwned::to_owned)
            .unwrap_or_else(|| format!("node-{}", node.0))
    }
}

fn class_expectation(class_name: &str, present: bool) -> String {
    if present {
        format!("has .{class_name}")
    } else {
        format!("lacks .{class_name}")
    }
}

fn is_submit_control(dom: &Dom, node_id: NodeId) -> bool {
    let Some(element) = dom.element(node_id) else {
        return false;
    };

    let kind = element.attrs.get("type");
    if element.tag_name.eq_ignore_ascii_case("button") {
        return kind
            .map(|kind| kind.eq_ignore_ascii_case("submit"))
            .unwrap_or(true);
    }
    if element.tag_name.eq_ignore_ascii_case("input") {
        return kind
            .map(|kind| kind.eq_ignore_ascii_case("submit"))
            .unwrap_or(false);
    }
    false
}

fn is_checkable_input(dom: &Dom, node_id: NodeId) -> bool {
    dom.is_tag(node_id, "input")
        && dom.attr(node_id, "type").is_some_and(|kind| {
            kind.eq_ignore_ascii_case("checkbox") || kind.eq_ignore_ascii_case("radio")
        })
}
