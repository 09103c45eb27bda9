use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use crate::dom::NodeId;
use crate::error::Result;
use crate::page::Page;

/// Callback invoked when a dispatched event reaches the node it was registered on.
pub type EventHandler = Rc<dyn Fn(&mut Page, &mut EventState) -> Result<()>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Capture,
    Bubble,
}

#[derive(Clone)]
pub(crate) struct Listener {
    pub(crate) phase: Phase,
    pub(crate) handler: EventHandler,
}

impl fmt::Debug for Listener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listener")
            .field("phase", &self.phase)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Default, Clone)]
pub(crate) struct ListenerStore {
    map: HashMap<NodeId, HashMap<String, Vec<Listener>>>,
}

impl ListenerStore {
    pub(crate) fn add(&mut self, node_id: NodeId, event: &str, listener: Listener) {
        self.map
            .entry(node_id)
            .or_default()
            .entry(event.to_string())
            .or_default()
            .push(listener);
    }

    pub(crate) fn get(&self, node_id: NodeId, event: &str, phase: Phase) -> Vec<Listener> {
        self.map
            .get(&node_id)
            .and_then(|events| events.get(event))
            .map(|listeners| {
                listeners
                    .iter()
                    .filter(|listener| listener.phase == phase)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    pub(crate) fn count(&self, node_id: NodeId, event: &str) -> usize {
        self.map
            .get(&node_id)
            .and_then(|events| events.get(event))
            .map(Vec::len)
            .unwrap_or(0)
    }
}

#[derive(Debug, Clone)]
pub struct EventState {
    pub event_type: String,
    pub target: NodeId,
    pub current_target: NodeId,
    /// Key name for keyboard events (`"ArrowLeft"`, `"Enter"`, ...).
    pub key: Option<String>,
    pub(crate) default_prevented: bool,
    pub(crate) propagation_stopped: bool,
    pub(crate) immediate_propagation_stopped: bool,
}

impl EventState {
    pub(crate) fn new(event_type: &str, target: NodeId) -> Self {
        Self {
            event_type: event_type.to_string(),
            target,
            current_target: target,
            key: None,
            default_prevented: false,
            propagation_stopped: false,
            immediate_propagation_stopped: false,
        }
    }

    pub(crate) fn with_key(mut self, key: &str) -> Self {
        self.key = Some(key.to_string());
        self
    }

    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    pub fn stop_propagation(&mut self) {
        self.propagation_stopped = true;
    }

    pub fn stop_immediate_propagation(&mut self) {
        self.propagation_stopped = true;
        self.immediate_propagation_stopped = true;
    }

    pub fn default_prevented(&self) -> bool {
        self.default_prevented
    }
}

impl Page {
    /// Registers `handler` for `event` on `node` in the bubble phase.
    pub fn add_event_listener<F>(&mut self, node: NodeId, event: &str, handler: F)
    where
        F: Fn(&mut Page, &mut EventState) -> Result<()> + 'static,
    {
        self.add_event_listener_with_phase(node, event, Phase::Bubble, handler);
    }

    pub fn add_event_listener_with_phase<F>(
        &mut self,
        node: NodeId,
        event: &str,
        phase: Phase,
        handler: F,
    ) where
        F: Fn(&mut Page, &mut EventState) -> Result<()> + 'static,
    {
        self.listeners.add(
            node,
            event,
            Listener {
                phase,
                handler: Rc::new(handler),
            },
        );
    }

    pub fn listener_count(&self, node: NodeId, event: &str) -> usize {
        self.listeners.count(node, event)
    }

    pub(crate) fn dispatch_event(
        &mut self,
        target: NodeId,
        event_type: &str,
    ) -> Result<EventState> {
        self.dispatch_prepared_event(EventState::new(event_type, target))
    }

    pub(crate) fn dispatch_prepared_event(&mut self, mut event: EventState) -> Result<EventState> {
        stacker::grow(32 * 1024 * 1024, || {
            let target = event.target;
            let mut path = Vec::new();
            let mut cursor = Some(target);
            while let Some(node) = cursor {
                path.push(node);
                cursor = self.dom.parent(node);
            }
            path.reverse();

            let ancestors = &path[..path.len() - 1];

            for node in ancestors {
                event.current_target = *node;
                self.invoke_listeners(*node, &mut event, Phase::Capture)?;
                if event.propagation_stopped {
                    self.trace_event_done(&event, "propagation_stopped");
                    return Ok(event);
                }
            }

            // Target phase runs capture listeners before bubble listeners.
            event.current_target = target;
            for phase in [Phase::Capture, Phase::Bubble] {
                self.invoke_listeners(target, &mut event, phase)?;
                if event.propagation_stopped {
                    self.trace_event_done(&event, "propagation_stopped");
                    return Ok(event);
                }
            }

            for node in ancestors.iter().rev() {
                event.current_target = *node;
                self.invoke_listeners(*node, &mut event, Phase::Bubble)?;
                if event.propagation_stopped {
                    self.trace_event_done(&event, "propagation_stopped");
                    return Ok(event);
                }
            }

            self.trace_event_done(&event, "completed");
            Ok(event)
        })
    }

    fn invoke_listeners(
        &mut self,
        node_id: NodeId,
        event: &mut EventState,
        phase: Phase,
    ) -> Result<()> {
        let listeners = self.listeners.get(node_id, &event.event_type, phase);
        for listener in listeners {
            if self.trace.enabled && self.trace.events {
                let phase = match phase {
                    Phase::Capture => "capture",
                    Phase::Bubble => "bubble",
                };
                let line = format!(
                    "[event] {} target={} current={} phase={} default_prevented={}",
                    event.event_type,
                    self.trace_node_label(event.target),
                    self.trace_node_label(event.current_target),
                    phase,
                    event.default_prevented
                );
                self.trace_event_line(line);
            }
            (listener.handler)(self, event)?;
            if event.immediate_propagation_stopped {
                break;
            }
        }
        Ok(())
    }

    fn trace_event_done(&mut self, event: &EventState, outcome: &str) {
        if !(self.trace.enabled && self.trace.events) {
            return;
        }
        let line = format!(
            "[event] done {} target={} current={} outcome={} default_prevented={} propagation_stopped={}",
            event.event_type,
            self.trace_node_label(event.target),
            self.trace_node_label(event.current_target),
            outcome,
            event.default_prevented,
            event.propagation_stopped,
        );
        self.trace_event_line(line);
    }
}
