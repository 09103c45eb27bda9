use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::rc::Rc;

use crate::dom::NodeId;
use crate::error::{Error, Result};
use crate::page::Page;

pub type IntersectionCallback =
    Rc<dyn Fn(&mut Page, ObserverId, &[IntersectionEntry]) -> Result<()>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObserverId(usize);

#[derive(Debug, Clone, PartialEq)]
pub struct IntersectionEntry {
    pub target: NodeId,
    pub ratio: f64,
    pub is_intersecting: bool,
}

struct Observer {
    threshold: f64,
    // Last reported intersecting state per target, in observe order.
    targets: Vec<(NodeId, bool)>,
    callback: IntersectionCallback,
}

impl fmt::Debug for Observer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observer")
            .field("threshold", &self.threshold)
            .field("targets", &self.targets)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Default)]
pub(crate) struct ObserverRegistry {
    observers: BTreeMap<ObserverId, Observer>,
    ratios: HashMap<NodeId, f64>,
    next_id: usize,
}

impl ObserverRegistry {
    fn ratio(&self, node: NodeId) -> f64 {
        self.ratios.get(&node).copied().unwrap_or(0.0)
    }
}

fn is_intersecting(ratio: f64, threshold: f64) -> bool {
    ratio > 0.0 && ratio >= threshold
}

impl Page {
    /// Creates an observer that reports targets crossing `threshold`.
    ///
    /// Returns `None` when the page was configured without intersection
    /// observation, so callers can fall back the way a script would on a
    /// browser lacking the API.
    pub fn create_intersection_observer<F>(
        &mut self,
        threshold: f64,
        callback: F,
    ) -> Option<ObserverId>
    where
        F: Fn(&mut Page, ObserverId, &[IntersectionEntry]) -> Result<()> + 'static,
    {
        if !self.config.intersection_observer {
            return None;
        }
        let id = ObserverId(self.observers.next_id);
        self.observers.next_id += 1;
        self.observers.observers.insert(
            id,
            Observer {
                threshold: threshold.clamp(0.0, 1.0),
                targets: Vec::new(),
                callback: Rc::new(callback),
            },
        );
        self.trace_observer_line(format!(
            "[observer] create id={} threshold={threshold}",
            id.0
        ));
        Some(id)
    }

    /// Starts watching `node`. A node that is already past the threshold is
    /// reported right away.
    pub fn observe(&mut self, id: ObserverId, node: NodeId) -> Result<()> {
        let ratio = self.observers.ratio(node);
        let observer = self
            .observers
            .observers
            .get_mut(&id)
            .ok_or_else(|| Error::Runtime(format!("unknown intersection observer {}", id.0)))?;
        if observer.targets.iter().any(|(target, _)| *target == node) {
            return Ok(());
        }
        let intersecting = is_intersecting(ratio, observer.threshold);
        observer.targets.push((node, intersecting));
        let callback = Rc::clone(&observer.callback);

        let label = self.trace_node_label(node);
        self.trace_observer_line(format!("[observer] observe id={} target={label}", id.0));
        if intersecting {
            let entries = [IntersectionEntry {
                target: node,
                ratio,
                is_intersecting: true,
            }];
            callback(self, id, &entries)?;
        }
        Ok(())
    }

    pub fn unobserve(&mut self, id: ObserverId, node: NodeId) {
        let Some(observer) = self.observers.observers.get_mut(&id) else {
            return;
        };
        let before = observer.targets.len();
        observer.targets.retain(|(target, _)| *target != node);
        if observer.targets.len() != before {
            let label = self.trace_node_label(node);
            self.trace_observer_line(format!("[observer] unobserve id={} target={label}", id.0));
        }
    }

    pub fn disconnect(&mut self, id: ObserverId) {
        if self.observers.observers.remove(&id).is_some() {
            self.trace_observer_line(format!("[observer] disconnect id={}", id.0));
        }
    }

    pub fn observed_targets(&self, id: ObserverId) -> Vec<NodeId> {
        self.observers
            .observers
            .get(&id)
            .map(|observer| observer.targets.iter().map(|(node, _)| *node).collect())
            .unwrap_or_default()
    }

    /// Sets how much of the selected element is inside the viewport and
    /// notifies every observer whose threshold the change crosses.
    pub fn set_intersection_ratio(&mut self, selector: &str, ratio: f64) -> Result<()> {
        if !(0.0..=1.0).contains(&ratio) {
            return Err(Error::Runtime(format!(
                "intersection ratio must be within [0, 1] (got {ratio})"
            )));
        }
        let node = self.select_one(selector)?;
        self.observers.ratios.insert(node, ratio);

        let mut deliveries = Vec::new();
        for (id, observer) in self.observers.observers.iter_mut() {
            let threshold = observer.threshold;
            let Some((_, last)) = observer
                .targets
                .iter_mut()
                .find(|(target, _)| *target == node)
            else {
                continue;
            };
            let intersecting = is_intersecting(ratio, threshold);
            if *last == intersecting {
                continue;
            }
            *last = intersecting;
            deliveries.push((
                *id,
                Rc::clone(&observer.callback),
                IntersectionEntry {
                    target: node,
                    ratio,
                    is_intersecting: intersecting,
                },
            ));
        }

        for (id, callback, entry) in deliveries {
            let label = self.trace_node_label(node);
            self.trace_observer_line(format!(
                "[observer] deliver id={} target={label} ratio={ratio} intersecting={}",
                id.0, entry.is_intersecting
            ));
            callback(self, id, std::slice::from_ref(&entry))?;
        }
        Ok(())
    }

    pub fn scroll_into_view(&mut self, selector: &str) -> Result<()> {
        self.set_intersection_ratio(selector, 1.0)
    }

    pub fn scroll_out_of_view(&mut self, selector: &str) -> Result<()> {
        self.set_intersection_ratio(selector, 0.0)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;
    use crate::config::PageConfig;

    type Seen = Rc<RefCell<Vec<(NodeId, bool)>>>;

    fn watch(page: &mut Page, threshold: f64) -> Result<(ObserverId, Seen)> {
        let seen: Seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let id = page
            .create_intersection_observer(threshold, move |_, _, entries| {
                sink.borrow_mut()
                    .extend(entries.iter().map(|entry| (entry.target, entry.is_intersecting)));
                Ok(())
            })
            .ok_or_else(|| Error::runtime("observer unavailable"))?;
        Ok((id, seen))
    }

    #[test]
    fn entries_are_delivered_on_threshold_crossings_only() -> Result<()> {
        let mut page = Page::from_html("<div id='box'></div>")?;
        let node = page.select_one("#box")?;
        let (id, seen) = watch(&mut page, 0.5)?;
        page.observe(id, node)?;

        page.set_intersection_ratio("#box", 0.2)?;
        assert!(seen.borrow().is_empty());
        page.set_intersection_ratio("#box", 0.5)?;
        page.set_intersection_ratio("#box", 0.9)?;
        page.set_intersection_ratio("#box", 0.1)?;
        assert_eq!(*seen.borrow(), vec![(node, true), (node, false)]);
        Ok(())
    }

    #[test]
    fn observing_a_visible_node_reports_it_immediately() -> Result<()> {
        let mut page = Page::from_html("<div id='box'></div>")?;
        let node = page.select_one("#box")?;
        page.scroll_into_view("#box")?;
        let (id, seen) = watch(&mut page, 0.12)?;
        page.observe(id, node)?;
        assert_eq!(*seen.borrow(), vec![(node, true)]);
        Ok(())
    }

    #[test]
    fn unobserved_and_disconnected_targets_are_silent() -> Result<()> {
        let mut page = Page::from_html("<div id='a'></div><div id='b'></div>")?;
        let a = page.select_one("#a")?;
        let b = page.select_one("#b")?;
        let (id, seen) = watch(&mut page, 0.1)?;
        page.observe(id, a)?;
        page.observe(id, b)?;
        page.unobserve(id, a);
        assert_eq!(page.observed_targets(id), vec![b]);

        page.scroll_into_view("#a")?;
        assert!(seen.borrow().is_empty());
        page.disconnect(id);
        page.scroll_into_view("#b")?;
        assert!(seen.borrow().is_empty());
        Ok(())
    }

    #[test]
    fn out_of_range_ratio_is_rejected() -> Result<()> {
        let mut page = Page::from_html("<div id='box'></div>")?;
        for ratio in [-0.1, 1.5, f64::NAN] {
            assert!(matches!(
                page.set_intersection_ratio("#box", ratio),
                Err(Error::Runtime(_))
            ));
        }
        Ok(())
    }

    #[test]
    fn disabled_capability_yields_no_observer() -> Result<()> {
        let mut page = Page::with_config(
            "<div id='box'></div>",
            PageConfig::default().with_intersection_observer(false),
        )?;
        assert!(page.create_intersection_observer(0.1, |_, _, _| Ok(())).is_none());
        Ok(())
    }
}
