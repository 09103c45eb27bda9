use std::cell::Cell;
use std::rc::Rc;

use crate::config::KeyboardScope;
use crate::dom::NodeId;
use crate::error::Result;
use crate::messages;
use crate::page::Page;

/// Position in a fixed, non-empty sequence of review entries. Moving past
/// either end wraps around.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Carousel {
    index: usize,
    len: usize,
}

impl Carousel {
    /// Starts at the first entry. An empty sequence has no carousel.
    pub fn new(len: usize) -> Option<Self> {
        (len > 0).then_some(Self { index: 0, len })
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn entries(&self) -> usize {
        self.len
    }

    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> usize {
        self.index = (self.index + 1) % self.len;
        self.index
    }

    pub fn prev(&mut self) -> usize {
        self.index = (self.index + self.len - 1) % self.len;
        self.index
    }

    /// Moves to `target`. Out-of-range targets leave the index unchanged.
    pub fn jump(&mut self, target: usize) -> usize {
        if target < self.len {
            self.index = target;
        }
        self.index
    }
}

struct CarouselView {
    items: Vec<NodeId>,
    dots: Vec<NodeId>,
    state: Cell<Carousel>,
}

impl CarouselView {
    fn render_all(&self, page: &mut Page) -> Result<()> {
        let index = self.state.get().index();
        for (i, item) in self.items.iter().enumerate() {
            page.dom.set_attr(
                *item,
                "aria-hidden",
                if i == index { "false" } else { "true" },
            )?;
        }
        for (i, dot) in self.dots.iter().enumerate() {
            page.dom.class_set(*dot, "active", i == index)?;
        }
        Ok(())
    }

    fn apply(&self, page: &mut Page, step: impl FnOnce(&mut Carousel) -> usize) -> Result<()> {
        let mut carousel = self.state.get();
        let from = carousel.index();
        let to = step(&mut carousel);
        self.state.set(carousel);
        if from == to {
            return Ok(());
        }

        page.dom.set_attr(self.items[from], "aria-hidden", "true")?;
        page.dom.set_attr(self.items[to], "aria-hidden", "false")?;
        if let (Some(old_dot), Some(new_dot)) = (self.dots.get(from), self.dots.get(to)) {
            page.dom.class_remove(*old_dot, "active")?;
            page.dom.class_add(*new_dot, "active")?;
        }
        Ok(())
    }
}

pub(crate) fn wire(page: &mut Page) -> Result<()> {
    let Some(list) = page.dom.by_id("reviewsList") else {
        page.trace_line("[wire] carousel skipped: #reviewsList missing".into());
        return Ok(());
    };
    let items = page.dom.query_selector_all_from(list, ".review-card")?;
    let Some(carousel) = Carousel::new(items.len()) else {
        page.trace_line("[wire] carousel skipped: no .review-card entries".into());
        return Ok(());
    };

    let dots = match page.dom.by_id("reviewDots") {
        Some(strip) => build_indicator_strip(page, strip, items.len())?,
        None => Vec::new(),
    };
    let view = Rc::new(CarouselView {
        items,
        dots,
        state: Cell::new(carousel),
    });
    view.render_all(page)?;

    for (i, dot) in view.dots.iter().enumerate() {
        let view = Rc::clone(&view);
        page.add_event_listener(*dot, "click", move |page, _| {
            view.apply(page, |carousel| carousel.jump(i))
        });
    }

    if let Some(prev) = page.dom.by_id("prevReview") {
        let view = Rc::clone(&view);
        page.add_event_listener(prev, "click", move |page, _| {
            view.apply(page, Carousel::prev)
        });
    }
    if let Some(next) = page.dom.by_id("nextReview") {
        let view = Rc::clone(&view);
        page.add_event_listener(next, "click", move |page, _| {
            view.apply(page, Carousel::next)
        });
    }

    let scope = page.config.keyboard_scope;
    let key_target = match scope {
        KeyboardScope::Document => page.dom.root,
        KeyboardScope::Carousel => list,
    };
    let entries = view.items.len();
    let dot_count = view.dots.len();
    page.add_event_listener(key_target, "keydown", move |page, event| {
        match event.key.as_deref() {
            Some("ArrowLeft") => view.apply(page, Carousel::prev),
            Some("ArrowRight") => view.apply(page, Carousel::next),
            _ => Ok(()),
        }
    });

    page.trace_line(format!(
        "[wire] carousel entries={entries} dots={dot_count} keyboard={scope:?}"
    ));
    Ok(())
}

// Replaces whatever the strip holds with one dot per entry.
fn build_indicator_strip(page: &mut Page, strip: NodeId, count: usize) -> Result<Vec<NodeId>> {
    page.dom.clear_children(strip)?;
    let mut dots = Vec::with_capacity(count);
    for i in 0..count {
        let dot = page.dom.create_detached_element("button");
        page.dom.set_attr(dot, "type", "button")?;
        page.dom.set_attr(dot, "class", "review-dot")?;
        page.dom.set_attr(dot, "aria-label", &messages::review_dot_label(i))?;
        page.dom.append_child(strip, dot)?;
        dots.push(dot);
    }
    Ok(dots)
}
