use std::cell::Cell;
use std::rc::Rc;

use crate::dom::NodeId;
use crate::error::Result;
use crate::page::Page;

pub(crate) fn wire(page: &mut Page) -> Result<()> {
    let (Some(trigger), Some(list)) = (page.dom.by_id("hamburger"), page.dom.by_id("nav-list"))
    else {
        page.trace_line("[wire] nav skipped: #hamburger or #nav-list missing".into());
        return Ok(());
    };

    let expanded = Rc::new(Cell::new(
        page.dom.attr(trigger, "aria-expanded").as_deref() == Some("true"),
    ));

    {
        let expanded = Rc::clone(&expanded);
        page.add_event_listener(trigger, "click", move |page, _| {
            expanded.set(!expanded.get());
            render(page, trigger, list, expanded.get())
        });
    }

    let links = page.dom.query_selector_all_from(list, "a")?;
    for link in &links {
        let expanded = Rc::clone(&expanded);
        page.add_event_listener(*link, "click", move |page, _| {
            expanded.set(false);
            render(page, trigger, list, false)
        });
    }

    page.trace_line(format!("[wire] nav links={}", links.len()));
    Ok(())
}

fn render(page: &mut Page, trigger: NodeId, list: NodeId, expanded: bool) -> Result<()> {
    page.dom.set_attr(
        trigger,
        "aria-expanded",
        if expanded { "true" } else { "false" },
    )?;
    page.dom.class_set(list, "open", expanded)
}
