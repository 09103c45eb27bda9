use std::cell::Cell;
use std::rc::Rc;

use crate::dom::NodeId;
use crate::error::Result;
use crate::page::Page;

struct SidebarNodes {
    container: NodeId,
    panel: NodeId,
    trigger: NodeId,
}

pub(crate) fn wire(page: &mut Page) -> Result<()> {
    let (Some(container), Some(panel), Some(trigger)) = (
        page.dom.by_id("sidebar"),
        page.dom.by_id("sidebarInner"),
        page.dom.by_id("sidebarToggle"),
    ) else {
        page.trace_line(
            "[wire] sidebar skipped: #sidebar, #sidebarInner or #sidebarToggle missing".into(),
        );
        return Ok(());
    };

    let nodes = SidebarNodes {
        container,
        panel,
        trigger,
    };
    // Left as authored until the first toggle.
    let expanded = Rc::new(Cell::new(
        page.dom.attr(trigger, "aria-expanded").as_deref() == Some("true"),
    ));

    page.add_event_listener(trigger, "click", move |page, _| {
        expanded.set(!expanded.get());
        render(page, &nodes, expanded.get())
    });
    page.trace_line("[wire] sidebar".into());
    Ok(())
}

fn render(page: &mut Page, nodes: &SidebarNodes, expanded: bool) -> Result<()> {
    page.dom.set_attr(
        nodes.trigger,
        "aria-expanded",
        if expanded { "true" } else { "false" },
    )?;
    page.dom.class_set(nodes.container, "collapsed", !expanded)?;
    page.dom.style_set(
        nodes.panel,
        "display",
        if expanded { "block" } else { "none" },
    )
}
