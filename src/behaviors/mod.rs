//! Interactive behaviors wired when a page finishes loading.
//!
//! Each behavior looks up its own elements and silently does nothing when
//! any required element is absent. Behaviors share no state.

pub(crate) mod carousel;
pub(crate) mod contact_form;
pub(crate) mod nav;
pub(crate) mod quick_form;
pub(crate) mod reveal;
pub(crate) mod sidebar;
pub(crate) mod status;

use crate::dom::NodeId;
use crate::error::Result;
use crate::page::Page;

pub(crate) fn install(page: &mut Page) -> Result<()> {
    nav::wire(page)?;
    sidebar::wire(page)?;
    reveal::wire(page)?;
    carousel::wire(page)?;
    quick_form::wire(page)?;
    contact_form::wire(page)?;
    Ok(())
}

// Value of the first control under `scope` matching `selector`; a missing
// control reads as empty.
pub(crate) fn field_value(page: &Page, scope: NodeId, selector: &str) -> Result<String> {
    match page.dom.query_selector_from(scope, selector)? {
        Some(field) => page.dom.value(field),
        None => Ok(String::new()),
    }
}
