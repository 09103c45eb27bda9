use std::cell::Cell;
use std::rc::Rc;

use crate::dom::NodeId;
use crate::error::Result;
use crate::page::Page;

/// A message slot that can clear itself after a delay.
///
/// At most one clear is pending at a time. Writing any new text cancels it,
/// so a clear scheduled by an earlier submission never wipes a later message.
#[derive(Debug)]
pub(crate) struct TransientStatus {
    slot: NodeId,
    pending_clear: Cell<Option<i64>>,
}

impl TransientStatus {
    pub(crate) fn new(slot: NodeId) -> Rc<Self> {
        Rc::new(Self {
            slot,
            pending_clear: Cell::new(None),
        })
    }

    pub(crate) fn set(&self, page: &mut Page, text: &str) -> Result<()> {
        self.cancel_pending(page);
        page.dom.set_text_content(self.slot, text)
    }

    pub(crate) fn clear(&self, page: &mut Page) -> Result<()> {
        self.set(page, "")
    }

    pub(crate) fn show_for(
        self: &Rc<Self>,
        page: &mut Page,
        text: &str,
        clear_after_ms: i64,
    ) -> Result<()> {
        self.set(page, text)?;
        let status = Rc::clone(self);
        let timer_id = page.set_timeout(clear_after_ms, move |page| {
            status.pending_clear.set(None);
            page.dom.set_text_content(status.slot, "")
        });
        self.pending_clear.set(Some(timer_id));
        Ok(())
    }

    fn cancel_pending(&self, page: &mut Page) {
        if let Some(timer_id) = self.pending_clear.take() {
            page.clear_timeout(timer_id);
        }
    }
}
