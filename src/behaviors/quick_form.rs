use crate::behaviors::field_value;
use crate::behaviors::status::TransientStatus;
use crate::error::Result;
use crate::messages;
use crate::page::Page;
use crate::validation::validate_quick;

pub(crate) const CLEAR_AFTER_MS: i64 = 4_000;

pub(crate) fn wire(page: &mut Page) -> Result<()> {
    let (Some(form), Some(message)) = (page.dom.by_id("quick-form"), page.dom.by_id("quick-msg"))
    else {
        page.trace_line("[wire] quick-form skipped: #quick-form or #quick-msg missing".into());
        return Ok(());
    };

    let status = TransientStatus::new(message);
    page.add_event_listener(form, "submit", move |page, event| {
        event.prevent_default();
        let name = field_value(page, form, "[name=\"name\"]")?;
        let date = field_value(page, form, "[name=\"date\"]")?;

        if let Some(problem) = validate_quick(&name, &date) {
            page.trace_line(format!("[form] quick-form rejected: {problem}"));
            return status.set(page, problem);
        }

        page.trace_line("[form] quick-form accepted".into());
        status.show_for(page, messages::QUICK_SENT, CLEAR_AFTER_MS)?;
        page.reset_form(form)
    });
    page.trace_line("[wire] quick-form".into());
    Ok(())
}
