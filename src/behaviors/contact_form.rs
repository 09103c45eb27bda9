use crate::behaviors::field_value;
use crate::behaviors::status::TransientStatus;
use crate::dom::NodeId;
use crate::error::Result;
use crate::messages;
use crate::page::Page;
use crate::validation::validate_contact;

pub(crate) const CLEAR_AFTER_MS: i64 = 6_000;

pub(crate) fn wire(page: &mut Page) -> Result<()> {
    let (Some(form), Some(message)) = (
        page.dom.by_id("contact-form"),
        page.dom.by_id("form-message"),
    ) else {
        page.trace_line(
            "[wire] contact-form skipped: #contact-form or #form-message missing".into(),
        );
        return Ok(());
    };

    let status = TransientStatus::new(message);
    page.add_event_listener(form, "submit", move |page, event| {
        event.prevent_default();
        for slot in page.dom.query_selector_all_from(form, ".error-message")? {
            page.dom.set_text_content(slot, "")?;
        }
        status.clear(page)?;

        let name = field_value(page, form, "#name")?;
        let email = field_value(page, form, "#email")?;
        let date = field_value(page, form, "#date")?;
        let errors = validate_contact(
            &name,
            &email,
            &date,
            page.now_ms(),
            page.config.utc_offset_minutes,
        );

        if !errors.is_empty() {
            for (selector, problem) in [
                ("#name", errors.name),
                ("#email", errors.email),
                ("#date", errors.date),
            ] {
                if let Some(problem) = problem {
                    show_field_error(page, form, selector, problem)?;
                }
            }
            page.trace_line(format!("[form] contact-form rejected: {errors:?}"));
            return Ok(());
        }

        page.trace_line("[form] contact-form accepted".into());
        status.show_for(page, messages::CONTACT_SENT, CLEAR_AFTER_MS)?;
        page.reset_form(form)
    });
    page.trace_line("[wire] contact-form".into());
    Ok(())
}

// Writes into the element right after the field. Fields or slots that are
// missing are skipped.
fn show_field_error(page: &mut Page, form: NodeId, selector: &str, problem: &str) -> Result<()> {
    let Some(field) = page.dom.query_selector_from(form, selector)? else {
        return Ok(());
    };
    match page.dom.next_element_sibling(field) {
        Some(slot) => page.dom.set_text_content(slot, problem),
        None => Ok(()),
    }
}
