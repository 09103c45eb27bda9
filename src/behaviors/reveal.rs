use crate::error::Result;
use crate::page::Page;

pub(crate) const REVEAL_SELECTOR: &str = ".section, .service-card";
pub(crate) const REVEAL_THRESHOLD: f64 = 0.12;
const VISIBLE_CLASS: &str = "is-visible";

pub(crate) fn wire(page: &mut Page) -> Result<()> {
    let targets = page.dom.query_selector_all(REVEAL_SELECTOR)?;
    if targets.is_empty() {
        page.trace_line("[wire] reveal skipped: no targets".into());
        return Ok(());
    }

    let observer = page.create_intersection_observer(REVEAL_THRESHOLD, |page, observer, entries| {
        for entry in entries.iter().filter(|entry| entry.is_intersecting) {
            page.dom.class_add(entry.target, VISIBLE_CLASS)?;
            page.unobserve(observer, entry.target);
        }
        Ok(())
    });

    let Some(observer) = observer else {
        for target in &targets {
            page.dom.class_add(*target, VISIBLE_CLASS)?;
        }
        page.trace_line(format!(
            "[wire] reveal fallback: {} targets shown without observation",
            targets.len()
        ));
        return Ok(());
    };

    for target in &targets {
        page.observe(observer, *target)?;
    }
    page.trace_line(format!("[wire] reveal targets={}", targets.len()));
    Ok(())
}
