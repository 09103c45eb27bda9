use std::cell::Cell;
use std::rc::Rc;

use booking_page::{Error, Page, PageConfig, Result};

#[test]
fn listener_error_keeps_state_changes_before_failure() -> Result<()> {
    let mut page = Page::from_html(
        r##"<button id="hamburger" aria-expanded="false">≡</button>
           <ul id="nav-list"><li><a href="#a">a</a></li></ul>"##,
    )?;
    let trigger = page.select_one("#hamburger")?;
    page.add_event_listener(trigger, "click", |_, _| Err(Error::Runtime("analytics down".into())));

    match page.click("#hamburger") {
        Err(Error::Runtime(message)) => assert_eq!(message, "analytics down"),
        other => panic!("expected click to fail with runtime error, got: {other:?}"),
    }

    // The navigation listener ran first and its change stays.
    page.assert_attr("#hamburger", "aria-expanded", "true")?;
    page.assert_class("#nav-list", "open", true)?;
    Ok(())
}

#[test]
fn scheduling_status_clear_near_i64_max_does_not_overflow() -> Result<()> {
    let mut page = Page::with_config(
        r#"<form id="quick-form"><input name="name" value="花子"><input name="date" value="2030-01-01"></form>
           <p id="quick-msg"></p>"#,
        PageConfig::default().with_start_time_ms(i64::MAX - 10),
    )?;
    page.submit("#quick-form")?;
    let pending = page.pending_timers();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].due_at, i64::MAX);
    assert_eq!(page.run_due_timers()?, 0);
    assert!(page.run_next_timer()?);
    page.assert_text("#quick-msg", "")?;
    Ok(())
}

#[test]
fn timer_scheduled_from_a_timer_runs_in_the_same_drain() -> Result<()> {
    let mut page = Page::from_html("<p id='out'></p>")?;
    let runs = Rc::new(Cell::new(0));
    let counter = Rc::clone(&runs);
    page.set_timeout(10, move |page| {
        counter.set(counter.get() + 1);
        let counter = Rc::clone(&counter);
        page.set_timeout(0, move |_| {
            counter.set(counter.get() + 1);
            Ok(())
        });
        Ok(())
    });

    page.advance_time(10)?;
    assert_eq!(runs.get(), 2);
    assert_eq!(page.now_ms(), 10);
    Ok(())
}

#[test]
fn clearing_all_timers_drops_pending_status_clears() -> Result<()> {
    let mut page = Page::from_html(
        r#"<form id="contact-form"><input id="name" value="花子"><span></span>
             <input id="email" value="a@b.co"><span></span>
             <input id="date" value="2999-01-01"><span></span></form>
           <p id="form-message"></p>"#,
    )?;
    page.submit("#contact-form")?;
    assert_eq!(page.clear_all_timers(), 1);
    page.advance_time(60_000)?;
    page.assert_text("#form-message", "ご予約ありがとうございます。追ってご連絡いたします。")?;
    Ok(())
}
