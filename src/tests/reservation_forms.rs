use super::*;

fn assert_contact_errors(page: &Page, name: &str, email: &str, date: &str) -> Result<()> {
    page.assert_text("#name + .error-message", name)?;
    page.assert_text("#email + .error-message", email)?;
    page.assert_text("#date + .error-message", date)?;
    Ok(())
}

fn fill_contact(page: &mut Page, name: &str, email: &str, date: &str) -> Result<()> {
    page.type_text("#name", name)?;
    page.type_text("#email", email)?;
    page.type_text("#date", date)?;
    Ok(())
}

#[test]
fn quick_form_requires_a_name_and_keeps_input() -> Result<()> {
    let mut page = booking_page()?;
    page.type_text("#quick-date", "2024-05-03")?;
    page.click("#quick-submit")?;

    page.assert_text("#quick-msg", messages::NAME_REQUIRED)?;
    page.assert_value("#quick-date", "2024-05-03")?;
    assert!(page.pending_timers().is_empty());
    assert!(page.navigations().is_empty());
    Ok(())
}

#[test]
fn quick_form_treats_whitespace_name_as_missing() -> Result<()> {
    let mut page = booking_page()?;
    page.type_text("#quick-name", " \u{3000} ")?;
    page.type_text("#quick-date", "2024-05-03")?;
    page.submit("#quick-form")?;
    page.assert_text("#quick-msg", messages::NAME_REQUIRED)?;
    Ok(())
}

#[test]
fn quick_form_treats_byte_order_mark_name_as_missing() -> Result<()> {
    let mut page = booking_page()?;
    page.type_text("#quick-name", "\u{feff}")?;
    page.type_text("#quick-date", "2024-05-03")?;
    page.click("#quick-submit")?;
    page.assert_text("#quick-msg", messages::NAME_REQUIRED)?;
    page.assert_value("#quick-date", "2024-05-03")?;
    Ok(())
}

#[test]
fn quick_form_requires_a_date_after_the_name() -> Result<()> {
    let mut page = booking_page()?;
    page.type_text("#quick-name", "山田 花子")?;
    page.click("#quick-submit")?;
    page.assert_text("#quick-msg", messages::QUICK_DATE_REQUIRED)?;
    page.assert_value("#quick-name", "山田 花子")?;
    Ok(())
}

#[test]
fn quick_form_success_resets_and_clears_after_four_seconds() -> Result<()> {
    let mut page = booking_page()?;
    page.type_text("#quick-name", "山田 花子")?;
    page.type_text("#quick-date", "2024-05-03")?;
    page.click("#quick-submit")?;

    page.assert_text("#quick-msg", messages::QUICK_SENT)?;
    page.assert_value("#quick-name", "")?;
    page.assert_value("#quick-date", "")?;

    page.advance_time(3_999)?;
    page.assert_text("#quick-msg", messages::QUICK_SENT)?;
    page.advance_time(1)?;
    page.assert_text("#quick-msg", "")?;
    assert!(page.navigations().is_empty());
    Ok(())
}

#[test]
fn quick_form_error_cancels_an_earlier_pending_clear() -> Result<()> {
    let mut page = booking_page()?;
    page.type_text("#quick-name", "花子")?;
    page.type_text("#quick-date", "2024-05-03")?;
    page.click("#quick-submit")?;

    page.advance_time(3_000)?;
    page.click("#quick-submit")?;
    page.assert_text("#quick-msg", messages::NAME_REQUIRED)?;

    page.advance_time(5_000)?;
    page.assert_text("#quick-msg", messages::NAME_REQUIRED)?;
    Ok(())
}

#[test]
fn quick_form_resubmission_restarts_the_clear_timer() -> Result<()> {
    let mut page = booking_page()?;
    for _ in 0..2 {
        page.type_text("#quick-name", "花子")?;
        page.type_text("#quick-date", "2024-05-03")?;
        page.click("#quick-submit")?;
        page.advance_time(3_000)?;
    }
    page.assert_text("#quick-msg", messages::QUICK_SENT)?;
    assert_eq!(page.pending_timers().len(), 1);
    page.advance_time(1_000)?;
    page.assert_text("#quick-msg", "")?;
    Ok(())
}

#[test]
fn quick_form_without_message_slot_is_not_intercepted() -> Result<()> {
    let mut page = Page::from_html(
        r#"<form id="quick-form" action="/quick"><input name="name"><button>go</button></form>"#,
    )?;
    page.click("button")?;
    assert_eq!(page.navigations(), ["/quick".to_string()]);
    Ok(())
}

#[test]
fn quick_form_with_missing_fields_reads_them_as_empty() -> Result<()> {
    let mut page = Page::from_html(
        r#"<form id="quick-form"><input name="name"></form><p id="quick-msg"></p>"#,
    )?;
    page.type_text("[name=\"name\"]", "花子")?;
    page.submit("#quick-form")?;
    page.assert_text("#quick-msg", messages::QUICK_DATE_REQUIRED)?;
    Ok(())
}

#[test]
fn contact_form_reports_every_problem_in_one_pass() -> Result<()> {
    let mut page = booking_page()?;
    page.type_text("#email", "a@b")?;
    page.click("#contact-submit")?;

    assert_contact_errors(
        &page,
        messages::NAME_REQUIRED,
        messages::EMAIL_INVALID,
        messages::CONTACT_DATE_REQUIRED,
    )?;
    page.assert_text("#form-message", "")?;
    page.assert_value("#email", "a@b")?;
    assert!(page.navigations().is_empty());
    Ok(())
}

#[test]
fn contact_form_rejects_email_with_spaces() -> Result<()> {
    let mut page = booking_page()?;
    fill_contact(&mut page, "花子", "a b@c.com", "2024-05-02T10:00")?;
    page.click("#contact-submit")?;
    assert_contact_errors(&page, "", messages::EMAIL_INVALID, "")?;
    Ok(())
}

#[test]
fn contact_form_past_date_gets_only_the_future_date_error() -> Result<()> {
    let mut page = booking_page()?;
    fill_contact(&mut page, "花子", "a@b.co", "2024-04-30T10:00")?;
    page.click("#contact-submit")?;
    assert_contact_errors(&page, "", "", messages::DATE_NOT_FUTURE)?;
    page.assert_text("#form-message", "")?;
    Ok(())
}

#[test]
fn contact_form_reads_datetimes_in_page_local_time() -> Result<()> {
    let mut page = booking_page()?;
    // 20:59 in UTC+9 is one minute before the page clock.
    fill_contact(&mut page, "花子", "a@b.co", "2024-05-01T20:59")?;
    page.click("#contact-submit")?;
    assert_contact_errors(&page, "", "", messages::DATE_NOT_FUTURE)?;

    // Exactly now is accepted.
    page.type_text("#date", "2024-05-01T21:00")?;
    page.click("#contact-submit")?;
    assert_contact_errors(&page, "", "", "")?;
    page.assert_text("#form-message", messages::CONTACT_SENT)?;
    Ok(())
}

#[test]
fn contact_form_accepts_utc_minutes_and_end_of_day_values() -> Result<()> {
    let mut page = booking_page()?;
    // Exactly the page clock, written in UTC without seconds.
    fill_contact(&mut page, "花子", "a@b.co", "2024-05-01T12:00Z")?;
    page.click("#contact-submit")?;
    assert_contact_errors(&page, "", "", "")?;
    page.assert_text("#form-message", messages::CONTACT_SENT)?;

    // 24:00 local is the following midnight, still ahead of the clock.
    fill_contact(&mut page, "花子", "a@b.co", "2024-05-01T24:00")?;
    page.click("#contact-submit")?;
    assert_contact_errors(&page, "", "", "")?;

    fill_contact(&mut page, "花子", "a@b.co", "2024-04-30T24:00")?;
    page.click("#contact-submit")?;
    assert_contact_errors(&page, "", "", messages::DATE_NOT_FUTURE)?;
    Ok(())
}

#[test]
fn contact_form_date_only_value_is_utc_midnight() -> Result<()> {
    let mut page = booking_page()?;
    fill_contact(&mut page, "花子", "a@b.co", "2024-05-01")?;
    page.click("#contact-submit")?;
    assert_contact_errors(&page, "", "", messages::DATE_NOT_FUTURE)?;
    Ok(())
}

#[test]
fn contact_form_success_resets_and_clears_after_six_seconds() -> Result<()> {
    let mut page = booking_page()?;
    fill_contact(&mut page, "山田 花子", "hanako@example.jp", "2024-05-02T10:00")?;
    page.type_text("#note", "カットのみ")?;
    page.click("#contact-submit")?;

    assert_contact_errors(&page, "", "", "")?;
    page.assert_text("#form-message", messages::CONTACT_SENT)?;
    page.assert_value("#name", "")?;
    page.assert_value("#email", "")?;
    page.assert_value("#date", "")?;
    page.assert_value("#note", "ご要望")?;

    page.advance_time(5_999)?;
    page.assert_text("#form-message", messages::CONTACT_SENT)?;
    page.advance_time(1)?;
    page.assert_text("#form-message", "")?;
    assert!(page.navigations().is_empty());
    Ok(())
}

#[test]
fn contact_resubmission_clears_previous_errors_and_pending_message() -> Result<()> {
    let mut page = booking_page()?;
    page.click("#contact-submit")?;
    assert_contact_errors(
        &page,
        messages::NAME_REQUIRED,
        messages::EMAIL_INVALID,
        messages::CONTACT_DATE_REQUIRED,
    )?;

    fill_contact(&mut page, "花子", "a@b.co", "2024-05-02T10:00")?;
    page.click("#contact-submit")?;
    assert_contact_errors(&page, "", "", "")?;
    page.assert_text("#form-message", messages::CONTACT_SENT)?;

    page.advance_time(2_000)?;
    page.click("#contact-submit")?;
    page.assert_text("#form-message", "")?;
    assert!(page.pending_timers().is_empty());
    assert_contact_errors(
        &page,
        messages::NAME_REQUIRED,
        messages::EMAIL_INVALID,
        messages::CONTACT_DATE_REQUIRED,
    )?;
    Ok(())
}

#[test]
fn contact_field_without_error_slot_still_blocks_success() -> Result<()> {
    let mut page = Page::with_config(
        r#"<form id="contact-form">
             <input id="name"><span class="error-message"></span>
             <input id="email" value="a@b.co"><span class="error-message"></span>
             <input id="date" value="2024-06-01">
           </form>
           <p id="form-message"></p>"#,
        booking_config(),
    )?;
    page.submit("#contact-form")?;
    page.assert_text("#name + .error-message", messages::NAME_REQUIRED)?;
    page.assert_text("#form-message", "")?;

    page.type_text("#name", "花子")?;
    page.type_text("#date", "2024-01-01")?;
    page.submit("#contact-form")?;
    page.assert_text("#form-message", "")?;
    Ok(())
}

#[test]
fn contact_form_without_message_slot_is_not_intercepted() -> Result<()> {
    let mut page = Page::from_html(
        r#"<form id="contact-form" action="/reserve"><input id="name"></form>"#,
    )?;
    page.submit("#name")?;
    assert_eq!(page.navigations(), ["/reserve".to_string()]);
    Ok(())
}
