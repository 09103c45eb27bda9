use super::*;

#[test]
fn hamburger_click_opens_and_closes_navigation() -> Result<()> {
    let mut page = booking_page()?;
    page.assert_attr("#hamburger", "aria-expanded", "false")?;
    page.assert_class("#nav-list", "open", false)?;

    page.click("#hamburger")?;
    page.assert_attr("#hamburger", "aria-expanded", "true")?;
    page.assert_class("#nav-list", "open", true)?;
    page.assert_class("#nav-list", "nav", true)?;

    page.click("#hamburger")?;
    page.assert_attr("#hamburger", "aria-expanded", "false")?;
    page.assert_class("#nav-list", "open", false)?;
    Ok(())
}

#[test]
fn following_a_link_closes_open_navigation() -> Result<()> {
    let mut page = booking_page()?;
    page.click("#hamburger")?;
    page.click("#link-contact")?;
    page.assert_attr("#hamburger", "aria-expanded", "false")?;
    page.assert_class("#nav-list", "open", false)?;

    // Reopening after a link click starts from the closed state again.
    page.click("#hamburger")?;
    page.assert_class("#nav-list", "open", true)?;
    Ok(())
}

#[test]
fn link_click_on_closed_navigation_changes_nothing_visible() -> Result<()> {
    let mut page = booking_page()?;
    let before = page.dump_dom("header")?;
    page.click("#link-services")?;
    assert_eq!(page.dump_dom("header")?, before);
    Ok(())
}

#[test]
fn navigation_flag_starts_from_authored_aria_state() -> Result<()> {
    let mut page = Page::from_html(
        r##"<button id="hamburger" aria-expanded="true">≡</button>
           <ul id="nav-list" class="open"><li><a href="#top">top</a></li></ul>"##,
    )?;
    page.click("#hamburger")?;
    page.assert_attr("#hamburger", "aria-expanded", "false")?;
    page.assert_class("#nav-list", "open", false)?;
    Ok(())
}

#[test]
fn navigation_needs_both_trigger_and_list() -> Result<()> {
    let mut page = Page::from_html(r#"<button id="hamburger" aria-expanded="false">≡</button>"#)?;
    page.click("#hamburger")?;
    page.assert_attr("#hamburger", "aria-expanded", "false")?;
    Ok(())
}

#[test]
fn sidebar_is_left_as_authored_until_first_toggle() -> Result<()> {
    let page = booking_page()?;
    page.assert_attr("#sidebarToggle", "aria-expanded", "true")?;
    page.assert_no_attr("#sidebarInner", "style")?;
    page.assert_class("#sidebar", "collapsed", false)?;
    Ok(())
}

#[test]
fn sidebar_toggle_collapses_then_expands() -> Result<()> {
    let mut page = booking_page()?;

    page.click("#sidebarToggle")?;
    page.assert_attr("#sidebarToggle", "aria-expanded", "false")?;
    page.assert_class("#sidebar", "collapsed", true)?;
    page.assert_style("#sidebarInner", "display", "none")?;

    page.click("#sidebarToggle")?;
    page.assert_attr("#sidebarToggle", "aria-expanded", "true")?;
    page.assert_class("#sidebar", "collapsed", false)?;
    page.assert_style("#sidebarInner", "display", "block")?;
    Ok(())
}

#[test]
fn two_sidebar_toggles_restore_aria_and_display() -> Result<()> {
    let mut page = Page::from_html(
        r#"<aside id="sidebar" class="collapsed">
             <button id="sidebarToggle" aria-expanded="false">開く</button>
             <div id="sidebarInner" style="display: none;"></div>
           </aside>"#,
    )?;

    for _ in 0..2 {
        page.click("#sidebarToggle")?;
    }
    page.assert_attr("#sidebarToggle", "aria-expanded", "false")?;
    page.assert_style("#sidebarInner", "display", "none")?;
    page.assert_class("#sidebar", "collapsed", true)?;
    Ok(())
}

#[test]
fn sidebar_without_inner_panel_is_not_wired() -> Result<()> {
    let mut page = Page::from_html(
        r#"<aside id="sidebar"><button id="sidebarToggle" aria-expanded="true">x</button></aside>"#,
    )?;
    page.click("#sidebarToggle")?;
    page.assert_attr("#sidebarToggle", "aria-expanded", "true")?;
    page.assert_class("#sidebar", "collapsed", false)?;
    Ok(())
}
