//! Client-side behaviors of a small booking page, running on a deterministic
//! in-process DOM.
//!
//! Load markup with [`Page::from_html`]; the navigation toggle, sidebar,
//! reveal-on-scroll, review carousel and both reservation forms are wired
//! immediately. The same [`Page`] then acts as a harness: drive it with user
//! actions and a virtual clock, and assert what the page shows.
//!
//! ```
//! use booking_page::Page;
//!
//! let mut page = Page::from_html(
//!     r#"<form id="quick-form">
//!          <input name="name"><input name="date">
//!          <button type="submit">予約</button>
//!        </form>
//!        <p id="quick-msg"></p>"#,
//! )?;
//! page.click("button")?;
//! page.assert_text("#quick-msg", "お名前を入力してください。")?;
//! # Ok::<(), booking_page::Error>(())
//! ```

mod behaviors;
mod config;
mod dom;
mod error;
mod events;
mod html;
pub mod messages;
mod observer;
mod page;
mod selector;
mod timers;
pub mod validation;

pub use behaviors::carousel::Carousel;
pub use config::{KeyboardScope, PageConfig};
pub use dom::NodeId;
pub use error::{Error, Result};
pub use events::{EventHandler, EventState, Phase};
pub use observer::{IntersectionCallback, IntersectionEntry, ObserverId};
pub use page::Page;
pub use timers::PendingTimer;
