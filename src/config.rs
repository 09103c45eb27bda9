use crate::error::{Error, Result};

/// Where the review carousel listens for `ArrowLeft` / `ArrowRight`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeyboardScope {
    /// Arrow keys pressed anywhere on the page move the carousel.
    #[default]
    Document,
    /// Only keys dispatched inside `#reviewsList` move the carousel.
    Carousel,
}

/// Construction options for [`Page`](crate::Page).
///
/// ```
/// use booking_page::{KeyboardScope, Page, PageConfig};
///
/// let config = PageConfig::default()
///     .with_start_time_ms(1_700_000_000_000)
///     .with_keyboard_scope(KeyboardScope::Carousel);
/// let page = Page::with_config("<main></main>", config)?;
/// assert_eq!(page.now_ms(), 1_700_000_000_000);
/// # Ok::<(), booking_page::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageConfig {
    pub start_time_ms: i64,
    /// Offset of the page's local time zone from UTC, in minutes.
    pub utc_offset_minutes: i32,
    pub intersection_observer: bool,
    pub keyboard_scope: KeyboardScope,
    pub timer_step_limit: usize,
    pub trace: bool,
    pub trace_log_limit: usize,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            start_time_ms: 0,
            utc_offset_minutes: 0,
            intersection_observer: true,
            keyboard_scope: KeyboardScope::Document,
            timer_step_limit: 10_000,
            trace: false,
            trace_log_limit: 10_000,
        }
    }
}

impl PageConfig {
    pub fn with_start_time_ms(mut self, start_time_ms: i64) -> Self {
        self.start_time_ms = start_time_ms;
        self
    }

    pub fn with_utc_offset_minutes(mut self, minutes: i32) -> Self {
        self.utc_offset_minutes = minutes;
        self
    }

    pub fn with_intersection_observer(mut self, available: bool) -> Self {
        self.intersection_observer = available;
        self
    }

    pub fn with_keyboard_scope(mut self, scope: KeyboardScope) -> Self {
        self.keyboard_scope = scope;
        self
    }

    pub fn with_timer_step_limit(mut self, max_steps: usize) -> Self {
        self.timer_step_limit = max_steps;
        self
    }

    pub fn with_trace(mut self, enabled: bool) -> Self {
        self.trace = enabled;
        self
    }

    pub fn with_trace_log_limit(mut self, max_entries: usize) -> Self {
        self.trace_log_limit = max_entries;
        self
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.timer_step_limit == 0 {
            return Err(Error::runtime("timer_step_limit requires at least 1 step"));
        }
        if self.trace_log_limit == 0 {
            return Err(Error::runtime("trace_log_limit requires at least 1 entry"));
        }
        if self.utc_offset_minutes.unsigned_abs() >= 24 * 60 {
            return Err(Error::Runtime(format!(
                "utc_offset_minutes must be within one day (got {})",
                self.utc_offset_minutes
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(PageConfig::default().validate().is_ok());
        assert_eq!(PageConfig::default().keyboard_scope, KeyboardScope::Document);
    }

    #[test]
    fn zero_limits_and_oversized_offsets_are_rejected() {
        for config in [
            PageConfig::default().with_timer_step_limit(0),
            PageConfig::default().with_trace_log_limit(0),
            PageConfig::default().with_utc_offset_minutes(24 * 60),
            PageConfig::default().with_utc_offset_minutes(-24 * 60),
        ] {
            assert!(matches!(config.validate(), Err(Error::Runtime(_))), "{config:?}");
        }
    }
}
