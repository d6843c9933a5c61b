//! Theme State and Observer
//!
//! The diagram has exactly one piece of view-level styling state: whether
//! the surrounding UI is in light or dark mode. [`ThemeObserver`] owns the
//! current value and interprets change notifications from an external
//! signal (a `data-theme`-style attribute watched by the host). Theme is
//! view state, never data state: it drives the derived stroke color of
//! links but must never leak into the canonical snapshot or its serialized
//! form.

/// Process-wide light/dark mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ThemeState {
    Light,
    /// The initial value when the external signal is absent at setup.
    #[default]
    Dark,
}

impl ThemeState {
    /// Interpret a raw signal value. Anything other than `"dark"` counts as
    /// light.
    pub fn parse(value: &str) -> Self {
        if value == "dark" {
            ThemeState::Dark
        } else {
            ThemeState::Light
        }
    }

    /// Derived presentation color for link strokes. This is recomputed on
    /// demand, not stored on any record.
    pub fn link_stroke(self) -> &'static str {
        match self {
            ThemeState::Dark => "white",
            ThemeState::Light => "black",
        }
    }
}

/// Watches the external theme signal and owns the current [`ThemeState`].
#[derive(Debug)]
pub struct ThemeObserver {
    current: ThemeState,
}

impl ThemeObserver {
    /// Read the signal once at setup. An absent signal means dark.
    pub fn new(initial_signal: Option<&str>) -> Self {
        Self {
            current: initial_signal.map(ThemeState::parse).unwrap_or_default(),
        }
    }

    pub fn current(&self) -> ThemeState {
        self.current
    }

    /// Handle a change notification from the signal. An attribute removed
    /// mid-session reads as light, unlike the setup default.
    ///
    /// Returns the new state when it actually changed, so the caller can
    /// trigger the adapter's recolor pass exactly once per transition.
    pub fn signal_changed(&mut self, value: Option<&str>) -> Option<ThemeState> {
        let next = ThemeState::parse(value.unwrap_or("light"));
        if next == self.current {
            return None;
        }
        self.current = next;
        Some(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_unrecognized_is_light() {
        assert_eq!(ThemeState::parse("dark"), ThemeState::Dark);
        assert_eq!(ThemeState::parse("light"), ThemeState::Light);
        assert_eq!(ThemeState::parse("solarized"), ThemeState::Light);
        assert_eq!(ThemeState::parse(""), ThemeState::Light);
    }

    #[test]
    fn test_initial_value_defaults_to_dark() {
        assert_eq!(ThemeObserver::new(None).current(), ThemeState::Dark);
        assert_eq!(ThemeObserver::new(Some("light")).current(), ThemeState::Light);
    }

    #[test]
    fn test_absent_signal_on_change_reads_as_light() {
        let mut observer = ThemeObserver::new(Some("dark"));
        assert_eq!(observer.signal_changed(None), Some(ThemeState::Light));
        assert_eq!(observer.current(), ThemeState::Light);
    }

    #[test]
    fn test_signal_changed_reports_transitions_only() {
        let mut observer = ThemeObserver::new(None);
        assert_eq!(observer.signal_changed(Some("dark")), None);
        assert_eq!(observer.signal_changed(Some("light")), Some(ThemeState::Light));
        assert_eq!(observer.signal_changed(Some("light")), None);
    }

    #[test]
    fn test_stroke_derivation() {
        assert_eq!(ThemeState::Dark.link_stroke(), "white");
        assert_eq!(ThemeState::Light.link_stroke(), "black");
    }
}
