use std::time::{Duration, Instant};

/// How long a newly shown panel takes to reach full opacity
pub const FADE_IN: Duration = Duration::from_millis(200);
/// How long a panel keeps fading out before it is hidden
pub const HIDE_DELAY: Duration = Duration::from_millis(180);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Chat,
    Forward,
    Inverse,
}

impl Tab {
    pub const ALL: [Tab; 3] = [Tab::Chat, Tab::Forward, Tab::Inverse];

    fn index(self) -> usize {
        match self {
            Tab::Chat => 0,
            Tab::Forward => 1,
            Tab::Inverse => 2,
        }
    }

    pub fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Transition {
    Hidden,
    Shown,
    FadingIn { since: Instant },
    FadingOut { since: Instant },
}

/// Tracks which of the three panels is on screen.
///
/// Exactly one tab is active at any time. A panel that loses focus keeps
/// being displayed (at decreasing opacity) until `HIDE_DELAY` has passed.
#[derive(Debug)]
pub struct TabController {
    active: Tab,
    panels: [Transition; 3],
}

impl TabController {
    pub fn new() -> Self {
        let mut panels = [Transition::Hidden; 3];
        panels[Tab::Chat.index()] = Transition::Shown;
        Self {
            active: Tab::Chat,
            panels,
        }
    }

    pub fn active(&self) -> Tab {
        self.active
    }

    pub fn show_tab(&mut self, tab: Tab, now: Instant) {
        if tab == self.active && self.panels[tab.index()] == Transition::Shown {
            return;
        }

        for other in Tab::ALL {
            let slot = &mut self.panels[other.index()];
            if other == tab {
                *slot = Transition::FadingIn { since: now };
            } else if *slot != Transition::Hidden {
                // Already-fading panels restart their fade from the current moment
                *slot = Transition::FadingOut { since: now };
            }
        }
        self.active = tab;
    }

    /// Settle finished transitions. Called on every tick.
    pub fn tick(&mut self, now: Instant) {
        for slot in self.panels.iter_mut() {
            match *slot {
                Transition::FadingIn { since } if now.duration_since(since) >= FADE_IN => {
                    *slot = Transition::Shown;
                }
                Transition::FadingOut { since } if now.duration_since(since) >= HIDE_DELAY => {
                    *slot = Transition::Hidden;
                }
                _ => {}
            }
        }
    }

    /// Whether the panel still occupies the screen at `now`
    pub fn is_displayed(&self, tab: Tab, now: Instant) -> bool {
        match self.panels[tab.index()] {
            Transition::Hidden => false,
            Transition::Shown | Transition::FadingIn { .. } => true,
            Transition::FadingOut { since } => now.duration_since(since) < HIDE_DELAY,
        }
    }

    pub fn opacity(&self, tab: Tab, now: Instant) -> f32 {
        match self.panels[tab.index()] {
            Transition::Hidden => 0.0,
            Transition::Shown => 1.0,
            Transition::FadingIn { since } => ratio(now.duration_since(since), FADE_IN),
            Transition::FadingOut { since } => 1.0 - ratio(now.duration_since(since), HIDE_DELAY),
        }
    }
}

impl Default for TabController {
    fn default() -> Self {
        Self::new()
    }
}

fn ratio(elapsed: Duration, total: Duration) -> f32 {
    (elapsed.as_secs_f32() / total.as_secs_f32()).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_on_chat() {
        let tabs = TabController::new();
        let now = Instant::now();
        assert_eq!(tabs.active(), Tab::Chat);
        assert!(tabs.is_displayed(Tab::Chat, now));
        assert!(!tabs.is_displayed(Tab::Forward, now));
        assert!(!tabs.is_displayed(Tab::Inverse, now));
        assert_eq!(tabs.opacity(Tab::Chat, now), 1.0);
    }

    #[test]
    fn previous_panel_hidden_after_delay() {
        let mut tabs = TabController::new();
        let t0 = Instant::now();
        tabs.show_tab(Tab::Forward, t0);

        assert_eq!(tabs.active(), Tab::Forward);
        assert_eq!(tabs.opacity(Tab::Forward, t0), 0.0);
        // Old panel still fading out
        assert!(tabs.is_displayed(Tab::Chat, t0));

        let later = t0 + HIDE_DELAY + Duration::from_millis(30);
        tabs.tick(later);
        assert!(!tabs.is_displayed(Tab::Chat, later));
        assert!(tabs.is_displayed(Tab::Forward, later));
        assert_eq!(tabs.opacity(Tab::Forward, later), 1.0);
    }

    #[test]
    fn fade_in_is_monotonic() {
        let mut tabs = TabController::new();
        let t0 = Instant::now();
        tabs.show_tab(Tab::Inverse, t0);

        let mid = tabs.opacity(Tab::Inverse, t0 + FADE_IN / 2);
        assert!(mid > 0.0 && mid < 1.0);
        assert_eq!(tabs.opacity(Tab::Inverse, t0 + FADE_IN * 2), 1.0);
    }

    #[test]
    fn rapid_switching_keeps_one_active() {
        let mut tabs = TabController::new();
        let t0 = Instant::now();
        tabs.show_tab(Tab::Forward, t0);
        tabs.show_tab(Tab::Inverse, t0 + Duration::from_millis(10));
        tabs.show_tab(Tab::Chat, t0 + Duration::from_millis(20));

        let settled = t0 + Duration::from_secs(1);
        tabs.tick(settled);
        assert_eq!(tabs.active(), Tab::Chat);
        let shown: Vec<Tab> = Tab::ALL
            .into_iter()
            .filter(|t| tabs.is_displayed(*t, settled))
            .collect();
        assert_eq!(shown, vec![Tab::Chat]);
    }

    #[test]
    fn cycling_wraps_around() {
        assert_eq!(Tab::Inverse.next(), Tab::Chat);
        assert_eq!(Tab::Chat.prev(), Tab::Inverse);
    }
}
