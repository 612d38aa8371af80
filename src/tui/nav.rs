//! Stack navigation between screens and the splash hand-off timer.

use std::time::{Duration, Instant};

use log::debug;

use crate::tui::enums::Route;

/// How long the splash screen stays up before the task list replaces it.
pub const SPLASH_DELAY: Duration = Duration::from_secs(2);

/// Screen stack. The top of the stack is the visible screen.
#[derive(Debug, Clone)]
pub struct Navigator {
    stack: Vec<Route>,
}

impl Navigator {
    pub fn new(initial: Route) -> Self {
        Navigator { stack: vec![initial] }
    }

    /// The visible screen.
    pub fn current(&self) -> Route {
        // The stack is never emptied: `back` refuses to pop the last entry.
        self.stack.last().copied().unwrap_or(Route::Splash)
    }

    /// Push a screen on top of the current one.
    pub fn navigate(&mut self, route: Route) {
        debug!("event=navigate module=tui status=ok from={} to={}", self.current().name(), route.name());
        self.stack.push(route);
    }

    /// Swap the visible screen for another one.
    pub fn replace(&mut self, route: Route) {
        debug!("event=replace module=tui status=ok from={} to={}", self.current().name(), route.name());
        self.stack.pop();
        self.stack.push(route);
    }

    /// Pop the visible screen. Returns `false` on the root screen.
    pub fn back(&mut self) -> bool {
        if self.stack.len() > 1 {
            self.stack.pop();
            true
        } else {
            false
        }
    }

    /// Whether a screen is anywhere on the stack (i.e. still mounted).
    pub fn contains(&self, route: Route) -> bool {
        self.stack.contains(&route)
    }
}

/// Fires once, `delay` after it was started. There is no way to skip it.
#[derive(Debug, Clone, Copy)]
pub struct SplashTimer {
    started: Instant,
    delay: Duration,
}

impl SplashTimer {
    pub fn start(started: Instant, delay: Duration) -> Self {
        SplashTimer { started, delay }
    }

    pub fn is_done(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.started) >= self.delay
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replace_keeps_depth() {
        let mut nav = Navigator::new(Route::Splash);
        nav.replace(Route::TodoList);
        assert_eq!(nav.current(), Route::TodoList);
        assert!(!nav.contains(Route::Splash));
        assert!(!nav.back());
    }

    #[test]
    fn test_navigate_and_back() {
        let mut nav = Navigator::new(Route::TodoList);
        nav.navigate(Route::Settings);
        assert_eq!(nav.current(), Route::Settings);
        assert!(nav.contains(Route::TodoList));
        assert!(nav.back());
        assert_eq!(nav.current(), Route::TodoList);
        assert!(!nav.back());
        assert_eq!(nav.current(), Route::TodoList);
    }

    #[test]
    fn test_splash_timer() {
        let start = Instant::now();
        let timer = SplashTimer::start(start, SPLASH_DELAY);
        assert!(!timer.is_done(start));
        assert!(!timer.is_done(start + Duration::from_millis(1999)));
        assert!(timer.is_done(start + SPLASH_DELAY));
    }
}
