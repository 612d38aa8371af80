//! Enumerations for TUI state management.

/// Named screens held by the navigator.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Route {
    Splash,
    TodoList,
    Settings,
}

impl Route {
    pub fn name(self) -> &'static str {
        match self {
            Route::Splash => "SplashScreen",
            Route::TodoList => "TodoScreen",
            Route::Settings => "Settings",
        }
    }
}

/// Which part of the list screen receives key presses.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Focus {
    Input,
    List,
}
