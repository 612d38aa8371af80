//! Color constants for the terminal user interface.

use ratatui::style::Color;

/// Splash background.
pub const SPLASH_RED: Color = Color::Rgb(221, 36, 118);
/// Task list chrome and the status bar.
pub const NIGHT_BLUE: Color = Color::Rgb(29, 38, 113);
/// Accent for the focused widget.
pub const BERRY: Color = Color::Rgb(195, 55, 100);
/// Secondary text such as task dates.
pub const MUTED_GRAY: Color = Color::Rgb(150, 150, 150);
