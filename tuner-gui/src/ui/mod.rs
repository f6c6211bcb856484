//! # UI Module
//!
//! This module contains all UI components for the guitar tuner.

pub mod cent_meter;
pub mod main_display;
pub mod string_panel;

use iced::Color;

/// In-tune highlight.
pub const GREEN: Color = Color { r: 0.13, g: 0.77, b: 0.37, a: 1.0 };
/// Right string, out of tune.
pub const ORANGE: Color = Color { r: 0.98, g: 0.45, b: 0.09, a: 1.0 };
/// Last reference string pressed.
pub const PURPLE: Color = Color { r: 0.66, g: 0.33, b: 0.97, a: 1.0 };
pub const RED: Color = Color { r: 0.94, g: 0.27, b: 0.27, a: 1.0 };
pub const MUTED: Color = Color { r: 0.45, g: 0.45, b: 0.45, a: 1.0 };
pub const NEEDLE: Color = Color { r: 0.20, g: 0.60, b: 0.86, a: 1.0 };
