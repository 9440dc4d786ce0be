/// In-page capture: selection tooltip, shortcut and editor overlay
pub mod content_script;
pub mod tooltip;
