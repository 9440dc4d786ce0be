/// Placement and visibility rules for the selection tooltip
use crate::viewport::Vec2;

/// Gap between the selection and the tooltip, and from the window edge
pub const TOOLTIP_GAP: f64 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TooltipAction {
    Save,
    Cancel,
}

impl TooltipAction {
    pub const ALL: [TooltipAction; 2] = [TooltipAction::Save, TooltipAction::Cancel];

    pub fn icon(self) -> &'static str {
        match self {
            TooltipAction::Save => "💾",
            TooltipAction::Cancel => "❌",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TooltipAction::Save => "Save",
            TooltipAction::Cancel => "Cancel",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TooltipAction::Save => "save",
            TooltipAction::Cancel => "cancel",
        }
    }

    pub fn parse(value: &str) -> Option<TooltipAction> {
        TooltipAction::ALL.into_iter().find(|a| a.as_str() == value)
    }
}

/// Trimmed selection text, or `None` when there is nothing to capture
pub fn normalize_selection(raw: &str) -> Option<String> {
    let text = raw.trim();
    (!text.is_empty()).then(|| text.to_string())
}

/// True for ctrl+B / cmd+B
pub fn is_capture_shortcut(key: &str, ctrl: bool, meta: bool) -> bool {
    (ctrl || meta) && key.eq_ignore_ascii_case("b")
}

/// Top-left corner for a tooltip of `size` anchored at `anchor`
/// (horizontal center, bottom edge of the selection), kept inside `window`.
pub fn place_tooltip(anchor: Vec2, size: Vec2, window: Vec2) -> Vec2 {
    let mut x = anchor.x;
    let mut y = anchor.y + TOOLTIP_GAP;

    if x + size.x > window.x {
        x = window.x - size.x - TOOLTIP_GAP;
    }
    if y + size.y > window.y {
        y = anchor.y - size.y - TOOLTIP_GAP;
    }
    Vec2::new(x, y)
}

/// Visibility state of the tooltip across page events
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TooltipState {
    visible: bool,
    selected_text: Option<String>,
    ignore_next_click: bool,
}

impl TooltipState {
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn selected_text(&self) -> Option<&str> {
        self.selected_text.as_deref()
    }

    /// Mouse released. Returns the text to show the tooltip for.
    ///
    /// The click that follows this mouse-up must not hide the tooltip again.
    pub fn on_mouse_up(&mut self, raw_selection: &str) -> Option<String> {
        let text = normalize_selection(raw_selection)?;
        self.visible = true;
        self.ignore_next_click = true;
        self.selected_text = Some(text.clone());
        Some(text)
    }

    /// Document click. Returns true if the tooltip should hide.
    pub fn on_click(&mut self, inside_tooltip: bool) -> bool {
        if self.ignore_next_click {
            self.ignore_next_click = false;
            return false;
        }
        if inside_tooltip || !self.visible {
            return false;
        }
        self.visible = false;
        true
    }

    /// Selection changed. Returns true if the tooltip should hide.
    pub fn on_selection_change(&mut self, raw_selection: &str) -> bool {
        if normalize_selection(raw_selection).is_some() || !self.visible {
            return false;
        }
        self.visible = false;
        true
    }

    /// Action button pressed. `Save` yields the text to capture, if any.
    pub fn on_action(&mut self, action: TooltipAction) -> Option<String> {
        match action {
            TooltipAction::Save => self.selected_text.clone(),
            TooltipAction::Cancel => {
                self.visible = false;
                None
            }
        }
    }

    pub fn hide(&mut self) {
        self.visible = false;
    }
}
