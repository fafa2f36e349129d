//! View state
//!
//! Scale, rotation, current page, theme and page layout. `ViewState` is an
//! immutable snapshot: every user action produces a new value through
//! [`ViewState::apply`], nothing else mutates it.

use std::fmt;
use std::str::FromStr;

use image::Rgba;
use serde::{Deserialize, Serialize};

pub const MIN_SCALE: f32 = 0.4;
pub const MAX_SCALE: f32 = 3.0;
pub const DEFAULT_SCALE: f32 = 1.2;
pub const ZOOM_STEP: f32 = 0.2;

/// Clamp a scale into range, rounded to hundredths so repeated steps don't drift
pub fn clamp_scale(scale: f32) -> f32 {
    ((scale * 100.0).round() / 100.0).clamp(MIN_SCALE, MAX_SCALE)
}

/// Clockwise page rotation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
pub enum Rotation {
    #[default]
    Deg0,
    Deg90,
    Deg180,
    Deg270,
}

impl Rotation {
    pub fn degrees(self) -> u16 {
        match self {
            Rotation::Deg0 => 0,
            Rotation::Deg90 => 90,
            Rotation::Deg180 => 180,
            Rotation::Deg270 => 270,
        }
    }

    /// Any multiple of 90, negative values included
    pub fn from_degrees(degrees: i32) -> Option<Self> {
        if degrees % 90 != 0 {
            return None;
        }
        match degrees.rem_euclid(360) {
            0 => Some(Rotation::Deg0),
            90 => Some(Rotation::Deg90),
            180 => Some(Rotation::Deg180),
            270 => Some(Rotation::Deg270),
            _ => None,
        }
    }

    pub fn rotate_right(self) -> Self {
        Self::turn(self, 90)
    }

    pub fn rotate_left(self) -> Self {
        Self::turn(self, -90)
    }

    fn turn(self, delta: i32) -> Self {
        let degrees = (self.degrees() as i32 + delta + 360) % 360;
        Self::from_degrees(degrees).unwrap_or_default()
    }
}

impl From<Rotation> for u16 {
    fn from(rotation: Rotation) -> Self {
        rotation.degrees()
    }
}

impl TryFrom<u16> for Rotation {
    type Error = String;

    fn try_from(degrees: u16) -> Result<Self, Self::Error> {
        Rotation::from_degrees(degrees as i32)
            .filter(|r| r.degrees() == degrees)
            .ok_or_else(|| format!("invalid rotation: {}", degrees))
    }
}

/// Colour theme
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    /// Page background painted before the renderer draws
    pub fn background(self) -> Rgba<u8> {
        match self {
            Theme::Light => Rgba([0xff, 0xff, 0xff, 0xff]),
            Theme::Dark => Rgba([0x1e, 0x1e, 0x1e, 0xff]),
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

impl FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            other => Err(format!("unknown theme: {}", other)),
        }
    }
}

/// How pages are laid out
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageLayout {
    /// Every page stacked in one scrolling column
    #[default]
    Continuous,
    /// One page at a time
    Paginated,
}

impl FromStr for PageLayout {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "continuous" | "scroll" => Ok(PageLayout::Continuous),
            "paginated" | "single" => Ok(PageLayout::Paginated),
            other => Err(format!("unknown layout: {}", other)),
        }
    }
}

/// User-triggered view transition
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ViewAction {
    ZoomIn,
    ZoomOut,
    /// Back to the default scale and no rotation
    ResetZoom,
    RotateRight,
    RotateLeft,
    SetPage(u32),
    NextPage,
    PreviousPage,
    ToggleTheme,
    SetTheme(Theme),
    SetLayout(PageLayout),
}

/// Snapshot of everything that affects how pages are drawn
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewState {
    pub scale: f32,
    pub rotation: Rotation,
    /// Page number (1-indexed)
    pub current_page: u32,
    pub theme: Theme,
    pub layout: PageLayout,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            scale: DEFAULT_SCALE,
            rotation: Rotation::Deg0,
            current_page: 1,
            theme: Theme::Light,
            layout: PageLayout::Continuous,
        }
    }
}

impl ViewState {
    /// Apply a transition. `page_count` bounds page navigation.
    pub fn apply(self, action: ViewAction, page_count: u32) -> Self {
        match action {
            ViewAction::ZoomIn => Self {
                scale: clamp_scale(self.scale + ZOOM_STEP),
                ..self
            },
            ViewAction::ZoomOut => Self {
                scale: clamp_scale(self.scale - ZOOM_STEP),
                ..self
            },
            ViewAction::ResetZoom => Self {
                scale: DEFAULT_SCALE,
                rotation: Rotation::Deg0,
                ..self
            },
            ViewAction::RotateRight => Self {
                rotation: self.rotation.rotate_right(),
                ..self
            },
            ViewAction::RotateLeft => Self {
                rotation: self.rotation.rotate_left(),
                ..self
            },
            ViewAction::SetPage(page) => Self {
                current_page: clamp_page(page, page_count),
                ..self
            },
            ViewAction::NextPage => Self {
                current_page: clamp_page(self.current_page.saturating_add(1), page_count),
                ..self
            },
            ViewAction::PreviousPage => Self {
                current_page: clamp_page(self.current_page.saturating_sub(1), page_count),
                ..self
            },
            ViewAction::ToggleTheme => Self {
                theme: self.theme.toggled(),
                ..self
            },
            ViewAction::SetTheme(theme) => Self { theme, ..self },
            ViewAction::SetLayout(layout) => Self { layout, ..self },
        }
    }

    /// Toolbar label, e.g. `120%, 90°`
    pub fn zoom_label(&self) -> String {
        format!(
            "{}%, {}°",
            (self.scale * 100.0).round() as u32,
            self.rotation.degrees()
        )
    }
}

impl fmt::Display for ViewState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "page {} @ {} ({:?}, {:?})",
            self.current_page,
            self.zoom_label(),
            self.theme,
            self.layout
        )
    }
}

fn clamp_page(page: u32, page_count: u32) -> u32 {
    page.clamp(1, page_count.max(1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let view = ViewState::default();
        assert_eq!(view.scale, 1.2);
        assert_eq!(view.rotation, Rotation::Deg0);
        assert_eq!(view.current_page, 1);
        assert_eq!(view.theme, Theme::Light);
    }

    #[test]
    fn test_zoom_in_clamps_at_max() {
        let mut view = ViewState::default();
        for _ in 0..50 {
            view = view.apply(ViewAction::ZoomIn, 1);
        }
        assert_eq!(view.scale, MAX_SCALE);
    }

    #[test]
    fn test_zoom_out_clamps_at_min() {
        let mut view = ViewState::default();
        for _ in 0..50 {
            view = view.apply(ViewAction::ZoomOut, 1);
        }
        assert_eq!(view.scale, MIN_SCALE);
    }

    #[test]
    fn test_zoom_steps_do_not_drift() {
        let view = ViewState::default().apply(ViewAction::ZoomIn, 1);
        assert_eq!(view.scale, 1.4);
        let view = view.apply(ViewAction::ZoomOut, 1).apply(ViewAction::ZoomOut, 1);
        assert_eq!(view.scale, 1.0);
    }

    #[test]
    fn test_rotate_right_four_times_is_identity() {
        let mut view = ViewState::default();
        let mut seen = Vec::new();
        for _ in 0..4 {
            view = view.apply(ViewAction::RotateRight, 1);
            seen.push(view.rotation.degrees());
        }
        assert_eq!(seen, vec![90, 180, 270, 0]);
        assert_eq!(view.rotation, Rotation::Deg0);
    }

    #[test]
    fn test_rotate_left_wraps() {
        let view = ViewState::default().apply(ViewAction::RotateLeft, 1);
        assert_eq!(view.rotation, Rotation::Deg270);
    }

    #[test]
    fn test_reset_zoom_clears_rotation() {
        let view = ViewState::default()
            .apply(ViewAction::ZoomIn, 1)
            .apply(ViewAction::RotateRight, 1)
            .apply(ViewAction::ResetZoom, 1);
        assert_eq!(view.scale, DEFAULT_SCALE);
        assert_eq!(view.rotation, Rotation::Deg0);
    }

    #[test]
    fn test_set_page_clamps() {
        let view = ViewState::default();
        assert_eq!(view.apply(ViewAction::SetPage(0), 5).current_page, 1);
        assert_eq!(view.apply(ViewAction::SetPage(3), 5).current_page, 3);
        assert_eq!(view.apply(ViewAction::SetPage(99), 5).current_page, 5);
    }

    #[test]
    fn test_next_previous_page_stay_in_range() {
        let view = ViewState::default();
        assert_eq!(view.apply(ViewAction::PreviousPage, 3).current_page, 1);
        let last = view.apply(ViewAction::SetPage(3), 3);
        assert_eq!(last.apply(ViewAction::NextPage, 3).current_page, 3);
    }

    #[test]
    fn test_theme_transitions() {
        let view = ViewState::default().apply(ViewAction::ToggleTheme, 1);
        assert_eq!(view.theme, Theme::Dark);
        assert_eq!(view.apply(ViewAction::SetTheme(Theme::Light), 1).theme, Theme::Light);
        assert_eq!(Theme::Dark.background(), Rgba([0x1e, 0x1e, 0x1e, 0xff]));
    }

    #[test]
    fn test_zoom_label() {
        let view = ViewState::default().apply(ViewAction::RotateRight, 1);
        assert_eq!(view.zoom_label(), "120%, 90°");
    }

    #[test]
    fn test_rotation_serde_as_degrees() {
        let json = serde_json::to_string(&Rotation::Deg270).unwrap();
        assert_eq!(json, "270");
        let parsed: Rotation = serde_json::from_str("90").unwrap();
        assert_eq!(parsed, Rotation::Deg90);
        assert!(serde_json::from_str::<Rotation>("45").is_err());
    }

    #[test]
    fn test_parse_theme_and_layout() {
        assert_eq!("Dark".parse::<Theme>().unwrap(), Theme::Dark);
        assert_eq!("paginated".parse::<PageLayout>().unwrap(), PageLayout::Paginated);
        assert!("sepia".parse::<Theme>().is_err());
    }
}
