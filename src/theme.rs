use ratatui::style::{Color, Modifier, Style};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct Theme {
    pub(crate) base: Style,
    pub(crate) heading: Style,
    /// Days of the neighboring month and empty-state placeholders
    pub(crate) dim: Style,
    /// Days that have at least one task
    pub(crate) busy_day: Style,
    pub(crate) selected_day: Style,
    pub(crate) cursor: Style,
    pub(crate) focused_border: Style,
    pub(crate) unfilled_field: Style,
}

pub(crate) const DARK: Theme = {
    let base = Style::new().fg(Color::White).bg(Color::Black);
    Theme {
        base,
        heading: base.add_modifier(Modifier::BOLD),
        dim: base.fg(Color::DarkGray),
        busy_day: base.fg(Color::LightYellow).add_modifier(Modifier::BOLD),
        selected_day: base.fg(Color::Black).bg(Color::LightBlue),
        cursor: base.add_modifier(Modifier::REVERSED),
        focused_border: base.fg(Color::LightBlue),
        unfilled_field: base.fg(Color::DarkGray).add_modifier(Modifier::UNDERLINED),
    }
};

pub(crate) const LIGHT: Theme = {
    let base = Style::new().fg(Color::Black).bg(Color::White);
    Theme {
        base,
        heading: base.add_modifier(Modifier::BOLD),
        dim: base.fg(Color::Gray),
        busy_day: base.fg(Color::Red).add_modifier(Modifier::BOLD),
        selected_day: base.fg(Color::White).bg(Color::Blue),
        cursor: base.add_modifier(Modifier::REVERSED),
        focused_border: base.fg(Color::Blue),
        unfilled_field: base.fg(Color::Gray).add_modifier(Modifier::UNDERLINED),
    }
};

/// The persisted choice between [`LIGHT`] and [`DARK`]
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub(crate) enum ThemePreference {
    #[default]
    Light,
    Dark,
}

impl ThemePreference {
    pub(crate) fn name(self) -> &'static str {
        match self {
            ThemePreference::Light => "light",
            ThemePreference::Dark => "dark",
        }
    }

    pub(crate) fn from_name(name: &str) -> Option<ThemePreference> {
        match name {
            "light" => Some(ThemePreference::Light),
            "dark" => Some(ThemePreference::Dark),
            _ => None,
        }
    }

    pub(crate) fn toggled(self) -> ThemePreference {
        match self {
            ThemePreference::Light => ThemePreference::Dark,
            ThemePreference::Dark => ThemePreference::Light,
        }
    }

    pub(crate) fn theme(self) -> &'static Theme {
        match self {
            ThemePreference::Light => &LIGHT,
            ThemePreference::Dark => &DARK,
        }
    }
}
