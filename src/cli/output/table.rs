//! Table output formatting for CLI commands
//!
//! Renders component descriptors and captured notifications with comfy-table.
//! Colors are dropped when the terminal can't show them, and state icons
//! take their place.

use comfy_table::{presets, Attribute, Cell, Color, ContentArrangement, Table};
use std::env;

use crate::cli::output::truncate;
use crate::domain::models::{ComponentDescriptor, ComponentState};
use crate::infrastructure::notifier::Notification;
use crate::domain::ports::NotificationLevel;

/// Table formatter for CLI output
pub struct TableFormatter {
    /// Whether to use colors in output
    use_colors: bool,
    /// Maximum width for tables (None = auto)
    max_width: Option<u16>,
}

impl TableFormatter {
    pub fn new() -> Self {
        Self {
            use_colors: supports_color(),
            max_width: None,
        }
    }

    pub const fn with_config(use_colors: bool, max_width: Option<u16>) -> Self {
        Self {
            use_colors,
            max_width,
        }
    }

    /// Format registry descriptors, one row per component
    pub fn format_components(&self, components: &[ComponentDescriptor]) -> String {
        let mut table = self.create_base_table();

        table.set_header(vec![
            Cell::new("Component").add_attribute(Attribute::Bold),
            Cell::new("Kind").add_attribute(Attribute::Bold),
            Cell::new("State").add_attribute(Attribute::Bold),
            Cell::new("Gen").add_attribute(Attribute::Bold),
            Cell::new("Initialized").add_attribute(Attribute::Bold),
            Cell::new("Failure").add_attribute(Attribute::Bold),
        ]);

        for component in components {
            let kind = if component.instance.has_initializer() {
                "active"
            } else {
                "passive"
            };

            let state_cell = if self.use_colors {
                Cell::new(component.state.to_string()).fg(state_color(component.state))
            } else {
                Cell::new(format!(
                    "{} {}",
                    state_icon(component.state),
                    component.state
                ))
            };

            let initialized = component
                .initialized_at
                .map_or_else(|| "-".to_string(), |at| at.format("%H:%M:%S%.3f").to_string());

            let failure = component
                .failure
                .as_deref()
                .map_or_else(|| "-".to_string(), |reason| truncate(reason, 40));

            table.add_row(vec![
                Cell::new(&component.name),
                Cell::new(kind),
                state_cell,
                Cell::new(component.generation),
                Cell::new(initialized),
                Cell::new(failure),
            ]);
        }

        table.to_string()
    }

    /// Format notifications shown during a run
    pub fn format_notifications(&self, notifications: &[Notification]) -> String {
        let mut table = self.create_base_table();

        table.set_header(vec![
            Cell::new("Level").add_attribute(Attribute::Bold),
            Cell::new("Title").add_attribute(Attribute::Bold),
            Cell::new("Message").add_attribute(Attribute::Bold),
        ]);

        for notification in notifications {
            let level_cell = if self.use_colors {
                Cell::new(notification.level.as_str()).fg(level_color(notification.level))
            } else {
                Cell::new(notification.level.as_str())
            };

            table.add_row(vec![
                level_cell,
                Cell::new(&notification.title),
                Cell::new(truncate(&notification.message, 60)),
            ]);
        }

        table.to_string()
    }

    fn create_base_table(&self) -> Table {
        let mut table = Table::new();

        table
            .load_preset(presets::UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic);

        if let Some(width) = self.max_width {
            table.set_width(width);
        }

        table
    }
}

impl Default for TableFormatter {
    fn default() -> Self {
        Self::new()
    }
}

/// Check if color output is supported
fn supports_color() -> bool {
    if env::var("NO_COLOR").is_ok() {
        return false;
    }

    if let Ok(term) = env::var("TERM") {
        if term == "dumb" {
            return false;
        }
    }

    true
}

const fn state_color(state: ComponentState) -> Color {
    match state {
        ComponentState::Initialized => Color::Green,
        ComponentState::Initializing => Color::Cyan,
        ComponentState::Registered => Color::Yellow,
        ComponentState::Failed => Color::Red,
        ComponentState::Unregistered => Color::DarkGrey,
    }
}

const fn state_icon(state: ComponentState) -> &'static str {
    match state {
        ComponentState::Initialized => "✓",
        ComponentState::Initializing => "⟳",
        ComponentState::Registered => "○",
        ComponentState::Failed => "✗",
        ComponentState::Unregistered => "·",
    }
}

const fn level_color(level: NotificationLevel) -> Color {
    match level {
        NotificationLevel::Info => Color::Cyan,
        NotificationLevel::Success => Color::Green,
        NotificationLevel::Warning => Color::Yellow,
        NotificationLevel::Error => Color::Red,
    }
}
