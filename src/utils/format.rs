//! Table formatting and output utilities
//!
//! This module provides functionality for rendering command output as
//! tables, JSON, YAML or plain `key: value` text.

use crate::error::{Result, TemplateError};
use clap::ValueEnum;
use crossterm::{
    style::{Color as CrosstermColor, Stylize},
    terminal::size,
    tty::IsTty,
};
use serde::Serialize;
use std::io::stdout;
use tabled::{
    settings::{object::Rows, Alignment, Color, Modify, Padding, Style, Width},
    Table, Tabled,
};

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
    Yaml,
    Text,
}

/// Types that can be rendered in every output format
pub trait FormattableOutput: Serialize + Tabled {
    fn render(&self, format: OutputFormat, no_color: bool) -> Result<String>
    where
        Self: Sized,
    {
        TableFormatter::new(format, no_color).format_single(self)
    }
}

/// Whether output should be plain: `NO_COLOR` is set or stdout is not a terminal
pub fn no_color() -> bool {
    std::env::var_os("NO_COLOR").is_some() || !stdout().is_tty()
}

/// Color theme for console output
#[derive(Debug, Clone)]
pub struct ColorTheme {
    pub success: CrosstermColor,
    pub warning: CrosstermColor,
    pub accent: CrosstermColor,
}

impl Default for ColorTheme {
    fn default() -> Self {
        Self {
            success: CrosstermColor::Green,
            warning: CrosstermColor::Yellow,
            accent: CrosstermColor::Magenta,
        }
    }
}

/// Table formatter with color support
pub struct TableFormatter {
    format: OutputFormat,
    no_color: bool,
}

impl TableFormatter {
    pub fn new(format: OutputFormat, no_color: bool) -> Self {
        Self { format, no_color }
    }

    /// Render a list of rows
    pub fn format_table<T: Tabled + Serialize>(&self, data: &[T]) -> Result<String> {
        match self.format {
            OutputFormat::Table => Ok(self.format_as_table(data)),
            OutputFormat::Json => Ok(serde_json::to_string_pretty(data)?),
            OutputFormat::Yaml => format_as_yaml(data),
            OutputFormat::Text => Ok(data
                .iter()
                .map(|row| self.format_as_text(row))
                .collect::<Vec<_>>()
                .join("\n\n")),
        }
    }

    /// Render a single record; JSON and YAML emit an object rather than a list
    pub fn format_single<T: Tabled + Serialize>(&self, item: &T) -> Result<String> {
        match self.format {
            OutputFormat::Table => Ok(self.format_as_table(std::slice::from_ref(item))),
            OutputFormat::Json => Ok(serde_json::to_string_pretty(item)?),
            OutputFormat::Yaml => format_as_yaml(item),
            OutputFormat::Text => Ok(self.format_as_text(item)),
        }
    }

    fn format_as_table<T: Tabled>(&self, data: &[T]) -> String {
        let mut table = Table::new(data);

        table
            .with(Style::rounded())
            .with(Modify::new(Rows::first()).with(Alignment::center()))
            .with(Padding::new(1, 1, 0, 0));

        if !self.no_color {
            table.with(Modify::new(Rows::first()).with(Color::FG_BLUE));
        }

        // Auto-adjust width to terminal
        if let Ok((width, _)) = size() {
            table.with(Width::wrap(width as usize));
        }

        table.to_string()
    }

    fn format_as_text<T: Tabled>(&self, item: &T) -> String {
        let headers = T::headers();
        let fields = item.fields();
        let pairs: Vec<(&str, &str)> = headers
            .iter()
            .zip(fields.iter())
            .map(|(h, f)| (h.as_ref(), f.as_ref()))
            .collect();

        DisplayUtils::new(true).format_key_value_pairs(&pairs)
    }
}

fn format_as_yaml<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    serde_yaml::to_string(value)
        .map(|yaml| yaml.trim_end().to_string())
        .map_err(|e| TemplateError::serialization(e.to_string()))
}

/// Display utilities for status messages
pub struct DisplayUtils {
    theme: ColorTheme,
    no_color: bool,
}

impl DisplayUtils {
    pub fn new(no_color: bool) -> Self {
        Self {
            theme: ColorTheme::default(),
            no_color,
        }
    }

    pub fn print_success(&self, message: &str) {
        if self.no_color {
            println!("✓ {message}");
        } else {
            println!("✓ {}", message.with(self.theme.success));
        }
    }

    pub fn print_warning(&self, message: &str) {
        if self.no_color {
            eprintln!("⚠ {message}");
        } else {
            eprintln!("⚠ {}", message.with(self.theme.warning));
        }
    }

    /// Format key-value pairs with aligned keys
    pub fn format_key_value_pairs(&self, pairs: &[(&str, &str)]) -> String {
        let max_key_length = pairs.iter().map(|(key, _)| key.len()).max().unwrap_or(0);

        pairs
            .iter()
            .map(|(key, value)| {
                let formatted_key = format!("{:width$}", format!("{key}:"), width = max_key_length + 1);
                let formatted_key = if self.no_color {
                    formatted_key
                } else {
                    formatted_key.with(self.theme.accent).bold().to_string()
                };
                format!("{formatted_key} {value}")
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}
