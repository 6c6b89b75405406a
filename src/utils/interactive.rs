//! Interactive input utilities for user prompts and setup workflows
//!
//! Setup flows talk to the terminal through the [`Prompter`] trait so they
//! can be driven by a scripted prompter in tests.

use crate::error::{Result, TemplateError};
use dialoguer::{theme::ColorfulTheme, Confirm, Input, Select};

/// Validates raw text entered at a prompt
pub type InputValidator = fn(&str) -> std::result::Result<(), String>;

#[cfg_attr(test, mockall::automock)]
pub trait Prompter {
    /// Free-form text input; empty answers are allowed
    fn input(&self, message: &str, default: Option<String>) -> Result<String>;

    /// Text input re-prompted until `validator` accepts it
    fn input_validated(
        &self,
        message: &str,
        default: Option<String>,
        validator: InputValidator,
    ) -> Result<String>;

    /// Index of the selected option
    fn select(&self, message: &str, options: &[String], default: usize) -> Result<usize>;

    /// Yes/no question; an aborted prompt counts as "no"
    fn confirm(&self, message: &str, default: bool) -> Result<bool>;
}

/// Terminal prompts rendered with dialoguer
pub struct InteractivePrompt {
    theme: ColorfulTheme,
}

impl InteractivePrompt {
    pub fn new() -> Self {
        Self {
            theme: ColorfulTheme::default(),
        }
    }
}

impl Default for InteractivePrompt {
    fn default() -> Self {
        Self::new()
    }
}

impl Prompter for InteractivePrompt {
    fn input(&self, message: &str, default: Option<String>) -> Result<String> {
        let mut input = Input::<String>::with_theme(&self.theme)
            .with_prompt(message)
            .allow_empty(true);

        if let Some(default_value) = default.filter(|d| !d.is_empty()) {
            input = input.default(default_value);
        }

        input
            .interact_text()
            .map_err(|e| TemplateError::prompt(format!("Failed to get user input: {e}")))
    }

    fn input_validated(
        &self,
        message: &str,
        default: Option<String>,
        validator: InputValidator,
    ) -> Result<String> {
        let mut input = Input::<String>::with_theme(&self.theme)
            .with_prompt(message)
            .allow_empty(true)
            .validate_with(|input: &String| validator(input.as_str()));

        if let Some(default_value) = default.filter(|d| !d.is_empty()) {
            input = input.default(default_value);
        }

        input
            .interact_text()
            .map_err(|e| TemplateError::prompt(format!("Failed to get user input: {e}")))
    }

    fn select(&self, message: &str, options: &[String], default: usize) -> Result<usize> {
        Select::with_theme(&self.theme)
            .with_prompt(message)
            .items(options)
            .default(default)
            .interact()
            .map_err(|e| TemplateError::prompt(format!("Failed to get user selection: {e}")))
    }

    fn confirm(&self, message: &str, default: bool) -> Result<bool> {
        let answer = Confirm::with_theme(&self.theme)
            .with_prompt(message)
            .default(default)
            .interact_opt()
            .map_err(|e| TemplateError::prompt(format!("Failed to get user input: {e}")))?;

        Ok(answer.unwrap_or(false))
    }
}
