// src/system/prompt.rs

use dialoguer::{Confirm, Input, Select, theme::ColorfulTheme};

/// The interactive boundary: yes/no questions, free text and a choice list.
pub trait Prompter {
    /// Yes/no question.
    fn confirm(&self, prompt: &str, default: bool) -> dialoguer::Result<bool>;

    /// Free-text question. An empty answer returns `default` (or an empty
    /// string when there is none).
    fn input(&self, prompt: &str, default: Option<&str>) -> dialoguer::Result<String>;

    /// Returns the index of the chosen item.
    fn select(&self, prompt: &str, items: &[&str], default: usize) -> dialoguer::Result<usize>;
}

/// Terminal prompts rendered with `dialoguer`.
#[derive(Debug, Default, Clone, Copy)]
pub struct DialoguerPrompter;

impl Prompter for DialoguerPrompter {
    fn confirm(&self, prompt: &str, default: bool) -> dialoguer::Result<bool> {
        Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt(prompt)
            .default(default)
            .interact()
    }

    fn input(&self, prompt: &str, default: Option<&str>) -> dialoguer::Result<String> {
        let theme = ColorfulTheme::default();
        let mut input = Input::<String>::with_theme(&theme)
            .with_prompt(prompt)
            .allow_empty(true);
        if let Some(default) = default {
            input = input.default(default.to_string());
        }
        input.interact_text()
    }

    fn select(&self, prompt: &str, items: &[&str], default: usize) -> dialoguer::Result<usize> {
        Select::with_theme(&ColorfulTheme::default())
            .with_prompt(prompt)
            .items(items)
            .default(default)
            .interact()
    }
}

/// Answers every question with its default without asking (`--default`).
#[derive(Debug, Default, Clone, Copy)]
pub struct AcceptDefaults;

impl Prompter for AcceptDefaults {
    fn confirm(&self, prompt: &str, default: bool) -> dialoguer::Result<bool> {
        log::debug!("{} -> {}", prompt, default);
        Ok(default)
    }

    fn input(&self, prompt: &str, default: Option<&str>) -> dialoguer::Result<String> {
        log::debug!("{} -> {:?}", prompt, default);
        Ok(default.unwrap_or_default().to_string())
    }

    fn select(&self, prompt: &str, _items: &[&str], default: usize) -> dialoguer::Result<usize> {
        log::debug!("{} -> #{}", prompt, default);
        Ok(default)
    }
}
