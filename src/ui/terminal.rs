//! @acp:module "Terminal Interaction"
//! @acp:summary "Dialoguer prompts and the busy spinner"
//! @acp:domain cli
//! @acp:layer output
//!
//! Terminal implementation of [`Interaction`]

use std::time::Duration;

use console::style;
use dialoguer::{theme::ColorfulTheme, Confirm, Input, MultiSelect, Select};
use indicatif::{ProgressBar, ProgressStyle};

use super::{Interaction, Notice};

pub struct TerminalInteraction {
    theme: ColorfulTheme,
    spinner: Option<ProgressBar>,
    assume_yes: bool,
}

impl TerminalInteraction {
    /// With `assume_yes`, confirmations answer yes and prompts take their
    /// default without asking.
    pub fn new(assume_yes: bool) -> Self {
        Self {
            theme: ColorfulTheme::default(),
            spinner: None,
            assume_yes,
        }
    }

    pub fn is_interactive(&self) -> bool {
        !self.assume_yes
    }

    /// Pick one of `items`; `None` when running non-interactively
    pub fn choose(&mut self, message: &str, items: &[String]) -> crate::Result<Option<usize>> {
        if self.assume_yes || items.is_empty() {
            return Ok(None);
        }
        self.hide_overlay();
        let index = Select::with_theme(&self.theme)
            .with_prompt(message)
            .items(items)
            .default(0)
            .interact()?;
        Ok(Some(index))
    }

    /// Pick any number of `items`
    pub fn choose_many(&mut self, message: &str, items: &[String]) -> crate::Result<Vec<usize>> {
        if self.assume_yes || items.is_empty() {
            return Ok(Vec::new());
        }
        self.hide_overlay();
        Ok(MultiSelect::with_theme(&self.theme)
            .with_prompt(message)
            .items(items)
            .interact()?)
    }

    fn print(&self, notice: Notice, message: &str) {
        let line = match notice {
            Notice::Info => format!("{} {}", style("→").cyan(), message),
            Notice::Success => format!("{} {}", style("✓").green(), message),
            Notice::Warning => format!("{} {}", style("!").yellow(), message),
            Notice::Error => format!("{} {}", style("✗").red(), message),
        };
        if notice == Notice::Error {
            eprintln!("{}", line);
        } else {
            println!("{}", line);
        }
    }
}

impl Interaction for TerminalInteraction {
    fn notify(&mut self, notice: Notice, message: &str) {
        match &self.spinner {
            Some(spinner) => spinner.suspend(|| self.print(notice, message)),
            None => self.print(notice, message),
        }
    }

    fn confirm(&mut self, message: &str) -> crate::Result<bool> {
        if self.assume_yes {
            self.print(Notice::Info, &format!("{} yes", message));
            return Ok(true);
        }
        self.hide_overlay();
        Ok(Confirm::with_theme(&self.theme)
            .with_prompt(message)
            .default(false)
            .interact()?)
    }

    fn prompt(&mut self, message: &str, default: Option<&str>) -> crate::Result<Option<String>> {
        if self.assume_yes {
            return Ok(default.map(str::to_string));
        }
        self.hide_overlay();

        let mut input = Input::<String>::with_theme(&self.theme)
            .with_prompt(message)
            .allow_empty(true);
        if let Some(default) = default {
            input = input.default(default.to_string());
        }
        let value = input.interact_text()?;
        let value = value.trim();

        Ok((!value.is_empty()).then(|| value.to_string()))
    }

    fn show_overlay(&mut self, message: &str) {
        if let Some(spinner) = &self.spinner {
            spinner.set_message(message.to_string());
            return;
        }

        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        spinner.set_message(message.to_string());
        spinner.enable_steady_tick(Duration::from_millis(100));
        self.spinner = Some(spinner);
    }

    fn hide_overlay(&mut self) {
        if let Some(spinner) = self.spinner.take() {
            spinner.finish_and_clear();
        }
    }
}

impl Drop for TerminalInteraction {
    fn drop(&mut self) {
        self.hide_overlay();
    }
}
