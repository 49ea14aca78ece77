use crate::Prompt;
use dialoguer::{Input, Password};

/// Prompt backed by the controlling terminal. Any read error counts as end of input.
#[derive(Debug, Default)]
pub struct TerminalPrompt;

impl Prompt for TerminalPrompt {
    fn line(&mut self, prompt: &str) -> Option<String> {
        Input::<String>::new()
            .with_prompt(prompt.trim_end().trim_end_matches(':'))
            .allow_empty(true)
            .interact_text()
            .ok()
    }

    fn secret(&mut self, prompt: &str) -> Option<String> {
        Password::new()
            .with_prompt(prompt.trim_end().trim_end_matches(':'))
            .allow_empty_password(true)
            .interact()
            .ok()
    }

    fn say(&mut self, message: &str) {
        println!("{}", message);
    }
}
