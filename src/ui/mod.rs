//! User interface module - decisions (prompts) and formatting.
//!
//! Separates concerns:
//! - `formatter` - Output formatting functions
//! - This module - The [`DecisionProvider`] seam and its implementations

use std::cell::RefCell;
use std::collections::VecDeque;
use std::io::{self, Write};

use crate::error::Result;

pub mod formatter;

// Re-export formatter functions for convenience
pub use formatter::{
    display_boundary_warning, display_error, display_header, display_status, display_success,
    display_summary,
};

/// Source of yes/no answers for gates.
///
/// The interactive binary asks on the terminal; tests and unattended runs
/// supply answers up front.
pub trait DecisionProvider {
    /// Answer a yes/no question. `default` is the answer for an empty reply.
    fn confirm(&self, prompt: &str, default: bool) -> Result<bool>;
}

/// Parses a reply to a yes/no prompt.
///
/// Empty input selects the default. Returns `None` for anything that is not
/// a recognisable yes or no.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(parse_answer("", true), Some(true));
/// assert_eq!(parse_answer("No", true), Some(false));
/// assert_eq!(parse_answer("maybe", true), None);
/// ```
pub fn parse_answer(input: &str, default: bool) -> Option<bool> {
    match input.trim().to_lowercase().as_str() {
        "" => Some(default),
        "y" | "yes" => Some(true),
        "n" | "no" => Some(false),
        _ => None,
    }
}

/// Answer hint appended to a prompt, capitalising the default.
pub fn answer_hint(default: bool) -> &'static str {
    if default {
        "(Y/n)"
    } else {
        "(y/N)"
    }
}

/// Asks on stdin/stdout.
///
/// Unrecognised replies repeat the question. End of input selects the
/// default so piped runs do not spin.
#[derive(Debug, Default)]
pub struct InteractivePrompt;

impl DecisionProvider for InteractivePrompt {
    fn confirm(&self, prompt: &str, default: bool) -> Result<bool> {
        loop {
            print!("\n{} {}: ", prompt, answer_hint(default));
            io::stdout().flush()?;

            let mut input = String::new();
            if io::stdin().read_line(&mut input)? == 0 {
                println!();
                return Ok(default);
            }

            match parse_answer(&input, default) {
                Some(answer) => return Ok(answer),
                None => println!("Please answer 'y' or 'n'."),
            }
        }
    }
}

/// Accepts every default without asking.
#[derive(Debug, Default)]
pub struct AssumeDefaults;

impl DecisionProvider for AssumeDefaults {
    fn confirm(&self, prompt: &str, default: bool) -> Result<bool> {
        tracing::info!(prompt, answer = default, "assuming default answer");
        Ok(default)
    }
}

/// Canned answers, consumed in order.
///
/// Once the script runs out every further question gets its default. The
/// prompts that were asked are kept for inspection.
#[derive(Debug, Default)]
pub struct ScriptedDecisions {
    answers: RefCell<VecDeque<bool>>,
    asked: RefCell<Vec<String>>,
}

impl ScriptedDecisions {
    /// Create a script from answers in the order the gates will be asked
    pub fn new(answers: impl IntoIterator<Item = bool>) -> Self {
        ScriptedDecisions {
            answers: RefCell::new(answers.into_iter().collect()),
            asked: RefCell::new(Vec::new()),
        }
    }

    /// Prompts asked so far, in order
    pub fn asked(&self) -> Vec<String> {
        self.asked.borrow().clone()
    }
}

impl DecisionProvider for ScriptedDecisions {
    fn confirm(&self, prompt: &str, default: bool) -> Result<bool> {
        self.asked.borrow_mut().push(prompt.to_string());
        Ok(self.answers.borrow_mut().pop_front().unwrap_or(default))
    }
}
