use std::io::{self, BufRead, Write};

use tracing::warn;

use crate::context::{AdminEvent, AlertLevel, Operator, Route};

/// Operator on a terminal: alerts go to stderr, prompts read `y`/`N` from stdin.
#[derive(Debug, Default)]
pub struct TerminalOperator {
    assume_yes: bool,
}

impl TerminalOperator {
    pub fn new(assume_yes: bool) -> Self {
        Self { assume_yes }
    }
}

impl Operator for TerminalOperator {
    fn confirm(&self, prompt: &str) -> bool {
        if self.assume_yes {
            eprintln!("{} [y/N] y", prompt);
            return true;
        }
        eprint!("{} [y/N] ", prompt);
        if let Err(e) = io::stderr().flush() {
            warn!(error = %e, "Could not flush prompt");
        }
        let mut answer = String::new();
        match io::stdin().lock().read_line(&mut answer) {
            Ok(_) => is_yes(&answer),
            Err(e) => {
                warn!(error = %e, "Could not read answer; treating it as no");
                false
            }
        }
    }

    fn emit(&self, event: AdminEvent) {
        match event {
            AdminEvent::Alert { level: AlertLevel::Info, message } => eprintln!("{}", message),
            AdminEvent::Alert { level: AlertLevel::Error, message } => eprintln!("error: {}", message),
            AdminEvent::Navigate(Route::OrderList) => eprintln!("(back to the order list)"),
            AdminEvent::StatisticsChanged => {}
        }
    }
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}
