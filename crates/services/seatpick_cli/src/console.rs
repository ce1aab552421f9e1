//! Terminal implementations of the user-facing collaborators.

use std::io::{self, BufRead, Write};

use seatpick_common::services::{BoxFutureValue, ConfirmationGate, Notice, NoticeKind, Notifier};

/// Asks on stdin; anything but `y`/`yes` is a no.
pub struct TerminalGate;

impl ConfirmationGate for TerminalGate {
    fn confirm<'a>(&'a self, prompt: &'a str) -> BoxFutureValue<'a, bool> {
        let prompt = prompt.to_string();
        Box::pin(async move {
            tokio::task::spawn_blocking(move || ask(&prompt))
                .await
                .unwrap_or(false)
        })
    }
}

fn ask(prompt: &str) -> bool {
    let mut stdout = io::stdout();
    if write!(stdout, "{} [y/N] ", prompt).and_then(|_| stdout.flush()).is_err() {
        return false;
    }
    let mut answer = String::new();
    if io::stdin().lock().read_line(&mut answer).is_err() {
        return false;
    }
    is_yes(&answer)
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, notice: Notice) {
        match notice.kind {
            NoticeKind::Success => println!("✔ {}", notice.message),
            NoticeKind::Info => println!("{}", notice.message),
            NoticeKind::PaymentUnreconciled => eprintln!("! {}", notice.message),
            NoticeKind::Conflict | NoticeKind::Failure => eprintln!("✖ {}", notice.message),
        }
    }
}
