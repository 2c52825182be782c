// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Terminal color helpers shared by [`crate::table`] and the command
//! renderers.

use std::io::IsTerminal;

const RESET: &str = "\x1b[0m";

/// Priority: `NO_COLOR=1` disables, `COLOR=1` forces, otherwise a TTY check.
pub fn should_colorize() -> bool {
    if std::env::var("NO_COLOR").is_ok_and(|v| v == "1") {
        return false;
    }
    if std::env::var("COLOR").is_ok_and(|v| v == "1") {
        return true;
    }
    std::io::stdout().is_terminal()
}

/// Steel-blue header text, for table column names.
pub fn header(text: &str) -> String {
    if should_colorize() {
        format!("\x1b[38;5;74m{text}{RESET}")
    } else {
        text.to_string()
    }
}

/// Darker grey, for secondary/placeholder columns.
pub fn muted(text: &str) -> String {
    if should_colorize() {
        format!("\x1b[38;5;240m{text}{RESET}")
    } else {
        text.to_string()
    }
}

/// Colorize a task/agent status word: green for healthy/active, yellow for
/// waiting/transitional, red for failed/dead. Unknown words pass through.
/// First-word matching so "failed: reason" still colors.
pub fn status(text: &str) -> String {
    if !should_colorize() {
        return text.to_string();
    }
    let lower = text.trim_start().to_lowercase();
    let first_word = lower.split(|c: char| !c.is_alphabetic()).next().unwrap_or("");
    let code = match first_word {
        "completed" | "running" | "idle" | "online" => "\x1b[32m",
        "pending" | "assigned" | "stopping" => "\x1b[33m",
        "failed" | "cancelled" | "dead" | "stopped" | "error" => "\x1b[31m",
        _ => return text.to_string(),
    };
    format!("{code}{text}{RESET}")
}

#[cfg(test)]
#[path = "color_tests.rs"]
mod tests;
