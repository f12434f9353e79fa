//! Assembly of URL input text from positional arguments and/or stdin.

use std::io::{self, IsTerminal, Read};

use anyhow::{Context, Result};

/// Joins positional URLs and piped stdin into one newline-separated text.
///
/// Stdin is only read when it is not a terminal. Returns `None` when neither
/// source supplied anything but whitespace.
pub(crate) fn read_url_input(urls: &[String]) -> Result<Option<String>> {
    let stdin_text = if io::stdin().is_terminal() {
        None
    } else {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .context("Failed to read URLs from stdin")?;
        Some(buffer)
    };
    Ok(combine_input(urls, stdin_text))
}

fn combine_input(urls: &[String], stdin_text: Option<String>) -> Option<String> {
    let mut segments = Vec::new();
    if !urls.is_empty() {
        segments.push(urls.join("\n"));
    }
    if let Some(text) = stdin_text
        && !text.trim().is_empty()
    {
        segments.push(text);
    }
    if segments.is_empty() {
        None
    } else {
        Some(segments.join("\n"))
    }
}
