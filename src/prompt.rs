//! Line-based interactive prompts.
//!
//! Prompts read answers from an injected [`BufRead`] and write questions to an
//! injected [`Write`], so interactive flows can be driven from tests without
//! a terminal.

use std::io::{BufRead, Write};

use anyhow::{bail, Context, Result};

/// A labelled value offered by [`Prompter::select`].
#[derive(Debug, Clone)]
pub struct Choice<T> {
    /// Text shown to the user.
    pub label: String,
    /// Value returned when chosen.
    pub value: T,
}

impl<T> Choice<T> {
    /// Creates a choice.
    pub fn new(label: impl Into<String>, value: T) -> Self {
        Self {
            label: label.into(),
            value,
        }
    }
}

/// A line of a [`Prompter::multi_select`] list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entry<'a> {
    /// Heading printed between items; not selectable.
    Separator(&'a str),
    /// Selectable item.
    Item(&'a str),
}

/// Asks questions on a reader/writer pair.
pub struct Prompter<'a> {
    reader: &'a mut dyn BufRead,
    writer: &'a mut dyn Write,
}

impl<'a> Prompter<'a> {
    /// Creates a prompter over the given input and output.
    pub fn new(reader: &'a mut dyn BufRead, writer: &'a mut dyn Write) -> Self {
        Self { reader, writer }
    }

    /// Returns the output stream, for printing between questions.
    pub fn writer(&mut self) -> &mut dyn Write {
        &mut *self.writer
    }

    fn ask(&mut self, prompt: &str) -> Result<String> {
        write!(self.writer, "{prompt}")?;
        self.writer.flush()?;

        let mut input = String::new();
        let bytes = self
            .reader
            .read_line(&mut input)
            .context("Failed to read user input")?;
        if bytes == 0 {
            bail!("Input closed before the question was answered");
        }
        Ok(input.trim().to_string())
    }

    /// Asks for one of `choices`; an empty answer picks `choices[default]`.
    ///
    /// The answer may be the choice number or its label (case-insensitive).
    pub fn select<T: Clone>(
        &mut self,
        message: &str,
        choices: &[Choice<T>],
        default: usize,
    ) -> Result<T> {
        if choices.is_empty() {
            bail!("No choices offered for '{message}'");
        }
        let default = default.min(choices.len() - 1);

        writeln!(self.writer, "? {message}")?;
        for (i, choice) in choices.iter().enumerate() {
            if i == default {
                writeln!(self.writer, "  {}) {} (default)", i + 1, choice.label)?;
            } else {
                writeln!(self.writer, "  {}) {}", i + 1, choice.label)?;
            }
        }

        loop {
            let answer = self.ask(&format!("Choose [1-{}]: ", choices.len()))?;
            if answer.is_empty() {
                return Ok(choices[default].value.clone());
            }
            if let Some(choice) = pick_choice(&answer, choices) {
                return Ok(choice.value.clone());
            }
            writeln!(
                self.writer,
                "Please enter a number between 1 and {}.",
                choices.len()
            )?;
        }
    }

    /// Asks for a non-empty line of text.
    pub fn input(&mut self, message: &str) -> Result<String> {
        loop {
            let answer = self.ask(&format!("? {message}: "))?;
            if !answer.is_empty() {
                return Ok(answer);
            }
            writeln!(self.writer, "A value is required.")?;
        }
    }

    /// Asks a yes/no question; an empty answer returns `default`.
    pub fn confirm(&mut self, message: &str, default: bool) -> Result<bool> {
        let hint = if default { "Y/n" } else { "y/N" };
        loop {
            let answer = self.ask(&format!("? {message} [{hint}] "))?;
            match answer.to_lowercase().as_str() {
                "" => return Ok(default),
                "y" | "yes" => return Ok(true),
                "n" | "no" => return Ok(false),
                _ => writeln!(self.writer, "Please answer 'y' or 'n'.")?,
            }
        }
    }

    /// Asks which items of a list to pick and returns their item indices.
    ///
    /// Items are numbered from 1, skipping separators. Answers are numbers
    /// and ranges (`1,3-5`), `all`, or empty for none.
    pub fn multi_select(&mut self, message: &str, entries: &[Entry<'_>]) -> Result<Vec<usize>> {
        writeln!(self.writer, "? {message}")?;
        let mut count = 0;
        for entry in entries {
            match entry {
                Entry::Separator(text) => writeln!(self.writer, "  ── {text}")?,
                Entry::Item(text) => {
                    count += 1;
                    writeln!(self.writer, "  {count:>3}) {text}")?;
                }
            }
        }

        loop {
            let answer = self.ask("Select (e.g. 1,3-5, all; empty for none): ")?;
            match parse_selection(&answer, count) {
                Ok(selected) => return Ok(selected),
                Err(message) => writeln!(self.writer, "{message}")?,
            }
        }
    }
}

fn pick_choice<'c, T>(answer: &str, choices: &'c [Choice<T>]) -> Option<&'c Choice<T>> {
    if let Ok(n) = answer.parse::<usize>() {
        return n.checked_sub(1).and_then(|i| choices.get(i));
    }
    choices
        .iter()
        .find(|c| c.label.eq_ignore_ascii_case(answer))
}

/// Parses a selection like `1,3-5` into sorted, deduplicated 0-based indices.
pub fn parse_selection(answer: &str, count: usize) -> Result<Vec<usize>, String> {
    let answer = answer.trim();
    if answer.is_empty() || answer.eq_ignore_ascii_case("none") {
        return Ok(Vec::new());
    }
    if answer.eq_ignore_ascii_case("all") || answer == "*" {
        return Ok((0..count).collect());
    }

    let parse_one = |s: &str| -> Result<usize, String> {
        let n = s
            .trim()
            .parse::<usize>()
            .map_err(|_| format!("'{}' is not a number.", s.trim()))?;
        if n == 0 || n > count {
            return Err(format!("{n} is out of range (1-{count})."));
        }
        Ok(n - 1)
    };

    let mut selected = Vec::new();
    for part in answer.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        if let Some((start, end)) = part.split_once('-') {
            let (start, end) = (parse_one(start)?, parse_one(end)?);
            if start > end {
                return Err(format!("Range '{part}' runs backwards."));
            }
            selected.extend(start..=end);
        } else {
            selected.push(parse_one(part)?);
        }
    }

    selected.sort_unstable();
    selected.dedup();
    Ok(selected)
}
