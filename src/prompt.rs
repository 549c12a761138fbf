use std::fmt;
use std::io::{BufRead, Write};
use std::str::FromStr;

use clap::ValueEnum;
use colored::*;

use crate::error::AppError;
use crate::region::Platform;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportMode {
    /// Per-champion report over the top mastery champions
    Mastery,
    /// Live game snapshot and win estimate
    Live,
}

impl FromStr for ReportMode {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "1" | "mastery" | "m" => Ok(ReportMode::Mastery),
            "2" | "live" | "l" => Ok(ReportMode::Live),
            other => Err(AppError::Validation(format!(
                "'{}' is not a report mode, pick 1 (mastery) or 2 (live)",
                other
            ))),
        }
    }
}

impl fmt::Display for ReportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportMode::Mastery => f.write_str("champion mastery"),
            ReportMode::Live => f.write_str("live data"),
        }
    }
}

pub fn parse_positive_count(input: &str) -> Result<usize, AppError> {
    match input.trim().parse::<i64>() {
        Ok(n) if n > 0 => Ok(n as usize),
        Ok(_) => Err(AppError::Validation(
            "the number of matches must be positive".into(),
        )),
        Err(_) => Err(AppError::Validation(format!(
            "'{}' is not a whole number",
            input.trim()
        ))),
    }
}

/// Line-based prompts that re-ask until the answer validates.
pub struct Prompter<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Prompter { input, output }
    }

    fn read_line(&mut self, label: &str) -> Result<String, AppError> {
        write!(self.output, "{} ", label.bold())?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(AppError::Validation("input closed".into()));
        }
        Ok(line.trim().to_string())
    }

    fn ask_parsed<T>(
        &mut self,
        label: &str,
        parse: impl Fn(&str) -> Result<T, AppError>,
    ) -> Result<T, AppError> {
        loop {
            let answer = self.read_line(label)?;
            match parse(&answer) {
                Ok(value) => return Ok(value),
                Err(e) => writeln!(self.output, "{} {}", "✗".red(), e)?,
            }
        }
    }

    pub fn ask_text(&mut self, label: &str) -> Result<String, AppError> {
        self.ask_parsed(label, |answer| {
            if answer.is_empty() {
                Err(AppError::Validation("a value is required".into()))
            } else {
                Ok(answer.to_string())
            }
        })
    }

    /// Empty answer keeps `default`.
    pub fn ask_platform(&mut self, default: Platform) -> Result<Platform, AppError> {
        let label = format!("Region [{}]:", default);
        self.ask_parsed(&label, |answer| {
            if answer.is_empty() {
                Ok(default)
            } else {
                answer.parse()
            }
        })
    }

    /// Uses the `--region` value when it parses, otherwise reports why and
    /// asks instead.
    pub fn platform_or_ask(
        &mut self,
        given: Option<&str>,
        default: Platform,
    ) -> Result<Platform, AppError> {
        match given.map(str::parse::<Platform>) {
            Some(Ok(platform)) => Ok(platform),
            Some(Err(e)) => {
                writeln!(self.output, "{} {}", "✗".red(), e)?;
                self.ask_platform(default)
            }
            None => self.ask_platform(default),
        }
    }

    /// A missing or zero `--matches` value falls back to the prompt.
    pub fn match_count_or_ask(&mut self, given: Option<usize>) -> Result<usize, AppError> {
        match given.filter(|n| *n > 0) {
            Some(n) => Ok(n),
            None => self.ask_match_count(),
        }
    }

    pub fn ask_match_count(&mut self) -> Result<usize, AppError> {
        self.ask_parsed("Number of matches to analyze:", parse_positive_count)
    }

    pub fn ask_mode(&mut self) -> Result<ReportMode, AppError> {
        writeln!(self.output, "  1) champion mastery")?;
        writeln!(self.output, "  2) live data")?;
        self.ask_parsed("Report mode:", |answer| answer.parse())
    }
}
