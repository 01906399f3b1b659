// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Run with `cargo run --example readline_sync_demo -- --help`.

use clap::Parser;
use miette::IntoDiagnostic;
use r3bl_readline_sync::{DisplayPreference, Readline, ReadlineConfig, SharedOutput,
                         TracingConfig, WriterConfig, rls_println};
use std::{io::Write, ops::ControlFlow, str::FromStr, thread, time::Duration};
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter, EnumString};
use tracing_core::LevelFilter;

/// Interactive demo of the synchronous line editor.
#[derive(Debug, Parser)]
#[command(name = "readline_sync_demo", version)]
struct CLIArg {
    /// Prompt to show in front of the line
    #[arg(long, short = 'p', default_value = "> ")]
    prompt: String,

    /// Erase each line from the screen once it is submitted
    #[arg(long, short = 'u')]
    unique_edit_line: bool,

    /// Also write debug logs to this file
    #[arg(long, short = 'l', value_name = "FILE")]
    log_file: Option<String>,
}

#[derive(Debug, PartialEq, EnumString, EnumIter, Display)]
enum Command {
    #[strum(ascii_case_insensitive)]
    Password,

    #[strum(ascii_case_insensitive)]
    Ticker,

    #[strum(ascii_case_insensitive)]
    Title,

    #[strum(ascii_case_insensitive)]
    Info,

    #[strum(ascii_case_insensitive)]
    Exit,
}

fn get_info_message() -> String {
    let commands = Command::iter()
        .map(|it| it.to_string())
        .collect::<Vec<String>>();
    format!(
        "Available commands: {commands:?}\n\
         Try Ctrl+A, Ctrl+E, Meta+B, Meta+F, Ctrl+W, Ctrl+K, Ctrl+T, Ctrl+L, Ctrl+C, Ctrl+D"
    )
}

fn main() -> miette::Result<()> {
    let cli_arg = CLIArg::parse();

    let config = ReadlineConfig {
        unique_edit_line: cli_arg.unique_edit_line,
        ..ReadlineConfig::new(cli_arg.prompt)
    };
    let mut readline = Readline::try_new_with_config(config)?;

    // Logs go above the line being edited, and to the file if one was given.
    let display = DisplayPreference::SharedOutput(readline.stderr());
    r3bl_readline_sync::init(TracingConfig {
        writer_config: match cli_arg.log_file {
            Some(file) => WriterConfig::DisplayAndFile(display, file),
            None => WriterConfig::Display(display),
        },
        level_filter: LevelFilter::INFO,
    })?;

    rls_println!(readline, "{}", get_info_message());

    loop {
        let result = readline.read_line()?;
        if result.can_continue() {
            continue;
        }
        if result.can_break() {
            break;
        }
        if let ControlFlow::Break(()) = process(&result.line, &mut readline)? {
            break;
        }
    }

    rls_println!(readline, "Goodbye");
    readline.close()?;
    Ok(())
}

fn process(line: &str, readline: &mut Readline) -> miette::Result<ControlFlow<()>> {
    let (head, rest) = line.trim().split_once(' ').unwrap_or((line.trim(), ""));
    let Ok(command) = Command::from_str(head) else {
        rls_println!(readline, "Unknown command: {line:?}");
        return Ok(ControlFlow::Continue(()));
    };

    match command {
        Command::Password => {
            let result = readline.read_password("Password: ")?;
            tracing::info!(len = result.line.len(), signal = ?result.signal, "password read");
        }
        Command::Ticker => spawn_ticker(readline.stdout()),
        Command::Title => readline.set_title(rest).into_diagnostic()?,
        Command::Info => rls_println!(readline, "{}", get_info_message()),
        Command::Exit => return Ok(ControlFlow::Break(())),
    }

    Ok(ControlFlow::Continue(()))
}

/// Prints from another thread while the user keeps typing.
fn spawn_ticker(mut shared_output: SharedOutput) {
    thread::spawn(move || {
        for count in 1..=5 {
            thread::sleep(Duration::from_secs(1));
            if writeln!(shared_output, "tick {count}").is_err() {
                break;
            }
        }
        tracing::info!("ticker done");
    });
}
