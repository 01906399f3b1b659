// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use pretty_assertions::assert_eq;
use r3bl_readline_sync::{Key, Readline, ReadlineConfig, ReadlineSignal,
                         test_fixtures::{ScriptStep, ScriptedTransport, StdoutMock,
                                         type_text}};
use std::sync::Arc;

fn session(
    steps: impl IntoIterator<Item = ScriptStep>,
) -> (Readline, Arc<ScriptedTransport>, StdoutMock) {
    let stdout_mock = StdoutMock::default();
    let config = ReadlineConfig {
        stdout: Some(stdout_mock.clone().into_safe_raw_terminal()),
        ..ReadlineConfig::new("> ")
    };
    let transport = Arc::new(ScriptedTransport::new(steps));
    let readline = Readline::try_new_with_transport(config, transport.clone()).unwrap();
    (readline, transport, stdout_mock)
}

#[test]
fn test_password_is_masked_and_config_restored() {
    let (mut readline, _transport, stdout_mock) =
        session(type_text("secret").chain([ScriptStep::Key(Key::Enter)]));

    let result = readline.read_password("Password: ").unwrap();

    assert_eq!(result.line, b"secret".to_vec());
    assert_eq!(result.signal, None);

    let output = stdout_mock.get_copy_of_buffer_as_string();
    assert!(output.contains("Password: ******"));
    assert!(!output.contains("secret"));

    let config = readline.config();
    assert_eq!(config.prompt, "> ");
    assert!(!config.enable_mask);
}

#[test]
fn test_password_mask_glyph_per_code_point() {
    let (mut readline, _transport, stdout_mock) =
        session(type_text("pw").chain([ScriptStep::Key(Key::Enter)]));

    let result = readline.read_password("").unwrap();

    assert_eq!(result.line, b"pw".to_vec());
    assert!(stdout_mock.get_copy_of_buffer_as_string().ends_with("**\r\n"));
}

#[test]
fn test_password_interrupt_restores_config_without_banner() {
    let (mut readline, _transport, stdout_mock) =
        session(type_text("abc").chain([ScriptStep::Key(Key::Ctrl('c'))]));

    let result = readline.read_password("Password: ").unwrap();

    assert_eq!(result.line, b"abc".to_vec());
    assert_eq!(result.signal, Some(ReadlineSignal::Interrupt));
    assert!(!stdout_mock.get_copy_of_buffer_as_string().contains("^C"));
    assert_eq!(readline.config().prompt, "> ");
    assert_eq!(readline.config().interrupt_prompt, "^C");
}

#[test]
fn test_password_with_listener() {
    let (mut readline, _transport, _stdout_mock) =
        session(type_text("ab").chain([ScriptStep::Key(Key::Enter)]));

    let result = readline
        .read_password_with_listener("Password: ", |line, cursor, key| {
            (key == Key::Char('b')).then(|| r3bl_readline_sync::LineSnapshot {
                line: line.iter().rev().copied().collect(),
                cursor,
            })
        })
        .unwrap();

    assert_eq!(result.line, b"ba".to_vec());
    assert!(readline.config().listener.is_none());
}

#[test]
fn test_password_config_inherits_outputs() {
    let (readline, _transport, _stdout_mock) = session([]);

    let password_config = readline.password_config();

    assert!(password_config.enable_mask);
    assert_eq!(password_config.interrupt_prompt, "");
    assert_eq!(password_config.eof_prompt, "");
    assert!(Arc::ptr_eq(&password_config.stdout(), &readline.config().stdout()));
}

#[test]
fn test_replace_config_returns_previous() {
    let (mut readline, _transport, stdout_mock) =
        session(type_text("x").chain([ScriptStep::Key(Key::Enter)]));

    let current = readline.config();
    let same = readline.replace_config(current.clone()).unwrap();
    assert!(Arc::ptr_eq(&current, &same));

    let new_config = ReadlineConfig {
        prompt: "$ ".into(),
        ..(*current).clone()
    };
    let previous = readline.replace_config(new_config).unwrap();
    assert_eq!(previous.prompt, "> ");

    assert_eq!(readline.read_line().unwrap().line, "x");
    assert!(stdout_mock.get_copy_of_buffer_as_string().ends_with("$ x\r\n"));
}

#[test]
fn test_set_prompt_and_mask_between_reads() {
    let (mut readline, _transport, stdout_mock) =
        session(type_text("ab").chain([ScriptStep::Key(Key::Enter)]));

    readline.set_prompt(">> ").unwrap();
    readline.set_mask(Some('#')).unwrap();

    assert_eq!(readline.read_line_bytes().unwrap().line, b"ab".to_vec());
    assert!(stdout_mock.get_copy_of_buffer_as_string().ends_with(">> ##\r\n"));
}

#[test]
fn test_resize_between_reads_is_used_by_next_read() {
    let (mut readline, transport, stdout_mock) =
        session(type_text("abc").chain([ScriptStep::Key(Key::Enter)]));

    transport.resize(5);
    // Nothing is on screen, so nothing is drawn.
    assert_eq!(stdout_mock.get_copy_of_buffer_as_string(), "");

    assert_eq!(readline.read_line().unwrap().line, "abc");
    // "> abc" fills the first row of five exactly.
    assert!(stdout_mock.get_copy_of_buffer_as_string().contains("> abc \x08"));
}
