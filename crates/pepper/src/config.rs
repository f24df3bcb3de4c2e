//! CLI configuration: a thin layer over `pepper_config`.
//!
//! Turns parsed flags into resolver options and the command invocation,
//! and supplies the terminal-backed credential prompt.

use std::io::{self, Write};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal;
use dialoguer::Input;
use secrecy::SecretString;

use pepper_api::{ExprForm, Invocation, TargetExpr};
use pepper_config::{CredentialPrompt, ResolveOptions, default_config_path};

use crate::cli::Cli;

// ── Prompt ──────────────────────────────────────────────────────────

/// Prompts on the controlling terminal: dialoguer for the username, a
/// raw-mode reader for the non-echoing password.
///
/// Ctrl-C at the password prompt comes back as `ErrorKind::Interrupted`
/// after the terminal has been restored.
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalPrompt;

impl CredentialPrompt for TerminalPrompt {
    fn prompt_visible(&self, label: &str) -> io::Result<String> {
        Input::<String>::new()
            .with_prompt(label)
            .interact_text()
            .map_err(|dialoguer::Error::IO(e)| e)
    }

    fn prompt_masked(&self, label: &str) -> io::Result<SecretString> {
        let mut stderr = io::stderr();
        write!(stderr, "{label}: ")?;
        stderr.flush()?;

        let read = {
            let _raw = RawMode::enter()?;
            read_masked()
        };
        writeln!(stderr)?;
        read.map(SecretString::from)
    }
}

/// Raw mode for the lifetime of the guard; echo comes back on drop.
struct RawMode;

impl RawMode {
    fn enter() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawMode {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

fn read_masked() -> io::Result<String> {
    let mut secret = String::new();
    loop {
        let Event::Key(key) = event::read()? else {
            continue;
        };
        match apply_key(&mut secret, key) {
            KeyOutcome::Continue => {}
            KeyOutcome::Done => return Ok(secret),
            KeyOutcome::Interrupted => return Err(io::ErrorKind::Interrupted.into()),
            KeyOutcome::Eof => return Err(io::ErrorKind::UnexpectedEof.into()),
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
enum KeyOutcome {
    Continue,
    Done,
    Interrupted,
    Eof,
}

/// Fold one key press into the secret being typed.
fn apply_key(secret: &mut String, key: KeyEvent) -> KeyOutcome {
    if key.kind == KeyEventKind::Release {
        return KeyOutcome::Continue;
    }
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Enter => KeyOutcome::Done,
        KeyCode::Char('c') if ctrl => KeyOutcome::Interrupted,
        KeyCode::Char('d') if ctrl && secret.is_empty() => KeyOutcome::Eof,
        KeyCode::Char('u') if ctrl => {
            secret.clear();
            KeyOutcome::Continue
        }
        KeyCode::Backspace => {
            secret.pop();
            KeyOutcome::Continue
        }
        KeyCode::Char(c) if !ctrl => {
            secret.push(c);
            KeyOutcome::Continue
        }
        _ => KeyOutcome::Continue,
    }
}

// ── Flag translation ────────────────────────────────────────────────

/// Resolver inputs: config path (flag > PEPPERRC > ~/.pepperrc) and forced eauth.
pub fn resolve_options(cli: &Cli) -> ResolveOptions {
    ResolveOptions {
        config_path: cli.config.clone().unwrap_or_else(default_config_path),
        eauth: cli.eauth.clone(),
    }
}

/// The targeting flag left standing after clap's overrides; glob if none.
pub fn expr_form(cli: &Cli) -> ExprForm {
    if cli.pcre {
        ExprForm::Pcre
    } else if cli.list {
        ExprForm::List
    } else if cli.grain {
        ExprForm::Grain
    } else if cli.grain_pcre {
        ExprForm::GrainPcre
    } else {
        ExprForm::Glob
    }
}

/// The command to run, built from the positionals and `--return`.
pub fn invocation(cli: &Cli) -> Invocation {
    Invocation::new(
        TargetExpr::new(cli.target.clone(), expr_form(cli)),
        cli.function.clone(),
        cli.args.clone(),
    )
    .with_returner(cli.returner.clone())
}
