use std::{
    io::{self, Stdout, Write},
    sync::Once,
    time::Duration,
};

use blockedit::{DocumentEditor, KeyOutcome, KeySession};
use color_eyre::eyre::{Result, WrapErr};
use crossterm::{
    cursor::{Hide, MoveTo, Show},
    event::{self, Event, KeyEventKind},
    execute, queue,
    style::Print,
    terminal::{
        Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode,
        enable_raw_mode,
    },
};

const TICK: Duration = Duration::from_millis(250);
const HELP_LINE: &str = "space grab/drop • ↑↓ focus • alt+↑↓ carry • →/← expand/collapse • ctrl+s save • ctrl+q quit";

static PANIC_HOOK: Once = Once::new();

struct TerminalGuard {
    stdout: Stdout,
}

impl TerminalGuard {
    fn new() -> Result<Self> {
        enable_raw_mode().wrap_err("failed to enable raw mode")?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, Hide).wrap_err("failed to enter alternate screen")?;
        install_panic_hook();
        Ok(Self { stdout })
    }

    fn draw(&mut self, lines: &[String], status: &str) -> io::Result<()> {
        queue!(self.stdout, Clear(ClearType::All))?;
        let mut row = 0u16;
        for line in lines.iter().map(String::as_str).chain(["", status, HELP_LINE]) {
            queue!(self.stdout, MoveTo(0, row), Print(line))?;
            row = row.saturating_add(1);
        }
        self.stdout.flush()
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        restore_terminal();
    }
}

fn install_panic_hook() {
    PANIC_HOOK.call_once(|| {
        let previous = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |panic_info| {
            restore_terminal();
            previous(panic_info);
        }));
    });
}

fn restore_terminal() {
    let _ = disable_raw_mode();
    let mut stdout = io::stdout();
    let _ = execute!(stdout, LeaveAlternateScreen, Show);
}

/// Runs the keyboard editor on one list until the user quits. A second quit
/// is needed while there are unsaved changes.
pub fn run(editor: &mut DocumentEditor, mut session: KeySession) -> Result<()> {
    let mut terminal = TerminalGuard::new()?;
    let mut status = String::from("ready");
    let mut exit_armed = false;
    loop {
        let lines = session.render(editor)?;
        terminal
            .draw(&lines, &status)
            .wrap_err("failed to draw the list")?;
        if !event::poll(TICK)? {
            continue;
        }
        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }

        match session.handle_key(editor, &key)? {
            KeyOutcome::Ignored | KeyOutcome::Redraw => {}
            KeyOutcome::Changed => {
                exit_armed = false;
                status = String::from("modified");
            }
            KeyOutcome::Save => match editor.save() {
                Ok(()) => {
                    tracing::info!(path = %session.path(), "saved from the keyboard editor");
                    status = String::from("saved");
                }
                Err(err) => status = format!("save failed: {err:#}"),
            },
            KeyOutcome::Quit if editor.is_dirty() && !exit_armed => {
                exit_armed = true;
                status = String::from("unsaved changes; press quit again to discard them");
            }
            KeyOutcome::Quit => return Ok(()),
        }
    }
}
