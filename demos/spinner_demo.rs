//! Spinner Demo: An animated label that only spins while it is shown.
//!
//! The label is attached, detached and re-attached a few times. While it is
//! detached the spinner disappears and its ticker thread is gone; attaching
//! again resumes it without calling `start_animation` a second time.
//!
//! Run with `RUST_LOG=animated_label=debug` to watch the state changes on
//! stderr.

use animated_label::{AnimationController, TerminalHost};
use crossterm::{
    cursor::{self, MoveTo},
    execute,
    style::Print,
    terminal::{self, ClearType},
};
use std::io::{self, Write};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let mut stdout = io::stdout();
    execute!(
        stdout,
        terminal::Clear(ClearType::All),
        cursor::Hide,
        MoveTo(0, 0),
        Print("Animated label demo"),
    )?;

    let host = Arc::new(TerminalHost::stdout(4, 2));
    let spinner = AnimationController::classic_spinner(&host)?;

    let bar = Arc::new(TerminalHost::stdout(4, 4));
    let progress = AnimationController::new(&bar, "[=    ]");
    progress
        .add_frame("[==   ]")
        .add_frame("[ ==  ]")
        .add_frame("[  == ]")
        .add_frame("[   ==]")
        .add_frame("[    =]");
    progress.start_animation(Duration::from_millis(80))?;

    for round in 1..=3 {
        status(&mut stdout, &format!("round {round}: attached"))?;
        host.attach();
        bar.attach();
        thread::sleep(Duration::from_secs(2));

        status(&mut stdout, &format!("round {round}: detached"))?;
        host.detach();
        bar.detach();
        thread::sleep(Duration::from_secs(1));
    }

    spinner.stop_animation();
    progress.stop_animation();

    execute!(stdout, MoveTo(0, 7), cursor::Show, Print("done\n"))?;
    Ok(())
}

fn status(out: &mut impl Write, text: &str) -> io::Result<()> {
    execute!(
        out,
        MoveTo(0, 6),
        terminal::Clear(ClearType::CurrentLine),
        Print(text)
    )
}
