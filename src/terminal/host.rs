//! `TerminalHost`: Draws animation frames at a fixed terminal position.

use crate::host::{
    AttachmentListener, AttachmentSignal, AttachmentState, Host, SubscriptionId,
};
use crate::layout::Size;
use crossterm::{cursor::MoveTo, queue, style::Print};
use std::io::{self, Stdout, Write};
use std::sync::{Mutex, MutexGuard, PoisonError};
use unicode_width::UnicodeWidthStr;

/// Mutable host state.
struct TerminalState<W> {
    out: W,
    attachment: AttachmentState,
    /// Area reserved by the last bounds report.
    reserved: Size,
}

/// A host that paints frames into a terminal.
///
/// Each frame is written at the host's origin, padded with spaces to the
/// reported preferred bounds so a smaller frame fully covers a larger one.
/// Frames arriving while detached are not drawn, and detaching blanks the
/// reserved area.
pub struct TerminalHost<W: Write + Send> {
    state: Mutex<TerminalState<W>>,
    signal: AttachmentSignal,
    /// Column of the top-left cell.
    x: u16,
    /// Row of the top-left cell.
    y: u16,
}

impl TerminalHost<Stdout> {
    /// Create a detached host drawing to stdout at `(x, y)`.
    pub fn stdout(x: u16, y: u16) -> Self {
        Self::new(io::stdout(), x, y)
    }
}

impl<W: Write + Send> TerminalHost<W> {
    /// Create a detached host drawing to `out` at `(x, y)`.
    pub fn new(out: W, x: u16, y: u16) -> Self {
        Self {
            state: Mutex::new(TerminalState {
                out,
                attachment: AttachmentState::Detached,
                reserved: Size::ZERO,
            }),
            signal: AttachmentSignal::new(),
            x,
            y,
        }
    }

    fn lock(&self) -> MutexGuard<'_, TerminalState<W>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Show the label, notifying subscribers on change.
    pub fn attach(&self) {
        let changed = {
            let mut state = self.lock();
            let changed = !state.attachment.is_attached();
            state.attachment = AttachmentState::Attached;
            changed
        };
        if changed {
            self.signal.notify(AttachmentState::Attached);
        }
    }

    /// Hide the label, blanking its area and notifying subscribers on change.
    pub fn detach(&self) {
        let changed = {
            let mut state = self.lock();
            let changed = state.attachment.is_attached();
            state.attachment = AttachmentState::Detached;
            if changed && !state.reserved.is_empty() {
                let reserved = state.reserved;
                if let Err(e) = self.paint(&mut state.out, &[], reserved) {
                    tracing::warn!("failed to clear label: {e}");
                }
            }
            changed
        };
        if changed {
            self.signal.notify(AttachmentState::Detached);
        }
    }

    /// Run `f` with the underlying writer.
    pub fn with_writer<R>(&self, f: impl FnOnce(&mut W) -> R) -> R {
        f(&mut self.lock().out)
    }

    /// Consume the host and return the writer.
    pub fn into_inner(self) -> W {
        self.state
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
            .out
    }

    /// Write `lines` at the origin, padded to `area`.
    ///
    /// The whole frame is built first and written with one call, so hosts
    /// sharing a terminal cannot interleave their cursor moves.
    fn paint(&self, out: &mut W, lines: &[String], area: Size) -> io::Result<()> {
        let rows = area.height.max(u16::try_from(lines.len()).unwrap_or(u16::MAX));
        let width = usize::from(area.width);
        let mut buf = Vec::with_capacity(usize::from(rows) * (width + 16));

        for row in 0..rows {
            let line = lines.get(usize::from(row)).map_or("", String::as_str);
            let pad = width.saturating_sub(UnicodeWidthStr::width(line));
            queue!(
                buf,
                MoveTo(self.x, self.y.saturating_add(row)),
                Print(line),
                Print(" ".repeat(pad))
            )?;
        }

        out.write_all(&buf)?;
        out.flush()
    }
}

impl<W: Write + Send> Host for TerminalHost<W> {
    fn current_attachment(&self) -> AttachmentState {
        self.lock().attachment
    }

    fn subscribe(&self, listener: AttachmentListener) -> SubscriptionId {
        self.signal.subscribe(listener)
    }

    fn unsubscribe(&self, id: SubscriptionId) {
        self.signal.unsubscribe(id);
    }

    fn render_frame(&self, lines: &[String]) {
        let mut state = self.lock();
        if !state.attachment.is_attached() {
            return;
        }
        let reserved = state.reserved;
        if let Err(e) = self.paint(&mut state.out, lines, reserved) {
            tracing::warn!("failed to draw frame: {e}");
        }
    }

    fn report_preferred_bounds(&self, size: Size) {
        self.lock().reserved = size;
    }
}
