use crossterm::{
    cursor,
    style::Print,
    terminal::{self, ClearType},
    QueueableCommand,
};
use std::io::{self, Write};
use std::sync::{Mutex, MutexGuard, PoisonError};

struct BoardState<W> {
    lines: Vec<String>,
    sink: W,
}

/// Fixed-height block of status lines redrawn in place.
///
/// The lines and the output sink share one mutex, so a redraw always paints a
/// complete snapshot and the escape sequences of two redraws never interleave.
/// The lock is only ever taken from synchronous code.
pub struct ProgressBoard<W: Write + Send> {
    state: Mutex<BoardState<W>>,
}

impl<W: Write + Send> ProgressBoard<W> {
    pub fn new(sink: W) -> Self {
        Self {
            state: Mutex::new(BoardState {
                lines: Vec::new(),
                sink,
            }),
        }
    }

    /// Allocates `n` empty lines and reserves their vertical space.
    pub fn initialize(&self, n: usize) {
        let mut state = self.lock();
        state.lines = vec![String::new(); n];
        let reserve = "\n".repeat(n);
        report(state.sink.queue(Print(reserve)).and_then(|sink| sink.flush()));
    }

    pub fn set_line(&self, index: usize, text: String) {
        let mut state = self.lock();
        match state.lines.get_mut(index) {
            Some(line) => *line = text,
            None => {
                tracing::debug!("Ignoring progress line {} outside the board", index);
                return;
            }
        }
        report(redraw(&mut state));
    }

    pub fn redraw(&self) {
        report(redraw(&mut self.lock()));
    }

    /// Writes a line above or below the live block. Not for use while transfers run.
    pub fn banner(&self, text: &str) {
        let mut state = self.lock();
        report(
            state
                .sink
                .queue(Print(text))
                .and_then(|sink| sink.queue(Print('\n')))
                .and_then(|sink| sink.flush()),
        );
    }

    #[cfg(test)]
    pub fn lines(&self) -> Vec<String> {
        self.lock().lines.clone()
    }

    fn lock(&self) -> MutexGuard<'_, BoardState<W>> {
        // Drawing never leaves the state half-updated, so a poisoned lock is still usable.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Blanks every line of the block, then writes the current lines over it.
fn redraw<W: Write>(state: &mut BoardState<W>) -> io::Result<()> {
    let n = match u16::try_from(state.lines.len()) {
        Ok(0) => return Ok(()),
        Ok(n) => n,
        Err(_) => u16::MAX,
    };

    let BoardState { lines, sink } = state;
    sink.queue(cursor::MoveUp(n))?.queue(cursor::MoveToColumn(0))?;
    for _ in 0..n {
        sink.queue(terminal::Clear(ClearType::CurrentLine))?.queue(Print('\n'))?;
    }
    sink.queue(cursor::MoveUp(n))?.queue(cursor::MoveToColumn(0))?;
    for line in lines.iter() {
        sink.queue(Print(line))?.queue(Print('\n'))?;
    }
    sink.flush()
}

fn report(result: io::Result<impl Sized>) {
    if let Err(e) = result {
        tracing::debug!("Progress output failed: {}", e);
    }
}
