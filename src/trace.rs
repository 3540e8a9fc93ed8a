//! Per-iteration diagnostic output for offline plotting.
//!
//! Each line holds whitespace separated numbers: the iteration, the number of
//! evaluations, the best fitness and the components of the best position.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::error::{Result, ResultExt};
use crate::optimiser::OptimiseResult;

#[derive(Debug)]
pub struct TraceWriter<W: Write> {
    writer: W,
}

impl TraceWriter<BufWriter<File>> {
    /// Creates (or truncates) the trace file at `path`.
    pub fn create(path: &Path) -> Result<Self> {
        let file = File::create(path).context(format!("Failed to create trace file {}", path.display()))?;
        Ok(Self::new(BufWriter::new(file)))
    }
}

impl<W: Write> TraceWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Appends the current state of `result`.
    pub fn record(&mut self, result: &OptimiseResult) -> Result<()> {
        write!(
            self.writer,
            "{} {} {:e}",
            result.iterations, result.evaluations, result.best_fitness
        )?;
        for x in &result.best_position {
            write!(self.writer, " {:e}", x)?;
        }
        writeln!(self.writer)?;
        Ok(())
    }

    pub fn finish(mut self) -> Result<W> {
        self.writer.flush()?;
        Ok(self.writer)
    }
}
