//! Append-only CSV result log.

use crate::error::FdError;
use crate::stats::{RunStats, CSV_HEADER};
use parking_lot::Mutex;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

#[derive(Debug)]
struct LogState<W> {
    writer: W,
    header_written: bool,
    rows: usize,
}

/// CSV sink shared by concurrent runs.
///
/// The header is written once, before the first row. Rows are appended
/// under a lock, so each row lands intact even when many runs finish at
/// the same time.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use u_fdive::experiment::ResultLog;
/// use u_fdive::stats::RunStats;
///
/// let log = ResultLog::new(Vec::new());
/// let stats = RunStats {
///     run_id: 0,
///     variant: "base".into(),
///     best_value: 0.25,
///     nodes_visited: 4,
///     depth_sum: 6,
///     max_depth: 3,
///     avg_depth: 1.5,
///     elapsed: Duration::from_millis(500),
///     reached_optimum: true,
/// };
/// log.append(&stats).unwrap();
/// let text = String::from_utf8(log.into_inner()).unwrap();
/// assert_eq!(
///     text,
///     "run,variant,best_value,nodes,elapsed,max_depth,avg_depth,optimal\n\
///      0,base,0.25,4,0.5,3,1.5,1\n"
/// );
/// ```
#[derive(Debug)]
pub struct ResultLog<W: Write> {
    state: Mutex<LogState<W>>,
}

impl ResultLog<BufWriter<File>> {
    /// Creates (truncating) a log file at `path`.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self, FdError> {
        let file = File::create(path)?;
        Ok(Self::new(BufWriter::new(file)))
    }
}

impl<W: Write> ResultLog<W> {
    pub fn new(writer: W) -> Self {
        Self {
            state: Mutex::new(LogState {
                writer,
                header_written: false,
                rows: 0,
            }),
        }
    }

    /// Writes the header if it has not been written yet.
    pub fn write_header(&self) -> Result<(), FdError> {
        let mut state = self.state.lock();
        Self::ensure_header(&mut state)
    }

    /// Appends one row.
    pub fn append(&self, stats: &RunStats) -> Result<(), FdError> {
        let mut state = self.state.lock();
        Self::ensure_header(&mut state)?;
        writeln!(state.writer, "{}", stats.csv_row())?;
        state.rows += 1;
        Ok(())
    }

    /// Rows appended so far.
    pub fn rows(&self) -> usize {
        self.state.lock().rows
    }

    pub fn flush(&self) -> Result<(), FdError> {
        self.state.lock().writer.flush()?;
        Ok(())
    }

    /// Returns the underlying writer.
    pub fn into_inner(self) -> W {
        self.state.into_inner().writer
    }

    fn ensure_header(state: &mut LogState<W>) -> Result<(), FdError> {
        if !state.header_written {
            writeln!(state.writer, "{CSV_HEADER}")?;
            state.header_written = true;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::time::Duration;

    fn stats(run_id: usize) -> RunStats {
        RunStats {
            run_id,
            variant: "depth_k".into(),
            best_value: 1.0,
            nodes_visited: 3,
            depth_sum: 3,
            max_depth: 2,
            avg_depth: 1.0,
            elapsed: Duration::ZERO,
            reached_optimum: true,
        }
    }

    #[test]
    fn test_header_written_once() {
        let log = ResultLog::new(Vec::new());
        log.write_header().unwrap();
        log.append(&stats(0)).unwrap();
        log.append(&stats(1)).unwrap();
        assert_eq!(log.rows(), 2);
        let text = String::from_utf8(log.into_inner()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], CSV_HEADER);
        assert_eq!(lines[1], "0,depth_k,1,3,0,2,1,1");
        assert_eq!(lines[2], "1,depth_k,1,3,0,2,1,1");
    }

    #[test]
    fn test_header_only() {
        let log = ResultLog::new(Vec::new());
        log.write_header().unwrap();
        log.write_header().unwrap();
        assert_eq!(log.rows(), 0);
        let text = String::from_utf8(log.into_inner()).unwrap();
        assert_eq!(text, format!("{CSV_HEADER}\n"));
    }

    #[test]
    fn test_concurrent_rows_stay_whole() {
        let log = ResultLog::new(Vec::new());
        std::thread::scope(|s| {
            for t in 0..4 {
                let log = &log;
                s.spawn(move || {
                    for i in 0..25 {
                        log.append(&stats(t * 100 + i)).unwrap();
                    }
                });
            }
        });
        assert_eq!(log.rows(), 100);
        let text = String::from_utf8(log.into_inner()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 101);
        assert_eq!(lines[0], CSV_HEADER);
        for line in &lines[1..] {
            assert_eq!(line.split(',').count(), 8, "torn row: {line}");
        }
    }

    struct FailingWriter;

    impl Write for FailingWriter {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::other("disk full"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_write_error_is_reported() {
        let log = ResultLog::new(FailingWriter);
        let err = log.append(&stats(0)).unwrap_err();
        assert!(matches!(err, FdError::Io(_)));
        assert_eq!(log.rows(), 0);
    }
}
