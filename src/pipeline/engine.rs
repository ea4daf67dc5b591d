use crate::config::types::{Config, MissingFieldStrategy};
use crate::pipeline::gate::RenderGate;
use crate::source::reader::{Line, LineReader, ReaderError};
use crate::stats::{
    AggregationTable, ExtractError, FieldExtractor, FieldMap, FilterError, RecordFilter,
    ReportRenderer,
};
use crate::storage::offset::{OffsetError, OffsetStore};
use std::io::Write;
use std::path::Path;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, warn};

/// Lines read between yields to the runtime while a continuous run works
/// through a backlog.
const LINES_PER_YIELD: usize = 1024;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("no audit log configured")]
    MissingAuditLog,

    #[error("source reader error: {0}")]
    Reader(#[from] ReaderError),

    #[error("query error: {0}")]
    Filter(#[from] FilterError),

    #[error("field map error: {0}")]
    FieldMap(#[from] ExtractError),

    #[error("line at byte {offset}: {source}")]
    Extract {
        offset: u64,
        #[source]
        source: ExtractError,
    },

    #[error("offset store error: {0}")]
    Offset(#[from] OffsetError),

    #[error("failed to write report: {0}")]
    Output(#[source] std::io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Read to end of file, report once, stop.
    OneShot,
    /// Keep polling for appended lines, resuming from the persisted offset.
    Continuous,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    /// File open and positioned, nothing read yet.
    Idle,
    Reading,
    Sleeping,
    Reporting,
    /// One-shot report written; nothing more to do.
    Closed,
}

/// Drives a tracked file through filter, extraction and aggregation, and
/// writes ranked reports to `out`.
///
/// In continuous mode a report is followed by a table reset and then an
/// offset persist, in that order: a crash in between only recounts lines on
/// the next run, it never loses them.
pub struct TailEngine<W: Write> {
    mode: Mode,
    reader: LineReader,
    filter: RecordFilter,
    extractor: FieldExtractor,
    renderer: ReportRenderer,
    table: AggregationTable,
    gate: RenderGate,
    offset_store: Option<OffsetStore>,
    sleep: Duration,
    on_missing_field: MissingFieldStrategy,
    skipped_lines: u64,
    state: EngineState,
    out: W,
}

impl<W: Write> TailEngine<W> {
    /// Compile the query and field rules, open the audit log and, in
    /// continuous mode, seek to the persisted offset.
    pub fn from_config(config: &Config, out: W) -> Result<Self, EngineError> {
        let path = config
            .audit_log
            .as_deref()
            .ok_or(EngineError::MissingAuditLog)?;

        let filter = RecordFilter::new(config.query.as_slice())?;
        let field_map = FieldMap::compile(&config.fields)?;
        let extractor = FieldExtractor::new(config.group_by.as_slice(), &field_map)?;
        let renderer =
            ReportRenderer::from_extractor(&extractor, config.limit, config.suppress_header);

        let mode = if config.continuous {
            Mode::Continuous
        } else {
            Mode::OneShot
        };

        let mut reader = LineReader::open(path, config.continuous)?;

        let offset_store = match mode {
            Mode::Continuous => {
                let store = OffsetStore::new(&config.offset_dir, reader.tracked());
                let offset = reader.seek_to(store.load())?;
                debug!(
                    offset,
                    offset_file = %store.path().display(),
                    "Seeking to last byte position"
                );
                Some(store)
            }
            Mode::OneShot => None,
        };

        Ok(Self {
            mode,
            reader,
            filter,
            extractor,
            renderer,
            table: AggregationTable::new(),
            gate: RenderGate::new(config.interval, Instant::now()),
            offset_store,
            sleep: config.sleep,
            on_missing_field: config.on_missing_field,
            skipped_lines: 0,
            state: EngineState::Idle,
            out,
        })
    }

    /// Run until done (one-shot) or forever (continuous).
    pub async fn run(&mut self) -> Result<(), EngineError> {
        match self.mode {
            Mode::OneShot => {
                self.process_available()?;
                self.finish()
            }
            Mode::Continuous => loop {
                self.set_state(EngineState::Reading);
                while self.process_lines(LINES_PER_YIELD)? == LINES_PER_YIELD {
                    tokio::task::yield_now().await;
                }
                self.render_if_due(Instant::now())?;

                self.set_state(EngineState::Sleeping);
                debug!(sleep = ?self.sleep, "Sleeping");
                tokio::time::sleep(self.sleep).await;
            },
        }
    }

    /// One continuous-mode cycle without the sleep: consume what is available,
    /// then check the render gate once more. Returns the number of lines consumed.
    pub fn poll_once(&mut self) -> Result<usize, EngineError> {
        let consumed = self.process_available()?;
        self.render_if_due(Instant::now())?;
        Ok(consumed)
    }

    /// Consume every complete line currently available.
    pub fn process_available(&mut self) -> Result<usize, EngineError> {
        self.set_state(EngineState::Reading);
        self.process_lines(usize::MAX)
    }

    /// Consume up to `max` complete lines.
    fn process_lines(&mut self, max: usize) -> Result<usize, EngineError> {
        debug!(offset = self.reader.offset(), "Starting read loop");

        let mut consumed = 0;
        while consumed < max {
            let Some(line) = self.reader.next_line()? else {
                break;
            };
            debug!(line = %line.text, "line");
            self.record_line(&line)?;
            consumed += 1;

            if self.mode == Mode::Continuous {
                self.render_if_due(Instant::now())?;
            }
        }

        Ok(consumed)
    }

    /// Render if the table is non-empty and the interval has elapsed.
    pub fn render_if_due(&mut self, now: Instant) -> Result<bool, EngineError> {
        if !self.gate.should_render(now, self.table.is_empty()) {
            return Ok(false);
        }
        self.render(now)?;
        Ok(true)
    }

    fn finish(&mut self) -> Result<(), EngineError> {
        self.render(Instant::now())?;
        self.set_state(EngineState::Closed);
        Ok(())
    }

    fn record_line(&mut self, line: &Line) -> Result<(), EngineError> {
        if !self.filter.matches(&line.text) {
            return Ok(());
        }

        match self.extractor.extract_line(&line.text) {
            Ok(key) => {
                self.table.accumulate(key);
                Ok(())
            }
            Err(e @ ExtractError::MissingField { .. })
                if self.on_missing_field == MissingFieldStrategy::Skip =>
            {
                warn!(offset = line.start_offset, error = %e, "Skipping line");
                self.skipped_lines += 1;
                Ok(())
            }
            Err(source) => Err(EngineError::Extract {
                offset: line.start_offset,
                source,
            }),
        }
    }

    fn render(&mut self, now: Instant) -> Result<(), EngineError> {
        self.set_state(EngineState::Reporting);
        debug!(keys = self.table.len(), "Doing render");

        let report = self.renderer.render(&self.table.snapshot());
        self.out
            .write_all(report.as_bytes())
            .and_then(|_| self.out.flush())
            .map_err(EngineError::Output)?;
        self.gate.mark_rendered(now);

        if let Some(store) = self.offset_store.as_mut() {
            debug!("Doing reset");
            self.table.reset();

            let offset = self.reader.offset();
            debug!(offset, "Updating last byte position");
            store.store(offset)?;
        }

        Ok(())
    }

    fn set_state(&mut self, state: EngineState) {
        if self.state != state {
            debug!(from = ?self.state, to = ?state, "State transition");
            self.state = state;
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    /// Bytes consumed from the audit log so far.
    pub fn offset(&self) -> u64 {
        self.reader.offset()
    }

    pub fn table(&self) -> &AggregationTable {
        &self.table
    }

    pub fn skipped_lines(&self) -> u64 {
        self.skipped_lines
    }

    pub fn offset_file(&self) -> Option<&Path> {
        self.offset_store.as_ref().map(|store| store.path())
    }

    pub fn output(&self) -> &W {
        &self.out
    }

    pub fn into_output(self) -> W {
        self.out
    }
}
