//! Batch ingestion of log directories.
//!
//! Records are read from one directory per [`LogSource`], deduplicated by
//! external id against the ladder and each other, sorted by game time and
//! then ingested one by one. A record that fails is logged and skipped.

use crate::convlog::{GameRecord, LogSource};
use crate::ladder::{GameAggregator, Ingested, Ladder};
use std::fs::{self, File};
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use ahash::AHashSet;
use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use flate2::read::GzDecoder;

/// A parsed record waiting for its turn.
#[derive(Debug, Clone)]
pub struct PendingGame {
    pub path: PathBuf,
    pub external_id: String,
    pub timestamp: NaiveDateTime,
    pub record: GameRecord,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestReport {
    pub stored: usize,
    pub duplicates: usize,
    pub failed: usize,
}

/// Reads a `.json` or `.json.gz` record.
pub fn read_record(path: &Path, source: LogSource) -> Result<GameRecord> {
    let file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    let reader: Box<dyn Read> = if path.extension().is_some_and(|ext| ext == "gz") {
        Box::new(GzDecoder::new(file))
    } else {
        Box::new(file)
    };
    GameRecord::from_reader(source, BufReader::new(reader))
        .with_context(|| format!("failed to parse {}", path.display()))
}

fn is_record(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.ends_with(".json") || n.ends_with(".json.gz"))
}

/// Collects the records under `root/<source dir>` that the ladder does not
/// hold yet, oldest first. Missing directories and unreadable files are
/// logged and skipped.
pub fn discover(root: &Path, ladder: &Ladder) -> Result<Vec<PendingGame>> {
    let mut seen = AHashSet::new();
    let mut pending = vec![];

    for source in LogSource::ALL {
        let dir = root.join(source.dir_name());
        if !dir.is_dir() {
            log::warn!("no {source} log directory at {}", dir.display());
            continue;
        }
        let mut paths: Vec<_> = fs::read_dir(&dir)
            .with_context(|| format!("reading log dir {}", dir.display()))?
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| is_record(p))
            .collect();
        paths.sort();

        for path in paths {
            let parsed = read_record(&path, source).and_then(|record| {
                let timestamp = record
                    .timestamp()
                    .with_context(|| format!("no game time in {}", path.display()))?;
                Ok((record, timestamp))
            });
            let (record, timestamp) = match parsed {
                Ok(parsed) => parsed,
                Err(e) => {
                    log::warn!("skipping {}: {e:#}", path.display());
                    continue;
                }
            };
            let external_id = record.external_id();
            if ladder.games.contains_external_id(&external_id) || !seen.insert(external_id.clone()) {
                log::debug!("{}: {external_id} already known", path.display());
                continue;
            }
            pending.push(PendingGame {
                path,
                external_id,
                timestamp,
                record,
            });
        }
    }

    pending.sort_by_key(|p| p.timestamp);
    Ok(pending)
}

/// Ingests `pending` in order. Failures do not stop the batch and do not
/// undo games stored before them.
pub fn ingest_all(pending: &[PendingGame], aggregator: &GameAggregator, ladder: &mut Ladder) -> IngestReport {
    let mut report = IngestReport::default();
    let total = pending.len();
    for (i, game) in pending.iter().enumerate() {
        match ladder.ingest(aggregator, &game.record) {
            Ok(Ingested::Stored { .. }) => report.stored += 1,
            Ok(Ingested::DuplicateExternalId) => report.duplicates += 1,
            Err(e) => {
                log::warn!("[{}/{total}] {}: {e}", i + 1, game.external_id);
                report.failed += 1;
            }
        }
    }
    report
}
