//! File-backed checkpoint ledger
//!
//! The ledger maps each harvested link to a completion flag. Every mutation
//! reads the whole file, patches it in memory and replaces the file through a
//! sibling temporary file, so a crash mid-write leaves the previous content
//! intact. The store is meant for a single writer and link counts in the low
//! thousands.

use crate::storage::error::{LedgerError, LedgerResult};
use crate::storage::row::{
    is_blank, join_row, normalize_key, parse_done, split_row, DONE_VALUE, HEADER,
};
use crate::storage::{LedgerStats, LinkRecord};
use std::collections::HashSet;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Lines, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Durable link → completion record store
#[derive(Debug, Clone)]
pub struct CheckpointLedger {
    path: PathBuf,
}

/// Header plus data rows, as held in memory during a rewrite
struct LedgerRows {
    header: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl CheckpointLedger {
    /// Creates a handle for a ledger that may not exist yet
    ///
    /// The file is created, header included, by the first append that adds
    /// at least one record.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Opens a ledger that must already exist with a well-formed header
    ///
    /// # Returns
    ///
    /// * `Ok(CheckpointLedger)` - The ledger is present and readable
    /// * `Err(LedgerError::Missing)` - No file at `path`
    /// * `Err(LedgerError::MalformedHeader)` - Header has fewer than two columns
    pub fn open_existing(path: impl Into<PathBuf>) -> LedgerResult<Self> {
        let ledger = Self::new(path);
        // Reading the header is enough to validate the file
        ledger.scan()?;
        Ok(ledger)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Appends a single url with `done = false` unless it is already recorded
    ///
    /// Returns true if a new record was created.
    pub fn append(&mut self, url: &str) -> LedgerResult<bool> {
        Ok(self.append_all([url])? == 1)
    }

    /// Appends every url not already present, keeping first-seen order
    ///
    /// Keys are compared after trimming whitespace and quote characters, both
    /// against existing records and within the batch. Empty keys are ignored.
    /// Returns the number of records created; nothing is written when that
    /// number is zero.
    pub fn append_all<I, S>(&mut self, urls: I) -> LedgerResult<usize>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut contents = if self.exists() {
            self.read_rows()?
        } else {
            LedgerRows {
                header: HEADER.iter().map(|h| h.to_string()).collect(),
                rows: Vec::new(),
            }
        };

        let mut known: HashSet<String> = contents
            .rows
            .iter()
            .filter_map(|row| row.first())
            .map(|url| normalize_key(url).to_string())
            .collect();

        let mut added = 0;
        for url in urls {
            let key = normalize_key(url.as_ref());
            if key.is_empty() || known.contains(key) {
                continue;
            }
            known.insert(key.to_string());
            contents.rows.push(vec![key.to_string(), String::new()]);
            added += 1;
        }

        if added > 0 {
            self.write_rows(&contents)?;
            tracing::debug!("Appended {} records to {}", added, self.path.display());
        }

        Ok(added)
    }

    /// Sets the completion flag of every record whose key matches `url`
    ///
    /// The flag only moves from pending to done: `done = false` on a
    /// completed record leaves it completed. Repeating the call is a no-op.
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - At least one record matched
    /// * `Ok(false)` - No record matched; the file is untouched
    /// * `Err(LedgerError)` - The ledger could not be read or replaced
    pub fn mark_done(&mut self, url: &str, done: bool) -> LedgerResult<bool> {
        let mut contents = self.read_rows()?;
        let key = normalize_key(url);

        let mut found = false;
        let mut changed = false;
        for row in contents.rows.iter_mut() {
            if row.first().map(|u| normalize_key(u)) != Some(key) {
                continue;
            }
            found = true;

            let currently_done = row.get(1).map_or(false, |f| parse_done(f));
            if done && !currently_done {
                if row.len() > 1 {
                    row[1] = DONE_VALUE.to_string();
                } else {
                    row.push(DONE_VALUE.to_string());
                }
                changed = true;
            }
        }

        if !found {
            tracing::warn!("Url not found in ledger {}: {}", self.path.display(), url);
            return Ok(false);
        }

        if changed {
            self.write_rows(&contents)?;
        }

        Ok(true)
    }

    /// Streams records in storage order
    ///
    /// Every call re-opens the backing file, so a fresh scan reflects updates
    /// made since the previous one. Blank rows are skipped.
    pub fn scan(&self) -> LedgerResult<LedgerScan> {
        let file = self.open_for_read()?;
        let mut lines = BufReader::new(file).lines();

        let header = loop {
            match lines.next() {
                Some(line) => {
                    let line = line?;
                    if !line.trim().is_empty() {
                        break split_row(&line);
                    }
                }
                None => return Err(LedgerError::MalformedHeader(self.path.clone())),
            }
        };

        if header.len() < 2 {
            return Err(LedgerError::MalformedHeader(self.path.clone()));
        }

        Ok(LedgerScan { lines })
    }

    /// Collects a full scan
    pub fn records(&self) -> LedgerResult<Vec<LinkRecord>> {
        self.scan()?.collect()
    }

    /// Counts total, completed and pending records
    pub fn stats(&self) -> LedgerResult<LedgerStats> {
        let mut stats = LedgerStats::default();
        for record in self.scan()? {
            let record = record?;
            stats.total += 1;
            if record.done {
                stats.completed += 1;
            }
        }
        Ok(stats)
    }

    /// Returns the first pending record stored after `after`
    ///
    /// With `after = None`, or when `after` is not in the ledger, the search
    /// starts at the first record.
    pub fn next_pending(&self, after: Option<&str>) -> LedgerResult<Option<LinkRecord>> {
        let records = self.records()?;
        let start = after
            .map(normalize_key)
            .and_then(|key| records.iter().position(|r| r.url == key))
            .map_or(0, |i| i + 1);

        Ok(records.into_iter().skip(start).find(|r| !r.done))
    }

    fn open_for_read(&self) -> LedgerResult<File> {
        File::open(&self.path).map_err(|e| {
            if e.kind() == io::ErrorKind::NotFound {
                LedgerError::Missing(self.path.clone())
            } else {
                LedgerError::Io(e)
            }
        })
    }

    fn read_rows(&self) -> LedgerResult<LedgerRows> {
        let file = self.open_for_read()?;
        let mut header = None;
        let mut rows = Vec::new();

        for line in BufReader::new(file).lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let fields = split_row(&line);
            if header.is_none() {
                header = Some(fields);
            } else if !is_blank(&fields) {
                rows.push(fields);
            }
        }

        Ok(LedgerRows {
            header: header.unwrap_or_else(|| HEADER.iter().map(|h| h.to_string()).collect()),
            rows,
        })
    }

    fn write_rows(&self, contents: &LedgerRows) -> LedgerResult<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };

        let mut tmp = NamedTempFile::new_in(&dir)?;
        writeln!(tmp, "{}", join_row(&contents.header))?;
        for row in &contents.rows {
            writeln!(tmp, "{}", join_row(row))?;
        }
        tmp.flush()?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path)?;

        Ok(())
    }
}

/// Lazy, finite iterator over ledger records
pub struct LedgerScan {
    lines: Lines<BufReader<File>>,
}

impl Iterator for LedgerScan {
    type Item = LedgerResult<LinkRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let line = match self.lines.next()? {
                Ok(line) => line,
                Err(e) => return Some(Err(LedgerError::Io(e))),
            };

            let fields = split_row(&line);
            if is_blank(&fields) {
                continue;
            }

            return Some(Ok(LinkRecord {
                url: normalize_key(&fields[0]).to_string(),
                done: fields.get(1).map_or(false, |f| parse_done(f)),
            }));
        }
    }
}
