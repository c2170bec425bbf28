//! Cook-session recorder
//!
//! A fixed-capacity ring of packed samples in RAM, flushed append-only to
//! one persistent session file. The ring holds the most recent 4-8 hours at
//! the 5 s cadence; the file holds the whole cook. After a crash or power
//! loss, `begin` reloads the ring tail from the file and the cook continues
//! where it left off.

use core::fmt;

use pyrostat_protocol::record::{self, DataPoint, HEADER_LEN, RECORD_LEN};

use crate::config::SessionSettings;
use crate::traits::{SessionStore, StoreError};

/// Default ring capacity: a bit under six hours at the 5 s cadence
pub const DEFAULT_CAPACITY: usize = 4096;

/// Cook-session ring and flush bookkeeping
///
/// `K` is the ring capacity; production uses [`DEFAULT_CAPACITY`], tests use
/// small rings to exercise wrapping.
#[derive(Debug)]
pub struct CookSession<const K: usize> {
    settings: SessionSettings,
    points: [DataPoint; K],
    /// Next write position
    head: usize,
    /// Valid points in the ring, saturating at K
    count: usize,
    /// The ring has discarded at least one point
    wrapped: bool,
    active: bool,
    start_epoch: u32,
    /// Points recorded over the whole session, including discarded ones
    total_points: u32,
    /// Count of points already on disk (in total-points numbering)
    flushed_up_to: u32,
    last_sample_ms: Option<u64>,
    last_flush_ms: Option<u64>,
}

impl<const K: usize> CookSession<K> {
    /// Create an inactive session
    pub fn new(settings: SessionSettings) -> Self {
        Self {
            settings,
            points: [DataPoint::EMPTY; K],
            head: 0,
            count: 0,
            wrapped: false,
            active: false,
            start_epoch: 0,
            total_points: 0,
            flushed_up_to: 0,
            last_sample_ms: None,
            last_flush_ms: None,
        }
    }

    /// Ring capacity
    pub fn capacity(&self) -> usize {
        K
    }

    /// Valid points currently in the ring
    pub fn count(&self) -> usize {
        self.count
    }

    /// Whether a session is recording
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Whether the ring has discarded old points
    pub fn wrapped(&self) -> bool {
        self.wrapped
    }

    /// Session start time, epoch seconds
    pub fn start_epoch(&self) -> u32 {
        self.start_epoch
    }

    /// Points recorded over the whole session
    pub fn total_points(&self) -> u32 {
        self.total_points
    }

    /// Points already flushed to storage
    pub fn flushed_up_to(&self) -> u32 {
        self.flushed_up_to
    }

    /// The i-th oldest point, for 0 <= i < count
    pub fn point(&self, index: usize) -> Option<DataPoint> {
        if index >= self.count {
            return None;
        }
        let oldest = (self.head + K - self.count) % K;
        Some(self.points[(oldest + index) % K])
    }

    /// Resume a session from storage after boot
    ///
    /// Returns true when a prior session was recovered. An unreadable or
    /// absent file means no prior session; the recorder starts clean and
    /// inactive.
    pub fn begin<S: SessionStore>(&mut self, store: &mut S) -> bool {
        match self.recover(store) {
            Ok(recovered) => recovered,
            Err(_) => {
                self.reset_memory();
                false
            }
        }
    }

    fn recover<S: SessionStore>(&mut self, store: &mut S) -> Result<bool, StoreError> {
        let Some(size) = store.size()? else {
            return Ok(false);
        };
        if (size as usize) < HEADER_LEN {
            return Ok(false);
        }

        let mut header = [0u8; HEADER_LEN];
        if store.read_at(0, &mut header)? < HEADER_LEN {
            return Ok(false);
        }
        let start_epoch = match record::decode_header(&header) {
            Ok(epoch) => epoch,
            Err(_) => return Ok(false),
        };

        // A trailing partial record (interrupted write) is ignored
        let stored = ((size as usize - HEADER_LEN) / RECORD_LEN) as u32;
        let skip = stored.saturating_sub(K as u32);
        let load = (stored - skip) as usize;

        self.reset_memory();
        let mut offset = (HEADER_LEN + skip as usize * RECORD_LEN) as u32;
        let mut buf = [0u8; RECORD_LEN];
        for _ in 0..load {
            if store.read_at(offset, &mut buf)? < RECORD_LEN {
                return Err(StoreError::Corrupted);
            }
            let point = DataPoint::decode(&buf).map_err(|_| StoreError::Corrupted)?;
            self.push(point);
            offset += RECORD_LEN as u32;
        }

        self.start_epoch = start_epoch;
        self.total_points = stored;
        self.flushed_up_to = stored;
        self.wrapped = stored > K as u32;
        self.active = true;
        Ok(true)
    }

    /// Record one sample if the session is active and the cadence is due
    ///
    /// The builder receives the current epoch and assembles the point;
    /// nothing records until the wall clock is synchronized.
    pub fn maybe_record(
        &mut self,
        now_ms: u64,
        epoch: Option<u32>,
        build: impl FnOnce(u32) -> DataPoint,
    ) {
        if !self.active {
            return;
        }
        match self.last_sample_ms {
            Some(last) if now_ms < last + self.settings.sample_interval_ms as u64 => return,
            _ => {}
        }
        let Some(epoch) = epoch else { return };
        self.last_sample_ms = Some(now_ms);

        self.push(build(epoch));
        self.total_points += 1;
    }

    /// Flush pending points if the flush interval has elapsed
    ///
    /// A failed flush leaves the pending points pending; the next interval
    /// retries.
    pub fn maybe_flush<S: SessionStore>(
        &mut self,
        now_ms: u64,
        store: &mut S,
    ) -> Result<(), StoreError> {
        if !self.active {
            return Ok(());
        }
        match self.last_flush_ms {
            Some(last) if now_ms < last + self.settings.flush_interval_ms as u64 => return Ok(()),
            _ => {}
        }
        self.last_flush_ms = Some(now_ms);
        self.flush(store)
    }

    /// Flush every pending point to storage now
    ///
    /// At most `count` points can still be in the ring; anything older was
    /// discarded by wrapping and is lost by construction.
    pub fn flush<S: SessionStore>(&mut self, store: &mut S) -> Result<(), StoreError> {
        let pending = (self.total_points - self.flushed_up_to) as usize;
        if pending == 0 {
            return Ok(());
        }
        let n = pending.min(self.count);

        if store.size()?.is_none() {
            store.append(&record::encode_header(self.start_epoch))?;
        }

        let base = self.total_points - n as u32;
        for k in 0..n {
            let point = match self.point(self.count - n + k) {
                Some(p) => p,
                None => break,
            };
            store.append(&point.to_bytes())?;
            // Advance per point so a failed append only re-sends the tail
            self.flushed_up_to = base + k as u32 + 1;
        }
        Ok(())
    }

    /// Flush and stop recording; the file is kept for later download
    pub fn end_session<S: SessionStore>(&mut self, store: &mut S) -> Result<(), StoreError> {
        let result = self.flush(store);
        self.active = false;
        result
    }

    /// Start a fresh session, discarding any previous one
    pub fn start_session<S: SessionStore>(
        &mut self,
        now_epoch: u32,
        store: &mut S,
    ) -> Result<(), StoreError> {
        self.reset_memory();
        self.start_epoch = now_epoch;
        self.active = true;
        Self::remove_file(store)
    }

    /// Discard the session entirely, RAM and disk
    pub fn clear<S: SessionStore>(&mut self, store: &mut S) -> Result<(), StoreError> {
        self.reset_memory();
        Self::remove_file(store)
    }

    /// Write the session as CSV, one row per point
    pub fn write_csv<W: fmt::Write>(&self, out: &mut W) -> fmt::Result {
        writeln!(out, "time,pit,meat1,meat2,fan,damper,flags")?;
        for index in 0..self.count {
            let Some(p) = self.point(index) else { break };
            write!(out, "{},", p.timestamp)?;
            write_x10(out, p.pit_x10)?;
            out.write_char(',')?;
            write_x10(out, p.meat1_x10)?;
            out.write_char(',')?;
            write_x10(out, p.meat2_x10)?;
            writeln!(out, ",{},{},{}", p.fan_pct, p.damper_pct, p.flags)?;
        }
        Ok(())
    }

    /// Write the session as a JSON document
    pub fn write_json<W: fmt::Write>(&self, out: &mut W) -> fmt::Result {
        write!(out, "{{\"startEpoch\":{},\"points\":[", self.start_epoch)?;
        for index in 0..self.count {
            let Some(p) = self.point(index) else { break };
            if index > 0 {
                out.write_char(',')?;
            }
            write!(out, "{{\"t\":{},\"pit\":", p.timestamp)?;
            write_x10(out, p.pit_x10)?;
            out.write_str(",\"meat1\":")?;
            write_x10(out, p.meat1_x10)?;
            out.write_str(",\"meat2\":")?;
            write_x10(out, p.meat2_x10)?;
            write!(
                out,
                ",\"fan\":{},\"damper\":{},\"flags\":{}}}",
                p.fan_pct, p.damper_pct, p.flags
            )?;
        }
        out.write_str("]}")
    }

    fn push(&mut self, point: DataPoint) {
        self.points[self.head] = point;
        self.head = (self.head + 1) % K;
        if self.count < K {
            self.count += 1;
        } else {
            self.wrapped = true;
        }
    }

    fn reset_memory(&mut self) {
        self.head = 0;
        self.count = 0;
        self.wrapped = false;
        self.active = false;
        self.start_epoch = 0;
        self.total_points = 0;
        self.flushed_up_to = 0;
        self.last_sample_ms = None;
        self.last_flush_ms = None;
    }

    fn remove_file<S: SessionStore>(store: &mut S) -> Result<(), StoreError> {
        match store.remove() {
            Ok(()) | Err(StoreError::NotFound) => Ok(()),
            Err(e) => Err(e),
        }
    }
}

/// Format a tenths-of-a-degree value as a decimal number
fn write_x10<W: fmt::Write>(out: &mut W, value: i16) -> fmt::Result {
    if value < 0 {
        out.write_char('-')?;
    }
    let abs = (value as i32).abs();
    write!(out, "{}.{}", abs / 10, abs % 10)
}
