//! Accumulated call timings.

use std::fmt::Write as _;
use std::io;
use std::time::Duration;

use chrono::{DateTime, Utc};
use dashmap::DashMap;

/// Identifies one profiled operation on one implementation type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProfileKey {
    /// Concrete type of the wrapped delegate
    pub type_name: &'static str,
    /// Operation signature as declared in its capability set
    pub operation: &'static str,
}

impl ProfileKey {
    pub fn new(type_name: &'static str, operation: &'static str) -> Self {
        Self {
            type_name,
            operation,
        }
    }
}

/// Running totals for one key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProfileStat {
    pub total: Duration,
    pub calls: u64,
}

/// Thread-safe totals of elapsed time per [`ProfileKey`] for one session.
///
/// Totals only grow; nothing is ever reset.
#[derive(Debug)]
pub struct ProfileLedger {
    started_at: DateTime<Utc>,
    stats: DashMap<ProfileKey, ProfileStat>,
}

impl ProfileLedger {
    /// Start a session at the given wall-clock time.
    pub fn new(started_at: DateTime<Utc>) -> Self {
        Self {
            started_at,
            stats: DashMap::new(),
        }
    }

    /// Session start timestamp.
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Add one measured call to `key`.
    pub fn record(&self, key: ProfileKey, elapsed: Duration) {
        // The entry guard holds the shard lock for the whole update.
        let mut stat = self.stats.entry(key).or_default();
        stat.total += elapsed;
        stat.calls += 1;
    }

    /// Totals recorded so far for `key`.
    pub fn stat(&self, key: &ProfileKey) -> Option<ProfileStat> {
        self.stats.get(key).map(|s| *s)
    }

    /// All entries ordered by type name, then operation.
    pub fn entries(&self) -> Vec<(ProfileKey, ProfileStat)> {
        let mut entries: Vec<_> = self.stats.iter().map(|e| (*e.key(), *e.value())).collect();
        entries.sort_unstable_by(|a, b| a.0.cmp(&b.0));
        entries
    }

    /// Render the session report.
    ///
    /// ```text
    /// Run at Thu, 1 Jan 1970 00:00:00 GMT
    /// my_crate::Parser#parse(&str) took 0m 1s 250ms
    /// ```
    pub fn report(&self) -> String {
        let mut out = format!("Run at {}\n", format_rfc1123(self.started_at));
        for (key, stat) in self.entries() {
            let _ = writeln!(
                out,
                "{}#{} took {}",
                key.type_name,
                key.operation,
                format_duration(stat.total)
            );
        }
        out
    }

    /// Write the session report to `writer`.
    pub fn write_report(&self, writer: &mut impl io::Write) -> io::Result<()> {
        writer.write_all(self.report().as_bytes())?;
        writer.flush()
    }
}

/// RFC 1123 date as used in HTTP headers.
pub fn format_rfc1123(at: DateTime<Utc>) -> String {
    at.format("%a, %-d %b %Y %H:%M:%S GMT").to_string()
}

/// `<minutes>m <seconds>s <millis>ms`
pub fn format_duration(d: Duration) -> String {
    let secs = d.as_secs();
    format!("{}m {}s {}ms", secs / 60, secs % 60, d.subsec_millis())
}
