use serde::Serialize;
use std::collections::VecDeque;
use std::fmt::Debug;
use std::sync::Mutex;

/// One completed request, as recorded by the logging middleware.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RequestLog {
    pub path: String,
    pub method: String,
    pub duration_ms: u64,
    pub status: u16,
    pub user_agent: Option<String>,
    pub ip: String,
    pub referer: String,
    pub country: String,
    /// Canonical reason phrase for non-success responses, or the error message when the
    /// chain failed.
    pub error: Option<String>,
}

/// Destination for request logs, e.g. a `request_logs` table.
///
/// `record` is called on the response path and must not block; slow sinks should hand the
/// entry off to a background task.
pub trait RequestLogSink: Debug + Send + Sync + 'static {
    fn record(&self, entry: RequestLog);
}

/// Keeps the most recent entries in memory, dropping the oldest once full.
#[derive(Debug)]
pub struct MemoryLogSink {
    capacity: usize,
    entries: Mutex<VecDeque<RequestLog>>,
}

impl MemoryLogSink {
    pub const DEFAULT_CAPACITY: usize = 1024;

    pub fn new() -> MemoryLogSink {
        MemoryLogSink::with_capacity(MemoryLogSink::DEFAULT_CAPACITY)
    }

    /// A sink holding at most `capacity` entries. A capacity of zero keeps nothing.
    pub fn with_capacity(capacity: usize) -> MemoryLogSink {
        MemoryLogSink {
            capacity,
            entries: Mutex::new(VecDeque::with_capacity(capacity)),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// The retained entries, oldest first.
    pub fn entries(&self) -> Vec<RequestLog> {
        let entries = match self.entries.lock() {
            Ok(entries) => entries,
            Err(poisoned) => poisoned.into_inner(),
        };
        entries.iter().cloned().collect()
    }
}

impl Default for MemoryLogSink {
    fn default() -> Self {
        MemoryLogSink::new()
    }
}

impl RequestLogSink for MemoryLogSink {
    fn record(&self, entry: RequestLog) {
        if self.capacity == 0 {
            return;
        }

        let mut entries = match self.entries.lock() {
            Ok(entries) => entries,
            Err(poisoned) => poisoned.into_inner(),
        };

        if entries.len() == self.capacity {
            entries.pop_front();
        }
        entries.push_back(entry);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(path: &str) -> RequestLog {
        RequestLog {
            path: path.to_owned(),
            method: "GET".to_owned(),
            duration_ms: 1,
            status: 200,
            user_agent: None,
            ip: "unknown".to_owned(),
            referer: String::new(),
            country: "unknown".to_owned(),
            error: None,
        }
    }

    #[test]
    fn should_keep_only_newest_entries() {
        let sink = MemoryLogSink::with_capacity(3);
        for i in 0..5 {
            sink.record(entry(&format!("/post/{}", i)));
        }

        let paths: Vec<String> = sink.entries().into_iter().map(|e| e.path).collect();
        assert_eq!(paths, vec!["/post/2", "/post/3", "/post/4"]);
    }

    #[test]
    fn should_keep_nothing_with_zero_capacity() {
        let sink = MemoryLogSink::with_capacity(0);
        sink.record(entry("/"));
        assert!(sink.entries().is_empty());
    }
}
