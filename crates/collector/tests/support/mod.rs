#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::{bail, Result};
use async_trait::async_trait;
use tracker::Tracker;

pub const CSV: &str = "\
id,title,creation,type,status,message_count
1,Crash on start,2020-01-01.10:00:00,1,1,3
2,Buy cheap watches,2020-01-02.10:00:00,1,2,0
3,Docs typo,2020-01-03.10:00:00,2,1,1
4,Slow regex,,2,2,2
";

/// In-memory tracker that counts every request it serves.
#[derive(Default)]
pub struct StubTracker {
    pub list_calls: AtomicUsize,
    pub lookup_calls: AtomicUsize,
    pub csv_calls: AtomicUsize,
    pub fail_csv: bool,
    pub csv_body: String,
    pub users: Vec<String>,
}

impl StubTracker {
    pub fn new() -> Self {
        Self {
            users: vec!["admin".into(), "alice".into(), "bob".into()],
            csv_body: CSV.to_string(),
            ..Self::default()
        }
    }

    pub fn failing_csv() -> Self {
        Self {
            fail_csv: true,
            ..Self::new()
        }
    }

    pub fn with_csv(body: &str) -> Self {
        Self {
            csv_body: body.to_string(),
            ..Self::new()
        }
    }

    pub fn requests(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
            + self.lookup_calls.load(Ordering::SeqCst)
            + self.csv_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Tracker for StubTracker {
    async fn list(&self, class: &str) -> Result<Vec<String>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        if class == "user" {
            return Ok(self.users.clone());
        }
        Ok(vec!["open".into(), "closed".into()])
    }

    async fn lookup(&self, _class: &str, label: &str) -> Result<String> {
        self.lookup_calls.fetch_add(1, Ordering::SeqCst);
        match label {
            "open" => Ok("1".into()),
            "closed" => Ok("2".into()),
            other => bail!("unknown label {other}"),
        }
    }

    async fn export_csv(&self) -> Result<Vec<u8>> {
        self.csv_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_csv {
            bail!("connection reset by peer");
        }
        Ok(self.csv_body.as_bytes().to_vec())
    }
}
