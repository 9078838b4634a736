use chrono::Local;
use std::collections::VecDeque;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Something the UI shell must show the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// Transient confirmation, dismissed on its own.
    Toast(String),
    /// Blocking message the user has to acknowledge.
    Alert(String),
    /// Navigate away, e.g. to the login screen after logout.
    Redirect(String),
}

/// FIFO of notices produced by the controller and drained by the shell.
#[derive(Debug, Default)]
pub struct NoticeQueue {
    queue: VecDeque<Notice>,
    log_path: Option<PathBuf>,
}

impl NoticeQueue {
    pub fn with_log(log_path: Option<PathBuf>) -> Self {
        Self {
            queue: VecDeque::new(),
            log_path,
        }
    }

    pub fn toast(&mut self, msg: impl Into<String>) {
        let msg = msg.into();
        if let Some(path) = &self.log_path {
            append_toast_log(path, &msg);
        }
        self.queue.push_back(Notice::Toast(msg));
    }

    pub fn alert(&mut self, msg: impl Into<String>) {
        let msg = msg.into();
        tracing::warn!(message = %msg, "alert");
        self.queue.push_back(Notice::Alert(msg));
    }

    pub fn redirect(&mut self, target: impl Into<String>) {
        self.queue.push_back(Notice::Redirect(target.into()));
    }

    pub fn drain(&mut self) -> Vec<Notice> {
        self.queue.drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

pub fn append_toast_log(path: &Path, msg: &str) {
    if let Ok(mut file) = OpenOptions::new().create(true).append(true).open(path) {
        let _ = writeln!(file, "{} - {}", Local::now().to_rfc3339(), msg);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toasts_are_appended_to_log() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("toast.log");
        let mut q = NoticeQueue::with_log(Some(path.clone()));
        q.toast("saved");
        q.alert("broken");
        assert_eq!(
            q.drain(),
            vec![Notice::Toast("saved".into()), Notice::Alert("broken".into())]
        );
        let log = std::fs::read_to_string(path).unwrap();
        assert!(log.trim_end().ends_with("- saved"));
        assert!(!log.contains("broken"));
    }
}
