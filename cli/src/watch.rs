use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, SystemTime};

use tracing::{debug, warn};

/// Polls a file's modification time.
#[derive(Debug)]
pub struct Watcher {
    path:          PathBuf,
    last_modified: Option<SystemTime>,
}

impl Watcher {
    pub fn new(path: &Path) -> Self {
        Watcher { path: path.to_path_buf(), last_modified: None }
    }

    /// `true` when the file is new to this watcher or its modification time
    /// differs from the previous poll.
    pub fn poll(&mut self) -> io::Result<bool> {
        let modified = fs::metadata(&self.path)?.modified()?;
        if self.last_modified == Some(modified) {
            return Ok(false);
        }
        self.last_modified = Some(modified);
        Ok(true)
    }
}

/// Run `on_change` every time the file changes, checking every `interval`.
/// A missing or unreadable file is logged and polled again.
pub fn watch<F: FnMut()>(path: &Path, interval: Duration, mut on_change: F) -> ! {
    let mut watcher = Watcher::new(path);
    loop {
        match watcher.poll() {
            Ok(true) => {
                debug!(path = %path.display(), "change detected");
                on_change();
            }
            Ok(false) => {}
            Err(err) => warn!(path = %path.display(), error = %err, "cannot read schema file"),
        }
        thread::sleep(interval);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use tempfile::tempdir;

    #[test]
    fn test_poll_detects_changes() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("app.yaif");
        fs::write(&path, "[interface A]\n").unwrap();

        let mut watcher = Watcher::new(&path);
        assert!(watcher.poll().unwrap());
        assert!(!watcher.poll().unwrap());

        let file = File::options().write(true).open(&path).unwrap();
        file.set_modified(SystemTime::now() + Duration::from_secs(60)).unwrap();
        assert!(watcher.poll().unwrap());
        assert!(!watcher.poll().unwrap());
    }

    #[test]
    fn test_missing_file_is_an_error_not_a_change() {
        let dir = tempdir().unwrap();
        let mut watcher = Watcher::new(&dir.path().join("missing.yaif"));
        assert!(watcher.poll().is_err());
    }
}
