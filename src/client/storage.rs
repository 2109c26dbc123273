//! Remembers the last address that subscribed successfully, so the form
//! can be prefilled next time. Storage is best-effort everywhere.

use std::io;
use std::path::PathBuf;
use std::sync::Mutex;

pub trait EmailStore {
    fn load(&self) -> Option<String>;
    fn save(&self, email: &str) -> io::Result<()>;
}

/// Keeps the address in a single plain-text file.
pub struct FileEmailStore {
    path: PathBuf,
}

impl FileEmailStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl EmailStore for FileEmailStore {
    fn load(&self) -> Option<String> {
        let stored = std::fs::read_to_string(&self.path).ok()?;
        let stored = stored.trim();
        (!stored.is_empty()).then(|| stored.to_owned())
    }

    fn save(&self, email: &str) -> io::Result<()> {
        std::fs::write(&self.path, email)
    }
}

#[derive(Default)]
pub struct MemoryEmailStore {
    email: Mutex<Option<String>>,
}

impl EmailStore for MemoryEmailStore {
    fn load(&self) -> Option<String> {
        self.email.lock().ok()?.clone()
    }

    fn save(&self, email: &str) -> io::Result<()> {
        let mut slot = self
            .email
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "email store poisoned"))?;
        *slot = Some(email.to_owned());
        Ok(())
    }
}
