//! Size-based log rotation: `app.log`, then `app.log.1` (newest) up to `app.log.N`.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing_subscriber::fmt::MakeWriter;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RotationPolicy {
    /// Rotated generations kept besides the live file
    pub keep: usize,
    pub max_bytes: u64,
}

impl Default for RotationPolicy {
    fn default() -> Self {
        Self {
            keep: 4,
            max_bytes: 10 * 1024 * 1024,
        }
    }
}

struct LiveFile {
    file: File,
    written: u64,
}

/// A log file shared by every tracing event; cloning shares the handle.
#[derive(Clone)]
pub struct RotatingFile {
    base: PathBuf,
    policy: RotationPolicy,
    live: Arc<Mutex<LiveFile>>,
}

impl RotatingFile {
    pub fn open(dir: &Path, app_name: &str, policy: RotationPolicy) -> io::Result<Self> {
        fs::create_dir_all(dir)?;
        let base = dir.join(format!("{}.log", file_stem(app_name)));
        let live = open_live(&base)?;
        let rotating = Self {
            base,
            policy,
            live: Arc::new(Mutex::new(live)),
        };
        {
            let mut live = rotating.lock()?;
            if live.written > policy.max_bytes {
                rotating.roll(&mut live)?;
            }
        }
        Ok(rotating)
    }

    pub fn path(&self) -> &Path {
        &self.base
    }

    fn generation(&self, n: usize) -> PathBuf {
        let mut name = self.base.clone().into_os_string();
        name.push(format!(".{}", n));
        PathBuf::from(name)
    }

    fn lock(&self) -> io::Result<MutexGuard<'_, LiveFile>> {
        self.live
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "log file lock poisoned"))
    }

    fn roll(&self, live: &mut LiveFile) -> io::Result<()> {
        live.file.flush()?;
        if self.policy.keep == 0 {
            fs::remove_file(&self.base)?;
        } else {
            let _ = fs::remove_file(self.generation(self.policy.keep));
            for n in (1..self.policy.keep).rev() {
                let from = self.generation(n);
                if from.exists() {
                    fs::rename(&from, self.generation(n + 1))?;
                }
            }
            fs::rename(&self.base, self.generation(1))?;
        }
        *live = open_live(&self.base)?;
        Ok(())
    }

    fn append(&self, buf: &[u8]) -> io::Result<usize> {
        let mut live = self.lock()?;
        if live.written > 0 && live.written + buf.len() as u64 > self.policy.max_bytes {
            self.roll(&mut live)?;
        }
        let n = live.file.write(buf)?;
        live.written += n as u64;
        Ok(n)
    }
}

impl Write for RotatingFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.append(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.lock()?.file.flush()
    }
}

impl<'a> MakeWriter<'a> for RotatingFile {
    type Writer = RotatingFile;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

fn open_live(path: &Path) -> io::Result<LiveFile> {
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let written = file.metadata()?.len();
    Ok(LiveFile { file, written })
}

fn file_stem(app_name: &str) -> String {
    app_name
        .chars()
        .map(|c| match c {
            'a'..='z' | 'A'..='Z' | '0'..='9' | '-' | '_' => c,
            _ => '_',
        })
        .collect()
}
