//! The version-control collaborator: a thin `git` subprocess wrapper with
//! wall-clock timeouts.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

use codeindex_core::IndexError;

/// Listing commands (diff, ls-files) get the short budget; content and log
/// commands the long one.
const LIST_TIMEOUT: Duration = Duration::from_secs(10);
const LOG_TIMEOUT: Duration = Duration::from_secs(30);

pub struct Git {
    root: PathBuf,
}

impl Git {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Paths changed versus `reference` (`git diff --name-only`).
    pub fn changed_files(&self, reference: &str) -> Result<Vec<String>, IndexError> {
        let out = self.run(&["diff", "--name-only", reference], LIST_TIMEOUT)?;
        Ok(out.lines().filter(|l| !l.is_empty()).map(String::from).collect())
    }

    /// Untracked paths (`git ls-files --others --exclude-standard`).
    pub fn untracked_files(&self) -> Result<Vec<String>, IndexError> {
        let out = self.run(&["ls-files", "--others", "--exclude-standard"], LIST_TIMEOUT)?;
        Ok(out.lines().filter(|l| !l.is_empty()).map(String::from).collect())
    }

    /// File content at a ref (`git show <ref>:<path>`).
    pub fn show(&self, reference: &str, path: &str) -> Result<String, IndexError> {
        self.run(&["show", &format!("{reference}:{path}")], LOG_TIMEOUT)
    }

    /// Line-range history (`git log -L`), tab-separated
    /// `hash\tauthor\tdate\tsubject` rows.
    pub fn log_range(
        &self,
        path: &str,
        start: usize,
        end: usize,
        limit: usize,
        skip: usize,
    ) -> Result<String, IndexError> {
        self.run(
            &[
                "log",
                &format!("-L{start},{end}:{path}"),
                "--no-patch",
                "--format=%H%x09%an%x09%ad%x09%s",
                "-n",
                &limit.to_string(),
                "--skip",
                &skip.to_string(),
            ],
            LOG_TIMEOUT,
        )
    }

    fn run(&self, args: &[&str], timeout: Duration) -> Result<String, IndexError> {
        let mut child = Command::new("git")
            .arg("-C")
            .arg(&self.root)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|err| IndexError::Vcs(format!("failed to spawn git: {err}")))?;

        // Readers own the pipes so the child can be killed on timeout
        // without deadlocking on a full pipe buffer.
        let stdout = child.stdout.take();
        let stderr = child.stderr.take();
        let out_reader = std::thread::spawn(move || read_lossy(stdout));
        let err_reader = std::thread::spawn(move || read_lossy(stderr));

        let deadline = Instant::now() + timeout;
        let status = loop {
            match child.try_wait() {
                Ok(Some(status)) => break status,
                Ok(None) => {
                    if Instant::now() >= deadline {
                        let _ = child.kill();
                        let _ = child.wait();
                        return Err(IndexError::Vcs(format!(
                            "git {} timed out after {}s",
                            args.first().unwrap_or(&""),
                            timeout.as_secs()
                        )));
                    }
                    std::thread::sleep(Duration::from_millis(10));
                }
                Err(err) => {
                    return Err(IndexError::Vcs(format!("git wait failed: {err}")));
                }
            }
        };

        let stdout = out_reader.join().unwrap_or_default();
        let stderr = err_reader.join().unwrap_or_default();
        if status.success() {
            Ok(stdout)
        } else {
            Err(IndexError::Vcs(format!(
                "git {} failed: {}",
                args.first().unwrap_or(&""),
                stderr.trim()
            )))
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

fn read_lossy(pipe: Option<impl Read>) -> String {
    let Some(mut pipe) = pipe else {
        return String::new();
    };
    let mut buf = Vec::new();
    let _ = pipe.read_to_end(&mut buf);
    String::from_utf8_lossy(&buf).into_owned()
}
