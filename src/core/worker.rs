//! Worker threads for the lfr core operations.
//!
//! Handles directory reads, directory size calculation and file operations on background
//! threads. Requests [WorkerTask] come in from the [crate::app::AppState] via channels, and
//! results or errors [WorkerResponse] go back the same way. `AppState::tick` drains the
//! responses and applies them.
//!
//! # Caution:
//! This module is a protocol boundary. Adding or editing variants requires matching changes
//! in the response handling of the application state.

use crate::core::fm::{self, FileEntry};
use crate::utils::{copy_recursive, get_unused_path, move_path, remove_path};

use crossbeam_channel::{Receiver, Sender, unbounded};

use std::collections::BTreeSet;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;

/// Manages the worker thread channels for the different task types.
///
/// Directory loads, size calculations and file operations each have their own thread, so a
/// slow copy never delays a directory listing.
pub struct Workers {
    io_tx: Sender<WorkerTask>,
    size_tx: Sender<WorkerTask>,
    fileop_tx: Sender<WorkerTask>,
    response_rx: Receiver<WorkerResponse>,
}

impl Workers {
    /// Create the worker set.
    pub fn spawn() -> Self {
        let (io_tx, io_rx) = unbounded::<WorkerTask>();
        let (size_tx, size_rx) = unbounded::<WorkerTask>();
        let (fileop_tx, fileop_rx) = unbounded::<WorkerTask>();
        let (res_tx, response_rx) = unbounded::<WorkerResponse>();

        start_io_worker(io_rx, res_tx.clone());
        start_size_worker(size_rx, res_tx.clone());
        start_fileop_worker(fileop_rx, res_tx);

        Self {
            io_tx,
            size_tx,
            fileop_tx,
            response_rx,
        }
    }

    /// Sends a task to the thread that handles its kind.
    ///
    /// Returns false if the worker is gone.
    pub fn submit(&self, task: WorkerTask) -> bool {
        let tx = match task {
            WorkerTask::LoadDirectory { .. } => &self.io_tx,
            WorkerTask::CalcDirSize { .. } => &self.size_tx,
            WorkerTask::FileOp { .. } => &self.fileop_tx,
        };
        match tx.send(task) {
            Ok(()) => true,
            Err(e) => {
                log::warn!("worker channel closed: {}", e);
                false
            }
        }
    }

    /// Accessor for the worker response receiver.
    pub fn response_rx(&self) -> &Receiver<WorkerResponse> {
        &self.response_rx
    }
}

/// Tasks sent to the worker threads.
#[derive(Debug)]
pub enum WorkerTask {
    LoadDirectory {
        path: PathBuf,
        dircounts: bool,
        request_id: u64,
    },
    /// Fills in the size of every directory among `entries`.
    CalcDirSize {
        entries: Vec<Arc<FileEntry>>,
        request_id: u64,
    },
    FileOp {
        op: FileOperation,
        request_id: u64,
    },
}

/// Supported file system operations the worker can perform.
#[derive(Debug, Clone)]
pub enum FileOperation {
    Delete(Vec<PathBuf>),
    Rename { old: PathBuf, new: PathBuf },
    Paste {
        src: Vec<PathBuf>,
        dest: PathBuf,
        cut: bool,
    },
}

/// Responses sent from the worker threads back to the application state.
#[derive(Debug)]
pub enum WorkerResponse {
    DirectoryLoaded {
        path: PathBuf,
        entries: Vec<FileEntry>,
        request_id: u64,
    },
    DirectoryFailed {
        path: PathBuf,
        error: io::Error,
        request_id: u64,
    },
    DirSizeComputed {
        computed: usize,
        request_id: u64,
    },
    OperationComplete {
        message: String,
        errors: Vec<String>,
        /// Directories whose listing changed.
        reload: Vec<PathBuf>,
        /// Name to put the cursor on after reloading.
        focus: Option<String>,
        request_id: u64,
    },
}

fn start_io_worker(task_rx: Receiver<WorkerTask>, res_tx: Sender<WorkerResponse>) {
    thread::spawn(move || {
        while let Ok(task) = task_rx.recv() {
            let WorkerTask::LoadDirectory {
                path,
                dircounts,
                request_id,
            } = task
            else {
                continue;
            };
            let response = match fm::read_dir(&path, dircounts) {
                Ok(entries) => WorkerResponse::DirectoryLoaded {
                    path,
                    entries,
                    request_id,
                },
                Err(error) => WorkerResponse::DirectoryFailed {
                    path,
                    error,
                    request_id,
                },
            };
            let _ = res_tx.send(response);
        }
    });
}

fn start_size_worker(task_rx: Receiver<WorkerTask>, res_tx: Sender<WorkerResponse>) {
    thread::spawn(move || {
        while let Ok(task) = task_rx.recv() {
            let WorkerTask::CalcDirSize {
                entries,
                request_id,
            } = task
            else {
                continue;
            };

            let mut computed = 0;
            for entry in entries.iter().filter(|e| e.is_dir()) {
                match fm::calc_dir_size(entry.path()) {
                    Ok(size) => {
                        entry.set_dir_size(size);
                        computed += 1;
                    }
                    Err(e) => log::info!("calculating size of {}: {}", entry.path().display(), e),
                }
            }
            let _ = res_tx.send(WorkerResponse::DirSizeComputed {
                computed,
                request_id,
            });
        }
    });
}

fn start_fileop_worker(task_rx: Receiver<WorkerTask>, res_tx: Sender<WorkerResponse>) {
    thread::spawn(move || {
        while let Ok(task) = task_rx.recv() {
            let WorkerTask::FileOp { op, request_id } = task else {
                continue;
            };
            let _ = res_tx.send(execute_file_op(op, request_id));
        }
    });
}

/// Runs a file operation on the calling thread and builds the response a worker would send.
///
/// Used directly when the application state runs without workers.
pub fn execute_file_op(op: FileOperation, request_id: u64) -> WorkerResponse {
    let (message, errors, reload, focus) = run_file_op(op);
    WorkerResponse::OperationComplete {
        message,
        errors,
        reload: reload.into_iter().collect(),
        focus,
        request_id,
    }
}

type OpResult = (String, Vec<String>, BTreeSet<PathBuf>, Option<String>);

/// Runs one operation to the end; a failing item does not stop the remaining ones.
fn run_file_op(op: FileOperation) -> OpResult {
    let mut errors = Vec::new();
    let mut reload = BTreeSet::new();
    let mut focus = None;

    let message = match op {
        FileOperation::Delete(paths) => {
            let mut done = 0;
            for p in paths {
                if let Some(parent) = p.parent() {
                    reload.insert(parent.to_path_buf());
                }
                match remove_path(&p) {
                    Ok(()) => done += 1,
                    Err(e) => errors.push(format!("delete {}: {}", p.display(), e)),
                }
            }
            format!("deleted {} item(s)", done)
        }
        FileOperation::Rename { old, new } => {
            for p in [&old, &new] {
                if let Some(parent) = p.parent() {
                    reload.insert(parent.to_path_buf());
                }
            }
            if new.exists() {
                errors.push(format!("rename: '{}' already exists", new.display()));
            } else {
                match std::fs::rename(&old, &new) {
                    Ok(()) => focus = new.file_name().map(|n| n.to_string_lossy().into_owned()),
                    Err(e) => errors.push(format!("rename {}: {}", old.display(), e)),
                }
            }
            "renamed".to_string()
        }
        FileOperation::Paste { src, dest, cut } => {
            reload.insert(dest.clone());
            let mut done = 0;
            for s in src {
                let Some(name) = s.file_name() else {
                    continue;
                };
                let target = get_unused_path(&dest.join(name));
                let res = if cut {
                    if let Some(parent) = s.parent() {
                        reload.insert(parent.to_path_buf());
                    }
                    move_path(&s, &target)
                } else {
                    copy_recursive(&s, &target)
                };
                match res {
                    Ok(()) => {
                        done += 1;
                        focus = target.file_name().map(|n| n.to_string_lossy().into_owned());
                    }
                    Err(e) => errors.push(format!("paste {}: {}", s.display(), e)),
                }
            }
            format!("pasted {} item(s)", done)
        }
    };

    (message, errors, reload, focus)
}

#[cfg(test)]
mod tests {
    use super::*;

    use rand::seq::SliceRandom;
    use rand::{Rng, rng};
    use std::fs::{self, File};
    use std::time::Duration;
    use tempfile::tempdir;

    const TIMEOUT: Duration = Duration::from_secs(5);

    #[test]
    fn test_worker_load_dir() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        File::create(dir.path().join("a.txt"))?;
        fs::create_dir(dir.path().join("sub"))?;

        let workers = Workers::spawn();
        assert!(workers.submit(WorkerTask::LoadDirectory {
            path: dir.path().to_path_buf(),
            dircounts: true,
            request_id: 7,
        }));

        match workers.response_rx().recv_timeout(TIMEOUT)? {
            WorkerResponse::DirectoryLoaded {
                entries,
                request_id,
                ..
            } => {
                assert_eq!(request_id, 7);
                assert_eq!(entries.len(), 2);
                let sub = entries
                    .iter()
                    .find(|e| e.name() == "sub")
                    .ok_or("sub missing")?;
                assert_eq!(sub.dir_count(), Some(fm::DirCount::Counted(0)));
            }
            other => panic!("unexpected response {other:?}"),
        }
        Ok(())
    }

    #[test]
    fn test_worker_load_missing_dir() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let workers = Workers::spawn();
        workers.submit(WorkerTask::LoadDirectory {
            path: dir.path().join("gone"),
            dircounts: false,
            request_id: 1,
        });

        match workers.response_rx().recv_timeout(TIMEOUT)? {
            WorkerResponse::DirectoryFailed { error, .. } => {
                assert_eq!(error.kind(), io::ErrorKind::NotFound)
            }
            other => panic!("unexpected response {other:?}"),
        }
        Ok(())
    }

    #[test]
    fn test_calc_dir_size_fills_shared_entries() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let sub = dir.path().join("sub");
        fs::create_dir_all(sub.join("deep"))?;
        fs::write(sub.join("one.bin"), vec![0u8; 100])?;
        fs::write(sub.join("deep/two.bin"), vec![0u8; 50])?;
        fs::write(dir.path().join("file.bin"), vec![0u8; 10])?;

        let mut entries: Vec<Arc<FileEntry>> = fm::read_dir(dir.path(), false)?
            .into_iter()
            .map(Arc::new)
            .collect();
        entries.shuffle(&mut rng());

        let workers = Workers::spawn();
        workers.submit(WorkerTask::CalcDirSize {
            entries: entries.clone(),
            request_id: 3,
        });

        match workers.response_rx().recv_timeout(TIMEOUT)? {
            WorkerResponse::DirSizeComputed { computed, .. } => assert_eq!(computed, 1),
            other => panic!("unexpected response {other:?}"),
        }

        for entry in &entries {
            if entry.name() == "sub" {
                assert_eq!(entry.dir_size(), Some(150));
                assert_eq!(entry.total_size(), 150);
            } else {
                assert_eq!(entry.dir_size(), None);
                assert_eq!(entry.total_size(), 10);
            }
        }
        Ok(())
    }

    #[test]
    fn test_paste_copy_and_cut() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let src_dir = dir.path().join("src");
        let dest = dir.path().join("dest");
        fs::create_dir_all(&src_dir)?;
        fs::create_dir_all(&dest)?;
        fs::write(src_dir.join("notes.txt"), "x")?;
        fs::write(dest.join("notes.txt"), "existing")?;

        let (message, errors, reload, focus) = run_file_op(FileOperation::Paste {
            src: vec![src_dir.join("notes.txt")],
            dest: dest.clone(),
            cut: false,
        });
        assert!(errors.is_empty(), "{errors:?}");
        assert_eq!(message, "pasted 1 item(s)");
        assert_eq!(focus.as_deref(), Some("notes_1.txt"));
        assert!(reload.contains(&dest));
        assert_eq!(fs::read_to_string(dest.join("notes.txt"))?, "existing");
        assert!(src_dir.join("notes.txt").exists());

        let (_, errors, reload, _) = run_file_op(FileOperation::Paste {
            src: vec![src_dir.join("notes.txt")],
            dest: dest.clone(),
            cut: true,
        });
        assert!(errors.is_empty());
        assert!(reload.contains(&src_dir));
        assert!(!src_dir.join("notes.txt").exists());
        assert!(dest.join("notes_2.txt").exists());
        Ok(())
    }

    #[test]
    fn test_rename_and_delete() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let a = dir.path().join("a");
        let b = dir.path().join("b");
        File::create(&a)?;
        File::create(&b)?;

        let (_, errors, _, _) = run_file_op(FileOperation::Rename {
            old: a.clone(),
            new: b.clone(),
        });
        assert_eq!(errors.len(), 1, "renaming onto an existing file must fail");

        let c = dir.path().join("c");
        let (_, errors, _, focus) = run_file_op(FileOperation::Rename {
            old: a.clone(),
            new: c.clone(),
        });
        assert!(errors.is_empty());
        assert_eq!(focus.as_deref(), Some("c"));

        let (message, errors, reload, _) =
            run_file_op(FileOperation::Delete(vec![b.clone(), c.clone(), dir.path().join("nope")]));
        assert_eq!(message, "deleted 2 item(s)");
        assert_eq!(errors.len(), 1);
        assert!(reload.contains(dir.path()));
        assert!(!b.exists() && !c.exists());
        Ok(())
    }

    #[test]
    fn test_many_loads_answer_every_request() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        for i in 0..5 {
            File::create(dir.path().join(format!("f{i}")))?;
        }
        let workers = Workers::spawn();
        let mut r = rng();
        let total = 40;
        for id in 0..total {
            workers.submit(WorkerTask::LoadDirectory {
                path: dir.path().to_path_buf(),
                dircounts: r.random_bool(0.5),
                request_id: id,
            });
        }

        let mut seen = BTreeSet::new();
        for _ in 0..total {
            match workers.response_rx().recv_timeout(TIMEOUT)? {
                WorkerResponse::DirectoryLoaded {
                    entries,
                    request_id,
                    ..
                } => {
                    assert_eq!(entries.len(), 5);
                    seen.insert(request_id);
                }
                other => panic!("unexpected response {other:?}"),
            }
        }
        assert_eq!(seen.len(), total as usize);
        Ok(())
    }
}
