//! Session orchestration.
//!
//! A [`Client`] drives the create, read, update, delete and import lifecycle
//! of any [`Resource`] over a [`Transport`]. Every mutation follows the same
//! sequence:
//!
//! 1. validate and render (no device contact)
//! 2. open a session and take the configuration lock
//! 3. pre-check existence
//! 4. `config_set`, then `commit_conf` with a descriptive comment
//! 5. post-check existence
//!
//! Any failure between taking the lock and committing runs `config_clear`
//! before the error is returned, so the candidate never keeps half-applied
//! lines.

use crate::diag::summary;
use crate::error::{Error, Result};
use crate::resource::{Identity, Resource, check};
use crate::transport::{Session, Transport};
use log::{debug, info, warn};
use setline::Snapshot;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

const SESSION_ERROR: &str = "Session Error";
const COMMAND_ERROR: &str = "Command Error";
const LOCK_ERROR: &str = "Config Lock Error";
const SET_ERROR: &str = "Config Set Error";
const COMMIT_ERROR: &str = "Config Commit Error";

/// Provider options affecting how mutations reach the device.
#[derive(Debug, Clone, Default)]
pub struct Options {
    /// Append create lines to this file instead of committing them
    pub fake_create_set_file: Option<PathBuf>,
    /// Also divert update lines to the set file
    pub fake_update_also: bool,
    /// Also divert delete lines to the set file
    pub fake_delete_also: bool,
}

/// Orchestrates resource lifecycles over one transport.
pub struct Client {
    transport: Box<dyn Transport>,
    options: Options,
    read_lock: Mutex<()>,
    file_lock: Mutex<()>,
}

impl Client {
    /// Create a client.
    pub fn new(transport: Box<dyn Transport>, options: Options) -> Self {
        Self {
            transport,
            options,
            read_lock: Mutex::new(()),
            file_lock: Mutex::new(()),
        }
    }

    /// Provider options.
    pub fn options(&self) -> &Options {
        &self.options
    }

    fn fake_file(&self, enabled: bool) -> Option<&Path> {
        self.options
            .fake_create_set_file
            .as_deref()
            .filter(|_| enabled)
    }

    fn open(&self) -> Result<Box<dyn Session + '_>> {
        self.transport
            .open()
            .map_err(|e| Error::transport(SESSION_ERROR, &e))
    }

    /// Create `planned` on the device and return it as tracked state.
    pub fn create<R: Resource>(&self, planned: &R) -> Result<R> {
        check(planned)?;
        let identity = planned.identity();
        let lines = planned.render()?;

        if let Some(path) = self.fake_file(true) {
            self.append_set_file(path, &lines)?;
            return Ok(planned.clone());
        }

        let mut session = self.open()?;
        let session = session.as_mut();
        locked(session, |s| {
            if exists(s, &R::show_command(&identity))? {
                return Err(Error::PreCheck {
                    summary: summary::DUPLICATE,
                    message: format!("{} {identity} already exists", R::TYPE_NAME),
                });
            }
            for collision in R::collisions(&identity) {
                if exists(s, &collision.command)? {
                    return Err(Error::PreCheck {
                        summary: summary::DUPLICATE,
                        message: format!("{} already exists", collision.what),
                    });
                }
            }
            set_and_commit(s, &lines, &format!("create resource {}", R::TYPE_NAME))
        })?;

        if !exists(session, &R::show_command(&identity))? {
            return Err(Error::PostCheck {
                summary: "Not Found After Commit",
                message: format!(
                    "{} {identity} does not exist after commit => check your config",
                    R::TYPE_NAME
                ),
            });
        }
        info!("created {} {identity}", R::TYPE_NAME);
        Ok(planned.clone())
    }

    /// Read an object, `None` when it is absent from the device.
    pub fn read<R: Resource>(&self, identity: &Identity) -> Result<Option<R>> {
        let _guard = self.read_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut session = self.open()?;
        let raw = session
            .command(&R::show_command(identity))
            .map_err(|e| Error::transport(COMMAND_ERROR, &e))?;
        let snapshot = Snapshot::parse(&raw);
        if snapshot.is_empty() {
            debug!("{} {identity} not found", R::TYPE_NAME);
            return Ok(None);
        }
        Ok(Some(R::parse(identity, &snapshot)?))
    }

    /// Refresh tracked state.
    ///
    /// When creates are diverted to a set file the device never sees them, so
    /// the prior state is kept as is.
    pub fn refresh<R: Resource>(&self, prior: &R) -> Result<Option<R>> {
        if self.options.fake_create_set_file.is_some() {
            debug!("set file mode, keeping {} {}", R::TYPE_NAME, prior.identity());
            return Ok(Some(prior.clone()));
        }
        self.read(&prior.identity())
    }

    /// Replace `prior` with `planned` in one commit.
    pub fn update<R: Resource>(&self, prior: &R, planned: &R) -> Result<R> {
        let identity = prior.identity();
        if planned.identity() != identity {
            return Err(Error::PreCheck {
                summary: "Pre Check Error",
                message: format!(
                    "{} identity cannot change in place ({identity} => {})",
                    R::TYPE_NAME,
                    planned.identity()
                ),
            });
        }
        check(planned)?;
        let mut lines = R::delete_lines(&identity);
        lines.extend(planned.render()?);

        if let Some(path) = self.fake_file(self.options.fake_update_also) {
            self.append_set_file(path, &lines)?;
            return Ok(planned.clone());
        }

        let mut session = self.open()?;
        let session = session.as_mut();
        locked(session, |s| {
            ensure_exists::<R, _>(s, &identity)?;
            set_and_commit(s, &lines, &format!("update resource {}", R::TYPE_NAME))
        })?;

        if !exists(session, &R::show_command(&identity))? {
            return Err(Error::PostCheck {
                summary: "Not Found After Commit",
                message: format!(
                    "{} {identity} does not exist after commit => check your config",
                    R::TYPE_NAME
                ),
            });
        }
        info!("updated {} {identity}", R::TYPE_NAME);
        Ok(planned.clone())
    }

    /// Delete `prior` and its whole subtree.
    pub fn delete<R: Resource>(&self, prior: &R) -> Result<()> {
        let identity = prior.identity();
        let lines = R::delete_lines(&identity);

        if let Some(path) = self.fake_file(self.options.fake_delete_also) {
            return self.append_set_file(path, &lines);
        }

        let mut session = self.open()?;
        let session = session.as_mut();
        locked(session, |s| {
            ensure_exists::<R, _>(s, &identity)?;
            set_and_commit(s, &lines, &format!("delete resource {}", R::TYPE_NAME))
        })?;

        if exists(session, &R::show_command(&identity))? {
            return Err(Error::PostCheck {
                summary: "Still Exists After Commit",
                message: format!(
                    "{} {identity} still exists after commit => check your config",
                    R::TYPE_NAME
                ),
            });
        }
        info!("deleted {} {identity}", R::TYPE_NAME);
        Ok(())
    }

    /// Adopt an existing object by import ID.
    pub fn import<R: Resource>(&self, id: &str) -> Result<R> {
        let identity = R::IMPORT_FORMAT.parse(id)?;
        self.read(&identity)?.ok_or_else(|| Error::NotFound {
            message: format!(
                "don't find {} with id {id:?} (id must be {})",
                R::TYPE_NAME,
                R::IMPORT_FORMAT.describe()
            ),
        })
    }

    fn append_set_file(&self, path: &Path, lines: &[String]) -> Result<()> {
        let _guard = self.file_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        for line in lines {
            writeln!(file, "{line}")?;
        }
        debug!("appended {} line(s) to {}", lines.len(), path.display());
        Ok(())
    }
}

/// Take the lock, run `op`, and clear the candidate if it fails.
fn locked<S, T>(session: &mut S, op: impl FnOnce(&mut S) -> Result<T>) -> Result<T>
where
    S: Session + ?Sized,
{
    session
        .config_lock()
        .map_err(|e| Error::transport(LOCK_ERROR, &e))?;
    match op(session) {
        Ok(value) => Ok(value),
        Err(err) => {
            let warnings = session.config_clear();
            for w in &warnings {
                warn!("{}: {w}", summary::CLEAR_WARNING);
            }
            Err(err.with_warnings(summary::CLEAR_WARNING, &warnings))
        }
    }
}

fn set_and_commit<S>(session: &mut S, lines: &[String], comment: &str) -> Result<()>
where
    S: Session + ?Sized,
{
    session
        .config_set(lines)
        .map_err(|e| Error::transport(SET_ERROR, &e))?;
    let warnings = session
        .commit_conf(comment)
        .map_err(|e| Error::transport(COMMIT_ERROR, &e))?;
    for w in &warnings {
        warn!("{}: {w}", summary::COMMIT_WARNING);
    }
    Ok(())
}

fn exists<S>(session: &mut S, command: &str) -> Result<bool>
where
    S: Session + ?Sized,
{
    let raw = session
        .command(command)
        .map_err(|e| Error::transport(COMMAND_ERROR, &e))?;
    Ok(!Snapshot::parse(&raw).is_empty())
}

fn ensure_exists<R, S>(session: &mut S, identity: &Identity) -> Result<()>
where
    R: Resource,
    S: Session + ?Sized,
{
    if exists(session, &R::show_command(identity))? {
        Ok(())
    } else {
        Err(Error::PreCheck {
            summary: "Not Found",
            message: format!("{} {identity} doesn't exist", R::TYPE_NAME),
        })
    }
}
