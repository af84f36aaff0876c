use crate::error::Result;
use crate::process;
use chrono::NaiveDate;
use log::{debug, info, warn};
use std::path::{Path, PathBuf};

const GIT: &str = "git";

/// The operations the snapshot orchestrator needs from a working copy.
pub trait Vcs {
    fn workdir(&self) -> &Path;
    fn main_branch(&self) -> &str;
    fn checkout(&self, reference: &str) -> Result<()>;
}

/// A local clone of a tracked repository, driven through the `git` binary.
pub struct GitRepo {
    path: PathBuf,
    main_branch: String,
}

impl GitRepo {
    /// Open an existing working copy at `path`.
    pub fn open<P: AsRef<Path>>(path: P, main_branch: &str) -> Result<Self> {
        let repo = gix::open(path.as_ref())?;
        let path = repo.workdir().unwrap_or_else(|| repo.path()).to_path_buf();

        Ok(Self {
            path,
            main_branch: main_branch.to_string(),
        })
    }

    pub fn is_cloned<P: AsRef<Path>>(path: P) -> bool {
        gix::open(path.as_ref()).is_ok()
    }

    /// Clone `remote` into `base_dir/name`. Fails if the destination exists.
    pub fn clone_into(remote: &str, name: &str, base_dir: &Path, main_branch: &str) -> Result<Self> {
        info!("Cloning {remote} into {}", base_dir.join(name).display());
        git(["clone", remote, name], base_dir)?;
        Self::open(base_dir.join(name), main_branch)
    }

    /// Clone the project if its working copy is missing, otherwise bring it
    /// up to date with the remote main branch.
    pub fn sync(remote: &str, name: &str, base_dir: &Path, main_branch: &str) -> Result<Self> {
        let dest = base_dir.join(name);
        if Self::is_cloned(&dest) {
            info!("Working copy {} exists, updating it", dest.display());
            let repo = Self::open(&dest, main_branch)?;
            repo.update()?;
            Ok(repo)
        } else {
            Self::clone_into(remote, name, base_dir, main_branch)
        }
    }

    /// Discard local changes and untracked files, switch to the main branch and pull.
    pub fn update(&self) -> Result<()> {
        git(["reset", "--hard"], &self.path)?;
        git(["clean", "-fd"], &self.path)?;
        git(["checkout", self.main_branch.as_str()], &self.path)?;
        git(["pull"], &self.path)?;
        Ok(())
    }

    /// Raw `git log` output in `format`, optionally limited to commits on or after `since`.
    pub fn log(&self, format: &str, since: Option<NaiveDate>) -> Result<String> {
        let mut args = vec!["log".to_string(), format!("--pretty=format:{format}")];
        if let Some(since) = since {
            args.push(format!("--since={} 00:00:00 +0000", since.format("%Y-%m-%d")));
        }
        debug!("Reading history of {} (since {:?})", self.path.display(), since);
        process::run(GIT, &args, &self.path).into_stdout(GIT)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Vcs for GitRepo {
    fn workdir(&self) -> &Path {
        &self.path
    }

    fn main_branch(&self) -> &str {
        &self.main_branch
    }

    fn checkout(&self, reference: &str) -> Result<()> {
        debug!("Checking out {reference}");
        git(["checkout", "--quiet", reference], &self.path)?;
        Ok(())
    }
}

fn git<const N: usize>(args: [&str; N], cwd: &Path) -> Result<String> {
    process::run(GIT, args, cwd).into_stdout(GIT)
}

/// Puts the working copy back on its main branch when dropped.
///
/// Call [`RestoreGuard::restore`] on the success path to observe checkout
/// errors; on any other exit the drop handler restores and only logs.
pub struct RestoreGuard<'a, V: Vcs + ?Sized> {
    vcs: &'a V,
    armed: bool,
}

impl<'a, V: Vcs + ?Sized> RestoreGuard<'a, V> {
    pub fn new(vcs: &'a V) -> Self {
        Self { vcs, armed: true }
    }

    pub fn restore(mut self) -> Result<()> {
        self.armed = false;
        self.vcs.checkout(self.vcs.main_branch())
    }
}

impl<V: Vcs + ?Sized> Drop for RestoreGuard<'_, V> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        if let Err(e) = self.vcs.checkout(self.vcs.main_branch()) {
            warn!(
                "Failed to restore {} to {}: {e}",
                self.vcs.workdir().display(),
                self.vcs.main_branch()
            );
        }
    }
}
