//! Git repository detection and baseline resolution

use std::path::{Path, PathBuf};

use git2::Repository;
use tracing::debug;

use crate::{Error, Result};

/// A git repository wrapper providing revet-specific operations
pub struct GitRepo {
    /// The underlying git2 repository
    repo: Repository,
    /// Path to the repository root
    root: PathBuf,
}

impl std::fmt::Debug for GitRepo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitRepo")
            .field("root", &self.root)
            .finish_non_exhaustive()
    }
}

impl GitRepo {
    /// Open a git repository at the given path
    ///
    /// This will search upward from the given path to find the repository root.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let repo = Repository::discover(path).map_err(|e| {
            if e.code() == git2::ErrorCode::NotFound {
                Error::Config(format!(
                    "Not a git repository: {}. Run 'git init' first or navigate to a git repository.",
                    path.display()
                ))
            } else {
                Error::Git(e.to_string())
            }
        })?;

        let root = repo
            .workdir()
            .ok_or_else(|| Error::Config("Bare repositories are not supported".to_string()))?
            .to_path_buf();

        Ok(Self { repo, root })
    }

    /// Get the repository root path
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Check if the given path is inside a git repository
    pub fn is_git_repo(path: impl AsRef<Path>) -> bool {
        Repository::discover(path.as_ref()).is_ok()
    }

    /// Get the default branch name (main or master)
    pub fn default_branch(&self) -> Result<String> {
        // Check if origin/main exists
        if self.repo.find_reference("refs/remotes/origin/main").is_ok() {
            return Ok("main".to_string());
        }

        // Check if origin/master exists
        if self
            .repo
            .find_reference("refs/remotes/origin/master")
            .is_ok()
        {
            return Ok("master".to_string());
        }

        // Check local main
        if self.repo.find_reference("refs/heads/main").is_ok() {
            return Ok("main".to_string());
        }

        // Check local master
        if self.repo.find_reference("refs/heads/master").is_ok() {
            return Ok("master".to_string());
        }

        // Default to main
        Ok("main".to_string())
    }

    /// Resolve a baseline reference to the tree it points at.
    ///
    /// Resolution priority:
    /// 1. Remote tracking branch (refs/remotes/...)
    /// 2. Local branch (refs/heads/...)
    /// 3. Direct revision (commit SHA, tag, HEAD~2, ...)
    pub fn resolve_tree(&self, reference: &str) -> Result<git2::Tree<'_>> {
        let repo = &self.repo;

        if let Ok(remote_ref) = repo.find_reference(&format!("refs/remotes/{}", reference)) {
            debug!(reference, "Resolved baseline as remote tracking branch");
            return remote_ref
                .peel_to_tree()
                .map_err(|e| Error::Git(format!("Failed to resolve {}: {}", reference, e)));
        }

        if let Ok(local_ref) = repo.find_reference(&format!("refs/heads/{}", reference)) {
            debug!(reference, "Resolved baseline as local branch");
            return local_ref
                .peel_to_tree()
                .map_err(|e| Error::Git(format!("Failed to resolve {}: {}", reference, e)));
        }

        if let Ok(object) = repo.revparse_single(reference) {
            debug!(reference, "Resolved baseline as revision");
            return object
                .peel_to_tree()
                .map_err(|e| Error::Git(format!("Failed to resolve {}: {}", reference, e)));
        }

        Err(Error::BaselineNotFound {
            reference: reference.to_string(),
        })
    }

    /// The tree at HEAD, or `None` on an unborn branch (fresh repository
    /// with no commits).
    pub fn head_tree(&self) -> Result<Option<git2::Tree<'_>>> {
        let head = match self.repo.head() {
            Ok(h) => h,
            Err(e) if e.code() == git2::ErrorCode::UnbornBranch => return Ok(None),
            Err(e) => return Err(Error::Git(format!("Failed to get HEAD: {}", e))),
        };

        let tree = head
            .peel_to_tree()
            .map_err(|e| Error::Git(format!("Failed to resolve HEAD tree: {}", e)))?;
        Ok(Some(tree))
    }

    /// Get access to the underlying git2 repository
    pub(crate) fn inner(&self) -> &Repository {
        &self.repo
    }
}
