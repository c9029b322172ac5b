// asv-collect - Benchmark result collection tool
// Copyright (c) 2025 Oliver Seifert
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published
// by the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! Commit resolution against the project repository.

use anyhow::{Context, Result};
use git2::{Oid, Repository};
use std::path::Path;

/// Source-control access needed to collect results.
pub trait Repo {
    /// Resolve a branch, tag or other revision name to its commit hash.
    fn get_hash_from_name(&self, name: &str) -> Result<String>;

    /// Resolve a range expression to commit hashes, newest first.
    fn get_hashes_from_range(&self, range_spec: &str) -> Result<Vec<String>>;

    /// Content of `path` in the tree of `commit_hash`, `None` if the path does not exist there.
    fn read_file(&self, commit_hash: &str, path: &Path) -> Result<Option<Vec<u8>>>;
}

pub struct GitRepo {
    repo: Repository,
}

impl GitRepo {
    pub fn open(path: &Path) -> Result<Self> {
        let repo = Repository::discover(path)
            .with_context(|| format!("Failed to open git repository at {}", path.display()))?;
        log::debug!("Using repository at {}", repo.path().display());
        Ok(Self { repo })
    }

    fn resolve_oid(&self, name: &str) -> Result<Oid> {
        let commit = self
            .repo
            .revparse_single(name)
            .and_then(|object| object.peel_to_commit())
            .with_context(|| format!("Unknown commit or branch: {}", name))?;
        Ok(commit.id())
    }

    fn walk(&self, include: &[Oid], exclude: &[Oid]) -> Result<Vec<String>> {
        let mut revwalk = self.repo.revwalk()?;
        revwalk.set_sorting(git2::Sort::TOPOLOGICAL | git2::Sort::TIME)?;
        revwalk.simplify_first_parent()?;

        for oid in include {
            revwalk.push(*oid)?;
        }
        for oid in exclude {
            revwalk.hide(*oid)?;
        }

        let mut hashes = Vec::new();
        for oid in revwalk {
            hashes.push(oid?.to_string());
        }
        Ok(hashes)
    }
}

impl Repo for GitRepo {
    fn get_hash_from_name(&self, name: &str) -> Result<String> {
        Ok(self.resolve_oid(name)?.to_string())
    }

    fn get_hashes_from_range(&self, range_spec: &str) -> Result<Vec<String>> {
        // `rev^!` names exactly one commit
        if let Some(name) = range_spec.strip_suffix("^!") {
            return Ok(vec![self.get_hash_from_name(name)?]);
        }

        let revspec = self
            .repo
            .revparse(range_spec)
            .with_context(|| format!("Invalid range spec: {}", range_spec))?;

        let peel = |object: Option<&git2::Object>| -> Result<Option<Oid>> {
            match object {
                Some(object) => Ok(Some(object.peel_to_commit()?.id())),
                None => Ok(None),
            }
        };
        let from = peel(revspec.from())?;
        let to = peel(revspec.to())?;
        let mode = revspec.mode();

        let hashes = match (from, to) {
            (Some(from), Some(to)) if mode.contains(git2::RevparseMode::MERGE_BASE) => {
                let base = self.repo.merge_base(from, to)?;
                self.walk(&[from, to], &[base])?
            }
            (Some(from), Some(to)) => self.walk(&[to], &[from])?,
            (Some(single), None) | (None, Some(single)) => self.walk(&[single], &[])?,
            (None, None) => anyhow::bail!("Range spec resolved to nothing: {}", range_spec),
        };

        log::debug!("Range {} resolved to {} commits", range_spec, hashes.len());
        Ok(hashes)
    }

    fn read_file(&self, commit_hash: &str, path: &Path) -> Result<Option<Vec<u8>>> {
        let oid = Oid::from_str(commit_hash)?;
        let commit = self.repo.find_commit(oid)?;
        let tree = commit.tree()?;

        let entry = match tree.get_path(path) {
            Ok(entry) => entry,
            Err(e) if e.code() == git2::ErrorCode::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let object = entry.to_object(&self.repo)?;
        let blob = object
            .as_blob()
            .ok_or_else(|| anyhow::anyhow!("Not a blob: {}", path.display()))?;

        Ok(Some(blob.content().to_vec()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    /// Build a linear history; each commit adds one file. Returns hashes oldest first.
    fn linear_repo(commits: usize) -> (TempDir, Vec<String>) {
        let dir = tempfile::tempdir().unwrap();
        let repo = Repository::init(dir.path()).unwrap();

        let mut hashes = Vec::new();
        let mut parent: Option<Oid> = None;
        for i in 0..commits {
            let blob = repo.blob(format!("content {}", i).as_bytes()).unwrap();
            let mut builder = match parent {
                Some(p) => repo
                    .treebuilder(Some(&repo.find_commit(p).unwrap().tree().unwrap()))
                    .unwrap(),
                None => repo.treebuilder(None).unwrap(),
            };
            builder
                .insert(format!("file{}.txt", i), blob, 0o100644)
                .unwrap();
            let tree = repo.find_tree(builder.write().unwrap()).unwrap();
            let sig = git2::Signature::new(
                "Test",
                "test@example.com",
                &git2::Time::new(1_700_000_000 + i as i64 * 60, 0),
            )
            .unwrap();
            let parents: Vec<git2::Commit> = parent
                .map(|p| vec![repo.find_commit(p).unwrap()])
                .unwrap_or_default();
            let parent_refs: Vec<&git2::Commit> = parents.iter().collect();
            let oid = repo
                .commit(
                    Some("HEAD"),
                    &sig,
                    &sig,
                    &format!("commit {}", i),
                    &tree,
                    &parent_refs,
                )
                .unwrap();
            hashes.push(oid.to_string());
            parent = Some(oid);
        }
        (dir, hashes)
    }

    #[test]
    fn test_hash_from_name() {
        let (dir, hashes) = linear_repo(3);
        let repo = GitRepo::open(dir.path()).unwrap();

        assert_eq!(repo.get_hash_from_name("HEAD").unwrap(), hashes[2]);
        assert_eq!(repo.get_hash_from_name("HEAD~2").unwrap(), hashes[0]);
        assert!(repo.get_hash_from_name("no-such-branch").is_err());
    }

    #[test]
    fn test_range_excludes_lower_bound() {
        let (dir, hashes) = linear_repo(4);
        let repo = GitRepo::open(dir.path()).unwrap();

        let range = format!("{}..HEAD", hashes[1]);
        let resolved = repo.get_hashes_from_range(&range).unwrap();
        assert_eq!(resolved, vec![hashes[3].clone(), hashes[2].clone()]);
    }

    #[test]
    fn test_single_revision_walks_ancestors() {
        let (dir, hashes) = linear_repo(3);
        let repo = GitRepo::open(dir.path()).unwrap();

        let resolved = repo.get_hashes_from_range("HEAD~1").unwrap();
        assert_eq!(resolved, vec![hashes[1].clone(), hashes[0].clone()]);
    }

    #[test]
    fn test_single_commit_range() {
        let (dir, hashes) = linear_repo(3);
        let repo = GitRepo::open(dir.path()).unwrap();

        let resolved = repo.get_hashes_from_range("HEAD~1^!").unwrap();
        assert_eq!(resolved, vec![hashes[1].clone()]);
    }

    #[test]
    fn test_invalid_range_is_an_error() {
        let (dir, _) = linear_repo(1);
        let repo = GitRepo::open(dir.path()).unwrap();

        let err = repo.get_hashes_from_range("nope..HEAD").unwrap_err();
        assert!(err.to_string().contains("Invalid range spec"));
    }

    #[test]
    fn test_read_file_at_commit() {
        let (dir, hashes) = linear_repo(2);
        let repo = GitRepo::open(dir.path()).unwrap();

        let content = repo.read_file(&hashes[1], Path::new("file0.txt")).unwrap();
        assert_eq!(content.as_deref(), Some(&b"content 0"[..]));
        assert!(
            repo.read_file(&hashes[0], Path::new("file1.txt"))
                .unwrap()
                .is_none()
        );
    }
}
