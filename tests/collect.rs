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

//! End-to-end runs of `collect` against a real git repository.

use asv_collect::collect::{self, CollectOptions};
use asv_collect::config::Config;
use git2::{Oid, Repository, Signature, Time};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const SUITE: &str = r#"{
    "time_sum": {"params": [["1", "2"]], "param_names": ["n"], "unit": "seconds"},
    "mem_list": {"params": [], "unit": "bytes"},
    "version": 2
}"#;

struct Project {
    repo: Repository,
    commits: Vec<Oid>,
    dir: TempDir,
}

impl Project {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        fs::write(
            dir.path().join("asv.conf.json"),
            r#"{"project": "demo", "repo": ".", "branches": ["HEAD", "release"], "results_dir": "results"}"#,
        )
        .unwrap();
        fs::write(
            dir.path().join("machine.json"),
            r#"{"box": {"machine": "box", "os": "Linux"}, "version": 1}"#,
        )
        .unwrap();
        Self {
            repo,
            commits: Vec::new(),
            dir,
        }
    }

    fn commit(&mut self, files: &[(&str, &str)]) -> String {
        for (path, content) in files {
            let full = self.dir.path().join(path);
            fs::create_dir_all(full.parent().unwrap()).unwrap();
            fs::write(&full, content).unwrap();
        }

        let mut index = self.repo.index().unwrap();
        for (path, _) in files {
            index.add_path(Path::new(path)).unwrap();
        }
        index.write().unwrap();
        let tree = self.repo.find_tree(index.write_tree().unwrap()).unwrap();

        let sig = Signature::new(
            "Test",
            "test@example.com",
            &Time::new(1_700_000_000 + self.commits.len() as i64 * 60, 0),
        )
        .unwrap();
        let parents: Vec<git2::Commit> = self
            .commits
            .last()
            .map(|oid| vec![self.repo.find_commit(*oid).unwrap()])
            .unwrap_or_default();
        let parent_refs: Vec<&git2::Commit> = parents.iter().collect();
        let oid = self
            .repo
            .commit(Some("HEAD"), &sig, &sig, "commit", &tree, &parent_refs)
            .unwrap();
        self.commits.push(oid);
        oid.to_string()
    }

    fn tag_release(&self) {
        let head = self
            .repo
            .find_commit(*self.commits.last().unwrap())
            .unwrap();
        self.repo.branch("release", &head, true).unwrap();
    }

    fn store_results(&self, commit_hash: &str, results: &str) {
        let machine_dir = self.dir.path().join("results").join("box");
        fs::create_dir_all(&machine_dir).unwrap();
        fs::write(
            machine_dir.join(format!("{}-existing-py.json", &commit_hash[..8])),
            format!(
                r#"{{"commit_hash": "{}", "env_name": "existing-py", "date": 1700000000000, "results": {}}}"#,
                commit_hash, results
            ),
        )
        .unwrap();
    }

    fn config(&self) -> Config {
        Config::load(&self.dir.path().join("asv.conf.json")).unwrap()
    }

    fn options(&self, range: Option<&str>, missing: bool) -> CollectOptions {
        CollectOptions {
            range: range.map(str::to_string),
            missing,
            machine_file: Some(self.machine_file()),
            max_width: 60,
            ..CollectOptions::default()
        }
    }

    fn machine_file(&self) -> PathBuf {
        self.dir.path().join("machine.json")
    }
}

#[test]
fn test_branch_tips_are_deduplicated_and_displayed() {
    let mut project = Project::new();
    project.commit(&[("benchmarks/benchmarks.json", SUITE)]);
    let head = project.commit(&[("src/lib.rs", "// v2")]);
    project.tag_release();
    project.store_results(
        &head,
        r#"{"time_sum": {"params": [["1", "2"]], "result": [0.25, null]}, "mem_list": 2500}"#,
    );

    let mut out: Vec<String> = Vec::new();
    collect::run(&project.config(), &project.options(None, true), &mut out).unwrap();

    let short = &head[..7];
    assert_eq!(
        out,
        vec![
            format!("mem_list for commit {}:\n2.5k", short),
            format!("Missing results for mem_list at commit {}:", short),
            out[2].clone(),
            format!("Missing results for time_sum at commit {}:", short),
            format!("asv run {} --bench \"time_sum\\(2\\)\"", short),
        ]
    );
    assert!(out[2].starts_with(&format!("time_sum for commit {}:\n", short)));
    assert!(out[2].contains("250ms"));
    assert!(out[2].contains("failed"));
}

#[test]
fn test_range_without_results_lists_every_combination() {
    let mut project = Project::new();
    let first = project.commit(&[("benchmarks/benchmarks.json", SUITE)]);
    let second = project.commit(&[("src/lib.rs", "// v2")]);
    let third = project.commit(&[("src/lib.rs", "// v3")]);

    let range = format!("{}..HEAD", first);
    let options = CollectOptions {
        bench: vec!["^time_".to_string()],
        ..project.options(Some(&range), true)
    };
    let mut out: Vec<String> = Vec::new();
    collect::run(&project.config(), &options, &mut out).unwrap();

    // Newest first, one display + header + two commands per commit
    assert_eq!(out.len(), 8);
    assert!(out[0].starts_with(&format!("time_sum for commit {}:", &third[..7])));
    assert!(out[4].starts_with(&format!("time_sum for commit {}:", &second[..7])));
    assert_eq!(out[0].matches("n/a").count(), 2);
    assert_eq!(
        out[3],
        format!("asv run {} --bench \"time_sum\\(2\\)\"", &third[..7])
    );
}

#[test]
fn test_suite_falls_back_to_results_cache() {
    let mut project = Project::new();
    let head = project.commit(&[("README.md", "no suite here")]);
    fs::create_dir_all(project.dir.path().join("results")).unwrap();
    fs::write(
        project.dir.path().join("results").join("benchmarks.json"),
        r#"{"time_cached": {"params": []}}"#,
    )
    .unwrap();

    let mut out: Vec<String> = Vec::new();
    collect::run(
        &project.config(),
        &project.options(Some(&format!("{}^!", head)), false),
        &mut out,
    )
    .unwrap();

    assert_eq!(
        out,
        vec![format!("time_cached for commit {}:\nn/a", &head[..7])]
    );
}

#[test]
fn test_unknown_range_propagates() {
    let mut project = Project::new();
    project.commit(&[("benchmarks/benchmarks.json", SUITE)]);

    let mut out: Vec<String> = Vec::new();
    let err = collect::run(
        &project.config(),
        &project.options(Some("no-such-tag..HEAD"), false),
        &mut out,
    )
    .unwrap_err();
    assert!(err.to_string().contains("Invalid range spec"));
    assert!(out.is_empty());
}

#[test]
fn test_missing_machine_file_propagates() {
    let mut project = Project::new();
    project.commit(&[("benchmarks/benchmarks.json", SUITE)]);

    let options = CollectOptions {
        machine_file: Some(project.dir.path().join("absent.json")),
        ..project.options(None, false)
    };
    let mut out: Vec<String> = Vec::new();
    // The configured `release` branch does not exist yet
    assert!(collect::run(&project.config(), &options, &mut out).is_err());

    project.tag_release();
    let err = collect::run(&project.config(), &options, &mut out).unwrap_err();
    assert!(err.to_string().contains("No machine information file"));
}
