//! Test helpers for writing problem files into temporary workspaces.

use camino::{Utf8Path, Utf8PathBuf};
use reload_core::Problem;
use reload_core::test_support::ProblemBuilder;
use tempfile::TempDir;

pub(super) fn write_utf8(path: &Utf8Path, contents: &[u8]) {
    std::fs::write(path, contents).expect("write test file");
}

/// A temporary directory holding `problem.json`.
#[derive(Debug)]
pub(super) struct Workspace {
    _dir: TempDir,
    root: Utf8PathBuf,
}

impl Workspace {
    pub(super) fn new() -> Self {
        let dir = TempDir::new().expect("tempdir");
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf-8 workspace");
        Self { _dir: dir, root }
    }

    pub(super) fn root(&self) -> &Utf8Path {
        &self.root
    }

    pub(super) fn problem_path(&self) -> Utf8PathBuf {
        self.root.join("problem.json")
    }

    pub(super) fn write_problem(&self, problem: &Problem) -> Utf8PathBuf {
        let path = self.problem_path();
        let payload = serde_json::to_string_pretty(problem).expect("serialise problem");
        write_utf8(&path, payload.as_bytes());
        path
    }
}

/// Two heavy customers on a line that only fit one vehicle with a reload.
pub(super) fn heavy_line() -> Problem {
    ProblemBuilder::line(3)
        .demands(vec![0, 5, 5])
        .capacity(8)
        .build()
}
