//! End-to-end runs against the installed ctags and rg. Each test returns early
//! when its tool is missing.

mod common;

use common::temp_repo;
use scout::config::Config;
use scout::indexer::Indexer;
use scout::process::{CommandRunner, SystemRunner, argv};
use scout::repo::RepoIndex;
use scout::search;
use std::time::Duration;

fn tool_available(bin: &str) -> bool {
    SystemRunner
        .run(
            &argv([bin, "--version"]),
            &std::env::temp_dir(),
            Duration::from_secs(10),
        )
        .is_ok()
}

#[test]
fn ctags_build_indexes_python_function() {
    let config = Config::default();
    if !tool_available(&config.ctags_bin) {
        eprintln!("skipping: {} not installed", config.ctags_bin);
        return;
    }
    let repo = temp_repo(&[("foo.py", "def hello_world(): pass\n")]);
    let indexer = Indexer::new(RepoIndex::new(repo.path()), &SystemRunner, &config);

    assert!(indexer.build().unwrap() >= 1);
    let result = search::query(indexer.index(), &config, "hello", 5);
    assert!(
        result
            .hits
            .iter()
            .any(|hit| hit.name == "hello_world" && hit.file == "foo.py" && hit.line == 1)
    );
}

#[test]
fn rg_finds_content_only_literal() {
    let config = Config::default();
    if !tool_available(&config.rg_bin) {
        eprintln!("skipping: {} not installed", config.rg_bin);
        return;
    }
    let repo = temp_repo(&[("notes/todo.py", "x = 1\n# platypus sighting\n")]);
    let hits = search::ripgrep_search(&SystemRunner, &config, repo.path(), "platypus", 5);
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].file, "notes/todo.py");
    assert_eq!(hits[0].line, 2);
    assert_eq!(hits[0].snippet, "# platypus sighting");
}
