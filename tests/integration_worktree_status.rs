use std::path::Path;
use std::process::Command;

use wtmux::core::divergence::Divergence;
use wtmux::core::git::Git;
use wtmux::core::resolve::resolve;
use wtmux::core::status::{build_rows, current_worktree};
use wtmux::core::worktree::list_worktrees;

#[test]
fn worktree_inventory_and_status_smoke() {
    if Command::new("git").arg("--version").output().is_err() {
        eprintln!("skipping: git not found");
        return;
    }

    let td = tempfile::tempdir().expect("tempdir");
    let repo = td.path().join("myapp");
    std::fs::create_dir_all(&repo).expect("mkdir repo");

    run(&repo, &["init", "-q"]);
    run(&repo, &["symbolic-ref", "HEAD", "refs/heads/main"]);
    run(&repo, &["config", "user.email", "test@example.com"]);
    run(&repo, &["config", "user.name", "Test"]);
    run(&repo, &["config", "commit.gpgsign", "false"]);

    std::fs::write(repo.join("README.md"), "hello\n").expect("write");
    run(&repo, &["add", "."]);
    run(&repo, &["commit", "-q", "-m", "init"]);

    run(
        &repo,
        &["worktree", "add", "-q", ".worktrees/feature/auth", "-b", "feature/auth"],
    );
    run(&repo, &["worktree", "add", "-q", ".worktrees/dash-ui", "-b", "dash-ui"]);
    // Outside the managed directory: never part of the inventory.
    run(&repo, &["worktree", "add", "-q", "../elsewhere", "-b", "elsewhere"]);

    let auth = repo.join(".worktrees/feature/auth");
    std::fs::write(auth.join("a.txt"), "a\n").expect("write");
    run(&auth, &["add", "a.txt"]);
    run(&auth, &["commit", "-q", "-m", "auth work"]);
    std::fs::write(auth.join("scratch.txt"), "wip\n").expect("write");

    // Discovery from inside a linked worktree still finds the main root.
    let git = Git::discover_from(&auth).expect("discover");
    assert_eq!(
        git.repo_root(),
        repo.canonicalize().expect("canonical repo").as_path()
    );
    assert_eq!(git.repo_name(), "myapp");

    let worktrees = list_worktrees(&git);
    let mut names: Vec<String> = worktrees.iter().map(|w| w.name()).collect();
    names.sort();
    assert_eq!(names, vec!["dash-ui", "feature/auth"]);

    let default_branch = git.default_branch(&["main".to_owned(), "master".to_owned()]);
    assert_eq!(default_branch, "main");
    assert_eq!(
        git.divergence("feature/auth", &default_branch),
        Divergence::new(1, 0)
    );
    assert!(git.divergence("dash-ui", &default_branch).is_even());

    // Both sides move: counts are taken from the merge base.
    std::fs::write(repo.join("main.txt"), "m\n").expect("write");
    run(&repo, &["add", "main.txt"]);
    run(&repo, &["commit", "-q", "-m", "main work"]);
    assert_eq!(
        git.divergence("feature/auth", &default_branch),
        Divergence::new(1, 1)
    );
    assert_eq!(
        git.divergence("dash-ui", &default_branch),
        Divergence::new(0, 1)
    );
    assert_eq!(
        git.divergence("no-such-branch", &default_branch),
        Divergence::default()
    );

    let target = resolve("auth", &worktrees).expect("resolve leaf");
    assert_eq!(target.branch, "feature/auth");
    assert_eq!(git.modified_count(&target.path), 1);

    let cwd = target.path.join("sub");
    let current = current_worktree(&worktrees, &cwd);
    let rows = build_rows(
        &git,
        &worktrees,
        &["auth".to_owned()],
        &default_branch,
        current,
    );
    assert_eq!(rows.len(), 2);
    let auth_row = rows
        .iter()
        .find(|r| r.worktree.leaf() == "auth")
        .expect("auth row");
    assert!(auth_row.window_open);
    assert!(auth_row.is_current);
    assert_eq!(auth_row.modified_label(), "1 file");
    assert!(auth_row.last_commit.timestamp > 0);

    let dash_row = rows
        .iter()
        .find(|r| r.worktree.leaf() == "dash-ui")
        .expect("dash-ui row");
    assert!(!dash_row.window_open);
    assert_eq!(dash_row.modified_label(), "clean");
}

#[test]
fn discovery_outside_a_repository_fails() {
    if Command::new("git").arg("--version").output().is_err() {
        eprintln!("skipping: git not found");
        return;
    }

    let td = tempfile::tempdir().expect("tempdir");
    let err = Git::discover_from(td.path()).expect_err("not a repo");
    assert!(matches!(err, wtmux::error::WtmuxError::NotInGitRepo));
}

fn run(dir: &Path, args: &[&str]) {
    let out = Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .expect("git command");
    if !out.status.success() {
        panic!(
            "git {:?} failed: {}",
            args,
            String::from_utf8_lossy(&out.stderr)
        );
    }
}
