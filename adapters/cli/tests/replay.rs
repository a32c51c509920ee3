use std::{fs, path::PathBuf, process::Command};

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("robotrain-cli-{name}-{}", std::process::id()));
    fs::create_dir_all(&dir).expect("scratch directory");
    dir
}

fn run(dir: &PathBuf, extra: &[&str]) -> String {
    let output = Command::new(env!("CARGO_BIN_EXE_robotrain"))
        .current_dir(dir)
        .args(extra)
        .output()
        .expect("failed to run robotrain binary");
    assert!(
        output.status.success(),
        "robotrain failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8(output.stdout).expect("utf8 stdout")
}

#[test]
fn scripted_sprint_is_won() {
    let dir = scratch_dir("sprint");
    fs::write(dir.join("sprint.txt"), "Sprint\n0\n0\n0\nGo.\ns.f\n").expect("level written");
    fs::write(
        dir.join("sprint.toml"),
        "[[actions]]\nclick = { row = 0, column = 2 }\n",
    )
    .expect("script written");

    let stdout = run(&dir, &["--level", "sprint.txt", "--script", "sprint.toml"]);

    assert!(stdout.contains("All aboard the robotrain."));
    assert!(stdout.contains("s.C\n"), "caboose drawn on the finish: {stdout}");
    assert!(stdout.contains("tick 3: Won"));
    assert!(stdout.contains("Your robotrain is unstoppable!"));
    assert!(stdout.contains("retry level: 0"));
}

fn level_list(name: &str) -> PathBuf {
    let dir = scratch_dir(name);
    fs::write(dir.join("one.txt"), "One\n0\n0\n0\n\ns.f\n").expect("level written");
    fs::write(dir.join("two.txt"), "Two\n0\n0\n0\n\ns6f\n").expect("level written");
    fs::write(
        dir.join("robotrain.toml"),
        "max_ticks = 20\nlevels = [\"one.txt\", \"two.txt\"]\n",
    )
    .expect("config written");
    fs::write(
        dir.join("go.toml"),
        "[[actions]]\nclick = { row = 0, column = 2 }\n",
    )
    .expect("script written");
    dir
}

fn saved_index(dir: &PathBuf) -> String {
    fs::read_to_string(dir.join("robotrain-progress.toml"))
        .expect("progress saved")
        .trim()
        .to_owned()
}

#[test]
fn configured_level_list_proceeds_until_a_loss() {
    let dir = level_list("list");

    let stdout = run(
        &dir,
        &["--script", "go.toml", "--script", "go.toml", "--proceed"],
    );

    assert!(stdout.contains("One\n"));
    assert!(stdout.contains("next level: 1"));
    assert!(stdout.contains("Two\n"));
    assert!(stdout.contains("Level Failed!"));
    assert!(stdout.contains("retry level: 1"));
    assert_eq!(saved_index(&dir), "level_index = 1");
}

#[test]
fn saved_progress_picks_the_starting_level() {
    let dir = level_list("resume");
    fs::write(dir.join("robotrain-progress.toml"), "level_index = 1\n").expect("progress written");

    let resumed = run(&dir, &[]);
    assert!(resumed.contains("Two\n"));
    assert!(!resumed.contains("One\n"));
    assert!(resumed.contains("stopped after 20 ticks"));
    assert_eq!(saved_index(&dir), "level_index = 1");

    let chosen = run(&dir, &["--level-index", "0", "--script", "go.toml"]);
    assert!(chosen.contains("One\n"));
    assert!(chosen.contains("retry level: 0"));
    assert_eq!(saved_index(&dir), "level_index = 0");
}

#[test]
fn winning_every_level_wraps_once_and_stops() {
    let dir = level_list("wrap");
    fs::write(dir.join("two.txt"), "Two\n0\n0\n0\n\ns.f\n").expect("level written");

    let stdout = run(
        &dir,
        &["--script", "go.toml", "--script", "go.toml", "--proceed"],
    );

    assert!(stdout.contains("next level: 1"));
    assert!(stdout.contains("next level: 0"));
    assert_eq!(stdout.matches("Your robotrain is unstoppable!").count(), 2);
    assert_eq!(saved_index(&dir), "level_index = 0");
}

#[test]
fn idle_level_stops_at_the_tick_limit() {
    let dir = scratch_dir("idle");
    fs::write(dir.join("idle.txt"), "Idle\n0\n0\n0\n\ns.f\n").expect("level written");
    fs::write(dir.join("robotrain.toml"), "max_ticks = 5\n").expect("config written");

    let stdout = run(&dir, &["--level", "idle.txt"]);

    assert!(stdout.contains("tick 5: NotDeployed"));
    assert!(stdout.contains("stopped after 5 ticks"));
}
