mod common;
use common::cli::{DiscWorkspace, add_idea, open_project, run_disc, run_ok};

fn titles(rows: &serde_json::Value) -> Vec<String> {
    rows.as_array()
        .expect("array")
        .iter()
        .map(|r| r["title"].as_str().unwrap_or_default().to_string())
        .collect()
}

#[test]
fn test_init_writes_config_template() {
    let workspace = DiscWorkspace::new();
    let out = run_ok(&workspace, ["init"], "init");
    assert!(out.stdout.contains("Initialized discovery board"));
    assert!(workspace.data_dir().join("config.yaml").exists());
    assert!(workspace.data_dir().join(".gitignore").exists());
}

#[test]
fn test_table_ranks_by_score_and_toggles_sort() {
    let workspace = DiscWorkspace::new();
    open_project(&workspace, "Roadmap");
    add_idea(
        &workspace,
        &["Low", "--reach", "1", "--impact", "0.25", "--confidence", "50", "--effort", "10"],
    );
    add_idea(&workspace, &["Mid"]);
    add_idea(
        &workspace,
        &["High", "--reach", "10", "--impact", "massive", "--confidence", "100", "--effort", "1"],
    );

    let table = run_ok(&workspace, ["--json", "table"], "table").json();
    assert_eq!(titles(&table), ["High", "Mid", "Low"]);
    assert_eq!(table[0]["riceScore"], 30.0);
    assert_eq!(table[0]["level"], "high");
    assert_eq!(table[1]["riceScore"], 1.0);
    assert_eq!(table[1]["level"], "medium");
    assert_eq!(table[2]["level"], "low");

    let by_title = run_ok(&workspace, ["--json", "table", "--sort", "title"], "sort title").json();
    assert_eq!(titles(&by_title), ["High", "Low", "Mid"]);

    let flipped = run_ok(&workspace, ["--json", "table", "--sort", "title"], "flip").json();
    assert_eq!(titles(&flipped), ["Mid", "Low", "High"]);

    // The chosen sort is persisted
    let again = run_ok(&workspace, ["--json", "table"], "table again").json();
    assert_eq!(titles(&again), ["Mid", "Low", "High"]);
}

#[test]
fn test_board_groups_by_status() {
    let workspace = DiscWorkspace::new();
    open_project(&workspace, "Roadmap");
    let a = add_idea(&workspace, &["Alpha"]);
    add_idea(&workspace, &["Beta", "--status", "todo"]);
    run_ok(&workspace, ["idea", "status", &a, "done"], "status");

    let board = run_ok(&workspace, ["--json", "board"], "board").json();
    let columns = board.as_array().expect("columns");
    assert_eq!(columns.len(), 6);
    assert_eq!(columns[0]["status"], "open");
    assert_eq!(columns[0]["ideas"].as_array().unwrap().len(), 0);
    assert_eq!(columns[1]["status"], "todo");
    assert_eq!(columns[1]["ideas"][0]["title"], "Beta");
    assert_eq!(columns[5]["status"], "done");
    assert_eq!(columns[5]["ideas"][0]["id"], a.as_str());

    let text = run_ok(&workspace, ["board"], "board text");
    assert!(text.stdout.contains("To-do (1)"));
    assert!(text.stdout.contains("Done (1)"));
}

#[test]
fn test_edit_recomputes_score() {
    let workspace = DiscWorkspace::new();
    open_project(&workspace, "Roadmap");
    let id = add_idea(&workspace, &["Dark mode"]);

    run_ok(&workspace, ["idea", "edit", &id, "--effort", "2"], "edit");
    let idea = run_ok(&workspace, ["--json", "idea", "show", &id], "show").json();
    assert_eq!(idea["effort"], 2.0);
    assert_eq!(idea["riceScore"], 2.0);
    assert_eq!(idea["level"], "high");
}

#[test]
fn test_edit_status_keeps_order() {
    let workspace = DiscWorkspace::new();
    open_project(&workspace, "Roadmap");
    add_idea(&workspace, &["First"]);
    let id = add_idea(&workspace, &["Second"]);

    run_ok(&workspace, ["idea", "edit", &id, "--status", "paused"], "edit");
    let idea = run_ok(&workspace, ["--json", "idea", "show", &id], "show").json();
    assert_eq!(idea["status"], "paused");
    assert_eq!(idea["order"], 1);
}

#[test]
fn test_partial_ids_resolve() {
    let workspace = DiscWorkspace::new();
    open_project(&workspace, "Roadmap");
    let id = add_idea(&workspace, &["Dark mode"]);
    let hash = id.trim_start_matches("idea-");

    let out = run_ok(&workspace, ["--json", "idea", "show", hash], "show by hash");
    assert_eq!(out.json()["id"], id.as_str());
}

#[test]
fn test_delete_project_cascades() {
    let workspace = DiscWorkspace::new();
    let project = open_project(&workspace, "Roadmap");
    add_idea(&workspace, &["One"]);
    add_idea(&workspace, &["Two"]);

    let out = run_ok(&workspace, ["project", "delete", &project], "delete");
    assert!(out.stdout.contains("2 ideas"));

    let projects = run_ok(&workspace, ["--json", "project", "list"], "list").json();
    assert_eq!(projects.as_array().unwrap().len(), 0);
    assert_eq!(workspace.bucket("discovery-ideas").as_deref(), Some("[]"));

    let prefs: serde_json::Value =
        serde_json::from_str(&workspace.bucket("discovery-prefs").unwrap()).unwrap();
    assert!(prefs["activeProjectId"].is_null());
}

#[test]
fn test_validation_errors_fail_the_command() {
    let workspace = DiscWorkspace::new();
    open_project(&workspace, "Roadmap");

    let out = run_disc(&workspace, ["idea", "add", "  "], "blank title");
    assert!(!out.status.success());
    assert!(out.stderr.contains("title"), "stderr: {}", out.stderr);

    let out = run_disc(&workspace, ["idea", "add", "Ok", "--reach", "11"], "reach");
    assert!(!out.status.success());
    assert!(out.stderr.contains("reach"), "stderr: {}", out.stderr);

    let out = run_disc(&workspace, ["idea", "add", "Ok", "--impact", "4"], "impact");
    assert!(!out.status.success());
}

#[test]
fn test_idea_add_needs_a_project() {
    let workspace = DiscWorkspace::new();
    let out = run_disc(&workspace, ["idea", "add", "Orphan"], "no project");
    assert!(!out.status.success());
    assert!(out.stderr.contains("no active project"));
}

#[test]
fn test_unknown_id_is_a_noop() {
    let workspace = DiscWorkspace::new();
    open_project(&workspace, "Roadmap");
    add_idea(&workspace, &["Keep me"]);

    let out = run_ok(&workspace, ["--json", "idea", "delete", "idea-zzzzzz"], "delete");
    assert_eq!(out.json()["changed"], false);

    let table = run_ok(&workspace, ["--json", "table"], "table").json();
    assert_eq!(titles(&table), ["Keep me"]);
}

#[test]
fn test_no_active_project_shows_empty_views() {
    let workspace = DiscWorkspace::new();
    open_project(&workspace, "Roadmap");
    add_idea(&workspace, &["Hidden"]);
    run_ok(&workspace, ["project", "close"], "close");

    let table = run_ok(&workspace, ["--json", "table"], "table").json();
    assert_eq!(table.as_array().unwrap().len(), 0);
    let board = run_ok(&workspace, ["--json", "board"], "board").json();
    assert_eq!(board.as_array().unwrap().len(), 0);
}

#[test]
fn test_prefs_persist() {
    let workspace = DiscWorkspace::new();
    run_ok(&workspace, ["view", "table"], "view");
    run_ok(&workspace, ["sort", "manual"], "sort");

    let prefs: serde_json::Value =
        serde_json::from_str(&workspace.bucket("discovery-prefs").unwrap()).unwrap();
    assert_eq!(prefs["viewMode"], "table");
    assert_eq!(prefs["sortMode"], "manual");

    let out = run_ok(&workspace, ["--json", "sort", "manual"], "sort again");
    assert_eq!(out.json()["changed"], false);
}
