//! Tests for the CLI module.

use super::*;
use crate::tasks::{InMemoryTaskStore, Task, TaskService};
use clap::Parser;
use std::process::ExitCode;
use std::sync::Arc;
use tempfile::TempDir;

fn service() -> TaskService {
    TaskService::new(Arc::new(InMemoryTaskStore::new()))
}

fn parse(args: &[&str]) -> Cli {
    Cli::try_parse_from(std::iter::once("task-board").chain(args.iter().copied())).unwrap()
}

fn task_command(args: &[&str]) -> TaskCommand {
    match parse(args).command {
        Some(Command::Task(cmd)) => cmd,
        other => panic!("expected a task command, got {other:?}"),
    }
}

fn single_task(output: &CliOutput) -> Task {
    assert_eq!(output.exit_code, ExitCode::SUCCESS, "stderr: {:?}", output.stderr);
    assert_eq!(output.stdout.len(), 1);
    serde_json::from_str(&output.stdout[0]).unwrap()
}

#[test]
fn test_no_subcommand_means_serve() {
    let cli = parse(&[]);
    assert!(cli.command.is_none());
    assert!(matches!(cli.command.unwrap_or_default(), Command::Serve(_)));
}

#[test]
fn test_parse_serve_flags() {
    let cli = parse(&["serve", "--port", "9000", "--store", "sqlite", "--seed"]);
    let Some(Command::Serve(args)) = cli.command else { panic!("expected serve") };
    assert_eq!(args.port, Some(9000));
    assert_eq!(args.store, Some(StoreBackend::Sqlite));
    assert!(args.seed);
}

#[test]
fn test_serve_flags_override_config() {
    let args = ServeArgs {
        host: Some("127.0.0.1".into()),
        port: Some(3000),
        templates: Some("/srv/templates".into()),
        ..ServeArgs::default()
    };
    let mut config = ServerConfig { port: 9999, ..ServerConfig::default() };
    args.apply_to(&mut config);

    assert_eq!(config.host, "127.0.0.1");
    assert_eq!(config.port, 3000);
    assert_eq!(config.templates_dir, Some(PathBuf::from("/srv/templates")));
    assert_eq!(config.store, StoreBackend::Memory, "unset flags leave config alone");
    assert!(!config.seed_sample_tasks);
}

#[test]
fn test_parse_list_filter() {
    match task_command(&["list", "--filter", "overdue"]) {
        TaskCommand::List { filter, .. } => assert_eq!(filter, TaskView::Overdue),
        other => panic!("unexpected {other:?}"),
    }
    match task_command(&["list"]) {
        TaskCommand::List { filter, .. } => assert_eq!(filter, TaskView::Active),
        other => panic!("unexpected {other:?}"),
    }
    assert!(Cli::try_parse_from(["task-board", "list", "--filter", "someday"]).is_err());
}

#[test]
fn test_parse_database_flag() {
    let cmd = task_command(&["delete", "abc", "--database", "/tmp/x.db"]);
    assert_eq!(cmd.database_args().database, Some(PathBuf::from("/tmp/x.db")));
}

#[test]
fn test_add_and_list() {
    let service = service();
    let created = single_task(&run(task_command(&["add", "Write docs"]), &service));
    assert_eq!(created.title, "Write docs");
    assert!(!created.is_completed);

    let output = run(task_command(&["list", "--filter", "all"]), &service);
    assert_eq!(output.exit_code, ExitCode::SUCCESS);
    assert_eq!(output.stdout.len(), 1);
    let listed: Task = serde_json::from_str(&output.stdout[0]).unwrap();
    assert_eq!(listed, created);
}

#[test]
fn test_add_with_due_date_lands_in_overdue() {
    let service = service();
    run(task_command(&["add", "Ancient", "--due", "2000-01-01T00:00"]), &service);
    let output = run(task_command(&["list", "--filter", "overdue"]), &service);
    assert_eq!(output.stdout.len(), 1);
    assert!(output.stdout[0].contains("Ancient"));
}

#[test]
fn test_add_rejects_due_date_past_year_9999() {
    let service = service();
    let output = run(task_command(&["add", "far", "--due=9999-12-31T23:00:00-05:00"]), &service);
    assert_eq!(output.exit_code, ExitCode::from(1));
    assert!(output.stderr[0].contains("out of range"), "{:?}", output.stderr);
    assert!(service.find_all().unwrap().is_empty());
}

#[test]
fn test_add_rejects_empty_title() {
    let output = run(task_command(&["add", "  "]), &service());
    assert_eq!(output.exit_code, ExitCode::from(1));
    assert!(output.stderr[0].contains("title is required"));
}

#[test]
fn test_complete_archive_unarchive() {
    let service = service();
    let task = single_task(&run(task_command(&["add", "cycle"]), &service));
    let id = task.id.to_string();

    let done = single_task(&run(task_command(&["complete", &id]), &service));
    assert!(done.is_completed);
    let archived = single_task(&run(task_command(&["archive", &id]), &service));
    assert!(archived.is_archived);
    let restored = single_task(&run(task_command(&["unarchive", &id]), &service));
    assert!(!restored.is_archived);
    assert!(restored.is_completed);
}

#[test]
fn test_delete_twice_fails_second_time() {
    let service = service();
    let task = single_task(&run(task_command(&["add", "gone"]), &service));
    let id = task.id.to_string();

    let output = run(task_command(&["delete", &id]), &service);
    assert_eq!(output.exit_code, ExitCode::SUCCESS);
    assert_eq!(output.stdout, vec![format!("Task deleted: {id}")]);

    let output = run(task_command(&["delete", &id]), &service);
    assert_eq!(output.exit_code, ExitCode::from(1));
    assert!(output.stderr[0].contains("not found"));
}

#[test]
fn test_invalid_id_is_reported() {
    let output = run(task_command(&["complete", "not-a-uuid"]), &service());
    assert_eq!(output.exit_code, ExitCode::from(1));
    assert!(output.stderr[0].contains("invalid task id"));
}

#[test]
fn test_open_service_uses_database_flag() {
    let dir = TempDir::new().unwrap();
    let db = DatabaseArgs { database: Some(dir.path().join("cli.sqlite3")) };

    let service = open_service(&db).unwrap();
    single_task(&run(task_command(&["add", "persisted"]), &service));

    let reopened = open_service(&db).unwrap();
    let output = run(task_command(&["list"]), &reopened);
    assert_eq!(output.stdout.len(), 1);
    assert!(output.stdout[0].contains("persisted"));
}

#[test]
fn test_parse_check_templates() {
    let cli = parse(&["check-templates", "--templates", "/srv/templates"]);
    let Some(Command::CheckTemplates(args)) = cli.command else { panic!("expected check-templates") };
    assert_eq!(args.templates, Some(PathBuf::from("/srv/templates")));
}

#[test]
#[serial_test::serial]
fn test_check_templates_reports_each_page() {
    let output = check_templates(Some(std::path::Path::new("/nonexistent")));
    assert_eq!(output.exit_code, ExitCode::SUCCESS, "stderr: {:?}", output.stderr);
    assert_eq!(output.stdout, vec!["ok: base.html.tera", "ok: board.html.tera"]);
}

#[test]
#[serial_test::serial]
fn test_check_templates_fails_on_broken_override() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("board.html.tera"), "{% if open %}never closed").unwrap();

    let output = check_templates(Some(dir.path()));
    assert_eq!(output.exit_code, ExitCode::from(1));
    assert!(output.stdout.is_empty());
    assert!(output.stderr[0].contains("Failed to load templates"), "{:?}", output.stderr);
    crate::templates::reset_cache().unwrap();
}
