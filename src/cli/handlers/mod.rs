use std::path::Path;

use indexmap::IndexMap;

use crate::cli::commands::*;
use crate::cli::output::*;
use crate::io::config_io;
use crate::io::recovery;
use crate::io::store_io::{self, JsonFileGateway, TaskGateway};
use crate::model::task::Task;
use crate::ops::store::{StoreError, TaskStore};
use crate::ops::task_ops::TaskError;
use crate::ops::view::ViewSettings;

type CmdResult = Result<(), Box<dyn std::error::Error>>;

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

pub fn dispatch(cli: Cli) -> CmdResult {
    let json = cli.json;
    let gateway = JsonFileGateway::new(cli.file.unwrap_or_else(store_io::default_store_path));

    match cli.command {
        None => Err("no command given (run `taskterm` without arguments for the TUI)".into()),
        Some(cmd) => match cmd {
            // Read commands
            Commands::List(args) => cmd_list(&gateway, args, json),
            Commands::Show(args) => cmd_show(&gateway, args, json),
            Commands::Stats => cmd_stats(&gateway, json),
            Commands::TagList => cmd_tag_list(&gateway, json),

            // Write commands
            Commands::Add(args) => cmd_add(&gateway, args, json),
            Commands::Done(args) => {
                edit_and_print(&gateway, json, |s| s.toggle_complete(args.id))
            }
            Commands::Rm(args) => cmd_rm(&gateway, args, json),
            Commands::Edit(args) => {
                let text = args.text.join(" ");
                edit_and_print(&gateway, json, |s| s.edit_description(args.id, &text))
            }
            Commands::Priority(args) => {
                edit_and_print(&gateway, json, |s| s.cycle_priority(args.id))
            }
            Commands::Due(args) => {
                let date = args.date.unwrap_or_default();
                edit_and_print(&gateway, json, |s| s.set_due_date(args.id, &date))
            }
            Commands::Tags(args) => {
                let tags = args.tags.unwrap_or_default();
                edit_and_print(&gateway, json, |s| s.set_tags(args.id, &tags))
            }

            // Maintenance
            Commands::Reset(args) => cmd_reset(&gateway, args),
            Commands::Recovery(args) => cmd_recovery(gateway.dir(), args, json),
            Commands::Config(args) => cmd_config(args),
        },
    }
}

/// Open the store, pointing at `reset` when the file cannot be parsed.
fn open_store(gateway: &JsonFileGateway) -> Result<TaskStore<&JsonFileGateway>, Box<dyn std::error::Error>> {
    TaskStore::open(gateway).map_err(|e| {
        if e.is_corrupt_store() {
            format!("{}\nrun `taskterm reset` to move it aside and start over", e).into()
        } else {
            e.into()
        }
    })
}

fn print_task(task: &Task, json: bool) -> CmdResult {
    if json {
        println!("{}", serde_json::to_string_pretty(&task_to_json(task))?);
    } else {
        println!("{}", format_task_line(task));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Read commands
// ---------------------------------------------------------------------------

fn cmd_list(gateway: &JsonFileGateway, args: ListArgs, json: bool) -> CmdResult {
    let store = open_store(gateway)?;
    let config = config_io::load_config(&config_io::config_path());
    let settings = ViewSettings {
        filter: args.filter.unwrap_or(config.view.filter),
        sort: args.sort.unwrap_or(config.view.sort),
        search: args.search.unwrap_or_default(),
    };
    let view = store.view(&settings);

    if json {
        let rows: Vec<RowJson> = view
            .rows
            .iter()
            .enumerate()
            .map(|(row, r)| RowJson {
                row,
                index: r.index,
                task: task_to_json(r.task),
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    if view.is_empty() {
        println!("No tasks.");
        return Ok(());
    }
    let id_w = view
        .rows
        .iter()
        .map(|r| r.task.id.to_string().len())
        .max()
        .unwrap_or(0);
    for (row, r) in view.rows.iter().enumerate() {
        println!(
            "{:>3}  {:<id_w$}  {}",
            row + 1,
            r.task.id,
            format_task_line(r.task),
            id_w = id_w
        );
    }
    Ok(())
}

fn cmd_show(gateway: &JsonFileGateway, args: IdArg, json: bool) -> CmdResult {
    let store = open_store(gateway)?;
    let task = store.get(args.id).ok_or(TaskError::NotFound(args.id))?;
    if json {
        println!("{}", serde_json::to_string_pretty(&task_to_json(task))?);
    } else {
        for line in format_task_detail(task) {
            println!("{}", line);
        }
    }
    Ok(())
}

fn cmd_stats(gateway: &JsonFileGateway, json: bool) -> CmdResult {
    let store = open_store(gateway)?;
    let stats = stats_to_json(store.summary());
    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
    } else {
        println!(
            "Tasks: {} | Completed: {} | Remaining: {}",
            stats.total, stats.completed, stats.uncompleted
        );
    }
    Ok(())
}

/// Distinct tags in the order they first appear, with task counts
pub fn tag_counts(tasks: &[Task]) -> IndexMap<&str, usize> {
    let mut counts: IndexMap<&str, usize> = IndexMap::new();
    for task in tasks {
        for tag in task.tag_list() {
            *counts.entry(tag.as_str()).or_insert(0) += 1;
        }
    }
    counts
}

fn cmd_tag_list(gateway: &JsonFileGateway, json: bool) -> CmdResult {
    let store = open_store(gateway)?;
    let counts = tag_counts(store.tasks());
    if json {
        let out: Vec<TagCountJson> = counts
            .iter()
            .map(|(tag, count)| TagCountJson {
                tag: tag.to_string(),
                count: *count,
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }
    let tag_w = counts.keys().map(|t| t.len() + 1).max().unwrap_or(0);
    for (tag, count) in &counts {
        println!("{:<tag_w$}  {}", format!("#{}", tag), count, tag_w = tag_w);
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Write commands
// ---------------------------------------------------------------------------

fn cmd_add(gateway: &JsonFileGateway, args: AddArgs, json: bool) -> CmdResult {
    let mut store = open_store(gateway)?;
    let task = store
        .add(&args.text.join(" "))?
        .ok_or("description cannot be empty")?;
    if json {
        println!("{}", serde_json::to_string_pretty(&task_to_json(&task))?);
    } else {
        println!("{}", task.id);
    }
    Ok(())
}

fn cmd_rm(gateway: &JsonFileGateway, args: IdArg, json: bool) -> CmdResult {
    let mut store = open_store(gateway)?;
    let removed = store.delete(args.id)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&task_to_json(&removed))?);
    } else {
        println!("deleted {}: {}", removed.id, removed.description);
    }
    Ok(())
}

/// Run one id-targeted mutation and print the updated task.
fn edit_and_print(
    gateway: &JsonFileGateway,
    json: bool,
    op: impl FnOnce(&mut TaskStore<&JsonFileGateway>) -> Result<Task, StoreError>,
) -> CmdResult {
    let mut store = open_store(gateway)?;
    let task = op(&mut store)?;
    print_task(&task, json)
}

// ---------------------------------------------------------------------------
// Maintenance
// ---------------------------------------------------------------------------

fn cmd_reset(gateway: &JsonFileGateway, args: ResetArgs) -> CmdResult {
    if !args.force {
        match gateway.load() {
            Ok(tasks) if !tasks.is_empty() => {
                return Err(format!(
                    "{} is readable and holds {} tasks; use --force to reset anyway",
                    gateway.path().display(),
                    tasks.len()
                )
                .into());
            }
            Ok(_) => {}
            Err(e) if e.is_corrupt() => {}
            Err(e) => return Err(e.into()),
        }
    }
    match store_io::reset_store(gateway)? {
        Some(backup) => println!(
            "moved {} to {}\nstarted an empty task list",
            gateway.path().display(),
            backup.display()
        ),
        None => println!("started an empty task list at {}", gateway.path().display()),
    }
    Ok(())
}

fn cmd_recovery(data_dir: &Path, args: RecoveryCmd, json: bool) -> CmdResult {
    match args.action {
        Some(RecoveryAction::Path) => {
            println!("{}", recovery::recovery_log_path(data_dir).display());
        }
        Some(RecoveryAction::Prune(prune)) => {
            let removed = recovery::prune_recovery(data_dir, prune.all)?;
            println!("removed {} recovery entries", removed);
        }
        None => {
            let entries = recovery::read_recovery_entries(data_dir, Some(args.limit.unwrap_or(10)));
            if json {
                let out: Vec<serde_json::Value> = entries.iter().map(|e| e.to_json()).collect();
                println!("{}", serde_json::to_string_pretty(&out)?);
            } else if entries.is_empty() {
                println!("No recovery entries.");
            } else {
                for entry in &entries {
                    print!("{}", entry.to_markdown());
                }
            }
        }
    }
    Ok(())
}

fn cmd_config(args: ConfigCmd) -> CmdResult {
    let path = config_io::config_path();
    match args.action {
        ConfigAction::Path => println!("{}", path.display()),
        ConfigAction::Get { key } => {
            let doc = config_io::read_document(&path)?;
            let value = match config_io::get_value(&doc, &key)? {
                Some(v) => v,
                None => config_io::default_value(&key)?,
            };
            println!("{}", value);
        }
        ConfigAction::Set { key, value } => {
            let mut doc = config_io::read_document(&path)?;
            config_io::set_value(&mut doc, &key, &value)?;
            config_io::write_document(&path, &doc)?;
            println!("{} = {}", key, value);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn tag_counts_keep_first_seen_order() {
        let now = Utc::now();
        let mut a = Task::new(1, "a".into(), now);
        a.tags = Some(vec!["work".into(), "urgent".into()]);
        let b = Task::new(2, "b".into(), now);
        let mut c = Task::new(3, "c".into(), now);
        c.tags = Some(vec!["home".into(), "work".into()]);

        let tasks = [a, b, c];
        let counts: Vec<(&str, usize)> = tag_counts(&tasks).into_iter().collect();
        assert_eq!(counts, vec![("work", 2), ("urgent", 1), ("home", 1)]);
    }
}
