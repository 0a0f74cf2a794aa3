use anyhow::anyhow;
use chrono::{Local, NaiveDate};
use tracing::{debug, info, instrument, warn};

use crate::calendar::{MonthCursor, MonthGrid};
use crate::cli::Invocation;
use crate::config::Config;
use crate::datastore::DataStore;
use crate::datetime::{parse_day_expr, parse_year_month};
use crate::interact::Interact;
use crate::render::Renderer;
use crate::session;
use crate::task::Task;

pub fn known_command_names() -> Vec<&'static str> {
    vec![
        "add",
        "edit",
        "delete",
        "list",
        "calendar",
        "interactive",
        "help",
        "version",
        "_commands",
        "_show",
    ]
}

pub fn expand_command_abbrev<'a>(token: &'a str, known: &[&'a str]) -> Option<&'a str> {
    if known.contains(&token) {
        return Some(token);
    }

    let mut matches = known.iter().copied().filter(|name| name.starts_with(token));
    let first = matches.next()?;
    if matches.next().is_some() {
        None
    } else {
        Some(first)
    }
}

#[instrument(skip(store, cfg, renderer, interact, inv))]
pub fn dispatch(
    store: &DataStore,
    cfg: &Config,
    renderer: &Renderer,
    interact: &mut dyn Interact,
    inv: Invocation,
) -> anyhow::Result<()> {
    let today = Local::now().date_naive();
    let command = inv.command.as_str();

    debug!(command, args = ?inv.command_args, "dispatching command");

    match command {
        "add" => cmd_add(store, interact, &inv.command_args, today),
        "edit" => cmd_edit(store, interact, &inv.command_args),
        "delete" => cmd_delete(store, interact, &inv.command_args),
        "list" => cmd_list(store, renderer),
        "calendar" => cmd_calendar(store, renderer, &inv.command_args, today),
        "interactive" => session::run(store, renderer, interact),
        "help" => cmd_help(),
        "version" => {
            println!("{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        "_commands" => cmd_commands(),
        "_show" => cmd_show(cfg),
        other => Err(anyhow!("unknown command: {other}")),
    }
}

/// Splits add arguments into description words and a `date:` modifier.
fn parse_add_args(
    args: &[String],
    today: NaiveDate,
) -> anyhow::Result<(String, Option<NaiveDate>)> {
    let mut text_parts = Vec::new();
    let mut date = None;

    for arg in args {
        if let Some(raw) = arg.strip_prefix("date:") {
            date = Some(parse_day_expr(raw, today)?);
            continue;
        }
        text_parts.push(arg.as_str());
    }

    Ok((text_parts.join(" ").trim().to_string(), date))
}

/// Validates and appends a new task, persisting on success. Returns the new
/// id, or `None` when validation aborted the add (alert already shown).
#[instrument(skip(tasks, store, interact, args, today))]
pub fn add_task(
    tasks: &mut Vec<Task>,
    store: &DataStore,
    interact: &mut dyn Interact,
    args: &[String],
    today: NaiveDate,
) -> anyhow::Result<Option<u64>> {
    let (text, date) = parse_add_args(args, today)?;

    if text.is_empty() {
        warn!("add rejected: empty description");
        interact.alert("A task description is required.");
        return Ok(None);
    }
    let Some(date) = date else {
        warn!("add rejected: missing date");
        interact.alert("A task date is required (date:YYYY-MM-DD).");
        return Ok(None);
    };

    let id = store.next_id(tasks);
    tasks.push(Task::new(id, text, date));
    store.save_tasks(tasks)?;

    debug!(id, count = tasks.len(), "task added");
    Ok(Some(id))
}

/// Replaces a task's text with dialog-provided input. Returns true when the
/// task changed. Cancel or whitespace-only input leaves it untouched; id and
/// date are never modified here.
#[instrument(skip(tasks, store, interact))]
pub fn edit_task(
    tasks: &mut [Task],
    store: &DataStore,
    interact: &mut dyn Interact,
    id: u64,
) -> anyhow::Result<bool> {
    let task = tasks
        .iter_mut()
        .find(|task| task.id == id)
        .ok_or_else(|| anyhow!("no such task: {id}"))?;

    let Some(reply) = interact.request_text("New task text", &task.text)? else {
        debug!(id, "edit cancelled");
        return Ok(false);
    };

    let trimmed = reply.trim();
    if trimmed.is_empty() {
        debug!(id, "edit rejected: empty replacement");
        return Ok(false);
    }

    task.text = trimmed.to_string();
    store.save_tasks(tasks)?;
    Ok(true)
}

/// Removes a task after explicit confirmation. Returns true when a task was
/// removed; declining or a missing id leaves the collection untouched.
#[instrument(skip(tasks, store, interact))]
pub fn delete_task(
    tasks: &mut Vec<Task>,
    store: &DataStore,
    interact: &mut dyn Interact,
    id: u64,
) -> anyhow::Result<bool> {
    if !interact.confirm(&format!("Really delete task {id}?"))? {
        debug!(id, "delete declined");
        return Ok(false);
    }

    let before = tasks.len();
    tasks.retain(|task| task.id != id);
    if tasks.len() == before {
        debug!(id, "delete matched nothing");
        return Ok(false);
    }

    store.save_tasks(tasks)?;
    Ok(true)
}

#[instrument(skip(store, interact, args, today))]
fn cmd_add(
    store: &DataStore,
    interact: &mut dyn Interact,
    args: &[String],
    today: NaiveDate,
) -> anyhow::Result<()> {
    info!("command add");

    let mut tasks = store.load_tasks();
    if let Some(id) = add_task(&mut tasks, store, interact, args, today)? {
        println!("Created task {id}.");
    }
    Ok(())
}

#[instrument(skip(store, interact, args))]
fn cmd_edit(store: &DataStore, interact: &mut dyn Interact, args: &[String]) -> anyhow::Result<()> {
    info!("command edit");

    let id = parse_id_arg(args, "edit")?;
    let mut tasks = store.load_tasks();
    if edit_task(&mut tasks, store, interact, id)? {
        println!("Modified task {id}.");
    } else {
        println!("Task {id} unchanged.");
    }
    Ok(())
}

#[instrument(skip(store, interact, args))]
fn cmd_delete(
    store: &DataStore,
    interact: &mut dyn Interact,
    args: &[String],
) -> anyhow::Result<()> {
    info!("command delete");

    let id = parse_id_arg(args, "delete")?;
    let mut tasks = store.load_tasks();
    if delete_task(&mut tasks, store, interact, id)? {
        println!("Deleted task {id}.");
    } else {
        println!("Deleted 0 task(s).");
    }
    Ok(())
}

#[instrument(skip(store, renderer))]
fn cmd_list(store: &DataStore, renderer: &Renderer) -> anyhow::Result<()> {
    info!("command list");

    let tasks = store.load_tasks();
    let rendered = renderer.render_task_list(&tasks)?;
    renderer.print(&rendered)
}

#[instrument(skip(store, renderer, args, today))]
fn cmd_calendar(
    store: &DataStore,
    renderer: &Renderer,
    args: &[String],
    today: NaiveDate,
) -> anyhow::Result<()> {
    info!("command calendar");

    let cursor = match args.first() {
        Some(raw) => {
            let (year, month) = parse_year_month(raw)?;
            MonthCursor { year, month }
        }
        None => MonthCursor::from_date(today),
    };

    let tasks = store.load_tasks();
    let grid = MonthGrid::build(cursor, &tasks, today)?;
    let rendered = renderer.render_month_grid(&grid)?;
    renderer.print(&rendered)
}

fn parse_id_arg(args: &[String], command: &str) -> anyhow::Result<u64> {
    let raw = args
        .first()
        .ok_or_else(|| anyhow!("{command} requires a task id"))?;
    raw.parse::<u64>()
        .map_err(|_| anyhow!("{command}: invalid task id: {raw}"))
}

fn cmd_commands() -> anyhow::Result<()> {
    for command in known_command_names() {
        println!("{command}");
    }
    Ok(())
}

fn cmd_show(cfg: &Config) -> anyhow::Result<()> {
    for (k, v) in cfg.iter() {
        println!("{k}={v}");
    }
    Ok(())
}

fn cmd_help() -> anyhow::Result<()> {
    println!(
        "Commands: add TEXT date:EXPR, edit ID, delete ID, list, calendar [YYYY-MM], interactive, help, version"
    );
    Ok(())
}
