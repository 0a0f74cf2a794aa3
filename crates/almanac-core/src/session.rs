use std::io::{self, BufRead, Write};

use chrono::Local;
use tracing::{debug, info, instrument};

use crate::calendar::{MonthCursor, MonthGrid};
use crate::commands::{add_task, delete_task, edit_task, expand_command_abbrev};
use crate::datastore::DataStore;
use crate::interact::Interact;
use crate::render::Renderer;
use crate::task::Task;

/// Which view is showing. Starts on the list; changes only on an explicit
/// toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewMode {
    List,
    Calendar,
}

const SESSION_COMMANDS: [&str; 9] = [
    "add", "edit", "delete", "list", "calendar", "next", "prev", "help", "quit",
];

struct Session<'a> {
    store: &'a DataStore,
    renderer: &'a Renderer,
    tasks: Vec<Task>,
    cursor: MonthCursor,
    mode: ViewMode,
    list_cache: String,
}

impl<'a> Session<'a> {
    fn new(store: &'a DataStore, renderer: &'a Renderer) -> anyhow::Result<Self> {
        let tasks = store.load_tasks();
        let cursor = MonthCursor::from_date(Local::now().date_naive());
        let list_cache = renderer.render_task_list(&tasks)?;

        Ok(Self {
            store,
            renderer,
            tasks,
            cursor,
            mode: ViewMode::List,
            list_cache,
        })
    }

    /// Every store mutation lands here: rebuild the list rendering and redraw
    /// whichever view is showing.
    fn refresh_after_mutation(&mut self) -> anyhow::Result<()> {
        self.list_cache = self.renderer.render_task_list(&self.tasks)?;
        match self.mode {
            ViewMode::List => self.renderer.print(&self.list_cache),
            ViewMode::Calendar => self.draw_calendar(),
        }
    }

    /// The calendar is rebuilt on every draw; the today flag is computed at
    /// render time.
    fn draw_calendar(&self) -> anyhow::Result<()> {
        let today = Local::now().date_naive();
        let grid = MonthGrid::build(self.cursor, &self.tasks, today)?;
        let rendered = self.renderer.render_month_grid(&grid)?;
        self.renderer.print(&rendered)
    }

    fn show_list(&mut self) -> anyhow::Result<()> {
        self.mode = ViewMode::List;
        // List output is rebuilt at mutation time, not on toggle.
        self.renderer.print(&self.list_cache)
    }

    fn show_calendar(&mut self) -> anyhow::Result<()> {
        self.mode = ViewMode::Calendar;
        self.draw_calendar()
    }

    fn change_month(&mut self, delta: i32) -> anyhow::Result<()> {
        self.cursor.change_month(delta);
        debug!(year = self.cursor.year, month = self.cursor.month, "moved month cursor");
        if self.mode == ViewMode::Calendar {
            self.draw_calendar()?;
        }
        Ok(())
    }
}

/// Runs the interactive session: one command per line, each handled to
/// completion before the next is read.
#[instrument(skip(store, renderer, interact))]
pub fn run(store: &DataStore, renderer: &Renderer, interact: &mut dyn Interact) -> anyhow::Result<()> {
    info!("starting interactive session");

    let mut session = Session::new(store, renderer)?;
    session.renderer.print(&session.list_cache)?;

    loop {
        eprint!("almanac> ");
        io::stderr().flush().ok();

        let mut line = String::new();
        if io::stdin().lock().read_line(&mut line)? == 0 {
            break;
        }

        let tokens: Vec<String> = line.split_whitespace().map(ToString::to_string).collect();
        let Some(first) = tokens.first() else {
            continue;
        };

        let command = expand_command_abbrev(first, &SESSION_COMMANDS)
            .map(ToString::to_string)
            .unwrap_or_else(|| first.clone());
        let args = &tokens[1..];

        let outcome = handle_command(&mut session, interact, &command, args);
        match outcome {
            Ok(true) => break,
            Ok(false) => {}
            Err(err) => eprintln!("error: {err:#}"),
        }
    }

    info!("interactive session ended");
    Ok(())
}

/// Returns true when the session should end.
fn handle_command(
    session: &mut Session<'_>,
    interact: &mut dyn Interact,
    command: &str,
    args: &[String],
) -> anyhow::Result<bool> {
    match command {
        "add" => {
            let today = Local::now().date_naive();
            if add_task(&mut session.tasks, session.store, interact, args, today)?.is_some() {
                session.refresh_after_mutation()?;
            }
        }
        "edit" => {
            let id = parse_id(args)?;
            if edit_task(&mut session.tasks, session.store, interact, id)? {
                session.refresh_after_mutation()?;
            }
        }
        "delete" => {
            let id = parse_id(args)?;
            if delete_task(&mut session.tasks, session.store, interact, id)? {
                session.refresh_after_mutation()?;
            }
        }
        "list" => session.show_list()?,
        "calendar" => session.show_calendar()?,
        "next" => session.change_month(1)?,
        "prev" => session.change_month(-1)?,
        "help" => {
            eprintln!(
                "Commands: add TEXT date:EXPR, edit ID, delete ID, list, calendar, next, prev, quit"
            );
        }
        "quit" | "exit" => return Ok(true),
        other => eprintln!("unknown command: {other}"),
    }

    Ok(false)
}

fn parse_id(args: &[String]) -> anyhow::Result<u64> {
    let raw = args
        .first()
        .ok_or_else(|| anyhow::anyhow!("a task id is required"))?;
    raw.parse::<u64>()
        .map_err(|_| anyhow::anyhow!("invalid task id: {raw}"))
}
