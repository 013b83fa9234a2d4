use std::fmt::Write as _;
use std::str::FromStr;

use anyhow::{Context, Result};
use taskdeck_app::{StoreError, TaskListView, TaskStore, ViewMode};
use taskdeck_client::TaskBackend;
use taskdeck_client::wire::parse_timestamp;
use taskdeck_core::{
    HexColor, NamedFilter, Priority, Tag, TagPalette, Task, TaskId, resolve_tag_color,
};
use time::OffsetDateTime;
use time::macros::format_description;

use crate::{Command, OutputFormat};

/// Execute `command` against `store` and return the text to print.
pub async fn run<B: TaskBackend>(
    command: Command,
    store: &TaskStore<B>,
    palette: &TagPalette,
) -> Result<String> {
    match command {
        Command::List {
            filter,
            query,
            format,
        } => handle_list(store, palette, filter, query, format).await,
        Command::Add {
            title,
            description,
            priority,
            due,
            tags,
        } => {
            let task = Task::new(title)
                .with_description(description.unwrap_or_default())
                .with_priority(priority.as_deref().map(Priority::from).unwrap_or_default())
                .with_due_date(due.as_deref().map(parse_due).transpose()?)
                .with_tags(tags);
            store.add_task(&task).await?;
            Ok(format!("created task: {}\n", task.title))
        }
        Command::Edit {
            id,
            title,
            description,
            priority,
            due,
            clear_due,
            tags,
        } => {
            let id = TaskId(id);
            store.reload_tasks().await?;
            let mut task = store
                .snapshot()
                .find_task(id)
                .cloned()
                .ok_or(StoreError::UnknownTask(id))?;
            if let Some(title) = title {
                task.title = title;
            }
            if let Some(description) = description {
                task.description = description;
            }
            if let Some(priority) = priority {
                task.priority = Priority::from(priority.as_str());
            }
            if clear_due {
                task.due_date = None;
            } else if let Some(due) = due {
                task.due_date = Some(parse_due(&due)?);
            }
            if !tags.is_empty() {
                task.tags = tags;
            }
            store.update_task(&task).await?;
            Ok(format!("updated task {id}\n"))
        }
        Command::Toggle { id } => {
            store.reload_tasks().await?;
            let task = store.toggle_completed(TaskId(id)).await?;
            Ok(format!("task {id} is now {}\n", task.status().as_str()))
        }
        Command::Rm { id } => {
            store.delete_task(TaskId(id)).await?;
            Ok(format!("deleted task {id}\n"))
        }
        Command::Tags { format } => {
            store.reload_tags().await?;
            let snapshot = store.snapshot();
            match format {
                OutputFormat::Table => render_tag_table(&snapshot.tags, palette),
                OutputFormat::Json => {
                    Ok(format!("{}\n", serde_json::to_string_pretty(&*snapshot.tags)?))
                }
            }
        }
        Command::TagAdd { name, color } => {
            let color = match color {
                Some(raw) => {
                    HexColor::from_str(&raw).with_context(|| format!("Invalid color: {raw}"))?
                }
                None => palette.entries().first().map(|entry| entry.value).unwrap_or_default(),
            };
            store.reload_tags().await?;
            let tag = store.add_tag(Tag::new(name, color)).await?;
            Ok(format!("created tag: {} ({})\n", tag.name, palette.describe(tag.color)))
        }
        Command::TagRm { name } => {
            store.delete_tag(&name).await?;
            Ok(format!("deleted tag: {name}\n"))
        }
        Command::Palette => Ok(render_palette(palette)),
    }
}

async fn handle_list<B: TaskBackend>(
    store: &TaskStore<B>,
    palette: &TagPalette,
    filter: Option<String>,
    query: Option<String>,
    format: OutputFormat,
) -> Result<String> {
    store.load_all().await?;

    let mut view = TaskListView::default();
    if let Some(filter) = filter {
        view.set_filter(NamedFilter::from(filter.as_str()));
    }
    if let Some(query) = query {
        view.set_search(&query);
    }
    let filtered = view.mode() != &ViewMode::Named(NamedFilter::All);

    let snapshot = store.snapshot();
    let tasks = view.visible(&snapshot);
    if tasks.is_empty() && format == OutputFormat::Table {
        return Ok(if filtered {
            "No tasks matched the provided filters\n".to_owned()
        } else {
            "No tasks found\n".to_owned()
        });
    }

    match format {
        OutputFormat::Table => {
            render_task_table(&tasks, &snapshot.tags, palette, OffsetDateTime::now_utc())
        }
        OutputFormat::Json => Ok(format!("{}\n", serde_json::to_string_pretty(&tasks)?)),
    }
}

fn parse_due(raw: &str) -> Result<OffsetDateTime> {
    parse_timestamp(raw).with_context(|| format!("Invalid due date: {raw}"))
}

fn render_task_table(
    tasks: &[Task],
    tags: &[Tag],
    palette: &TagPalette,
    now: OffsetDateTime,
) -> Result<String> {
    let date = format_description!("[year]-[month]-[day]");
    let mut out = String::new();
    writeln!(out, "ID | Status | Priority | Due | Title | Tags")?;
    writeln!(out, "-- | ------ | -------- | --- | ----- | ----")?;

    for task in tasks {
        let id = task.id.map_or_else(|| "-".to_owned(), |id| id.to_string());
        let due = match task.due_date {
            Some(due) if task.is_overdue(now) => format!("{} (overdue)", due.format(date)?),
            Some(due) => due.format(date)?,
            None => "-".to_owned(),
        };
        let labels = if task.tags.is_empty() {
            "-".to_owned()
        } else {
            task.tags
                .iter()
                .map(|name| format!("{name} [{}]", palette.describe(resolve_tag_color(name, tags))))
                .collect::<Vec<_>>()
                .join(", ")
        };
        writeln!(
            out,
            "{id} | {} | {} | {due} | {} | {labels}",
            task.status().as_str(),
            task.priority,
            task.title
        )?;
    }
    Ok(out)
}

fn render_tag_table(tags: &[Tag], palette: &TagPalette) -> Result<String> {
    if tags.is_empty() {
        return Ok("No tags found\n".to_owned());
    }
    let mut out = String::new();
    writeln!(out, "Name | Color")?;
    writeln!(out, "---- | -----")?;
    for tag in tags {
        writeln!(out, "{} | {}", tag.name, palette.describe(tag.color))?;
    }
    Ok(out)
}

pub fn render_palette(palette: &TagPalette) -> String {
    palette
        .entries()
        .iter()
        .map(|entry| format!("{} {}\n", entry.value, entry.name))
        .collect()
}
