use chrono::{Local, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use clap::Parser;
use colored::*;
use directories::ProjectDirs;
use eventkeep::cache::{EventCache, Mutation};
use eventkeep::config::EventKeepConfig;
use eventkeep::error::{EventKeepError, Result};
use eventkeep::model::Event;
use eventkeep::notify::{CommandRefresher, TimelineRefresher};
use eventkeep::persistence::{
    Corruption, LoadReport, LoadSource, Persistence, SaveReport, SaveStatus,
};
use eventkeep::store::fs::FsSlotStore;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use unicode_width::UnicodeWidthStr;

mod args;
use args::{Cli, Commands};

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

type Refresher = Box<dyn Fn()>;

struct AppContext {
    cache: EventCache<FsSlotStore, Refresher>,
    config: EventKeepConfig,
    root: PathBuf,
    load: LoadReport,
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let mut ctx = init_context(&cli)?;

    match cli.command {
        Some(Commands::Add { title, date, notes }) => handle_add(&mut ctx, title, date, notes),
        Some(Commands::List) => handle_list(&ctx),
        Some(Commands::On { day }) => handle_on(&ctx, day),
        Some(Commands::Upcoming { days }) => handle_upcoming(&ctx, days),
        Some(Commands::Month) => handle_month(&ctx),
        Some(Commands::Edit {
            index,
            title,
            date,
            notes,
        }) => handle_edit(&mut ctx, index, title, date, notes),
        Some(Commands::Toggle { index }) => handle_toggle(&mut ctx, index),
        Some(Commands::Delete { index }) => handle_delete(&mut ctx, index),
        Some(Commands::Status) => handle_status(&ctx),
        None => handle_list(&ctx),
    }
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "eventkeep=debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn storage_root(cli: &Cli) -> Result<PathBuf> {
    if let Some(home) = &cli.home {
        return Ok(home.clone());
    }
    if let Some(home) = std::env::var_os("EVENTKEEP_HOME") {
        return Ok(PathBuf::from(home));
    }
    ProjectDirs::from("com", "eventkeep", "eventkeep")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .ok_or_else(|| EventKeepError::Config("Could not determine data dir".to_string()))
}

fn init_context(cli: &Cli) -> Result<AppContext> {
    let root = storage_root(cli)?;
    let config = EventKeepConfig::load(&root)?;

    let refresher: Refresher = match CommandRefresher::from_argv(&config.refresh_command) {
        Some(command) => Box::new(move || command.reload_all_timelines()),
        None => Box::new(|| {}),
    };
    let slots = FsSlotStore::new(&root, &config.group_id);
    let (cache, load) = EventCache::open(Persistence::new(slots, refresher));

    Ok(AppContext {
        cache,
        config,
        root,
        load,
    })
}

fn handle_add(ctx: &mut AppContext, title: String, date: String, notes: String) -> Result<()> {
    if title.trim().is_empty() {
        return Err(EventKeepError::InvalidInput("Title cannot be empty".into()));
    }
    let date = parse_when(&date)?;
    let event = Event::new(title, date, notes);
    let label = event.title.clone();

    report_mutation(ctx.cache.add(event), &format!("Event added: {}", label));
    Ok(())
}

fn handle_list(ctx: &AppContext) -> Result<()> {
    let listed: Vec<(usize, &Event)> = ctx.cache.events().iter().enumerate().collect();
    print_events(&listed);
    Ok(())
}

fn handle_on(ctx: &AppContext, day: String) -> Result<()> {
    let day = if day == "today" {
        Local::now().date_naive()
    } else {
        NaiveDate::parse_from_str(&day, "%Y-%m-%d")
            .map_err(|_| EventKeepError::InvalidInput(format!("Invalid day: {}", day)))?
    };
    let found = ctx.cache.events_on(day);
    print_events(&with_positions(ctx, &found));
    Ok(())
}

fn handle_upcoming(ctx: &AppContext, days: Option<i64>) -> Result<()> {
    let days = days.unwrap_or(ctx.config.upcoming_days);
    if days < 0 {
        return Err(EventKeepError::InvalidInput("Days cannot be negative".into()));
    }
    let found = ctx.cache.upcoming(days);
    print_events(&with_positions(ctx, &found));
    Ok(())
}

fn handle_month(ctx: &AppContext) -> Result<()> {
    let found = ctx.cache.events_in_current_month();
    print_events(&with_positions(ctx, &found));

    let days = ctx.cache.event_days_in_current_month();
    if !days.is_empty() {
        let list: Vec<String> = days.keys().map(|d| d.to_string()).collect();
        println!("\n{} {}", "Days with events:".dimmed(), list.join(", "));
    }
    Ok(())
}

fn handle_edit(
    ctx: &mut AppContext,
    index: usize,
    title: Option<String>,
    date: Option<String>,
    notes: Option<String>,
) -> Result<()> {
    let mut event = resolve_index(ctx, index)?.clone();
    if let Some(title) = title {
        if title.trim().is_empty() {
            return Err(EventKeepError::InvalidInput("Title cannot be empty".into()));
        }
        event.title = title;
    }
    if let Some(date) = date {
        event.date = parse_when(&date)?;
    }
    if let Some(notes) = notes {
        event.notes = notes;
    }

    let label = event.title.clone();
    report_mutation(ctx.cache.update(event), &format!("Event updated: {}", label));
    Ok(())
}

fn handle_toggle(ctx: &mut AppContext, index: usize) -> Result<()> {
    let event = resolve_index(ctx, index)?;
    let (id, label) = (event.id, event.title.clone());
    let message = if event.is_completed {
        format!("Event reopened: {}", label)
    } else {
        format!("Event completed: {}", label)
    };

    report_mutation(ctx.cache.toggle_complete(&id), &message);
    Ok(())
}

fn handle_delete(ctx: &mut AppContext, index: usize) -> Result<()> {
    let event = resolve_index(ctx, index)?;
    let (id, label) = (event.id, event.title.clone());

    report_save(&ctx.cache.delete(&id), &format!("Event deleted: {}", label));
    Ok(())
}

fn handle_status(ctx: &AppContext) -> Result<()> {
    let persistence = ctx.cache.persistence();
    println!("{:<10} {}", "root".dimmed(), ctx.root.display());
    println!("{:<10} {}", "group".dimmed(), ctx.config.group_id);
    println!(
        "{:<10} {}",
        "slots".dimmed(),
        persistence.slots().dir().display()
    );
    println!("{:<10} {}", "events".dimmed(), ctx.cache.len());
    println!("{:<10} {}", "loaded".dimmed(), describe_load(&ctx.load));

    let backup = match persistence.backup_taken_at() {
        Some(at) if persistence.has_backup() => format!("taken {}", format_time_ago(at)),
        _ if persistence.has_backup() => "present".to_string(),
        _ => "none".to_string(),
    };
    println!("{:<10} {}", "backup".dimmed(), backup);
    Ok(())
}

/// How this run's collection was obtained, e.g. `backup (undecodable)`.
fn describe_load(report: &LoadReport) -> String {
    let source = match report.source {
        LoadSource::Empty => "empty",
        LoadSource::Primary => "primary",
        LoadSource::Backup => "backup",
        LoadSource::Reset => "reset",
    };
    let corruption = match report.corruption {
        Some(Corruption::Unreadable) => "unreadable",
        Some(Corruption::Undecodable) => "undecodable",
        Some(Corruption::Suspicious) => "suspicious",
        None => return source.to_string(),
    };
    format!("{} ({})", source, corruption)
}

fn report_mutation(mutation: Mutation, success: &str) {
    match mutation {
        Mutation::Persisted(report) => report_save(&report, success),
        Mutation::Skipped(e) => println!("{}", format!("Nothing changed: {}", e).yellow()),
    }
}

fn report_save(report: &SaveReport, success: &str) {
    match report.status {
        SaveStatus::Saved => println!("{}", success.green()),
        SaveStatus::Partial { dropped } => {
            println!("{}", success.green());
            println!(
                "{}",
                format!("{} event(s) could not be stored and were dropped", dropped).yellow()
            );
        }
        SaveStatus::Failed => println!("{}", "Changes could not be saved to disk".red()),
    }
}

/// Pair each event with its 1-based position in the full listing.
fn with_positions<'a>(ctx: &AppContext, events: &[&'a Event]) -> Vec<(usize, &'a Event)> {
    events
        .iter()
        .map(|e| {
            let pos = ctx
                .cache
                .events()
                .iter()
                .position(|other| other.id == e.id)
                .unwrap_or_default();
            (pos, *e)
        })
        .collect()
}

fn resolve_index(ctx: &AppContext, index: usize) -> Result<&Event> {
    index
        .checked_sub(1)
        .and_then(|i| ctx.cache.events().get(i))
        .ok_or_else(|| EventKeepError::InvalidInput(format!("No event at position {}", index)))
}

fn parse_when(s: &str) -> Result<NaiveDateTime> {
    const FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M", "%Y-%m-%dT%H:%M:%S"];

    let s = s.trim();
    for format in FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
            return Ok(dt);
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map(|d| d.and_time(NaiveTime::MIN))
        .map_err(|_| EventKeepError::InvalidInput(format!("Invalid date: {}", s)))
}

const LINE_WIDTH: usize = 80;
const DATE_WIDTH: usize = 17;

fn print_events(events: &[(usize, &Event)]) {
    if events.is_empty() {
        println!("No events found.");
        return;
    }

    for (pos, event) in events {
        let idx_str = format!("{:>3}. ", pos + 1);
        let marker = if event.is_completed { "✓ " } else { "  " };
        let date_str = event.date.format("%Y-%m-%d %H:%M").to_string();

        let fixed_width = idx_str.width() + marker.width() + DATE_WIDTH + 2;
        let available = LINE_WIDTH.saturating_sub(fixed_width);
        let title = truncate_to_width(&event.title, available);
        let padding = available.saturating_sub(title.width());

        let title_colored = if event.is_completed {
            title.dimmed().strikethrough()
        } else {
            title.normal()
        };

        println!(
            "{}{}{}{}  {}",
            idx_str,
            marker.green(),
            title_colored,
            " ".repeat(padding),
            date_str.dimmed()
        );
        if !event.notes.is_empty() {
            println!("{}{}", " ".repeat(idx_str.width() + 2), event.notes.dimmed());
        }
    }
}

fn truncate_to_width(s: &str, max_width: usize) -> String {
    use unicode_width::UnicodeWidthChar;

    if s.width() <= max_width {
        return s.to_string();
    }

    // Leave one column for the ellipsis
    let budget = max_width.saturating_sub(1);
    let mut result = String::new();
    let mut current_width = 0;
    for c in s.chars() {
        let char_width = c.width().unwrap_or(0);
        if current_width + char_width > budget {
            break;
        }
        result.push(c);
        current_width += char_width;
    }
    result.push('…');
    result
}

fn format_time_ago(timestamp: chrono::DateTime<Utc>) -> String {
    let duration = Utc::now().signed_duration_since(timestamp);
    timeago::Formatter::new().convert(duration.to_std().unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_fit_is_not_truncated() {
        assert_eq!(truncate_to_width("abcde", 5), "abcde");
        assert_eq!(truncate_to_width("日本", 4), "日本");
        assert_eq!(truncate_to_width("", 0), "");
    }

    #[test]
    fn overflow_ends_in_ellipsis_within_width() {
        let cut = truncate_to_width("abcdef", 5);
        assert_eq!(cut, "abcd…");
        assert!(cut.width() <= 5);

        // A wide char that would straddle the limit is dropped whole
        let cut = truncate_to_width("日本語", 4);
        assert_eq!(cut, "日…");
        assert!(cut.width() <= 4);
    }

    #[test]
    fn load_description_names_source_and_damage() {
        let mut report = LoadReport {
            source: LoadSource::Primary,
            corruption: None,
            healed: None,
            errors: Vec::new(),
        };
        assert_eq!(describe_load(&report), "primary");

        report.source = LoadSource::Backup;
        report.corruption = Some(Corruption::Undecodable);
        assert_eq!(describe_load(&report), "backup (undecodable)");
    }
}
