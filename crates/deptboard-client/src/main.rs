//! `deptboard` — command-line client for the department dashboard.
//!
//! # Usage
//!
//! ```
//! deptboard --url http://localhost:5000 departments --all
//! deptboard --config ~/.config/deptboard.toml calendar --month 2
//! deptboard --role ADMIN toggle 3
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use chrono::{DateTime, Datelike as _, Local, Utc};
use clap::{Parser, Subcommand};
use deptboard_client::{
  ApiClient, ApiConfig, Board, SyncPolicy,
  aggregate::{self, CalendarMonth},
  nav::{Navigation, Tab},
  view::{Lang, Role, Snapshot, User},
};
use deptboard_core::{
  DepartmentId, TopicId, activity::SignalKind, department::DepartmentInput,
};
use serde::Deserialize;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "deptboard", about = "Command-line client for the department dashboard")]
struct Args {
  /// Path to a TOML config file.
  #[arg(short, long, value_name = "FILE")]
  config: Option<PathBuf>,

  /// Origin of the deptboard server, e.g. http://localhost:5000.
  #[arg(long, env = "DEPTBOARD_URL")]
  url: Option<String>,

  /// Production build: require `--url` instead of the local dev server.
  #[arg(long, env = "DEPTBOARD_PRODUCTION")]
  production: bool,

  /// Display language (`en` or `cn`).
  #[arg(long, env = "DEPTBOARD_LANG")]
  lang: Option<Lang>,

  #[arg(long, env = "DEPTBOARD_USER_ID")]
  user_id: Option<i64>,

  #[arg(long, env = "DEPTBOARD_USER_NAME")]
  user_name: Option<String>,

  /// SUPER_ADMIN, ADMIN or USER.
  #[arg(long, env = "DEPTBOARD_ROLE")]
  role: Option<Role>,

  /// `incremental` or `full-resync`.
  #[arg(long, env = "DEPTBOARD_SYNC")]
  sync: Option<SyncPolicy>,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// List departments on the home screen (`--all` includes hidden ones).
  Departments {
    #[arg(long)]
    all: bool,
  },
  /// Show one department with its recent signals.
  Show { name: String },
  /// List forum nodes, or the topics of one node.
  Forum { node: Option<String> },
  /// Signal counts per day for one month.
  Calendar {
    #[arg(long)]
    year:  Option<i32>,
    #[arg(long)]
    month: Option<u32>,
  },
  /// System updates across all departments, newest first.
  Report,
  /// Post a signal (REQUEST, FEEDBACK, MEETING, SYSTEM_UPDATE).
  Signal {
    department: String,
    kind:       SignalKind,
    content:    String,
  },
  /// Open a forum topic under GLOBAL or a department.
  Topic {
    node:    String,
    title:   String,
    content: String,
  },
  /// Reply to a forum topic.
  Reply { topic_id: TopicId, content: String },
  /// Create (no `--id`) or update a department. Admin only.
  SaveDept {
    #[arg(long)]
    id:          Option<DepartmentId>,
    #[arg(long)]
    name:        Option<String>,
    #[arg(long)]
    hod:         Option<String>,
    #[arg(long)]
    version:     Option<String>,
    #[arg(long)]
    description: Option<String>,
    #[arg(long)]
    percent:     Option<i64>,
    #[arg(long)]
    visible:     Option<bool>,
  },
  /// Show or hide a department on the home screen. Admin only.
  Toggle { id: DepartmentId },
  /// Bump the last-updated stamp of every visible department. Admin only.
  SyncDates,
}

impl Command {
  fn needs_admin(&self) -> bool {
    matches!(self, Command::SaveDept { .. } | Command::Toggle { .. } | Command::SyncDates)
  }
}

// ─── Config file ──────────────────────────────────────────────────────────────

/// Shape of the optional TOML config file.
#[derive(Deserialize, Default)]
#[serde(default)]
struct ConfigFile {
  url:        Option<String>,
  production: Option<bool>,
  lang:       Option<Lang>,
  user_id:    Option<i64>,
  user_name:  Option<String>,
  role:       Option<Role>,
  sync:       Option<SyncPolicy>,
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_writer(std::io::stderr)
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy(),
    )
    .init();

  let args = Args::parse();

  let file_cfg: ConfigFile = if let Some(path) = &args.config {
    let raw = std::fs::read_to_string(path)
      .with_context(|| format!("reading config file {}", path.display()))?;
    toml::from_str(&raw).context("parsing config file")?
  } else {
    ConfigFile::default()
  };

  // CLI flags and env override the config file, which overrides defaults.
  let url = args.url.or(file_cfg.url);
  let production = args.production || file_cfg.production.unwrap_or(false);
  let api_config = ApiConfig::resolve(url.as_deref(), production)?;

  let defaults = User::default();
  let user = User {
    id:   args.user_id.or(file_cfg.user_id).unwrap_or(defaults.id),
    name: args.user_name.or(file_cfg.user_name).unwrap_or(defaults.name),
    role: args.role.or(file_cfg.role).unwrap_or(defaults.role),
  };

  if args.command.needs_admin() {
    let mut nav = Navigation::new();
    nav.select_tab(Tab::Profile);
    nav.open_admin(user.role)?;
  }

  let client = ApiClient::new(api_config)?;
  let mut board = Board::new(client, user)
    .with_lang(args.lang.or(file_cfg.lang).unwrap_or_default())
    .with_policy(args.sync.or(file_cfg.sync).unwrap_or_default());

  board.refresh().await.context("loading dashboard")?;

  run(&mut board, args.command).await
}

async fn run(board: &mut Board<ApiClient>, command: Command) -> Result<()> {
  match command {
    Command::Departments { all } => print_departments(&board.snapshot(), all),
    Command::Show { name } => print_department(&board.snapshot(), &name),
    Command::Forum { node: None } => print_forums(&board.snapshot()),
    Command::Forum { node: Some(node) } => print_topics(&board.snapshot(), &node)?,
    Command::Calendar { year, month } => {
      let today = Local::now().date_naive();
      let grid = CalendarMonth::new(
        year.unwrap_or(today.year()),
        month.unwrap_or(today.month()),
      )
      .ok_or_else(|| anyhow!("no such month"))?;
      print_calendar(&board.snapshot(), grid);
    }
    Command::Report => print_report(&board.snapshot()),

    Command::Signal { department, kind, content } => {
      let signal = board.post_signal(&department, kind, &content).await?;
      println!("posted {} #{} to {}", signal.kind, signal.id, signal.department);
    }
    Command::Topic { node, title, content } => {
      let id = board.create_topic(&node, &title, &content).await?;
      println!("opened topic #{id} in {node}");
    }
    Command::Reply { topic_id, content } => {
      let reply = board.add_reply(topic_id, &content).await?;
      println!("replied #{} to topic #{topic_id}", reply.id);
    }

    Command::SaveDept { id, name, hod, version, description, percent, visible } => {
      let fields = DepartmentInput {
        name,
        hod_name: hod,
        status_update: version,
        description_en: description,
        percent_complete: percent,
        is_visible: visible,
        ..DepartmentInput::default()
      };
      let dept = board.update_department(id, fields).await?;
      println!("saved department #{} {}", dept.id, dept.name);
    }
    Command::Toggle { id } => {
      let dept = board.toggle_visibility(id).await?;
      let state = if dept.visible { "visible" } else { "hidden" };
      println!("{} is now {state}", dept.name);
    }
    Command::SyncDates => {
      let saved = board.sync_all_dates().await?;
      println!("synced {} departments", saved.len());
    }
  }
  Ok(())
}

// ─── Output ───────────────────────────────────────────────────────────────────

fn local(at: DateTime<Utc>) -> String {
  at.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string()
}

fn print_departments(snapshot: &Snapshot, all: bool) {
  let depts: Vec<_> = if all {
    snapshot.admin_departments().iter().collect()
  } else {
    snapshot.home_departments().collect()
  };
  for d in depts {
    let hidden = if d.visible { "" } else { "  (hidden)" };
    println!(
      "{:>3}  {:<12} {:>4}%  {:<8} {:<20} {}{hidden}",
      d.id,
      d.name,
      d.percent,
      d.version,
      d.hod,
      d.last_update_label(),
    );
  }
}

fn print_department(snapshot: &Snapshot, name: &str) {
  let d = snapshot.department_info(name);
  println!("{} ({})", d.name, d.version);
  println!("  head:     {}", d.hod);
  println!("  progress: {}%", d.percent);
  println!("  updated:  {}", d.last_update_label());
  if !d.description.is_empty() {
    println!("  {}", d.description);
  }

  let signals = snapshot.signals(name);
  if !signals.is_empty() {
    println!();
    for s in signals.iter().take(10) {
      let author = s.author.as_deref().unwrap_or("unknown");
      println!("  [{}] {} {author}: {}", s.kind, local(s.timestamp), s.content);
    }
  }

  if let Some(topic) = snapshot.latest_topic(name) {
    println!();
    println!("  latest topic: #{} {} ({} replies)", topic.id, topic.title, topic.replies.len());
  }
}

fn print_forums(snapshot: &Snapshot) {
  for f in &snapshot.forums {
    println!("{:<12} {:>3} topics  {}", f.key, f.topics.len(), f.description);
  }
}

fn print_topics(snapshot: &Snapshot, node: &str) -> Result<()> {
  let forum = snapshot
    .forum(node)
    .ok_or_else(|| anyhow!("unknown forum node {node:?}"))?;
  println!("{}: {}", forum.key, forum.description);
  for t in forum.topics.values().rev() {
    println!();
    println!("#{} {} by {} at {}", t.id, t.title, t.author, local(t.created_at));
    println!("  {}", t.content);
    for r in &t.replies {
      println!("    > {} ({}): {}", r.author, local(r.created_at), r.content);
    }
  }
  Ok(())
}

fn print_calendar(snapshot: &Snapshot, grid: CalendarMonth) {
  let days = aggregate::calendar_by_day(snapshot, &Local);
  println!("{}-{:02}", grid.year, grid.month);
  for day in grid.cells().into_iter().flatten() {
    let Some(summary) = days.get(&grid.key(day)) else { continue };
    let counts: Vec<String> = summary
      .counts
      .iter()
      .filter(|(_, n)| **n > 0)
      .map(|(kind, n)| format!("{kind}: {n}"))
      .collect();
    println!("  {}  {}", grid.key(day), counts.join(", "));
  }
}

fn print_report(snapshot: &Snapshot) {
  let report = aggregate::report(snapshot);
  println!(
    "{} system updates from {} / {} departments",
    report.total,
    report.coverage,
    snapshot.departments.len(),
  );
  for u in &report.updates {
    println!("  {} {:<12} {}", local(u.timestamp), u.department, u.content);
  }
}
