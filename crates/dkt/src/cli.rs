//! CLI argument definitions for `dkt`.

use clap::{Args, Parser, Subcommand};

/// `dkt` -- a local-first, dependency-aware issue tracker.
#[derive(Debug, Parser)]
#[command(name = "dkt", version, about = "Local-first issue tracker", max_term_width = 100)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Flags shared by every command.
#[derive(Debug, Args)]
pub struct GlobalArgs {
    /// Emit a structured JSON envelope instead of human output.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress informational output.
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Verbose logging to stderr.
    #[arg(long, global = true)]
    pub verbose: bool,

    /// Author recorded in the activity log (defaults to the VCS user).
    #[arg(long, global = true)]
    pub author: Option<String>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Create the docket directory and database.
    Init,
    /// Show resolved paths and database facts.
    Config,
    /// Print version information.
    Version,
    /// Issue counts by status and priority.
    Stats,
    /// List issues.
    #[command(alias = "ls")]
    List(ListArgs),
    /// Show one issue in full.
    Show(ShowArgs),
    /// Create an issue.
    Create(CreateArgs),
    /// Edit fields of an issue.
    Edit(EditArgs),
    /// Move an issue to another status.
    #[command(name = "move")]
    Move(MoveArgs),
    /// Shortcut: set status to done.
    Close(IdArg),
    /// Shortcut: set status back to todo.
    Reopen(IdArg),
    /// Delete an issue.
    Delete(DeleteArgs),
    /// Manage comments.
    #[command(subcommand)]
    Comment(CommentCommands),
    /// List comments on an issue (alias for `comment list`).
    Comments(IdArg),
    /// Manage labels.
    #[command(subcommand)]
    Label(LabelCommands),
    /// Manage file attachments.
    #[command(subcommand)]
    File(FileCommands),
    /// Manage relations between issues.
    #[command(subcommand)]
    Link(LinkCommands),
    /// Walk the dependency graph from an issue.
    Graph(GraphArgs),
    /// Issues grouped by status.
    Board,
    /// Work-ready issues: leaves with every blocker done.
    Next(NextArgs),
    /// Phased execution plan over the dependency DAG.
    Plan(PlanArgs),
    /// Export the database (json, csv, or markdown).
    Export(ExportArgs),
    /// Import a JSON export.
    Import(ImportArgs),
}

/// A single issue id argument (`DKT-7` or bare `7`).
#[derive(Debug, Args)]
pub struct IdArg {
    /// Issue id.
    pub id: String,
}

#[derive(Debug, Args)]
pub struct ListArgs {
    /// Filter by status (repeatable, OR-combined).
    #[arg(long = "status", short = 's')]
    pub statuses: Vec<String>,

    /// Filter by priority (repeatable, OR-combined).
    #[arg(long = "priority", short = 'p')]
    pub priorities: Vec<String>,

    /// Filter by type (repeatable, OR-combined).
    #[arg(long = "type", short = 't')]
    pub kinds: Vec<String>,

    /// Filter by label (repeatable, AND-combined).
    #[arg(long = "label", short = 'l')]
    pub labels: Vec<String>,

    /// Filter by assignee.
    #[arg(long, short = 'a')]
    pub assignee: Option<String>,

    /// Only direct children of this issue.
    #[arg(long)]
    pub parent: Option<String>,

    /// Only issues without a parent.
    #[arg(long)]
    pub roots: bool,

    /// Include done issues.
    #[arg(long)]
    pub all: bool,

    /// Sort as `field` or `field:dir` (asc/desc).
    #[arg(long)]
    pub sort: Option<String>,

    /// Render as a parent/child hierarchy.
    #[arg(long)]
    pub tree: bool,
}

#[derive(Debug, Args)]
pub struct ShowArgs {
    /// Issue id.
    pub id: String,
}

#[derive(Debug, Args)]
pub struct CreateArgs {
    /// Issue title.
    pub title: String,

    /// Long description.
    #[arg(long, short = 'd', default_value = "")]
    pub description: String,

    /// Initial status.
    #[arg(long, short = 's')]
    pub status: Option<String>,

    /// Priority.
    #[arg(long, short = 'p')]
    pub priority: Option<String>,

    /// Issue type.
    #[arg(long = "type", short = 't')]
    pub kind: Option<String>,

    /// Assignee.
    #[arg(long, short = 'a')]
    pub assignee: Option<String>,

    /// Parent issue id.
    #[arg(long)]
    pub parent: Option<String>,

    /// Attach a label (repeatable).
    #[arg(long = "label", short = 'l')]
    pub labels: Vec<String>,

    /// Attach a file path (repeatable).
    #[arg(long = "file", short = 'f')]
    pub files: Vec<String>,
}

#[derive(Debug, Args)]
pub struct EditArgs {
    /// Issue id.
    pub id: String,

    /// New title.
    #[arg(long)]
    pub title: Option<String>,

    /// New description.
    #[arg(long, short = 'd')]
    pub description: Option<String>,

    /// New status.
    #[arg(long, short = 's')]
    pub status: Option<String>,

    /// New priority.
    #[arg(long, short = 'p')]
    pub priority: Option<String>,

    /// New type.
    #[arg(long = "type", short = 't')]
    pub kind: Option<String>,

    /// New assignee.
    #[arg(long, short = 'a')]
    pub assignee: Option<String>,

    /// New parent id, or `none` to detach.
    #[arg(long)]
    pub parent: Option<String>,
}

#[derive(Debug, Args)]
pub struct MoveArgs {
    /// Issue id.
    pub id: String,

    /// Target status.
    pub status: String,
}

#[derive(Debug, Args)]
pub struct DeleteArgs {
    /// Issue id.
    pub id: String,

    /// Also delete every descendant.
    #[arg(long, conflicts_with = "orphan")]
    pub force: bool,

    /// Detach children before deleting.
    #[arg(long)]
    pub orphan: bool,
}

#[derive(Debug, Subcommand)]
pub enum CommentCommands {
    /// Add a comment to an issue.
    Add(CommentAddArgs),
    /// List comments on an issue.
    List(IdArg),
}

#[derive(Debug, Args)]
pub struct CommentAddArgs {
    /// Issue id.
    pub id: String,

    /// Comment text.
    pub body: String,
}

#[derive(Debug, Subcommand)]
pub enum LabelCommands {
    /// Attach labels to an issue (created on first use).
    Add(LabelAddArgs),
    /// Detach labels from an issue.
    Rm(LabelRmArgs),
    /// List all labels with issue counts.
    List,
    /// Delete a label everywhere.
    Delete(LabelDeleteArgs),
}

#[derive(Debug, Args)]
pub struct LabelAddArgs {
    /// Issue id.
    pub id: String,

    /// Label names.
    #[arg(required = true)]
    pub names: Vec<String>,

    /// Color recorded on newly created labels.
    #[arg(long)]
    pub color: Option<String>,
}

#[derive(Debug, Args)]
pub struct LabelRmArgs {
    /// Issue id.
    pub id: String,

    /// Label names.
    #[arg(required = true)]
    pub names: Vec<String>,
}

#[derive(Debug, Args)]
pub struct LabelDeleteArgs {
    /// Label name.
    pub name: String,
}

#[derive(Debug, Subcommand)]
pub enum FileCommands {
    /// Attach file paths to an issue.
    Add(FilePathsArgs),
    /// Detach file paths from an issue.
    Remove(FilePathsArgs),
    /// List the files attached to an issue.
    List(IdArg),
}

#[derive(Debug, Args)]
pub struct FilePathsArgs {
    /// Issue id.
    pub id: String,

    /// File paths.
    #[arg(required = true)]
    pub paths: Vec<String>,
}

#[derive(Debug, Subcommand)]
pub enum LinkCommands {
    /// Create a relation between two issues.
    Add(LinkAddArgs),
    /// Remove a relation.
    Remove(LinkRemoveArgs),
    /// List the relations of an issue.
    List(IdArg),
}

#[derive(Debug, Args)]
pub struct LinkAddArgs {
    /// Source issue id.
    pub source: String,

    /// Target issue id.
    pub target: String,

    /// Relation type: blocks, depends_on, relates_to, duplicates.
    #[arg(long = "type", short = 't', default_value = "blocks")]
    pub relation_type: String,
}

#[derive(Debug, Args)]
pub struct LinkRemoveArgs {
    /// Source issue id.
    pub source: String,

    /// Target issue id.
    pub target: String,

    /// Relation type.
    #[arg(long = "type", short = 't', default_value = "blocks")]
    pub relation_type: String,
}

#[derive(Debug, Args)]
pub struct GraphArgs {
    /// Starting issue id.
    pub id: String,

    /// Walk direction: up (blockers), down (blocked), or both.
    #[arg(long, default_value = "both")]
    pub direction: String,

    /// Maximum depth (0 = unlimited).
    #[arg(long, default_value_t = 0)]
    pub depth: usize,
}

#[derive(Debug, Args)]
pub struct NextArgs {
    /// Statuses eligible for ready work (default: backlog, todo).
    #[arg(long = "status", short = 's')]
    pub statuses: Vec<String>,
}

#[derive(Debug, Args)]
pub struct PlanArgs {
    /// Scope to the sub-tree rooted at this issue.
    #[arg(long)]
    pub root: Option<String>,

    /// Keep only these statuses (repeatable).
    #[arg(long = "status", short = 's')]
    pub statuses: Vec<String>,

    /// Keep only issues carrying all these labels (repeatable).
    #[arg(long = "label", short = 'l')]
    pub labels: Vec<String>,
}

#[derive(Debug, Args)]
pub struct ExportArgs {
    /// Output format: json, csv, or markdown.
    #[arg(long, default_value = "json")]
    pub format: String,

    /// Write to a file instead of stdout.
    #[arg(long, short = 'o')]
    pub output: Option<String>,

    /// Restrict to issues with these statuses (repeatable).
    #[arg(long = "status", short = 's')]
    pub statuses: Vec<String>,

    /// Restrict to issues carrying all these labels (repeatable).
    #[arg(long = "label", short = 'l')]
    pub labels: Vec<String>,
}

#[derive(Debug, Args)]
pub struct ImportArgs {
    /// Path to a JSON export document.
    pub path: String,

    /// Insert-or-ignore into the existing data.
    #[arg(long, conflicts_with = "replace")]
    pub merge: bool,

    /// Clear all existing data first.
    #[arg(long)]
    pub replace: bool,
}
