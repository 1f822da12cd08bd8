//! Clap derive structures for the `tripdesk` CLI.
//!
//! Defines the command tree, global flags, and the field groups shared
//! between `create` and `update` subcommands.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};

use tripdesk_core::model::{QuestionType, ReservationStatus};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// tripdesk -- admin console for the travel-booking backend
#[derive(Debug, Parser)]
#[command(
    name = "tripdesk",
    version,
    about = "Administer trips, events, reservations and surveys from the command line",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Backend profile to use
    #[arg(long, short = 'p', env = "TRIPDESK_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Backend URL (overrides profile)
    #[arg(long, short = 'b', env = "TRIPDESK_BASE_URL", global = true)]
    pub base_url: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "TRIPDESK_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Disable color output (same as --color never)
    #[arg(long, global = true, conflicts_with = "color")]
    pub no_color: bool,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    /// Request timeout in seconds (overrides profile)
    #[arg(long, env = "TRIPDESK_TIMEOUT", global = true)]
    pub timeout: Option<u64>,

    /// Fail on malformed responses instead of showing empty data
    #[arg(long, global = true)]
    pub strict: bool,
}

impl GlobalOpts {
    pub fn color_mode(&self) -> ColorMode {
        if self.no_color {
            ColorMode::Never
        } else {
            self.color.clone()
        }
    }
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one id per line (scripting)
    Plain,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ColorMode {
    Auto,
    Always,
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Log in as an administrator
    Login {
        /// Admin e-mail (defaults to the profile's e-mail)
        #[arg(long, short = 'e')]
        email: Option<String>,
    },

    /// Forget stored tokens for the active profile
    Logout,

    /// Show the logged-in administrator
    Whoami,

    /// Manage trips
    #[command(alias = "t")]
    Trips(TripsArgs),

    /// Manage events
    #[command(alias = "ev")]
    Events(EventsArgs),

    /// Review trip reservations
    #[command(alias = "res")]
    Reservations(ReservationsArgs),

    /// Review event reservations
    EventReservations(EventReservationsArgs),

    /// Manage surveys
    Surveys(SurveysArgs),

    /// Manage survey questions
    Questions(QuestionsArgs),

    /// Browse question responses
    Responses(ResponsesArgs),

    /// Manage loyalty rewards
    Rewards(RewardsArgs),

    /// Manage end-user accounts
    Users(UsersArgs),

    /// Manage administrator accounts and password recovery
    Admins(AdminsArgs),

    /// Moderate community posts
    Posts(PostsArgs),

    /// Show dashboard statistics
    #[command(alias = "dash")]
    Dashboard(DashboardArgs),

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  TRIPS & EVENTS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct TripsArgs {
    #[command(subcommand)]
    pub command: TripsCommand,
}

#[derive(Debug, Subcommand)]
pub enum TripsCommand {
    /// List trips
    #[command(alias = "ls")]
    List,

    /// Show one trip
    Get { id: String },

    /// Create a trip
    Create(TripFields),

    /// Update a trip; unset fields keep their current value
    Update {
        id: String,
        #[command(flatten)]
        fields: TripFields,
    },

    /// Delete a trip
    #[command(alias = "rm")]
    Delete { id: String },

    /// Flip a trip between available and unavailable
    Toggle { id: String },
}

#[derive(Debug, Args)]
pub struct TripFields {
    #[arg(long)]
    pub destination: Option<String>,

    #[arg(long)]
    pub description: Option<String>,

    /// First day (YYYY-MM-DD)
    #[arg(long)]
    pub start_date: Option<NaiveDate>,

    /// Last day (YYYY-MM-DD)
    #[arg(long)]
    pub end_date: Option<NaiveDate>,

    #[arg(long)]
    pub price: Option<f64>,

    /// Discount in percent
    #[arg(long)]
    pub reduction: Option<f64>,

    #[arg(long = "type")]
    pub trip_type: Option<String>,

    #[arg(long, action = clap::ArgAction::Set)]
    pub available: Option<bool>,

    /// Image file to upload
    #[arg(long)]
    pub image: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct EventsArgs {
    #[command(subcommand)]
    pub command: EventsCommand,
}

#[derive(Debug, Subcommand)]
pub enum EventsCommand {
    /// List events
    #[command(alias = "ls")]
    List,

    /// Show one event
    Get { id: String },

    /// Create an event
    Create(EventFields),

    /// Update an event; unset fields keep their current value
    Update {
        id: String,
        #[command(flatten)]
        fields: EventFields,
    },

    /// Delete an event
    #[command(alias = "rm")]
    Delete { id: String },

    /// Toggle whether an event is active
    Activate { id: String },
}

#[derive(Debug, Args)]
pub struct EventFields {
    #[arg(long)]
    pub title: Option<String>,

    #[arg(long)]
    pub description: Option<String>,

    #[arg(long)]
    pub location: Option<String>,

    /// Day of the event (YYYY-MM-DD)
    #[arg(long)]
    pub date: Option<NaiveDate>,

    /// Start time, e.g. "18:30"
    #[arg(long)]
    pub time: Option<String>,

    #[arg(long)]
    pub price: Option<f64>,

    #[arg(long, action = clap::ArgAction::Set)]
    pub active: Option<bool>,

    /// Image file to upload
    #[arg(long)]
    pub image: Option<PathBuf>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  RESERVATIONS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ReservationsArgs {
    #[command(subcommand)]
    pub command: ReservationsCommand,
}

#[derive(Debug, Subcommand)]
pub enum ReservationsCommand {
    /// List trip reservations
    #[command(alias = "ls")]
    List {
        /// Only reservations in this status
        #[arg(long, short = 's')]
        status: Option<ReservationStatus>,
    },

    /// Show one reservation
    Get { id: String },

    /// Change a reservation's status
    SetStatus { id: String, status: ReservationStatus },
}

#[derive(Debug, Args)]
pub struct EventReservationsArgs {
    #[command(subcommand)]
    pub command: EventReservationsCommand,
}

#[derive(Debug, Subcommand)]
pub enum EventReservationsCommand {
    /// List event reservations
    #[command(alias = "ls")]
    List,

    /// Show one event reservation
    Get { id: String },

    /// Change an event reservation's status
    SetStatus { id: String, status: ReservationStatus },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  SURVEYS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct SurveysArgs {
    #[command(subcommand)]
    pub command: SurveysCommand,
}

#[derive(Debug, Subcommand)]
pub enum SurveysCommand {
    /// List surveys
    #[command(alias = "ls")]
    List,

    /// Show one survey
    Get { id: String },

    /// Create a draft survey
    Create {
        #[arg(long)]
        title: String,

        #[arg(long, default_value = "")]
        description: String,

        /// Question ids to attach (repeatable)
        #[arg(long = "question")]
        questions: Vec<String>,
    },

    /// Delete a survey
    #[command(alias = "rm")]
    Delete { id: String },

    /// Publish a draft survey
    Publish { id: String },

    /// Close a published survey
    Complete { id: String },

    /// List submitted responses for a survey
    Responses { id: String },
}

#[derive(Debug, Args)]
pub struct QuestionsArgs {
    #[command(subcommand)]
    pub command: QuestionsCommand,
}

#[derive(Debug, Subcommand)]
pub enum QuestionsCommand {
    /// List questions
    #[command(alias = "ls")]
    List {
        /// Only questions of this survey
        #[arg(long)]
        survey: Option<String>,
    },

    /// Show one question
    Get { id: String },

    /// Create a question
    Create {
        #[arg(long)]
        survey: String,

        #[arg(long)]
        text: String,

        #[arg(long = "type", default_value = "short-text")]
        question_type: QuestionType,

        /// Answer option (repeatable, for choice questions)
        #[arg(long = "option")]
        options: Vec<String>,

        #[arg(long, default_value = "0")]
        order: i64,

        #[arg(long)]
        required: bool,
    },

    /// Delete a question
    #[command(alias = "rm")]
    Delete { id: String },
}

#[derive(Debug, Args)]
pub struct ResponsesArgs {
    #[command(subcommand)]
    pub command: ResponsesCommand,
}

#[derive(Debug, Subcommand)]
pub enum ResponsesCommand {
    /// List responses, optionally filtered
    #[command(alias = "ls")]
    List {
        #[arg(long, conflicts_with_all = ["question", "user"])]
        survey: Option<String>,

        #[arg(long, conflicts_with = "user")]
        question: Option<String>,

        #[arg(long)]
        user: Option<String>,
    },

    /// Show one response
    Get { id: String },

    /// Delete a response
    #[command(alias = "rm")]
    Delete { id: String },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  REWARDS, USERS, ADMINS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct RewardsArgs {
    #[command(subcommand)]
    pub command: RewardsCommand,
}

#[derive(Debug, Subcommand)]
pub enum RewardsCommand {
    /// List rewards
    #[command(alias = "ls")]
    List,

    /// Show one reward
    Get { id: String },

    /// Create a reward
    Create {
        #[arg(long)]
        title: String,

        #[arg(long, default_value = "")]
        description: String,

        /// "discount" or "gift"
        #[arg(long)]
        category: String,

        #[arg(long)]
        points: u64,

        /// Required for discount rewards
        #[arg(long)]
        discount: Option<f64>,

        /// Event the reward applies to
        #[arg(long)]
        event: Option<String>,

        #[arg(long)]
        image: Option<PathBuf>,
    },

    /// Delete a reward
    #[command(alias = "rm")]
    Delete { id: String },
}

#[derive(Debug, Args)]
pub struct UsersArgs {
    #[command(subcommand)]
    pub command: UsersCommand,
}

#[derive(Debug, Subcommand)]
pub enum UsersCommand {
    /// List users
    #[command(alias = "ls")]
    List,

    /// Show one user
    Get { id: String },

    /// Delete a user
    #[command(alias = "rm")]
    Delete { id: String },
}

#[derive(Debug, Args)]
pub struct AdminsArgs {
    #[command(subcommand)]
    pub command: AdminsCommand,
}

#[derive(Debug, Subcommand)]
pub enum AdminsCommand {
    /// List administrators
    #[command(alias = "ls")]
    List,

    /// Show one administrator
    Get { id: String },

    /// Create an administrator (prompts for the password)
    Create {
        #[arg(long)]
        name: String,

        #[arg(long)]
        email: String,
    },

    /// Delete an administrator
    #[command(alias = "rm")]
    Delete { id: String },

    /// Send a password-reset code
    ForgotPassword { email: String },

    /// Check a password-reset code
    VerifyOtp { email: String, otp: String },

    /// Set a new password using a reset code (prompts for the password)
    ResetPassword { email: String, otp: String },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  COMMUNITY
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct PostsArgs {
    #[command(subcommand)]
    pub command: PostsCommand,
}

#[derive(Debug, Subcommand)]
pub enum PostsCommand {
    /// List community posts
    #[command(alias = "ls")]
    List,

    /// Publish a post
    Create {
        #[arg(long)]
        text: Option<String>,

        #[arg(long)]
        image: Option<PathBuf>,
    },

    /// Toggle the admin's like on a post
    Like { id: String },

    /// Delete a post
    #[command(alias = "rm")]
    Delete { id: String },

    /// List comments on a post
    Comments { id: String },

    /// Comment on a post
    Comment { id: String, text: String },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  DASHBOARD
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct DashboardArgs {
    #[command(subcommand)]
    pub command: DashboardCommand,
}

#[derive(Debug, Subcommand)]
pub enum DashboardCommand {
    /// User totals and engagement
    Users,
    /// Trip totals and revenue per trip
    Trips,
    /// Survey counters
    Surveys,
    /// Reward counters
    Rewards,
    /// Community counters
    Community,
    /// Monthly revenue split by trips and events
    Revenue,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CONFIG & COMPLETIONS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Create initial config file with guided setup
    Init,

    /// Display current resolved configuration
    Show,

    /// Print the config file location
    Path,

    /// List configured profiles
    Profiles,

    /// Set the default profile
    Use {
        /// Profile name to set as default
        name: String,
    },
}

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
