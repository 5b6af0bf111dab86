use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "appver")]
#[command(author = "Alberto Cavalcante")]
#[command(version)]
#[command(about = "Declarative application version provisioning", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Project file (TOML, or JSON by extension)
    #[arg(
        short,
        long,
        global = true,
        env = "APPVER_CONFIG",
        default_value = "appver.toml"
    )]
    pub config: PathBuf,

    /// State file (defaults to appver.state.toml next to the project file)
    #[arg(long, global = true, env = "APPVER_STATE")]
    pub state: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Preview what apply would change (no remote calls)
    Plan(TargetArgs),

    /// Upload bundles and register or adopt versions
    Apply(ApplyArgs),

    /// Show recorded versions
    Show(TargetArgs),

    /// Forget recorded versions (registered versions are left in place)
    Destroy(DestroyArgs),

    /// Print the version label derived from a bundle filename
    Label {
        /// Bundle filename, e.g. release-1.2.zip
        filename: String,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Args)]
pub struct TargetArgs {
    /// Only this resource ("name" or "application_version.name")
    #[arg(short, long)]
    pub target: Option<String>,
}

#[derive(Args)]
pub struct ApplyArgs {
    /// Only this resource ("name" or "application_version.name")
    #[arg(short, long)]
    pub target: Option<String>,

    /// Skip the confirmation prompt
    #[arg(short, long)]
    pub yes: bool,

    /// Show the plan without applying it
    #[arg(long)]
    pub dry_run: bool,

    /// Number of resources applied in parallel
    #[arg(short, long, default_value = "4")]
    pub jobs: u8,
}

#[derive(Args)]
pub struct DestroyArgs {
    /// Only this resource ("name" or "application_version.name")
    #[arg(short, long)]
    pub target: Option<String>,

    /// Skip the confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
}
