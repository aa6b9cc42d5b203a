use clap::{Parser, Subcommand, Args};
use crate::moderation::Direction;

#[derive(Parser)]
#[command(name = "guardgate", version, about = "Moderated chat-completion gateway for LLM providers")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase log verbosity (repeat for more)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub log_json: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP gateway
    Serve(ServeArgs),
    /// Validate a configuration file
    Validate(ValidateArgs),
    /// Classify a piece of text without calling any provider
    Moderate(ModerateArgs),
    /// Show provider availability for the current configuration
    Providers(ProvidersArgs),
}

#[derive(Args, Clone)]
pub struct ServeArgs {
    /// YAML configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Listen port (overrides config)
    #[arg(long)]
    pub port: Option<u16>,

    /// Listen address (overrides config)
    #[arg(long)]
    pub host: Option<String>,

    /// Turn guardrails off regardless of config
    #[arg(long)]
    pub no_guardrails: bool,
}

#[derive(Args, Clone)]
pub struct ValidateArgs {
    /// Path to YAML configuration file
    pub config: String,
}

#[derive(Args, Clone)]
pub struct ModerateArgs {
    /// Text to classify
    pub text: String,

    /// Which classifier to run
    #[arg(long, value_enum, default_value = "input")]
    pub direction: DirectionArg,

    /// YAML configuration file (for extra patterns)
    #[arg(short, long)]
    pub config: Option<String>,
}

#[derive(Args, Clone)]
pub struct ProvidersArgs {
    /// YAML configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Clone, Copy, clap::ValueEnum)]
pub enum DirectionArg {
    Input,
    Response,
}

impl From<DirectionArg> for Direction {
    fn from(arg: DirectionArg) -> Self {
        match arg {
            DirectionArg::Input => Direction::Input,
            DirectionArg::Response => Direction::Response,
        }
    }
}
