// CLI argument definitions using clap

use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(name = "iocx")]
#[command(author = "hatlonely <hatlonely@foxmail.com>")]
#[command(version = "0.1.0")]
#[command(about = "Inspect and validate XML bean definition documents", long_about = None)]
pub struct Cli {
    /// Path to a context config file (yaml, json or toml)
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Definition locations, in override order (repeatable)
    #[arg(short, long = "location", global = true)]
    pub locations: Vec<String>,

    /// Resolve plain paths against these class path roots instead of the working directory
    #[arg(long = "classpath", global = true, value_delimiter = ',')]
    pub class_path_roots: Vec<String>,

    /// Fail when two documents define the same bean name
    #[arg(long, global = true)]
    pub no_override: bool,

    /// Skip unknown elements and attributes instead of failing
    #[arg(long, global = true)]
    pub lenient: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List bean definitions in registration order
    List(ListArgs),
    /// Show a single bean definition
    Show(ShowArgs),
    /// Validate references, cycles and bean types
    Check(CheckArgs),
}

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Long listing format (type, scope, source)
    #[arg(short, long)]
    pub long: bool,
}

#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Bean name or alias
    pub name: String,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Yaml)]
    pub format: OutputFormat,
}

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Treat unregistered bean types as errors
    #[arg(long)]
    pub strict_types: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Yaml,
}
