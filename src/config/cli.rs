use clap::Parser;

#[derive(Debug, Clone, Parser)]
#[command(name = "jobscout")]
#[command(about = "Concurrent multi-source job search with profile-based scoring")]
pub struct CliArgs {
    #[arg(long, default_value = "configs/search.toml")]
    pub config: String,

    #[arg(long, default_value = "configs/profile.json")]
    pub profile: String,

    #[arg(
        long,
        value_delimiter = ',',
        help = "Restrict the run to these source ids (comma-separated)"
    )]
    pub source: Vec<String>,

    #[arg(long, help = "Override the configured output directory")]
    pub output: Option<String>,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,
}
