use super::Parser;

#[derive(Parser, Debug)]
#[command(about = "Credential service for the docuflow backend")]
pub struct Cli {
    /// Settings file; defaults to the build-profile path.
    #[arg(long)]
    pub settings: Option<String>,

    /// Overrides the log filter from the settings file.
    #[arg(long)]
    pub log_filter: Option<String>,
}
