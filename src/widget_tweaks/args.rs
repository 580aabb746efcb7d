use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "widget-tweaks")]
#[command(about = "Render form templates with widget attribute tweaks", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Directory holding widget-tweaks.json
    #[arg(long, global = true)]
    pub config_dir: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Render a template with a form in context
    #[command(alias = "r")]
    Render {
        /// Template file; templates next to it can be included
        template: PathBuf,

        /// Form description (JSON)
        #[arg(short, long)]
        form: PathBuf,

        /// Submitted data (JSON); binds and validates the form
        #[arg(short, long)]
        data: Option<PathBuf>,

        /// Extra context variables (e.g. WIDGET_ERROR_CLASS=is-invalid)
        #[arg(long = "var", value_name = "KEY=VALUE")]
        vars: Vec<String>,
    },

    /// Compile templates and report render_field syntax errors
    Check {
        /// Template files
        #[arg(required = true, num_args = 1..)]
        templates: Vec<PathBuf>,
    },

    /// List the available filters
    Filters,

    /// Get or set configuration values
    Config {
        /// Configuration key (error-class, required-class)
        key: Option<String>,

        /// Value to set (empty string clears)
        value: Option<String>,
    },
}
