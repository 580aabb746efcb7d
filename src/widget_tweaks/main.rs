use clap::Parser;
use colored::*;
use directories::ProjectDirs;
use std::fs;
use std::path::{Path, PathBuf};
use widget_tweaks::config::{TweaksConfig, KEYS};
use widget_tweaks::engine::{Context, Renderer};
use widget_tweaks::error::{Result, TweaksError};
use widget_tweaks::forms::{data_from_json, Form};
use widget_tweaks::library::Library;
use widget_tweaks::tag::TAG_NAME;

mod args;
use args::{Cli, Commands};

fn main() {
    if let Err(e) = run() {
        eprintln!("{} {}", "Error:".red().bold(), e.to_string().red());
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config_dir = resolve_config_dir(cli.config_dir.as_deref());
    tracing::debug!(dir = %config_dir.display(), "using config directory");

    match cli.command {
        Commands::Render {
            template,
            form,
            data,
            vars,
        } => handle_render(&config_dir, &template, &form, data.as_deref(), &vars),
        Commands::Check { templates } => handle_check(&config_dir, &templates),
        Commands::Filters => handle_filters(),
        Commands::Config { key, value } => handle_config(&config_dir, key, value),
    }
}

/// `--config-dir`, else the current directory if it has a config file, else
/// the platform config directory.
fn resolve_config_dir(explicit: Option<&Path>) -> PathBuf {
    if let Some(dir) = explicit {
        return dir.to_path_buf();
    }
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    if TweaksConfig::exists_in(&cwd) {
        return cwd;
    }
    ProjectDirs::from("com", "widget-tweaks", "widget-tweaks")
        .map(|dirs| dirs.config_dir().to_path_buf())
        .unwrap_or(cwd)
}

fn renderer(config_dir: &Path) -> Result<Renderer> {
    let config = TweaksConfig::load(config_dir)?;
    Ok(Renderer::with_library(&Library::standard(), &config))
}

fn handle_render(
    config_dir: &Path,
    template: &Path,
    form_path: &Path,
    data_path: Option<&Path>,
    vars: &[String],
) -> Result<()> {
    let mut form = Form::from_json(&fs::read_to_string(form_path)?)?;
    if let Some(path) = data_path {
        form = form.bind(data_from_json(&fs::read_to_string(path)?)?);
    }

    let mut context = Context::new().with_form("form", form);
    for var in vars {
        let (key, value) = var.split_once('=').ok_or_else(|| {
            TweaksError::InvalidArgument(format!("expected KEY=VALUE, got '{}'", var))
        })?;
        context.insert(key, value);
    }

    let dir = template
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let name = template
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| {
            TweaksError::InvalidArgument(format!("not a template file: {}", template.display()))
        })?;
    if !template.is_file() {
        return Err(TweaksError::InvalidArgument(format!(
            "template not found: {}",
            template.display()
        )));
    }

    let html = renderer(config_dir)?
        .with_template_dir(dir)
        .render(&name, &context)?;
    print!("{}", html);
    if !html.ends_with('\n') {
        println!();
    }
    Ok(())
}

fn handle_check(config_dir: &Path, templates: &[PathBuf]) -> Result<()> {
    let renderer = renderer(config_dir)?;
    let mut failed = 0;

    for path in templates {
        let result = fs::read_to_string(path)
            .map_err(TweaksError::from)
            .and_then(|source| renderer.check(&source));
        match result {
            Ok(()) => println!("{} {}", "ok".green(), path.display()),
            Err(e) => {
                failed += 1;
                println!("{} {}: {}", "failed".red(), path.display(), e);
            }
        }
    }

    if failed > 0 {
        return Err(TweaksError::CheckFailed(failed));
    }
    Ok(())
}

fn handle_filters() -> Result<()> {
    let library = Library::standard();
    println!("{}", "Filters:".bold());
    for (name, filter) in library.iter() {
        if filter.takes_argument() {
            println!("  {{{{ field|{}(\"...\") }}}}", name.cyan());
        } else {
            println!("  {{{{ field|{} }}}}", name.cyan());
        }
    }
    println!("{}", "Tags:".bold());
    println!(
        "  {{% {} field key=\"value\" key+=\"value\" %}}",
        TAG_NAME.cyan()
    );
    Ok(())
}

fn handle_config(config_dir: &Path, key: Option<String>, value: Option<String>) -> Result<()> {
    let mut config = TweaksConfig::load(config_dir)?;

    match (key.as_deref(), value) {
        (None, _) => {
            for key in KEYS {
                print_setting(key, config.get(key)?);
            }
        }
        (Some(key), None) => print_setting(key, config.get(key)?),
        (Some(key), Some(value)) => {
            config.set(key, &value)?;
            config.save(config_dir)?;
            let message = match config.get(key)? {
                Some(v) => format!("Set {} = {}", key, v),
                None => format!("Cleared {}", key),
            };
            println!("{}", message.green());
        }
    }
    Ok(())
}

fn print_setting(key: &str, value: Option<&str>) {
    match value {
        Some(v) => println!("{} = {}", key, v),
        None => println!("{} = {}", key, "(unset)".dimmed()),
    }
}
