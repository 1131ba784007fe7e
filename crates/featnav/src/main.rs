//! featnav - Jump from comment tags to the feature files they name
//!
//! A tag such as `// TAG:42` in source code names test case 42. featnav
//! finds the files for that case by filename pattern and, optionally, by
//! scanning `.feature` files for the tag itself. It runs as a language server
//! (`featnav lsp`) or answers a single lookup from the command line
//! (`featnav find`).

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use eyre::{Result, WrapErr};
use featnav::config::{CONFIG_PATH, load_settings};
use featnav::output::{OutputFormat, StderrNotifier, render_definition};
use featnav_core::{Error, Navigator, Settings, Workspace};
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Jump from comment tags to the feature files they name
#[derive(Debug, Parser)]
#[command(name = "featnav", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Path to config file (default: .config/featnav/config.json)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Project root (default: nearest ancestor with a config file or .git)
    #[arg(short, long, global = true)]
    root: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the language server over stdio
    Lsp,

    /// Resolve the tag at a position in a file
    Find {
        /// File containing the tag
        file: PathBuf,

        /// Line of the tag, starting at 1
        #[arg(short, long, value_parser = clap::value_parser!(u32).range(1..))]
        line: u32,

        /// Column of the cursor in UTF-16 code units, starting at 1
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
        column: u32,

        /// Print matches as JSON
        #[arg(long)]
        json: bool,

        #[command(flatten)]
        overrides: SettingsOverrides,
    },
}

/// Settings given on the command line win over the config file
#[derive(Debug, Default, Args)]
struct SettingsOverrides {
    /// Regex with one capture group for the identifier
    #[arg(long)]
    tag_pattern: Option<String>,

    /// Glob for feature files; ${caseNumber} is replaced by the identifier
    #[arg(long)]
    search_pattern: Option<String>,

    /// Folder under the workspace root to search from
    #[arg(long)]
    relative_root: Option<String>,

    /// Also scan .feature files for the tag text
    #[arg(long)]
    search_in_content: bool,

    /// Skip files excluded by .gitignore and .ignore files
    #[arg(long)]
    use_ignore_files: bool,
}

impl SettingsOverrides {
    fn apply_to(self, settings: &mut Settings) {
        if let Some(v) = self.tag_pattern {
            settings.tag_pattern = Some(v);
        }
        if let Some(v) = self.search_pattern {
            settings.search_pattern = v;
        }
        if let Some(v) = self.relative_root {
            settings.relative_root = v;
        }
        if self.search_in_content {
            settings.search_in_content = true;
        }
        if self.use_ignore_files {
            settings.use_ignore_files = true;
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    featnav::init_tracing();

    let cli = Cli::parse();
    let project_root = match cli.root {
        Some(root) => root,
        None => featnav::find_project_root()?,
    };

    match cli.command {
        Command::Lsp => featnav::lsp::run(Some(project_root), cli.config).await,
        Command::Find {
            file,
            line,
            column,
            json,
            overrides,
        } => {
            let config_path = cli.config.unwrap_or_else(|| project_root.join(CONFIG_PATH));
            let mut settings = load_settings(&config_path)?;
            overrides.apply_to(&mut settings);

            let format = if json {
                OutputFormat::Json
            } else {
                OutputFormat::Text
            };
            run_find(&project_root, &settings, &file, line, column, format).await
        }
    }
}

async fn run_find(
    project_root: &Path,
    settings: &Settings,
    file: &Path,
    line: u32,
    column: u32,
    format: OutputFormat,
) -> Result<()> {
    let root = project_root
        .canonicalize()
        .wrap_err_with(|| format!("Project root {} not found", project_root.display()))?;
    let file = file
        .canonicalize()
        .wrap_err_with(|| format!("File {} not found", file.display()))?;

    let content = tokio::fs::read_to_string(&file)
        .await
        .wrap_err_with(|| format!("Failed to read {}", file.display()))?;
    let Some(line_text) = content.lines().nth(line as usize - 1) else {
        eyre::bail!("{} has no line {}", file.display(), line);
    };
    debug!("Line {}: {:?}", line, line_text);

    let document = Workspace::new([root.clone()]).context_for(&file, line_text, column - 1);

    let cancel = CancellationToken::new();
    let ctrl_c = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        })
    };

    let navigator = Navigator::from_fs(Arc::new(StderrNotifier));
    let result = navigator.resolve(settings, &document, &cancel).await;
    ctrl_c.abort();

    let definition = match result {
        Ok(definition) => definition,
        Err(Error::MissingConfiguration) => eyre::bail!(
            "No tagPattern configured. Set it in {} or pass --tag-pattern",
            CONFIG_PATH
        ),
        // The notifier has already printed the user-facing message
        Err(e @ Error::InvalidPattern { .. }) => return Err(e.into()),
        Err(e) => return Err(e).wrap_err("Lookup failed"),
    };

    print!("{}", render_definition(definition.as_ref(), format, &root)?);
    Ok(())
}
