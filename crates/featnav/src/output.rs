//! Output formatting for one-shot lookups

use std::path::Path;

use eyre::Result;
use featnav_core::{Definition, Match, MatchKind, Notifier};
use owo_colors::OwoColorize;

/// Output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Render the result of a lookup in the specified format
pub fn render_definition(
    definition: Option<&Definition>,
    format: OutputFormat,
    root: &Path,
) -> Result<String> {
    let matches = definition.map(Definition::matches).unwrap_or_default();
    match format {
        OutputFormat::Text => Ok(render_text(matches, root)),
        OutputFormat::Json => render_json(matches),
    }
}

fn render_text(matches: &[Match], root: &Path) -> String {
    if matches.is_empty() {
        return format!("{}\n", "No definition found".dimmed());
    }

    let mut output = String::new();
    for m in matches {
        let label = format!("{:>8}", m.kind.as_str());
        let kind = match m.kind {
            MatchKind::Filename => label.green().to_string(),
            MatchKind::Content => label.cyan().to_string(),
        };
        let path = m.path.strip_prefix(root).unwrap_or(&m.path);
        output.push_str(&format!("{}  {}\n", kind, path.display()));
    }
    output
}

fn render_json(matches: &[Match]) -> Result<String> {
    let mut json = serde_json::to_string_pretty(matches)?;
    json.push('\n');
    Ok(json)
}

/// Prints interruptive errors to stderr
#[derive(Debug, Clone, Copy, Default)]
pub struct StderrNotifier;

impl Notifier for StderrNotifier {
    fn show_error(&self, message: &str) {
        eprintln!("{} {}", "error:".red().bold(), message);
    }
}
