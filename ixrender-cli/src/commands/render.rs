use crate::composition::Composition;
use anyhow::Context;
use clap::{Args, ValueEnum};
use std::path::PathBuf;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    #[default]
    Yaml,
}

#[derive(Args, Debug)]
pub struct RenderArgs {
    /// Composition file (JSON or YAML) with `values` and `containers`
    pub file: PathBuf,

    /// Output format
    #[arg(long, short, value_enum, default_value_t = OutputFormat::Yaml)]
    pub format: OutputFormat,

    /// Write the document to this file instead of stdout
    #[arg(long, short)]
    pub output: Option<PathBuf>,
}

pub fn execute(args: RenderArgs, _global: &crate::cli::GlobalFlags) -> anyhow::Result<()> {
    let text = std::fs::read_to_string(&args.file)
        .with_context(|| format!("Failed to read {}", args.file.display()))?;

    let render = Composition::parse(&text)?.build()?;
    let output = render.render()?;

    let mut document = match args.format {
        OutputFormat::Json => serde_json::to_string_pretty(&output)?,
        OutputFormat::Yaml => serde_yaml::to_string(&output)?,
    };
    if !document.ends_with('\n') {
        document.push('\n');
    }

    match args.output {
        Some(path) => std::fs::write(&path, document)
            .with_context(|| format!("Failed to write {}", path.display()))?,
        None => print!("{}", document),
    }
    tracing::debug!(file = %args.file.display(), "Render finished");
    Ok(())
}
