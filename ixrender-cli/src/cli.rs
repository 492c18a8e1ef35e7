use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "ixrender", version, about = "Render application compositions")]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalFlags,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Render a composition file into a Compose document
    Render(crate::commands::render::RenderArgs),
}

/// Flags shared by every subcommand.
#[derive(Args, Debug)]
pub struct GlobalFlags {
    /// Log filter, e.g. `debug` or `ixrender=debug`
    #[arg(long, global = true, env = "IXRENDER_LOG", default_value = "warn")]
    pub log_level: String,
}

impl GlobalFlags {
    /// Send logs to stderr so stdout only carries the rendered document.
    pub fn init_tracing(&self) {
        let env_filter = tracing_subscriber::EnvFilter::try_new(&self.log_level)
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));

        if let Err(e) = tracing_subscriber::fmt()
            .with_target(true)
            .with_writer(std::io::stderr)
            .with_env_filter(env_filter)
            .try_init()
        {
            eprintln!("Failed to initialize tracing: {}", e);
        }
    }
}
