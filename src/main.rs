use clap::{Parser, Subcommand};
use colorize::ColorizeArgs;
use inquire::ui::{Color, RenderConfig, StyleSheet, Styled};
use render::RenderArgs;

mod colorize;
mod completer;
mod config;
mod designs;
mod pipeline;
mod render;

#[derive(Parser)]
#[command(version, about, name = "schemgen", bin_name = "schemgen")]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a design and render its schematic
    Render(RenderArgs),
    /// Recolor the wires of an existing render
    Colorize(ColorizeArgs),
}

fn get_inquire_config() -> RenderConfig<'static> {
    let mut config = RenderConfig::default();
    config.prompt_prefix = Styled::new(">").with_fg(Color::DarkGrey);
    config.answered_prompt_prefix = Styled::new(">").with_fg(Color::DarkGrey);
    config.prompt = StyleSheet::new().with_fg(Color::DarkGrey);
    config
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let filter = if cli.debug { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter)).init();

    inquire::set_global_render_config(get_inquire_config());

    match cli.command {
        Commands::Render(args) => render::run(args),
        Commands::Colorize(args) => colorize::run(args),
    }
}
