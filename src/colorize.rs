use std::path::PathBuf;

use colored::*;
use expanduser::expanduser;
use inquire::Text;
use netlistsvg::artifact_path;

use crate::completer::PathCompleter;
use crate::config::DesignConfig;
use crate::designs::Design;

/// Recolor an existing render without rebuilding it.
#[derive(clap::Args)]
pub struct ColorizeArgs {
    #[clap(help = "Base path of a previous render; reads <base>_clean.json and <base>.svg")]
    base: Option<PathBuf>,

    #[clap(
        long,
        value_enum,
        default_value_t = Design::Controller,
        help = "Built-in design whose colors to use"
    )]
    design: Design,

    #[clap(short, long, help = "TOML file with wire colors, replacing the design's own")]
    config: Option<PathBuf>,
}

impl ColorizeArgs {
    pub fn complete(&mut self) -> Result<bool, Box<dyn std::error::Error>> {
        let mut required_input = false;

        while self.base.is_none() {
            required_input = true;
            let answer = Text::new("Base path of the render: ")
                .with_autocomplete(PathCompleter::default())
                .prompt()?;
            let base: PathBuf = expanduser(answer)?;

            let svg = artifact_path(&base, ".svg");
            if svg.is_file() {
                self.base = Some(base);
            } else {
                println!("File not found: \"{}\"", svg.display());
            }
        }

        Ok(required_input)
    }

    pub fn get_command(&self) -> String {
        let mut command = String::from("schemgen colorize ");

        if let Some(base) = self.base.as_ref() {
            command.push_str(&format!("\"{}\" ", base.display()));
        }
        command.push_str(&format!("--design {} ", self.design.name()));
        if let Some(config) = self.config.as_ref() {
            command.push_str(&format!("--config \"{}\" ", config.display()));
        }

        command.trim().to_string()
    }
}

pub fn run(mut args: ColorizeArgs) -> Result<(), Box<dyn std::error::Error>> {
    let required_input = args.complete()?;
    if required_input {
        println!("$ {}", args.get_command());
    }

    let base = args.base.ok_or("no base path given")?;
    let config = match args.config.as_ref() {
        Some(path) => DesignConfig::load(path)?,
        None => args.design.default_config()?,
    };

    let colorized = netlistsvg::colorize(&base, &config.colors)?;
    println!(
        "{}",
        format!("Saved: {} ({} nets colored)", colorized.path.display(), colorized.nets).green()
    );

    Ok(())
}
