use std::path::PathBuf;

use colored::*;
use expanduser::expanduser;
use inquire::{Confirm, Text};
use netlistsvg::{artifact_path, Netlistsvg, RenderOutcome};
use schematics::Circuit;

use crate::completer::PathCompleter;
use crate::config::DesignConfig;
use crate::designs::Design;
use crate::pipeline::Pipeline;

#[derive(clap::Args)]
pub struct RenderArgs {
    #[clap(
        long,
        value_enum,
        default_value_t = Design::Controller,
        help = "Built-in design to render"
    )]
    design: Design,

    #[clap(
        short,
        long,
        help = "Base path for the generated files, e.g. output/controller"
    )]
    output: Option<PathBuf>,

    #[clap(
        short,
        long,
        help = "TOML file with boundary ports and wire colors, replacing the design's own"
    )]
    config: Option<PathBuf>,

    #[clap(long, help = "netlistsvg skin to add the custom symbols to")]
    skin: Option<PathBuf>,

    #[clap(long, default_value = "netlistsvg", help = "Renderer executable")]
    renderer: String,

    #[clap(short, long, help = "Overwrite existing output files")]
    force: bool,
}

impl RenderArgs {
    pub fn complete(&mut self) -> Result<bool, Box<dyn std::error::Error>> {
        let mut required_input = false;

        let output = match self.output.take() {
            Some(output) => output,
            None => {
                required_input = true;
                let default = format!("output/{}", self.design.name());
                let answer = Text::new("Output base path: ")
                    .with_default(&default)
                    .with_autocomplete(PathCompleter::default())
                    .prompt()?;
                expanduser(answer)?
            }
        };

        let clean = artifact_path(&output, "_clean.json");
        if !self.force && clean.exists() {
            required_input = true;

            let overwrite = Confirm::new(&format!(
                "Output already exists: \"{}\". Overwrite?",
                clean.display()
            ))
            .with_default(false)
            .prompt()?;

            if !overwrite {
                return Err(Box::new(std::io::Error::new(
                    std::io::ErrorKind::AlreadyExists,
                    format!("Output already exists: \"{}\"", clean.display()),
                )));
            }
            // Only read by get_command.
            self.force = true;
        }

        self.output = Some(output);
        Ok(required_input)
    }

    pub fn get_command(&self) -> String {
        let mut command = String::from("schemgen render ");
        command.push_str(&format!("--design {} ", self.design.name()));

        if let Some(output) = self.output.as_ref() {
            command.push_str(&format!("--output \"{}\" ", output.display()));
        }
        if let Some(config) = self.config.as_ref() {
            command.push_str(&format!("--config \"{}\" ", config.display()));
        }
        if let Some(skin) = self.skin.as_ref() {
            command.push_str(&format!("--skin \"{}\" ", skin.display()));
        }
        if self.renderer != "netlistsvg" {
            command.push_str(&format!("--renderer \"{}\" ", self.renderer));
        }
        if self.force {
            command.push_str("--force ");
        }

        command.trim().to_string()
    }
}

pub fn run(mut args: RenderArgs) -> Result<(), Box<dyn std::error::Error>> {
    let required_input = args.complete()?;
    if required_input {
        println!("$ {}", args.get_command());
    }

    let base = args.output.take().ok_or("no output path given")?;
    let config = match args.config.as_ref() {
        Some(path) => DesignConfig::load(path)?,
        None => args.design.default_config()?,
    };

    let pipeline = Pipeline::new(Netlistsvg::new(&args.renderer), config).with_skin(args.skin);
    let report = pipeline.run(&mut Circuit::new(), args.design, &base)?;

    println!("{}", format!("Saved: {}", report.raw.display()).green());
    println!("{}", format!("Saved: {}", report.clean.display()).green());
    if !report.summary.kept_numeric.is_empty() {
        println!(
            "{}",
            format!(
                "Kept pin numbers on {} (pin names collide)",
                report.summary.kept_numeric.join(", ")
            )
            .yellow()
        );
    }

    match report.render {
        Some(RenderOutcome::Rendered(svg)) => {
            println!("{}", format!("Saved: {}", svg.display()).green());
        }
        Some(RenderOutcome::Failed { diagnostic, .. }) => {
            println!("{}", format!("netlistsvg error: {}", diagnostic).red());
        }
        None => println!("{}", "Schematic was not rendered".yellow()),
    }

    if let Some(colorized) = report.colorized {
        println!(
            "{}",
            format!("Saved: {} ({} nets colored)", colorized.path.display(), colorized.nets).green()
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::Parser;
    use tempfile::TempDir;

    use super::*;

    #[derive(Parser)]
    struct Cli {
        #[command(flatten)]
        args: RenderArgs,
    }

    fn parse(argv: &[&str]) -> RenderArgs {
        let mut full = vec!["schemgen"];
        full.extend_from_slice(argv);
        Cli::parse_from(full).args
    }

    #[test]
    fn given_arguments_need_no_prompt() {
        let dir = TempDir::new().unwrap();
        let base = dir.path().join("sample");
        let base = base.to_str().unwrap();
        let mut args = parse(&["--design", "sample", "-o", base]);

        assert!(!args.complete().unwrap());
        assert_eq!(
            args.get_command(),
            format!("schemgen render --design sample --output \"{}\"", base)
        );
    }

    #[test]
    fn forced_overwrite_skips_confirmation() {
        let dir = TempDir::new().unwrap();
        let base = dir.path().join("sample");
        std::fs::write(artifact_path(&base, "_clean.json"), "{}").unwrap();
        let base = base.to_str().unwrap();
        let mut args = parse(&["-o", base, "--force", "--renderer", "true"]);

        assert!(!args.complete().unwrap());
        assert_eq!(
            args.get_command(),
            format!(
                "schemgen render --design controller --output \"{}\" --renderer \"true\" --force",
                base
            )
        );
    }
}
