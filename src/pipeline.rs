use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

use log::{info, warn};
use netlist::{export_netlist, normalize_document, promote_ports, NormalizeSummary, PinNameNormalizer};
use netlistsvg::{
    artifact_path, augment_skin, colorize, custom_symbols, Colorized, RenderOutcome,
    SchematicRenderer, BASE_SKIN,
};
use schematics::Circuit;

use crate::config::DesignConfig;
use crate::designs::Design;

/// Build → export → normalize → skin → render → colorize, writing every
/// artifact next to `base`.
pub struct Pipeline<R: SchematicRenderer> {
    renderer: R,
    config: DesignConfig,
    /// Skin to augment instead of the built-in one.
    skin: Option<PathBuf>,
}

#[derive(Debug)]
pub struct PipelineReport {
    pub raw: PathBuf,
    pub clean: PathBuf,
    pub summary: NormalizeSummary,
    pub ports: usize,
    pub skin: Option<PathBuf>,
    pub render: Option<RenderOutcome>,
    pub colorized: Option<Colorized>,
}

impl<R: SchematicRenderer> Pipeline<R> {
    pub fn new(renderer: R, config: DesignConfig) -> Self {
        Pipeline {
            renderer,
            config,
            skin: None,
        }
    }

    pub fn with_skin(mut self, skin: Option<PathBuf>) -> Self {
        self.skin = skin;
        self
    }

    /// Errors before the clean netlist is on disk abort the run. Later stages
    /// log a warning and leave their slot in the report empty.
    pub fn run(
        &self,
        circuit: &mut Circuit,
        design: Design,
        base: &Path,
    ) -> Result<PipelineReport, Box<dyn Error>> {
        circuit.reset();
        design.build(circuit)?;
        info!(
            "Built {} with {} components",
            design.name(),
            circuit.components_iter().count()
        );

        if let Some(parent) = base.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let mut document = export_netlist(circuit, design.name());
        let raw = artifact_path(base, ".json");
        document.save(&raw)?;

        let summary = normalize_document(&mut document, &PinNameNormalizer::from_circuit(circuit));
        let ports = promote_ports(&mut document, &self.config.ports);
        let clean = artifact_path(base, "_clean.json");
        document.save(&clean)?;
        info!(
            "Normalized {} cells, {} kept numeric keys, {} boundary ports",
            summary.cells,
            summary.kept_numeric.len(),
            ports
        );

        let skin = match self.write_skin(base) {
            Ok(path) => Some(path),
            Err(e) => {
                warn!("Skipping render, no skin: {}", e);
                None
            }
        };

        let render = skin.as_ref().and_then(|skin| {
            match self
                .renderer
                .render(&clean, skin, &artifact_path(base, ".svg"))
            {
                Ok(outcome) => Some(outcome),
                Err(e) => {
                    warn!("Render failed: {}", e);
                    None
                }
            }
        });

        let colorized = match render {
            Some(RenderOutcome::Rendered(_)) => match colorize(base, &self.config.colors) {
                Ok(colorized) => Some(colorized),
                Err(e) => {
                    warn!("Colorize failed: {}", e);
                    None
                }
            },
            _ => None,
        };

        Ok(PipelineReport {
            raw,
            clean,
            summary,
            ports,
            skin,
            render,
            colorized,
        })
    }

    fn write_skin(&self, base: &Path) -> Result<PathBuf, Box<dyn Error>> {
        let template = match &self.skin {
            Some(path) => fs::read_to_string(path)
                .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?,
            None => BASE_SKIN.to_string(),
        };
        let skin = augment_skin(&template, &custom_symbols())?;

        let path = artifact_path(base, "_skin.svg");
        fs::write(&path, skin)?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use netlist::NetlistDocument;
    use netlistsvg::RenderError;
    use tempfile::TempDir;

    use super::*;

    /// Writes a one-wire drawing and records what it was asked to render.
    #[derive(Default)]
    struct FakeRenderer {
        calls: RefCell<Vec<(PathBuf, PathBuf)>>,
    }

    impl SchematicRenderer for FakeRenderer {
        fn render(
            &self,
            netlist: &Path,
            skin: &Path,
            output: &Path,
        ) -> Result<RenderOutcome, RenderError> {
            self.calls
                .borrow_mut()
                .push((netlist.to_path_buf(), skin.to_path_buf()));
            fs::write(
                output,
                "<svg>\n<style>svg { }</style>\n<line class=\"net_2\"/>\n</svg>\n",
            )
            .map_err(|source| RenderError::LaunchError {
                program: "fake".to_string(),
                source,
            })?;
            Ok(RenderOutcome::Rendered(output.to_path_buf()))
        }
    }

    struct FailingRenderer;

    impl SchematicRenderer for FailingRenderer {
        fn render(&self, _: &Path, _: &Path, _: &Path) -> Result<RenderOutcome, RenderError> {
            Ok(RenderOutcome::Failed {
                status: Some(1),
                diagnostic: "Error: bad cell".to_string(),
            })
        }
    }

    fn pipeline<R: SchematicRenderer>(renderer: R) -> Pipeline<R> {
        Pipeline::new(renderer, Design::Sample.default_config().unwrap())
    }

    #[test]
    fn writes_every_artifact() {
        let dir = TempDir::new().unwrap();
        let base = dir.path().join("out").join("sample");
        let pipeline = pipeline(FakeRenderer::default());

        let report = pipeline
            .run(&mut Circuit::new(), Design::Sample, &base)
            .unwrap();

        assert_eq!(report.raw, dir.path().join("out/sample.json"));
        assert!(report.raw.exists());
        assert_eq!(report.ports, 3);
        assert!(report.summary.kept_numeric.is_empty());

        let clean = NetlistDocument::load(&report.clean).unwrap();
        assert!(clean.modules["sample"].ports.contains_key("AC_L"));

        let skin = fs::read_to_string(report.skin.as_ref().unwrap()).unwrap();
        assert!(skin.contains("s:type=\"Fuse\""));

        let calls = pipeline.renderer.calls.borrow();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, report.clean);

        let colorized = report.colorized.unwrap();
        assert_eq!(colorized.path, dir.path().join("out/sample_color.svg"));
        let svg = fs::read_to_string(colorized.path).unwrap();
        assert!(svg.contains("<style id='net-colors'>"));
        assert!(svg.contains("  line.net_2, path.net_2, line.net_5, path.net_5"));
    }

    #[test]
    fn renderer_failure_keeps_clean_netlist() {
        let dir = TempDir::new().unwrap();
        let base = dir.path().join("sample");

        let report = pipeline(FailingRenderer)
            .run(&mut Circuit::new(), Design::Sample, &base)
            .unwrap();

        assert!(report.clean.exists());
        assert!(matches!(
            report.render,
            Some(RenderOutcome::Failed { status: Some(1), .. })
        ));
        assert!(report.colorized.is_none());
        assert!(!dir.path().join("sample_color.svg").exists());
    }

    #[test]
    fn missing_skin_skips_render() {
        let dir = TempDir::new().unwrap();
        let base = dir.path().join("sample");
        let pipeline =
            pipeline(FakeRenderer::default()).with_skin(Some(dir.path().join("absent.svg")));

        let report = pipeline
            .run(&mut Circuit::new(), Design::Sample, &base)
            .unwrap();

        assert!(report.clean.exists());
        assert!(report.skin.is_none());
        assert!(report.render.is_none());
        assert!(pipeline.renderer.calls.borrow().is_empty());
    }

    #[test]
    fn rerun_starts_from_empty_circuit() {
        let dir = TempDir::new().unwrap();
        let base = dir.path().join("sample");
        let pipeline = pipeline(FailingRenderer);
        let mut circuit = Circuit::new();

        pipeline.run(&mut circuit, Design::Sample, &base).unwrap();
        let report = pipeline.run(&mut circuit, Design::Sample, &base).unwrap();

        assert!(circuit.get_component("U7").is_none());
        assert_eq!(report.ports, 3);
    }
}
