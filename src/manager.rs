use crate::analysis::{Report, run};
use crate::chart::save_svg;
use crate::config::Config;
use crate::data::load_samples;
use crate::model::Sample;
use anyhow::{Context, Result, bail};
use glob::{Pattern, glob};
use std::{
    fs,
    path::{Path, PathBuf},
};

const OUTPUT_FILES: [&str; 3] = ["results.json", "results.csv", "chart.svg"];

pub struct Manager {
    mon_dir: PathBuf,
    cfg: Config,
}

impl Manager {
    pub fn new<P: AsRef<Path>>(mon_dir: P) -> Result<Self> {
        let mon_dir = mon_dir.as_ref().to_path_buf();

        let cfg =
            Config::from_file(mon_dir.join("config.toml")).context("failed to construct cfg")?;
        log::info!("{cfg:#?}");

        Ok(Self { mon_dir, cfg })
    }

    pub fn analyze(&self) -> Result<()> {
        let report = self.build_report().context("failed to build report")?;

        let json_file = self.mon_dir.join("results.json");
        report
            .save_json(&json_file)
            .context("failed to save json results")?;
        log::info!("wrote {json_file:?}");

        let csv_file = self.mon_dir.join("results.csv");
        report
            .save_csv(&csv_file)
            .context("failed to save csv results")?;
        log::info!("wrote {csv_file:?}");

        Ok(())
    }

    pub fn plot(&self) -> Result<()> {
        let report = self.build_report().context("failed to build report")?;

        let chart_file = self.mon_dir.join("chart.svg");
        save_svg(&report, &self.cfg.chart, &chart_file).context("failed to save chart")?;
        log::info!("wrote {chart_file:?}");

        Ok(())
    }

    pub fn clean(&self) -> Result<()> {
        for name in OUTPUT_FILES {
            let file = self.mon_dir.join(name);
            if !file.exists() {
                continue;
            }
            fs::remove_file(&file).with_context(|| format!("failed to remove {file:?}"))?;
            log::info!("removed {file:?}");
        }
        Ok(())
    }

    fn build_report(&self) -> Result<Report> {
        let samples = self.load_all_samples().context("failed to load samples")?;

        let report = run(&samples, &self.cfg.ewma).context("failed to run pipeline")?;
        log::info!(
            "aggregated {} samples into {} dates",
            report.n_samples,
            report.series.len()
        );
        log::info!(
            "std_dev = {:.6}, spread = {:.6}, mean limits = [{:.6}, {:.6}]",
            report.limits.std_dev(),
            report.limits.spread(),
            report.mean_lower,
            report.mean_upper
        );
        if !report.breaches.is_empty() {
            log::warn!(
                "{} dates outside the control limits: {:?}",
                report.breaches.len(),
                report.breaches
            );
        }

        Ok(report)
    }

    fn load_all_samples(&self) -> Result<Vec<Sample>> {
        let files = self.input_files().context("failed to find input files")?;
        if files.is_empty() {
            bail!("no input files match {:?}", self.cfg.input.files);
        }

        let mut samples = Vec::new();
        for file in files {
            samples.extend(load_samples(&file, &self.cfg.input)?);
        }
        Ok(samples)
    }

    fn input_files(&self) -> Result<Vec<PathBuf>> {
        let mon_dir = self.mon_dir.to_str().context("mon_dir is not valid UTF-8")?;
        let pattern = Path::new(&Pattern::escape(mon_dir)).join(&self.cfg.input.files);
        let pattern = pattern.to_str().context("pattern is not valid UTF-8")?;
        let mut files = glob(pattern)
            .context("failed to glob input files")?
            .collect::<Result<Vec<_>, _>>()
            .context("failed to read glob entry")?;
        files.retain(|p| p.is_file());
        files.sort();
        Ok(files)
    }
}
