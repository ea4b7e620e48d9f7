use crate::ewma::{DEFAULT_ALPHA, check_alpha};
use crate::limits::{DEFAULT_STD_DEV_MULTIPLIER, ShortSeriesPolicy};
use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::{
    fmt::Debug,
    fs,
    ops::{Bound, RangeBounds},
    path::Path,
};

/// Monitoring configuration.
///
/// Loaded from a TOML file and validated before use.
/// Every section and key is optional and falls back to its default.
/// See [`Config::from_file`] for loading.
#[derive(Debug, Default, PartialEq, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub input: InputConfig,
    pub ewma: EwmaConfig,
    pub chart: ChartConfig,
}

/// Where the raw samples come from and how to read them.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InputConfig {
    /// Glob pattern of CSV files, relative to the monitoring directory.
    pub files: String,
    /// Header of the date column.
    pub date_column: String,
    /// Header of the viral-load column.
    pub value_column: String,
    /// `chrono` format of the date column.
    pub date_format: String,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            files: "data.csv".to_string(),
            date_column: "Date".to_string(),
            value_column: "Wastewater_Viral_Load".to_string(),
            date_format: "%Y-%m-%d".to_string(),
        }
    }
}

/// Smoothing and control limit parameters.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EwmaConfig {
    /// Smoothing factor, in (0, 1].
    pub alpha: f64,
    /// Width of the control band in standard deviations.
    pub std_dev_multiplier: f64,
    /// Policy for series with a single date.
    pub short_series: ShortSeriesPolicy,
}

impl Default for EwmaConfig {
    fn default() -> Self {
        Self {
            alpha: DEFAULT_ALPHA,
            std_dev_multiplier: DEFAULT_STD_DEV_MULTIPLIER,
            short_series: ShortSeriesPolicy::default(),
        }
    }
}

/// Chart layout.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ChartConfig {
    /// Logical width of the chart.
    pub width: u32,
    /// Logical height of the chart.
    pub height: u32,
    /// Factor applied to width and height in the exported image.
    pub scale: f64,
    pub title: String,
    pub x_label: String,
    pub y_label: String,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            width: 1000,
            height: 800,
            scale: 5.0,
            title: String::new(),
            x_label: "Date".to_string(),
            y_label: "Wastewater Viral Load".to_string(),
        }
    }
}

impl Config {
    /// Load a [`Config`] from a TOML file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, deserialized,
    /// or if the configuration values are invalid.
    pub fn from_file<P: AsRef<Path>>(file: P) -> Result<Self> {
        let file = file.as_ref();
        let contents =
            fs::read_to_string(file).with_context(|| format!("failed to read {file:?}"))?;

        Self::from_toml(&contents)
    }

    /// Parse and validate a [`Config`] from a TOML string.
    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents).context("failed to deserialize config")?;

        config.validate().context("failed to validate config")?;

        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        check_str(&self.input.files).context("invalid input file pattern")?;
        check_str(&self.input.date_column).context("invalid date column")?;
        check_str(&self.input.value_column).context("invalid value column")?;
        check_str(&self.input.date_format).context("invalid date format")?;

        check_alpha(self.ewma.alpha).context("invalid smoothing factor")?;
        check_num(self.ewma.std_dev_multiplier, 0.0..100.0)
            .context("invalid standard deviation multiplier")?;

        check_num(self.chart.width, 100..10_000).context("invalid chart width")?;
        check_num(self.chart.height, 100..10_000).context("invalid chart height")?;
        check_num(self.chart.scale, (Bound::Excluded(0.0), Bound::Included(20.0)))
            .context("invalid chart scale")?;

        Ok(())
    }
}

fn check_num<T, R>(num: T, range: R) -> Result<()>
where
    T: PartialOrd + Debug,
    R: RangeBounds<T> + Debug,
{
    if !range.contains(&num) {
        bail!("number must be in the range {range:?}, but is {num:?}");
    }
    Ok(())
}

fn check_str(s: &str) -> Result<()> {
    if s.trim().is_empty() {
        bail!("string must not be empty");
    }
    Ok(())
}
