use anyhow::{Context, Result};
use std::path::Path;
use std::time::Duration;
use tracing::{info, warn};

use crate::config::{Config, EnvConfig};
use crate::dashboard::chart::{build_figure, ChartFigure};
use crate::data::histoday::HistodayClient;
use crate::data::types::PriceSeries;
use crate::model::predictor::{DenseModel, Predictor};
use crate::model::window::{denormalize, extract_windows, target_points, WindowConfig};

/// Process-wide state, built exactly once at startup: every configured
/// pair fetched, predicted, and turned into a figure.
pub struct AppContext {
    pub charts: Vec<ChartFigure>,
}

impl AppContext {
    pub async fn init(config: &Config, env: &EnvConfig) -> Result<Self> {
        let client = HistodayClient::new(
            config.api.base_url.clone(),
            env.cryptocompare_api_key.clone(),
            Duration::from_secs(config.api.timeout_secs),
        )?;

        let mut charts = Vec::with_capacity(config.pairs.len());
        for pair in &config.pairs {
            let title = pair.title();
            info!("Fetching {} days of history for {}", config.api.limit, title);

            let series = client
                .fetch_daily(&pair.fsym, &pair.tsym, config.api.limit)
                .await
                .with_context(|| format!("failed to fetch history for {}", title))?;

            let model = DenseModel::from_path(Path::new(&pair.model_file))
                .with_context(|| format!("failed to load model for {}", title))?;
            if model.input_len() != config.window.length {
                anyhow::bail!(
                    "model '{}' expects {}-day windows but window.length is {}",
                    model.name(),
                    model.input_len(),
                    config.window.length
                );
            }
            info!("Loaded model '{}' for {}", model.name(), title);

            let figure = predict_chart(&series, &model, &config.window, &title)?;
            charts.push(figure);
        }

        Ok(Self { charts })
    }
}

/// The per-pair pipeline: window the series, run the model, de-normalize,
/// and overlay predictions on the actual targets.
///
/// A series too short to window produces an empty figure, not an error.
pub fn predict_chart(
    series: &PriceSeries,
    predictor: &dyn Predictor,
    window: &WindowConfig,
    title: &str,
) -> Result<ChartFigure> {
    let windows = extract_windows(series, window)
        .with_context(|| format!("failed to window series for {}", title))?;

    if windows.is_empty() {
        warn!(
            "{}: only {} observations for window length {}, rendering empty chart",
            title,
            series.len(),
            window.length
        );
        return Ok(build_figure(title, &[], &[]));
    }

    let returns = predictor
        .predict_batch(&windows)
        .with_context(|| format!("prediction failed for {}", title))?;

    let predictions = denormalize(&returns, series, window)
        .with_context(|| format!("failed to de-normalize predictions for {}", title))?;
    let targets = target_points(series, window);

    info!(
        "{}: {} predictions over {} observations",
        title,
        predictions.len(),
        series.len()
    );

    Ok(build_figure(title, targets, &predictions))
}
