//! Holt-Winters exponential smoothing with additive trend and additive seasonality.
//!
//! ```text
//! Level:    L_t = α (y_t - S_{t-m}) + (1 - α)(L_{t-1} + T_{t-1})
//! Trend:    T_t = β (L_t - L_{t-1}) + (1 - β) T_{t-1}
//! Season:   S_t = γ (y_t - L_t) + (1 - γ) S_{t-m}
//! Forecast: F_{t+h} = L_t + h T_t + S_{t+h-m}
//! ```
//!
//! The first season initialises the components: the level is its mean, the
//! trend is the difference between the first two season means divided by the
//! period, and each seasonal index is the observation minus the initial level.
//! α, β and γ are estimated by minimising the one-step-ahead sum of squared
//! errors over the rest of the series.

use tracing::{debug, instrument, trace};

use crate::error::{ForecastError, Result};

/// Lower/upper bound for every smoothing parameter.
const PARAM_MIN: f64 = 1e-4;
const PARAM_MAX: f64 = 1.0 - 1e-4;

/// Starting points for the parameter search.
const COARSE_GRID: [f64; 6] = [0.02, 0.1, 0.25, 0.5, 0.75, 0.95];

const SEARCH_INITIAL_STEP: f64 = 0.05;
const SEARCH_MIN_STEP: f64 = 1e-4;
const SEARCH_MAX_ROUNDS: usize = 500;

/// Accepted seasonal periods, in observations per cycle.
pub const MIN_SEASONAL_PERIOD: usize = 2;
pub const MAX_SEASONAL_PERIOD: usize = 3650;

/// Smoothing parameters of the model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SmoothingParams {
    /// Level smoothing
    pub alpha: f64,
    /// Trend smoothing
    pub beta: f64,
    /// Seasonal smoothing
    pub gamma: f64,
}

impl SmoothingParams {
    pub fn new(alpha: f64, beta: f64, gamma: f64) -> Result<Self> {
        for (name, value) in [("alpha", alpha), ("beta", beta), ("gamma", gamma)] {
            if !(value > 0.0 && value < 1.0) {
                return Err(ForecastError::ModelFit(format!(
                    "Smoothing parameter {} must be between 0 and 1 (exclusive), got {}.",
                    name, value
                )));
            }
        }
        Ok(Self { alpha, beta, gamma })
    }

    fn from_array(values: [f64; 3]) -> Self {
        Self {
            alpha: values[0],
            beta: values[1],
            gamma: values[2],
        }
    }
}

/// Unfitted model specification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HoltWinters {
    period: usize,
}

/// Components after running the smoother over a series.
#[derive(Debug, Clone, PartialEq)]
pub struct FittedHoltWinters {
    params: SmoothingParams,
    period: usize,
    level: f64,
    trend: f64,
    seasonal: Vec<f64>,
    observations: usize,
    sse: f64,
}

/// Level, trend and seasonal indices taken from the first two seasons.
struct InitialState {
    level: f64,
    trend: f64,
    seasonal: Vec<f64>,
}

impl HoltWinters {
    /// Creates a model with the given seasonal period (observations per cycle).
    pub fn new(period: usize) -> Result<Self> {
        if !(MIN_SEASONAL_PERIOD..=MAX_SEASONAL_PERIOD).contains(&period) {
            return Err(ForecastError::ModelFit(format!(
                "Seasonal period must be between {} and {}, got {}.",
                MIN_SEASONAL_PERIOD, MAX_SEASONAL_PERIOD, period
            )));
        }
        Ok(Self { period })
    }

    pub fn period(&self) -> usize {
        self.period
    }

    /// Two full seasons are needed to initialise the trend.
    pub fn min_observations(&self) -> usize {
        self.period.saturating_mul(2)
    }

    /// Fits the model, estimating α, β and γ from the data.
    #[instrument(skip(self, data), fields(period = self.period, len = data.len()))]
    pub fn fit(&self, data: &[f64]) -> Result<FittedHoltWinters> {
        self.check_data(data)?;
        let initial = self.initial_state(data);

        let mut best: Option<([f64; 3], f64)> = None;
        for alpha in COARSE_GRID {
            for beta in COARSE_GRID {
                for gamma in COARSE_GRID {
                    let candidate = [alpha, beta, gamma];
                    let sse = self.smooth(data, &initial, &SmoothingParams::from_array(candidate)).sse;
                    if is_improvement(sse, best.map(|(_, s)| s)) {
                        best = Some((candidate, sse));
                    }
                }
            }
        }

        let Some((mut params, mut sse)) = best else {
            return Err(ForecastError::ModelFit(
                "Model fit diverged: no smoothing parameters give a finite error.".to_string(),
            ));
        };
        trace!(?params, sse, "Best coarse grid point");

        // Pattern search around the best grid point.
        let mut step = SEARCH_INITIAL_STEP;
        let mut rounds = 0;
        while step >= SEARCH_MIN_STEP && rounds < SEARCH_MAX_ROUNDS {
            rounds += 1;
            let mut improved = false;
            for axis in 0..3 {
                for direction in [1.0, -1.0] {
                    let mut candidate = params;
                    candidate[axis] = (candidate[axis] + direction * step).clamp(PARAM_MIN, PARAM_MAX);
                    if candidate[axis] == params[axis] {
                        continue;
                    }
                    let candidate_sse =
                        self.smooth(data, &initial, &SmoothingParams::from_array(candidate)).sse;
                    if is_improvement(candidate_sse, Some(sse)) {
                        params = candidate;
                        sse = candidate_sse;
                        improved = true;
                    }
                }
            }
            if !improved {
                step /= 2.0;
            }
        }

        let params = SmoothingParams::from_array(params);
        debug!(
            alpha = params.alpha,
            beta = params.beta,
            gamma = params.gamma,
            sse,
            rounds,
            "Estimated Holt-Winters parameters"
        );
        Ok(self.smooth(data, &initial, &params))
    }

    /// Fits the model with fixed smoothing parameters.
    pub fn fit_with(&self, data: &[f64], params: SmoothingParams) -> Result<FittedHoltWinters> {
        self.check_data(data)?;
        let initial = self.initial_state(data);
        let fitted = self.smooth(data, &initial, &params);
        if !fitted.sse.is_finite() {
            return Err(ForecastError::ModelFit(
                "Model fit diverged: the one-step error is not finite.".to_string(),
            ));
        }
        Ok(fitted)
    }

    fn check_data(&self, data: &[f64]) -> Result<()> {
        let required = self.min_observations();
        if data.len() < required {
            return Err(ForecastError::ModelFit(format!(
                "Cannot fit a seasonal model with a period of {} days: at least {} daily observations are required (two full seasons), got {}.",
                self.period,
                required,
                data.len()
            )));
        }
        if let Some(position) = data.iter().position(|v| !v.is_finite()) {
            return Err(ForecastError::ModelFit(format!(
                "Cannot fit the model: the series contains a non-finite value at position {}.",
                position
            )));
        }
        Ok(())
    }

    fn initial_state(&self, data: &[f64]) -> InitialState {
        let m = self.period;
        let first_mean = data[..m].iter().sum::<f64>() / m as f64;
        let second_mean = data[m..2 * m].iter().sum::<f64>() / m as f64;
        InitialState {
            level: first_mean,
            trend: (second_mean - first_mean) / m as f64,
            seasonal: data[..m].iter().map(|v| v - first_mean).collect(),
        }
    }

    fn smooth(&self, data: &[f64], initial: &InitialState, params: &SmoothingParams) -> FittedHoltWinters {
        let m = self.period;
        let SmoothingParams { alpha, beta, gamma } = *params;
        let mut level = initial.level;
        let mut trend = initial.trend;
        let mut seasonal = initial.seasonal.clone();
        let mut sse = 0.0;

        for (i, &value) in data.iter().enumerate().skip(m) {
            let idx = i % m;
            let prev_level = level;
            let prev_seasonal = seasonal[idx];

            let error = value - (level + trend + prev_seasonal);
            sse += error * error;

            level = alpha * (value - prev_seasonal) + (1.0 - alpha) * (level + trend);
            trend = beta * (level - prev_level) + (1.0 - beta) * trend;
            seasonal[idx] = gamma * (value - level) + (1.0 - gamma) * prev_seasonal;
        }

        FittedHoltWinters {
            params: *params,
            period: m,
            level,
            trend,
            seasonal,
            observations: data.len(),
            sse,
        }
    }
}

impl FittedHoltWinters {
    pub fn params(&self) -> SmoothingParams {
        self.params
    }

    /// In-sample one-step-ahead sum of squared errors.
    pub fn sse(&self) -> f64 {
        self.sse
    }

    pub fn period(&self) -> usize {
        self.period
    }

    /// Final (level, trend, seasonal indices).
    pub fn components(&self) -> (f64, f64, &[f64]) {
        (self.level, self.trend, &self.seasonal)
    }

    /// Predicts `steps` values following the last observation. Values are not clamped.
    pub fn forecast(&self, steps: usize) -> Vec<f64> {
        (1..=steps)
            .map(|h| {
                let idx = (self.observations + h - 1) % self.period;
                self.level + h as f64 * self.trend + self.seasonal[idx]
            })
            .collect()
    }
}

fn is_improvement(candidate: f64, current: Option<f64>) -> bool {
    candidate.is_finite() && current.is_none_or(|best| candidate < best)
}
