/*!
 * # Artifact Bundle
 *
 * The trainer writes one JSON file holding the forecast model, the product
 * encoder, the trend table and the peak-hour table. The server reads it once
 * at startup into an [`ArtifactState`] that distinguishes a complete load, a
 * load with missing parts, and no load at all, so handlers branch on what is
 * actually available instead of probing for empty containers.
 */

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use tracing::{error, info, warn};

use crate::errors::{ArtifactError, ServiceError};
use crate::health::{HealthDetail, HealthStatus};
use crate::ml::{ProductEncoder, RandomForestRegressor};
use crate::models::{PeakHourTable, TrendTable};
use crate::services::forecasting::Forecaster;

/// Version written into every bundle; bump when the layout changes.
pub const BUNDLE_FORMAT_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BundleMetadata {
    pub format_version: u32,
    pub trained_at: DateTime<Utc>,
    pub training_records: usize,
}

impl BundleMetadata {
    pub fn new(training_records: usize) -> Self {
        Self {
            format_version: BUNDLE_FORMAT_VERSION,
            trained_at: Utc::now(),
            training_records,
        }
    }
}

/// Everything the trainer produces, persisted as a single unit.
#[derive(Debug, Serialize, Deserialize)]
pub struct ArtifactBundle {
    pub metadata: BundleMetadata,
    pub model: RandomForestRegressor,
    pub encoder: ProductEncoder,
    pub trends: TrendTable,
    pub peak_hours: PeakHourTable,
}

impl ArtifactBundle {
    pub fn save(&self, path: &Path) -> Result<(), ArtifactError> {
        let io_err = |source| ArtifactError::Io {
            path: path.to_path_buf(),
            source,
        };

        let file = File::create(path).map_err(io_err)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer(&mut writer, self)?;
        writer.flush().map_err(io_err)?;
        Ok(())
    }
}

/// On-disk shape tolerant of missing parts.
#[derive(Debug, Deserialize)]
struct StoredBundle {
    #[serde(default)]
    metadata: Option<BundleMetadata>,
    #[serde(default)]
    model: Option<RandomForestRegressor>,
    #[serde(default)]
    encoder: Option<ProductEncoder>,
    #[serde(default)]
    trends: Option<TrendTable>,
    #[serde(default)]
    peak_hours: Option<PeakHourTable>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    Metadata,
    Model,
    Encoder,
    Trends,
    PeakHours,
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Metadata => "metadata",
            Self::Model => "model",
            Self::Encoder => "encoder",
            Self::Trends => "trends",
            Self::PeakHours => "peak_hours",
        };
        f.write_str(name)
    }
}

/// The parts that were present in an incomplete bundle.
#[derive(Debug, Default)]
pub struct PartialArtifacts {
    pub metadata: Option<BundleMetadata>,
    pub model: Option<RandomForestRegressor>,
    pub encoder: Option<ProductEncoder>,
    pub trends: Option<TrendTable>,
    pub peak_hours: Option<PeakHourTable>,
}

/// What the server has to work with after startup.
#[derive(Debug)]
pub enum ArtifactState {
    Loaded(ArtifactBundle),
    Partial {
        artifacts: PartialArtifacts,
        missing: Vec<ArtifactKind>,
    },
    NotLoaded {
        reason: String,
    },
}

impl ArtifactState {
    /// Loads the bundle at `path`, logging the outcome. Never fails; a bad or
    /// missing file yields [`ArtifactState::NotLoaded`].
    pub fn load(path: &Path) -> Self {
        match Self::read(path) {
            Ok(state) => {
                match &state {
                    Self::Loaded(bundle) => info!(
                        path = %path.display(),
                        products = bundle.encoder.len(),
                        trees = bundle.model.n_trees(),
                        trained_at = %bundle.metadata.trained_at,
                        "forecast artifacts loaded"
                    ),
                    Self::Partial { missing, .. } => warn!(
                        path = %path.display(),
                        missing = ?missing,
                        "forecast artifacts loaded with missing parts"
                    ),
                    Self::NotLoaded { .. } => {}
                }
                state
            }
            Err(err) => {
                error!(path = %path.display(), error = %err, "failed to load forecast artifacts; run the trainer first");
                Self::NotLoaded {
                    reason: err.to_string(),
                }
            }
        }
    }

    fn read(path: &Path) -> Result<Self, ArtifactError> {
        let file = File::open(path).map_err(|source| ArtifactError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let stored: StoredBundle = serde_json::from_reader(BufReader::new(file))?;
        Self::from_stored(stored)
    }

    /// Decodes a bundle from JSON text.
    pub fn from_json(json: &str) -> Result<Self, ArtifactError> {
        Self::from_stored(serde_json::from_str(json)?)
    }

    fn from_stored(stored: StoredBundle) -> Result<Self, ArtifactError> {
        if let Some(metadata) = &stored.metadata {
            if metadata.format_version != BUNDLE_FORMAT_VERSION {
                return Err(ArtifactError::UnsupportedVersion {
                    found: metadata.format_version,
                    expected: BUNDLE_FORMAT_VERSION,
                });
            }
        }

        match stored {
            StoredBundle {
                metadata: Some(metadata),
                model: Some(model),
                encoder: Some(encoder),
                trends: Some(trends),
                peak_hours: Some(peak_hours),
            } => Ok(Self::Loaded(ArtifactBundle {
                metadata,
                model,
                encoder,
                trends,
                peak_hours,
            })),
            stored => {
                let mut missing = Vec::new();
                if stored.metadata.is_none() {
                    missing.push(ArtifactKind::Metadata);
                }
                if stored.model.is_none() {
                    missing.push(ArtifactKind::Model);
                }
                if stored.encoder.is_none() {
                    missing.push(ArtifactKind::Encoder);
                }
                if stored.trends.is_none() {
                    missing.push(ArtifactKind::Trends);
                }
                if stored.peak_hours.is_none() {
                    missing.push(ArtifactKind::PeakHours);
                }
                Ok(Self::Partial {
                    artifacts: PartialArtifacts {
                        metadata: stored.metadata,
                        model: stored.model,
                        encoder: stored.encoder,
                        trends: stored.trends,
                        peak_hours: stored.peak_hours,
                    },
                    missing,
                })
            }
        }
    }

    fn parts(
        &self,
    ) -> (
        Option<&RandomForestRegressor>,
        Option<&ProductEncoder>,
        Option<&TrendTable>,
        Option<&PeakHourTable>,
    ) {
        match self {
            Self::Loaded(bundle) => (
                Some(&bundle.model),
                Some(&bundle.encoder),
                Some(&bundle.trends),
                Some(&bundle.peak_hours),
            ),
            Self::Partial { artifacts, .. } => (
                artifacts.model.as_ref(),
                artifacts.encoder.as_ref(),
                artifacts.trends.as_ref(),
                artifacts.peak_hours.as_ref(),
            ),
            Self::NotLoaded { .. } => (None, None, None, None),
        }
    }

    /// Model and encoder together, or `ModelUnavailable` if either is absent.
    pub fn forecaster(&self) -> Result<Forecaster<'_>, ServiceError> {
        match self.parts() {
            (Some(model), Some(encoder), _, _) => Ok(Forecaster::new(model, encoder)),
            _ => Err(ServiceError::ModelUnavailable),
        }
    }

    pub fn trends(&self) -> Option<&TrendTable> {
        self.parts().2
    }

    pub fn peak_hours(&self) -> Option<&PeakHourTable> {
        self.parts().3
    }

    /// Readiness view of the loaded artifacts.
    pub fn status(&self) -> HealthDetail {
        match self {
            Self::Loaded(_) => HealthDetail::new(HealthStatus::Up, None),
            Self::Partial { missing, .. } => {
                let names: Vec<String> = missing.iter().map(ToString::to_string).collect();
                HealthDetail::new(
                    HealthStatus::Degraded,
                    Some(format!("missing artifacts: {}", names.join(", "))),
                )
            }
            Self::NotLoaded { reason } => {
                HealthDetail::new(HealthStatus::Down, Some(reason.clone()))
            }
        }
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self, Self::Loaded(_))
    }

    pub fn metadata(&self) -> Option<&BundleMetadata> {
        match self {
            Self::Loaded(bundle) => Some(&bundle.metadata),
            Self::Partial { artifacts, .. } => artifacts.metadata.as_ref(),
            Self::NotLoaded { .. } => None,
        }
    }
}
