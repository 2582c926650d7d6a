//! Where project records come from.
//!
//! Sources are tried in order and the first one that yields records wins.
//! When every source fails (or returns nothing) the embedded snapshot from
//! [`crate::fallback`] is used instead; callers never see the failure except
//! through the `warn!` log and [`DataOrigin::Fallback`].
use crate::fallback;
use crate::loader::{self, LoadError, LoadReport};
use crate::types::ProjectRecord;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, warn};

pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(8);

#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error("request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: Box<ureq::Error>,
    },
    #[error("response from {url} is not a project list: {source}")]
    Decode {
        url: String,
        #[source]
        source: LoadError,
    },
}

pub trait ProjectSource {
    fn describe(&self) -> String;
    fn fetch(&self) -> Result<Vec<ProjectRecord>, SourceError>;
}

/// Local CSV or JSON export.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn load(&self) -> Result<(Vec<ProjectRecord>, LoadReport), SourceError> {
        Ok(loader::load_path(&self.path)?)
    }
}

impl ProjectSource for FileSource {
    fn describe(&self) -> String {
        format!("file {}", self.path.display())
    }

    fn fetch(&self) -> Result<Vec<ProjectRecord>, SourceError> {
        let (records, report) = self.load()?;
        if report.parse_errors > 0 {
            warn!(
                path = %self.path.display(),
                skipped = report.parse_errors,
                "some rows were skipped due to parse/validation errors"
            );
        }
        Ok(records)
    }
}

/// JSON endpoint returning an array of project records.
#[derive(Debug, Clone)]
pub struct RemoteSource {
    url: String,
    timeout: Duration,
}

impl RemoteSource {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            timeout: DEFAULT_FETCH_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl ProjectSource for RemoteSource {
    fn describe(&self) -> String {
        format!("remote {}", self.url)
    }

    fn fetch(&self) -> Result<Vec<ProjectRecord>, SourceError> {
        let agent = ureq::AgentBuilder::new().timeout(self.timeout).build();
        let response = agent
            .get(&self.url)
            .set("Accept", "application/json")
            .set("User-Agent", "ieop-report")
            .call()
            .map_err(|source| SourceError::Http {
                url: self.url.clone(),
                source: Box::new(source),
            })?;
        loader::load_json(response.into_reader()).map_err(|source| SourceError::Decode {
            url: self.url.clone(),
            source,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataOrigin {
    Source(String),
    Fallback,
}

impl DataOrigin {
    pub fn label(&self) -> String {
        match self {
            DataOrigin::Source(description) => description.clone(),
            DataOrigin::Fallback => "embedded fallback dataset".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LoadedPortfolio {
    pub records: Vec<ProjectRecord>,
    pub origin: DataOrigin,
}

pub fn load_with_fallback(sources: &[&dyn ProjectSource]) -> LoadedPortfolio {
    for source in sources {
        match source.fetch() {
            Ok(records) if !records.is_empty() => {
                info!(source = %source.describe(), count = records.len(), "project records loaded");
                return LoadedPortfolio {
                    records,
                    origin: DataOrigin::Source(source.describe()),
                };
            }
            Ok(_) => warn!(source = %source.describe(), "source returned no projects"),
            Err(err) => warn!(source = %source.describe(), %err, "source unavailable"),
        }
    }

    let records = fallback::dataset().to_vec();
    info!(count = records.len(), "using embedded fallback dataset");
    LoadedPortfolio {
        records,
        origin: DataOrigin::Fallback,
    }
}
