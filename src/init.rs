use crate::client::IndexClient;
use crate::format::DocumentFormatter;
use crate::layer::IndexLogLayer;
use crate::schema;
use std::collections::BTreeMap;
use std::error::Error;
use std::sync::Arc;
use tracing::Level;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::Registry;

/// Configuration for index-backed logging.
///
/// **Fields**
/// - `index`: target index name; created at setup time if absent.
/// - `level`: minimum severity forwarded to any handler, index or
///   console.
/// - `copy_console`: also print events via a `fmt` layer.
/// - `extra_fields`: event field names copied into documents when an
///   event carries them. Registered in the index schema as keyword.
/// - `extra_values`: constant field values stamped on every document;
///   their names are registered as keyword fields too.
#[derive(Clone, Debug)]
pub struct IndexLogConfig {
    pub index: String,
    pub level: Level,
    pub copy_console: bool,
    pub extra_fields: Vec<String>,
    pub extra_values: BTreeMap<String, String>,
}

impl IndexLogConfig {
    /// Defaults: level `INFO`, console mirroring on, no extras.
    pub fn new(index: impl Into<String>) -> Self {
        IndexLogConfig {
            index: index.into(),
            level: Level::INFO,
            copy_console: true,
            extra_fields: Vec::new(),
            extra_values: BTreeMap::new(),
        }
    }
}

/// Errors raised while wiring up index-backed logging.
#[derive(thiserror::Error, Debug)]
pub enum SetupError {
    /// The client failed while checking, creating or registering the
    /// index schema.
    #[error("index provisioning failed: {0}")]
    Provision(Box<dyn Error + Send + Sync>),

    /// A global subscriber is already installed. Setup installs exactly
    /// one subscriber and never stacks handlers cumulatively.
    #[error("global subscriber install failed: {0}")]
    Install(#[from] tracing::subscriber::SetGlobalDefaultError),
}

/// Ensure the target index exists and carries the merged field schema.
///
/// Checks for the index, creates it if the client reports it absent, and
/// registers the fixed document fields plus `extra_fields` (as keyword).
/// Runs once per setup call, before any document is uploaded.
pub fn provision_index(
    client: &dyn IndexClient,
    index: &str,
    extra_fields: &[String],
) -> Result<(), SetupError> {
    let exists = client.check_index(index).map_err(SetupError::Provision)?;
    if !exists {
        client.create_index(index).map_err(SetupError::Provision)?;
    }
    let fields = schema::merged_fields(extra_fields.iter().cloned());
    client.set_fields(index, &fields).map_err(SetupError::Provision)?;
    Ok(())
}

/// Set up index-backed logging with default configuration for `index`.
///
/// Equivalent to [`init_index_logging_with_config`] with
/// [`IndexLogConfig::new`].
pub fn init_index_logging(
    client: Arc<dyn IndexClient>,
    index: impl Into<String>,
) -> Result<(), SetupError> {
    init_index_logging_with_config(client, IndexLogConfig::new(index))
}

/// Set up index-backed logging for the whole process.
///
/// Provisions the index, then installs a global subscriber composed of
/// the level filter, the [`IndexLogLayer`] and, when `copy_console` is
/// set, a `fmt` layer mirroring events to the console.
///
/// **Returns**
/// - `Ok(())` once the subscriber is installed.
/// - [`SetupError::Provision`] if the client failed during provisioning.
/// - [`SetupError::Install`] if a global subscriber already exists;
///   calling this twice is an error, not a second handler.
pub fn init_index_logging_with_config(
    client: Arc<dyn IndexClient>,
    config: IndexLogConfig,
) -> Result<(), SetupError> {
    let extra_fields = merged_extra_names(&config.extra_fields, &config.extra_values);
    provision_index(client.as_ref(), &config.index, &extra_fields)?;

    let formatter = DocumentFormatter::new(extra_fields, config.extra_values);
    let layer = IndexLogLayer::new(client, config.index, formatter);
    let filter = LevelFilter::from_level(config.level);

    if config.copy_console {
        let fmt_layer = tracing_subscriber::fmt::layer();
        let subscriber = Registry::default().with(filter).with(layer).with(fmt_layer);
        tracing::subscriber::set_global_default(subscriber)?;
    } else {
        let subscriber = Registry::default().with(filter).with(layer);
        tracing::subscriber::set_global_default(subscriber)?;
    }
    Ok(())
}

/// Configured extra field names plus constant-value names, order
/// preserved, duplicates removed.
fn merged_extra_names(
    extra_fields: &[String],
    extra_values: &BTreeMap<String, String>,
) -> Vec<String> {
    let mut names = extra_fields.to_vec();
    for name in extra_values.keys() {
        if !names.contains(name) {
            names.push(name.clone());
        }
    }
    names
}
