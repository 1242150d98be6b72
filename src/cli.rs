//! Command Line Interface (CLI) arguments.

use clap::{Parser, ValueEnum};
use url::Url;

/// Kind of document source the dashboards read from
#[derive(Clone, Copy, Debug, PartialEq, ValueEnum)]
pub enum SourceKind {
    /// Hosted document database reached over HTTP
    Http,
    /// Directory of `<collection>.json` files
    Directory,
}

/// Desa dashboard command line interface
#[derive(Clone, Debug, Parser)]
pub struct CommandLineArgs {
    /// The IP address on which the server should listen
    #[arg(long, default_value = "0.0.0.0", env = "DESA_DASHBOARD_HOST")]
    pub host: String,
    /// The port to which the server should bind
    #[arg(long, default_value_t = 8080, env = "DESA_DASHBOARD_PORT")]
    pub port: u16,
    /// Flag indicating whether HTTPS should be used
    #[arg(long, default_value_t = false, env = "DESA_DASHBOARD_HTTPS")]
    pub https: bool,
    /// Path to the certificate file to be used for HTTPS encryption
    #[arg(
        long,
        default_value = "~/.config/desa-dashboard/certs/cert.pem",
        env = "DESA_DASHBOARD_CERT_FILE"
    )]
    pub cert_file: String,
    /// Path to the key file to be used for HTTPS encryption
    #[arg(
        long,
        default_value = "~/.config/desa-dashboard/certs/key.pem",
        env = "DESA_DASHBOARD_KEY_FILE"
    )]
    pub key_file: String,
    /// Maximum time in seconds to wait for operations to complete upon receiving `ctrl+c` signal.
    #[arg(long, default_value_t = 60, env = "DESA_DASHBOARD_SHUTDOWN_TIMEOUT")]
    pub graceful_shutdown_timeout: u64,
    /// Whether to enable sending traces to Jaeger.
    #[arg(long, default_value_t = false, env = "DESA_DASHBOARD_ENABLE_JAEGER")]
    pub enable_jaeger: bool,
    /// Whether to use Rayon for execution of aggregations.
    #[arg(long, default_value_t = false, env = "DESA_DASHBOARD_USE_RAYON")]
    pub use_rayon: bool,
    /// Kind of document source
    #[arg(long, value_enum, default_value_t = SourceKind::Http, env = "DESA_DASHBOARD_SOURCE_KIND")]
    pub source_kind: SourceKind,
    /// Base URL of the document database, required for the HTTP source
    #[arg(long, env = "DESA_DASHBOARD_SOURCE_URL")]
    pub source_url: Option<Url>,
    /// Directory holding collection files, required for the directory source
    #[arg(long, env = "DESA_DASHBOARD_SOURCE_DIR")]
    pub source_dir: Option<String>,
    /// Bearer token sent to the document database
    #[arg(long, env = "DESA_DASHBOARD_SOURCE_TOKEN", hide_env_values = true)]
    pub source_token: Option<String>,
    /// Maximum number of values in a single `in` query
    #[arg(
        long,
        default_value_t = 10,
        value_parser = clap::value_parser!(u16).range(1..),
        env = "DESA_DASHBOARD_IN_QUERY_CHUNK_SIZE"
    )]
    pub in_query_chunk_size: u16,
    /// Whether to cache collections fetched from the document source
    #[arg(long, default_value_t = false, env = "DESA_DASHBOARD_USE_COLLECTION_CACHE")]
    pub use_collection_cache: bool,
    /// Time in seconds for which cached collections are served
    #[arg(long, default_value_t = 60, env = "DESA_DASHBOARD_COLLECTION_CACHE_TTL")]
    pub collection_cache_ttl: u64,
    /// Maximum number of cached queries
    #[arg(long, default_value_t = 256, env = "DESA_DASHBOARD_COLLECTION_CACHE_SIZE")]
    pub collection_cache_size: usize,
    /// Maximum number of concurrent connections to the document source
    #[arg(long, env = "DESA_DASHBOARD_CONNECTION_LIMIT")]
    pub connection_limit: Option<usize>,
    /// Maximum memory held by document source responses, e.g. "512 MiB"
    #[arg(long, env = "DESA_DASHBOARD_MEMORY_LIMIT")]
    pub memory_limit: Option<String>,
    /// Maximum number of concurrent aggregation tasks. Defaults to the number of CPUs minus one
    #[arg(long, env = "DESA_DASHBOARD_THREAD_LIMIT")]
    pub thread_limit: Option<usize>,
}

/// Returns parsed command line arguments.
pub fn parse() -> CommandLineArgs {
    CommandLineArgs::parse()
}
