//! Resolve Demo
//!
//! This demo talks to the cluster in the current kubeconfig through a
//! shared discovery cache:
//! - `resolve` maps kinds to resources, including version fall-through
//!   (`v1beta1` before `v1`) and kinds no cluster serves
//! - `apply` plans a manifest and server-side applies it
//!
//! Run with:
//! ```bash
//! cargo run -p restmap-resolve -- resolve apps/Deployment=v1beta1,v1 Namespace=v1
//! cargo run -p restmap-resolve -- apply --file manifest.yaml --namespace team-a
//! ```
//!
//! Set `RUST_LOG=restmap_cache=trace` to see every hit and fetch.

use std::str::FromStr;
use std::sync::Arc;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use restmap::prelude::*;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Queries resolved when none are given.
const DEFAULT_QUERIES: &[&str] = &[
    "Pod=v1",
    "Namespace=v1",
    "apps/Deployment=v1beta1,v1",
    "apps/StatefulSet=v1",
    "batch/CronJob=v1,v1beta1",
    "rbac.authorization.k8s.io/ClusterRole=v1",
    "example.com/Widget=v1",
];

#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Per-fetch discovery timeout in seconds
    #[arg(long, global = true, default_value_t = 30)]
    fetch_timeout: u64,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Resolve `[group/]Kind=version[,version...]` queries
    Resolve {
        /// Queries to resolve; a built-in list is used when empty
        queries: Vec<Query>,
    },
    /// Plan and server-side apply a manifest
    Apply {
        /// Multi-document YAML manifest
        #[arg(short, long)]
        file: std::path::PathBuf,

        /// Namespace for namespaced objects that do not set one
        #[arg(short, long)]
        namespace: Option<String>,

        /// Only print the plan
        #[arg(long, default_value_t = false)]
        dry_run: bool,

        /// Ask the server for strict field validation
        #[arg(long, default_value_t = false)]
        validate: bool,

        /// Take ownership of conflicting fields
        #[arg(long, default_value_t = false)]
        force: bool,
    },
}

/// A `[group/]Kind=version[,version...]` query.
#[derive(Debug, Clone)]
struct Query {
    group_kind: GroupKind,
    versions: Vec<String>,
}

impl FromStr for Query {
    type Err = anyhow::Error;

    fn from_str(raw: &str) -> anyhow::Result<Self> {
        let Some((gk, versions)) = raw.split_once('=') else {
            bail!("expected [group/]Kind=versions, got {raw:?}");
        };
        let (group, kind) = gk.rsplit_once('/').unwrap_or(("", gk));
        let versions: Vec<String> = versions
            .split(',')
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(String::from)
            .collect();

        if kind.is_empty() || versions.is_empty() {
            bail!("incomplete query {raw:?}");
        }

        Ok(Self {
            group_kind: GroupKind::new(group, kind),
            versions,
        })
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let args = Args::parse();
    info!("{}", restmap::version::version_string());

    let discovery = KubeDiscovery::try_default()
        .await
        .context("connecting to the cluster")?;
    let client = discovery.client().clone();
    let cache = Arc::new(
        DiscoveryCache::builder()
            .fetch_timeout(std::time::Duration::from_secs(args.fetch_timeout))
            .build(discovery),
    );
    let mapper = ControllerRestMapper::new(Arc::clone(&cache));

    match args.command {
        Command::Resolve { queries } => {
            let queries = if queries.is_empty() {
                DEFAULT_QUERIES
                    .iter()
                    .map(|q| q.parse())
                    .collect::<anyhow::Result<Vec<Query>>>()?
            } else {
                queries
            };
            resolve_all(&mapper, &queries).await?;
        }
        Command::Apply {
            file,
            namespace,
            dry_run,
            validate,
            force,
        } => {
            let manifest = std::fs::read_to_string(&file)
                .with_context(|| format!("reading {}", file.display()))?;
            let mut options = ApplierOptions::new(manifest).validate(validate).force(force);
            if let Some(namespace) = namespace {
                options = options.namespace(namespace);
            }

            if dry_run {
                for object in plan(&mapper, &options).await? {
                    info!("would apply {}", object);
                }
            } else {
                let applier = DirectApplier::new(client, Arc::new(mapper));
                let applied = applier.apply(&options).await?;
                info!("Applied {} objects from {}", applied.len(), file.display());
            }
        }
    }

    let stats = cache.stats();
    info!(
        "Cache stats: entries={}, hits={}, misses={}, fetches={}, stale_retries={}, hit_rate={:.2}%",
        cache.len(),
        stats.hits(),
        stats.misses(),
        stats.fetches(),
        stats.stale_retries(),
        stats.hit_rate() * 100.0
    );

    Ok(())
}

async fn resolve_all(mapper: &ControllerRestMapper, queries: &[Query]) -> anyhow::Result<()> {
    for query in queries {
        match mapper.resolve(&query.group_kind, &query.versions).await {
            Ok(mapping) => info!("{}", mapping),
            Err(err) if err.is_no_match() => warn!("{}", err),
            Err(err) => return Err(err).context("discovery failed"),
        }
    }
    Ok(())
}
