use clap::Parser;
use kcluster::clustering::{sse_by_k, Config, KMeansClustering};
use kcluster::dataset::Dataset;
use kcluster::report::{print_cluster_report, print_sse_by_k};
use kcluster::KClusterResult;
use log::{error, info};
use std::path::PathBuf;
use std::process::ExitCode;

/// Cluster the numeric records of a delimited file with median-normalized k-means.
#[derive(Parser, Debug)]
#[command(name = "kcluster", version, about)]
struct Cli {
    /// YAML configuration file
    #[arg(short, long, default_value = "demos/config.yaml")]
    config: PathBuf,

    /// Dataset file, overriding `data_file` from the configuration
    #[arg(short, long)]
    data: Option<PathBuf>,

    /// Number of clusters, overriding `clustering_params.k`
    #[arg(short, long)]
    k: Option<usize>,

    /// Also print the final SSE for every k from 1 to this value
    #[arg(long, value_name = "MAX_K")]
    elbow: Option<usize>,
}

fn run(cli: Cli) -> KClusterResult<()> {
    let mut config = Config::from_file(&cli.config)?;
    if let Some(data) = cli.data {
        config.data_file = Some(data.display().to_string());
    }
    if let Some(k) = cli.k {
        config.clustering_params.k = k;
    }
    config.validate()?;
    config.setup_logging();
    info!("{}", config);

    let dataset: Dataset<f64> = config.load_data()?;
    let params = config.to_clustering_params()?;

    if let Some(max_k) = cli.elbow {
        let sse = sse_by_k(dataset.normalized(), &params, max_k)?;
        print_sse_by_k(&sse);
    }

    let result = KMeansClustering::for_dataset(params, &dataset)?.fit()?;
    print_cluster_report(&result, &dataset);

    let raw = result.raw_centroids(&dataset);
    for (cluster, centroid) in raw.rows().into_iter().enumerate() {
        info!("Centroid {} (raw units): {}", cluster, centroid);
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}
