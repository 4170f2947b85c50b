use crate::clustering::ClusteringResult;
use crate::core::float::KFloat;
use crate::dataset::Dataset;
use crate::distances::{DistanceMetric, SquaredEuclideanDistance};
use colored::Colorize;
use num_traits::ToPrimitive;
use std::fmt;
use std::fmt::Write;

/// Prints every cluster's members followed by summary statistics.
pub fn print_cluster_report<F: KFloat>(result: &ClusteringResult<F>, dataset: &Dataset<F>) {
    println!("\n{}", "=== Cluster Report ===".bold());

    for (cluster, members) in result.groups(dataset).iter().enumerate() {
        println!("\n{}", format!("Class {}", cluster).bold());
        println!("========");
        for label in members {
            println!("{}", label);
        }
    }

    let stats = calculate_cluster_stats(result, dataset);
    print_detailed_cluster_info(&stats, dataset.len());
    print_summary_statistics(&stats, result);
}

/// Plain-text listing of each cluster's members, one label per line.
pub fn format_groups<F: KFloat>(result: &ClusteringResult<F>, dataset: &Dataset<F>) -> String {
    let mut out = String::new();
    for (cluster, members) in result.groups(dataset).iter().enumerate() {
        let _ = writeln!(out, "Class {}", cluster);
        let _ = writeln!(out, "========");
        for label in members {
            let _ = writeln!(out, "{}", label);
        }
        out.push('\n');
    }
    out
}

/// Prints the sse for each k, as computed by [`sse_by_k`](crate::clustering::sse_by_k).
pub fn print_sse_by_k<F: KFloat>(sse: &[F]) {
    println!("\n{}", "SSE by k:".bold());
    for (idx, value) in sse.iter().enumerate() {
        println!("  k = {:>3}: {:.4}", idx + 1, value.to_f64().unwrap_or(f64::NAN));
    }
}

fn calculate_cluster_stats<F: KFloat>(
    result: &ClusteringResult<F>,
    dataset: &Dataset<F>,
) -> Vec<ClusterStats> {
    (0..result.k())
        .map(|cluster| {
            let members = result.cluster_members(cluster);
            let centroid = result.centroids.row(cluster);
            let sse: f64 = members
                .iter()
                .map(|&idx| {
                    SquaredEuclideanDistance
                        .compute(&dataset.normalized_row(idx), &centroid)
                        .to_f64()
                        .unwrap_or(f64::NAN)
                })
                .sum();
            let avg_sq_distance = if members.is_empty() {
                0.0
            } else {
                sse / members.len() as f64
            };
            ClusterStats {
                cluster_id: cluster,
                size: members.len(),
                sse,
                avg_sq_distance,
            }
        })
        .collect()
}

#[derive(Debug)]
struct ClusterStats {
    cluster_id: usize,
    size: usize,
    sse: f64,
    avg_sq_distance: f64,
}

impl fmt::Display for ClusterStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Cluster {}: {} points, SSE: {:.4}, Avg Squared Distance: {:.4}",
            self.cluster_id, self.size, self.sse, self.avg_sq_distance
        )
    }
}

fn print_detailed_cluster_info(stats: &[ClusterStats], records: usize) {
    println!("\n{}", "Detailed Cluster Information:".bold());
    let even_share = records as f64 / stats.len().max(1) as f64;
    for stat in stats {
        let info = format!("{}", stat);
        match stat.size as f64 {
            size if size < even_share / 2.0 => println!("{}", info.red()),
            size if size > even_share * 2.0 => println!("{}", info.yellow()),
            _ => println!("{}", info.green()),
        }
    }
}

fn print_summary_statistics<F: KFloat>(stats: &[ClusterStats], result: &ClusteringResult<F>) {
    println!("\n{}", "Summary Statistics:".bold());
    println!("Total Clusters: {}", stats.len());

    let total_points: usize = stats.iter().map(|s| s.size).sum();
    let avg_cluster_size = total_points as f64 / stats.len().max(1) as f64;

    println!("Total Points: {}", total_points);
    println!("Average Cluster Size: {:.2}", avg_cluster_size);
    println!("Sum of Squared Error: {:.4}", result.sse);
    println!("Iterations: {}", result.iterations);
    println!("Termination: {}", result.termination);
    if let Some(warning) = &result.warning {
        println!("{}", warning.to_string().yellow());
    }
}
