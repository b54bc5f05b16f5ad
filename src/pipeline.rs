use crate::caller::{CallerConfig, CsvTagResult, process_cluster};
use crate::error::CsvTagError;
use crate::record::AlignmentRecord;
use anyhow::Result;
use crossfire::mpmc;
use std::collections::BTreeMap;
use std::thread;

#[derive(Debug, Default)]
pub struct Stats {
    pub clusters: u64,
    pub failed_clusters: u64,
    pub results: u64,
}

struct WorkItem {
    idx: usize,
    cluster: Vec<AlignmentRecord>,
}

struct ResultItem {
    idx: usize,
    key: (String, String),
    result: std::result::Result<Vec<CsvTagResult>, CsvTagError>,
}

/// Group records into clusters of shared `(read_id, reference_id)`, each
/// sorted by `position`. Clusters come out in sorted key order.
pub fn group_into_clusters(mut records: Vec<AlignmentRecord>) -> Vec<Vec<AlignmentRecord>> {
    records.sort_by(|a, b| {
        (a.read_id.as_str(), a.reference_id.as_str(), a.position).cmp(&(
            b.read_id.as_str(),
            b.reference_id.as_str(),
            b.position,
        ))
    });

    let mut clusters: Vec<Vec<AlignmentRecord>> = Vec::new();
    for record in records {
        match clusters.last_mut() {
            Some(cluster)
                if cluster[0].read_id == record.read_id
                    && cluster[0].reference_id == record.reference_id =>
            {
                cluster.push(record);
            }
            _ => clusters.push(vec![record]),
        }
    }
    clusters
}

/// Run the caller over all records: group into clusters, process each
/// cluster (on a worker pool when `threads > 1`), and collect results in
/// cluster order. A cluster that fails is excluded and counted, not fatal.
pub fn run(
    records: Vec<AlignmentRecord>,
    config: &CallerConfig,
    threads: usize,
    stats: &mut Stats,
) -> Result<Vec<CsvTagResult>> {
    let clusters = group_into_clusters(records);
    stats.clusters = clusters.len() as u64;

    let results = if threads > 1 {
        run_parallel(clusters, config, threads, stats)?
    } else {
        run_serial(clusters, config, stats)
    };
    stats.results = results.len() as u64;
    Ok(results)
}

fn warn_failed(key: &(String, String), err: &CsvTagError, stats: &mut Stats) {
    stats.failed_clusters += 1;
    tracing::warn!(
        read_id = %key.0,
        reference_id = %key.1,
        error = %err,
        "cluster excluded from output"
    );
}

fn cluster_key(cluster: &[AlignmentRecord]) -> (String, String) {
    (cluster[0].read_id.clone(), cluster[0].reference_id.clone())
}

pub(crate) fn run_serial(
    clusters: Vec<Vec<AlignmentRecord>>,
    config: &CallerConfig,
    stats: &mut Stats,
) -> Vec<CsvTagResult> {
    let mut out = Vec::new();
    for cluster in &clusters {
        match process_cluster(cluster, config) {
            Ok(results) => out.extend(results),
            Err(err) => warn_failed(&cluster_key(cluster), &err, stats),
        }
    }
    out
}

fn run_parallel(
    clusters: Vec<Vec<AlignmentRecord>>,
    config: &CallerConfig,
    threads: usize,
    stats: &mut Stats,
) -> Result<Vec<CsvTagResult>> {
    crossfire::detect_backoff_cfg();
    let cap = threads.saturating_mul(4).max(8);
    let (tx_work, rx_work) = mpmc::bounded_blocking::<WorkItem>(cap);
    let (tx_res, rx_res) = mpmc::unbounded_blocking::<ResultItem>();

    let total = clusters.len();

    thread::scope(|scope| -> Result<Vec<CsvTagResult>> {
        for _ in 0..threads {
            let rx_work = rx_work.clone();
            let tx_res = tx_res.clone();
            scope.spawn(move || {
                while let Ok(item) = rx_work.recv() {
                    let key = cluster_key(&item.cluster);
                    let result = process_cluster(&item.cluster, config);
                    let _ = tx_res.send(ResultItem {
                        idx: item.idx,
                        key,
                        result,
                    });
                }
            });
        }
        drop(tx_res);

        for (idx, cluster) in clusters.into_iter().enumerate() {
            tx_work.send(WorkItem { idx, cluster })?;
        }
        drop(tx_work);

        // Workers finish out of order; re-sequence by cluster index so the
        // output is deterministic.
        let mut pending: BTreeMap<
            usize,
            (
                (String, String),
                std::result::Result<Vec<CsvTagResult>, CsvTagError>,
            ),
        > = BTreeMap::new();
        let mut next_idx = 0usize;
        let mut done = 0usize;
        let mut out = Vec::new();
        while done < total {
            let res = rx_res
                .recv()
                .map_err(|_| anyhow::anyhow!("worker result channel closed"))?;
            pending.insert(res.idx, (res.key, res.result));
            while let Some((key, result)) = pending.remove(&next_idx) {
                match result {
                    Ok(results) => out.extend(results),
                    Err(err) => warn_failed(&key, &err, stats),
                }
                next_idx += 1;
                done += 1;
            }
        }
        Ok(out)
    })
}
