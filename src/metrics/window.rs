/// Nearest-rank percentile over an ascending slice: index `round((n-1)*p)`.
pub fn percentile(sorted: &[u64], p: f64) -> u64 {
    if sorted.is_empty() {
        return 0;
    }
    let idx = ((sorted.len() - 1) as f64 * p).round() as usize;
    sorted[idx.min(sorted.len() - 1)]
}

pub fn p95<'a>(windows: impl IntoIterator<Item = &'a [u64]>) -> u64 {
    let mut all: Vec<u64> = windows.into_iter().flatten().copied().collect();
    all.sort_unstable();
    percentile(&all, 0.95)
}
