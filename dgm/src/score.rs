use crate::error::Error;
use crate::Result;
use statrs::function::beta::checked_beta_reg;

/// One-sided p-value for the diversity of a k-mer's cluster structure.
///
/// Under the null every sampled window comes from a single variant and leaves it through read
/// noise with probability `error_rate`. With `n` windows of which `m` fall outside the largest
/// cluster, the p-value is `P(X >= m)` for `X ~ Binomial(n, error_rate)`. A single cluster
/// gives exactly 1.
pub fn diversity_pvalue(sizes: &[usize], error_rate: f64) -> Result<f64> {
    let total: usize = sizes.iter().sum();
    let dominant = sizes.iter().copied().max().unwrap_or(0);
    let off_dominant = total - dominant;

    if sizes.len() <= 1 || off_dominant == 0 {
        return Ok(1.0);
    }

    // P(X >= m) = I_p(m, n - m + 1)
    let pval = checked_beta_reg(
        off_dominant as f64,
        (total - off_dominant + 1) as f64,
        error_rate,
    )
    .map_err(|e| Error::Scoring(e.to_string()))?;

    Ok(pval.max(0.0).min(1.0))
}

/// Benjamini-Hochberg adjusted p-values, returned in input order
pub fn benjamini_hochberg(pvalues: &[f64]) -> Vec<f64> {
    let m = pvalues.len();
    let mut order = (0..m).collect::<Vec<_>>();
    order.sort_by(|&a, &b| {
        pvalues[a]
            .partial_cmp(&pvalues[b])
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut qvalues = vec![1.0; m];
    let mut running_min = 1.0f64;
    for (rank, &idx) in order.iter().enumerate().rev() {
        let q = pvalues[idx] * m as f64 / (rank + 1) as f64;
        running_min = running_min.min(q);
        qvalues[idx] = running_min;
    }
    qvalues
}
