use std::f64::consts::PI;

// ---------------------------------------------------------------------------
// Histogram
// ---------------------------------------------------------------------------

/// Upper bound on the bin count. A tight cluster with a far outlier would
/// otherwise ask for millions of Freedman–Diaconis bins.
pub const MAX_BINS: usize = 1000;

/// Equal-width histogram. `edges.len() == counts.len() + 1`.
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    pub edges: Vec<f64>,
    pub counts: Vec<u64>,
}

impl Histogram {
    /// Bin `values` using the "auto" rule: the smaller of the Sturges and
    /// Freedman–Diaconis widths, Sturges alone when the IQR is zero. The
    /// count is capped at [`MAX_BINS`].
    ///
    /// `values` must be non-empty and finite.
    pub fn auto(values: &[f64]) -> Self {
        let (mut lo, mut hi) = min_max(values);
        if lo == hi {
            lo -= 0.5;
            hi += 0.5;
        }

        let width = auto_bin_width(values);
        let n_bins = if width > 0.0 {
            (((hi - lo) / width).ceil() as usize).clamp(1, MAX_BINS)
        } else {
            1
        };

        let step = (hi - lo) / n_bins as f64;
        let mut edges: Vec<f64> = (0..n_bins).map(|i| lo + step * i as f64).collect();
        edges.push(hi);

        let mut counts = vec![0u64; n_bins];
        for &v in values {
            // Last bin is closed on the right.
            let idx = (((v - lo) / (hi - lo)) * n_bins as f64) as usize;
            counts[idx.min(n_bins - 1)] += 1;
        }

        Histogram { edges, counts }
    }

    pub fn bin_width(&self) -> f64 {
        self.edges[1] - self.edges[0]
    }

    pub fn range(&self) -> (f64, f64) {
        (self.edges[0], self.edges[self.edges.len() - 1])
    }

    pub fn max_count(&self) -> u64 {
        self.counts.iter().copied().max().unwrap_or(0)
    }

    /// `(left, right, count)` per bin.
    pub fn bins(&self) -> impl Iterator<Item = (f64, f64, u64)> + '_ {
        self.edges
            .windows(2)
            .zip(&self.counts)
            .map(|(edge, &count)| (edge[0], edge[1], count))
    }
}

fn auto_bin_width(values: &[f64]) -> f64 {
    let n = values.len() as f64;
    let (lo, hi) = min_max(values);
    let sturges = (hi - lo) / (n.log2() + 1.0);

    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let iqr = quantile(&sorted, 0.75) - quantile(&sorted, 0.25);
    let fd = 2.0 * iqr * n.powf(-1.0 / 3.0);

    if fd > 0.0 {
        fd.min(sturges)
    } else {
        sturges
    }
}

/// Linear-interpolation quantile of sorted data.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let below = pos.floor() as usize;
    let above = pos.ceil() as usize;
    let frac = pos - below as f64;
    sorted[below] + (sorted[above] - sorted[below]) * frac
}

fn min_max(values: &[f64]) -> (f64, f64) {
    values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        })
}

// ---------------------------------------------------------------------------
// Kernel density estimate
// ---------------------------------------------------------------------------

/// Points on the density curve.
pub const KDE_GRID_SIZE: usize = 200;

/// Gaussian KDE with Scott's bandwidth, evaluated on [`KDE_GRID_SIZE`] points
/// spanning `[lo, hi]` and multiplied by `scale`.
///
/// `None` for fewer than two values or zero variance.
pub fn gaussian_kde(values: &[f64], lo: f64, hi: f64, scale: f64) -> Option<Vec<(f64, f64)>> {
    let n = values.len();
    if n < 2 {
        return None;
    }
    let nf = n as f64;
    let mean = values.iter().sum::<f64>() / nf;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (nf - 1.0);
    let std_dev = variance.sqrt();
    if std_dev <= 0.0 || !std_dev.is_finite() {
        return None;
    }

    let bandwidth = std_dev * nf.powf(-0.2);
    let norm = 1.0 / (nf * bandwidth * (2.0 * PI).sqrt());
    let step = (hi - lo) / (KDE_GRID_SIZE - 1) as f64;

    let curve = (0..KDE_GRID_SIZE)
        .map(|i| {
            let x = lo + step * i as f64;
            let density: f64 = values
                .iter()
                .map(|v| {
                    let z = (x - v) / bandwidth;
                    (-0.5 * z * z).exp()
                })
                .sum::<f64>()
                * norm;
            (x, density * scale)
        })
        .collect();
    Some(curve)
}

// ---------------------------------------------------------------------------
// Distribution – what gets plotted
// ---------------------------------------------------------------------------

/// Histogram plus its count-scaled density curve.
#[derive(Debug, Clone)]
pub struct Distribution {
    pub histogram: Histogram,
    pub density: Option<Vec<(f64, f64)>>,
}

impl Distribution {
    /// `None` when `values` is empty.
    pub fn from_values(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        let histogram = Histogram::auto(values);
        let (lo, hi) = min_max(values);
        let scale = values.len() as f64 * histogram.bin_width();
        let density = gaussian_kde(values, lo, hi, scale);

        Some(Distribution { histogram, density })
    }

    /// Highest bar or curve point.
    pub fn y_max(&self) -> f64 {
        let curve_max = self
            .density
            .iter()
            .flatten()
            .map(|&(_, y)| y)
            .fold(0.0, f64::max);
        (self.histogram.max_count() as f64).max(curve_max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-9, "{a} != {b}");
    }

    #[test]
    fn three_values_get_sturges_bins() {
        let h = Histogram::auto(&[1.0, 2.0, 3.0]);
        assert_eq!(h.counts, vec![1, 1, 1]);
        assert_eq!(h.edges.len(), 4);
        assert_close(h.edges[0], 1.0);
        assert_close(h.edges[3], 3.0);
        assert_close(h.bin_width(), 2.0 / 3.0);
    }

    #[test]
    fn constant_values_get_one_unit_bin() {
        let h = Histogram::auto(&[5.0, 5.0, 5.0]);
        assert_eq!(h.counts, vec![3]);
        assert_eq!(h.range(), (4.5, 5.5));
    }

    #[test]
    fn maximum_lands_in_last_bin() {
        let values: Vec<f64> = (0..100).map(f64::from).collect();
        let h = Histogram::auto(&values);
        assert_eq!(h.counts.iter().sum::<u64>(), 100);
        assert!(*h.counts.last().unwrap() > 0);
        assert_eq!(h.bins().count(), h.counts.len());
    }

    #[test]
    fn freedman_diaconis_wins_with_outliers() {
        // Tight cluster plus one far outlier: FD gives narrow bins.
        let mut values: Vec<f64> = (0..50).map(|i| 10.0 + f64::from(i) * 0.01).collect();
        values.push(1000.0);
        let h = Histogram::auto(&values);
        let sturges_bins = ((values.len() as f64).log2() + 1.0).ceil() as usize;
        assert!(h.counts.len() > sturges_bins);
    }

    #[test]
    fn far_outlier_caps_bin_count() {
        for outlier in [1.0e7, 1.0e15] {
            let mut values: Vec<f64> = (0..50).map(|i| 10.0 + f64::from(i) * 0.01).collect();
            values.push(outlier);
            let h = Histogram::auto(&values);
            assert_eq!(h.counts.len(), MAX_BINS);
            assert_eq!(h.edges.len(), MAX_BINS + 1);
            assert_eq!(h.counts.iter().sum::<u64>(), 51);
            assert_eq!(*h.counts.last().unwrap(), 1);
            assert_close(h.range().1, outlier);
        }
    }

    #[test]
    fn quantile_interpolates() {
        let sorted = [1.0, 2.0, 3.0, 4.0];
        assert_close(quantile(&sorted, 0.25), 1.75);
        assert_close(quantile(&sorted, 0.75), 3.25);
        assert_close(quantile(&[7.0], 0.5), 7.0);
    }

    #[test]
    fn kde_is_symmetric_for_symmetric_data() {
        let curve = gaussian_kde(&[1.0, 2.0, 3.0], 1.0, 3.0, 1.0).unwrap();
        assert_eq!(curve.len(), KDE_GRID_SIZE);
        assert_close(curve[0].0, 1.0);
        assert_close(curve[KDE_GRID_SIZE - 1].0, 3.0);
        assert_close(curve[0].1, curve[KDE_GRID_SIZE - 1].1);
        assert!(curve.iter().all(|&(_, y)| y > 0.0));
    }

    #[test]
    fn kde_needs_spread() {
        assert!(gaussian_kde(&[1.0], 0.0, 2.0, 1.0).is_none());
        assert!(gaussian_kde(&[2.0, 2.0], 1.5, 2.5, 1.0).is_none());
    }

    #[test]
    fn distribution_scales_density_to_counts() {
        let values: Vec<f64> = (0..1000).map(|i| f64::from(i % 100)).collect();
        let dist = Distribution::from_values(&values).unwrap();
        assert_eq!(dist.histogram.counts.iter().sum::<u64>(), 1000);

        // A flat distribution's curve should sit near the bar heights.
        let mean_count = 1000.0 / dist.histogram.counts.len() as f64;
        let curve = dist.density.as_ref().unwrap();
        let (_, mid) = curve[KDE_GRID_SIZE / 2];
        assert!((mid - mean_count).abs() / mean_count < 0.2);
        assert!(dist.y_max() >= dist.histogram.max_count() as f64);
    }

    #[test]
    fn empty_values_have_no_distribution() {
        assert!(Distribution::from_values(&[]).is_none());
    }
}
