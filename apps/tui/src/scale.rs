//! Linear and band scales with the tick and `nice` rules of the usual web
//! charting libraries, so axes land on round numbers.

const E10: f64 = 7.071_067_811_865_476; // sqrt(50)
const E5: f64 = 3.162_277_660_168_379_5; // sqrt(10)
const E2: f64 = std::f64::consts::SQRT_2;

pub const DEFAULT_TICKS: usize = 10;

/// Step between ticks. Negative values mean "divide by |step|".
pub fn tick_increment(start: f64, stop: f64, count: usize) -> f64 {
    let step = (stop - start) / count.max(1) as f64;
    let power = step.log10().floor();
    let error = step / 10f64.powf(power);
    let factor = if error >= E10 {
        10.0
    } else if error >= E5 {
        5.0
    } else if error >= E2 {
        2.0
    } else {
        1.0
    };
    if power >= 0.0 {
        factor * 10f64.powf(power)
    } else {
        -(10f64.powf(-power)) / factor
    }
}

/// Extends `[start, stop]` outward to round tick boundaries.
#[allow(clippy::float_cmp)]
pub fn nice(start: f64, stop: f64, count: usize) -> (f64, f64) {
    if !(start.is_finite() && stop.is_finite()) {
        return (start, stop);
    }
    let (mut lo, mut hi) = if stop < start {
        (stop, start)
    } else {
        (start, stop)
    };
    let mut previous = None;
    for _ in 0..10 {
        let step = tick_increment(lo, hi, count);
        if !step.is_finite() || previous == Some(step) {
            break;
        }
        if step > 0.0 {
            lo = (lo / step).floor() * step;
            hi = (hi / step).ceil() * step;
        } else if step < 0.0 {
            lo = (lo * step).ceil() / step;
            hi = (hi * step).floor() / step;
        } else {
            break;
        }
        previous = Some(step);
    }
    (lo, hi)
}

#[allow(clippy::float_cmp)]
pub fn ticks(start: f64, stop: f64, count: usize) -> Vec<f64> {
    if count == 0 || !(start.is_finite() && stop.is_finite()) {
        return Vec::new();
    }
    if start == stop {
        return vec![start];
    }
    let (lo, hi) = if stop < start {
        (stop, start)
    } else {
        (start, stop)
    };
    let step = tick_increment(lo, hi, count);
    if step == 0.0 || !step.is_finite() {
        return Vec::new();
    }

    // Negative steps divide, which keeps fractional ticks exact.
    let divide = step < 0.0;
    let inc = step.abs();
    let at = |i: f64| if divide { i / inc } else { i * inc };
    let mut i1 = if divide { (lo * inc).round() } else { (lo / inc).round() };
    let mut i2 = if divide { (hi * inc).round() } else { (hi / inc).round() };
    if at(i1) < lo {
        i1 += 1.0;
    }
    if at(i2) > hi {
        i2 -= 1.0;
    }

    let mut out = Vec::new();
    let mut i = i1;
    while i <= i2 {
        out.push(at(i));
        i += 1.0;
    }
    out
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearScale {
    pub domain: (f64, f64),
    pub range: (f64, f64),
}

impl LinearScale {
    pub const fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        Self { domain, range }
    }

    /// Domain from the data extent, widened to nice bounds.
    pub fn nice_extent(extent: (f64, f64), range: (f64, f64)) -> Self {
        Self::new(nice(extent.0, extent.1, DEFAULT_TICKS), range)
    }

    /// A zero-width domain maps everything to the middle of the range.
    #[allow(clippy::float_cmp)]
    pub fn map(&self, value: f64) -> f64 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        let span = d1 - d0;
        let t = if span == 0.0 { 0.5 } else { (value - d0) / span };
        (r1 - r0).mul_add(t, r0)
    }

    pub fn ticks(&self) -> Vec<f64> {
        ticks(self.domain.0, self.domain.1, DEFAULT_TICKS)
    }
}

/// Evenly spaced bands with equal inner and outer padding, centred in the
/// range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BandScale {
    start: f64,
    step: f64,
    bandwidth: f64,
    count: usize,
}

impl BandScale {
    pub fn new(count: usize, range: (f64, f64), padding: f64) -> Self {
        let (r0, r1) = range;
        let n = count as f64;
        let step = (r1 - r0) / 2.0f64.mul_add(padding, n - padding).max(1.0);
        let start = (r1 - r0 - step * (n - padding)).mul_add(0.5, r0);
        Self {
            start,
            step,
            bandwidth: step * (1.0 - padding),
            count,
        }
    }

    pub fn position(&self, index: usize) -> Option<f64> {
        (index < self.count).then(|| self.step.mul_add(index as f64, self.start))
    }

    pub const fn bandwidth(&self) -> f64 {
        self.bandwidth
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn nice_rounds_outward() {
        assert_eq!(nice(0.3, 9.7, 10), (0.0, 10.0));
        assert_eq!(nice(12.0, 987.0, 10), (0.0, 1000.0));
        let (lo, hi) = nice(0.123, 0.876, 10);
        assert!(close(lo, 0.1) && close(hi, 0.9));
    }

    #[test]
    fn nice_leaves_degenerate_domains() {
        assert_eq!(nice(5.0, 5.0, 10), (5.0, 5.0));
    }

    #[test]
    fn ticks_cover_the_domain() {
        assert_eq!(
            ticks(0.0, 10.0, 10),
            vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0]
        );
        assert_eq!(ticks(0.0, 100.0, 5), vec![0.0, 20.0, 40.0, 60.0, 80.0, 100.0]);
        let fractional = ticks(0.0, 1.0, 5);
        assert_eq!(fractional.len(), 6);
        assert!(close(fractional[3], 0.6));
    }

    #[test]
    fn linear_scale_maps_and_inverts_range() {
        let scale = LinearScale::new((0.0, 10.0), (500.0, 100.0));
        assert!(close(scale.map(0.0), 500.0));
        assert!(close(scale.map(10.0), 100.0));
        assert!(close(scale.map(2.5), 400.0));
        let flat = LinearScale::new((3.0, 3.0), (0.0, 100.0));
        assert!(close(flat.map(3.0), 50.0));
    }

    #[test]
    fn band_scale_matches_padding_rules() {
        let band = BandScale::new(2, (60.0, 930.0), 0.5);
        let step = 870.0 / 2.5;
        assert!(close(band.bandwidth(), step * 0.5));
        assert!(close(band.position(0).unwrap(), 60.0 + step * 0.5));
        assert!(close(band.position(1).unwrap(), 60.0 + step * 1.5));
        assert_eq!(band.position(2), None);
    }
}
