/// The coverage buckets used for the colors of the maps and the status of the tables.
///
/// The ranges are half-open and include their lower bound: 20% exactly is
/// `Poor`, not `Critical`.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Ord, PartialOrd)]
pub enum CoverageBucket {
    /// [0, 20)
    Critical,
    /// [20, 40)
    Poor,
    /// [40, 60)
    Fair,
    /// [60, 80)
    Good,
    /// [80, 100)
    Excellent,
    /// 100 and above
    Outstanding,
}

impl CoverageBucket {
    pub const ALL: [CoverageBucket; 6] = [
        CoverageBucket::Critical,
        CoverageBucket::Poor,
        CoverageBucket::Fair,
        CoverageBucket::Good,
        CoverageBucket::Excellent,
        CoverageBucket::Outstanding,
    ];

    /// Machine name, as written in the exports.
    pub fn name(&self) -> &'static str {
        match self {
            CoverageBucket::Critical => "critical",
            CoverageBucket::Poor => "poor",
            CoverageBucket::Fair => "fair",
            CoverageBucket::Good => "good",
            CoverageBucket::Excellent => "excellent",
            CoverageBucket::Outstanding => "outstanding",
        }
    }

    /// Human status label.
    pub fn label(&self) -> &'static str {
        match self {
            CoverageBucket::Critical => "Critical",
            CoverageBucket::Poor => "Poor",
            CoverageBucket::Fair => "Fair",
            CoverageBucket::Good => "Good",
            CoverageBucket::Excellent => "Excellent",
            CoverageBucket::Outstanding => "Outstanding",
        }
    }

    /// Fill color of the map panels.
    pub fn color(&self) -> &'static str {
        match self {
            CoverageBucket::Critical => "#d32f2f",
            CoverageBucket::Poor => "#f57c00",
            CoverageBucket::Fair => "#fbc02d",
            CoverageBucket::Good => "#388e3c",
            CoverageBucket::Excellent => "#1976d2",
            CoverageBucket::Outstanding => "#4a148c",
        }
    }

    pub fn color_name(&self) -> &'static str {
        match self {
            CoverageBucket::Critical => "red",
            CoverageBucket::Poor => "orange",
            CoverageBucket::Fair => "yellow",
            CoverageBucket::Good => "light green",
            CoverageBucket::Excellent => "blue",
            CoverageBucket::Outstanding => "purple",
        }
    }

    /// The legend line, for example `Orange: 20-39%`.
    pub fn legend(&self) -> String {
        let range = match self {
            CoverageBucket::Critical => "< 20%",
            CoverageBucket::Poor => "20-39%",
            CoverageBucket::Fair => "40-59%",
            CoverageBucket::Good => "60-79%",
            CoverageBucket::Excellent => "80-99%",
            CoverageBucket::Outstanding => "100%+",
        };
        format!("{}: {}", self.color_name(), range)
    }
}

/// Maps a coverage percentage to its bucket.
///
/// Coverage is never negative for non-negative counts. NaN lands in `Critical`.
pub fn classify(coverage_percent: f64) -> CoverageBucket {
    if coverage_percent >= 100.0 {
        CoverageBucket::Outstanding
    } else if coverage_percent >= 80.0 {
        CoverageBucket::Excellent
    } else if coverage_percent >= 60.0 {
        CoverageBucket::Good
    } else if coverage_percent >= 40.0 {
        CoverageBucket::Fair
    } else if coverage_percent >= 20.0 {
        CoverageBucket::Poor
    } else {
        CoverageBucket::Critical
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boundaries_go_to_the_upper_bucket() {
        assert_eq!(classify(20.0).name(), "poor");
        assert_eq!(classify(19.999).name(), "critical");
        assert_eq!(classify(100.0).name(), "outstanding");
        assert_eq!(classify(99.999).name(), "excellent");
        assert_eq!(classify(40.0), CoverageBucket::Fair);
        assert_eq!(classify(60.0), CoverageBucket::Good);
        assert_eq!(classify(80.0), CoverageBucket::Excellent);
    }

    #[test]
    fn extremes() {
        assert_eq!(classify(0.0), CoverageBucket::Critical);
        assert_eq!(classify(250.0), CoverageBucket::Outstanding);
        assert_eq!(classify(f64::INFINITY), CoverageBucket::Outstanding);
        assert_eq!(classify(f64::NAN), CoverageBucket::Critical);
    }

    #[test]
    fn colors() {
        assert_eq!(classify(10.0).color(), "#d32f2f");
        assert_eq!(classify(77.5).color(), "#388e3c");
        assert_eq!(classify(77.5).color_name(), "light green");
        assert_eq!(CoverageBucket::Poor.legend(), "orange: 20-39%");
        let mut sorted = CoverageBucket::ALL.to_vec();
        sorted.sort();
        assert_eq!(sorted, CoverageBucket::ALL.to_vec());
    }
}
