//! Progress reporting for decimation runs

/// Snapshot of a decimation run, sent once per iteration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusReport {
    pub iteration: usize,
    pub original_triangle_count: usize,
    pub current_triangle_count: usize,
    /// `None` for lossless runs
    pub target_triangle_count: Option<usize>,
}

impl StatusReport {
    /// Number of triangles removed so far
    pub fn removed_triangle_count(&self) -> usize {
        self.original_triangle_count.saturating_sub(self.current_triangle_count)
    }
}

/// Receiver for status reports
pub type StatusCallback = Box<dyn FnMut(&StatusReport) + Send>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_removed_count() {
        let report = StatusReport {
            iteration: 3,
            original_triangle_count: 100,
            current_triangle_count: 60,
            target_triangle_count: Some(50),
        };
        assert_eq!(report.removed_triangle_count(), 40);
    }
}
