//! Per-run statistics and their CSV row.

use std::fmt;
use std::time::{Duration, Instant};

/// Column header matching [`RunStats::csv_row`].
pub const CSV_HEADER: &str = "run,variant,best_value,nodes,elapsed,max_depth,avg_depth,optimal";

/// Aggregate of one search invocation.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RunStats {
    /// Run index within an experiment.
    pub run_id: usize,

    /// Variant label, e.g. `depth_k_bb`.
    pub variant: String,

    /// Final incumbent (`+inf` if none was found).
    pub best_value: f64,

    /// Nodes visited (dive iterations plus B&B nodes).
    pub nodes_visited: u64,

    /// Sum of the depths of all visited nodes.
    pub depth_sum: u64,

    /// Deepest node visited.
    pub max_depth: usize,

    /// `depth_sum / nodes_visited`, 0 when nothing was visited.
    pub avg_depth: f64,

    /// Wall time of the run.
    pub elapsed: Duration,

    /// Variant-specific success flag.
    pub reached_optimum: bool,
}

impl RunStats {
    /// One CSV line (without trailing newline) in [`CSV_HEADER`] order.
    ///
    /// ```
    /// use u_fdive::stats::RunStats;
    /// use std::time::Duration;
    ///
    /// let stats = RunStats {
    ///     run_id: 2,
    ///     variant: "vol_k".into(),
    ///     best_value: 1.5,
    ///     nodes_visited: 10,
    ///     depth_sum: 45,
    ///     max_depth: 9,
    ///     avg_depth: 4.5,
    ///     elapsed: Duration::from_millis(250),
    ///     reached_optimum: true,
    /// };
    /// assert_eq!(stats.csv_row(), "2,vol_k,1.5,10,0.25,9,4.5,1");
    /// ```
    pub fn csv_row(&self) -> String {
        format!(
            "{},{},{},{},{},{},{},{}",
            self.run_id,
            self.variant,
            self.best_value,
            self.nodes_visited,
            self.elapsed.as_secs_f64(),
            self.max_depth,
            self.avg_depth,
            u8::from(self.reached_optimum)
        )
    }
}

impl fmt::Display for RunStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Run {} ({}):", self.run_id, self.variant)?;
        writeln!(f, "  Best value:     {}", self.best_value)?;
        writeln!(f, "  Nodes visited:  {}", self.nodes_visited)?;
        writeln!(f, "  Max depth:      {}", self.max_depth)?;
        writeln!(f, "  Avg depth:      {:.3}", self.avg_depth)?;
        writeln!(f, "  Reached optimum:{}", self.reached_optimum)?;
        writeln!(f, "  Elapsed:        {:.2?}", self.elapsed)?;
        Ok(())
    }
}

/// Accumulates node visits while a runner is active.
#[derive(Debug, Clone)]
pub(crate) struct StatsRecorder {
    started: Instant,
    nodes: u64,
    depth_sum: u64,
    max_depth: usize,
}

impl StatsRecorder {
    pub(crate) fn start() -> Self {
        Self {
            started: Instant::now(),
            nodes: 0,
            depth_sum: 0,
            max_depth: 0,
        }
    }

    #[inline]
    pub(crate) fn visit(&mut self, depth: usize) {
        self.nodes = self.nodes.saturating_add(1);
        self.depth_sum = self.depth_sum.saturating_add(depth as u64);
        self.max_depth = self.max_depth.max(depth);
    }

    /// Folds a dive that started at a node already counted through
    /// [`visit`](Self::visit) at `root_depth`.
    ///
    /// The dive's first iteration re-visits that node, so one node and
    /// its depth are removed from the dive's totals before adding them.
    pub(crate) fn absorb_dive(&mut self, dive: &RunStats, root_depth: usize) {
        if dive.nodes_visited == 0 {
            return;
        }
        self.nodes = self.nodes.saturating_add(dive.nodes_visited - 1);
        self.depth_sum = self
            .depth_sum
            .saturating_add(dive.depth_sum.saturating_sub(root_depth as u64));
        self.max_depth = self.max_depth.max(dive.max_depth);
    }

    #[inline]
    pub(crate) fn nodes(&self) -> u64 {
        self.nodes
    }

    pub(crate) fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    pub(crate) fn finish(
        &self,
        run_id: usize,
        variant: impl Into<String>,
        best_value: f64,
        reached_optimum: bool,
    ) -> RunStats {
        let avg_depth = if self.nodes > 0 {
            self.depth_sum as f64 / self.nodes as f64
        } else {
            0.0
        };
        RunStats {
            run_id,
            variant: variant.into(),
            best_value,
            nodes_visited: self.nodes,
            depth_sum: self.depth_sum,
            max_depth: self.max_depth,
            avg_depth,
            elapsed: self.elapsed(),
            reached_optimum,
        }
    }
}
