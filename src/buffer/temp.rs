//! Temperature-biased priority buffer.

use super::config::BufferConfig;
use super::heap::{Entry, LazyHeap};
use crate::error::FdError;
use crate::node::Node;
use crate::random::{deterministic_noise, jitter};
use tracing::trace;

const DEPTH_CUT_SALT: u64 = 0x4444_4444;
const VOL_CUT_SALT: u64 = 0x3333_3333;
const TIE_SALT: u64 = 0x2222_2222;

/// Diagnostic counters gathered on [`TempBuffer::push`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TriggerCounts {
    /// Pushes that met either cutoff.
    pub total: usize,
    /// Pushes at or beyond the (jittered) depth cut.
    pub depth: usize,
    /// Pushes at or below the (jittered) volume ratio cut.
    pub volume: usize,
    /// Volume ratios evaluated.
    pub volume_evals: usize,
    /// Volume evaluations skipped because the volume or reference was unusable.
    pub volume_nonfinite: usize,
}

#[derive(Debug, Clone)]
struct Item {
    node: Node,
    lb: f64,
    seq: u64,
}

fn is_live(slots: &[Option<Item>], entry: &Entry) -> bool {
    matches!(slots.get(entry.slot), Some(Some(item)) if item.seq == entry.seq)
}

/// Best-first node buffer with a thermal tie-break.
///
/// Nodes leave in increasing score order, where the score is the node's
/// objective lower bound plus a small bias that favours hotter nodes. A
/// second heap keyed by the raw lower bound makes [`minimum`](Self::minimum)
/// exact and independent of the bias.
///
/// Both heaps are pruned lazily: removing a node only clears its slot,
/// and stale heap entries are dropped when they reach the top. After every
/// mutation the tops of both heaps refer to live nodes.
///
/// # Examples
///
/// ```
/// use u_fdive::buffer::{BufferConfig, TempBuffer};
/// use u_fdive::interval::{Interval, IntervalBox};
/// use u_fdive::node::Node;
///
/// let mut buffer = TempBuffer::new(BufferConfig::default()).unwrap();
/// for lb in [3.0, 1.0, 2.0] {
///     let mut node = Node::new(IntervalBox::cube(1, 0.0, 1.0), 1, 1.0);
///     node.goal_bounds = Some(Interval::new(lb, lb + 1.0));
///     buffer.push(node);
/// }
/// assert_eq!(buffer.minimum(), 1.0);
///
/// buffer.contract(2.5);
/// assert_eq!(buffer.len(), 2);
/// assert_eq!(buffer.pop().map(|n| n.lower_bound()), Some(1.0));
/// assert_eq!(buffer.minimum(), 2.0);
/// ```
#[derive(Debug, Clone)]
pub struct TempBuffer {
    config: BufferConfig,
    slots: Vec<Option<Item>>,
    free: Vec<usize>,
    score_heap: LazyHeap,
    lb_heap: LazyHeap,
    live: usize,
    next_seq: u64,
    loup: f64,
    triggers: TriggerCounts,
    rejected: usize,
}

impl TempBuffer {
    /// Creates an empty buffer.
    pub fn new(config: BufferConfig) -> Result<Self, FdError> {
        config.validate()?;
        Ok(Self {
            config,
            slots: Vec::new(),
            free: Vec::new(),
            score_heap: LazyHeap::default(),
            lb_heap: LazyHeap::default(),
            live: 0,
            next_seq: 0,
            loup: f64::INFINITY,
            triggers: TriggerCounts::default(),
            rejected: 0,
        })
    }

    pub fn config(&self) -> &BufferConfig {
        &self.config
    }

    /// Number of live nodes.
    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Smallest incumbent passed to [`contract`](Self::contract) since the
    /// last flush.
    pub fn loup(&self) -> f64 {
        self.loup
    }

    pub fn triggers(&self) -> TriggerCounts {
        self.triggers
    }

    /// Pushes refused because their lower bound already exceeded the incumbent.
    pub fn rejected(&self) -> usize {
        self.rejected
    }

    /// Temperature used for scoring: the node's own when positive and
    /// finite, otherwise `T0 * (k_eff / 2)^depth`.
    pub fn effective_temperature(&self, node: &Node) -> f64 {
        let t = node.temperature;
        if t.is_finite() && t > 0.0 {
            return t;
        }
        let mut k_eff = self.config.k;
        if self.config.rand_k {
            k_eff *= deterministic_noise(self.config.seed, node.depth as u64);
        }
        self.config.initial_temperature * (k_eff / 2.0).powf(node.depth as f64)
    }

    /// Ordering key of `node`; lower leaves first.
    ///
    /// The bound term is the cached lower bound, or the upper bound when
    /// the lower one is not finite, or `+inf` when neither is known.
    pub fn score(&self, node: &Node) -> f64 {
        let bound = match node.goal_bounds {
            Some(g) if !g.is_empty() && g.lo().is_finite() => g.lo(),
            Some(g) if !g.is_empty() && g.hi().is_finite() => g.hi(),
            _ => f64::INFINITY,
        };
        let t = self.effective_temperature(node);
        let mut score = bound + self.config.bias / (1.0 + t);
        if self.config.tie_noise > 0.0 {
            let noise = deterministic_noise(self.config.seed ^ TIE_SALT, node.depth as u64);
            score += self.config.tie_noise * noise;
        }
        score
    }

    /// Inserts a node. Returns `false` (and drops the node) if its lower
    /// bound already exceeds the incumbent given to the last
    /// [`contract`](Self::contract).
    pub fn push(&mut self, node: Node) -> bool {
        let lb = node.lower_bound();
        if lb > self.loup {
            self.rejected += 1;
            trace!(depth = node.depth, lb, loup = self.loup, "push rejected");
            return false;
        }
        self.record_triggers(&node);

        let score = self.score(&node);
        let seq = self.next_seq;
        self.next_seq += 1;
        let item = Item { node, lb, seq };
        let slot = match self.free.pop() {
            Some(slot) => {
                self.slots[slot] = Some(item);
                slot
            }
            None => {
                self.slots.push(Some(item));
                self.slots.len() - 1
            }
        };
        self.score_heap.push(Entry { key: score, seq, slot });
        self.lb_heap.push(Entry { key: lb, seq, slot });
        self.live += 1;
        true
    }

    /// Removes and returns the best-scoring live node.
    pub fn pop(&mut self) -> Option<Node> {
        while let Some(entry) = self.score_heap.pop() {
            if !is_live(&self.slots, &entry) {
                continue;
            }
            let item = self.slots[entry.slot].take()?;
            self.free.push(entry.slot);
            self.live -= 1;
            self.settle();
            return Some(item.node);
        }
        None
    }

    /// The node [`pop`](Self::pop) would return.
    pub fn top(&self) -> Option<&Node> {
        let entry = self.score_heap.peek()?;
        self.slots
            .get(entry.slot)?
            .as_ref()
            .filter(|item| item.seq == entry.seq)
            .map(|item| &item.node)
    }

    /// Smallest lower bound among live nodes, `+inf` when empty.
    ///
    /// Nodes without a cached bound count as `-inf`.
    pub fn minimum(&self) -> f64 {
        self.lb_heap.peek().map_or(f64::INFINITY, |e| e.key)
    }

    /// Drops every node whose lower bound exceeds `loup`.
    ///
    /// A `loup` that is NaN or not below the current one changes nothing.
    pub fn contract(&mut self, loup: f64) {
        if loup.is_nan() || loup >= self.loup {
            return;
        }
        self.loup = loup;
        let mut removed = 0usize;
        for (i, slot) in self.slots.iter_mut().enumerate() {
            if matches!(slot, Some(item) if item.lb > loup) {
                *slot = None;
                self.free.push(i);
                removed += 1;
            }
        }
        if removed > 0 {
            self.live -= removed;
            let slots = &self.slots;
            self.score_heap.compact(|e| is_live(slots, e));
            self.lb_heap.compact(|e| is_live(slots, e));
            trace!(loup, removed, remaining = self.live, "buffer contracted");
        }
    }

    /// Empties the buffer and forgets the incumbent. Trigger counters are kept.
    pub fn flush(&mut self) {
        self.slots.clear();
        self.free.clear();
        self.score_heap.clear();
        self.lb_heap.clear();
        self.live = 0;
        self.loup = f64::INFINITY;
    }

    fn settle(&mut self) {
        let slots = &self.slots;
        self.score_heap.settle(|e| is_live(slots, e));
        self.lb_heap.settle(|e| is_live(slots, e));
        if self.lb_heap.len() > 2 * self.live + 64 {
            self.lb_heap.compact(|e| is_live(slots, e));
        }
    }

    fn record_triggers(&mut self, node: &Node) {
        if node.depth == 0 {
            return;
        }
        let cfg = &self.config;
        let depth = node.depth as u64;

        let mut depth_limit = cfg.depth_cut;
        if depth_limit > 0 && cfg.depth_cut_jitter > 0.0 {
            let jd = jitter(
                depth_limit as f64,
                cfg.depth_cut_jitter,
                cfg.seed ^ DEPTH_CUT_SALT,
                depth,
            );
            depth_limit = jd.round().max(1.0) as usize;
        }
        let depth_trigger = depth_limit > 0 && node.depth >= depth_limit;

        let mut vol_trigger = false;
        if cfg.vol_ratio_cut > 0.0 && !node.bbox.is_unbounded() {
            self.triggers.volume_evals += 1;
            let log_v = node.bbox.log_volume();
            let reference = cfg.reference_volume;
            if log_v.is_nan() || !reference.is_finite() || reference <= 0.0 {
                self.triggers.volume_nonfinite += 1;
            } else {
                let vr = jitter(
                    cfg.vol_ratio_cut,
                    cfg.vol_cut_jitter,
                    cfg.seed ^ VOL_CUT_SALT,
                    depth,
                );
                vol_trigger = log_v <= vr.ln() + reference.ln();
            }
        }

        if depth_trigger {
            self.triggers.depth += 1;
        }
        if vol_trigger {
            self.triggers.volume += 1;
        }
        if depth_trigger || vol_trigger {
            self.triggers.total += 1;
            trace!(
                depth = node.depth,
                depth_limit,
                depth_trigger,
                vol_trigger,
                "buffer trigger"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interval::{Interval, IntervalBox};
    use proptest::prelude::*;

    fn node(lb: Option<f64>, depth: usize, temperature: f64) -> Node {
        let mut n = Node::new(IntervalBox::cube(1, 0.0, 1.0), depth, temperature);
        n.goal_bounds = lb.map(|l| Interval::new(l, l + 1.0));
        n
    }

    fn buffer() -> TempBuffer {
        TempBuffer::new(BufferConfig::default()).unwrap()
    }

    #[test]
    fn test_pops_by_lower_bound() {
        let mut b = buffer();
        for lb in [3.0, 1.0, 2.0] {
            assert!(b.push(node(Some(lb), 1, 1.0)));
        }
        let order: Vec<f64> = std::iter::from_fn(|| b.pop())
            .map(|n| n.lower_bound())
            .collect();
        assert_eq!(order, vec![1.0, 2.0, 3.0]);
        assert!(b.is_empty());
        assert_eq!(b.minimum(), f64::INFINITY);
    }

    #[test]
    fn test_hotter_node_wins_tie() {
        let mut b = buffer();
        b.push(node(Some(1.0), 1, 0.5));
        b.push(node(Some(1.0), 2, 10.0));
        assert_eq!(b.top().map(|n| n.depth), Some(2));
        assert_eq!(b.pop().map(|n| n.depth), Some(2));
    }

    #[test]
    fn test_minimum_ignores_bias() {
        let mut b = TempBuffer::new(BufferConfig::default().with_bias(100.0)).unwrap();
        b.push(node(Some(1.0), 1, 1e-9));
        b.push(node(Some(2.0), 2, 1e6));
        // the bias puts the lb=2 node first, but the reported bound stays 1
        assert_eq!(b.top().map(|n| n.depth), Some(2));
        assert_eq!(b.minimum(), 1.0);
        b.pop();
        assert_eq!(b.minimum(), 1.0);
        b.pop();
        assert_eq!(b.minimum(), f64::INFINITY);
    }

    #[test]
    fn test_unknown_bound_counts_as_minus_infinity() {
        let mut b = buffer();
        b.push(node(None, 1, 1.0));
        b.push(node(Some(2.0), 2, 1.0));
        assert_eq!(b.minimum(), f64::NEG_INFINITY);
        // unknown bound scores +inf, so it leaves last
        assert_eq!(b.pop().map(|n| n.depth), Some(2));
        assert_eq!(b.minimum(), f64::NEG_INFINITY);
        assert_eq!(b.pop().map(|n| n.depth), Some(1));
        assert!(b.pop().is_none());
    }

    #[test]
    fn test_contract_drops_and_rejects() {
        let mut b = buffer();
        for lb in 1..=5 {
            b.push(node(Some(lb as f64), lb, 1.0));
        }
        b.contract(3.0);
        assert_eq!(b.len(), 3);
        assert_eq!(b.loup(), 3.0);
        assert_eq!(b.minimum(), 1.0);

        assert!(!b.push(node(Some(4.0), 9, 1.0)));
        assert_eq!(b.rejected(), 1);
        assert!(b.push(node(Some(3.0), 9, 1.0)));

        while let Some(n) = b.pop() {
            assert!(n.lower_bound() <= 3.0);
        }
    }

    #[test]
    fn test_contract_with_worse_loup_is_noop() {
        let mut b = buffer();
        b.push(node(Some(1.0), 1, 1.0));
        b.contract(0.5);
        assert!(b.is_empty());
        b.contract(10.0);
        assert_eq!(b.loup(), 0.5);
        b.contract(f64::NAN);
        assert_eq!(b.loup(), 0.5);
    }

    #[test]
    fn test_slots_reused() {
        let mut b = buffer();
        for round in 0..10 {
            b.push(node(Some(round as f64), 1, 1.0));
            b.pop();
        }
        assert!(b.slots.len() <= 1);
    }

    #[test]
    fn test_rebuilt_temperature() {
        let b = buffer();
        let n = node(Some(0.0), 2, 0.0);
        // 100 * (10 / 2)^2
        assert!((b.effective_temperature(&n) - 2500.0).abs() < 1e-9);
        assert!((b.score(&n) - 1e-3 / 2501.0).abs() < 1e-15);
        // own temperature wins when positive
        assert_eq!(b.effective_temperature(&node(Some(0.0), 2, 3.0)), 3.0);
    }

    #[test]
    fn test_rand_k_changes_rebuilt_temperature() {
        let plain = buffer();
        let noisy =
            TempBuffer::new(BufferConfig::default().with_rand_k(true).with_seed(7)).unwrap();
        let n = node(Some(0.0), 3, 0.0);
        assert_ne!(plain.effective_temperature(&n), noisy.effective_temperature(&n));
    }

    #[test]
    fn test_tie_noise_only_moves_score() {
        let b = TempBuffer::new(BufferConfig::default().with_tie_noise(0.5)).unwrap();
        let n = node(Some(1.0), 4, 1.0);
        let s = b.score(&n);
        assert!(s > 1.0 + 0.25 && s < 1.0 + 0.75 + 1e-3);
        assert_eq!(n.lower_bound(), 1.0);
    }

    #[test]
    fn test_depth_triggers() {
        let mut b = TempBuffer::new(BufferConfig::default().with_depth_cut(3)).unwrap();
        for depth in [0, 3, 5, 1] {
            b.push(node(Some(1.0), depth, 1.0));
        }
        let t = b.triggers();
        assert_eq!(t.depth, 2);
        assert_eq!(t.volume, 0);
        assert_eq!(t.total, 2);
    }

    #[test]
    fn test_volume_triggers() {
        let config = BufferConfig::default()
            .with_vol_ratio_cut(0.25)
            .with_reference_volume(1.0);
        let mut b = TempBuffer::new(config).unwrap();
        let mut big = Node::new(IntervalBox::from_bounds(&[(0.0, 1.0), (0.0, 0.5)]), 1, 1.0);
        big.goal_bounds = Some(Interval::new(0.0, 1.0));
        let small = Node::new(IntervalBox::from_bounds(&[(0.0, 0.5), (0.0, 0.25)]), 2, 1.0);
        let unbounded = Node::new(
            IntervalBox::from_bounds(&[(0.0, f64::INFINITY), (0.0, 1.0)]),
            1,
            1.0,
        );
        b.push(big);
        b.push(small);
        b.push(unbounded);
        let t = b.triggers();
        assert_eq!(t.volume, 1);
        assert_eq!(t.volume_evals, 2);
        assert_eq!(t.volume_nonfinite, 0);
        assert_eq!(t.total, 1);
    }

    #[test]
    fn test_jittered_depth_cut_is_deterministic() {
        let config = BufferConfig::default()
            .with_depth_cut(5)
            .with_depth_cut_jitter(0.8)
            .with_seed(11);
        let run = || {
            let mut b = TempBuffer::new(config.clone()).unwrap();
            for depth in 1..12 {
                b.push(node(Some(0.0), depth, 1.0));
            }
            b.triggers()
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn test_flush() {
        let mut b = buffer();
        b.push(node(Some(1.0), 1, 1.0));
        b.contract(2.0);
        b.flush();
        assert!(b.is_empty());
        assert_eq!(b.loup(), f64::INFINITY);
        assert!(b.top().is_none());
        assert!(b.push(node(Some(5.0), 1, 1.0)));
    }

    #[test]
    fn test_invalid_config() {
        assert!(TempBuffer::new(BufferConfig::default().with_bias(-1.0)).is_err());
    }

    #[derive(Debug, Clone)]
    enum Op {
        Push(Option<i32>),
        Pop,
        Contract(i32),
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            3 => prop::option::of(-50i32..50).prop_map(Op::Push),
            2 => Just(Op::Pop),
            1 => (-50i32..50).prop_map(Op::Contract),
        ]
    }

    proptest! {
        #[test]
        fn prop_buffer_matches_brute_force(ops in prop::collection::vec(op(), 0..120)) {
            let mut b = buffer();
            // (id, lb, score bound)
            let mut model: Vec<(usize, f64, f64)> = Vec::new();
            let mut loup = f64::INFINITY;

            for (id, op) in ops.into_iter().enumerate() {
                match op {
                    Op::Push(lb) => {
                        let lb_f = lb.map_or(f64::NEG_INFINITY, f64::from);
                        let accepted = b.push(node(lb.map(f64::from), id, 1.0));
                        prop_assert_eq!(accepted, lb_f <= loup);
                        if accepted {
                            model.push((id, lb_f, lb.map_or(f64::INFINITY, f64::from)));
                        }
                    }
                    Op::Pop => {
                        let expected = model
                            .iter()
                            .enumerate()
                            .min_by(|(_, a), (_, c)| a.2.total_cmp(&c.2).then(a.0.cmp(&c.0)))
                            .map(|(i, _)| i);
                        let got = b.pop();
                        match expected {
                            Some(i) => {
                                let (mid, mlb, _) = model.remove(i);
                                let got = got.expect("model has a node");
                                prop_assert_eq!(got.depth, mid);
                                prop_assert!(mlb <= loup);
                            }
                            None => prop_assert!(got.is_none()),
                        }
                    }
                    Op::Contract(v) => {
                        let v = f64::from(v);
                        b.contract(v);
                        if v < loup {
                            loup = v;
                            model.retain(|m| m.1 <= loup);
                        }
                    }
                }

                let expected_min = model.iter().map(|m| m.1).fold(f64::INFINITY, f64::min);
                prop_assert_eq!(b.len(), model.len());
                prop_assert_eq!(b.minimum(), expected_min);
            }
        }
    }
}
