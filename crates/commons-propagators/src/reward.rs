//! Reward shaping.
//!
//! Raw rewards are per-agent pickup indicators (`1` if the agent collected
//! an apple this step). Exactly one [`RewardShaper`] mode is active per
//! environment:
//!
//! - **Shared**: every agent receives the total number of pickups.
//! - **Individual**: every agent receives its own pickup scaled by `N`.
//! - **InequityAversion**: scaled rewards penalised by pairwise
//!   disadvantageous (`α`) and advantageous (`β`) gaps, normalised by
//!   `N - 1`, with optional exponential smoothing of the signal.
//! - **Svo**: scaled rewards penalised by the angular distance between
//!   `atan2(mean_others, self)` and an ideal angle, either additively or
//!   (standardised) multiplicatively.
//!
//! Inequity aversion and SVO take optional target subsets; agents outside
//! the subset receive the unshaped signal. Shaping modes are constructed
//! via builders: [`InequityAversion::builder`], [`Svo::builder`].

use std::f32::consts::PI;

use indexmap::IndexMap;

/// Weight of the previous smoothed value in `s = SMOOTHING_DECAY * s + r`.
pub const SMOOTHING_DECAY: f32 = 0.99 * 0.01;

/// Diagnostic key: summed disadvantageous gaps.
pub const DIAG_DISADVANTAGEOUS: &str = "disadvantageous";
/// Diagnostic key: summed advantageous gaps.
pub const DIAG_ADVANTAGEOUS: &str = "advantageous";
/// Diagnostic key: smoothed reward signal.
pub const DIAG_SMOOTH_REWARDS: &str = "smooth_rewards";
/// Diagnostic key: reward angle in radians.
pub const DIAG_SVO_THETA: &str = "svo_theta";

/// Output of [`RewardShaper::shape`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ShapedRewards {
    /// Pre-shaping rewards.
    pub original: Vec<f32>,
    /// Rewards handed to the learner.
    pub shaped: Vec<f32>,
    /// New smoothing state, when the mode smooths.
    pub smooth: Option<Vec<f32>>,
    /// Per-agent side-channel values, keyed by name.
    pub diagnostics: IndexMap<&'static str, Vec<f32>>,
}

/// Reward shaping mode.
#[derive(Clone, Debug, PartialEq)]
pub enum RewardShaper {
    /// Total pickups broadcast to every agent.
    Shared,
    /// Own pickup scaled by the agent count.
    Individual,
    /// Inequity-averse shaping.
    InequityAversion(InequityAversion),
    /// Social-value-orientation shaping.
    Svo(Svo),
}

impl RewardShaper {
    /// Shape this step's pickups.
    ///
    /// `smooth` is the previous smoothing state (one entry per agent); it
    /// is only read by smoothing inequity aversion.
    pub fn shape(&self, pickups: &[bool], smooth: &[f32]) -> ShapedRewards {
        let n = pickups.len();
        let raw: Vec<f32> = pickups.iter().map(|&p| if p { 1.0 } else { 0.0 }).collect();
        let scaled: Vec<f32> = raw.iter().map(|r| r * n as f32).collect();

        match self {
            RewardShaper::Shared => {
                let total: f32 = raw.iter().sum();
                ShapedRewards {
                    shaped: vec![total; n],
                    original: raw,
                    ..ShapedRewards::default()
                }
            }
            RewardShaper::Individual => ShapedRewards {
                original: scaled.clone(),
                shaped: scaled,
                ..ShapedRewards::default()
            },
            RewardShaper::InequityAversion(ia) => ia.shape(scaled, smooth),
            RewardShaper::Svo(svo) => svo.shape(scaled),
        }
    }

    /// Short name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            RewardShaper::Shared => "shared",
            RewardShaper::Individual => "individual",
            RewardShaper::InequityAversion(_) => "inequity_aversion",
            RewardShaper::Svo(s) if s.standardized => "standardized_svo",
            RewardShaper::Svo(_) => "svo",
        }
    }
}

fn target_mask(targets: Option<Vec<usize>>, num_agents: usize) -> Result<Option<Vec<bool>>, String> {
    let Some(targets) = targets else {
        return Ok(None);
    };
    let mut mask = vec![false; num_agents];
    for t in targets {
        if t >= num_agents {
            return Err(format!(
                "target agent {t} out of range for {num_agents} agents"
            ));
        }
        mask[t] = true;
    }
    Ok(Some(mask))
}

#[inline]
fn is_target(mask: &Option<Vec<bool>>, i: usize) -> bool {
    mask.as_ref().is_none_or(|m| m.get(i).copied().unwrap_or(false))
}

// ── InequityAversion ────────────────────────────────────────────

/// Inequity-averse reward shaping.
///
/// `u_i = s_i - (α Σ_j max(s_j - s_i, 0) + β Σ_j max(s_i - s_j, 0)) / (N - 1)`
/// over `j ≠ i`, where `s` is the scaled reward or, with smoothing, the
/// smoothed signal. A step where every `s_i` is zero gives every agent
/// `-(α + β)(N - 1)`.
#[derive(Clone, Debug, PartialEq)]
pub struct InequityAversion {
    alpha: f32,
    beta: f32,
    smoothing: bool,
    targets: Option<Vec<bool>>,
}

/// Builder for [`InequityAversion`].
#[derive(Clone, Debug)]
pub struct InequityAversionBuilder {
    alpha: f32,
    beta: f32,
    smoothing: bool,
    targets: Option<Vec<usize>>,
}

impl InequityAversion {
    /// Create a builder with `α = 5`, `β = 0.05`, no smoothing, all agents.
    pub fn builder() -> InequityAversionBuilder {
        InequityAversionBuilder {
            alpha: 5.0,
            beta: 0.05,
            smoothing: false,
            targets: None,
        }
    }

    /// Weight on disadvantageous gaps.
    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    /// Weight on advantageous gaps.
    pub fn beta(&self) -> f32 {
        self.beta
    }

    /// Whether the signal is smoothed across steps.
    pub fn smoothing(&self) -> bool {
        self.smoothing
    }

    fn shape(&self, scaled: Vec<f32>, smooth: &[f32]) -> ShapedRewards {
        let n = scaled.len();
        let others = n.saturating_sub(1).max(1) as f32;

        let signal: Vec<f32> = if self.smoothing {
            scaled
                .iter()
                .enumerate()
                .map(|(i, r)| SMOOTHING_DECAY * smooth.get(i).copied().unwrap_or(0.0) + r)
                .collect()
        } else {
            scaled.clone()
        };

        let mut dis = vec![0.0f32; n];
        let mut adv = vec![0.0f32; n];
        for i in 0..n {
            for j in 0..n {
                if i == j {
                    continue;
                }
                dis[i] += (signal[j] - signal[i]).max(0.0);
                adv[i] += (signal[i] - signal[j]).max(0.0);
            }
        }

        let all_zero = signal.iter().all(|&s| s == 0.0);
        let penalty = -(self.alpha + self.beta) * others;
        let shaped: Vec<f32> = (0..n)
            .map(|i| {
                if !is_target(&self.targets, i) {
                    signal[i]
                } else if all_zero {
                    penalty
                } else {
                    signal[i] - (self.alpha * dis[i] + self.beta * adv[i]) / others
                }
            })
            .collect();

        let mut diagnostics = IndexMap::new();
        diagnostics.insert(DIAG_DISADVANTAGEOUS, dis);
        diagnostics.insert(DIAG_ADVANTAGEOUS, adv);
        let smooth = self.smoothing.then(|| {
            diagnostics.insert(DIAG_SMOOTH_REWARDS, signal.clone());
            signal
        });

        ShapedRewards {
            original: scaled,
            shaped,
            smooth,
            diagnostics,
        }
    }
}

impl InequityAversionBuilder {
    /// Weight on disadvantageous gaps (default: 5).
    pub fn alpha(mut self, alpha: f32) -> Self {
        self.alpha = alpha;
        self
    }

    /// Weight on advantageous gaps (default: 0.05).
    pub fn beta(mut self, beta: f32) -> Self {
        self.beta = beta;
        self
    }

    /// Enable exponential smoothing of the reward signal (default: off).
    pub fn smoothing(mut self, smoothing: bool) -> Self {
        self.smoothing = smoothing;
        self
    }

    /// Restrict shaping to these agent indices (default: all agents).
    pub fn targets(mut self, targets: Vec<usize>) -> Self {
        self.targets = Some(targets);
        self
    }

    /// Build for `num_agents` agents.
    ///
    /// # Errors
    ///
    /// Returns `Err` if fewer than 2 agents, `alpha`/`beta` are not
    /// finite, or a target index is out of range.
    pub fn build(self, num_agents: usize) -> Result<InequityAversion, String> {
        if num_agents < 2 {
            return Err(format!(
                "inequity aversion needs at least 2 agents, got {num_agents}"
            ));
        }
        if !self.alpha.is_finite() || !self.beta.is_finite() {
            return Err(format!(
                "alpha and beta must be finite, got alpha={} beta={}",
                self.alpha, self.beta
            ));
        }
        Ok(InequityAversion {
            alpha: self.alpha,
            beta: self.beta,
            smoothing: self.smoothing,
            targets: target_mask(self.targets, num_agents)?,
        })
    }
}

// ── Svo ─────────────────────────────────────────────────────────

/// Social-value-orientation reward shaping.
///
/// With `r` the scaled rewards and `m_i` the mean of the others,
/// `θ_i = atan2(m_i, r_i)`. Additive form:
/// `u_i = r_i - N · w · |θ_i - ideal|`. Standardised form wraps `θ` into
/// `[0, 2π)`, takes the shorter angular distance `d` normalised by `π`,
/// and returns `u_i = r_i · (1 - w · d)`.
#[derive(Clone, Debug, PartialEq)]
pub struct Svo {
    w: f32,
    ideal_angle: f32,
    standardized: bool,
    targets: Option<Vec<bool>>,
}

/// Builder for [`Svo`].
#[derive(Clone, Debug)]
pub struct SvoBuilder {
    w: f32,
    ideal_angle_degrees: f32,
    standardized: bool,
    targets: Option<Vec<usize>>,
}

impl Svo {
    /// Create a builder with `w = 0.5`, ideal angle 45°, additive form,
    /// all agents.
    pub fn builder() -> SvoBuilder {
        SvoBuilder {
            w: 0.5,
            ideal_angle_degrees: 45.0,
            standardized: false,
            targets: None,
        }
    }

    /// Penalty weight.
    pub fn w(&self) -> f32 {
        self.w
    }

    /// Ideal angle in radians.
    pub fn ideal_angle(&self) -> f32 {
        self.ideal_angle
    }

    /// Whether the standardised multiplicative form is used.
    pub fn standardized(&self) -> bool {
        self.standardized
    }

    fn shape(&self, scaled: Vec<f32>) -> ShapedRewards {
        let n = scaled.len();
        let others = n.saturating_sub(1).max(1) as f32;
        let total: f32 = scaled.iter().sum();

        let mut thetas = Vec::with_capacity(n);
        let mut shaped = Vec::with_capacity(n);
        for (i, &r) in scaled.iter().enumerate() {
            let mean_others = (total - r) / others;
            let raw_theta = mean_others.atan2(r);
            let (theta, utility) = if self.standardized {
                let theta = (raw_theta + 2.0 * PI) % (2.0 * PI);
                let dev = (theta - self.ideal_angle).abs();
                let dev = dev.min(2.0 * PI - dev) / PI;
                (theta, r * (1.0 - self.w * dev))
            } else {
                let dev = (raw_theta - self.ideal_angle).abs();
                (raw_theta, r - n as f32 * self.w * dev)
            };
            thetas.push(theta);
            shaped.push(if is_target(&self.targets, i) { utility } else { r });
        }

        let mut diagnostics = IndexMap::new();
        diagnostics.insert(DIAG_SVO_THETA, thetas);
        ShapedRewards {
            original: scaled,
            shaped,
            smooth: None,
            diagnostics,
        }
    }
}

impl SvoBuilder {
    /// Penalty weight in `[0, 1]` (default: 0.5).
    pub fn w(mut self, w: f32) -> Self {
        self.w = w;
        self
    }

    /// Ideal angle in degrees: 0 selfish, 45 equal, 90 altruistic
    /// (default: 45).
    pub fn ideal_angle_degrees(mut self, degrees: f32) -> Self {
        self.ideal_angle_degrees = degrees;
        self
    }

    /// Use the standardised multiplicative form (default: additive).
    pub fn standardized(mut self, standardized: bool) -> Self {
        self.standardized = standardized;
        self
    }

    /// Restrict shaping to these agent indices (default: all agents).
    pub fn targets(mut self, targets: Vec<usize>) -> Self {
        self.targets = Some(targets);
        self
    }

    /// Build for `num_agents` agents.
    ///
    /// # Errors
    ///
    /// Returns `Err` if fewer than 2 agents, `w` is outside `[0, 1]`, the
    /// angle is not finite, or a target index is out of range.
    pub fn build(self, num_agents: usize) -> Result<Svo, String> {
        if num_agents < 2 {
            return Err(format!("SVO needs at least 2 agents, got {num_agents}"));
        }
        if !(0.0..=1.0).contains(&self.w) {
            return Err(format!("w must be in [0, 1], got {}", self.w));
        }
        if !self.ideal_angle_degrees.is_finite() {
            return Err(format!(
                "ideal angle must be finite, got {}",
                self.ideal_angle_degrees
            ));
        }
        Ok(Svo {
            w: self.w,
            ideal_angle: self.ideal_angle_degrees.to_radians(),
            standardized: self.standardized,
            targets: target_mask(self.targets, num_agents)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-5
    }

    #[test]
    fn shared_broadcasts_total() {
        let out = RewardShaper::Shared.shape(&[true, false, true, false], &[]);
        assert_eq!(out.original, vec![1.0, 0.0, 1.0, 0.0]);
        assert_eq!(out.shaped, vec![2.0; 4]);
        assert_eq!(out.shaped.iter().sum::<f32>(), 2.0 * 4.0);
        assert!(out.diagnostics.is_empty());
    }

    #[test]
    fn individual_scales_by_agent_count() {
        let out = RewardShaper::Individual.shape(&[false, true, false], &[]);
        assert_eq!(out.shaped, vec![0.0, 3.0, 0.0]);
        assert_eq!(out.original, out.shaped);
    }

    #[test]
    fn inequity_aversion_penalises_gaps() {
        let ia = InequityAversion::builder().build(3).unwrap();
        let out = RewardShaper::InequityAversion(ia).shape(&[true, false, false], &[0.0; 3]);
        assert_eq!(out.original, vec![3.0, 0.0, 0.0]);
        // Leader: advantageous gaps 3 + 3, weighted by beta, over N-1.
        assert!(close(out.shaped[0], 3.0 - 0.05 * 6.0 / 2.0));
        // Followers: one disadvantageous gap of 3, weighted by alpha.
        assert!(close(out.shaped[1], -5.0 * 3.0 / 2.0));
        assert_eq!(out.diagnostics[DIAG_DISADVANTAGEOUS], vec![0.0, 3.0, 3.0]);
        assert_eq!(out.diagnostics[DIAG_ADVANTAGEOUS], vec![6.0, 0.0, 0.0]);
        assert!(out.smooth.is_none());
    }

    #[test]
    fn inequity_aversion_all_zero_penalty() {
        let ia = InequityAversion::builder().alpha(2.0).beta(0.5).build(4).unwrap();
        let out = RewardShaper::InequityAversion(ia).shape(&[false; 4], &[0.0; 4]);
        assert!(out.shaped.iter().all(|&u| close(u, -(2.0 + 0.5) * 3.0)));
    }

    #[test]
    fn inequity_aversion_equal_rewards_unpenalised() {
        let ia = InequityAversion::builder().build(2).unwrap();
        let out = RewardShaper::InequityAversion(ia).shape(&[true, true], &[0.0; 2]);
        assert_eq!(out.shaped, vec![2.0, 2.0]);
    }

    #[test]
    fn smoothing_carries_previous_signal() {
        let ia = InequityAversion::builder().smoothing(true).build(2).unwrap();
        let out = RewardShaper::InequityAversion(ia).shape(&[true, false], &[100.0, 50.0]);
        let smooth = out.smooth.clone().unwrap();
        assert!(close(smooth[0], SMOOTHING_DECAY * 100.0 + 2.0));
        assert!(close(smooth[1], SMOOTHING_DECAY * 50.0));
        assert_eq!(out.diagnostics[DIAG_SMOOTH_REWARDS], smooth);
        // Smoothed signal is nonzero, so no degenerate penalty.
        assert!(out.shaped[0] > 0.0);
    }

    #[test]
    fn inequity_aversion_targets() {
        let ia = InequityAversion::builder().targets(vec![1]).build(3).unwrap();
        let out = RewardShaper::InequityAversion(ia).shape(&[true, false, false], &[0.0; 3]);
        assert_eq!(out.shaped[0], 3.0);
        assert!(close(out.shaped[1], -7.5));
        assert_eq!(out.shaped[2], 0.0);
    }

    #[test]
    fn svo_zero_weight_is_scaled_reward() {
        let svo = Svo::builder().w(0.0).build(4).unwrap();
        let out = RewardShaper::Svo(svo).shape(&[true, false, true, false], &[]);
        assert_eq!(out.shaped, vec![4.0, 0.0, 4.0, 0.0]);
        assert_eq!(out.shaped, out.original);
    }

    #[test]
    fn svo_equal_rewards_hit_ideal_angle() {
        let svo = Svo::builder().w(1.0).build(3).unwrap();
        let out = RewardShaper::Svo(svo).shape(&[true; 3], &[]);
        for (&u, &theta) in out.shaped.iter().zip(&out.diagnostics[DIAG_SVO_THETA]) {
            assert!(close(theta, PI / 4.0));
            assert!(close(u, 3.0));
        }
    }

    #[test]
    fn svo_penalises_selfish_outcome() {
        let svo = Svo::builder().build(2).unwrap();
        let out = RewardShaper::Svo(svo).shape(&[true, false], &[]);
        // Agent 0: theta = atan2(0, 2) = 0, deviation pi/4.
        assert!(close(out.shaped[0], 2.0 - 2.0 * 0.5 * PI / 4.0));
        // Agent 1: theta = atan2(2, 0) = pi/2, deviation pi/4.
        assert!(close(out.shaped[1], -2.0 * 0.5 * PI / 4.0));
    }

    #[test]
    fn svo_targets_leave_others_unshaped() {
        let svo = Svo::builder().w(1.0).targets(vec![0]).build(2).unwrap();
        let out = RewardShaper::Svo(svo).shape(&[false, true], &[]);
        assert_eq!(out.shaped[1], 2.0);
        assert!(out.shaped[0] < 0.0);
    }

    #[test]
    fn standardized_svo_scales_multiplicatively() {
        let svo = Svo::builder().w(1.0).standardized(true).build(3).unwrap();
        let shaper = RewardShaper::Svo(svo);
        assert_eq!(shaper.name(), "standardized_svo");
        let out = shaper.shape(&[true, false, false], &[]);
        // theta = 0, deviation pi/4 normalised to 0.25.
        assert!(close(out.shaped[0], 3.0 * 0.75));
        assert_eq!(out.shaped[1], 0.0);
    }

    #[test]
    fn builders_validate() {
        assert!(Svo::builder().w(1.5).build(3).is_err());
        assert!(Svo::builder().build(1).is_err());
        assert!(Svo::builder().targets(vec![3]).build(3).is_err());
        assert!(InequityAversion::builder().alpha(f32::NAN).build(3).is_err());
        assert!(InequityAversion::builder().targets(vec![0, 2]).build(3).is_ok());
    }
}
