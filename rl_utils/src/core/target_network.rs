//! Soft and hard updates of target variables.
//!
//! For each target variable `v_t` paired with a source variable `v_s`:
//!
//! ```text
//! v_t = (1 - τ) * v_t + τ * v_s
//! ```
//!
//! With τ = 1 this is a hard copy, with τ = 0 nothing changes. Two entry
//! points are provided:
//!
//! - [`soft_variables_update`] over explicit lists of [`NamedVariable`]s,
//!   paired by position or by name.
//! - [`soft_update`] over two Burn modules of the same architecture, paired by
//!   parameter traversal order.
//!
//! [`TargetUpdater`] combines [`soft_update`] with a step counter so a target
//! network is refreshed every `period` training steps.

use burn::module::{Module, ModuleMapper, Param};
use burn::prelude::*;
use serde::{Deserialize, Serialize};

use crate::core::counter::Counter;
use crate::error::{check_unit_interval, Result, UtilsError};

// ============================================================================
// Named variables
// ============================================================================

/// A named tensor variable, stored flattened along with its shape.
///
/// Variables of any rank share one representation so they can be held in the
/// same list.
#[derive(Debug, Clone)]
pub struct NamedVariable<B: Backend> {
    name: String,
    shape: Vec<usize>,
    value: Tensor<B, 1>,
}

impl<B: Backend> NamedVariable<B> {
    /// Wrap a tensor of any rank.
    pub fn new<const D: usize>(name: impl Into<String>, tensor: Tensor<B, D>) -> Self {
        let shape = tensor.dims().to_vec();
        let total: usize = shape.iter().product();
        Self {
            name: name.into(),
            shape,
            value: tensor.reshape([total]),
        }
    }

    /// Variable name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Original shape.
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Flattened value.
    pub fn flat(&self) -> Tensor<B, 1> {
        self.value.clone()
    }

    /// Value reshaped to its original rank `D`.
    pub fn value<const D: usize>(&self) -> Result<Tensor<B, D>> {
        if self.shape.len() != D {
            return Err(UtilsError::invalid(
                "rank",
                format!(
                    "variable '{}' has rank {}, requested {}",
                    self.name,
                    self.shape.len(),
                    D
                ),
            ));
        }
        let mut dims = [0usize; D];
        dims.copy_from_slice(&self.shape);
        Ok(self.value.clone().reshape(dims))
    }

    /// Overwrite the value. The new tensor must have the same shape.
    pub fn assign<const D: usize>(&mut self, tensor: Tensor<B, D>) -> Result<()> {
        let dims = tensor.dims();
        if dims.as_slice() != self.shape.as_slice() {
            return Err(UtilsError::shape(
                format!("variable '{}'", self.name),
                &self.shape,
                &dims,
            ));
        }
        let total: usize = self.shape.iter().product();
        self.value = tensor.reshape([total]);
        Ok(())
    }
}

/// Soft/hard update of target variables from source variables.
///
/// Pairs are formed by position after optionally sorting both lists by name;
/// the shorter list bounds the pairing. Every pair is shape-checked before any
/// target is touched, so a mismatch leaves all targets unchanged.
///
/// Returns the number of target variables updated.
///
/// # Errors
///
/// `InvalidArgument` when `tau` is not in `[0, 1]`, `ShapeMismatch` when a
/// pair has incompatible shapes.
pub fn soft_variables_update<B: Backend>(
    source_variables: &[NamedVariable<B>],
    target_variables: &mut [NamedVariable<B>],
    tau: f32,
    sort_variables_by_name: bool,
) -> Result<usize> {
    check_unit_interval("tau", tau)?;

    if tau == 0.0 || source_variables.is_empty() || target_variables.is_empty() {
        return Ok(0);
    }

    let mut source_order: Vec<usize> = (0..source_variables.len()).collect();
    let mut target_order: Vec<usize> = (0..target_variables.len()).collect();
    if sort_variables_by_name {
        source_order.sort_by(|&a, &b| source_variables[a].name.cmp(&source_variables[b].name));
        target_order.sort_by(|&a, &b| target_variables[a].name.cmp(&target_variables[b].name));
    }

    let pairs: Vec<(usize, usize)> = source_order.into_iter().zip(target_order).collect();

    for &(s, t) in &pairs {
        let (v_s, v_t) = (&source_variables[s], &target_variables[t]);
        if v_s.shape != v_t.shape {
            return Err(UtilsError::shape(
                format!("variables '{}' -> '{}'", v_s.name, v_t.name),
                &v_t.shape,
                &v_s.shape,
            ));
        }
    }

    for &(s, t) in &pairs {
        let source = source_variables[s].value.clone();
        let target = &mut target_variables[t];
        target.value = if tau == 1.0 {
            source
        } else {
            target.value.clone().mul_scalar(1.0 - tau) + source.mul_scalar(tau)
        };
    }

    log::debug!("soft_variables_update: updated {} variables (tau={})", pairs.len(), tau);
    Ok(pairs.len())
}

// ============================================================================
// Module soft updates via ModuleMapper
// ============================================================================

/// Collects every float parameter of a module, flattened, in traversal order.
struct ParamExtractor<B: Backend> {
    params: Vec<(Vec<usize>, Tensor<B, 1>)>,
}

impl<B: Backend> ModuleMapper<B> for ParamExtractor<B> {
    fn map_float<const D: usize>(&mut self, param: Param<Tensor<B, D>>) -> Param<Tensor<B, D>> {
        let val = param.val();
        let shape = val.dims().to_vec();
        let total: usize = shape.iter().product();
        self.params.push((shape, val.reshape([total])));
        param
    }
}

fn extract_params<B: Backend, M: Module<B>>(module: &M) -> Vec<(Vec<usize>, Tensor<B, 1>)> {
    let mut extractor = ParamExtractor { params: Vec::new() };
    let _ = module.clone().map(&mut extractor);
    extractor.params
}

/// Interpolates target parameters towards the matching online parameter.
struct SoftUpdateMapper<B: Backend> {
    online_params: Vec<(Vec<usize>, Tensor<B, 1>)>,
    tau: f32,
    index: usize,
}

impl<B: Backend> ModuleMapper<B> for SoftUpdateMapper<B> {
    fn map_float<const D: usize>(&mut self, param: Param<Tensor<B, D>>) -> Param<Tensor<B, D>> {
        let idx = self.index;
        self.index += 1;

        let Some((_, online)) = self.online_params.get(idx) else {
            return param;
        };

        let target_val = param.val();
        let shape = target_val.dims();
        let total: usize = shape.iter().product();

        let interpolated = online.clone().mul_scalar(self.tau)
            + target_val.reshape([total]).mul_scalar(1.0 - self.tau);

        Param::initialized(param.id.clone(), interpolated.reshape(shape))
    }
}

/// Soft update (Polyak averaging) of a target module towards an online module.
///
/// Parameters are matched by traversal order, so both modules must share the
/// same architecture. Parameter count and every shape are checked first.
///
/// # Errors
///
/// `InvalidArgument` when `tau` is not in `[0, 1]`, `ShapeMismatch` when the
/// architectures differ.
pub fn soft_update<B, M>(online: &M, target: M, tau: f32) -> Result<M>
where
    B: Backend,
    M: Module<B>,
{
    check_unit_interval("tau", tau)?;

    let online_params = extract_params(online);
    let target_params = extract_params(&target);

    if online_params.len() != target_params.len() {
        return Err(UtilsError::shape(
            "module parameter count",
            &[target_params.len()],
            &[online_params.len()],
        ));
    }
    for (i, ((online_shape, _), (target_shape, _))) in
        online_params.iter().zip(&target_params).enumerate()
    {
        if online_shape != target_shape {
            return Err(UtilsError::shape(
                format!("module parameter #{}", i),
                target_shape,
                online_shape,
            ));
        }
    }

    if tau == 0.0 {
        return Ok(target);
    }
    if tau == 1.0 {
        return Ok(hard_copy::<B, M>(online));
    }

    let mut updater = SoftUpdateMapper {
        online_params,
        tau,
        index: 0,
    };
    Ok(target.map(&mut updater))
}

/// Hard copy of module weights (τ = 1).
pub fn hard_copy<B, M>(online: &M) -> M
where
    B: Backend,
    M: Module<B>,
{
    online.clone()
}

// ============================================================================
// Periodic target updates
// ============================================================================

/// Configuration for [`TargetUpdater`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetUpdaterConfig {
    /// Interpolation coefficient in `[0, 1]`. 1.0 is a hard update.
    pub tau: f32,
    /// Update every `period` calls (1 = every call).
    pub period: u64,
}

impl Default for TargetUpdaterConfig {
    fn default() -> Self {
        Self { tau: 1.0, period: 1 }
    }
}

impl TargetUpdaterConfig {
    /// Soft updates on every call.
    pub fn soft(tau: f32) -> Self {
        Self { tau, period: 1 }
    }

    /// Hard copies every `period` calls.
    pub fn hard(period: u64) -> Self {
        Self { tau: 1.0, period }
    }

    /// Set tau.
    pub fn with_tau(mut self, tau: f32) -> Self {
        self.tau = tau;
        self
    }

    /// Set the update period.
    pub fn with_period(mut self, period: u64) -> Self {
        self.period = period;
        self
    }
}

/// Refreshes a target module every `period` calls.
///
/// The step counter is atomic, so `maybe_update` takes `&self`.
#[derive(Debug)]
pub struct TargetUpdater {
    config: TargetUpdaterConfig,
    counter: Counter,
}

impl TargetUpdater {
    /// Validate the config and create an updater.
    pub fn new(config: TargetUpdaterConfig) -> Result<Self> {
        check_unit_interval("tau", config.tau)?;
        if config.period == 0 {
            return Err(UtilsError::invalid("period", "must be positive"));
        }
        Ok(Self {
            config,
            counter: Counter::new("target_update/counter", 0),
        })
    }

    /// Count one call and update `target` when the count hits the period.
    pub fn maybe_update<B, M>(&self, online: &M, target: M) -> Result<M>
    where
        B: Backend,
        M: Module<B>,
    {
        let step = self.counter.increment();
        if step % self.config.period as i64 == 0 {
            soft_update::<B, M>(online, target, self.config.tau)
        } else {
            Ok(target)
        }
    }

    /// Number of calls so far.
    pub fn steps(&self) -> i64 {
        self.counter.current()
    }

    /// Configuration.
    pub fn config(&self) -> &TargetUpdaterConfig {
        &self.config
    }
}
