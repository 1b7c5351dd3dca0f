use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicU32, Ordering},
        Arc, PoisonError, RwLock,
    },
};

use atomic_float::AtomicF32;
use tracing::{debug, warn};

use super::{node::ControlNode, Control};
use crate::synth::SynthError;

/// Lock-free value cell shared between writers (UI or network threads) and
/// the render context.
///
/// Every write bumps a sequence number. The control graph compares it with the
/// last sequence it saw, so any number of writes between two control ticks
/// show up as exactly one trigger carrying the last written value.
#[derive(Debug)]
pub(crate) struct ControlCell {
    value: AtomicF32,
    sequence: AtomicU32,
}

impl ControlCell {
    pub(crate) fn new(value: f32) -> Self {
        Self {
            value: AtomicF32::new(value),
            sequence: AtomicU32::new(0),
        }
    }

    pub(crate) fn write(&self, value: f32) {
        self.value.store(value, Ordering::Relaxed);
        self.sequence.fetch_add(1, Ordering::Release);
    }

    #[inline]
    pub(crate) fn load(&self) -> (f32, u32) {
        let sequence = self.sequence.load(Ordering::Acquire);
        (self.value.load(Ordering::Relaxed), sequence)
    }

    pub(crate) fn value(&self) -> f32 {
        self.value.load(Ordering::Relaxed)
    }
}

/// Default value and accepted range of a parameter. Writes are clamped into
/// `[min, max]`.
///
/// Bounds are normalised on construction and again on registration: a NaN
/// bound is unbounded on that side and inverted bounds are swapped.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParameterSpec {
    default: f32,
    min: f32,
    max: f32,
}

impl Default for ParameterSpec {
    fn default() -> Self {
        Self {
            default: 0.0,
            min: f32::NEG_INFINITY,
            max: f32::INFINITY,
        }
    }
}

impl ParameterSpec {
    pub fn new(default: f32) -> Self {
        Self {
            default,
            ..Self::default()
        }
    }

    pub fn range(mut self, min: f32, max: f32) -> Self {
        self.min = min;
        self.max = max;
        self.normalized()
    }

    pub fn default_value(&self) -> f32 {
        self.default
    }

    pub fn min(&self) -> f32 {
        self.min
    }

    pub fn max(&self) -> f32 {
        self.max
    }

    fn normalized(mut self) -> Self {
        if self.min.is_nan() {
            self.min = f32::NEG_INFINITY;
        }
        if self.max.is_nan() {
            self.max = f32::INFINITY;
        }
        if self.min > self.max {
            std::mem::swap(&mut self.min, &mut self.max);
        }
        self
    }

    /// Requires normalised bounds.
    fn clamp(&self, value: f32) -> f32 {
        value.clamp(self.min, self.max)
    }
}

struct Parameter {
    name: String,
    spec: ParameterSpec,
    cell: Arc<ControlCell>,
    control: Control,
}

#[derive(Default)]
struct Registry {
    entries: Vec<Parameter>,
    by_name: HashMap<String, usize>,
}

/// Name-addressable parameters of one synth.
///
/// Cloning is cheap and every clone sees the same parameters, so a handle can
/// be moved to a UI thread while the synth itself lives in the audio callback.
#[derive(Clone, Default)]
pub struct Parameters {
    inner: Arc<RwLock<Registry>>,
}

impl Parameters {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Register a parameter and return the control node reading it.
    pub fn add(&self, name: &str, spec: ParameterSpec) -> Result<Control, SynthError> {
        let mut registry = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        if registry.by_name.contains_key(name) {
            return Err(SynthError::DuplicateName(name.to_string()));
        }

        // Deserialized specs bypass `range`.
        let spec = spec.normalized();
        let cell = Arc::new(ControlCell::new(spec.clamp(spec.default)));
        let control = Control::from_node(ControlNode::Cell(Arc::clone(&cell)));
        let index = registry.entries.len();
        registry.entries.push(Parameter {
            name: name.to_string(),
            spec,
            cell,
            control: control.clone(),
        });
        registry.by_name.insert(name.to_string(), index);

        debug!(name, default = spec.default, "parameter registered");
        Ok(control)
    }

    /// Write a parameter. Safe to call from any thread while the synth renders;
    /// the value is picked up at the next control tick and counts as a trigger.
    pub fn set(&self, name: &str, value: f32) -> Result<(), SynthError> {
        let registry = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        let Some(&index) = registry.by_name.get(name) else {
            warn!(name, "set on unknown parameter");
            return Err(SynthError::UnknownParameter(name.to_string()));
        };

        let parameter = &registry.entries[index];
        parameter.cell.write(parameter.spec.clamp(value));
        Ok(())
    }

    /// Last value written to a parameter (or its default).
    pub fn get(&self, name: &str) -> Result<f32, SynthError> {
        self.with_parameter(name, |p| p.cell.value())
    }

    pub fn spec(&self, name: &str) -> Result<ParameterSpec, SynthError> {
        self.with_parameter(name, |p| p.spec)
    }

    /// Control node reading a registered parameter.
    pub fn control(&self, name: &str) -> Result<Control, SynthError> {
        self.with_parameter(name, |p| p.control.clone())
    }

    /// Parameter names in registration order.
    pub fn names(&self) -> Vec<String> {
        let registry = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        registry.entries.iter().map(|p| p.name.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .entries
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn with_parameter<T>(&self, name: &str, f: impl FnOnce(&Parameter) -> T) -> Result<T, SynthError> {
        let registry = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        registry
            .by_name
            .get(name)
            .map(|&index| f(&registry.entries[index]))
            .ok_or_else(|| SynthError::UnknownParameter(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_names_are_rejected() {
        let params = Parameters::new();
        params.add("cutoff", ParameterSpec::new(1_000.0)).unwrap();
        assert_eq!(
            params.add("cutoff", ParameterSpec::default()).unwrap_err(),
            SynthError::DuplicateName("cutoff".into())
        );
        assert_eq!(params.names(), vec!["cutoff".to_string()]);
    }

    #[test]
    fn unknown_parameter_is_an_error() {
        let params = Parameters::new();
        assert_eq!(
            params.set("nope", 1.0).unwrap_err(),
            SynthError::UnknownParameter("nope".into())
        );
    }

    #[test]
    fn writes_are_clamped_and_bump_the_sequence() {
        let params = Parameters::new();
        params
            .add("gain", ParameterSpec::new(0.5).range(0.0, 1.0))
            .unwrap();

        params.set("gain", 3.0).unwrap();
        assert_eq!(params.get("gain").unwrap(), 1.0);

        let registry = params.inner.read().unwrap();
        let (value, sequence) = registry.entries[0].cell.load();
        assert_eq!(value, 1.0);
        assert_eq!(sequence, 1);
    }

    #[test]
    fn ranges_are_normalised() {
        let inverted = ParameterSpec::new(0.5).range(1.0, 0.0);
        assert_eq!((inverted.min(), inverted.max()), (0.0, 1.0));

        let open_below = ParameterSpec::new(0.0).range(f32::NAN, 2.0);
        assert_eq!(open_below.min(), f32::NEG_INFINITY);
        assert_eq!(open_below.max(), 2.0);

        let params = Parameters::new();
        params.add("inverted", inverted).unwrap();
        params.add("nan", ParameterSpec::new(1.0).range(f32::NAN, f32::NAN)).unwrap();

        params.set("inverted", 7.0).unwrap();
        assert_eq!(params.get("inverted").unwrap(), 1.0);
        params.set("nan", -1e9).unwrap();
        assert_eq!(params.get("nan").unwrap(), -1e9);
    }

    #[test]
    fn registration_normalises_unchecked_specs() {
        let params = Parameters::new();
        let raw = ParameterSpec {
            default: 0.5,
            min: 1.0,
            max: f32::NAN,
        };
        params.add("raw", raw).unwrap();

        let spec = params.spec("raw").unwrap();
        assert_eq!((spec.min(), spec.max()), (1.0, f32::INFINITY));
        assert_eq!(params.get("raw").unwrap(), 1.0);
        params.set("raw", 0.0).unwrap();
        assert_eq!(params.get("raw").unwrap(), 1.0);
    }

    #[test]
    fn control_handle_is_shared() {
        let params = Parameters::new();
        let direct = params.add("x", ParameterSpec::default()).unwrap();
        let looked_up = params.control("x").unwrap();
        assert!(direct.same_node(&looked_up));
    }
}
