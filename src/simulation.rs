//! Simulation driver and session data
//!
//! [`Simulation::run`] drives one block across a time series through
//! driver-owned source ports. [`Simulation::run_model`] applies the same
//! session semantics to a composite [`Model`] through its declared inputs
//! and outputs.

use serde::ser::{Serialize, SerializeMap, Serializer};
use serde::Deserialize;
use tracing::{info, trace};

use crate::block::{Block, PortMap};
use crate::error::{SimError, SimResult};
use crate::model::{BlockId, Model};
use crate::port::{PortArena, PortId};
use crate::value::{Value, ValueType};

/// Name of the mandatory time entry of a [`SimData`]
pub const TIME: &str = "time";

/// Typed sample sequence
#[derive(Debug, Clone, PartialEq, serde::Serialize, Deserialize)]
#[serde(untagged)]
pub enum Series {
    Bool(Vec<bool>),
    Int(Vec<i64>),
    Real(Vec<f64>),
}

impl Series {
    pub fn with_capacity(value_type: ValueType, capacity: usize) -> Self {
        match value_type {
            ValueType::Boolean => Series::Bool(Vec::with_capacity(capacity)),
            ValueType::Integer => Series::Int(Vec::with_capacity(capacity)),
            ValueType::Real => Series::Real(Vec::with_capacity(capacity)),
        }
    }

    pub fn value_type(&self) -> ValueType {
        match self {
            Series::Bool(_) => ValueType::Boolean,
            Series::Int(_) => ValueType::Integer,
            Series::Real(_) => ValueType::Real,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Series::Bool(v) => v.len(),
            Series::Int(v) => v.len(),
            Series::Real(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, index: usize) -> Option<Value> {
        match self {
            Series::Bool(v) => v.get(index).copied().map(Value::Bool),
            Series::Int(v) => v.get(index).copied().map(Value::Int),
            Series::Real(v) => v.get(index).copied().map(Value::Real),
        }
    }

    /// Append a sample of the series' own type
    pub fn push(&mut self, value: Value) -> SimResult<()> {
        match (self, value) {
            (Series::Bool(v), Value::Bool(x)) => v.push(x),
            (Series::Int(v), Value::Int(x)) => v.push(x),
            (Series::Real(v), Value::Real(x)) => v.push(x),
            (series, value) => {
                return Err(SimError::InvalidValue {
                    context: "sample appended to series".to_string(),
                    expected: series.value_type(),
                    found: value.value_type(),
                })
            }
        }
        Ok(())
    }

    pub fn as_bool(&self) -> Option<&[bool]> {
        match self {
            Series::Bool(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<&[i64]> {
        match self {
            Series::Int(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_real(&self) -> Option<&[f64]> {
        match self {
            Series::Real(v) => Some(v),
            _ => None,
        }
    }
}

impl From<Vec<bool>> for Series {
    fn from(v: Vec<bool>) -> Self {
        Series::Bool(v)
    }
}

impl From<Vec<i64>> for Series {
    fn from(v: Vec<i64>) -> Self {
        Series::Int(v)
    }
}

impl From<Vec<f64>> for Series {
    fn from(v: Vec<f64>) -> Self {
        Series::Real(v)
    }
}

/// Named signals sampled on a shared time vector
///
/// Used both as the input of a session (one entry per driven inport) and as
/// its result (one entry per outport). The time vector is always present and
/// is kept apart from the named signals; inserting a signal called `time`
/// replaces it.
///
/// # Example
///
/// ```
/// use blocksim::simulation::SimData;
///
/// let data = SimData::new(vec![0.0, 0.1, 0.2]).with_signal("u", vec![1.0, 2.0, 3.0]);
/// assert_eq!(data.signal_names(), vec!["u"]);
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SimData {
    time: Vec<f64>,
    signals: Vec<(String, Series)>,
    /// First insert refused by `with_signal`, reported when the data is used
    rejected: Option<SimError>,
}

impl SimData {
    pub fn new(time: Vec<f64>) -> Self {
        Self {
            time,
            ..Default::default()
        }
    }

    /// Add or replace a signal
    ///
    /// A refused insert is kept and surfaces from [`SimData::check`], so a
    /// session run on this data fails before its first sample.
    pub fn with_signal(mut self, name: &str, series: impl Into<Series>) -> Self {
        if let Err(err) = self.insert(name, series) {
            self.rejected.get_or_insert(err);
        }
        self
    }

    /// Add or replace a signal; a `time` entry must be real-valued
    pub fn insert(&mut self, name: &str, series: impl Into<Series>) -> SimResult<()> {
        let series = series.into();
        if name == TIME {
            return match series {
                Series::Real(time) => {
                    self.time = time;
                    Ok(())
                }
                other => Err(SimError::InvalidValue {
                    context: format!("'{}' series", TIME),
                    expected: ValueType::Real,
                    found: other.value_type(),
                }),
            };
        }
        match self.signals.iter_mut().find(|(n, _)| n.as_str() == name) {
            Some(slot) => slot.1 = series,
            None => self.signals.push((name.to_string(), series)),
        }
        Ok(())
    }

    /// Error of the first refused `with_signal`, if any
    pub fn check(&self) -> SimResult<()> {
        match &self.rejected {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    pub fn time(&self) -> &[f64] {
        &self.time
    }

    /// Number of samples
    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    /// Names of the signals besides `time`, in insertion order
    pub fn signal_names(&self) -> Vec<&str> {
        self.signals.iter().map(|(n, _)| n.as_str()).collect()
    }

    pub fn signal(&self, name: &str) -> Option<&Series> {
        self.signals.iter().find(|(n, _)| n.as_str() == name).map(|(_, s)| s)
    }

    /// Sample `index` of signal `name`; `time` is addressable too
    pub fn sample(&self, name: &str, index: usize) -> Option<Value> {
        if name == TIME {
            return self.time.get(index).copied().map(Value::Real);
        }
        self.signal(name)?.get(index)
    }
}

impl Serialize for SimData {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.signals.len() + 1))?;
        map.serialize_entry(TIME, &self.time)?;
        for (name, series) in &self.signals {
            map.serialize_entry(name, series)?;
        }
        map.end()
    }
}

/// Session driver
pub struct Simulation;

impl Simulation {
    /// Drive `block` across `input` and record every outport
    ///
    /// Each declared inport is rewired to a driver-owned root outport,
    /// replacing whatever it was connected to. The model keeps one such
    /// source per inport and reuses it on later runs. Per sample the sources are
    /// written, the block computes, the outports are recorded, then the block
    /// advances. Validation happens before the first sample.
    pub fn run(model: &mut Model, block: BlockId, input: &SimData) -> SimResult<SimData> {
        let (name, inports, outports) = {
            let b = model.block(block)?;
            (b.name().to_string(), b.inports().clone(), b.outports().clone())
        };
        let samples = validate(model.ports(), &inports, input)?;
        info!(
            block = %name,
            samples,
            inputs = inports.len(),
            outputs = outports.len(),
            "starting simulation"
        );

        let mut drives = Vec::with_capacity(inports.len());
        for (port_name, inport) in inports.iter() {
            let source = model.driver_source(port_name, inport)?;
            drives.push((source, signal(input, port_name)?));
        }
        let mut recorders = new_recorders(model.ports(), &outports, samples)?;

        for k in 0..samples {
            trace!(step = k, time = input.time[k], "simulation step");
            drive(model.ports_mut(), &drives, k)?;
            model.compute_block(block)?;
            record(model.ports(), &mut recorders, k)?;
            model.advance_block(block)?;
        }

        info!(block = %name, samples, "simulation finished");
        Ok(collect(input, recorders))
    }

    /// Drive a composite model through its declared inputs and outputs
    ///
    /// Every sample runs `compute` on all blocks in dependency order, records
    /// the outputs, then runs `advance` on all blocks.
    pub fn run_model(model: &mut Model, input: &SimData) -> SimResult<SimData> {
        let inputs = model.inputs().clone();
        let outputs = model.outputs().clone();
        let samples = validate(model.ports(), &inputs, input)?;
        let order = model.schedule()?;
        info!(
            blocks = model.len(),
            samples,
            inputs = inputs.len(),
            outputs = outputs.len(),
            "starting model simulation"
        );

        let drives = inputs
            .iter()
            .map(|(port_name, id)| -> SimResult<(PortId, &Series)> {
                Ok((id, signal(input, port_name)?))
            })
            .collect::<SimResult<Vec<_>>>()?;
        let mut recorders = new_recorders(model.ports(), &outputs, samples)?;

        for k in 0..samples {
            trace!(step = k, time = input.time[k], "model step");
            drive(model.ports_mut(), &drives, k)?;
            model.compute_all(&order)?;
            record(model.ports(), &mut recorders, k)?;
            model.advance_all()?;
        }

        info!(samples, "model simulation finished");
        Ok(collect(input, recorders))
    }
}

/// Check an input session against the declared ports; returns the sample count
fn validate(ports: &PortArena, declared: &PortMap, input: &SimData) -> SimResult<usize> {
    input.check()?;
    if input.is_empty() {
        return Err(SimError::config("simulation", "time series is empty"));
    }

    let mut given = input.signal_names();
    given.retain(|&n| n != TIME);
    let missing: Vec<String> = declared
        .names()
        .into_iter()
        .filter(|n| !given.contains(&n.as_str()))
        .collect();
    let unexpected: Vec<String> = given
        .iter()
        .filter(|n| declared.get(n).is_none())
        .map(|n| n.to_string())
        .collect();
    if !missing.is_empty() || !unexpected.is_empty() {
        return Err(SimError::PortMismatch { missing, unexpected });
    }

    for (name, id) in declared.iter() {
        let series = signal(input, name)?;
        if series.len() != input.len() {
            return Err(SimError::LengthMismatch {
                signal: name.to_string(),
                expected: input.len(),
                found: series.len(),
            });
        }
        let expected = ports.value_type(id)?;
        if series.value_type() != expected {
            return Err(SimError::InvalidValue {
                context: format!("input series '{}'", name),
                expected,
                found: series.value_type(),
            });
        }
    }
    Ok(input.len())
}

fn signal<'a>(input: &'a SimData, name: &str) -> SimResult<&'a Series> {
    input.signal(name).ok_or_else(|| SimError::PortMismatch {
        missing: vec![name.to_string()],
        unexpected: Vec::new(),
    })
}

fn sample(series: &Series, name: &str, k: usize, expected: usize) -> SimResult<Value> {
    series.get(k).ok_or_else(|| SimError::LengthMismatch {
        signal: name.to_string(),
        expected,
        found: series.len(),
    })
}

fn drive(ports: &mut PortArena, drives: &[(PortId, &Series)], k: usize) -> SimResult<()> {
    for &(source, series) in drives {
        let value = sample(series, ports.name(source)?, k, k + 1)?;
        ports.set_value(source, value)?;
    }
    Ok(())
}

type Recorder = (String, PortId, Series);

fn new_recorders(ports: &PortArena, outputs: &PortMap, samples: usize) -> SimResult<Vec<Recorder>> {
    outputs
        .iter()
        .map(|(name, id)| {
            let series = Series::with_capacity(ports.value_type(id)?, samples);
            Ok((name.to_string(), id, series))
        })
        .collect()
}

fn record(ports: &PortArena, recorders: &mut [Recorder], k: usize) -> SimResult<()> {
    for (name, id, series) in recorders.iter_mut() {
        let value = ports.value(*id)?;
        trace!(step = k, port = %name, %value, "recorded");
        series.push(value)?;
    }
    Ok(())
}

fn collect(input: &SimData, recorders: Vec<Recorder>) -> SimData {
    SimData {
        time: input.time.clone(),
        signals: recorders
            .into_iter()
            .map(|(name, _, series)| (name, series))
            .collect(),
        rejected: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blocks::{Constant, Delay, Gain, Switch};

    #[test]
    fn test_series_push_type_checked() {
        let mut series = Series::with_capacity(ValueType::Integer, 2);
        series.push(Value::Int(1)).unwrap();
        assert!(matches!(
            series.push(Value::Real(1.0)),
            Err(SimError::InvalidValue { .. })
        ));
        assert_eq!(series.as_int(), Some(&[1][..]));
        assert_eq!(series.get(1), None);
    }

    #[test]
    fn test_sim_data_access() {
        let data = SimData::new(vec![0.0, 0.5])
            .with_signal("a", vec![true, false])
            .with_signal("b", vec![1_i64, 2])
            .with_signal("a", vec![false, true]);
        assert_eq!(data.len(), 2);
        assert_eq!(data.signal_names(), vec!["a", "b"]);
        assert_eq!(data.sample("a", 1), Some(Value::Bool(true)));
        assert_eq!(data.sample(TIME, 1), Some(Value::Real(0.5)));
        assert_eq!(data.sample("b", 5), None);
        assert!(data.signal("c").is_none());
    }

    #[test]
    fn test_sim_data_json() {
        let data = SimData::new(vec![0.0, 1.0]).with_signal("y", vec![2.5, 3.5]);
        let json = serde_json::to_string(&data).unwrap();
        assert_eq!(json, r#"{"time":[0.0,1.0],"y":[2.5,3.5]}"#);
    }

    #[test]
    fn test_time_entry_replaces_time_vector() {
        let data = SimData::new(vec![0.0]).with_signal(TIME, vec![9.0]);
        assert_eq!(data.time(), &[9.0]);
        assert!(data.signal_names().is_empty());
        assert_eq!(serde_json::to_string(&data).unwrap(), r#"{"time":[9.0]}"#);

        let mut data = SimData::new(vec![0.0, 1.0]);
        assert!(matches!(
            data.insert(TIME, vec![0_i64, 1]),
            Err(SimError::InvalidValue { .. })
        ));
        assert_eq!(data.time(), &[0.0, 1.0]);
    }

    #[test]
    fn test_run_with_time_entry() {
        let mut model = Model::new();
        let g = model
            .build(|p| Gain::new("g", ValueType::Real, Value::Real(3.0), p))
            .unwrap();
        let input = SimData::default()
            .with_signal(TIME, vec![0.0, 1.0])
            .with_signal("u", vec![1.0, 2.0]);
        let out = model.sim(g, &input).unwrap();
        assert_eq!(out.time(), &[0.0, 1.0]);
        assert_eq!(out.signal("y"), Some(&Series::Real(vec![3.0, 6.0])));

        let json = serde_json::to_string(&out).unwrap();
        assert_eq!(json, r#"{"time":[0.0,1.0],"y":[3.0,6.0]}"#);
        assert_eq!(json.matches("\"time\"").count(), 1);
    }

    #[test]
    fn test_run_rejects_boolean_time_entry() {
        let mut model = Model::new();
        let g = model
            .build(|p| Gain::new("g", ValueType::Real, Value::Real(3.0), p))
            .unwrap();
        let input = SimData::new(vec![0.0, 1.0])
            .with_signal(TIME, vec![true, false])
            .with_signal("u", vec![1.0, 2.0]);
        assert!(input.check().is_err());
        assert_eq!(
            model.sim(g, &input).unwrap_err(),
            SimError::InvalidValue {
                context: "'time' series".to_string(),
                expected: ValueType::Real,
                found: ValueType::Boolean,
            }
        );
    }

    #[test]
    fn test_repeated_runs_reuse_driver_ports() {
        let mut model = Model::new();
        let g = model
            .build(|p| Gain::new("g", ValueType::Real, Value::Real(2.0), p))
            .unwrap();
        let input = SimData::new(vec![0.0, 1.0]).with_signal("u", vec![1.0, 2.0]);

        model.sim(g, &input).unwrap();
        let after_first = model.ports().len();
        assert_eq!(after_first, 3);
        for _ in 0..100 {
            let out = model.sim(g, &input).unwrap();
            assert_eq!(out.signal("y"), Some(&Series::Real(vec![2.0, 4.0])));
        }
        assert_eq!(model.ports().len(), after_first);
    }

    #[test]
    fn test_run_constant() {
        let mut model = Model::new();
        let c = model
            .build(|p| Constant::new("c", ValueType::Integer, Value::Int(4), p))
            .unwrap();
        let time = vec![0.0, 0.1, 0.2];
        let out = model.sim(c, &SimData::new(time.clone())).unwrap();
        assert_eq!(out.time(), &time[..]);
        assert_eq!(out.signal("y"), Some(&Series::Int(vec![4, 4, 4])));
    }

    #[test]
    fn test_run_gain() {
        let mut model = Model::new();
        let g = model
            .build(|p| Gain::new("g", ValueType::Real, Value::Real(-2.0), p))
            .unwrap();
        let input = SimData::new(vec![0.0, 1.0, 2.0]).with_signal("u", vec![1.0, 0.5, -3.0]);
        let out = Simulation::run(&mut model, g, &input).unwrap();
        assert_eq!(out.signal("y").and_then(Series::as_real), Some(&[-2.0, -1.0, 6.0][..]));
    }

    #[test]
    fn test_run_switch_mixed_types() {
        let mut model = Model::new();
        let sw = model.build(|p| Switch::new("sw", ValueType::Integer, p)).unwrap();
        let input = SimData::new(vec![0.0, 1.0, 2.0])
            .with_signal("on", vec![1_i64, 2, 3])
            .with_signal("off", vec![-1_i64, -2, -3])
            .with_signal("sw", vec![true, false, true]);
        let out = model.sim(sw, &input).unwrap();
        assert_eq!(out.signal("y"), Some(&Series::Int(vec![1, -2, 3])));
    }

    #[test]
    fn test_run_port_mismatch() {
        let mut model = Model::new();
        let z = model
            .build(|p| Delay::new("z", ValueType::Real, Value::Real(0.0), p))
            .unwrap();
        let time = vec![0.0, 1.0];

        let missing = model.sim(z, &SimData::new(time.clone())).unwrap_err();
        assert_eq!(
            missing,
            SimError::PortMismatch {
                missing: vec!["u".to_string()],
                unexpected: vec![],
            }
        );

        let extra = SimData::new(time)
            .with_signal("u", vec![1.0, 2.0])
            .with_signal("v", vec![1.0, 2.0]);
        let err = model.sim(z, &extra).unwrap_err();
        assert_eq!(
            err,
            SimError::PortMismatch {
                missing: vec![],
                unexpected: vec!["v".to_string()],
            }
        );
    }

    #[test]
    fn test_run_validation() {
        let mut model = Model::new();
        let g = model
            .build(|p| Gain::new("g", ValueType::Real, Value::Real(1.0), p))
            .unwrap();

        let empty = SimData::new(Vec::new()).with_signal("u", Vec::<f64>::new());
        assert!(matches!(
            model.sim(g, &empty),
            Err(SimError::InvalidConfiguration { .. })
        ));

        let short = SimData::new(vec![0.0, 1.0]).with_signal("u", vec![1.0]);
        assert_eq!(
            model.sim(g, &short).unwrap_err(),
            SimError::LengthMismatch {
                signal: "u".to_string(),
                expected: 2,
                found: 1,
            }
        );

        let wrong = SimData::new(vec![0.0]).with_signal("u", vec![true]);
        assert!(matches!(
            model.sim(g, &wrong),
            Err(SimError::InvalidValue { .. })
        ));
    }
}
