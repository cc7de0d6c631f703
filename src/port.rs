//! Typed ports and the arena that owns them
//!
//! Ports never hold references to each other. A port's `source` and its
//! `subscribers` are [`PortId`] indices into the same [`PortArena`], so the
//! back-references between a source and the ports that read through it never
//! form an ownership cycle.
//!
//! The arena keeps every connected group as a flat star: one root port that
//! holds the live value, and every other port of the group pointing directly
//! at that root. [`PortArena::connect`] re-flattens on each call, so the
//! order in which a model is wired does not matter.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{SimError, SimResult};
use crate::value::{Value, ValueType};

/// Stable handle to a port inside a [`PortArena`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PortId(usize);

impl PortId {
    pub fn index(&self) -> usize {
        self.0
    }
}

/// Direction of a port (input or output)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PortDirection {
    Input,
    Output,
}

impl PortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            PortDirection::Input => "input",
            PortDirection::Output => "output",
        }
    }
}

/// A typed signal endpoint
#[derive(Debug, Clone)]
pub struct Port {
    name: String,
    direction: PortDirection,
    value_type: ValueType,
    /// Only meaningful while the port is a root
    value: Option<Value>,
    source: Option<PortId>,
    subscribers: Vec<PortId>,
}

impl Port {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn direction(&self) -> PortDirection {
        self.direction
    }

    pub fn value_type(&self) -> ValueType {
        self.value_type
    }

    pub fn source(&self) -> Option<PortId> {
        self.source
    }

    pub fn subscribers(&self) -> &[PortId] {
        &self.subscribers
    }

    /// A root has no source and holds its own value
    pub fn is_root(&self) -> bool {
        self.source.is_none()
    }
}

/// Owner of every port in a model
#[derive(Debug, Clone, Default)]
pub struct PortArena {
    ports: Vec<Port>,
}

impl PortArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.ports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ports.is_empty()
    }

    /// Create an input port; inports only ever read through a source
    pub fn add_inport(&mut self, name: &str, value_type: ValueType) -> PortId {
        self.add(name, PortDirection::Input, value_type)
    }

    /// Create an output port; an unconnected outport is a root
    pub fn add_outport(&mut self, name: &str, value_type: ValueType) -> PortId {
        self.add(name, PortDirection::Output, value_type)
    }

    fn add(&mut self, name: &str, direction: PortDirection, value_type: ValueType) -> PortId {
        let id = PortId(self.ports.len());
        self.ports.push(Port {
            name: name.to_string(),
            direction,
            value_type,
            value: None,
            source: None,
            subscribers: Vec::new(),
        });
        id
    }

    pub fn get(&self, id: PortId) -> Option<&Port> {
        self.ports.get(id.0)
    }

    /// Checked lookup; an id minted by another arena is `UnknownPort`
    pub fn port(&self, id: PortId) -> SimResult<&Port> {
        self.get(id).ok_or_else(|| SimError::UnknownPort {
            block: "port arena".to_string(),
            port: format!("#{}", id.0),
        })
    }

    pub fn name(&self, id: PortId) -> SimResult<&str> {
        Ok(&self.port(id)?.name)
    }

    pub fn value_type(&self, id: PortId) -> SimResult<ValueType> {
        Ok(self.port(id)?.value_type)
    }

    pub fn direction(&self, id: PortId) -> SimResult<PortDirection> {
        Ok(self.port(id)?.direction)
    }

    /// Source of `id`; unknown ids have none
    pub fn source(&self, id: PortId) -> Option<PortId> {
        self.get(id).and_then(Port::source)
    }

    pub fn subscribers(&self, id: PortId) -> &[PortId] {
        self.get(id).map(Port::subscribers).unwrap_or_default()
    }

    pub fn is_connected(&self, id: PortId) -> bool {
        self.source(id).is_some()
    }

    /// Follow `source` links until a root is reached
    ///
    /// With the flattening invariant this is at most one hop. The walk is
    /// still bounded by the arena size.
    pub fn root(&self, id: PortId) -> SimResult<PortId> {
        let mut current = id;
        for _ in 0..=self.ports.len() {
            match self.port(current)?.source {
                Some(next) => current = next,
                None => break,
            }
        }
        Ok(current)
    }

    /// Redirect `port` to read from `source`
    ///
    /// Every port that previously resolved through `port` is relinked onto
    /// the root of `source`, then `port` itself subscribes to that root. If
    /// `port` already had a source it is detached from it first. No value is
    /// propagated.
    pub fn connect(&mut self, port: PortId, source: PortId) -> SimResult<()> {
        let (target, driver) = (self.port(port)?, self.port(source)?);
        if target.value_type != driver.value_type {
            return Err(SimError::TypeMismatch {
                port: target.name.clone(),
                source_port: driver.name.clone(),
                expected: target.value_type,
                found: driver.value_type,
            });
        }

        let root = self.root(source)?;
        if root == port {
            return Err(SimError::CyclicConnection {
                port: target.name.clone(),
                source_port: driver.name.clone(),
            });
        }

        self.detach(port);

        let subscribers = std::mem::take(&mut self.ports[port.0].subscribers);
        for &sub in &subscribers {
            self.ports[sub.0].source = Some(root);
            self.subscribe(root, sub);
        }

        let slot = &mut self.ports[port.0];
        slot.source = Some(root);
        slot.value = None;
        self.subscribe(root, port);

        debug!(
            port = %self.ports[port.0].name,
            source = %self.ports[source.0].name,
            root = %self.ports[root.0].name,
            relinked = subscribers.len(),
            "connected port"
        );
        Ok(())
    }

    /// Make `port` a root again, leaving its value unset
    pub fn disconnect(&mut self, port: PortId) -> SimResult<()> {
        self.port(port)?;
        self.detach(port);
        self.ports[port.0].value = None;
        Ok(())
    }

    fn detach(&mut self, port: PortId) {
        if let Some(old) = self.ports[port.0].source.take() {
            self.ports[old.0].subscribers.retain(|&s| s != port);
        }
    }

    fn subscribe(&mut self, root: PortId, port: PortId) {
        let subscribers = &mut self.ports[root.0].subscribers;
        if !subscribers.contains(&port) {
            subscribers.push(port);
        }
    }

    /// Store a value on a root outport
    pub fn set_value(&mut self, id: PortId, value: Value) -> SimResult<()> {
        let port = self.port(id)?;
        if let Some(source) = port.source {
            return Err(SimError::state(
                &port.name,
                format!("port is driven by '{}'", self.ports[source.0].name),
            ));
        }
        if port.direction == PortDirection::Input {
            return Err(SimError::state(&port.name, "inports cannot hold a value"));
        }
        if value.value_type() != port.value_type {
            return Err(SimError::InvalidValue {
                context: format!("value written to port '{}'", port.name),
                expected: port.value_type,
                found: value.value_type(),
            });
        }
        self.ports[id.0].value = Some(value);
        Ok(())
    }

    /// Effective value of a port, resolved through its source
    pub fn value(&self, id: PortId) -> SimResult<Value> {
        let name = self.name(id)?;
        let root = &self.ports[self.root(id)?.0];
        if root.direction == PortDirection::Input {
            return Err(SimError::state(
                name,
                format!("resolves to inport '{}' which has no source", root.name),
            ));
        }
        root.value
            .ok_or_else(|| SimError::Uninitialized(name.to_string()))
    }

    /// Effective value if one is available, without raising
    pub fn peek(&self, id: PortId) -> Option<Value> {
        self.value(id).ok()
    }
}
