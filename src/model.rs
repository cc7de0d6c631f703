//! Model: owner of the port arena and the blocks wired through it
//!
//! A [`Model`] is the parent handle of everything it contains. Blocks are
//! built against its arena, inserted, and addressed afterwards by
//! [`BlockId`]. Composite models additionally declare model-level inputs
//! and outputs and are stepped with a two-phase pass over all blocks.

use std::collections::{BTreeSet, HashMap};

use tracing::debug;

use crate::block::{Block, PortMap};
use crate::block_kind::BlockKind;
use crate::error::{SimError, SimResult};
use crate::port::{PortArena, PortDirection, PortId};
use crate::simulation::{SimData, Simulation, TIME};
use crate::utils::PortTable;
use crate::value::ValueType;

/// Handle to a block inside a [`Model`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlockId(usize);

impl BlockId {
    pub fn index(&self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, Default)]
pub struct Model {
    ports: PortArena,
    blocks: Vec<BlockKind>,
    inputs: PortMap,
    outputs: PortMap,
    /// Driver-owned source of each inport a session has driven
    drivers: HashMap<PortId, PortId>,
}

impl Model {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ports(&self) -> &PortArena {
        &self.ports
    }

    /// Arena to build blocks against before inserting them
    pub fn ports_mut(&mut self) -> &mut PortArena {
        &mut self.ports
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Take ownership of a block built against this model's arena
    pub fn insert(&mut self, block: impl Into<BlockKind>) -> BlockId {
        let block = block.into();
        let id = BlockId(self.blocks.len());
        debug!(
            block = block.name(),
            kind = %block.block_type(),
            id = id.0,
            "inserted block"
        );
        self.blocks.push(block);
        id
    }

    /// Build a block with this model as parent and insert it
    ///
    /// ```ignore
    /// let gain = model.build(|p| Gain::new("g", ValueType::Real, Value::Real(2.0), p))?;
    /// ```
    pub fn build<B, F>(&mut self, f: F) -> SimResult<BlockId>
    where
        B: Into<BlockKind>,
        F: FnOnce(&mut PortArena) -> SimResult<B>,
    {
        let block = f(&mut self.ports)?;
        Ok(self.insert(block))
    }

    pub fn block(&self, id: BlockId) -> SimResult<&BlockKind> {
        self.blocks.get(id.0).ok_or(SimError::UnknownBlock(id.0))
    }

    pub fn block_mut(&mut self, id: BlockId) -> SimResult<&mut BlockKind> {
        self.blocks.get_mut(id.0).ok_or(SimError::UnknownBlock(id.0))
    }

    /// Look up a block by name
    pub fn find(&self, name: &str) -> Option<BlockId> {
        self.blocks.iter().position(|b| b.name() == name).map(BlockId)
    }

    pub fn inport(&self, block: BlockId, name: &str) -> SimResult<PortId> {
        self.block(block)?.inport(name)
    }

    pub fn outport(&self, block: BlockId, name: &str) -> SimResult<PortId> {
        self.block(block)?.outport(name)
    }

    /// Wire inport `inport_name` of `block` to read from `source`
    pub fn connect(&mut self, block: BlockId, inport_name: &str, source: PortId) -> SimResult<()> {
        let inport = self.inport(block, inport_name)?;
        self.ports.connect(inport, source)
    }

    /// Wire `inport` to the root outport a session writes its samples to
    ///
    /// The source is allocated on the first session that drives `inport`
    /// and reused by every later one, so repeated runs leave the arena size
    /// unchanged.
    pub(crate) fn driver_source(&mut self, name: &str, inport: PortId) -> SimResult<PortId> {
        let source = match self.drivers.get(&inport) {
            Some(&source) => source,
            None => {
                let value_type = self.ports.value_type(inport)?;
                let source = self.ports.add_outport(name, value_type);
                self.drivers.insert(inport, source);
                source
            }
        };
        self.ports.connect(inport, source)?;
        Ok(source)
    }

    /// Return every block to its constructed state
    pub fn reset(&mut self) {
        for block in &mut self.blocks {
            block.reset();
        }
    }

    /// Declare a model-level input driven by the simulation
    pub fn add_input(&mut self, name: &str, value_type: ValueType) -> SimResult<PortId> {
        self.check_boundary_name(&self.inputs, name)?;
        let id = self.ports.add_outport(name, value_type);
        self.inputs.push(name, id);
        Ok(id)
    }

    /// Declare a model-level output probing `source`
    pub fn add_output(&mut self, name: &str, source: PortId) -> SimResult<PortId> {
        self.check_boundary_name(&self.outputs, name)?;
        let value_type = self.ports.value_type(source)?;
        let id = self.ports.add_inport(name, value_type);
        self.ports.connect(id, source)?;
        self.outputs.push(name, id);
        Ok(id)
    }

    fn check_boundary_name(&self, map: &PortMap, name: &str) -> SimResult<()> {
        if name == TIME {
            return Err(SimError::config("model", format!("'{}' is reserved", TIME)));
        }
        if map.get(name).is_some() {
            return Err(SimError::config("model", format!("port '{}' is already declared", name)));
        }
        Ok(())
    }

    pub fn inputs(&self) -> &PortMap {
        &self.inputs
    }

    pub fn outputs(&self) -> &PortMap {
        &self.outputs
    }

    /// Order in which `compute` must run so every direct-feedthrough block
    /// sees inputs already settled this step
    ///
    /// Delay and Integrator publish state only, so they have no upstream
    /// edges and close feedback loops. Ties keep insertion order.
    pub fn schedule(&self) -> SimResult<Vec<BlockId>> {
        let mut owner: HashMap<PortId, usize> = HashMap::new();
        for (i, block) in self.blocks.iter().enumerate() {
            for id in block.outports().ids() {
                owner.insert(id, i);
            }
        }

        let n = self.blocks.len();
        let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); n];
        let mut pending = vec![0usize; n];
        for (i, block) in self.blocks.iter().enumerate() {
            if !block.has_direct_feedthrough() {
                continue;
            }
            let mut upstream: Vec<usize> = block
                .inports()
                .ids()
                .into_iter()
                .filter_map(|id| self.ports.root(id).ok().and_then(|r| owner.get(&r).copied()))
                .collect();
            upstream.sort_unstable();
            upstream.dedup();
            for u in upstream {
                dependents[u].push(i);
                pending[i] += 1;
            }
        }

        let mut ready: BTreeSet<usize> = (0..n).filter(|&i| pending[i] == 0).collect();
        let mut order = Vec::with_capacity(n);
        while let Some(i) = ready.pop_first() {
            order.push(BlockId(i));
            for &d in &dependents[i] {
                pending[d] -= 1;
                if pending[d] == 0 {
                    ready.insert(d);
                }
            }
        }

        if order.len() < n {
            let stuck = (0..n)
                .filter(|&i| pending[i] > 0)
                .map(|i| self.blocks[i].name().to_string())
                .collect();
            return Err(SimError::AlgebraicLoop(stuck));
        }
        Ok(order)
    }

    pub fn compute_block(&mut self, id: BlockId) -> SimResult<()> {
        let block = self.blocks.get(id.0).ok_or(SimError::UnknownBlock(id.0))?;
        block.compute(&mut self.ports)
    }

    pub fn advance_block(&mut self, id: BlockId) -> SimResult<()> {
        let block = self.blocks.get_mut(id.0).ok_or(SimError::UnknownBlock(id.0))?;
        block.advance(&self.ports)
    }

    /// First phase: `compute` every block in `order`
    pub fn compute_all(&mut self, order: &[BlockId]) -> SimResult<()> {
        for &id in order {
            self.compute_block(id)?;
        }
        Ok(())
    }

    /// Second phase: `advance` every block
    pub fn advance_all(&mut self) -> SimResult<()> {
        for block in &mut self.blocks {
            block.advance(&self.ports)?;
        }
        Ok(())
    }

    /// One full two-phase step of the whole model
    pub fn step(&mut self) -> SimResult<()> {
        let order = self.schedule()?;
        self.compute_all(&order)?;
        self.advance_all()
    }

    /// Drive a single block with `input`, see [`Simulation::run`]
    pub fn sim(&mut self, block: BlockId, input: &SimData) -> SimResult<SimData> {
        Simulation::run(self, block, input)
    }

    pub fn port_table(&self, block: BlockId, direction: PortDirection) -> SimResult<PortTable> {
        let block = self.block(block)?;
        let map = match direction {
            PortDirection::Input => block.inports(),
            PortDirection::Output => block.outports(),
        };
        Ok(PortTable::new(&self.ports, map.ids()))
    }
}
