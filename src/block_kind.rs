//! BlockKind enum for dispatch over the closed set of block variants
//!
//! A model stores its blocks as `BlockKind` values so that heterogeneous
//! blocks live in one `Vec` and calls are resolved by a `match` instead of
//! a vtable.

use crate::block::{Block, BlockType, PortMap};
use crate::blocks::*;
use crate::error::SimResult;
use crate::port::PortArena;

/// Delegate a `Block` method to the wrapped variant
macro_rules! dispatch_method {
    ($self:ident, $method:ident, $($args:expr),*) => {
        match $self {
            BlockKind::Constant(b) => b.$method($($args),*),
            BlockKind::Gain(b) => b.$method($($args),*),
            BlockKind::Delay(b) => b.$method($($args),*),
            BlockKind::Switch(b) => b.$method($($args),*),
            BlockKind::Sum(b) => b.$method($($args),*),
            BlockKind::Product(b) => b.$method($($args),*),
            BlockKind::Logical(b) => b.$method($($args),*),
            BlockKind::Relational(b) => b.$method($($args),*),
            BlockKind::Integrator(b) => b.$method($($args),*),
        }
    };
}

/// Type-erased wrapper around every block variant
///
/// # Example
///
/// ```ignore
/// use blocksim::prelude::*;
///
/// let mut ports = PortArena::new();
/// let blocks: Vec<BlockKind> = vec![
///     Constant::new("c", ValueType::Real, Value::Real(1.0), &mut ports)?.into(),
///     Gain::new("g", ValueType::Real, Value::Real(2.0), &mut ports)?.into(),
/// ];
/// ```
#[derive(Debug, Clone)]
pub enum BlockKind {
    // Sources
    Constant(Constant),

    // Arithmetic
    Gain(Gain),
    Sum(Sum),
    Product(Product),

    // Stateful
    Delay(Delay),
    Integrator(Integrator),

    // Logic
    Switch(Switch),
    Logical(Logical),
    Relational(Relational),
}

impl Block for BlockKind {
    fn name(&self) -> &str {
        dispatch_method!(self, name,)
    }

    fn block_type(&self) -> BlockType {
        dispatch_method!(self, block_type,)
    }

    fn inports(&self) -> &PortMap {
        dispatch_method!(self, inports,)
    }

    fn outports(&self) -> &PortMap {
        dispatch_method!(self, outports,)
    }

    fn compute(&self, ports: &mut PortArena) -> SimResult<()> {
        dispatch_method!(self, compute, ports)
    }

    fn advance(&mut self, ports: &PortArena) -> SimResult<()> {
        dispatch_method!(self, advance, ports)
    }

    fn reset(&mut self) {
        dispatch_method!(self, reset,)
    }

    fn has_direct_feedthrough(&self) -> bool {
        dispatch_method!(self, has_direct_feedthrough,)
    }
}

// From implementations for automatic conversion

impl From<Constant> for BlockKind {
    fn from(block: Constant) -> Self {
        BlockKind::Constant(block)
    }
}

impl From<Gain> for BlockKind {
    fn from(block: Gain) -> Self {
        BlockKind::Gain(block)
    }
}

impl From<Sum> for BlockKind {
    fn from(block: Sum) -> Self {
        BlockKind::Sum(block)
    }
}

impl From<Product> for BlockKind {
    fn from(block: Product) -> Self {
        BlockKind::Product(block)
    }
}

impl From<Delay> for BlockKind {
    fn from(block: Delay) -> Self {
        BlockKind::Delay(block)
    }
}

impl From<Integrator> for BlockKind {
    fn from(block: Integrator) -> Self {
        BlockKind::Integrator(block)
    }
}

impl From<Switch> for BlockKind {
    fn from(block: Switch) -> Self {
        BlockKind::Switch(block)
    }
}

impl From<Logical> for BlockKind {
    fn from(block: Logical) -> Self {
        BlockKind::Logical(block)
    }
}

impl From<Relational> for BlockKind {
    fn from(block: Relational) -> Self {
        BlockKind::Relational(block)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::{Value, ValueType};

    #[test]
    fn test_dispatch_preserves_behavior() {
        let mut ports = PortArena::new();
        let mut blocks: Vec<BlockKind> = vec![
            Constant::new("c", ValueType::Real, Value::Real(1.5), &mut ports)
                .unwrap()
                .into(),
            Delay::new("z", ValueType::Real, Value::Real(0.0), &mut ports)
                .unwrap()
                .into(),
        ];
        let c_out = blocks[0].outport("y").unwrap();
        blocks[1].connect(&mut ports, "u", c_out).unwrap();

        assert_eq!(blocks[0].block_type(), BlockType::Constant);
        assert_eq!(blocks[1].name(), "z");
        assert!(blocks[0].has_direct_feedthrough());
        assert!(!blocks[1].has_direct_feedthrough());

        for b in &blocks {
            b.compute(&mut ports).unwrap();
        }
        for b in &mut blocks {
            b.advance(&ports).unwrap();
        }
        blocks[1].compute(&mut ports).unwrap();
        let z_out = blocks[1].outport("y").unwrap();
        assert_eq!(ports.value(z_out), Ok(Value::Real(1.5)));

        blocks[1].reset();
        blocks[1].compute(&mut ports).unwrap();
        assert_eq!(ports.value(z_out), Ok(Value::Real(0.0)));
    }
}
