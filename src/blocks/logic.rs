//! Logic blocks: switch, boolean operators, comparisons

use std::fmt;

use crate::block::{read_bool, Block, BlockType, PortMap};
use crate::error::{SimError, SimResult};
use crate::port::{PortArena, PortId};
use crate::value::{Value, ValueType};

/// Switch: y = on if sw else off
///
/// `on`, `off` and `y` share the block type; `sw` is always boolean.
#[derive(Debug, Clone)]
pub struct Switch {
    name: String,
    inports: PortMap,
    outports: PortMap,
    on: PortId,
    off: PortId,
    control: PortId,
    output: PortId,
}

impl Switch {
    pub fn new(name: &str, value_type: ValueType, ports: &mut PortArena) -> SimResult<Self> {
        let on = ports.add_inport("on", value_type);
        let off = ports.add_inport("off", value_type);
        let control = ports.add_inport("sw", ValueType::Boolean);
        let output = ports.add_outport("y", value_type);

        let mut inports = PortMap::new();
        inports.push("on", on);
        inports.push("off", off);
        inports.push("sw", control);
        let mut outports = PortMap::new();
        outports.push("y", output);

        Ok(Self {
            name: name.to_string(),
            inports,
            outports,
            on,
            off,
            control,
            output,
        })
    }
}

impl Block for Switch {
    fn name(&self) -> &str {
        &self.name
    }

    fn block_type(&self) -> BlockType {
        BlockType::Switch
    }

    fn inports(&self) -> &PortMap {
        &self.inports
    }

    fn outports(&self) -> &PortMap {
        &self.outports
    }

    fn compute(&self, ports: &mut PortArena) -> SimResult<()> {
        self.check_connected(ports)?;
        let selected = if read_bool(ports, self.control)? {
            self.on
        } else {
            self.off
        };
        let y = ports.value(selected)?;
        ports.set_value(self.output, y)
    }
}

/// Boolean operator of a [`Logical`] block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOp {
    And,
    Or,
    Xor,
}

impl LogicalOp {
    /// Resolve an operator token ("and", "or", "xor")
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "and" => Some(LogicalOp::And),
            "or" => Some(LogicalOp::Or),
            "xor" => Some(LogicalOp::Xor),
            _ => None,
        }
    }

    pub fn apply(self, a: bool, b: bool) -> bool {
        match self {
            LogicalOp::And => a && b,
            LogicalOp::Or => a || b,
            LogicalOp::Xor => a ^ b,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LogicalOp::And => "and",
            LogicalOp::Or => "or",
            LogicalOp::Xor => "xor",
        }
    }
}

impl fmt::Display for LogicalOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Two-input boolean operator: y = op(u0, u1)
#[derive(Debug, Clone)]
pub struct Logical {
    name: String,
    inports: PortMap,
    outports: PortMap,
    inputs: [PortId; 2],
    output: PortId,
    op: LogicalOp,
}

impl Logical {
    pub fn new(name: &str, op: LogicalOp, ports: &mut PortArena) -> SimResult<Self> {
        let (inports, inputs) = binary_inports(ports, ValueType::Boolean);
        let output = ports.add_outport("y", ValueType::Boolean);
        let mut outports = PortMap::new();
        outports.push("y", output);

        Ok(Self {
            name: name.to_string(),
            inports,
            outports,
            inputs,
            output,
            op,
        })
    }

    /// Build from an operator token, rejecting unknown tokens
    pub fn parse(name: &str, token: &str, ports: &mut PortArena) -> SimResult<Self> {
        let op = LogicalOp::from_token(token)
            .ok_or_else(|| SimError::config(name, format!("unknown logical operator '{}'", token)))?;
        Self::new(name, op, ports)
    }

    pub fn op(&self) -> LogicalOp {
        self.op
    }
}

impl Block for Logical {
    fn name(&self) -> &str {
        &self.name
    }

    fn block_type(&self) -> BlockType {
        BlockType::Logical
    }

    fn inports(&self) -> &PortMap {
        &self.inports
    }

    fn outports(&self) -> &PortMap {
        &self.outports
    }

    fn compute(&self, ports: &mut PortArena) -> SimResult<()> {
        self.check_connected(ports)?;
        let a = read_bool(ports, self.inputs[0])?;
        let b = read_bool(ports, self.inputs[1])?;
        ports.set_value(self.output, Value::Bool(self.op.apply(a, b)))
    }
}

/// Comparison operator of a [`Relational`] block
///
/// `<=` and `<` are distinct comparisons.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationalOp {
    Greater,
    GreaterEqual,
    Less,
    LessEqual,
}

impl RelationalOp {
    /// Resolve an operator token (">", ">=", "<", "<=")
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            ">" => Some(RelationalOp::Greater),
            ">=" => Some(RelationalOp::GreaterEqual),
            "<" => Some(RelationalOp::Less),
            "<=" => Some(RelationalOp::LessEqual),
            _ => None,
        }
    }

    pub fn apply(self, a: Value, b: Value) -> bool {
        match self {
            RelationalOp::Greater => a > b,
            RelationalOp::GreaterEqual => a >= b,
            RelationalOp::Less => a < b,
            RelationalOp::LessEqual => a <= b,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RelationalOp::Greater => ">",
            RelationalOp::GreaterEqual => ">=",
            RelationalOp::Less => "<",
            RelationalOp::LessEqual => "<=",
        }
    }
}

impl fmt::Display for RelationalOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Two-input comparison: y = op(u0, u1), boolean output
#[derive(Debug, Clone)]
pub struct Relational {
    name: String,
    inports: PortMap,
    outports: PortMap,
    inputs: [PortId; 2],
    output: PortId,
    op: RelationalOp,
}

impl Relational {
    pub fn new(name: &str, value_type: ValueType, op: RelationalOp, ports: &mut PortArena) -> SimResult<Self> {
        let (inports, inputs) = binary_inports(ports, value_type);
        let output = ports.add_outport("y", ValueType::Boolean);
        let mut outports = PortMap::new();
        outports.push("y", output);

        Ok(Self {
            name: name.to_string(),
            inports,
            outports,
            inputs,
            output,
            op,
        })
    }

    /// Build from an operator token, rejecting unknown tokens
    pub fn parse(name: &str, value_type: ValueType, token: &str, ports: &mut PortArena) -> SimResult<Self> {
        let op = RelationalOp::from_token(token)
            .ok_or_else(|| SimError::config(name, format!("unknown relational operator '{}'", token)))?;
        Self::new(name, value_type, op, ports)
    }

    pub fn op(&self) -> RelationalOp {
        self.op
    }
}

impl Block for Relational {
    fn name(&self) -> &str {
        &self.name
    }

    fn block_type(&self) -> BlockType {
        BlockType::Relational
    }

    fn inports(&self) -> &PortMap {
        &self.inports
    }

    fn outports(&self) -> &PortMap {
        &self.outports
    }

    fn compute(&self, ports: &mut PortArena) -> SimResult<()> {
        self.check_connected(ports)?;
        let a = ports.value(self.inputs[0])?;
        let b = ports.value(self.inputs[1])?;
        ports.set_value(self.output, Value::Bool(self.op.apply(a, b)))
    }
}

fn binary_inports(ports: &mut PortArena, value_type: ValueType) -> (PortMap, [PortId; 2]) {
    let u0 = ports.add_inport("u0", value_type);
    let u1 = ports.add_inport("u1", value_type);
    let mut map = PortMap::new();
    map.push("u0", u0);
    map.push("u1", u1);
    (map, [u0, u1])
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Give every inport of `block` its own root source
    fn drive(ports: &mut PortArena, block: &impl Block) -> Vec<PortId> {
        block
            .inport_names()
            .iter()
            .map(|name| {
                let ty = ports.value_type(block.inport(name).unwrap()).unwrap();
                let src = ports.add_outport(&format!("src_{}", name), ty);
                block.connect(ports, name, src).unwrap();
                src
            })
            .collect()
    }

    #[test]
    fn test_switch() {
        let mut ports = PortArena::new();
        let sw = Switch::new("sw1", ValueType::Real, &mut ports).unwrap();
        assert_eq!(sw.inport_names(), vec!["on", "off", "sw"]);
        let src = drive(&mut ports, &sw);
        let y = sw.outport("y").unwrap();

        ports.set_value(src[0], Value::Real(10.0)).unwrap();
        ports.set_value(src[1], Value::Real(20.0)).unwrap();

        ports.set_value(src[2], Value::Bool(true)).unwrap();
        sw.compute(&mut ports).unwrap();
        assert_eq!(ports.value(y), Ok(Value::Real(10.0)));

        ports.set_value(src[2], Value::Bool(false)).unwrap();
        sw.compute(&mut ports).unwrap();
        assert_eq!(ports.value(y), Ok(Value::Real(20.0)));
    }

    #[test]
    fn test_switch_control_must_be_boolean() {
        let mut ports = PortArena::new();
        let sw = Switch::new("sw1", ValueType::Integer, &mut ports).unwrap();
        let control = ports.add_outport("ctl", ValueType::Integer);
        let err = sw.connect(&mut ports, "sw", control).unwrap_err();
        assert!(matches!(err, SimError::TypeMismatch { .. }));
    }

    #[test]
    fn test_logical_truth_tables() {
        let cases = [
            (LogicalOp::And, [false, false, false, true]),
            (LogicalOp::Or, [false, true, true, true]),
            (LogicalOp::Xor, [false, true, true, false]),
        ];
        for (op, expected) in cases {
            let mut ports = PortArena::new();
            let block = Logical::new("l", op, &mut ports).unwrap();
            let src = drive(&mut ports, &block);
            let y = block.outport("y").unwrap();
            let inputs = [(false, false), (false, true), (true, false), (true, true)];
            for ((a, b), want) in inputs.into_iter().zip(expected) {
                ports.set_value(src[0], Value::Bool(a)).unwrap();
                ports.set_value(src[1], Value::Bool(b)).unwrap();
                block.compute(&mut ports).unwrap();
                assert_eq!(ports.value(y), Ok(Value::Bool(want)), "{} {} {}", a, op, b);
            }
        }
    }

    #[test]
    fn test_logical_unknown_token() {
        let mut ports = PortArena::new();
        let err = Logical::parse("l", "nand", &mut ports).unwrap_err();
        assert!(matches!(err, SimError::InvalidConfiguration { .. }));
        assert_eq!(Logical::parse("l", "xor", &mut ports).unwrap().op(), LogicalOp::Xor);
    }

    #[test]
    fn test_relational_less_equal_is_distinct() {
        let mut ports = PortArena::new();
        let lt = Relational::parse("lt", ValueType::Real, "<", &mut ports).unwrap();
        let le = Relational::parse("le", ValueType::Real, "<=", &mut ports).unwrap();
        let a = ports.add_outport("a", ValueType::Real);
        let b = ports.add_outport("b", ValueType::Real);
        for block in [&lt, &le] {
            block.connect(&mut ports, "u0", a).unwrap();
            block.connect(&mut ports, "u1", b).unwrap();
        }

        ports.set_value(a, Value::Real(1.0)).unwrap();
        ports.set_value(b, Value::Real(1.0)).unwrap();
        lt.compute(&mut ports).unwrap();
        le.compute(&mut ports).unwrap();
        assert_eq!(ports.value(lt.outport("y").unwrap()), Ok(Value::Bool(false)));
        assert_eq!(ports.value(le.outport("y").unwrap()), Ok(Value::Bool(true)));
    }

    #[test]
    fn test_relational_operators() {
        let pairs = [(1_i64, 2_i64), (2, 2), (3, 2)];
        let table = [
            (RelationalOp::Greater, [false, false, true]),
            (RelationalOp::GreaterEqual, [false, true, true]),
            (RelationalOp::Less, [true, false, false]),
            (RelationalOp::LessEqual, [true, true, false]),
        ];
        for (op, expected) in table {
            for ((a, b), want) in pairs.into_iter().zip(expected) {
                assert_eq!(op.apply(Value::Int(a), Value::Int(b)), want, "{} {} {}", a, op, b);
            }
        }
    }

    #[test]
    fn test_relational_unknown_token() {
        let mut ports = PortArena::new();
        let err = Relational::parse("r", ValueType::Real, "==", &mut ports).unwrap_err();
        assert!(matches!(err, SimError::InvalidConfiguration { .. }));
    }
}
