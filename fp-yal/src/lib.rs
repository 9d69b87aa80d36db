//! Parser for the YAL macro-cell description format.
//!
//! A YAL file is a list of `MODULE ... ENDMODULE;` blocks. Exactly one module
//! has `TYPE PARENT`; its `NETWORK` section instantiates the others. Each
//! non-parent module's footprint is the bounding box of its `DIMENSIONS`
//! vertices.

use fp_types::{Dim, Net};
use rustc_hash::FxHashMap;

mod lex;
mod parse;

pub use parse::parse;

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ParseError {
    #[error("line {line}: unexpected end of input")]
    UnexpectedEof { line: u32 },
    #[error("line {line}: unexpected {found}, expected {expected}")]
    Unexpected {
        line: u32,
        found: String,
        expected: &'static str,
    },
    #[error("line {line}: unknown {what} {name:?}")]
    UnknownKeyword {
        line: u32,
        what: &'static str,
        name: String,
    },
    #[error("no module with TYPE PARENT")]
    NoParent,
    #[error("more than one module with TYPE PARENT")]
    MultipleParents,
    #[error("conflicting module name: {0}")]
    DuplicateModule(String),
    #[error("instance {instance} references undefined module {module}")]
    UndefinedModule { instance: String, module: String },
    #[error("parent module network is empty")]
    EmptyNetwork,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ModuleKind {
    Standard,
    Pad,
    General,
    Parent,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TerminalKind {
    /// `B`
    Bidirectional,
    /// `PI`
    PadInput,
    /// `PO`
    PadOutput,
    /// `PB`
    PadBidirectional,
    /// `F`
    Feedthrough,
    /// `PWR`
    Power,
    /// `GND`
    Ground,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LayerKind {
    PDiff,
    NDiff,
    Poly,
    Metal1,
    Metal2,
}

/// One `IOLIST` entry.
#[derive(Clone, Debug, PartialEq)]
pub struct Signal {
    pub name: String,
    pub terminal: TerminalKind,
    pub x: Dim,
    pub y: Dim,
    pub width: Dim,
    pub layer: LayerKind,
    pub current: Option<f64>,
    pub voltage: Option<f64>,
}

/// One `NETWORK` entry: an instance of a module with its signal bindings.
#[derive(Clone, Debug, PartialEq)]
pub struct NetworkEntry {
    pub instance: String,
    pub module: String,
    pub signals: Vec<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Module {
    pub name: String,
    pub kind: ModuleKind,
    pub xpos: Vec<Dim>,
    pub ypos: Vec<Dim>,
    pub iolist: Vec<Signal>,
    pub network: Vec<NetworkEntry>,
}

impl Module {
    /// Width of the DIMENSIONS bounding box; 0 without vertices.
    pub fn xspan(&self) -> Dim {
        span(&self.xpos)
    }

    /// Height of the DIMENSIONS bounding box; 0 without vertices.
    pub fn yspan(&self) -> Dim {
        span(&self.ypos)
    }
}

fn span(v: &[Dim]) -> Dim {
    match (v.iter().max(), v.iter().min()) {
        (Some(max), Some(min)) => max - min,
        _ => 0,
    }
}

/// A parsed YAL file: the placeable modules and the parent that instantiates
/// them.
#[derive(Clone, Debug, PartialEq)]
pub struct Design {
    pub modules: Vec<Module>,
    pub parent: Module,
}

impl Design {
    /// Map each network entry of the parent to the index of the module it
    /// instantiates.
    pub fn resolve_instances(&self) -> Result<Vec<usize>, ParseError> {
        let mut by_name = FxHashMap::default();
        by_name.reserve(self.modules.len());
        for (k, m) in self.modules.iter().enumerate() {
            if by_name.insert(m.name.as_str(), k).is_some() {
                return Err(ParseError::DuplicateModule(m.name.clone()));
            }
        }
        if self.parent.network.is_empty() {
            return Err(ParseError::EmptyNetwork);
        }
        let mut index = Vec::with_capacity(self.parent.network.len());
        for entry in &self.parent.network {
            match by_name.get(entry.module.as_str()) {
                Some(&k) => index.push(k),
                None => {
                    return Err(ParseError::UndefinedModule {
                        instance: entry.instance.clone(),
                        module: entry.module.clone(),
                    })
                }
            }
        }
        Ok(index)
    }

    /// Sizes of the placed instances, in network order.
    pub fn instance_sizes(&self, index: &[usize]) -> Vec<(Dim, Dim)> {
        index
            .iter()
            .map(|&k| (self.modules[k].xspan(), self.modules[k].yspan()))
            .collect()
    }

    /// Reduce the parent network's signals to two-pin nets over instance
    /// indices: consecutive instances listing the same signal are chained,
    /// so a signal on k instances contributes k-1 nets. Power and ground
    /// rails are skipped.
    pub fn derive_nets(&self) -> Vec<Net> {
        let mut last_seen: FxHashMap<&str, usize> = FxHashMap::default();
        let mut nets = Vec::new();
        for (i, entry) in self.parent.network.iter().enumerate() {
            for signal in &entry.signals {
                if is_supply_rail(signal) {
                    continue;
                }
                match last_seen.insert(signal.as_str(), i) {
                    Some(j) if j != i => nets.push(Net::new(j, i)),
                    _ => {}
                }
            }
        }
        nets
    }
}

fn is_supply_rail(name: &str) -> bool {
    name.eq_ignore_ascii_case("VDD")
        || name.eq_ignore_ascii_case("VSS")
        || name.eq_ignore_ascii_case("GND")
        || name.eq_ignore_ascii_case("PWR")
}
