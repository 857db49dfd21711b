//! Port definitions for module interfaces.
//!
//! A [`Port`] represents one signal in a module's external interface,
//! with a direction and the backing signal within the module.

use crate::ids::SignalId;
use crate::shape::Shape;
use phd_common::Ident;
use phd_source::Span;
use serde::{Deserialize, Serialize};

/// The direction of a port on a module boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PortDirection {
    /// An input port (`In(...)`), data flows into the module.
    Input,
    /// An output port (`Out(...)`), data flows out of the module.
    Output,
}

/// A port in a module's external interface.
///
/// Each port is backed by a [`SignalId`] inside the module, so references to
/// the port from the body resolve through the ordinary signal table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Port {
    /// The port name.
    pub name: Ident,
    /// The direction of data flow.
    pub direction: PortDirection,
    /// The port's shape (width, or memory width/depth).
    pub shape: Shape,
    /// The signal within the module that backs this port.
    pub signal: SignalId,
    /// The source span where this port was declared.
    pub span: Span,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dummy_port(dir: PortDirection) -> Port {
        Port {
            name: Ident::from_raw(1),
            direction: dir,
            shape: Shape::Bits(8),
            signal: SignalId::from_raw(0),
            span: Span::DUMMY,
        }
    }

    #[test]
    fn port_construction() {
        let p = dummy_port(PortDirection::Input);
        assert_eq!(p.direction, PortDirection::Input);
        assert_eq!(p.shape.width(), 8);
    }

    #[test]
    fn port_directions_distinct() {
        assert_ne!(PortDirection::Input, PortDirection::Output);
    }

    #[test]
    fn port_serde_roundtrip() {
        let p = dummy_port(PortDirection::Output);
        let json = serde_json::to_string(&p).unwrap();
        let restored: Port = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.direction, PortDirection::Output);
    }
}
