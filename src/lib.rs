//! Parametric photonic integrated circuit layout.
//!
//! Components (waveguides, tapers, bends, couplers, resonators, splitters,
//! gratings, spirals) are built from a shared [`WaveguideTemplate`] and an input
//! [`Port`], and expose their output ports so the next component can be
//! chained onto them. Finished components are collected in a
//! [`LayoutDocument`].

pub mod component;
pub mod error;
pub mod geometry;
pub mod layout;
pub mod math;
pub mod port;
pub mod template;

pub use component::Component;
pub use error::{PicError, Result};
pub use layout::LayoutDocument;
pub use port::{Direction, Parity, Port, PortMap};
pub use template::{MetalTemplate, TemplateOptions, WaveguideTemplate};
