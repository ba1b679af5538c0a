//! Mock prop synthesis for component previews.
//!
//! A component's declared props arrive as a [`ir::PropertyBag`] (built from
//! JSON type descriptions or type checker text via [`typetext`]); the
//! [`synth::Synthesizer`] turns each declared type into a representative
//! sample value so the component can be rendered without real data.
pub mod cli;
pub mod config;
pub mod ir;
pub mod jq_exec;
pub mod path_de;
pub mod strgen;
pub mod synth;
pub mod typetext;

pub use config::SynthConfig;
pub use ir::{PropertyBag, TypeDesc};
pub use synth::{Synthesizer, UnionPolicy};
