//! Evaluación de grafos contra un store de metadata.

mod resolver;
mod value;

pub use resolver::Resolver;
pub use value::NodeValue;
