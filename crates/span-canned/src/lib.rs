//! span-canned: API declarativa para construir grafos de resolución con
//! funciones canned (ventanas por span, linaje de entrenamiento, evaluación).
pub mod builder;
pub mod channel;
pub mod functions;

pub use builder::InputBuilder;
pub use channel::Channel;
