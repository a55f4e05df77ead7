//! Builder declarativo de contextos de resolución.
//!
//! ```ignore
//! let mut b = InputBuilder::new();
//! let examples = b.artifact_query("Examples")?;
//! let window = b.rolling_range(&examples, params)?;
//! b.bind("examples", &window)?;
//! let ctx = b.build()?;
//! ```

use std::sync::atomic::{AtomicU64, Ordering};

use indexmap::IndexMap;
use log::debug;
use span_core::graph::OperatorGraph;
use span_core::model::ArtifactQuery;
use span_core::resolution::{ResolutionContext, SlotBinding};
use span_core::ResolveError;

use crate::Channel;

static NEXT_BUILDER_ID: AtomicU64 = AtomicU64::new(1);

#[derive(Debug, Clone)]
pub struct InputBuilder {
    id: u64,
    pub(crate) graph: OperatorGraph,
    slots: IndexMap<String, SlotBinding>,
}

impl Default for InputBuilder {
    fn default() -> Self {
        Self { id: NEXT_BUILDER_ID.fetch_add(1, Ordering::Relaxed),
               graph: OperatorGraph::new(),
               slots: IndexMap::new() }
    }
}

impl InputBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn id(&self) -> u64 {
        self.id
    }

    /// Rechaza canales creados por otro builder.
    pub(crate) fn check_owned(&self, channel: &Channel) -> Result<(), ResolveError> {
        if channel.builder() != self.id || self.graph.node(channel.node()).is_none() {
            return Err(ResolveError::InvalidArgument(format!("channel for node {} belongs to another builder",
                                                             channel.node())));
        }
        Ok(())
    }

    pub fn graph(&self) -> &OperatorGraph {
        &self.graph
    }

    /// Artifacts `LIVE` del tipo dado.
    pub fn artifact_query(&mut self, type_name: &str) -> Result<Channel, ResolveError> {
        self.query(ArtifactQuery::of_type(type_name))
    }

    pub fn query(&mut self, query: ArtifactQuery) -> Result<Channel, ResolveError> {
        let type_name = query.type_name.clone();
        let node = self.graph.add_input(query)?;
        Ok(Channel::input(self.id, node, &type_name))
    }

    /// Enlaza un slot; obligatorio salvo que el canal acepte vacíos.
    pub fn bind(&mut self, slot: &str, channel: &Channel) -> Result<(), ResolveError> {
        let min_count = usize::from(!channel.allows_empty());
        self.bind_with_min_count(slot, channel, min_count)
    }

    pub fn bind_with_min_count(&mut self, slot: &str, channel: &Channel, min_count: usize) -> Result<(), ResolveError> {
        self.check_owned(channel)?;
        if self.slots.contains_key(slot) {
            return Err(ResolveError::InvalidArgument(format!("slot '{slot}' is already bound")));
        }
        let mut binding = SlotBinding::required(channel.node()).with_min_count(min_count);
        if let Some(invocation) = channel.invocation() {
            binding = binding.with_invocation(invocation.clone());
        }
        debug!("bind slot={slot} node={} min_count={min_count}", channel.node());
        self.slots.insert(slot.to_string(), binding);
        Ok(())
    }

    /// Enlaza cada entrada de un mapa slot → canal.
    pub fn bind_all(&mut self, channels: &IndexMap<String, Channel>) -> Result<(), ResolveError> {
        for (slot, channel) in channels {
            self.bind(slot, channel)?;
        }
        Ok(())
    }

    pub fn build(self) -> Result<ResolutionContext, ResolveError> {
        let mut context = ResolutionContext::new(self.graph);
        for (slot, binding) in self.slots {
            context.bind(slot, binding)?;
        }
        context.validate()?;
        Ok(context)
    }
}
