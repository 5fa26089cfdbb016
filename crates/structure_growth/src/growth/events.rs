//! Event types and sinks for observing growth runs.
//!
//! This module defines [`GrowthEvent`] and a set of sinks and adapters to emit, collect,
//! or forward events while a [`crate::growth::runner::GrowthRunner`] grows a layout.
//! Sinks report which [`GrowthEventKind`]s they want so that unused events are never built.
use glam::IVec3;

use crate::geometry::Rotation;
use crate::growth::node::{ConnectorOutcome, Placability};
use crate::growth::runner::{PlacedStructure, RunConfig};

/// Describes events emitted while growing.
#[non_exhaustive]
#[derive(Debug, Clone)]
pub enum GrowthEvent {
    /// Emitted when a run starts.
    RunStarted {
        /// The run configuration used.
        config: RunConfig,
        /// Name of the starting template.
        prototype: String,
        /// Requested starting position.
        position: IVec3,
    },

    /// Emitted when a run finishes, placed or not.
    RunFinished {
        /// Number of committed structures.
        placed: usize,
        /// Budget spent during the run.
        spent: f64,
        /// Budget left afterwards.
        remaining: f64,
    },

    /// Emitted after a trial node was evaluated.
    CandidateEvaluated {
        /// Template of the candidate.
        prototype: String,
        /// World position of the candidate.
        position: IVec3,
        rotation: Rotation,
        /// Evaluation outcome.
        placability: Placability,
    },

    /// Emitted once per connector after it was resolved.
    ConnectorResolved {
        /// Template of the node owning the connector.
        prototype: String,
        /// Index of the connector in the template's connector list.
        connector: usize,
        outcome: ConnectorOutcome,
    },

    /// Emitted when a structure was committed to the world.
    NodeCommitted {
        placement: PlacedStructure,
    },

    /// Emitted when a transition piece was stamped into a node.
    TransitionPlaced {
        prototype: String,
        position: IVec3,
        rotation: Rotation,
    },

    /// Emitted when a decoration was placed.
    DecorationPlaced {
        prototype: String,
        position: IVec3,
        rotation: Rotation,
        /// Containers that received an inventory.
        containers_filled: usize,
    },

    /// Non-fatal warning generated while growing.
    Warning {
        /// Context string (e.g. template name).
        context: String,
        /// Human-readable message.
        message: String,
    },
}

/// Discriminant of [`GrowthEvent`], used for filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GrowthEventKind {
    RunStarted,
    RunFinished,
    CandidateEvaluated,
    ConnectorResolved,
    NodeCommitted,
    TransitionPlaced,
    DecorationPlaced,
    Warning,
}

impl GrowthEvent {
    pub fn kind(&self) -> GrowthEventKind {
        match self {
            GrowthEvent::RunStarted { .. } => GrowthEventKind::RunStarted,
            GrowthEvent::RunFinished { .. } => GrowthEventKind::RunFinished,
            GrowthEvent::CandidateEvaluated { .. } => GrowthEventKind::CandidateEvaluated,
            GrowthEvent::ConnectorResolved { .. } => GrowthEventKind::ConnectorResolved,
            GrowthEvent::NodeCommitted { .. } => GrowthEventKind::NodeCommitted,
            GrowthEvent::TransitionPlaced { .. } => GrowthEventKind::TransitionPlaced,
            GrowthEvent::DecorationPlaced { .. } => GrowthEventKind::DecorationPlaced,
            GrowthEvent::Warning { .. } => GrowthEventKind::Warning,
        }
    }
}

/// A generic event sink that accepts [`GrowthEvent`]s.
pub trait EventSink {
    fn send(&mut self, event: GrowthEvent);

    /// Whether events of `kind` should be built and sent at all.
    fn wants(&self, _kind: GrowthEventKind) -> bool {
        true
    }

    fn send_many<I>(&mut self, events: I)
    where
        Self: Sized,
        I: IntoIterator<Item = GrowthEvent>,
    {
        for e in events {
            self.send(e);
        }
    }
}

/// A no-op event sink.
impl EventSink for () {
    #[inline]
    fn send(&mut self, _event: GrowthEvent) {}

    #[inline]
    fn wants(&self, _kind: GrowthEventKind) -> bool {
        false
    }
}

/// An event sink that forwards to a user-provided closure.
pub struct FnSink<F>
where
    F: FnMut(GrowthEvent),
{
    f: F,
}

impl<F> FnSink<F>
where
    F: FnMut(GrowthEvent),
{
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F> EventSink for FnSink<F>
where
    F: FnMut(GrowthEvent),
{
    #[inline]
    fn send(&mut self, event: GrowthEvent) {
        (self.f)(event);
    }
}

/// An event sink that collects events in a `Vec`, optionally only some kinds.
#[derive(Default)]
pub struct VecSink {
    events: Vec<GrowthEvent>,
    only: Option<Vec<GrowthEventKind>>,
}

impl VecSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collects only events of the listed kinds.
    pub fn only(kinds: impl IntoIterator<Item = GrowthEventKind>) -> Self {
        Self {
            events: Vec::new(),
            only: Some(kinds.into_iter().collect()),
        }
    }

    pub fn into_inner(self) -> Vec<GrowthEvent> {
        self.events
    }

    pub fn as_slice(&self) -> &[GrowthEvent] {
        &self.events
    }

    pub fn count(&self, kind: GrowthEventKind) -> usize {
        self.events.iter().filter(|e| e.kind() == kind).count()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl EventSink for VecSink {
    #[inline]
    fn send(&mut self, event: GrowthEvent) {
        if self.wants(event.kind()) {
            self.events.push(event);
        }
    }

    fn wants(&self, kind: GrowthEventKind) -> bool {
        self.only.as_ref().is_none_or(|kinds| kinds.contains(&kind))
    }
}

/// Fan-out sink that forwards each event to all contained sinks that want it.
pub struct MultiSink<S: EventSink> {
    pub(crate) sinks: Vec<S>,
}

impl<S: EventSink> MultiSink<S> {
    pub fn new() -> Self {
        Self { sinks: Vec::new() }
    }

    pub fn with_sinks(sinks: Vec<S>) -> Self {
        Self { sinks }
    }

    pub fn push(&mut self, sink: S) {
        self.sinks.push(sink);
    }

    pub fn into_sinks(self) -> Vec<S> {
        self.sinks
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }
}

impl<S: EventSink> Default for MultiSink<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: EventSink> EventSink for MultiSink<S> {
    fn send(&mut self, event: GrowthEvent) {
        let kind = event.kind();
        let targets: Vec<usize> = (0..self.sinks.len())
            .filter(|i| self.sinks[*i].wants(kind))
            .collect();
        let Some((&last, rest)) = targets.split_last() else {
            return;
        };
        for &i in rest {
            self.sinks[i].send(event.clone());
        }
        self.sinks[last].send(event);
    }

    fn wants(&self, kind: GrowthEventKind) -> bool {
        self.sinks.iter().any(|s| s.wants(kind))
    }
}
