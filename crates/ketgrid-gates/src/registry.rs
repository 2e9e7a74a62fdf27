//! Serialized-id lookup table for gates.

use std::sync::Arc;

use rustc_hash::FxHashMap;
use tracing::debug;

use crate::error::{GateError, GateResult};
use crate::family::GateFamily;
use crate::gate::Gate;
use crate::sets;

/// Mapping from serialized id to gate, with alternate pairings and families.
///
/// Ids are the circuit text format: changing one is a breaking change.
#[derive(Debug, Default, Clone)]
pub struct GateRegistry {
    gates: FxHashMap<String, Arc<Gate>>,
    order: Vec<String>,
    alternates: FxHashMap<String, String>,
    families: FxHashMap<String, Vec<String>>,
}

impl GateRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding every built-in gate.
    pub fn standard() -> GateResult<Self> {
        let mut registry = Self::new();
        for gate in sets::half_turn::all()? {
            registry.register(gate)?;
        }
        for gate in sets::quarter_turn::all()? {
            registry.register(gate)?;
        }
        for gate in sets::controls::all()? {
            registry.register(gate)?;
        }
        for gate in sets::post_selection::all()? {
            registry.register(gate)?;
        }
        registry.register_family(sets::inputs::input_a_family()?)?;
        let (times, divide) = sets::multiplication::families()?;
        registry.register_family(times)?;
        registry.register_family(divide)?;
        for gate in sets::spinning::all()? {
            registry.register(gate)?;
        }
        registry.check_alternates()?;
        debug!(gates = registry.len(), "standard gate registry ready");
        Ok(registry)
    }

    /// Add a validated gate.
    pub fn register(&mut self, gate: Gate) -> GateResult<Arc<Gate>> {
        let id = gate.serialized_id().to_string();
        if self.gates.contains_key(&id) {
            return Err(GateError::DuplicateId(id));
        }
        if let Some(alt) = gate.alternate_id() {
            self.pair(&id, alt)?;
        }
        if let Some(tag) = gate.family() {
            self.families
                .entry(tag.base.clone())
                .or_default()
                .push(id.clone());
        }
        debug!(gate = %id, span = gate.span(), "registered gate");
        let gate = Arc::new(gate);
        self.gates.insert(id.clone(), Arc::clone(&gate));
        self.order.push(id);
        Ok(gate)
    }

    /// Add every member of a family.
    pub fn register_family(&mut self, family: GateFamily) -> GateResult<()> {
        for gate in family.into_members() {
            self.register(gate)?;
        }
        Ok(())
    }

    fn pair(&mut self, id: &str, alt: &str) -> GateResult<()> {
        for (a, b) in [(id, alt), (alt, id)] {
            if let Some(existing) = self.alternates.get(a) {
                if existing != b {
                    return Err(GateError::AlternateConflict {
                        id: a.to_string(),
                        requested: b.to_string(),
                        existing: existing.clone(),
                    });
                }
            }
        }
        self.alternates.insert(id.to_string(), alt.to_string());
        self.alternates.insert(alt.to_string(), id.to_string());
        Ok(())
    }

    /// Verify every recorded alternate names a registered gate.
    pub fn check_alternates(&self) -> GateResult<()> {
        match self.alternates.keys().find(|id| !self.gates.contains_key(*id)) {
            Some(missing) => Err(GateError::UnknownGate(missing.clone())),
            None => Ok(()),
        }
    }

    /// Gate with serialized id `id`.
    pub fn get(&self, id: &str) -> Option<Arc<Gate>> {
        self.gates.get(id).cloned()
    }

    /// Gate with serialized id `id`, or [`GateError::UnknownGate`].
    pub fn resolve(&self, id: &str) -> GateResult<Arc<Gate>> {
        self.get(id)
            .ok_or_else(|| GateError::UnknownGate(id.to_string()))
    }

    /// Whether `id` is registered.
    pub fn contains(&self, id: &str) -> bool {
        self.gates.contains_key(id)
    }

    /// The gate paired with `id`, in either direction.
    pub fn alternate_of(&self, id: &str) -> Option<Arc<Gate>> {
        self.alternates.get(id).and_then(|alt| self.get(alt))
    }

    /// Members of family `base`, in registration order.
    pub fn family_members(&self, base: &str) -> Vec<Arc<Gate>> {
        self.families
            .get(base)
            .map(|ids| ids.iter().filter_map(|id| self.get(id)).collect())
            .unwrap_or_default()
    }

    /// Registered ids, in registration order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    /// Registered gates, in registration order.
    pub fn gates(&self) -> impl Iterator<Item = &Arc<Gate>> {
        self.order.iter().filter_map(|id| self.gates.get(id))
    }

    /// Number of registered gates.
    pub fn len(&self) -> usize {
        self.gates.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.gates.is_empty()
    }
}
