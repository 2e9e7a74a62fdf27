//! Span-parametrized gate families.

use std::ops::RangeInclusive;

use tracing::debug;

use crate::error::GateResult;
use crate::gate::{Gate, GateBuilder};

/// A group of gates generated from one definition, one member per span.
///
/// Every member is built and validated independently; a single failing
/// member fails the whole family.
#[derive(Debug, Clone)]
pub struct GateFamily {
    base: String,
    members: Vec<Gate>,
}

impl GateFamily {
    /// Build members for every span in `spans`.
    ///
    /// `define` receives the span and a builder already set to that span and
    /// tagged with the family.
    pub fn build(
        base: impl Into<String>,
        spans: RangeInclusive<usize>,
        define: impl Fn(usize, GateBuilder) -> GateBuilder,
    ) -> GateResult<Self> {
        let base = base.into();
        let members = spans
            .map(|span| {
                let builder = GateBuilder::new().span(span).family(base.clone(), span);
                define(span, builder).build()
            })
            .collect::<GateResult<Vec<_>>>()?;
        debug!(family = %base, members = members.len(), "built gate family");
        Ok(Self { base, members })
    }

    /// Build a family whose members pair with the equal-span members of
    /// `other`.
    pub fn build_alternate_of(
        other: &GateFamily,
        base: impl Into<String>,
        spans: RangeInclusive<usize>,
        define: impl Fn(usize, GateBuilder) -> GateBuilder,
    ) -> GateResult<Self> {
        Self::build(base, spans, |span, builder| {
            let builder = match other.member(span) {
                Some(partner) => builder.alternate(partner.serialized_id()),
                None => builder,
            };
            define(span, builder)
        })
    }

    /// Family id.
    pub fn base(&self) -> &str {
        &self.base
    }

    /// Member with the given span.
    pub fn member(&self, span: usize) -> Option<&Gate> {
        self.members.iter().find(|g| g.span() == span)
    }

    /// All members, ordered by span.
    pub fn members(&self) -> &[Gate] {
        &self.members
    }

    /// Number of members.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Whether the family has no members.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Consume the family, yielding its members.
    pub fn into_members(self) -> Vec<Gate> {
        self.members
    }
}
