//! Gate descriptors and their builder.

use std::fmt;
use std::sync::Arc;

use ketgrid_kernel::{GatherFn, Kernel, KernelContext, KernelResult};
use ketgrid_math::Matrix;

use crate::error::{GateError, GateResult};
use crate::validate;

/// Largest span a single gate may cover.
pub const MAX_GATE_SPAN: usize = 16;

/// Declared permutation `f(x, inputs) -> x'` over the target wires.
///
/// Unlike [`GatherFn`], this maps an input value forward to where it ends up.
pub type PermutationFn = Arc<dyn Fn(u64, &[u64]) -> u64 + Send + Sync>;

/// Declared matrix as a function of the cycle fraction `t` in `[0, 1)`.
pub type TimeMatrixFn = Arc<dyn Fn(f64) -> Matrix + Send + Sync>;

/// Produces the executable kernel for one placement.
pub type KernelProvider = Arc<dyn Fn(&KernelContext) -> KernelResult<Kernel> + Send + Sync>;

/// What a gate's body does within its column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateRole {
    /// Transforms the state on its target wires.
    Operation,
    /// Conditions every operation in the column on the wire's value.
    Control {
        /// `true` for a control (•), `false` for an anti-control (◦).
        desired: bool,
    },
    /// Marks its wires as an input register for the column.
    Input {
        /// Register key.
        key: char,
    },
    /// Projects the state onto a subspace without renormalizing.
    PostSelection,
}

impl GateRole {
    /// Whether gates with this role contribute a kernel.
    pub fn acts_on_state(&self) -> bool {
        matches!(self, Self::Operation | Self::PostSelection)
    }
}

/// The declared mathematical effect of a gate.
#[derive(Clone)]
pub enum GateEffect {
    /// A fixed matrix over the target wires.
    Matrix(Matrix),
    /// A permutation of target values, parametrized by input registers.
    Permutation(PermutationFn),
    /// A matrix that depends on the animation cycle.
    TimeMatrix(TimeMatrixFn),
    /// No declared effect (controls, inputs).
    None,
}

impl GateEffect {
    /// Matrix at cycle fraction `time`, for matrix-valued effects.
    pub fn matrix_at(&self, time: f64) -> Option<Matrix> {
        match self {
            Self::Matrix(m) => Some(m.clone()),
            Self::TimeMatrix(f) => Some(f(time)),
            Self::Permutation(_) | Self::None => None,
        }
    }

    /// Short name of the variant.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Matrix(_) => "matrix",
            Self::Permutation(_) => "permutation",
            Self::TimeMatrix(_) => "time-matrix",
            Self::None => "none",
        }
    }
}

impl fmt::Debug for GateEffect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Matrix(m) => write!(f, "Matrix({m})"),
            other => write!(f, "{}", other.kind()),
        }
    }
}

/// Membership of a gate in a span-parametrized family.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FamilyTag {
    /// Id of the family, e.g. `"*A"`.
    pub base: String,
    /// Span parameter of this member.
    pub span: usize,
}

/// An immutable, validated gate descriptor.
///
/// The only way to obtain one is [`GateBuilder::build`], which cross-checks
/// the declared effect against the kernel.
#[derive(Clone)]
pub struct Gate {
    serialized_id: String,
    symbol: String,
    title: String,
    blurb: String,
    span: usize,
    role: GateRole,
    effect: GateEffect,
    kernel: Option<KernelProvider>,
    required_inputs: Vec<char>,
    alternate: Option<String>,
    family: Option<FamilyTag>,
}

impl Gate {
    /// Stable serialization key.
    pub fn serialized_id(&self) -> &str {
        &self.serialized_id
    }

    /// Display symbol.
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Display title.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Display description.
    pub fn blurb(&self) -> &str {
        &self.blurb
    }

    /// Number of contiguous wires the gate body covers.
    pub fn span(&self) -> usize {
        self.span
    }

    /// What the gate does within its column.
    pub fn role(&self) -> GateRole {
        self.role
    }

    /// Declared mathematical effect.
    pub fn effect(&self) -> &GateEffect {
        &self.effect
    }

    /// Input register keys the gate reads.
    pub fn required_inputs(&self) -> &[char] {
        &self.required_inputs
    }

    /// Serialized id of the gate sharing this gate's toolbox slot.
    pub fn alternate_id(&self) -> Option<&str> {
        self.alternate.as_deref()
    }

    /// Family membership, for span-parametrized gates.
    pub fn family(&self) -> Option<&FamilyTag> {
        self.family.as_ref()
    }

    /// Whether the effect depends on the animation cycle.
    pub fn is_time_dependent(&self) -> bool {
        matches!(self.effect, GateEffect::TimeMatrix(_))
    }

    /// Whether the gate is a control or anti-control.
    pub fn is_control(&self) -> bool {
        matches!(self.role, GateRole::Control { .. })
    }

    /// Compile the kernel for a placement.
    ///
    /// Gates that do not act on the state yield the identity kernel.
    pub fn kernel(&self, ctx: &KernelContext) -> KernelResult<Kernel> {
        match &self.kernel {
            Some(provider) => provider(ctx),
            None => Ok(Kernel::identity()),
        }
    }

    pub(crate) fn has_kernel(&self) -> bool {
        self.kernel.is_some()
    }
}

impl fmt::Debug for Gate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Gate")
            .field("serialized_id", &self.serialized_id)
            .field("span", &self.span)
            .field("role", &self.role)
            .field("effect", &self.effect)
            .field("required_inputs", &self.required_inputs)
            .field("alternate", &self.alternate)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for Gate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.serialized_id)
    }
}

/// Builder for [`Gate`].
///
/// ```rust
/// use std::sync::Arc;
/// use ketgrid_gates::GateBuilder;
/// use ketgrid_kernel::{Kernel, KernelContext};
/// use ketgrid_math::Matrix;
///
/// let not = GateBuilder::new()
///     .serialized_id_and_symbol("X")
///     .known_matrix(Matrix::pauli_x())
///     .kernel(Arc::new(|ctx: &KernelContext| {
///         Kernel::permutation(ctx, Arc::new(|t: u64, _: &[u64]| 1 - t))
///     }))
///     .build()
///     .unwrap();
/// assert_eq!(not.serialized_id(), "X");
/// ```
#[derive(Clone)]
pub struct GateBuilder {
    serialized_id: Option<String>,
    symbol: Option<String>,
    title: String,
    blurb: String,
    span: usize,
    role: GateRole,
    effect: GateEffect,
    kernel: Option<KernelProvider>,
    required_inputs: Vec<char>,
    alternate: Option<String>,
    family: Option<FamilyTag>,
}

impl GateBuilder {
    /// Start a single-wire operation gate with no effect.
    pub fn new() -> Self {
        Self {
            serialized_id: None,
            symbol: None,
            title: String::new(),
            blurb: String::new(),
            span: 1,
            role: GateRole::Operation,
            effect: GateEffect::None,
            kernel: None,
            required_inputs: Vec::new(),
            alternate: None,
            family: None,
        }
    }

    /// Set the serialization key.
    #[must_use]
    pub fn serialized_id(mut self, id: impl Into<String>) -> Self {
        self.serialized_id = Some(id.into());
        self
    }

    /// Set the serialization key and use it as the symbol too.
    #[must_use]
    pub fn serialized_id_and_symbol(self, id: impl Into<String>) -> Self {
        let id = id.into();
        self.symbol(id.clone()).serialized_id(id)
    }

    /// Set the display symbol.
    #[must_use]
    pub fn symbol(mut self, symbol: impl Into<String>) -> Self {
        self.symbol = Some(symbol.into());
        self
    }

    /// Set the display title.
    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Set the display description.
    #[must_use]
    pub fn blurb(mut self, blurb: impl Into<String>) -> Self {
        self.blurb = blurb.into();
        self
    }

    /// Set the number of target wires.
    #[must_use]
    pub fn span(mut self, span: usize) -> Self {
        self.span = span;
        self
    }

    /// Set the role.
    #[must_use]
    pub fn role(mut self, role: GateRole) -> Self {
        self.role = role;
        self
    }

    /// Declare a fixed matrix effect.
    #[must_use]
    pub fn known_matrix(mut self, matrix: Matrix) -> Self {
        self.effect = GateEffect::Matrix(matrix);
        self
    }

    /// Declare a permutation effect.
    #[must_use]
    pub fn known_permutation(
        mut self,
        f: impl Fn(u64, &[u64]) -> u64 + Send + Sync + 'static,
    ) -> Self {
        self.effect = GateEffect::Permutation(Arc::new(f));
        self
    }

    /// Declare a time-dependent matrix effect.
    #[must_use]
    pub fn known_time_matrix(mut self, f: impl Fn(f64) -> Matrix + Send + Sync + 'static) -> Self {
        self.effect = GateEffect::TimeMatrix(Arc::new(f));
        self
    }

    /// Set the kernel provider.
    #[must_use]
    pub fn kernel(mut self, provider: KernelProvider) -> Self {
        self.kernel = Some(provider);
        self
    }

    /// Use a general kernel built from `f(time)` for every placement.
    #[must_use]
    pub fn matrix_kernel(self, f: impl Fn(f64) -> Matrix + Send + Sync + 'static) -> Self {
        self.kernel(Arc::new(move |ctx: &KernelContext| {
            Kernel::general(ctx, f(ctx.time))
        }))
    }

    /// Use a permutation kernel with `gather`, reading the required inputs.
    #[must_use]
    pub fn permutation_kernel(mut self, gather: GatherFn) -> Self {
        let keys = self.required_inputs.clone();
        self.kernel = Some(Arc::new(move |ctx: &KernelContext| {
            Kernel::permutation_with_inputs(ctx, &keys, Arc::clone(&gather))
        }));
        self
    }

    /// Require input register `key`. Call before
    /// [`permutation_kernel`](Self::permutation_kernel).
    #[must_use]
    pub fn required_input(mut self, key: char) -> Self {
        if !self.required_inputs.contains(&key) {
            self.required_inputs.push(key);
        }
        self
    }

    /// Pair with the gate `id` in the same toolbox slot.
    #[must_use]
    pub fn alternate(mut self, id: impl Into<String>) -> Self {
        self.alternate = Some(id.into());
        self
    }

    /// Mark as member `span` of family `base`.
    #[must_use]
    pub fn family(mut self, base: impl Into<String>, span: usize) -> Self {
        self.family = Some(FamilyTag {
            base: base.into(),
            span,
        });
        self
    }

    /// Finish and validate the gate.
    pub fn build(self) -> GateResult<Gate> {
        let serialized_id = self.serialized_id.ok_or(GateError::MissingSerializedId)?;
        let gate = Gate {
            symbol: self.symbol.unwrap_or_else(|| serialized_id.clone()),
            serialized_id,
            title: self.title,
            blurb: self.blurb,
            span: self.span,
            role: self.role,
            effect: self.effect,
            kernel: self.kernel,
            required_inputs: self.required_inputs,
            alternate: self.alternate,
            family: self.family,
        };
        validate::check_gate(&gate)?;
        Ok(gate)
    }
}

impl Default for GateBuilder {
    fn default() -> Self {
        Self::new()
    }
}
