/// A non-fatal event recorded on the snapshot of the step that produced it.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde-derive", derive(serde::Serialize))]
pub enum Diagnostic {
    /// Star formation and outflow would have drawn `deficit` Msun more than
    /// the gas available; both were scaled down and the reservoir emptied.
    GasClamped { deficit: f64 },

    /// An element's losses exceeded its mass by `excess` Msun; the losses were
    /// limited to the mass available.
    ElementClamped { symbol: String, excess: f64 },
}
