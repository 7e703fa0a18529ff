//! ULPI PHY-facing signal bundle.

/// PHY signal record passed opaquely to the external USB core.
///
/// Directions follow the link's view: `data_in`, `nxt`, and `dir` are
/// PHY-driven inputs, the remaining signals are outputs toward the PHY.
/// The front-end only ever drives `rst`; everything else is a passthrough.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[allow(clippy::struct_excessive_bools)]
pub struct UlpiBundle {
    /// PHY-to-link data byte.
    pub data_in: u8,
    /// Link-to-PHY data byte.
    pub data_out: u8,
    /// Output enable for `data_out`.
    pub data_oe: bool,
    /// Link-supplied clock output.
    pub clk: bool,
    /// Stop signal terminating the current transfer.
    pub stp: bool,
    /// PHY throttle input.
    pub nxt: bool,
    /// PHY bus-ownership input.
    pub dir: bool,
    /// PHY reset output.
    pub rst: bool,
}
