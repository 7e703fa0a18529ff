//! Interrupt line wires and the build-time IRQ namespace.

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use crate::error::ComposeError;

/// Shared single-bit, level-sensitive interrupt wire.
///
/// Cloning returns another handle to the same wire: the owning peripheral
/// drives the level, an external interrupt controller samples it.
#[derive(Clone, Default)]
pub struct IrqLine {
    level: Rc<Cell<bool>>,
}

impl IrqLine {
    /// Creates a deasserted line.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Drives the line level.
    pub fn set(&self, asserted: bool) {
        self.level.set(asserted);
    }

    /// Samples the current line level.
    #[must_use]
    pub fn asserted(&self) -> bool {
        self.level.get()
    }

    /// Returns `true` when both handles refer to the same wire.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.level, &other.level)
    }
}

impl fmt::Debug for IrqLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IrqLine")
            .field("asserted", &self.asserted())
            .finish()
    }
}

/// Insertion-ordered registry mapping peripheral names to interrupt lines.
///
/// Populated during composition only; a peripheral without an interrupt
/// capability simply contributes no entry. The ordered view feeds an
/// external interrupt controller's wiring.
#[derive(Debug, Default)]
pub struct IrqAggregator {
    lines: Vec<(String, IrqLine)>,
}

impl IrqAggregator {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` when `name` is already registered.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.lines.iter().any(|(existing, _)| existing == name)
    }

    /// Registers `line` under a unique peripheral name.
    ///
    /// # Errors
    ///
    /// Returns [`ComposeError::DuplicateIrqName`] when `name` is already
    /// registered; the registry is left unchanged.
    pub fn register(&mut self, name: &str, line: IrqLine) -> Result<(), ComposeError> {
        if self.contains(name) {
            return Err(ComposeError::DuplicateIrqName {
                name: name.to_owned(),
            });
        }
        self.lines.push((name.to_owned(), line));
        Ok(())
    }

    /// All registered lines in registration order.
    pub fn lines(&self) -> impl Iterator<Item = (&str, &IrqLine)> {
        self.lines.iter().map(|(name, line)| (name.as_str(), line))
    }

    /// Looks up a line by peripheral name.
    #[must_use]
    pub fn line(&self, name: &str) -> Option<&IrqLine> {
        self.lines
            .iter()
            .find_map(|(existing, line)| (existing == name).then_some(line))
    }

    /// Number of registered lines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Returns `true` when no line has been registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}
