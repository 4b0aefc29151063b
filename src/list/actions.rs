/// Keyboard-level commands a host forwards to the focused list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListAction {
    Add,
    Delete,
    ToggleExpanded,
    Expand,
    Collapse,
    Pickup,
    /// Pick up the focused row, or drop the one being carried.
    Grab,
    Step(i32),
    Drop,
    Cancel,
}
