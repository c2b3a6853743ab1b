use crate::charts::ChartConfig;

/// Opaque id of one drawn chart instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChartHandle(pub u64);

/// Charting backend addressed by canvas id.
pub trait ChartRenderer {
    /// Draws `config` on `canvas`. Returns `None` when the canvas does not exist.
    fn draw(&mut self, canvas: &str, config: &ChartConfig) -> Option<ChartHandle>;

    fn destroy(&mut self, handle: ChartHandle);
}

/// Blocking user prompts.
pub trait Prompt {
    fn confirm(&mut self, message: &str) -> bool;

    fn alert(&mut self, message: &str);
}
