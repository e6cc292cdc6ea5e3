/// How eagerly a splits edit may switch the visualization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VisStrategy {
    /// Pick the best visualization, preferring the current one while it renders
    #[default]
    FairGame,
    /// Keep the current visualization unless it can no longer render the cube
    UnfairGame,
    /// Never switch
    KeepAlways,
}
