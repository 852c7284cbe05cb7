/// Interfaces Layer - External Entry Points
///
/// Everything that touches the outside world on behalf of the batcher:
/// argument parsing, intake decoding and report rendering.
///
/// ## Modules
/// - `cli`: Command-line interface (main.rs logic)
/// - `intake`: JSON-lines orders, rider roster, demo data
/// - `report`: text / JSON renderers for outcomes and the run summary

pub mod cli;
pub mod intake;
pub mod report;
