//! Property tests for graph resolution, include expansion and selection.

mod graph_props;
mod include_props;
mod selection_props;
