pub mod force_graph;
pub mod search_bar;
