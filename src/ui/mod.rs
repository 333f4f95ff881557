/// Presentation layer: panels, tables and charts. Everything here renders
/// from the data layer's types and never mutates a loaded table.
pub mod panels;
pub mod plot;
