pub mod loaders;
pub mod order;
pub mod output_layout;

pub use loaders::{load_orders_csv, parse_orders};
pub use order::{ArtifactSet, OrderRecord, RunArtifacts};
pub use output_layout::OutputLayout;
