pub mod classify;
pub mod metrics;
pub mod model;
pub mod path;
pub mod project;
pub mod report;
pub mod session;
pub mod view;
pub mod viewport;

use colored::Colorize;

pub use model::{
    AggregateStats, Bounds, Coordinate, GeoPoint, Language, PathSegment, SegmentColor,
    ViewModel, ViewportFrame,
};
pub use session::{DashboardSession, Delivery, Generation, Retrieval, RetrievalPayload};
pub use view::{ViewModelCache, assemble};

/// Writes the banner to stderr so stdout carries only the report.
pub fn print_banner() {
    let banner = r#"
    ____              __       __
   / __ \____  __  __/ /____  / /   ___  ____  _____
  / /_/ / __ \/ / / / __/ _ \/ /   / _ \/ __ \/ ___/
 / _, _/ /_/ / /_/ / /_/  __/ /___/  __/ / / (__  )
/_/ |_|\____/\__,_/\__/\___/_____/\___/_/ /_/____/
"#;
    eprintln!("{}", banner.bright_cyan().bold());
    eprintln!(
        "  {} {}\n",
        "network path quality console".bright_white(),
        format!("v{}", env!("CARGO_PKG_VERSION")).dimmed()
    );
}
