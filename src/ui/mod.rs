pub mod progress_bar;
pub mod results_table;

pub use progress_bar::CliProgress;
pub use results_table::{render_raw_logs, render_results};
