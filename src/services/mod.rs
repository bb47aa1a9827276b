pub mod captcha;
pub mod history;
pub mod source_list;
pub mod staging;

pub use captcha::{solve_math_captcha, MathChallenge};
pub use history::HistoryLog;
pub use source_list::{load_sources, resolve_source};
pub use staging::StagingArea;
