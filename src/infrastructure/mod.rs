pub mod form_page;
pub mod js_executor;

pub use form_page::FormPage;
pub use js_executor::JsExecutor;
