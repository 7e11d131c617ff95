use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalyticsError {
    #[error("Calculation error in view '{view}': {message}")]
    Calculation { view: &'static str, message: String },
}
