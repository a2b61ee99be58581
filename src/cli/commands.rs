pub mod forecast;
pub mod serve;

pub use forecast::forecast_file;
pub use serve::serve;
