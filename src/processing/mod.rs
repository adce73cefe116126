pub mod alert;
pub mod angle;
pub mod parser;
pub mod pipeline;
pub mod window;
