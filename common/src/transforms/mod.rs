pub mod accuracy;
pub mod numbers;
pub mod window;
