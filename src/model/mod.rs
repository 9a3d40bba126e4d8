pub mod predictor;
pub mod window;
