pub mod http;
pub mod musicxml;
pub mod onnx;
