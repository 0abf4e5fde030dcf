// Domain layer: model types, raw feed shapes and ports. No transport code here.

pub mod model;
pub mod ports;
pub mod raw;
