// Domain layer: records, forecast types and ports (interfaces). No I/O here.

pub mod filter;
pub mod forecast;
pub mod model;
pub mod ports;
