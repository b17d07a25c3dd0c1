// Domain layer: run records and the ports sites, tasks and storage plug into.

pub mod model;
pub mod ports;
