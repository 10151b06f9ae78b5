// Domain layer: core models and ports (interfaces). Pure data plus the
// Source contract; no orchestration logic lives here.

pub mod model;
pub mod ports;
