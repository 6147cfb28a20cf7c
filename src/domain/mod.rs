// Domain layer: models, the date rules, and the ports the backend client
// implements. Nothing here talks to the network.

pub mod dates;
pub mod model;
pub mod ports;
