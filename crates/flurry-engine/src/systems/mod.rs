pub mod particle;
pub mod pool;
pub mod rng;
pub mod shapes;
