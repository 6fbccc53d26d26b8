pub mod pool;
pub mod queries;
pub mod queries_settlement;

pub use pool::create_pool;
pub use queries::*;
pub use queries_settlement::*;
