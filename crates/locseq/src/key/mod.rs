mod location;
mod partition;
mod resolver;
mod year;

pub use location::*;
pub use partition::*;
pub use resolver::*;
pub use year::*;
