// Domain-layer modules and shared errors/models
pub mod advisor {
    pub use crate::advisor::*;
}

pub mod coverage {
    pub use crate::coverage::*;
}

pub mod models {
    pub use crate::models::*;
}

pub mod normalizer {
    pub use crate::normalizer::*;
}

pub mod sanitizer {
    pub use crate::sanitizer::*;
}

pub mod errors {
    pub use crate::errors::*;
}
