pub mod environment;
pub mod types;
pub mod value;

pub mod prelude {
    pub use super::{
        environment::*,
        types::*,
        value::*
    };
}
