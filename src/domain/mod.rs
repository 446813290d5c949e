pub mod activity;
pub mod age;
pub mod export;
pub mod member;
pub mod registration;
pub mod settings;
pub mod statistics;

pub use activity::*;
pub use age::*;
pub use export::*;
pub use member::*;
pub use registration::*;
pub use settings::*;
pub use statistics::*;
