pub mod clock;
pub mod error;
pub mod handle;
pub mod memory;
pub mod model;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::StoreError;
pub use handle::{HandleSource, OsHandleSource};
pub use memory::SecretStore;
pub use model::Secret;
