//! Business services containing domain logic and use cases.

pub mod clock;
pub mod key;
pub mod scheduler;
pub mod token;

// Re-export commonly used types
pub use clock::{Clock, ManualClock, SystemClock};
pub use key::{
    EcdsaKeyGenerator, KeyGenerator, KeyLifecycleService, KeyPoolSnapshot, KeyRotationStore,
    RotationOutcome, ROTATION_TASK_NAME,
};
pub use scheduler::{
    task_action, DailySchedule, OneShotTask, RecurringTask, Schedule, ScheduledTask, TaskAction,
    TaskKind, TaskRegistry,
};
pub use token::{DecodedToken, TokenCodec, TokenConfig, TokenService, TokenServiceConfig};
