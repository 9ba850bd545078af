//! Port traits (interfaces) for dependency injection

pub mod storage;

pub use storage::{
    ApplicationStore, PaymentMethodStore, PlatformStore, SponsorshipStore, Storage, UserStore,
};
