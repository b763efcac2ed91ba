pub mod create_profile;

pub use create_profile::CreateProfileRequest;
