pub mod alerts;
pub mod analysis;
pub mod dashboard;
pub mod home;
pub mod uploads;
