pub mod admin_messages;
pub mod auth;
pub mod consultations;
pub mod contacts;
pub mod doctor_requests;
pub mod error;
pub mod first_aid;
pub mod geo;
pub mod hospitals;
pub mod middleware;
pub mod notes;
pub mod notifications;
pub mod notify;
pub mod policy;
pub mod reports;
pub mod respond;
pub mod storage;
pub mod users;
pub mod views;
