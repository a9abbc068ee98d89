pub mod blobstore;
pub mod db;
pub mod forward;
pub mod handlers;
pub mod models;
pub mod queries;
pub mod server;
pub mod transport;
