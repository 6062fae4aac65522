pub mod db;
pub mod entropy;
pub mod mail;
pub mod mqtt;
