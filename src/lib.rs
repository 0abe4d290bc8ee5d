pub mod args;
pub mod capture;
pub mod config;
pub mod display;
pub mod link;
pub mod packet;
pub mod resolve;
pub mod start;
