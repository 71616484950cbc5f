pub mod client;
pub mod preview;
pub mod site;
