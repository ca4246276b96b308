pub mod channel;
pub mod post;
pub mod remove;
pub mod rss;
pub mod serve;
pub mod show;
