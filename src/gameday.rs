pub mod context;
pub mod crawl;
pub mod document;
pub mod fetch;
pub mod flatten;
pub mod locator;
pub mod pitch;
pub mod schemas;
pub mod season;
pub mod writer;
