//! Cookbook - Multilingual Recipe Site
//!
//! Renders a recipe journal into static pages, translating labels and
//! recipe text through a cache, built-in dictionaries and a remote
//! LibreTranslate compatible service.

pub mod app;
pub mod cli;
pub mod config;
pub mod content;
pub mod dom;
pub mod error;
pub mod filter;
pub mod lang;
pub mod render;
pub mod storage;
pub mod switcher;
pub mod translate;
