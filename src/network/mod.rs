//! Сетевой модуль: TCP-сервер и построчный JSON-протокол.
//!
//! - `protocol`: формат запросов/ответов и их исполнение над реестром.
//! - `server`: приём соединений, лимит соединений, graceful shutdown.

pub mod protocol;
pub mod server;

pub use protocol::{execute, parse_request, Request, Response};
pub use server::{Server, ServerConfig, ShutdownHandle};
